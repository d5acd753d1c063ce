use abacus_core::events::{DomainEvent, DomainEventSink};

/// Writes ledger events to the tracing subscriber.
///
/// Rejections are logged at `warn`, everything else at `info`. The full event
/// is attached as a JSON field so log pipelines can index it.
#[derive(Clone, Default)]
pub struct TracingEventSink;

impl TracingEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl DomainEventSink for TracingEventSink {
    fn emit(&self, event: DomainEvent) {
        let payload = serde_json::to_string(&event).unwrap_or_default();
        match &event {
            DomainEvent::LedgerOperationRejected {
                portfolio_id,
                operation,
                reason,
            } => tracing::warn!(
                target: "abacus::ledger",
                event = event.name(),
                portfolio_id = %portfolio_id,
                operation = operation.as_str(),
                payload = %payload,
                "{}",
                reason
            ),
            _ => tracing::info!(
                target: "abacus::ledger",
                event = event.name(),
                portfolio_id = %event.portfolio_id(),
                payload = %payload,
                "ledger event"
            ),
        }
    }
}
