//! Domain events bridge for the web server.
//!
//! Every event the ledger engine emits is written as a structured tracing
//! record, so the JSON log stream doubles as the ledger's audit trail.

mod sink;

pub use sink::TracingEventSink;
