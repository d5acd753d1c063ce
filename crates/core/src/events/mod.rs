//! Domain events module.
//!
//! The ledger engine reports what it did through a [`DomainEventSink`]
//! supplied by the caller. The server turns events into structured log
//! records; tests collect them with [`MockDomainEventSink`].

mod domain_event;
mod sink;

pub use domain_event::*;
pub use sink::*;
