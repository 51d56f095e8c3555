//! Observability for tagwire
//!
//! - Typed event names (`Event`)
//! - Structured logging through `tracing` (`Logger`)
//! - Subscriber setup for binaries (`init_logging`)
//!
//! Observability is read-only: nothing here influences codec results.

mod events;
mod logger;

pub use events::Event;
pub use logger::{init_logging, Logger, Severity};

/// Log an event at its default severity
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log an event with fields at its default severity
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.default_severity(), event.as_str(), fields);
}
