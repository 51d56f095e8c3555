//! Structured logging
//!
//! `Logger` is a thin facade over `tracing`: one call is one event with an
//! event name and a set of key/value fields. Fields are rendered in sorted
//! key order so identical calls produce identical lines.

use tracing_subscriber::EnvFilter;

/// Log severity levels, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Trace,
    /// Registry construction and load lifecycle
    Debug,
    Info,
    /// Rejected input or configuration
    Warn,
    Error,
}

impl From<Severity> for tracing::Level {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Trace => tracing::Level::TRACE,
            Severity::Debug => tracing::Level::DEBUG,
            Severity::Info => tracing::Level::INFO,
            Severity::Warn => tracing::Level::WARN,
            Severity::Error => tracing::Level::ERROR,
        }
    }
}

/// Event logger backed by `tracing`
pub struct Logger;

impl Logger {
    /// Log an event with the given severity and fields
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        let fields = render_fields(fields);
        match severity {
            Severity::Trace => tracing::trace!(event = %event, "{}", fields),
            Severity::Debug => tracing::debug!(event = %event, "{}", fields),
            Severity::Info => tracing::info!(event = %event, "{}", fields),
            Severity::Warn => tracing::warn!(event = %event, "{}", fields),
            Severity::Error => tracing::error!(event = %event, "{}", fields),
        }
    }
}

/// Renders fields as `key="value"` pairs sorted by key.
pub(crate) fn render_fields(fields: &[(&str, &str)]) -> String {
    let mut sorted: Vec<_> = fields.iter().collect();
    sorted.sort_by_key(|(key, _)| *key);
    sorted
        .iter()
        .map(|(key, value)| format!("{}={:?}", key, value))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `default_filter`. Calling this more than once is
/// harmless; later calls leave the first subscriber in place.
pub fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
