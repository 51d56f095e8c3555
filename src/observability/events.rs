//! Observability events for tagwire
//!
//! Every log line emitted by the crate names one of these events, so log
//! consumers can filter on a fixed vocabulary.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded
    ConfigLoaded,

    // Registry
    /// Variant schema registered
    VariantRegistered,
    /// Registry build complete
    RegistryBuilt,
    /// Registry build rejected (configuration error)
    RegistryRejected,

    // Codec
    /// Serialization refused (unregistered variant or field encode failure)
    SerializeRejected,
    /// Deserialization refused; logged with the error code
    DeserializeRejected,

    // Loadable
    /// Asynchronous load started
    LoadStarted,
    /// Asynchronous load settled with a value
    LoadAvailable,
    /// Asynchronous load settled with an error
    LoadFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::VariantRegistered => "VARIANT_REGISTERED",
            Event::RegistryBuilt => "REGISTRY_BUILT",
            Event::RegistryRejected => "REGISTRY_REJECTED",

            Event::SerializeRejected => "SERIALIZE_REJECTED",
            Event::DeserializeRejected => "DESERIALIZE_REJECTED",

            Event::LoadStarted => "LOAD_STARTED",
            Event::LoadAvailable => "LOAD_AVAILABLE",
            Event::LoadFailed => "LOAD_FAILED",
        }
    }

    /// Severity an event logs at unless the caller picks one
    pub fn default_severity(&self) -> Severity {
        match self {
            e if e.is_rejection() => Severity::Warn,
            Event::VariantRegistered
            | Event::RegistryBuilt
            | Event::LoadStarted
            | Event::LoadAvailable
            | Event::LoadFailed => Severity::Debug,
            _ => Severity::Info,
        }
    }

    /// Returns true if this event reports a rejected operation
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Event::RegistryRejected | Event::SerializeRejected | Event::DeserializeRejected
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
