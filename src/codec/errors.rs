//! # Codec Errors
//!
//! Error types for the union codec and its field codecs.
//!
//! Configuration errors (duplicate discriminants, bad field tables) are
//! raised while a registry is built. Every other variant aborts a single
//! serialize or deserialize call.

use thiserror::Error;

use crate::config::ConfigError;

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Result type for a single field codec
pub type FieldResult<T> = Result<T, FieldError>;

/// Union codec errors
#[derive(Debug, Error)]
pub enum CodecError {
    // ==================
    // Configuration Errors
    // ==================
    /// Two schemas in one registry share a discriminant
    #[error("Duplicate discriminant: {0}")]
    DuplicateDiscriminant(String),

    /// A schema declares the same field twice
    #[error("Duplicate field '{field}' in '{variant}'")]
    DuplicateField {
        variant: String,
        field: String,
    },

    /// A schema declares a field named like the registry's tag field
    #[error("Field '{field}' in '{variant}' collides with the tag field")]
    ReservedField {
        variant: String,
        field: String,
    },

    /// The registry's codec configuration is invalid
    #[error("{0}")]
    InvalidConfig(#[from] ConfigError),

    // ==================
    // Serialization Errors
    // ==================
    /// The value's discriminant has no registered schema
    #[error("Unregistered variant: {0}")]
    UnregisteredVariant(String),

    /// The schema registered for a discriminant does not accept the value
    #[error("Variant '{0}' rejected by its schema projection")]
    VariantMismatch(String),

    /// A field codec failed while encoding
    #[error("Failed to encode field '{field}' of '{variant}': {source}")]
    FieldEncode {
        variant: String,
        field: String,
        #[source]
        source: FieldError,
    },

    // ==================
    // Deserialization Errors
    // ==================
    /// The wire value is not an object
    #[error("Expected an object, got {0}")]
    NotAnObject(&'static str),

    /// The tag is absent, not a string, or not registered
    #[error("Unknown discriminant: {0}")]
    UnknownDiscriminant(String),

    /// A field codec failed while decoding
    #[error("Failed to decode field '{field}' of '{variant}': {source}")]
    FieldDecode {
        variant: String,
        field: String,
        #[source]
        source: FieldError,
    },

    /// The wire object carries a field the schema does not declare
    #[error("Undeclared field '{field}' in '{variant}'")]
    UndeclaredField {
        variant: String,
        field: String,
    },

    /// A constructor asked for a field value that was not decoded
    #[error("Cannot construct '{model}': {reason}")]
    Construct { model: String, reason: String },

    // ==================
    // Text Errors
    // ==================
    /// JSON text could not be parsed or printed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CodecError {
    /// Returns whether this error was raised while building a registry.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CodecError::DuplicateDiscriminant(_)
                | CodecError::InvalidConfig(_)
                | CodecError::DuplicateField { .. }
                | CodecError::ReservedField { .. }
        )
    }

    /// Returns the field name for field-level failures.
    pub fn field(&self) -> Option<&str> {
        match self {
            CodecError::FieldEncode { field, .. }
            | CodecError::FieldDecode { field, .. }
            | CodecError::UndeclaredField { field, .. }
            | CodecError::DuplicateField { field, .. }
            | CodecError::ReservedField { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Stable error code for CLI and log output.
    pub fn code(&self) -> &'static str {
        match self {
            CodecError::DuplicateDiscriminant(_) => "TAGWIRE_DUPLICATE_DISCRIMINANT",
            CodecError::DuplicateField { .. } => "TAGWIRE_DUPLICATE_FIELD",
            CodecError::ReservedField { .. } => "TAGWIRE_RESERVED_FIELD",
            CodecError::InvalidConfig(_) => "TAGWIRE_INVALID_CONFIG",
            CodecError::UnregisteredVariant(_) => "TAGWIRE_UNREGISTERED_VARIANT",
            CodecError::VariantMismatch(_) => "TAGWIRE_VARIANT_MISMATCH",
            CodecError::FieldEncode { .. } => "TAGWIRE_FIELD_ENCODE",
            CodecError::NotAnObject(_) => "TAGWIRE_NOT_AN_OBJECT",
            CodecError::UnknownDiscriminant(_) => "TAGWIRE_UNKNOWN_DISCRIMINANT",
            CodecError::FieldDecode { .. } => "TAGWIRE_FIELD_DECODE",
            CodecError::UndeclaredField { .. } => "TAGWIRE_UNDECLARED_FIELD",
            CodecError::Construct { .. } => "TAGWIRE_CONSTRUCT",
            CodecError::Json(_) => "TAGWIRE_JSON",
        }
    }
}

/// Field codec errors
#[derive(Debug, Error)]
pub enum FieldError {
    /// Required field absent from the wire object
    #[error("field is missing")]
    Missing,

    /// Required field present as null
    #[error("expected non-null value, got null")]
    Null,

    /// Wire value has the wrong JSON type
    #[error("expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// Date could not be parsed or represented
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// Identifier is empty or unparseable
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// serde could not convert the value
    #[error("{0}")]
    Serde(#[from] serde_json::Error),

    /// A nested model or union failed
    #[error("{0}")]
    Nested(Box<CodecError>),

    /// One element of a list failed
    #[error("element {index}: {source}")]
    Element {
        index: usize,
        #[source]
        source: Box<FieldError>,
    },
}

impl FieldError {
    /// Wraps the error with the list index it occurred at.
    pub fn at_index(self, index: usize) -> Self {
        FieldError::Element {
            index,
            source: Box::new(self),
        }
    }
}

impl From<CodecError> for FieldError {
    fn from(err: CodecError) -> Self {
        FieldError::Nested(Box::new(err))
    }
}
