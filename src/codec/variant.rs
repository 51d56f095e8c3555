//! Variant schemas
//!
//! A variant schema binds a discriminant to the field table of one variant
//! of a union `U`. The payload type `V` is erased once the schema is built,
//! so one registry can hold schemas with different payload types.

use std::sync::Arc;

use serde_json::{Map, Value};

use super::errors::{CodecError, CodecResult};
use super::model::ModelSchema;

type EncodeFn<U> = Box<dyn Fn(&U) -> CodecResult<Map<String, Value>> + Send + Sync>;
type DecodeFn<U> = Box<dyn Fn(&Map<String, Value>) -> CodecResult<U> + Send + Sync>;

/// A union whose values carry their own discriminant.
///
/// Dispatch always goes through this value, never through the Rust type of
/// the payload, so two structurally identical variants with different tags
/// are told apart correctly.
pub trait Tagged {
    /// Returns the wire tag of this value's variant.
    fn discriminant(&self) -> &str;
}

/// Discriminant and field table for one variant of `U`.
pub struct VariantSchema<U> {
    discriminant: &'static str,
    fields: Vec<&'static str>,
    duplicate_field: Option<&'static str>,
    encode: EncodeFn<U>,
    decode: DecodeFn<U>,
}

impl<U: 'static> VariantSchema<U> {
    /// Builds a schema for a variant with payload `V`.
    ///
    /// `project` borrows the payload out of a union value carrying this
    /// discriminant; `inject` wraps a decoded payload back into the union.
    pub fn new<V: 'static>(
        discriminant: &'static str,
        project: fn(&U) -> Option<&V>,
        inject: fn(V) -> U,
        model: ModelSchema<V>,
    ) -> Self {
        let fields = model.field_names().collect();
        let duplicate_field = model.duplicate_field();
        let model = Arc::new(model);
        let decoder = Arc::clone(&model);
        Self {
            discriminant,
            fields,
            duplicate_field,
            encode: Box::new(move |value| {
                let payload = project(value)
                    .ok_or_else(|| CodecError::VariantMismatch(discriminant.to_string()))?;
                model.encode_as(discriminant, payload)
            }),
            decode: Box::new(move |object| decoder.decode_as(discriminant, object).map(inject)),
        }
    }

    /// Builds a schema for a variant without payload.
    pub fn unit(discriminant: &'static str, is_variant: fn(&U) -> bool, make: fn() -> U) -> Self {
        Self {
            discriminant,
            fields: Vec::new(),
            duplicate_field: None,
            encode: Box::new(move |value| {
                if is_variant(value) {
                    Ok(Map::new())
                } else {
                    Err(CodecError::VariantMismatch(discriminant.to_string()))
                }
            }),
            decode: Box::new(move |_| Ok(make())),
        }
    }
}

impl<U> VariantSchema<U> {
    /// Returns the discriminant this schema is registered under.
    pub fn discriminant(&self) -> &'static str {
        self.discriminant
    }

    /// Returns the declared field names in declaration order.
    pub fn fields(&self) -> &[&'static str] {
        &self.fields
    }

    /// Returns whether the schema declares a field.
    pub fn declares(&self, name: &str) -> bool {
        self.fields.iter().any(|field| *field == name)
    }

    /// Checks the field table against the registry's tag field.
    pub(crate) fn validate_fields(&self, tag_field: &str) -> CodecResult<()> {
        if let Some(field) = self.duplicate_field {
            return Err(CodecError::DuplicateField {
                variant: self.discriminant.to_string(),
                field: field.to_string(),
            });
        }
        if self.declares(tag_field) {
            return Err(CodecError::ReservedField {
                variant: self.discriminant.to_string(),
                field: tag_field.to_string(),
            });
        }
        Ok(())
    }

    /// Encodes the declared fields of a value (without the tag).
    pub(crate) fn encode_fields(&self, value: &U) -> CodecResult<Map<String, Value>> {
        (self.encode)(value)
    }

    /// Decodes the declared fields of a wire object and builds the value.
    pub(crate) fn decode_fields(&self, object: &Map<String, Value>) -> CodecResult<U> {
        (self.decode)(object)
    }
}

impl<U> std::fmt::Debug for VariantSchema<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariantSchema")
            .field("discriminant", &self.discriminant)
            .field("fields", &self.fields)
            .finish()
    }
}
