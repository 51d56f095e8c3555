//! Model schemas
//!
//! A model schema is the explicit field table of one Rust type: an ordered
//! list of `(wire name, field codec, accessor)` entries plus a constructor
//! that assembles the value from the decoded fields. Tables are declared
//! in code when the schema is built; nothing is discovered at runtime.
//!
//! Decoding is all-or-nothing. Every declared field is decoded before the
//! constructor runs, and the first failing field aborts the whole value.

use std::any::{type_name, Any};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

use serde_json::{Map, Value};

use super::errors::{CodecError, CodecResult, FieldError, FieldResult};
use super::field::{decode_wire, json_type_name, FieldCodec};

type EncodeFn<V> = Box<dyn Fn(&V) -> FieldResult<Option<Value>> + Send + Sync>;
type DecodeFn = Box<dyn Fn(Option<&Value>) -> FieldResult<Box<dyn Any + Send>> + Send + Sync>;

/// Constructor called with the decoded field values of one object.
pub type Construct<V> = fn(&mut FieldValues) -> CodecResult<V>;

/// One entry of a field table.
pub struct FieldSpec<V> {
    name: &'static str,
    optional: bool,
    encode: EncodeFn<V>,
    decode: DecodeFn,
}

impl<V: 'static> FieldSpec<V> {
    /// A field that must be present on the wire.
    ///
    /// `null` is handed to the codec's `decode_null`, so a value that
    /// encodes to `null` decodes back from it.
    pub fn required<T, C>(name: &'static str, codec: C, get: fn(&V) -> &T) -> Self
    where
        T: Send + 'static,
        C: FieldCodec<T> + 'static,
    {
        let codec = Arc::new(codec);
        let decoder = Arc::clone(&codec);
        Self {
            name,
            optional: false,
            encode: Box::new(move |value| codec.encode(get(value)).map(Some)),
            decode: Box::new(move |wire| match wire {
                None => Err(FieldError::Missing),
                Some(wire) => decode_wire(&*decoder, wire)
                    .map(|decoded| Box::new(decoded) as Box<dyn Any + Send>),
            }),
        }
    }

    /// A field that is omitted when `None` and decodes absent or null
    /// values to `None`. The constructor takes it as `Option<T>`.
    pub fn optional<T, C>(name: &'static str, codec: C, get: fn(&V) -> Option<&T>) -> Self
    where
        T: Send + 'static,
        C: FieldCodec<T> + 'static,
    {
        let codec = Arc::new(codec);
        let decoder = Arc::clone(&codec);
        Self {
            name,
            optional: true,
            encode: Box::new(move |value| get(value).map(|field| codec.encode(field)).transpose()),
            decode: Box::new(move |wire| match wire {
                None | Some(Value::Null) => Ok(Box::new(None::<T>) as Box<dyn Any + Send>),
                Some(wire) => decoder
                    .decode(wire)
                    .map(|decoded| Box::new(Some(decoded)) as Box<dyn Any + Send>),
            }),
        }
    }
}

impl<V> FieldSpec<V> {
    /// Returns the wire name of the field.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns whether the field may be absent.
    pub fn is_optional(&self) -> bool {
        self.optional
    }
}

/// Decoded field values handed to a constructor.
pub struct FieldValues {
    model: String,
    values: HashMap<&'static str, Box<dyn Any + Send>>,
}

impl FieldValues {
    /// Takes the decoded value of a field.
    ///
    /// Optional fields are taken as `Option<T>`. Asking for an undeclared
    /// field, a field twice, or with the wrong type is a `Construct` error.
    pub fn take<T: 'static>(&mut self, name: &str) -> CodecResult<T> {
        let boxed = self.values.remove(name).ok_or_else(|| CodecError::Construct {
            model: self.model.clone(),
            reason: format!("field '{}' was not decoded", name),
        })?;
        boxed
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| CodecError::Construct {
                model: self.model.clone(),
                reason: format!("field '{}' does not hold a {}", name, type_name::<T>()),
            })
    }
}

/// Explicit field table and constructor for one Rust type.
pub struct ModelSchema<V> {
    name: &'static str,
    fields: Vec<FieldSpec<V>>,
    construct: Construct<V>,
}

impl<V: 'static> ModelSchema<V> {
    /// Starts a field table for the named model.
    pub fn builder(name: &'static str) -> ModelSchemaBuilder<V> {
        ModelSchemaBuilder {
            name,
            fields: Vec::new(),
        }
    }
}

impl<V> ModelSchema<V> {
    /// Returns the model name used in error messages.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the declared field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|field| field.name)
    }

    /// Returns whether the table declares a field.
    pub fn declares(&self, name: &str) -> bool {
        self.fields.iter().any(|field| field.name == name)
    }

    /// Returns the first field name declared twice, if any.
    pub fn duplicate_field(&self) -> Option<&'static str> {
        let mut seen = HashSet::new();
        self.fields
            .iter()
            .map(|field| field.name)
            .find(|name| !seen.insert(*name))
    }

    /// Encodes a value into a wire object.
    pub fn to_object(&self, value: &V) -> CodecResult<Map<String, Value>> {
        self.encode_as(self.name, value)
    }

    /// Decodes a wire object into a value.
    pub fn from_object(&self, object: &Map<String, Value>) -> CodecResult<V> {
        self.decode_as(self.name, object)
    }

    /// Encodes a value, reporting failures against `label`.
    pub(crate) fn encode_as(&self, label: &str, value: &V) -> CodecResult<Map<String, Value>> {
        let mut object = Map::with_capacity(self.fields.len());
        for field in &self.fields {
            let encoded = (field.encode)(value).map_err(|source| CodecError::FieldEncode {
                variant: label.to_string(),
                field: field.name.to_string(),
                source,
            })?;
            if let Some(encoded) = encoded {
                object.insert(field.name.to_string(), encoded);
            }
        }
        Ok(object)
    }

    /// Decodes a wire object, reporting failures against `label`.
    pub(crate) fn decode_as(&self, label: &str, object: &Map<String, Value>) -> CodecResult<V> {
        let mut values = FieldValues {
            model: label.to_string(),
            values: HashMap::with_capacity(self.fields.len()),
        };
        for field in &self.fields {
            let decoded =
                (field.decode)(object.get(field.name)).map_err(|source| CodecError::FieldDecode {
                    variant: label.to_string(),
                    field: field.name.to_string(),
                    source,
                })?;
            values.values.insert(field.name, decoded);
        }
        (self.construct)(&mut values)
    }
}

/// A model schema nests as an object-valued field.
impl<V> FieldCodec<V> for ModelSchema<V> {
    fn encode(&self, value: &V) -> FieldResult<Value> {
        Ok(Value::Object(self.to_object(value)?))
    }

    fn decode(&self, wire: &Value) -> FieldResult<V> {
        let object = wire.as_object().ok_or_else(|| FieldError::TypeMismatch {
            expected: "object",
            actual: json_type_name(wire),
        })?;
        Ok(self.from_object(object)?)
    }
}

/// A model schema built on first use.
///
/// Lets a model hold fields of its own type: the inner table is only
/// built when a nested value is actually encoded or decoded, so
/// recursion stops at the depth the data reaches.
pub struct DeferredSchema<V> {
    build: Box<dyn Fn() -> CodecResult<ModelSchema<V>> + Send + Sync>,
    schema: OnceLock<ModelSchema<V>>,
}

impl<V> DeferredSchema<V> {
    pub fn new<F>(build: F) -> Self
    where
        F: Fn() -> CodecResult<ModelSchema<V>> + Send + Sync + 'static,
    {
        Self {
            build: Box::new(build),
            schema: OnceLock::new(),
        }
    }

    fn schema(&self) -> CodecResult<&ModelSchema<V>> {
        if let Some(schema) = self.schema.get() {
            return Ok(schema);
        }
        let built = (self.build)()?;
        Ok(self.schema.get_or_init(|| built))
    }
}

impl<V> FieldCodec<V> for DeferredSchema<V> {
    fn encode(&self, value: &V) -> FieldResult<Value> {
        self.schema()?.encode(value)
    }

    fn decode(&self, wire: &Value) -> FieldResult<V> {
        self.schema()?.decode(wire)
    }
}

/// Builder collecting the field table of a model schema.
pub struct ModelSchemaBuilder<V> {
    name: &'static str,
    fields: Vec<FieldSpec<V>>,
}

impl<V: 'static> ModelSchemaBuilder<V> {
    /// Declares a required field.
    pub fn field<T, C>(mut self, name: &'static str, codec: C, get: fn(&V) -> &T) -> Self
    where
        T: Send + 'static,
        C: FieldCodec<T> + 'static,
    {
        self.fields.push(FieldSpec::required(name, codec, get));
        self
    }

    /// Declares an optional field.
    pub fn optional_field<T, C>(
        mut self,
        name: &'static str,
        codec: C,
        get: fn(&V) -> Option<&T>,
    ) -> Self
    where
        T: Send + 'static,
        C: FieldCodec<T> + 'static,
    {
        self.fields.push(FieldSpec::optional(name, codec, get));
        self
    }

    /// Finishes the table with its constructor.
    pub fn construct(self, construct: Construct<V>) -> ModelSchema<V> {
        ModelSchema {
            name: self.name,
            fields: self.fields,
            construct,
        }
    }
}
