//! Union codec
//!
//! Serializes a union value with the schema matching its own discriminant
//! and deserializes a wire object by reading its tag field.
//!
//! Wire shape (tag field "type" by default):
//! ```json
//! { "type": "unverified", "address": "b@example.com" }
//! ```
//! The tag comes first, followed by the declared fields in declaration
//! order. Tags are compared by exact string equality: no prefix matching,
//! no case folding, and a numeric `5` never matches the tag `"5"`.
//!
//! The codec does not mutate the registry it borrows. Every rejected call
//! is logged with the error's code before it is returned.

use std::sync::Arc;

use serde_json::{Map, Value};

use super::errors::{CodecError, CodecResult, FieldError, FieldResult};
use super::field::{json_type_name, FieldCodec};
use super::registry::VariantRegistry;
use super::variant::{Tagged, VariantSchema};
use crate::config::UnknownFields;
use crate::observability::{log_event_with_fields, Event};

/// Reported by `UnknownDiscriminant` when the tag field is absent.
pub const MISSING_TAG: &str = "<missing>";

/// Tagged union codec backed by a variant registry.
pub struct UnionCodec<'a, U> {
    registry: &'a VariantRegistry<U>,
}

impl<'a, U: Tagged> UnionCodec<'a, U> {
    /// Creates a codec backed by the given registry.
    pub fn new(registry: &'a VariantRegistry<U>) -> Self {
        Self { registry }
    }

    /// Serializes a union value into a flat wire object.
    ///
    /// # Errors
    ///
    /// - `UnregisteredVariant` if the value's discriminant has no schema
    /// - `FieldEncode` if a field codec fails
    pub fn serialize(&self, value: &U) -> CodecResult<Value> {
        self.encode(value)
            .map_err(|err| rejected(Event::SerializeRejected, value.discriminant(), err))
    }

    fn encode(&self, value: &U) -> CodecResult<Value> {
        let schema = self
            .registry
            .lookup_by_instance(value)
            .ok_or_else(|| CodecError::UnregisteredVariant(value.discriminant().to_string()))?;

        let fields = schema.encode_fields(value)?;
        let mut object = Map::with_capacity(fields.len() + 1);
        object.insert(
            self.registry.config().tag_field.clone(),
            Value::String(schema.discriminant().to_string()),
        );
        object.extend(fields);
        Ok(Value::Object(object))
    }

    /// Deserializes a wire object into a union value.
    ///
    /// # Errors
    ///
    /// - `NotAnObject` if the wire value is not an object
    /// - `UnknownDiscriminant` if the tag is absent, not a string, or not
    ///   registered. String tags are reported as-is, an absent tag as
    ///   `MISSING_TAG`, any other value as its JSON text in angle brackets
    /// - `UndeclaredField` for extra fields when the registry rejects them
    /// - `FieldDecode` if a declared field fails to decode
    pub fn deserialize(&self, wire: &Value) -> CodecResult<U> {
        self.decode(wire).map_err(|err| {
            let tag = wire
                .get(&self.registry.config().tag_field)
                .and_then(Value::as_str)
                .unwrap_or(MISSING_TAG);
            rejected(Event::DeserializeRejected, tag, err)
        })
    }

    fn decode(&self, wire: &Value) -> CodecResult<U> {
        let object = wire
            .as_object()
            .ok_or_else(|| CodecError::NotAnObject(json_type_name(wire)))?;

        let schema = self.resolve(object)?;

        if self.registry.config().unknown_fields == UnknownFields::Reject {
            self.reject_undeclared(schema, object)?;
        }

        schema.decode_fields(object)
    }

    /// Serializes a union value to JSON text.
    pub fn to_json_string(&self, value: &U) -> CodecResult<String> {
        Ok(serde_json::to_string(&self.serialize(value)?)?)
    }

    /// Deserializes a union value from JSON text.
    pub fn from_json_str(&self, text: &str) -> CodecResult<U> {
        let wire: Value = serde_json::from_str(text)?;
        self.deserialize(&wire)
    }

    /// Finds the schema named by the object's tag field.
    fn resolve(&self, object: &Map<String, Value>) -> CodecResult<&'a VariantSchema<U>> {
        match object.get(&self.registry.config().tag_field) {
            Some(Value::String(tag)) => self
                .registry
                .lookup_by_discriminant(tag)
                .ok_or_else(|| CodecError::UnknownDiscriminant(tag.clone())),
            Some(other) => Err(CodecError::UnknownDiscriminant(format!("<{}>", other))),
            None => Err(CodecError::UnknownDiscriminant(MISSING_TAG.to_string())),
        }
    }

    fn reject_undeclared(
        &self,
        schema: &VariantSchema<U>,
        object: &Map<String, Value>,
    ) -> CodecResult<()> {
        let tag_field = &self.registry.config().tag_field;
        match object
            .keys()
            .find(|key| *key != tag_field && !schema.declares(key))
        {
            Some(field) => Err(CodecError::UndeclaredField {
                variant: schema.discriminant().to_string(),
                field: field.clone(),
            }),
            None => Ok(()),
        }
    }
}

fn rejected(event: Event, tag: &str, err: CodecError) -> CodecError {
    let reason = err.to_string();
    log_event_with_fields(
        event,
        &[("code", err.code()), ("reason", &reason), ("tag", tag)],
    );
    err
}

/// Field codec for a union nested inside a model.
///
/// Shares its registry, so one registry can back any number of fields.
pub struct UnionField<U> {
    registry: Arc<VariantRegistry<U>>,
}

impl<U> UnionField<U> {
    /// Creates a field codec over the given registry.
    pub fn new(registry: Arc<VariantRegistry<U>>) -> Self {
        Self { registry }
    }

    /// Returns the backing registry.
    pub fn registry(&self) -> &VariantRegistry<U> {
        &self.registry
    }
}

impl<U> Clone for UnionField<U> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<U: Tagged> FieldCodec<U> for UnionField<U> {
    fn encode(&self, value: &U) -> FieldResult<Value> {
        UnionCodec::new(&self.registry)
            .serialize(value)
            .map_err(FieldError::from)
    }

    fn decode(&self, wire: &Value) -> FieldResult<U> {
        UnionCodec::new(&self.registry)
            .deserialize(wire)
            .map_err(FieldError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::field::Primitive;
    use crate::codec::model::ModelSchema;
    use crate::config::CodecConfig;
    use serde_json::json;
    use std::io::Write;
    use std::sync::Mutex;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Debug, Clone, PartialEq)]
    struct Coin {
        side: String,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Toss {
        Heads(Coin),
        Tails(Coin),
        Edge,
    }

    impl Tagged for Toss {
        fn discriminant(&self) -> &str {
            match self {
                Toss::Heads(_) => "heads",
                Toss::Tails(_) => "tails",
                Toss::Edge => "edge",
            }
        }
    }

    fn coin_schema(name: &'static str) -> ModelSchema<Coin> {
        ModelSchema::<Coin>::builder(name)
            .field("side", Primitive, |c| &c.side)
            .construct(|f| Ok(Coin { side: f.take("side")? }))
    }

    fn heads() -> VariantSchema<Toss> {
        VariantSchema::<Toss>::new(
            "heads",
            |t| match t {
                Toss::Heads(coin) => Some(coin),
                _ => None,
            },
            Toss::Heads,
            coin_schema("heads"),
        )
    }

    fn tails() -> VariantSchema<Toss> {
        VariantSchema::<Toss>::new(
            "tails",
            |t| match t {
                Toss::Tails(coin) => Some(coin),
                _ => None,
            },
            Toss::Tails,
            coin_schema("tails"),
        )
    }

    fn registry(config: CodecConfig) -> VariantRegistry<Toss> {
        VariantRegistry::builder()
            .config(config)
            .variant(heads())
            .variant(tails())
            .variant(VariantSchema::<Toss>::unit(
                "edge",
                |t| matches!(t, Toss::Edge),
                || Toss::Edge,
            ))
            .build()
            .unwrap()
    }

    fn coin(side: &str) -> Coin {
        Coin { side: side.into() }
    }

    #[test]
    fn test_serialize_puts_tag_first() {
        let registry = registry(CodecConfig::default());
        let codec = UnionCodec::new(&registry);

        let wire = codec.serialize(&Toss::Heads(coin("up"))).unwrap();
        assert_eq!(wire, json!({ "type": "heads", "side": "up" }));
        assert_eq!(
            codec.to_json_string(&Toss::Heads(coin("up"))).unwrap(),
            r#"{"type":"heads","side":"up"}"#
        );
    }

    #[test]
    fn test_identical_payloads_dispatch_by_tag() {
        let registry = registry(CodecConfig::default());
        let codec = UnionCodec::new(&registry);

        let heads = codec.deserialize(&json!({ "type": "heads", "side": "x" })).unwrap();
        let tails = codec.deserialize(&json!({ "type": "tails", "side": "x" })).unwrap();
        assert_eq!(heads, Toss::Heads(coin("x")));
        assert_eq!(tails, Toss::Tails(coin("x")));
        assert_eq!(codec.serialize(&tails).unwrap()["type"], json!("tails"));
    }

    #[test]
    fn test_unit_variant_round_trip() {
        let registry = registry(CodecConfig::default());
        let codec = UnionCodec::new(&registry);

        let wire = codec.serialize(&Toss::Edge).unwrap();
        assert_eq!(wire, json!({ "type": "edge" }));
        assert_eq!(codec.deserialize(&wire).unwrap(), Toss::Edge);
    }

    #[test]
    fn test_unregistered_variant() {
        let partial = VariantRegistry::builder().variant(heads()).build().unwrap();
        let codec = UnionCodec::new(&partial);

        let err = codec.serialize(&Toss::Tails(coin("down"))).unwrap_err();
        assert!(matches!(err, CodecError::UnregisteredVariant(ref tag) if tag == "tails"));
    }

    #[test]
    fn test_unknown_discriminant_variants() {
        let registry = registry(CodecConfig::default());
        let codec = UnionCodec::new(&registry);

        let cases = [
            (json!({ "type": "bogus" }), "bogus"),
            (json!({ "type": "Heads", "side": "x" }), "Heads"),
            (json!({ "type": "head", "side": "x" }), "head"),
            (json!({ "type": "null" }), "null"),
            (json!({ "type": 5 }), "<5>"),
            (json!({ "type": null }), "<null>"),
            (json!({ "side": "x" }), MISSING_TAG),
        ];
        for (wire, expected) in cases {
            match codec.deserialize(&wire) {
                Err(CodecError::UnknownDiscriminant(tag)) => assert_eq!(tag, expected),
                other => panic!("unexpected result for {}: {:?}", wire, other),
            }
        }
    }

    #[test]
    fn test_not_an_object() {
        let registry = registry(CodecConfig::default());
        let codec = UnionCodec::new(&registry);

        let err = codec.deserialize(&json!("heads")).unwrap_err();
        assert!(matches!(err, CodecError::NotAnObject("string")));
    }

    #[test]
    fn test_field_decode_failure_names_field() {
        let registry = registry(CodecConfig::default());
        let codec = UnionCodec::new(&registry);

        let err = codec.deserialize(&json!({ "type": "heads", "side": 3 })).unwrap_err();
        match err {
            CodecError::FieldDecode { variant, field, .. } => {
                assert_eq!(variant, "heads");
                assert_eq!(field, "side");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture_warnings(run: impl FnOnce()) -> String {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(captured.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, run);
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_every_rejection_is_logged_with_code() {
        let registry = registry(CodecConfig::default().with_unknown_fields(UnknownFields::Reject));
        let codec = UnionCodec::new(&registry);
        let partial = VariantRegistry::builder().variant(heads()).build().unwrap();

        let output = capture_warnings(|| {
            assert!(codec.deserialize(&json!([1])).is_err());
            assert!(codec.deserialize(&json!({ "type": "heads", "side": 3 })).is_err());
            assert!(codec
                .deserialize(&json!({ "type": "heads", "side": "up", "weight": 3 }))
                .is_err());
            assert!(UnionCodec::new(&partial).serialize(&Toss::Edge).is_err());
        });

        for expected in [
            "TAGWIRE_NOT_AN_OBJECT",
            "TAGWIRE_FIELD_DECODE",
            "TAGWIRE_UNDECLARED_FIELD",
            "TAGWIRE_UNREGISTERED_VARIANT",
            "DESERIALIZE_REJECTED",
            "SERIALIZE_REJECTED",
        ] {
            assert!(output.contains(expected), "missing {} in {}", expected, output);
        }
    }

    #[test]
    fn test_undeclared_fields_policy() {
        let wire = json!({ "type": "heads", "side": "up", "weight": 3 });

        let lenient = registry(CodecConfig::default());
        assert_eq!(
            UnionCodec::new(&lenient).deserialize(&wire).unwrap(),
            Toss::Heads(coin("up"))
        );

        let strict = registry(CodecConfig::default().with_unknown_fields(UnknownFields::Reject));
        let err = UnionCodec::new(&strict).deserialize(&wire).unwrap_err();
        assert!(matches!(err, CodecError::UndeclaredField { ref field, .. } if field == "weight"));
    }

    #[test]
    fn test_custom_tag_field() {
        let registry = registry(CodecConfig::default().with_tag_field("kind"));
        let codec = UnionCodec::new(&registry);

        let wire = codec.serialize(&Toss::Edge).unwrap();
        assert_eq!(wire, json!({ "kind": "edge" }));
        assert!(codec.deserialize(&json!({ "type": "edge" })).is_err());
        assert_eq!(codec.deserialize(&wire).unwrap(), Toss::Edge);
    }

    #[test]
    fn test_from_json_str_rejects_bad_text() {
        let registry = registry(CodecConfig::default());
        let codec = UnionCodec::new(&registry);

        assert!(matches!(codec.from_json_str("{ nope"), Err(CodecError::Json(_))));
        assert_eq!(codec.from_json_str(r#"{"type":"edge"}"#).unwrap(), Toss::Edge);
    }

    #[test]
    fn test_union_field_nests_inside_model() {
        #[derive(Debug, PartialEq)]
        struct Round {
            toss: Toss,
        }

        let field = UnionField::new(Arc::new(registry(CodecConfig::default())));
        let schema = ModelSchema::<Round>::builder("Round")
            .field("toss", field, |r| &r.toss)
            .construct(|f| Ok(Round { toss: f.take("toss")? }));

        let round = Round {
            toss: Toss::Tails(coin("down")),
        };
        let encoded = schema.encode(&round).unwrap();
        assert_eq!(encoded, json!({ "toss": { "type": "tails", "side": "down" } }));
        assert_eq!(schema.decode(&encoded).unwrap(), round);

        let err = schema.decode(&json!({ "toss": { "type": "bogus" } })).unwrap_err();
        assert!(matches!(err, FieldError::Nested(_)));
    }
}
