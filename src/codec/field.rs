//! Field codecs
//!
//! A field codec converts one typed field to and from its wire value. The
//! union machinery never looks inside field values; everything it knows
//! about a field is the codec registered for it.
//!
//! Provided codecs:
//! - `Primitive`: serde pass-through for strings, numbers, bools, lists
//! - `DateCodec`: `DateTime<Utc>` as RFC 3339 text or epoch milliseconds
//! - `Identifier`: non-empty string identifiers (`String`, `Uuid`, ...)
//! - `List`: a JSON array whose elements go through another codec
//!
//! Nested objects use `ModelSchema` and nested unions use `UnionField`,
//! both of which implement `FieldCodec` as well.

use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::errors::{FieldError, FieldResult};

/// Converts a single typed field to and from a wire value.
pub trait FieldCodec<T>: Send + Sync {
    /// Encodes a field value.
    fn encode(&self, value: &T) -> FieldResult<Value>;

    /// Decodes a non-null wire value.
    fn decode(&self, wire: &Value) -> FieldResult<T>;

    /// Decodes a wire `null`. Only codecs whose values encode to `null`
    /// accept it.
    fn decode_null(&self) -> FieldResult<T> {
        Err(FieldError::Null)
    }
}

/// Decodes any wire value, routing `null` to `decode_null`.
pub(crate) fn decode_wire<T, C>(codec: &C, wire: &Value) -> FieldResult<T>
where
    C: FieldCodec<T> + ?Sized,
{
    match wire {
        Value::Null => codec.decode_null(),
        wire => codec.decode(wire),
    }
}

impl<T, C> FieldCodec<T> for Arc<C>
where
    C: FieldCodec<T> + ?Sized,
{
    fn encode(&self, value: &T) -> FieldResult<Value> {
        (**self).encode(value)
    }

    fn decode(&self, wire: &Value) -> FieldResult<T> {
        (**self).decode(wire)
    }

    fn decode_null(&self) -> FieldResult<T> {
        (**self).decode_null()
    }
}

/// Serde pass-through codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct Primitive;

impl<T> FieldCodec<T> for Primitive
where
    T: Serialize + DeserializeOwned,
{
    fn encode(&self, value: &T) -> FieldResult<Value> {
        Ok(serde_json::to_value(value)?)
    }

    fn decode(&self, wire: &Value) -> FieldResult<T> {
        Ok(T::deserialize(wire)?)
    }

    /// `()` and `Option<_>` decode from `null`; everything else is `Null`.
    fn decode_null(&self) -> FieldResult<T> {
        T::deserialize(&Value::Null).map_err(|_| FieldError::Null)
    }
}

/// Wire encoding for dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateCodec {
    /// RFC 3339 text with `Z` offset, sub-second digits kept as needed
    #[default]
    Rfc3339,
    /// Integer milliseconds since the Unix epoch
    EpochMillis,
}

impl FieldCodec<DateTime<Utc>> for DateCodec {
    fn encode(&self, value: &DateTime<Utc>) -> FieldResult<Value> {
        match self {
            DateCodec::Rfc3339 => Ok(Value::String(
                value.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            )),
            DateCodec::EpochMillis => Ok(Value::from(value.timestamp_millis())),
        }
    }

    fn decode(&self, wire: &Value) -> FieldResult<DateTime<Utc>> {
        match self {
            DateCodec::Rfc3339 => {
                let text = wire.as_str().ok_or_else(|| FieldError::TypeMismatch {
                    expected: "string",
                    actual: json_type_name(wire),
                })?;
                DateTime::parse_from_rfc3339(text)
                    .map(|date| date.with_timezone(&Utc))
                    .map_err(|e| FieldError::InvalidDate(format!("'{}': {}", text, e)))
            }
            DateCodec::EpochMillis => {
                let millis = wire.as_i64().ok_or_else(|| FieldError::TypeMismatch {
                    expected: "int",
                    actual: json_type_name(wire),
                })?;
                Utc.timestamp_millis_opt(millis).single().ok_or_else(|| {
                    FieldError::InvalidDate(format!("{} ms is out of range", millis))
                })
            }
        }
    }
}

/// String identifier codec.
///
/// Works for any type that round-trips through its `Display` and `FromStr`
/// impls. Empty identifiers are rejected in both directions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identifier;

impl<T> FieldCodec<T> for Identifier
where
    T: Display + FromStr,
    T::Err: Display,
{
    fn encode(&self, value: &T) -> FieldResult<Value> {
        let text = value.to_string();
        if text.is_empty() {
            return Err(FieldError::InvalidIdentifier("empty identifier".into()));
        }
        Ok(Value::String(text))
    }

    fn decode(&self, wire: &Value) -> FieldResult<T> {
        let text = wire.as_str().ok_or_else(|| FieldError::TypeMismatch {
            expected: "string",
            actual: json_type_name(wire),
        })?;
        if text.is_empty() {
            return Err(FieldError::InvalidIdentifier("empty identifier".into()));
        }
        text.parse::<T>()
            .map_err(|e| FieldError::InvalidIdentifier(format!("'{}': {}", text, e)))
    }
}

/// Array codec applying an element codec to every entry.
///
/// Failures name the offending index. `null` entries go to the element
/// codec's `decode_null`.
#[derive(Debug, Clone, Copy, Default)]
pub struct List<C>(pub C);

impl<T, C> FieldCodec<Vec<T>> for List<C>
where
    C: FieldCodec<T>,
{
    fn encode(&self, values: &Vec<T>) -> FieldResult<Value> {
        values
            .iter()
            .enumerate()
            .map(|(index, value)| self.0.encode(value).map_err(|e| e.at_index(index)))
            .collect::<FieldResult<Vec<_>>>()
            .map(Value::Array)
    }

    fn decode(&self, wire: &Value) -> FieldResult<Vec<T>> {
        let items = wire.as_array().ok_or_else(|| FieldError::TypeMismatch {
            expected: "array",
            actual: json_type_name(wire),
        })?;
        items
            .iter()
            .enumerate()
            .map(|(index, item)| decode_wire(&self.0, item).map_err(|e| e.at_index(index)))
            .collect()
    }
}

/// Returns the JSON type name for error messages.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "int"
            } else {
                "float"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn sample_date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_primitive_passes_through() {
        let encoded = FieldCodec::<String>::encode(&Primitive, &"a@example.com".to_string()).unwrap();
        assert_eq!(encoded, json!("a@example.com"));

        let decoded: Vec<u32> = Primitive.decode(&json!([1, 2, 3])).unwrap();
        assert_eq!(decoded, vec![1, 2, 3]);
    }

    #[test]
    fn test_primitive_rejects_wrong_type() {
        let result: FieldResult<String> = Primitive.decode(&json!(42));
        assert!(matches!(result, Err(FieldError::Serde(_))));
    }

    #[test]
    fn test_rfc3339_date() {
        let encoded = DateCodec::Rfc3339.encode(&sample_date()).unwrap();
        assert_eq!(encoded, json!("2024-03-01T12:30:00Z"));
        assert_eq!(DateCodec::Rfc3339.decode(&encoded).unwrap(), sample_date());
    }

    #[test]
    fn test_rfc3339_keeps_subsecond_precision() {
        let date = sample_date() + chrono::Duration::nanoseconds(123_456_789);
        let encoded = DateCodec::Rfc3339.encode(&date).unwrap();
        assert_eq!(DateCodec::Rfc3339.decode(&encoded).unwrap(), date);
    }

    #[test]
    fn test_rfc3339_normalizes_offset() {
        let decoded = DateCodec::Rfc3339
            .decode(&json!("2024-03-01T14:30:00+02:00"))
            .unwrap();
        assert_eq!(decoded, sample_date());
    }

    #[test]
    fn test_invalid_date_text() {
        let result = DateCodec::Rfc3339.decode(&json!("yesterday"));
        match result {
            Err(FieldError::InvalidDate(msg)) => assert!(msg.contains("yesterday")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_epoch_millis_date() {
        let encoded = DateCodec::EpochMillis.encode(&sample_date()).unwrap();
        assert_eq!(encoded, json!(1_709_296_200_000i64));
        assert_eq!(DateCodec::EpochMillis.decode(&encoded).unwrap(), sample_date());

        let result = DateCodec::EpochMillis.decode(&json!("1709296200000"));
        assert!(matches!(
            result,
            Err(FieldError::TypeMismatch {
                expected: "int",
                actual: "string"
            })
        ));
    }

    #[test]
    fn test_identifier_string() {
        let decoded: String = Identifier.decode(&json!("id1234")).unwrap();
        assert_eq!(decoded, "id1234");

        let result: FieldResult<String> = Identifier.decode(&json!(""));
        assert!(matches!(result, Err(FieldError::InvalidIdentifier(_))));

        let result = FieldCodec::<String>::encode(&Identifier, &String::new());
        assert!(matches!(result, Err(FieldError::InvalidIdentifier(_))));
    }

    #[test]
    fn test_identifier_uuid() {
        let id = Uuid::new_v4();
        let encoded = Identifier.encode(&id).unwrap();
        assert_eq!(encoded, json!(id.to_string()));
        let decoded: Uuid = Identifier.decode(&encoded).unwrap();
        assert_eq!(decoded, id);

        let result: FieldResult<Uuid> = Identifier.decode(&json!("not-a-uuid"));
        assert!(matches!(result, Err(FieldError::InvalidIdentifier(_))));
    }

    #[test]
    fn test_primitive_null_only_for_nullable_types() {
        let _: () = Primitive.decode_null().unwrap();
        let absent: Option<String> = Primitive.decode_null().unwrap();
        assert_eq!(absent, None);

        let result: FieldResult<String> = Primitive.decode_null();
        assert!(matches!(result, Err(FieldError::Null)));
        let result = FieldCodec::<DateTime<Utc>>::decode_null(&DateCodec::Rfc3339);
        assert!(matches!(result, Err(FieldError::Null)));
    }

    #[test]
    fn test_list_of_dates() {
        let codec = List(DateCodec::EpochMillis);
        let dates = vec![sample_date(), sample_date() + chrono::Duration::seconds(1)];

        let encoded = codec.encode(&dates).unwrap();
        assert_eq!(encoded, json!([1_709_296_200_000i64, 1_709_296_201_000i64]));
        assert_eq!(codec.decode(&encoded).unwrap(), dates);
        assert_eq!(codec.decode(&json!([])).unwrap(), Vec::<DateTime<Utc>>::new());
    }

    #[test]
    fn test_list_reports_failing_index() {
        let codec = List(Identifier);
        let result: FieldResult<Vec<String>> = codec.decode(&json!(["a", "b", ""]));
        match result {
            Err(FieldError::Element { index, source }) => {
                assert_eq!(index, 2);
                assert!(matches!(*source, FieldError::InvalidIdentifier(_)));
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let result: FieldResult<Vec<String>> = codec.decode(&json!(["a", null]));
        assert!(matches!(result, Err(FieldError::Element { index: 1, .. })));

        let result: FieldResult<Vec<String>> = codec.decode(&json!({ "0": "a" }));
        assert!(matches!(
            result,
            Err(FieldError::TypeMismatch {
                expected: "array",
                actual: "object"
            })
        ));
    }

    #[test]
    fn test_json_type_names() {
        assert_eq!(json_type_name(&json!(null)), "null");
        assert_eq!(json_type_name(&json!(1)), "int");
        assert_eq!(json_type_name(&json!(1.5)), "float");
        assert_eq!(json_type_name(&json!({})), "object");
    }
}
