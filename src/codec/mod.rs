//! Tagged union codec
//!
//! Layers, leaves first:
//! - `field`: per-field codecs (primitive, date, identifier, list)
//! - `model`: explicit field table plus constructor for one Rust type
//! - `variant`: discriminant bound to a model, erased over the payload type
//! - `registry`: variant schemas of one union, keyed by discriminant
//! - `union`: serialize / deserialize through a registry
//!
//! Registries are checked when built. Once built they are read-only and
//! can be shared across threads behind an `Arc`.

mod errors;
mod field;
mod model;
mod registry;
mod union;
mod variant;

pub use errors::{CodecError, CodecResult, FieldError, FieldResult};
pub(crate) use field::json_type_name;
pub use field::{DateCodec, FieldCodec, Identifier, List, Primitive};
pub use model::{
    Construct, DeferredSchema, FieldSpec, FieldValues, ModelSchema, ModelSchemaBuilder,
};
pub use registry::{RegistryBuilder, VariantRegistry};
pub use union::{UnionCodec, UnionField, MISSING_TAG};
pub use variant::{Tagged, VariantSchema};
