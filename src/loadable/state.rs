//! Loadable state
//!
//! `Loadable<T>` is one of exactly four variants:
//!
//! | Variant        | Wire tag       | Fields    |
//! |----------------|----------------|-----------|
//! | `NotStarted`   | `"NotStarted"` |           |
//! | `InProgress`   | `"InProgress"` |           |
//! | `Available(v)` | `"Available"`  | `value`   |
//! | `LoadError(m)` | `"LoadError"`  | `message` |
//!
//! Lifecycle: NotStarted -> InProgress -> Available | LoadError. Both
//! settled variants are terminal. `LoadError` is data, not a fault; callers
//! handle it in the same `match` as `Available`.
//!
//! `LoadableUpdate` is the value-less subset used to report the progress
//! of an update. It converts into any `Loadable<T>`.

use std::fmt::Display;
use std::sync::Arc;

use super::adapter::describe;
use crate::codec::{
    CodecResult, FieldCodec, ModelSchema, Primitive, Tagged, UnionField, VariantRegistry,
    VariantSchema,
};
use crate::config::CodecConfig;

/// Tag of the `NotStarted` variant
pub const NOT_STARTED: &str = "NotStarted";
/// Tag of the `InProgress` variant
pub const IN_PROGRESS: &str = "InProgress";
/// Tag of the `Available` variant
pub const AVAILABLE: &str = "Available";
/// Tag of the `LoadError` variant
pub const LOAD_ERROR: &str = "LoadError";

/// State of an asynchronous load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loadable<T> {
    /// No load has been requested
    NotStarted,
    /// A load is running
    InProgress,
    /// The load produced a value
    Available(T),
    /// The load failed; the message is never empty
    LoadError(String),
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Loadable::NotStarted
    }
}

impl<T> Tagged for Loadable<T> {
    fn discriminant(&self) -> &str {
        match self {
            Loadable::NotStarted => NOT_STARTED,
            Loadable::InProgress => IN_PROGRESS,
            Loadable::Available(_) => AVAILABLE,
            Loadable::LoadError(_) => LOAD_ERROR,
        }
    }
}

impl<T> Loadable<T> {
    /// Returns whether the state is terminal.
    pub fn is_settled(&self) -> bool {
        matches!(self, Loadable::Available(_) | Loadable::LoadError(_))
    }

    /// Returns the loaded value, if any.
    pub fn as_available(&self) -> Option<&T> {
        match self {
            Loadable::Available(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the failure message, if any.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Loadable::LoadError(message) => Some(message),
            _ => None,
        }
    }

    /// Maps the loaded value, keeping every other state.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Loadable<U> {
        match self {
            Loadable::NotStarted => Loadable::NotStarted,
            Loadable::InProgress => Loadable::InProgress,
            Loadable::Available(value) => Loadable::Available(f(value)),
            Loadable::LoadError(message) => Loadable::LoadError(message),
        }
    }

    /// Settles a finished result, describing the error on failure.
    pub fn from_result<E: Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Loadable::Available(value),
            Err(err) => Loadable::LoadError(describe(&err)),
        }
    }

    fn load_error_message(&self) -> Option<&String> {
        match self {
            Loadable::LoadError(message) => Some(message),
            _ => None,
        }
    }
}

impl<T: Send + 'static> Loadable<T> {
    /// Builds the registry of all four variants, using `value_codec` for
    /// the payload of `Available`.
    pub fn registry<C>(value_codec: C) -> CodecResult<VariantRegistry<Self>>
    where
        C: FieldCodec<T> + 'static,
    {
        Self::registry_with_config(value_codec, CodecConfig::default())
    }

    /// Same as `registry` with an explicit codec configuration.
    pub fn registry_with_config<C>(
        value_codec: C,
        config: CodecConfig,
    ) -> CodecResult<VariantRegistry<Self>>
    where
        C: FieldCodec<T> + 'static,
    {
        VariantRegistry::builder()
            .config(config)
            .variant(VariantSchema::<Self>::unit(
                NOT_STARTED,
                |state| matches!(state, Loadable::NotStarted),
                || Loadable::NotStarted,
            ))
            .variant(VariantSchema::<Self>::unit(
                IN_PROGRESS,
                |state| matches!(state, Loadable::InProgress),
                || Loadable::InProgress,
            ))
            .variant(VariantSchema::<Self>::new(
                AVAILABLE,
                Loadable::as_available,
                Loadable::Available,
                ModelSchema::<T>::builder(AVAILABLE)
                    .field("value", value_codec, |value| value)
                    .construct(|f| f.take("value")),
            ))
            .variant(VariantSchema::<Self>::new(
                LOAD_ERROR,
                Loadable::load_error_message,
                Loadable::LoadError,
                message_schema(),
            ))
            .build()
    }

    /// Builds a field codec for a `Loadable<T>` nested inside a model.
    pub fn field<C>(value_codec: C) -> CodecResult<UnionField<Self>>
    where
        C: FieldCodec<T> + 'static,
    {
        Self::field_with_config(value_codec, CodecConfig::default())
    }

    /// Same as `field` with an explicit codec configuration.
    pub fn field_with_config<C>(
        value_codec: C,
        config: CodecConfig,
    ) -> CodecResult<UnionField<Self>>
    where
        C: FieldCodec<T> + 'static,
    {
        let registry = Self::registry_with_config(value_codec, config)?;
        Ok(UnionField::new(Arc::new(registry)))
    }
}

/// Progress of an update that carries no value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadableUpdate {
    /// No update has been requested
    #[default]
    NotStarted,
    /// An update is running
    InProgress,
    /// The update failed
    LoadError(String),
}

impl Tagged for LoadableUpdate {
    fn discriminant(&self) -> &str {
        match self {
            LoadableUpdate::NotStarted => NOT_STARTED,
            LoadableUpdate::InProgress => IN_PROGRESS,
            LoadableUpdate::LoadError(_) => LOAD_ERROR,
        }
    }
}

impl LoadableUpdate {
    /// Returns whether the update failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, LoadableUpdate::LoadError(_))
    }

    /// Builds the registry of the three update variants.
    pub fn registry() -> CodecResult<VariantRegistry<Self>> {
        Self::registry_with_config(CodecConfig::default())
    }

    /// Same as `registry` with an explicit codec configuration.
    pub fn registry_with_config(config: CodecConfig) -> CodecResult<VariantRegistry<Self>> {
        VariantRegistry::builder()
            .config(config)
            .variant(VariantSchema::<Self>::unit(
                NOT_STARTED,
                |state| matches!(state, LoadableUpdate::NotStarted),
                || LoadableUpdate::NotStarted,
            ))
            .variant(VariantSchema::<Self>::unit(
                IN_PROGRESS,
                |state| matches!(state, LoadableUpdate::InProgress),
                || LoadableUpdate::InProgress,
            ))
            .variant(VariantSchema::<Self>::new(
                LOAD_ERROR,
                |state| match state {
                    LoadableUpdate::LoadError(message) => Some(message),
                    _ => None,
                },
                LoadableUpdate::LoadError,
                message_schema(),
            ))
            .build()
    }

    /// Builds a field codec for a `LoadableUpdate` nested inside a model.
    pub fn field() -> CodecResult<UnionField<Self>> {
        Self::field_with_config(CodecConfig::default())
    }

    /// Same as `field` with an explicit codec configuration.
    pub fn field_with_config(config: CodecConfig) -> CodecResult<UnionField<Self>> {
        Ok(UnionField::new(Arc::new(Self::registry_with_config(config)?)))
    }
}

impl<T> From<LoadableUpdate> for Loadable<T> {
    fn from(update: LoadableUpdate) -> Self {
        match update {
            LoadableUpdate::NotStarted => Loadable::NotStarted,
            LoadableUpdate::InProgress => Loadable::InProgress,
            LoadableUpdate::LoadError(message) => Loadable::LoadError(message),
        }
    }
}

fn message_schema() -> ModelSchema<String> {
    ModelSchema::<String>::builder(LOAD_ERROR)
        .field("message", Primitive, |message| message)
        .construct(|f| f.take("message"))
}
