//! Variant registry
//!
//! Holds the variant schemas of one union type, keyed by discriminant.
//!
//! - Discriminants are unique; a duplicate is a configuration error raised
//!   by `register` (or `RegistryBuilder::build`), never at first use
//! - Field tables are checked when registered (no repeated field names,
//!   no field named like the tag field)
//! - Registration order is kept for listings and error messages only;
//!   dispatch is an exact-match lookup
//! - A built registry is never mutated by the codecs that use it

use std::collections::HashMap;

use super::errors::{CodecError, CodecResult};
use super::variant::{Tagged, VariantSchema};
use crate::config::CodecConfig;
use crate::observability::{log_event_with_fields, Event};

/// Ordered set of variant schemas for the union `U`.
#[derive(Debug)]
pub struct VariantRegistry<U> {
    config: CodecConfig,
    variants: Vec<VariantSchema<U>>,
    index: HashMap<&'static str, usize>,
}

impl<U> Default for VariantRegistry<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> VariantRegistry<U> {
    /// Creates an empty registry with the default configuration.
    pub fn new() -> Self {
        Self::with_config(CodecConfig::default())
    }

    /// Creates an empty registry.
    pub fn with_config(config: CodecConfig) -> Self {
        Self {
            config,
            variants: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Starts a registry that is checked as a whole when built.
    pub fn builder() -> RegistryBuilder<U> {
        RegistryBuilder {
            config: CodecConfig::default(),
            variants: Vec::new(),
        }
    }

    /// Returns the codec configuration.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Registers a variant schema.
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` if the registry's configuration is invalid
    /// - `DuplicateDiscriminant` if the discriminant is already registered
    /// - `DuplicateField` / `ReservedField` if the field table is invalid
    pub fn register(&mut self, schema: VariantSchema<U>) -> CodecResult<()> {
        self.config.validate()?;
        let discriminant = schema.discriminant();

        if self.index.contains_key(discriminant) {
            return Err(CodecError::DuplicateDiscriminant(discriminant.to_string()));
        }
        schema.validate_fields(&self.config.tag_field)?;

        let field_count = schema.fields().len().to_string();
        log_event_with_fields(
            Event::VariantRegistered,
            &[("discriminant", discriminant), ("fields", &field_count)],
        );

        self.index.insert(discriminant, self.variants.len());
        self.variants.push(schema);
        Ok(())
    }

    /// Finds the schema registered under an exact discriminant.
    pub fn lookup_by_discriminant(&self, tag: &str) -> Option<&VariantSchema<U>> {
        self.index.get(tag).map(|&position| &self.variants[position])
    }

    /// Finds the schema for a value by the value's own discriminant.
    pub fn lookup_by_instance(&self, value: &U) -> Option<&VariantSchema<U>>
    where
        U: Tagged,
    {
        self.lookup_by_discriminant(value.discriminant())
    }

    /// Returns the registered discriminants in registration order.
    pub fn discriminants(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.variants.iter().map(|schema| schema.discriminant())
    }

    /// Returns the number of registered variants.
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Returns whether no variant is registered.
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

/// Collects variant schemas and validates them together.
pub struct RegistryBuilder<U> {
    config: CodecConfig,
    variants: Vec<VariantSchema<U>>,
}

impl<U> RegistryBuilder<U> {
    /// Sets the codec configuration.
    pub fn config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds a variant schema.
    pub fn variant(mut self, schema: VariantSchema<U>) -> Self {
        self.variants.push(schema);
        self
    }

    /// Builds the registry, failing on the first configuration error.
    pub fn build(self) -> CodecResult<VariantRegistry<U>> {
        let registry = self.assemble().map_err(|err| {
            log_event_with_fields(
                Event::RegistryRejected,
                &[("code", err.code()), ("reason", &err.to_string())],
            );
            err
        })?;

        let discriminants = registry.discriminants().collect::<Vec<_>>().join(",");
        log_event_with_fields(Event::RegistryBuilt, &[("variants", &discriminants)]);
        Ok(registry)
    }

    fn assemble(self) -> CodecResult<VariantRegistry<U>> {
        self.config.validate()?;
        let mut registry = VariantRegistry::with_config(self.config);
        for schema in self.variants {
            registry.register(schema)?;
        }
        Ok(registry)
    }
}
