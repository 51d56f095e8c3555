//! User email union
//!
//! ```json
//! { "type": "verified", "address": "a@example.com", "verificationDate": "2024-03-01T12:30:00Z" }
//! { "type": "unverified", "address": "b@example.com" }
//! ```

use chrono::{DateTime, Utc};

use crate::codec::{
    CodecResult, DateCodec, ModelSchema, Primitive, Tagged, VariantRegistry, VariantSchema,
};
use crate::config::CodecConfig;

/// Email address
pub type Address = String;

/// An address the user has confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedEmail {
    pub address: Address,
    pub verification_date: DateTime<Utc>,
}

impl VerifiedEmail {
    /// Wire tag
    pub const TYPE: &'static str = "verified";

    pub fn new(address: impl Into<Address>, verification_date: DateTime<Utc>) -> Self {
        Self {
            address: address.into(),
            verification_date,
        }
    }

    /// Field table
    pub fn schema() -> ModelSchema<Self> {
        ModelSchema::<Self>::builder(Self::TYPE)
            .field("address", Primitive, |email| &email.address)
            .field("verificationDate", DateCodec::Rfc3339, |email| {
                &email.verification_date
            })
            .construct(|f| {
                Ok(VerifiedEmail {
                    address: f.take("address")?,
                    verification_date: f.take("verificationDate")?,
                })
            })
    }
}

/// An address still waiting for confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnverifiedEmail {
    pub address: Address,
}

impl UnverifiedEmail {
    /// Wire tag
    pub const TYPE: &'static str = "unverified";

    pub fn new(address: impl Into<Address>) -> Self {
        Self {
            address: address.into(),
        }
    }

    /// Field table
    pub fn schema() -> ModelSchema<Self> {
        ModelSchema::<Self>::builder(Self::TYPE)
            .field("address", Primitive, |email| &email.address)
            .construct(|f| {
                Ok(UnverifiedEmail {
                    address: f.take("address")?,
                })
            })
    }
}

/// Email of a user, verified or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserEmail {
    Verified(VerifiedEmail),
    Unverified(UnverifiedEmail),
}

impl Tagged for UserEmail {
    fn discriminant(&self) -> &str {
        match self {
            UserEmail::Verified(_) => VerifiedEmail::TYPE,
            UserEmail::Unverified(_) => UnverifiedEmail::TYPE,
        }
    }
}

impl UserEmail {
    /// Returns the address regardless of verification.
    pub fn address(&self) -> &str {
        match self {
            UserEmail::Verified(email) => &email.address,
            UserEmail::Unverified(email) => &email.address,
        }
    }

    /// Returns whether the address is verified.
    pub fn is_verified(&self) -> bool {
        matches!(self, UserEmail::Verified(_))
    }

    /// Builds the registry of both email variants.
    pub fn registry(config: CodecConfig) -> CodecResult<VariantRegistry<Self>> {
        VariantRegistry::builder()
            .config(config)
            .variant(verified_variant())
            .variant(unverified_variant())
            .build()
    }

    /// Builds a registry missing the `verified` variant.
    ///
    /// Serializing a verified email through it fails with
    /// `UnregisteredVariant`.
    pub fn incomplete_registry(config: CodecConfig) -> CodecResult<VariantRegistry<Self>> {
        VariantRegistry::builder()
            .config(config)
            .variant(unverified_variant())
            .build()
    }
}

fn verified_variant() -> VariantSchema<UserEmail> {
    VariantSchema::<UserEmail>::new(
        VerifiedEmail::TYPE,
        |email| match email {
            UserEmail::Verified(verified) => Some(verified),
            _ => None,
        },
        UserEmail::Verified,
        VerifiedEmail::schema(),
    )
}

fn unverified_variant() -> VariantSchema<UserEmail> {
    VariantSchema::<UserEmail>::new(
        UnverifiedEmail::TYPE,
        |email| match email {
            UserEmail::Unverified(unverified) => Some(unverified),
            _ => None,
        },
        UserEmail::Unverified,
        UnverifiedEmail::schema(),
    )
}
