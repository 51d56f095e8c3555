//! Sample domain models
//!
//! Each model declares its field table next to its type. Unions nest via
//! `UnionField`; loadable fields via `Loadable::field_with_config`.

pub mod api;
mod email;
mod message;
mod note;
mod user;

pub use email::{Address, UnverifiedEmail, UserEmail, VerifiedEmail};
pub use message::{Author, Message};
pub use note::Note;
pub use user::User;
