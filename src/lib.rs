//! tagwire - tagged union codec for JSON values
//!
//! - `codec`: variant registries and the union codec
//! - `loadable`: the `Loadable<T>` state union and its async adapter
//! - `models`: sample domain models (user, email, note, message)
//! - `config`, `observability`, `cli`: ambient support for the binary

pub mod cli;
pub mod codec;
pub mod config;
pub mod loadable;
pub mod models;
pub mod observability;
