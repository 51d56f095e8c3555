//! Loadable values
//!
//! - `state`: the `Loadable<T>` and `LoadableUpdate` unions and their
//!   registries
//! - `adapter`: derives a `Loadable<T>` from the outcome of an async
//!   operation

mod adapter;
mod state;

pub use adapter::{describe, from_async_operation, settle, LoadableHandle, LOAD_ERROR_PREFIX};
pub use state::{Loadable, LoadableUpdate, AVAILABLE, IN_PROGRESS, LOAD_ERROR, NOT_STARTED};
