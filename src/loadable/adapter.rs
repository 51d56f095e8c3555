//! Loadable adapter
//!
//! Turns a single-shot async operation into a `Loadable<T>`.
//!
//! `from_async_operation` spawns the operation on the current Tokio runtime
//! and returns a handle that reads `InProgress` immediately. The spawned
//! task owns the only `watch::Sender` and writes the terminal state once,
//! so a handle can never observe two settlements or a step back.
//!
//! This is the only place a free-form error becomes a `LoadError` message.
//! `describe` never fails and never returns an empty message.

use std::any::{type_name, Any};
use std::fmt::Display;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

use futures_util::FutureExt;
use tokio::sync::watch;

use super::state::Loadable;
use crate::observability::{log_event, log_event_with_fields, Event};

/// Prefix of every `LoadError` message produced by the adapter
pub const LOAD_ERROR_PREFIX: &str = "Something happened";

/// Describes an operation failure as a `LoadError` message.
///
/// Falls back to the error's type name when its `Display` output is blank
/// or when the `Display` impl panics.
pub fn describe<E: Display + ?Sized>(error: &E) -> String {
    let rendered = panic::catch_unwind(AssertUnwindSafe(|| error.to_string()))
        .ok()
        .filter(|text| !text.trim().is_empty())
        .unwrap_or_else(|| type_name::<E>().to_string());
    format!("{}: {}", LOAD_ERROR_PREFIX, rendered)
}

fn describe_panic(payload: Box<dyn Any + Send>) -> String {
    let reason = if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic payload".to_string()
    };
    describe(&format!("operation panicked: {}", reason))
}

/// Awaits an operation and maps its outcome to a settled `Loadable`.
///
/// A panic inside the operation settles as `LoadError`.
pub async fn settle<T, E, F>(operation: F) -> Loadable<T>
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    let message = match AssertUnwindSafe(operation).catch_unwind().await {
        Ok(Ok(value)) => {
            log_event(Event::LoadAvailable);
            return Loadable::Available(value);
        }
        Ok(Err(err)) => describe(&err),
        Err(payload) => describe_panic(payload),
    };
    log_event_with_fields(Event::LoadFailed, &[("message", &message)]);
    Loadable::LoadError(message)
}

/// Starts an operation and returns a handle observing its state.
///
/// Must be called from within a Tokio runtime. Dropping the handle does
/// not cancel the operation.
pub fn from_async_operation<T, E, F>(operation: F) -> LoadableHandle<T>
where
    F: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + Sync + 'static,
    E: Display + Send + 'static,
{
    let (sender, receiver) = watch::channel(Loadable::InProgress);
    log_event(Event::LoadStarted);

    tokio::spawn(async move {
        let settled = settle(operation).await;
        sender.send_replace(settled);
    });

    LoadableHandle { receiver }
}

/// Read side of a load started by `from_async_operation`.
#[derive(Debug)]
pub struct LoadableHandle<T> {
    receiver: watch::Receiver<Loadable<T>>,
}

impl<T: Clone> LoadableHandle<T> {
    /// Returns the current state without waiting.
    pub fn current(&self) -> Loadable<T> {
        self.receiver.borrow().clone()
    }

    /// Returns whether the load has settled.
    pub fn is_settled(&self) -> bool {
        self.receiver.borrow().is_settled()
    }

    /// Waits for the terminal state.
    ///
    /// If the task is torn down before writing (runtime shutdown), the load
    /// settles as `LoadError`.
    pub async fn settled(&mut self) -> Loadable<T> {
        match self.receiver.wait_for(Loadable::is_settled).await {
            Ok(state) => (*state).clone(),
            Err(_) => Loadable::LoadError(describe("operation was dropped before settling")),
        }
    }
}

impl<T> Clone for LoadableHandle<T> {
    fn clone(&self) -> Self {
        Self {
            receiver: self.receiver.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;
    use std::time::Duration;
    use tokio::sync::oneshot;

    struct Blank;

    impl fmt::Display for Blank {
        fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
            Ok(())
        }
    }

    struct Exploding;

    impl fmt::Display for Exploding {
        fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
            panic!("display exploded")
        }
    }

    #[test]
    fn test_describe_prefixes_cause() {
        assert_eq!(describe("timeout"), "Something happened: timeout");
        assert_eq!(describe(&42), "Something happened: 42");
    }

    #[test]
    fn test_describe_never_empty() {
        let message = describe(&Blank);
        assert!(message.starts_with("Something happened: "));
        assert!(message.ends_with("Blank"));
    }

    #[test]
    fn test_describe_contains_panicking_display() {
        let message = describe(&Exploding);
        assert!(message.ends_with("Exploding"));
    }

    #[tokio::test]
    async fn test_settle_success_and_failure() {
        let ok = settle(async { Ok::<_, String>(5) }).await;
        assert_eq!(ok, Loadable::Available(5));

        let failed = settle(async { Err::<u8, _>("disk full") }).await;
        assert_eq!(failed, Loadable::LoadError("Something happened: disk full".into()));
    }

    #[tokio::test]
    async fn test_settle_contains_panic() {
        let state = settle(async {
            if true {
                panic!("kaboom");
            }
            Ok::<u8, String>(1)
        })
        .await;
        let message = state.error_message().unwrap();
        assert!(message.starts_with("Something happened: "));
        assert!(message.contains("kaboom"));
    }

    #[tokio::test]
    async fn test_in_progress_before_settlement() {
        let (release, gate) = oneshot::channel::<u32>();
        let mut handle = from_async_operation(async move {
            gate.await.map_err(|_| "gate closed".to_string())
        });

        assert_eq!(handle.current(), Loadable::InProgress);
        assert!(!handle.is_settled());

        release.send(9).unwrap();
        assert_eq!(handle.settled().await, Loadable::Available(9));
        assert!(handle.is_settled());
    }

    #[tokio::test]
    async fn test_failure_settles_as_load_error() {
        let mut handle = from_async_operation(async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Err::<String, _>("connection reset")
        });

        let state = handle.settled().await;
        assert_eq!(
            state,
            Loadable::LoadError("Something happened: connection reset".into())
        );
    }

    #[tokio::test]
    async fn test_settles_exactly_once() {
        let mut handle = from_async_operation(async { Ok::<_, String>("done".to_string()) });
        let mut observer = handle.clone();

        let first = handle.settled().await;
        let second = observer.settled().await;
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert_eq!(first, Loadable::Available("done".to_string()));
        assert_eq!(second, first);
        assert_eq!(handle.current(), first);
    }

    #[tokio::test]
    async fn test_dropped_handle_does_not_cancel() {
        let (done, finished) = oneshot::channel();
        let handle = from_async_operation(async move {
            let _ = done.send(());
            Ok::<_, String>(1)
        });
        drop(handle);
        assert!(finished.await.is_ok());
    }
}
