//! Loadable Lifecycle Tests
//!
//! - A started load reads InProgress before it settles
//! - Success settles once as Available, failure once as LoadError
//! - LoadError messages are never empty
//! - Settled states serialize through the union codec

use std::time::Duration;

use serde_json::json;
use tagwire::codec::UnionCodec;
use tagwire::loadable::{from_async_operation, settle, Loadable, LOAD_ERROR_PREFIX};
use tagwire::models::api::{fetch_note_from_offline_service, fetch_updated_note};
use tagwire::models::Note;
use tokio::sync::oneshot;

// =============================================================================
// Lifecycle Tests
// =============================================================================

/// InProgress is visible immediately; the value arrives once.
#[tokio::test]
async fn test_in_progress_then_available() {
    let (release, gate) = oneshot::channel();
    let mut handle = from_async_operation(async move {
        gate.await.map_err(|e| e.to_string())
    });

    assert_eq!(handle.current(), Loadable::InProgress);

    release.send(Note::new("id1234", "note text")).unwrap();
    let state = handle.settled().await;
    assert_eq!(state, Loadable::Available(Note::new("id1234", "note text")));
    assert_eq!(handle.current(), state);
}

/// A failing operation settles as LoadError with a non-empty message.
#[tokio::test]
async fn test_failure_message_is_derived_from_cause() {
    let mut handle = from_async_operation(fetch_note_from_offline_service(Duration::from_millis(1)));
    let state = handle.settled().await;

    let message = state.error_message().unwrap();
    assert!(message.starts_with(LOAD_ERROR_PREFIX));
    assert!(message.contains("unavailable"));
}

/// An operation failing with a blank error still yields a message.
#[tokio::test]
async fn test_blank_error_still_described() {
    let state = settle(async { Err::<Note, _>(String::new()) }).await;
    let message = state.error_message().unwrap();
    assert!(message.len() > LOAD_ERROR_PREFIX.len() + 2);
}

/// The fake API settles as Available through the adapter.
#[tokio::test]
async fn test_fake_api_note() {
    let mut handle = from_async_operation(fetch_updated_note(Duration::from_millis(1)));
    let note = handle.settled().await.as_available().cloned().unwrap();
    assert_eq!(note.text, "Sample note from fake API");
}

// =============================================================================
// Wire Tests
// =============================================================================

/// Each lifecycle stage has its documented wire shape.
#[tokio::test]
async fn test_lifecycle_states_on_the_wire() {
    let registry = Loadable::registry(Note::schema()).unwrap();
    let codec = UnionCodec::new(&registry);

    let (release, gate) = oneshot::channel::<()>();
    let mut handle = from_async_operation(async move {
        let _ = gate.await;
        Err::<Note, _>("timeout")
    });

    assert_eq!(
        codec.serialize(&handle.current()).unwrap(),
        json!({ "type": "InProgress" })
    );

    release.send(()).unwrap();
    assert_eq!(
        codec.serialize(&handle.settled().await).unwrap(),
        json!({ "type": "LoadError", "message": "Something happened: timeout" })
    );
}
