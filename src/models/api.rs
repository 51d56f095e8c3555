//! Simulated notes API

use std::time::Duration;

use chrono::Utc;
use thiserror::Error;

use super::note::Note;

/// Default simulated latency
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(500);

/// Result type for API calls
pub type ApiResult<T> = Result<T, ApiError>;

/// Simulated API failures
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("service '{0}' is unavailable")]
    Unavailable(String),
}

/// Returns a fresh note after `latency`.
///
/// The note id is the current UTC time in RFC 2822 form.
pub async fn fetch_updated_note(latency: Duration) -> ApiResult<Note> {
    tokio::time::sleep(latency).await;
    Ok(Note::new(
        Utc::now().to_rfc2822(),
        "Sample note from fake API",
    ))
}

/// Fails after `latency`.
pub async fn fetch_note_from_offline_service(latency: Duration) -> ApiResult<Note> {
    tokio::time::sleep(latency).await;
    Err(ApiError::Unavailable("notes".to_string()))
}
