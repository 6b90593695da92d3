//! Error taxonomy. Each failure the host can see maps to exactly one variant;
//! persistence failures never invalidate in-memory state.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Bad user input (empty category label, non-numeric amount). Recoverable by re-entry.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Local store read/write failure. Logged and reported; the in-memory
    /// ledger stays authoritative for the session.
    #[error("Persistence failed: {0}")]
    Persistence(String),

    /// OCR or extraction service unreachable, or a non-success HTTP status.
    #[error("Network error: {0}")]
    Network(String),

    /// Service replied but the payload could not be used. The raw body is
    /// retained for diagnostics, never silently discarded.
    #[error("Malformed service response: {message}")]
    MalformedResponse { message: String, raw: String },

    /// Operation issued in a state that cannot serve it (storage not
    /// initialized, service config missing).
    #[error("Invalid state: {0}")]
    State(String),
}

impl From<rusqlite::Error> for CoreError {
    fn from(e: rusqlite::Error) -> Self {
        CoreError::Persistence(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        CoreError::Network(e.to_string())
    }
}
