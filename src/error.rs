//! Fatal import errors.
//!
//! Per-title misses and duplicate claims are not errors: they are recorded in
//! the import result as [`crate::models::UnmatchedReason`] values and the run
//! continues. Everything here aborts the whole import with no partial result.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    /// No `list=` parameter could be found in the supplied URL.
    #[error("invalid playlist URL: {0}")]
    InvalidPlaylistUrl(String),

    /// The playlist API answered with a non-success status.
    #[error("playlist source unavailable for '{playlist_id}' (HTTP {status})")]
    SourceUnavailable { status: u16, playlist_id: String },

    /// The request never produced a status (DNS, TLS, timeout...).
    #[error("playlist source request failed: {0}")]
    Transport(String),

    /// A page body did not have the documented JSON shape.
    #[error("malformed playlist page: {0}")]
    MalformedResponse(String),

    /// The local library snapshot has no records to match against.
    #[error("local library is empty, nothing to match against")]
    EmptyLibrary,

    /// The orchestrator has already run (or failed) once.
    #[error("import already ran on this orchestrator")]
    AlreadyRun,
}

pub type ImportOutcome<T> = Result<T, ImportError>;
