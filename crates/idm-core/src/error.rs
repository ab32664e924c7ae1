//! Repository error taxonomy.
//!
//! These are the caller-visible outcomes of repository operations. None of
//! them is retried by the repository itself; retry and backoff policy belong
//! to the orchestration layer.

use thiserror::Error;

/// Result type alias for repository operations.
pub type DaoResult<T> = std::result::Result<T, DaoError>;

/// Errors surfaced by a user repository.
#[derive(Debug, Error)]
pub enum DaoError {
    /// The entity fails the identity shape check required to compute its
    /// directory key (an active user without a usable email address).
    #[error("malformed identity: {0}")]
    MalformedIdentity(String),

    /// The directory reported a transport or protocol failure.
    #[error("directory operation failed: {0}")]
    Directory(String),

    /// The wait on a directory round trip was interrupted. Cooperative
    /// cancellation, not a directory outage.
    #[error("directory operation interrupted: {0}")]
    Interrupted(String),

    /// A search produced more results than the configured cap. The partial
    /// result set is discarded, never returned truncated.
    #[error("search exceeded the maximum of {0} results")]
    ExceededMaximumResults(usize),

    /// The addressed user does not exist in the directory.
    #[error("user not found: {0}")]
    NotFound(String),

    /// The addressed group does not exist in the directory.
    #[error("group not found: {0}")]
    GroupNotFound(String),

    /// The repository is configured read-only and rejects mutations.
    #[error("repository is read-only")]
    ReadOnly,
}

impl DaoError {
    /// Creates a malformed-identity error.
    #[must_use]
    pub fn malformed_identity(msg: impl Into<String>) -> Self {
        Self::MalformedIdentity(msg.into())
    }

    /// Creates a directory failure.
    #[must_use]
    pub fn directory(msg: impl Into<String>) -> Self {
        Self::Directory(msg.into())
    }

    /// Whether this error means "asked to stop" rather than "directory is
    /// broken".
    #[must_use]
    pub const fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted(_))
    }

    /// Whether this error originates in the directory rather than the caller.
    #[must_use]
    pub const fn is_directory_failure(&self) -> bool {
        matches!(self, Self::Directory(_) | Self::Interrupted(_))
    }
}
