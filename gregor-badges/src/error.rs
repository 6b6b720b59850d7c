//! Error types for gregor actions and badge publishing.

use gregor_dispatch::DispatchError;

/// Errors raised while decoding actions, parsing ids, or publishing badges.
#[derive(Debug, thiserror::Error)]
pub enum BadgeError {
    /// A JSON encode/decode failure.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// An envelope carried a type tag this crate does not produce.
    #[error("unknown action type: {0}")]
    UnknownActionType(String),

    /// An envelope's `error` flag disagrees with its action type.
    #[error("action `{action}` cannot have error = {error}")]
    ErrorFlagMismatch { action: String, error: bool },

    /// A team id that is not 16 hex-encoded bytes with a team suffix.
    #[error("invalid team id: {0:?}")]
    InvalidTeamId(String),

    /// The badge sink rejected a snapshot.
    #[error("badge notification failed: {0}")]
    Notify(String),

    /// The runtime is gone.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// A config file could not be used.
    #[error("invalid config: {0}")]
    Config(String),
}
