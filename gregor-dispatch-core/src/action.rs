//! Action trait and the `{type, error, payload}` wire envelope

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

/// Marker trait for actions that can be dispatched to the store
///
/// Actions describe something that happened. They should be:
/// - Clone: Actions may be logged, replayed, or sent to multiple handlers
/// - Debug: For debugging and logging
/// - Send + 'static: For async dispatch across threads
///
/// Use `#[derive(Action)]` from `gregor-dispatch-macros` to auto-implement this trait.
pub trait Action: Clone + Debug + Send + 'static {
    /// The action type tag, e.g. `"gregor:pushState"`
    ///
    /// Tags are unique across every action kind in an application and are
    /// what dispatchers and log filters match against.
    fn name(&self) -> &'static str;

    /// Whether this action reports a failure.
    ///
    /// Success and failure variants of the same event share one dispatch
    /// contract and differ only in this flag.
    fn is_error(&self) -> bool {
        false
    }

    /// The namespace part of the tag (`"gregor"` for `"gregor:pushState"`)
    fn namespace(&self) -> Option<&'static str> {
        namespace_of(self.name())
    }
}

/// Split the namespace off an action type tag
pub fn namespace_of(tag: &'static str) -> Option<&'static str> {
    tag.split_once(':').map(|(ns, _)| ns)
}

/// One-line description of an action for logs
///
/// The default uses the `Debug` output. Override it for actions that carry
/// large payloads.
pub trait ActionSummary: Action {
    fn summary(&self) -> String {
        format!("{:?}", self)
    }
}

/// Serialized form of an action: `{"type": ..., "error": ..., "payload": ...}`
///
/// `P` is usually a borrowed payload when encoding and
/// `serde_json::Value` when decoding, so the caller can pick the concrete
/// payload type from the tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEnvelope<P> {
    /// Action type tag
    #[serde(rename = "type")]
    pub action_type: String,
    /// Failure flag
    pub error: bool,
    pub payload: P,
}

impl<P> ActionEnvelope<P> {
    /// Build an envelope for `action` around an already extracted payload
    pub fn new<A: Action>(action: &A, payload: P) -> Self {
        Self {
            action_type: action.name().to_string(),
            error: action.is_error(),
            payload,
        }
    }
}
