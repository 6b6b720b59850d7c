//! Errors raised by the dispatch runtime

/// Errors from sending actions into a [`DispatchRuntime`](crate::DispatchRuntime)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// The runtime that owned the receiving end has been dropped.
    #[error("action channel closed, dropped `{action}`")]
    ChannelClosed { action: &'static str },
}
