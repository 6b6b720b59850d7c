//! Core traits and types for gregor-dispatch
//!
//! Foundational pieces for routing typed actions through a reducer-based
//! state container, in the Redux/Elm style.
//!
//! # Core Concepts
//!
//! - **Action**: an immutable, tagged message (`"gregor:pushState"`)
//! - **ActionEnvelope**: the `{type, error, payload}` wire form of an action
//! - **EffectStore**: state container driven by a reducer that returns effects
//! - **Middleware**: hooks around every dispatch (tracing, action log)
//! - **Dispatcher**: handlers keyed by action type tag
//! - **DispatchRuntime**: channel-fed loop tying all of the above together
//!
//! # Basic Example
//!
//! ```ignore
//! use gregor_dispatch::prelude::*;
//!
//! #[derive(Action, Clone, Debug)]
//! #[action(namespace = "follow")]
//! enum FollowAction {
//!     Followed(String),
//!     Seen,
//! }
//!
//! #[derive(Default)]
//! struct Followers {
//!     new: Vec<String>,
//! }
//!
//! fn reducer(state: &mut Followers, action: FollowAction) -> DispatchResult<usize> {
//!     match action {
//!         FollowAction::Followed(who) => {
//!             state.new.push(who);
//!             DispatchResult::changed_with(state.new.len())
//!         }
//!         FollowAction::Seen if state.new.is_empty() => DispatchResult::unchanged(),
//!         FollowAction::Seen => {
//!             state.new.clear();
//!             DispatchResult::changed_with(0)
//!         }
//!     }
//! }
//!
//! let mut store = EffectStore::new(Followers::default(), reducer);
//! let result = store.dispatch(FollowAction::create_followed("max".into()));
//! assert_eq!(result.effects, vec![1]);
//! assert_eq!(FollowAction::FOLLOWED, "follow:followed");
//! ```

pub mod action;
pub mod action_log;
pub mod dispatcher;
pub mod effect;
pub mod error;
pub mod middleware;
pub mod runtime;
pub mod testing;

pub use action::{namespace_of, Action, ActionEnvelope, ActionSummary};
pub use action_log::{
    ActionLog, ActionLogConfig, ActionLogEntry, ActionLoggerConfig, ActionLoggerMiddleware,
};
pub use dispatcher::{Dispatcher, SubscriptionId};
pub use effect::{DispatchResult, EffectReducer, EffectStore};
pub use error::DispatchError;
pub use middleware::{Middleware, NoopMiddleware};
pub use runtime::{ActionSender, DispatchRuntime};
pub use testing::TestHarness;

// Re-exported so downstream crates share one CancellationToken type.
pub use tokio_util::sync::CancellationToken;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::{Action, ActionEnvelope, ActionSummary};
    pub use crate::action_log::{ActionLogConfig, ActionLoggerConfig, ActionLoggerMiddleware};
    pub use crate::dispatcher::{Dispatcher, SubscriptionId};
    pub use crate::effect::{DispatchResult, EffectReducer, EffectStore};
    pub use crate::error::DispatchError;
    pub use crate::middleware::{Middleware, NoopMiddleware};
    pub use crate::runtime::{ActionSender, DispatchRuntime};
    pub use crate::CancellationToken;
}
