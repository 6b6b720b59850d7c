//! gregor-dispatch: typed action dispatch for gregor push state
//!
//! Actions are tagged, immutable messages (`"gregor:pushState"`). They flow
//! through a reducer-based store; handlers subscribe by type tag.
//!
//! # Example
//! ```ignore
//! use gregor_dispatch::prelude::*;
//!
//! #[derive(Action, Clone, Debug)]
//! #[action(namespace = "gregor")]
//! enum GregorAction {
//!     PushState(PushStatePayload),
//! }
//!
//! let action = GregorAction::create_push_state(payload);
//! assert_eq!(action.name(), GregorAction::PUSH_STATE);
//! ```

// Re-export everything from core
pub use gregor_dispatch_core::*;

// Re-export derive macros
pub use gregor_dispatch_macros::Action;

/// Prelude for convenient imports
pub mod prelude {
    pub use gregor_dispatch_core::prelude::*;

    // Derive macros
    pub use gregor_dispatch_macros::Action;
}
