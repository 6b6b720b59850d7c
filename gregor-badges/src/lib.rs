//! gregor-badges: the gregor push-state action and the badge state it drives
//!
//! The gregor service pushes its synchronized state together with a
//! [`PushReason`]. [`create_push_state`] wraps that into a
//! `"gregor:pushState"` action; the [`Badger`] reduces it, along with chat
//! unread updates, into a [`BadgeStateSnapshot`] and hands changed snapshots
//! to a [`NotifyBadges`] sink.
//!
//! ```
//! use gregor_badges::{create_push_state, GregorState, Item, PushReason, PushStatePayload, PUSH_STATE};
//! use gregor_dispatch::Action;
//!
//! let state = GregorState::default().with_item(Item::new("m1", "follow", "{}"));
//! let action = create_push_state(PushStatePayload::new(state, PushReason::Reconnected));
//!
//! assert_eq!(action.name(), PUSH_STATE);
//! assert!(!action.is_error());
//! assert_eq!(action.payload().reason, PushReason::Reconnected);
//! ```

pub mod actions;
pub mod badge_state;
pub mod badger;
pub mod chat;
pub mod config;
pub mod error;
pub mod gregor;
pub mod protocol;
pub mod reducer;

pub use actions::{create_push_state, Actions, GregorAction, PushStatePayload, PUSH_STATE};
pub use badge_state::BadgeState;
pub use badger::Badger;
pub use chat::{
    ConversationId, DeviceType, InboxVers, SyncInboxResType, UnreadUpdate, UnreadUpdateFull,
};
pub use config::BadgerConfig;
pub use error::BadgeError;
pub use gregor::{Body, Category, GregorState, Item, PushReason};
pub use protocol::{
    BadgeConversationInfo, BadgeStateArg, BadgeStateSnapshot, NoopNotifier, NotifyBadges, TeamId,
    NOTIFY_BADGE_STATE_METHOD,
};
pub use reducer::{reducer, BadgeAction, BadgeEffect, BadgerAction};
