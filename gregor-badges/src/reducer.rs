//! Badge actions and the reducer that folds them into [`BadgeState`].

use gregor_dispatch::{Action, ActionSummary, DispatchResult};

use crate::actions::GregorAction;
use crate::badge_state::BadgeState;
use crate::chat::{InboxVers, UnreadUpdate, UnreadUpdateFull};
use crate::protocol::BadgeStateSnapshot;

/// Chat and housekeeping actions handled by the badger
#[derive(Action, Debug, Clone, PartialEq, Eq)]
#[action(namespace = "badges")]
pub enum BadgeAction {
    /// Unread counts changed for one conversation
    ChatUnreadUpdate {
        update: UnreadUpdate,
        inbox_vers: InboxVers,
    },
    /// Result of an inbox sync
    ChatUnreadUpdateFull(UnreadUpdateFull),
    /// Logout or account switch
    Clear,
}

impl ActionSummary for BadgeAction {
    fn summary(&self) -> String {
        match self {
            BadgeAction::ChatUnreadUpdate { update, inbox_vers } => format!(
                "ChatUnreadUpdate {{ conv: {}, unread: {}, vers: {} }}",
                update.conv_id, update.unread_messages, inbox_vers.0
            ),
            BadgeAction::ChatUnreadUpdateFull(full) => format!(
                "ChatUnreadUpdateFull {{ updates: {}, vers: {}, status: {:?} }}",
                full.updates.len(),
                full.inbox_vers.0,
                full.inbox_sync_status
            ),
            BadgeAction::Clear => "Clear".to_string(),
        }
    }
}

/// Everything the badger reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BadgerAction {
    Gregor(GregorAction),
    Badges(BadgeAction),
}

impl Action for BadgerAction {
    fn name(&self) -> &'static str {
        match self {
            BadgerAction::Gregor(action) => action.name(),
            BadgerAction::Badges(action) => action.name(),
        }
    }

    fn is_error(&self) -> bool {
        match self {
            BadgerAction::Gregor(action) => action.is_error(),
            BadgerAction::Badges(action) => action.is_error(),
        }
    }
}

impl ActionSummary for BadgerAction {
    fn summary(&self) -> String {
        match self {
            BadgerAction::Gregor(action) => action.summary(),
            BadgerAction::Badges(action) => action.summary(),
        }
    }
}

impl From<GregorAction> for BadgerAction {
    fn from(action: GregorAction) -> Self {
        BadgerAction::Gregor(action)
    }
}

impl From<BadgeAction> for BadgerAction {
    fn from(action: BadgeAction) -> Self {
        BadgerAction::Badges(action)
    }
}

/// Side effects requested by the reducer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BadgeEffect {
    /// Publish a new snapshot to clients
    Notify(BadgeStateSnapshot),
}

/// Apply an action, asking for a notification when the exported snapshot moved.
pub fn reducer(state: &mut BadgeState, action: BadgerAction) -> DispatchResult<BadgeEffect> {
    let before = state.export();

    match action {
        BadgerAction::Gregor(GregorAction::PushState(payload)) => {
            state.update_with_gregor(&payload.state);
        }
        BadgerAction::Badges(BadgeAction::ChatUnreadUpdate { update, inbox_vers }) => {
            state.update_with_chat(update, inbox_vers);
        }
        BadgerAction::Badges(BadgeAction::ChatUnreadUpdateFull(full)) => {
            state.update_with_chat_full(full);
        }
        BadgerAction::Badges(BadgeAction::Clear) => state.clear(),
    }

    let after = state.export();
    if after == before {
        DispatchResult::unchanged()
    } else {
        DispatchResult::changed_with(BadgeEffect::Notify(after))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{create_push_state, PushStatePayload};
    use crate::chat::{ConversationId, SyncInboxResType};
    use crate::gregor::{Item, PushReason};
    use gregor_dispatch::EffectStore;

    fn push(items: Vec<Item>) -> BadgerAction {
        create_push_state(PushStatePayload::new(
            items.into_iter().collect(),
            PushReason::NewData,
        ))
        .into()
    }

    fn chat(conv: u8, unread: i32, vers: u64) -> BadgerAction {
        BadgeAction::create_chat_unread_update(
            UnreadUpdate {
                conv_id: ConversationId::new(vec![conv]),
                unread_messages: unread,
                unread_notifying_messages: Default::default(),
            },
            InboxVers(vers),
        )
        .into()
    }

    #[test]
    fn test_badge_action_tags() {
        assert_eq!(BadgeAction::CHAT_UNREAD_UPDATE, "badges:chatUnreadUpdate");
        assert_eq!(BadgeAction::CHAT_UNREAD_UPDATE_FULL, "badges:chatUnreadUpdateFull");
        assert_eq!(BadgeAction::CLEAR, "badges:clear");
    }

    #[test]
    fn test_badger_action_delegates_tag() {
        let action = push(vec![]);
        assert_eq!(action.name(), "gregor:pushState");
        assert!(!action.is_error());
        assert_eq!(BadgerAction::from(BadgeAction::Clear).namespace(), Some("badges"));
    }

    #[test]
    fn test_push_state_notifies_on_change() {
        let mut store = EffectStore::new(BadgeState::new(), reducer);

        let result = store.dispatch(push(vec![Item::new("m", "follow", "")]));
        assert!(result.changed);
        match result.effects.as_slice() {
            [BadgeEffect::Notify(snapshot)] => assert_eq!(snapshot.new_followers, 1),
            other => panic!("unexpected effects: {other:?}"),
        }

        // same state again, nothing to publish
        let result = store.dispatch(push(vec![Item::new("m", "follow", "")]));
        assert!(!result.changed);
        assert!(!result.has_effects());
    }

    #[test]
    fn test_stale_chat_is_unchanged() {
        let mut store = EffectStore::new(BadgeState::new(), reducer);
        assert!(store.dispatch(chat(1, 3, 10)).changed);
        assert!(!store.dispatch(chat(1, 7, 9)).changed);
        assert_eq!(store.state().export().conversations[0].unread_messages, 3);
    }

    #[test]
    fn test_full_sync_and_clear() {
        let mut store = EffectStore::new(BadgeState::new(), reducer);
        store.dispatch(chat(1, 3, 1));

        let result = store.dispatch(
            BadgeAction::create_chat_unread_update_full(UnreadUpdateFull {
                ignore: false,
                inbox_vers: InboxVers(2),
                inbox_sync_status: SyncInboxResType::Clear,
                updates: vec![],
            })
            .into(),
        );
        assert!(result.changed);
        assert!(store.state().export().conversations.is_empty());

        let result = store.dispatch(BadgeAction::create_clear().into());
        // inbox version reset
        assert!(result.changed);
        assert_eq!(store.state().export(), BadgeStateSnapshot::default());

        assert!(!store.dispatch(BadgeAction::create_clear().into()).changed);
        assert!(!store.dispatch(push(vec![])).changed);
    }
}
