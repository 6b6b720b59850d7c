//! Badge counts derived from gregor items and chat unread updates.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::chat::{ConversationId, InboxVers, SyncInboxResType, UnreadUpdate, UnreadUpdateFull};
use crate::gregor::{GregorState, Item};
use crate::protocol::{BadgeConversationInfo, BadgeStateSnapshot, TeamId};

/// Gregor item categories that contribute to badges
pub mod category {
    pub const TLF: &str = "tlf";
    pub const KBFS_PROBLEM_SET_COUNT: &str = "kbfs_tlf_problem_set_count";
    pub const KBFS_SBS_PROBLEM_SET_COUNT: &str = "kbfs_tlf_sbs_problem_set_count";
    pub const FOLLOW: &str = "follow";
    pub const NEW_GIT_REPO: &str = "new_git_repo";
    pub const TEAM_NEWLY_ADDED: &str = "team.newly_added_to_team";
    pub const TEAM_REQUEST_ACCESS: &str = "team.request_access";
}

#[derive(Deserialize)]
struct TlfBody {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Deserialize)]
struct ProblemSetBody {
    count: i64,
}

#[derive(Deserialize)]
struct NewGitRepoBody {
    global_unique_id: String,
}

#[derive(Deserialize)]
struct TeamBody {
    id: String,
}

fn parse_body<'a, T: Deserialize<'a>>(item: &'a Item) -> Option<T> {
    match serde_json::from_slice(item.body().bytes()) {
        Ok(body) => Some(body),
        Err(err) => {
            warn!(
                msg_id = %item.msg_id,
                category = %item.category().map_or("", |c| c.as_str()),
                error = %err,
                "skipping gregor item with unexpected body"
            );
            None
        }
    }
}

fn parse_team_ids(item: &Item) -> Vec<TeamId> {
    let Some(bodies) = parse_body::<Vec<TeamBody>>(item) else {
        return Vec::new();
    };
    bodies
        .into_iter()
        .filter_map(|body| match body.id.parse::<TeamId>() {
            Ok(id) => Some(id),
            Err(err) => {
                warn!(msg_id = %item.msg_id, error = %err, "skipping invalid team id");
                None
            }
        })
        .collect()
}

/// Badge state owned by the badger.
///
/// Gregor-derived counts are recomputed from scratch on every push; chat
/// conversations are tracked incrementally and guarded by the inbox
/// version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BadgeState {
    new_tlfs: i32,
    rekeys_needed: i64,
    new_followers: i32,
    new_git_repo_global_unique_ids: Vec<String>,
    new_team_ids: Vec<TeamId>,
    new_team_access_requests: Vec<TeamId>,
    inbox_vers: InboxVers,
    chat_unread: BTreeMap<ConversationId, BadgeConversationInfo>,
}

impl BadgeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inbox_vers(&self) -> InboxVers {
        self.inbox_vers
    }

    /// Snapshot for clients; conversations ordered by id
    pub fn export(&self) -> BadgeStateSnapshot {
        BadgeStateSnapshot {
            new_tlfs: self.new_tlfs,
            rekeys_needed: self.rekeys_needed,
            new_followers: self.new_followers,
            inbox_vers: self.inbox_vers.0,
            conversations: self.chat_unread.values().cloned().collect(),
            new_git_repo_global_unique_ids: self.new_git_repo_global_unique_ids.clone(),
            new_team_ids: self.new_team_ids.clone(),
            new_team_access_requests: self.new_team_access_requests.clone(),
        }
    }

    /// Recompute the gregor-derived counts from a full state.
    ///
    /// Items with malformed bodies are logged and skipped.
    pub fn update_with_gregor(&mut self, gstate: &GregorState) {
        self.new_tlfs = 0;
        self.new_followers = 0;
        self.rekeys_needed = 0;
        self.new_git_repo_global_unique_ids.clear();
        self.new_team_ids.clear();
        self.new_team_access_requests.clear();

        for item in gstate.items() {
            let Some(category) = item.category() else {
                continue;
            };

            match category.as_str() {
                category::TLF => {
                    if let Some(body) = parse_body::<TlfBody>(item) {
                        if body.kind == "created" {
                            self.new_tlfs += 1;
                        }
                    }
                }
                category::KBFS_PROBLEM_SET_COUNT | category::KBFS_SBS_PROBLEM_SET_COUNT => {
                    if let Some(body) = parse_body::<ProblemSetBody>(item) {
                        self.rekeys_needed = self.rekeys_needed.saturating_add(body.count);
                    }
                }
                category::FOLLOW => self.new_followers += 1,
                category::NEW_GIT_REPO => {
                    if let Some(body) = parse_body::<NewGitRepoBody>(item) {
                        self.new_git_repo_global_unique_ids
                            .push(body.global_unique_id);
                    }
                }
                category::TEAM_NEWLY_ADDED => {
                    self.new_team_ids.extend(parse_team_ids(item));
                }
                category::TEAM_REQUEST_ACCESS => {
                    self.new_team_access_requests.extend(parse_team_ids(item));
                }
                _ => {}
            }
        }

        debug!(
            items = gstate.len(),
            new_tlfs = self.new_tlfs,
            rekeys_needed = self.rekeys_needed,
            new_followers = self.new_followers,
            "badge state updated from gregor"
        );
    }

    /// Apply one conversation update unless `inbox_vers` is stale.
    pub fn update_with_chat(&mut self, update: UnreadUpdate, inbox_vers: InboxVers) {
        if inbox_vers < self.inbox_vers {
            debug!(stale = inbox_vers.0, current = self.inbox_vers.0, "skipping stale chat update");
            return;
        }

        self.inbox_vers = inbox_vers;
        self.apply_chat(update);
    }

    /// Apply a sync batch unless ignored or stale.
    pub fn update_with_chat_full(&mut self, update: UnreadUpdateFull) {
        if update.ignore {
            return;
        }
        if update.inbox_vers < self.inbox_vers {
            debug!(
                stale = update.inbox_vers.0,
                current = self.inbox_vers.0,
                "skipping stale chat sync"
            );
            return;
        }

        match update.inbox_sync_status {
            SyncInboxResType::Current | SyncInboxResType::Incremental => {}
            SyncInboxResType::Clear => self.chat_unread.clear(),
        }

        for upd in update.updates {
            self.apply_chat(upd);
        }

        self.inbox_vers = update.inbox_vers;
    }

    /// Reset everything, including the inbox version.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn apply_chat(&mut self, update: UnreadUpdate) {
        self.chat_unread.insert(
            update.conv_id.clone(),
            BadgeConversationInfo {
                conv_id: update.conv_id,
                unread_messages: update.unread_messages,
                badge_counts: update.unread_notifying_messages,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::DeviceType;
    use serde_json::json;

    const TEAM_A: &str = "0123456789abcdef0123456789abcd24";
    const TEAM_B: &str = "fedcba9876543210fedcba9876543225";

    fn item(category: &str, body: serde_json::Value) -> Item {
        Item::new("m", category, crate::gregor::Body::json(&body))
    }

    fn unread(conv: u8, count: i32) -> UnreadUpdate {
        UnreadUpdate {
            conv_id: ConversationId::new(vec![conv]),
            unread_messages: count,
            unread_notifying_messages: [(DeviceType::Desktop, count)].into_iter().collect(),
        }
    }

    #[test]
    fn test_gregor_categories() {
        let gstate: GregorState = vec![
            item("tlf", json!({"type": "created"})),
            item("tlf", json!({"type": "renamed"})),
            item("kbfs_tlf_problem_set_count", json!({"count": 2})),
            item("kbfs_tlf_sbs_problem_set_count", json!({"count": 3})),
            item("follow", json!(null)),
            item("follow", json!({})),
            item("new_git_repo", json!({"global_unique_id": "repo-1"})),
            item("team.newly_added_to_team", json!([{"id": TEAM_A}, {"id": TEAM_B}])),
            item("team.request_access", json!([{"id": TEAM_B}])),
            item("something.else", json!({"count": 100})),
            Item::uncategorized("u", "{}"),
        ]
        .into_iter()
        .collect();

        let mut state = BadgeState::new();
        state.update_with_gregor(&gstate);
        let snapshot = state.export();

        assert_eq!(snapshot.new_tlfs, 1);
        assert_eq!(snapshot.rekeys_needed, 5);
        assert_eq!(snapshot.new_followers, 2);
        assert_eq!(snapshot.new_git_repo_global_unique_ids, vec!["repo-1"]);
        assert_eq!(snapshot.new_team_ids.len(), 2);
        assert_eq!(snapshot.new_team_access_requests[0].as_str(), TEAM_B);
    }

    #[test]
    fn test_rekey_counts_past_i32() {
        let mut state = BadgeState::new();

        let gstate: GregorState = vec![
            item("kbfs_tlf_problem_set_count", json!({"count": 2147483647})),
            item("kbfs_tlf_sbs_problem_set_count", json!({"count": 1})),
        ]
        .into_iter()
        .collect();
        state.update_with_gregor(&gstate);
        assert_eq!(state.export().rekeys_needed, 2_147_483_648);

        let gstate: GregorState =
            vec![item("kbfs_tlf_problem_set_count", json!({"count": 3000000000u64}))]
                .into_iter()
                .collect();
        state.update_with_gregor(&gstate);
        assert_eq!(state.export().rekeys_needed, 3_000_000_000);
    }

    #[test]
    fn test_rekey_count_saturates() {
        let gstate: GregorState = vec![
            item("kbfs_tlf_problem_set_count", json!({"count": i64::MAX})),
            item("kbfs_tlf_problem_set_count", json!({"count": 1})),
            item("follow", json!(null)),
        ]
        .into_iter()
        .collect();

        let mut state = BadgeState::new();
        state.update_with_gregor(&gstate);
        let snapshot = state.export();
        assert_eq!(snapshot.rekeys_needed, i64::MAX);
        assert_eq!(snapshot.new_followers, 1);
        assert_eq!(snapshot.total(), i64::MAX);
    }

    #[test]
    fn test_malformed_items_are_skipped() {
        let gstate: GregorState = vec![
            Item::new("a", "tlf", "not json"),
            item("tlf", json!({"kind": "created"})),
            item("kbfs_tlf_problem_set_count", json!({"count": "many"})),
            item("new_git_repo", json!({})),
            item("team.newly_added_to_team", json!({"id": TEAM_A})),
            item("team.request_access", json!([{"id": "bogus"}, {"id": TEAM_A}])),
            item("follow", json!(null)),
        ]
        .into_iter()
        .collect();

        let mut state = BadgeState::new();
        state.update_with_gregor(&gstate);
        let snapshot = state.export();

        assert_eq!(snapshot.new_tlfs, 0);
        assert_eq!(snapshot.rekeys_needed, 0);
        assert!(snapshot.new_git_repo_global_unique_ids.is_empty());
        assert!(snapshot.new_team_ids.is_empty());
        // the valid entry of a partially bad array still counts
        assert_eq!(snapshot.new_team_access_requests.len(), 1);
        assert_eq!(snapshot.new_followers, 1);
    }

    #[test]
    fn test_gregor_counts_are_recomputed_not_accumulated() {
        let mut state = BadgeState::new();
        let gstate: GregorState = vec![
            item("follow", json!(null)),
            item("team.request_access", json!([{"id": TEAM_A}])),
        ]
        .into_iter()
        .collect();

        state.update_with_gregor(&gstate);
        state.update_with_gregor(&gstate);
        let snapshot = state.export();
        assert_eq!(snapshot.new_followers, 1);
        assert_eq!(snapshot.new_team_access_requests.len(), 1);

        state.update_with_gregor(&GregorState::default());
        assert_eq!(state.export(), BadgeStateSnapshot::default());
    }

    #[test]
    fn test_gregor_update_keeps_chat() {
        let mut state = BadgeState::new();
        state.update_with_chat(unread(1, 4), InboxVers(3));
        state.update_with_gregor(&GregorState::default());

        let snapshot = state.export();
        assert_eq!(snapshot.conversations.len(), 1);
        assert_eq!(snapshot.inbox_vers, 3);
    }

    #[test]
    fn test_chat_update_skips_stale_versions() {
        let mut state = BadgeState::new();
        state.update_with_chat(unread(1, 4), InboxVers(5));
        state.update_with_chat(unread(1, 9), InboxVers(4));
        assert_eq!(state.export().conversations[0].unread_messages, 4);

        // same version is not stale
        state.update_with_chat(unread(1, 0), InboxVers(5));
        let snapshot = state.export();
        assert_eq!(snapshot.conversations[0].unread_messages, 0);
        assert!(!snapshot.conversations[0].has_unread_messages());
        assert_eq!(state.inbox_vers(), InboxVers(5));
    }

    #[test]
    fn test_conversations_sorted_by_id() {
        let mut state = BadgeState::new();
        state.update_with_chat(unread(9, 1), InboxVers(1));
        state.update_with_chat(unread(2, 1), InboxVers(1));
        let ids: Vec<_> = state
            .export()
            .conversations
            .iter()
            .map(|c| c.conv_id.to_string())
            .collect();
        assert_eq!(ids, vec!["02", "09"]);
    }

    #[test]
    fn test_chat_full_sync() {
        let mut state = BadgeState::new();
        state.update_with_chat(unread(1, 1), InboxVers(2));

        // incremental keeps existing conversations
        state.update_with_chat_full(UnreadUpdateFull {
            ignore: false,
            inbox_vers: InboxVers(3),
            inbox_sync_status: SyncInboxResType::Incremental,
            updates: vec![unread(2, 2)],
        });
        assert_eq!(state.export().conversations.len(), 2);
        assert_eq!(state.inbox_vers(), InboxVers(3));

        // clear starts over
        state.update_with_chat_full(UnreadUpdateFull {
            ignore: false,
            inbox_vers: InboxVers(4),
            inbox_sync_status: SyncInboxResType::Clear,
            updates: vec![unread(3, 3)],
        });
        let snapshot = state.export();
        assert_eq!(snapshot.conversations.len(), 1);
        assert_eq!(snapshot.conversations[0].conv_id, ConversationId::new(vec![3]));
    }

    #[test]
    fn test_chat_full_ignored_or_stale() {
        let mut state = BadgeState::new();
        state.update_with_chat(unread(1, 1), InboxVers(5));
        let before = state.clone();

        state.update_with_chat_full(UnreadUpdateFull {
            ignore: true,
            inbox_vers: InboxVers(9),
            inbox_sync_status: SyncInboxResType::Clear,
            updates: vec![],
        });
        assert_eq!(state, before);

        state.update_with_chat_full(UnreadUpdateFull {
            ignore: false,
            inbox_vers: InboxVers(4),
            inbox_sync_status: SyncInboxResType::Clear,
            updates: vec![],
        });
        assert_eq!(state, before);
    }

    #[test]
    fn test_clear() {
        let mut state = BadgeState::new();
        state.update_with_chat(unread(1, 1), InboxVers(5));
        state.update_with_gregor(&vec![item("follow", json!(null))].into_iter().collect());

        state.clear();
        assert_eq!(state, BadgeState::default());
        assert_eq!(state.inbox_vers(), InboxVers(0));
    }
}
