//! Badge notification protocol: the exported snapshot and its sink.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tokio::sync::mpsc;

use crate::chat::{ConversationId, DeviceType};
use crate::error::BadgeError;

/// Method name of the badge-state notification
pub const NOTIFY_BADGE_STATE_METHOD: &str = "keybase.1.NotifyBadges.badgeState";

const TEAM_ID_LEN: usize = 16;
const ROOT_TEAM_SUFFIX: u8 = 0x24;
const SUB_TEAM_SUFFIX: u8 = 0x25;

/// Team identifier: 16 bytes, hex encoded, ending in a team suffix byte
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TeamId(String);

impl TeamId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Subteams carry their own suffix
    pub fn is_sub_team(&self) -> bool {
        self.0.ends_with("25")
    }
}

/// Either hex case parses; the id is stored lowercase.
impl FromStr for TeamId {
    type Err = BadgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BadgeError::InvalidTeamId(s.to_string());

        let bytes = hex::decode(s).map_err(|_| invalid())?;
        if bytes.len() != TEAM_ID_LEN {
            return Err(invalid());
        }
        match bytes[TEAM_ID_LEN - 1] {
            ROOT_TEAM_SUFFIX | SUB_TEAM_SUFFIX => Ok(Self(hex::encode(bytes))),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for TeamId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TeamId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Badge info for one conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeConversationInfo {
    pub conv_id: ConversationId,
    pub unread_messages: i32,
    pub badge_counts: BTreeMap<DeviceType, i32>,
}

impl BadgeConversationInfo {
    pub fn has_unread_messages(&self) -> bool {
        self.unread_messages > 0
    }
}

/// Exported badge counts, as sent to clients
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeStateSnapshot {
    pub new_tlfs: i32,
    pub rekeys_needed: i64,
    pub new_followers: i32,
    pub inbox_vers: u64,
    pub conversations: Vec<BadgeConversationInfo>,
    pub new_git_repo_global_unique_ids: Vec<String>,
    pub new_team_ids: Vec<TeamId>,
    pub new_team_access_requests: Vec<TeamId>,
}

impl BadgeStateSnapshot {
    /// Sum of every badge-worthy count, conversations included.
    pub fn total(&self) -> i64 {
        let conversations: i64 = self
            .conversations
            .iter()
            .map(|c| c.badge_counts.values().copied().max().unwrap_or(0) as i64)
            .sum();
        [
            i64::from(self.new_tlfs),
            self.rekeys_needed,
            i64::from(self.new_followers),
            self.new_git_repo_global_unique_ids.len() as i64,
            self.new_team_ids.len() as i64,
            self.new_team_access_requests.len() as i64,
            conversations,
        ]
        .into_iter()
        .fold(0, i64::saturating_add)
    }
}

/// Argument wrapper of the notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeStateArg {
    pub badge_state: BadgeStateSnapshot,
}

/// Receiver of badge snapshots
pub trait NotifyBadges {
    fn badge_state(&self, state: &BadgeStateSnapshot) -> Result<(), BadgeError>;
}

/// Drops every snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl NotifyBadges for NoopNotifier {
    fn badge_state(&self, _state: &BadgeStateSnapshot) -> Result<(), BadgeError> {
        Ok(())
    }
}

/// Forwards snapshots over a channel
impl NotifyBadges for mpsc::UnboundedSender<BadgeStateSnapshot> {
    fn badge_state(&self, state: &BadgeStateSnapshot) -> Result<(), BadgeError> {
        self.send(state.clone())
            .map_err(|_| BadgeError::Notify("badge receiver dropped".to_string()))
    }
}
