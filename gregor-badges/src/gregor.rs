//! Gregor state as delivered by a push.
//!
//! These types are the boundary to the gregor service: the push-state
//! action carries them unchanged, and only the badge reducer looks inside.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Category of a gregor item, e.g. `"follow"` or `"team.request_access"`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw item body. Usually JSON, but gregor does not promise that.
///
/// Serialized as standard base64.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Body(Vec<u8>);

impl Body {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Body holding the compact JSON encoding of `value`
    pub fn json(value: &serde_json::Value) -> Self {
        Self(value.to_string().into_bytes())
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for Body {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl Serialize for Body {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for Body {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map(Body)
            .map_err(serde::de::Error::custom)
    }
}

/// One gregor message that is still live in the state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub msg_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default)]
    pub body: Body,
}

impl Item {
    pub fn new(msg_id: impl Into<String>, category: impl Into<String>, body: impl Into<Body>) -> Self {
        Self {
            msg_id: msg_id.into(),
            category: Some(Category::new(category)),
            body: body.into(),
        }
    }

    /// An item without a category; badge counting skips these
    pub fn uncategorized(msg_id: impl Into<String>, body: impl Into<Body>) -> Self {
        Self {
            msg_id: msg_id.into(),
            category: None,
            body: body.into(),
        }
    }

    pub fn category(&self) -> Option<&Category> {
        self.category.as_ref()
    }

    pub fn body(&self) -> &Body {
        &self.body
    }
}

/// Snapshot of the synchronized gregor state
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GregorState {
    #[serde(default)]
    items: Vec<Item>,
}

impl GregorState {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }
}

impl FromIterator<Item> for GregorState {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Why the gregor state was pushed
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PushReason {
    #[default]
    None,
    /// Client reconnected and got a full resync
    Reconnected,
    /// New items arrived
    NewData,
}

impl PushReason {
    /// Protocol integer code
    pub fn code(self) -> i32 {
        match self {
            PushReason::None => 0,
            PushReason::Reconnected => 1,
            PushReason::NewData => 2,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(PushReason::None),
            1 => Some(PushReason::Reconnected),
            2 => Some(PushReason::NewData),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PushReason::None => "NONE",
            PushReason::Reconnected => "RECONNECTED",
            PushReason::NewData => "NEW_DATA",
        }
    }
}

impl fmt::Display for PushReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PushReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "NONE" => Ok(PushReason::None),
            "RECONNECTED" => Ok(PushReason::Reconnected),
            "NEW_DATA" => Ok(PushReason::NewData),
            other => Err(format!("unknown push reason: {other}")),
        }
    }
}
