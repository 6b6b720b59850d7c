//! Gregor actions.
//!
//! A push-state action is emitted whenever the gregor service delivers a
//! new synchronized state. Construct one with [`create_push_state`]; route
//! it by its type tag [`PUSH_STATE`].

use gregor_dispatch::{Action, ActionEnvelope, ActionSummary};
use serde::{Deserialize, Serialize};

use crate::error::BadgeError;
use crate::gregor::{GregorState, PushReason};

/// Type tag of the push-state action
pub const PUSH_STATE: &str = GregorAction::PUSH_STATE;

/// Payload of a push-state action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PushStatePayload {
    pub state: GregorState,
    pub reason: PushReason,
}

impl PushStatePayload {
    pub fn new(state: GregorState, reason: PushReason) -> Self {
        Self { state, reason }
    }
}

/// Every action the gregor namespace produces
#[derive(Action, Debug, Clone, PartialEq, Eq)]
#[action(namespace = "gregor")]
pub enum GregorAction {
    /// A synchronized state arrived
    PushState(PushStatePayload),
}

/// Union of gregor action kinds
pub type Actions = GregorAction;

/// Wrap `payload` in a push-state action.
///
/// The payload is moved in unchanged.
pub fn create_push_state(payload: PushStatePayload) -> GregorAction {
    GregorAction::create_push_state(payload)
}

impl GregorAction {
    pub fn payload(&self) -> &PushStatePayload {
        match self {
            GregorAction::PushState(payload) => payload,
        }
    }

    pub fn into_payload(self) -> PushStatePayload {
        match self {
            GregorAction::PushState(payload) => payload,
        }
    }

    /// `{type, error, payload}` form, borrowing the payload
    pub fn to_envelope(&self) -> ActionEnvelope<&PushStatePayload> {
        ActionEnvelope::new(self, self.payload())
    }

    pub fn to_json(&self) -> Result<String, BadgeError> {
        Ok(serde_json::to_string(&self.to_envelope())?)
    }

    /// Decode an envelope, picking the payload type from its tag.
    pub fn from_envelope(envelope: ActionEnvelope<serde_json::Value>) -> Result<Self, BadgeError> {
        let action = match envelope.action_type.as_str() {
            GregorAction::PUSH_STATE => {
                GregorAction::PushState(serde_json::from_value(envelope.payload)?)
            }
            _ => return Err(BadgeError::UnknownActionType(envelope.action_type)),
        };

        if action.is_error() != envelope.error {
            return Err(BadgeError::ErrorFlagMismatch {
                action: envelope.action_type,
                error: envelope.error,
            });
        }
        Ok(action)
    }

    pub fn from_json(json: &str) -> Result<Self, BadgeError> {
        Self::from_envelope(serde_json::from_str(json)?)
    }
}

impl ActionSummary for GregorAction {
    fn summary(&self) -> String {
        match self {
            GregorAction::PushState(payload) => format!(
                "PushState {{ reason: {}, items: {} }}",
                payload.reason,
                payload.state.len()
            ),
        }
    }
}
