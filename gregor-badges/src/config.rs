//! Badger settings.

use std::path::Path;

use gregor_dispatch::{ActionLogConfig, ActionLoggerConfig};
use serde::{Deserialize, Serialize};

use crate::error::BadgeError;

fn default_log_capacity() -> usize {
    100
}

fn default_notify() -> bool {
    true
}

/// Settings for a [`Badger`](crate::Badger); every field has a default.
///
/// ```
/// use gregor_badges::BadgerConfig;
///
/// let config = BadgerConfig::from_json_str(r#"{"log_include": "gregor:*"}"#).unwrap();
/// assert_eq!(config.log_capacity, 100);
/// assert!(config.notify);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BadgerConfig {
    /// Comma-separated glob patterns of action tags to log
    pub log_include: Option<String>,
    /// Comma-separated glob patterns of action tags to skip
    pub log_exclude: Option<String>,
    /// Action log ring buffer size, 0 disables the log
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,
    /// Publish snapshots to the notifier
    #[serde(default = "default_notify")]
    pub notify: bool,
}

impl Default for BadgerConfig {
    fn default() -> Self {
        Self {
            log_include: None,
            log_exclude: None,
            log_capacity: default_log_capacity(),
            notify: default_notify(),
        }
    }
}

impl BadgerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, BadgeError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BadgeError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| BadgeError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    pub fn logger_config(&self) -> ActionLoggerConfig {
        ActionLoggerConfig::new(self.log_include.as_deref(), self.log_exclude.as_deref())
    }

    pub fn action_log_config(&self) -> ActionLogConfig {
        ActionLogConfig::new(self.log_capacity, self.logger_config())
    }
}
