//! Action logging with tag-pattern filtering and in-memory storage
//!
//! Filters match action type tags with glob patterns, so `gregor:*` selects
//! every gregor action and `*:tick` every tick regardless of namespace.
//! Matching actions go to `tracing` and, optionally, into a ring buffer that
//! can be inspected later.
//!
//! # Example
//!
//! ```ignore
//! use gregor_dispatch_core::action_log::{ActionLogConfig, ActionLoggerConfig, ActionLoggerMiddleware};
//!
//! // Only gregor and badge actions, tracing only
//! let middleware = ActionLoggerMiddleware::new(ActionLoggerConfig::new(Some("gregor:*,badges:*"), None));
//!
//! // Keep the last 100 actions in memory
//! let middleware = ActionLoggerMiddleware::with_log(ActionLogConfig::default());
//! if let Some(log) = middleware.log() {
//!     for entry in log.recent(10) {
//!         println!("{}: {}", entry.elapsed_display(), entry.summary);
//!     }
//! }
//! ```

use crate::action::ActionSummary;
use crate::middleware::Middleware;
use std::collections::VecDeque;
use std::time::Instant;

const DEFAULT_EXCLUDES: &[&str] = &["*:tick"];

/// Entries reserved up front; larger logs grow as they fill.
const PREALLOCATED_ENTRIES: usize = 128;

fn default_excludes() -> Vec<String> {
    DEFAULT_EXCLUDES.iter().map(|p| p.to_string()).collect()
}

fn split_patterns(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Include/exclude glob patterns over action type tags.
///
/// - `*` matches any sequence of characters
/// - `?` matches any single character
/// - anything else matches literally
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionLoggerConfig {
    /// If non-empty, only log actions matching one of these
    pub include_patterns: Vec<String>,
    /// Never log actions matching these (applied after include)
    pub exclude_patterns: Vec<String>,
}

impl Default for ActionLoggerConfig {
    fn default() -> Self {
        Self {
            include_patterns: Vec::new(),
            exclude_patterns: default_excludes(),
        }
    }
}

impl ActionLoggerConfig {
    /// Build from comma-separated pattern lists
    ///
    /// `None` means "everything" for include and the default excludes for
    /// exclude.
    ///
    /// ```
    /// use gregor_dispatch_core::action_log::ActionLoggerConfig;
    ///
    /// let config = ActionLoggerConfig::new(Some("gregor:*"), Some("gregor:ping"));
    /// assert!(config.should_log("gregor:pushState"));
    /// assert!(!config.should_log("gregor:ping"));
    /// assert!(!config.should_log("badges:clear"));
    /// ```
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Self {
        Self {
            include_patterns: include.map(split_patterns).unwrap_or_default(),
            exclude_patterns: exclude.map(split_patterns).unwrap_or_else(default_excludes),
        }
    }

    pub fn with_patterns(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self {
            include_patterns: include,
            exclude_patterns: exclude,
        }
    }

    /// Log everything, no excludes
    pub fn all() -> Self {
        Self::with_patterns(vec![], vec![])
    }

    pub fn should_log(&self, action_type: &str) -> bool {
        if !self.include_patterns.is_empty()
            && !self
                .include_patterns
                .iter()
                .any(|p| glob_match(p, action_type))
        {
            return false;
        }

        !self
            .exclude_patterns
            .iter()
            .any(|p| glob_match(p, action_type))
    }
}

/// An entry in the action log
#[derive(Debug, Clone)]
pub struct ActionLogEntry {
    /// Action type tag
    pub name: &'static str,
    /// Whether the action was an error variant
    pub error: bool,
    /// From [`ActionSummary::summary`]
    pub summary: String,
    pub timestamp: Instant,
    /// Monotonic, survives eviction
    pub sequence: u64,
    /// Set once the reducer ran
    pub state_changed: Option<bool>,
}

impl ActionLogEntry {
    pub fn new(name: &'static str, error: bool, summary: String, sequence: u64) -> Self {
        Self {
            name,
            error,
            summary,
            timestamp: Instant::now(),
            sequence,
            state_changed: None,
        }
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.timestamp.elapsed()
    }

    /// "2.3s" or "150ms"
    pub fn elapsed_display(&self) -> String {
        let elapsed = self.elapsed();
        if elapsed.as_secs() >= 1 {
            format!("{:.1}s", elapsed.as_secs_f64())
        } else {
            format!("{}ms", elapsed.as_millis())
        }
    }
}

/// Ring buffer settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionLogConfig {
    /// Maximum number of entries to keep
    pub capacity: usize,
    pub filter: ActionLoggerConfig,
}

impl Default for ActionLogConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            filter: ActionLoggerConfig::default(),
        }
    }
}

impl ActionLogConfig {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }

    pub fn new(capacity: usize, filter: ActionLoggerConfig) -> Self {
        Self { capacity, filter }
    }
}

/// Recent actions, oldest evicted first
#[derive(Debug, Clone)]
pub struct ActionLog {
    entries: VecDeque<ActionLogEntry>,
    config: ActionLogConfig,
    next_sequence: u64,
}

impl Default for ActionLog {
    fn default() -> Self {
        Self::new(ActionLogConfig::default())
    }
}

impl ActionLog {
    pub fn new(config: ActionLogConfig) -> Self {
        Self {
            entries: VecDeque::with_capacity(config.capacity.min(PREALLOCATED_ENTRIES)),
            config,
            next_sequence: 0,
        }
    }

    /// Record an action if it passes the filter
    pub fn log<A: ActionSummary>(&mut self, action: &A) -> Option<&ActionLogEntry> {
        let name = action.name();
        if !self.config.filter.should_log(name) || self.config.capacity == 0 {
            return None;
        }

        let entry = ActionLogEntry::new(name, action.is_error(), action.summary(), self.next_sequence);
        self.next_sequence += 1;

        if self.entries.len() >= self.config.capacity {
            self.entries.pop_front();
        }

        self.entries.push_back(entry);
        self.entries.back()
    }

    /// Attach the reducer outcome to the newest entry
    pub fn update_last_state_changed(&mut self, changed: bool) {
        if let Some(entry) = self.entries.back_mut() {
            entry.state_changed = Some(changed);
        }
    }

    /// Oldest first
    pub fn entries(&self) -> impl Iterator<Item = &ActionLogEntry> {
        self.entries.iter()
    }

    /// Newest first, at most `count`
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &ActionLogEntry> {
        self.entries.iter().rev().take(count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn config(&self) -> &ActionLogConfig {
        &self.config
    }
}

/// Middleware that logs filtered actions.
///
/// Always traces with `tracing::debug!`; with [`with_log`](Self::with_log)
/// it also keeps an [`ActionLog`].
#[derive(Debug, Clone)]
pub struct ActionLoggerMiddleware {
    config: ActionLoggerConfig,
    log: Option<ActionLog>,
    /// Whether the action currently in flight made it into the log
    last_action_logged: bool,
    active: bool,
}

impl ActionLoggerMiddleware {
    /// Tracing only
    pub fn new(config: ActionLoggerConfig) -> Self {
        Self {
            config,
            log: None,
            last_action_logged: false,
            active: true,
        }
    }

    /// Tracing plus in-memory storage
    pub fn with_log(config: ActionLogConfig) -> Self {
        Self {
            config: config.filter.clone(),
            log: Some(ActionLog::new(config)),
            last_action_logged: false,
            active: true,
        }
    }

    pub fn with_default_log() -> Self {
        Self::with_log(ActionLogConfig::default())
    }

    pub fn log_all() -> Self {
        Self::new(ActionLoggerConfig::all())
    }

    /// Disable the middleware entirely when `false`.
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn log(&self) -> Option<&ActionLog> {
        self.log.as_ref()
    }

    pub fn log_mut(&mut self) -> Option<&mut ActionLog> {
        self.log.as_mut()
    }

    pub fn config(&self) -> &ActionLoggerConfig {
        &self.config
    }
}

impl<A: ActionSummary> Middleware<A> for ActionLoggerMiddleware {
    fn before(&mut self, action: &A) {
        if !self.active {
            return;
        }

        let name = action.name();
        if self.config.should_log(name) {
            tracing::debug!(action = %name, error = action.is_error(), "action");
        }

        self.last_action_logged = false;
        if let Some(ref mut log) = self.log {
            if log.log(action).is_some() {
                self.last_action_logged = true;
            }
        }
    }

    fn after(&mut self, _action: &A, state_changed: bool) {
        if !self.active || !self.last_action_logged {
            return;
        }
        if let Some(ref mut log) = self.log {
            log.update_last_state_changed(state_changed);
        }
    }
}

/// Glob matching with `*` and `?`.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let mut pi = 0;
    let mut ti = 0;
    let mut star_pi = None;
    let mut star_ti = 0;

    while ti < text.len() {
        if pi < pattern.len() && (pattern[pi] == '?' || pattern[pi] == text[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < pattern.len() && pattern[pi] == '*' {
            star_pi = Some(pi);
            star_ti = ti;
            pi += 1;
        } else if let Some(spi) = star_pi {
            // backtrack: let the last star swallow one more char
            pi = spi + 1;
            star_ti += 1;
            ti = star_ti;
        } else {
            return false;
        }
    }

    while pi < pattern.len() && pattern[pi] == '*' {
        pi += 1;
    }

    pi == pattern.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::Middleware;

    #[test]
    fn test_glob_match() {
        assert!(glob_match("gregor:pushState", "gregor:pushState"));
        assert!(!glob_match("gregor:pushState", "gregor:pushStateX"));

        assert!(glob_match("gregor:*", "gregor:pushState"));
        assert!(glob_match("gregor:*", "gregor:"));
        assert!(!glob_match("gregor:*", "badges:clear"));
        assert!(glob_match("*:tick", "ui:tick"));
        assert!(!glob_match("*Chat*", "badges:chatUnreadUpdate"));
        assert!(glob_match("*chat*", "badges:chatUnreadUpdate"));

        assert!(glob_match("badges:?lear", "badges:clear"));
        assert!(!glob_match("badges:?lear", "badges:lear"));
    }

    #[test]
    fn test_config_include_exclude() {
        let config = ActionLoggerConfig::new(Some("badges:*"), Some("badges:chatUnreadUpdateFull"));
        assert!(config.should_log("badges:chatUnreadUpdate"));
        assert!(!config.should_log("badges:chatUnreadUpdateFull"));
        assert!(!config.should_log("gregor:pushState"));
    }

    #[test]
    fn test_config_default_and_blank_patterns() {
        let config = ActionLoggerConfig::default();
        assert!(!config.should_log("ui:tick"));
        assert!(config.should_log("gregor:pushState"));

        // empty include list means "everything"
        let config = ActionLoggerConfig::new(Some(" , "), Some(""));
        assert!(config.include_patterns.is_empty());
        assert!(config.exclude_patterns.is_empty());
        assert!(config.should_log("ui:tick"));
    }

    #[derive(Clone, Debug)]
    enum TestAction {
        Tick,
        PushState,
        PushFailed,
    }

    impl crate::Action for TestAction {
        fn name(&self) -> &'static str {
            match self {
                TestAction::Tick => "ui:tick",
                TestAction::PushState => "gregor:pushState",
                TestAction::PushFailed => "gregor:pushFailed",
            }
        }

        fn is_error(&self) -> bool {
            matches!(self, TestAction::PushFailed)
        }
    }

    impl crate::ActionSummary for TestAction {}

    #[test]
    fn test_action_log_filtering() {
        let mut log = ActionLog::default();

        log.log(&TestAction::Tick);
        assert!(log.is_empty());

        log.log(&TestAction::PushState);
        log.log(&TestAction::PushFailed);
        assert_eq!(log.len(), 2);

        let entries: Vec<_> = log.entries().collect();
        assert_eq!(entries[0].name, "gregor:pushState");
        assert!(!entries[0].error);
        assert!(entries[1].error);
        assert_eq!(entries[1].summary, "PushFailed");
    }

    #[test]
    fn test_action_log_capacity() {
        let mut log = ActionLog::new(ActionLogConfig::new(3, ActionLoggerConfig::all()));
        for _ in 0..4 {
            log.log(&TestAction::PushState);
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.entries().next().unwrap().sequence, 1);

        let recent: Vec<_> = log.recent(2).map(|e| e.sequence).collect();
        assert_eq!(recent, vec![3, 2]);

        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_action_log_zero_capacity_keeps_nothing() {
        let mut log = ActionLog::new(ActionLogConfig::new(0, ActionLoggerConfig::all()));
        assert!(log.log(&TestAction::PushState).is_none());
        assert!(log.is_empty());
    }

    #[test]
    fn test_action_log_huge_capacity_grows_lazily() {
        let mut log = ActionLog::new(ActionLogConfig::new(usize::MAX, ActionLoggerConfig::all()));
        for _ in 0..PREALLOCATED_ENTRIES + 2 {
            log.log(&TestAction::PushState);
        }
        assert_eq!(log.len(), PREALLOCATED_ENTRIES + 2);
        assert_eq!(log.entries().next().unwrap().sequence, 0);
    }

    #[test]
    fn test_elapsed_display() {
        let entry = ActionLogEntry::new("gregor:pushState", false, String::new(), 0);
        assert!(entry.elapsed_display().ends_with('s'));
    }

    #[test]
    fn test_middleware_filtered_action_does_not_update_state_changed() {
        let mut middleware = ActionLoggerMiddleware::with_default_log();

        middleware.before(&TestAction::PushState);
        middleware.after(&TestAction::PushState, true);

        // tick is excluded by default and must not overwrite the flag above
        middleware.before(&TestAction::Tick);
        middleware.after(&TestAction::Tick, false);

        let log = middleware.log().unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries().next().unwrap().state_changed, Some(true));
    }

    #[test]
    fn test_inactive_middleware_is_noop() {
        let mut middleware = ActionLoggerMiddleware::with_default_log().active(false);
        middleware.before(&TestAction::PushState);
        middleware.after(&TestAction::PushState, true);
        assert!(!middleware.is_active());
        assert!(middleware.log().unwrap().is_empty());
    }
}
