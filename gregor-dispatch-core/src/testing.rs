//! Test utilities for gregor-dispatch applications
//!
//! - [`TestHarness`]: state plus an action channel for capturing emitted actions
//! - Assertion macros for verifying emitted actions by pattern or namespace
//!
//! # Example
//!
//! ```ignore
//! use gregor_dispatch::testing::TestHarness;
//!
//! let mut harness = TestHarness::<BadgeState, BadgerAction>::default();
//! spawn_gregor_listener(harness.sender());
//!
//! let actions = harness.drain_emitted();
//! assert_emitted!(actions, BadgerAction::Gregor(_));
//! ```

use tokio::sync::mpsc;

use crate::Action;

/// State under test plus a channel that collects emitted actions
pub struct TestHarness<S, A: Action> {
    pub state: S,
    tx: mpsc::UnboundedSender<A>,
    rx: mpsc::UnboundedReceiver<A>,
}

impl<S, A: Action> TestHarness<S, A> {
    pub fn new(state: S) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { state, tx, rx }
    }

    /// Sender to hand to the code under test
    pub fn sender(&self) -> mpsc::UnboundedSender<A> {
        self.tx.clone()
    }

    /// Emit an action as a handler would
    pub fn emit(&self, action: A) {
        let _ = self.tx.send(action);
    }

    /// Take every action emitted so far
    pub fn drain_emitted(&mut self) -> Vec<A> {
        let mut actions = Vec::new();
        while let Ok(action) = self.rx.try_recv() {
            actions.push(action);
        }
        actions
    }

    /// Take only actions whose tag lives in `namespace`.
    ///
    /// Everything else stays queued, in order.
    pub fn drain_namespace(&mut self, namespace: &str) -> Vec<A> {
        let (matching, rest): (Vec<A>, Vec<A>) = self
            .drain_emitted()
            .into_iter()
            .partition(|a| a.namespace() == Some(namespace));

        for action in rest {
            let _ = self.tx.send(action);
        }
        matching
    }

    pub fn has_emitted(&mut self) -> bool {
        !self.drain_emitted().is_empty()
    }
}

impl<S: Default, A: Action> Default for TestHarness<S, A> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

/// Assert that an action matching a pattern was emitted.
#[macro_export]
macro_rules! assert_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            $actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` to be emitted, but got: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// Assert that no action matching a pattern was emitted.
#[macro_export]
macro_rules! assert_not_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            !$actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` NOT to be emitted, but it was: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// First action matching a pattern, if any.
#[macro_export]
macro_rules! find_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions.iter().find(|a| matches!(a, $pattern $(if $guard)?))
    };
}

/// Number of actions matching a pattern.
#[macro_export]
macro_rules! count_emitted {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions.iter().filter(|a| matches!(a, $pattern $(if $guard)?)).count()
    };
}

/// Assert that some action tagged under `namespace` was emitted.
#[macro_export]
macro_rules! assert_namespace_emitted {
    ($actions:expr, $namespace:expr) => {
        assert!(
            $actions.iter().any(|a| {
                use $crate::Action;
                a.namespace() == Some($namespace)
            }),
            "Expected action in namespace `{}` to be emitted, but got: {:?}",
            $namespace,
            $actions
        );
    };
}

/// Number of actions tagged under `namespace`.
#[macro_export]
macro_rules! count_namespace {
    ($actions:expr, $namespace:expr) => {{
        use $crate::Action;
        $actions
            .iter()
            .filter(|a| a.namespace() == Some($namespace))
            .count()
    }};
}
