//! Effect-aware state management
//!
//! Reducers stay pure: instead of notifying listeners or writing to the
//! network themselves, they return declarative effects next to the change
//! flag. The caller (usually [`DispatchRuntime`](crate::DispatchRuntime))
//! carries the effects out after the state update.
//!
//! # Example
//!
//! ```ignore
//! use gregor_dispatch::{Action, DispatchResult, EffectStore};
//!
//! enum Effect {
//!     Notify(u32),
//! }
//!
//! #[derive(Default)]
//! struct Badges { rekeys: u32 }
//!
//! #[derive(Action, Clone, Debug)]
//! #[action(namespace = "kbfs")]
//! enum KbfsAction {
//!     ProblemSetCount(u32),
//! }
//!
//! fn reducer(state: &mut Badges, action: KbfsAction) -> DispatchResult<Effect> {
//!     match action {
//!         KbfsAction::ProblemSetCount(n) if n != state.rekeys => {
//!             state.rekeys = n;
//!             DispatchResult::changed_with(Effect::Notify(n))
//!         }
//!         KbfsAction::ProblemSetCount(_) => DispatchResult::unchanged(),
//!     }
//! }
//!
//! let mut store = EffectStore::new(Badges::default(), reducer);
//! for effect in store.dispatch(KbfsAction::ProblemSetCount(3)).effects {
//!     match effect {
//!         Effect::Notify(count) => send_badges(count),
//!     }
//! }
//! ```

use std::marker::PhantomData;

use crate::action::Action;
use crate::middleware::{Middleware, NoopMiddleware};

/// Change flag plus the effects a reducer asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResult<E> {
    pub changed: bool,
    pub effects: Vec<E>,
}

impl<E> Default for DispatchResult<E> {
    fn default() -> Self {
        Self::unchanged()
    }
}

impl<E> DispatchResult<E> {
    pub fn unchanged() -> Self {
        Self {
            changed: false,
            effects: Vec::new(),
        }
    }

    pub fn changed_with(effect: E) -> Self {
        Self {
            changed: true,
            effects: vec![effect],
        }
    }

    pub fn has_effects(&self) -> bool {
        !self.effects.is_empty()
    }

    /// Fold a later result into this one: changed if either changed,
    /// effects in order.
    pub fn merge(&mut self, later: DispatchResult<E>) {
        self.changed |= later.changed;
        self.effects.extend(later.effects);
    }
}

/// A reducer function that can emit effects.
pub type EffectReducer<S, A, E> = fn(&mut S, A) -> DispatchResult<E>;

/// State, reducer and middleware.
///
/// Middleware sees the action and the change flag, never the effects.
pub struct EffectStore<S, A, E, M = NoopMiddleware> {
    state: S,
    reducer: EffectReducer<S, A, E>,
    middleware: M,
    _marker: PhantomData<A>,
}

impl<S, A: Action, E> EffectStore<S, A, E> {
    pub fn new(state: S, reducer: EffectReducer<S, A, E>) -> Self {
        Self::with_middleware(state, reducer, NoopMiddleware)
    }
}

impl<S, A, E, M> EffectStore<S, A, E, M>
where
    A: Action,
    M: Middleware<A>,
{
    pub fn with_middleware(state: S, reducer: EffectReducer<S, A, E>, middleware: M) -> Self {
        Self {
            state,
            reducer,
            middleware,
            _marker: PhantomData,
        }
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Mutable access for seeding state; prefer dispatching.
    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    pub fn into_state(self) -> S {
        self.state
    }

    pub fn middleware(&self) -> &M {
        &self.middleware
    }

    /// `middleware.before()`, reducer, then `middleware.after()`.
    pub fn dispatch(&mut self, action: A) -> DispatchResult<E> {
        self.middleware.before(&action);
        let result = (self.reducer)(&mut self.state, action.clone());
        self.middleware.after(&action, result.changed);
        result
    }
}
