//! Routes actions to handlers registered for their type tag

use std::collections::HashMap;

use crate::Action;

/// Handle returned by [`Dispatcher::subscribe`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Handler<A> = Box<dyn FnMut(&A) + Send>;

struct Subscription<A> {
    id: SubscriptionId,
    handler: Handler<A>,
}

/// Type-tag pub/sub for actions
///
/// Handlers are registered either for a single tag (`"gregor:pushState"`)
/// or for every action. On dispatch, tag handlers run first in
/// registration order, then the catch-all handlers.
///
/// # Example
/// ```ignore
/// let mut dispatcher = Dispatcher::new();
/// dispatcher.subscribe(GregorAction::PUSH_STATE, |action| {
///     tracing::info!(?action, "gregor state pushed");
/// });
/// dispatcher.dispatch(&create_push_state(payload));
/// ```
pub struct Dispatcher<A: Action> {
    by_type: HashMap<&'static str, Vec<Subscription<A>>>,
    all: Vec<Subscription<A>>,
    next_id: u64,
}

impl<A: Action> std::fmt::Debug for Dispatcher<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<_> = self.by_type.keys().copied().collect();
        types.sort_unstable();
        f.debug_struct("Dispatcher")
            .field("types", &types)
            .field("catch_all", &self.all.len())
            .finish()
    }
}

impl<A: Action> Default for Dispatcher<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Action> Dispatcher<A> {
    pub fn new() -> Self {
        Self {
            by_type: HashMap::new(),
            all: Vec::new(),
            next_id: 0,
        }
    }

    fn next_id(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Register a handler for one action type tag
    pub fn subscribe<F>(&mut self, action_type: &'static str, handler: F) -> SubscriptionId
    where
        F: FnMut(&A) + Send + 'static,
    {
        let id = self.next_id();
        self.by_type.entry(action_type).or_default().push(Subscription {
            id,
            handler: Box::new(handler),
        });
        id
    }

    /// Register a handler for every action
    pub fn subscribe_all<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&A) + Send + 'static,
    {
        let id = self.next_id();
        self.all.push(Subscription {
            id,
            handler: Box::new(handler),
        });
        id
    }

    /// Remove a handler. Returns `false` if the id was unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.all.len();
        self.all.retain(|s| s.id != id);
        if self.all.len() != before {
            return true;
        }

        let mut removed = false;
        self.by_type.retain(|_, subs| {
            let len = subs.len();
            subs.retain(|s| s.id != id);
            removed |= subs.len() != len;
            !subs.is_empty()
        });
        removed
    }

    /// Number of handlers that would see an action with this tag
    pub fn handler_count(&self, action_type: &str) -> usize {
        self.by_type.get(action_type).map_or(0, Vec::len) + self.all.len()
    }

    /// Run every handler registered for the action's tag.
    ///
    /// Returns how many handlers ran.
    pub fn dispatch(&mut self, action: &A) -> usize {
        let mut invoked = 0;

        if let Some(subs) = self.by_type.get_mut(action.name()) {
            for sub in subs.iter_mut() {
                (sub.handler)(action);
                invoked += 1;
            }
        }

        for sub in self.all.iter_mut() {
            (sub.handler)(action);
            invoked += 1;
        }

        tracing::trace!(action = %action.name(), handlers = invoked, "dispatched to handlers");
        invoked
    }
}
