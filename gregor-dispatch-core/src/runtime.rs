//! Action loop: channel in, reducer, handlers, effects out.
//!
//! [`DispatchRuntime`] owns the state. Producers hold cloned
//! [`ActionSender`]s; the runtime applies each received action to its
//! effect store, notifies the [`Dispatcher`] handlers for the action's tag,
//! and hands every effect to the caller.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::dispatcher::Dispatcher;
use crate::effect::{DispatchResult, EffectReducer, EffectStore};
use crate::error::DispatchError;
use crate::middleware::Middleware;
use crate::Action;

/// Cloneable producer side of a runtime's action channel
pub struct ActionSender<A> {
    tx: mpsc::UnboundedSender<A>,
}

impl<A> Clone for ActionSender<A> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<A> std::fmt::Debug for ActionSender<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionSender")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

impl<A: Action> ActionSender<A> {
    /// Queue an action for the runtime
    pub fn send(&self, action: A) -> Result<(), DispatchError> {
        let name = action.name();
        self.tx
            .send(action)
            .map_err(|_| DispatchError::ChannelClosed { action: name })
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Effect store, tag dispatcher and action channel in one place
pub struct DispatchRuntime<S, A, E, M>
where
    A: Action,
    M: Middleware<A>,
{
    store: EffectStore<S, A, E, M>,
    dispatcher: Dispatcher<A>,
    action_tx: mpsc::UnboundedSender<A>,
    action_rx: mpsc::UnboundedReceiver<A>,
}

impl<S, A, E, M> DispatchRuntime<S, A, E, M>
where
    A: Action,
    M: Middleware<A>,
{
    pub fn new(state: S, reducer: EffectReducer<S, A, E>, middleware: M) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        Self {
            store: EffectStore::with_middleware(state, reducer, middleware),
            dispatcher: Dispatcher::new(),
            action_tx,
            action_rx,
        }
    }

    /// A sender feeding this runtime
    pub fn sender(&self) -> ActionSender<A> {
        ActionSender {
            tx: self.action_tx.clone(),
        }
    }

    pub fn state(&self) -> &S {
        self.store.state()
    }

    pub fn state_mut(&mut self) -> &mut S {
        self.store.state_mut()
    }

    pub fn middleware(&self) -> &M {
        self.store.middleware()
    }

    pub fn dispatcher(&self) -> &Dispatcher<A> {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher<A> {
        &mut self.dispatcher
    }

    /// Apply one action right away, bypassing the channel.
    ///
    /// The reducer runs first; tag handlers see the action after the state
    /// has been updated.
    pub fn dispatch(&mut self, action: A) -> DispatchResult<E> {
        Self::step(&mut self.store, &mut self.dispatcher, action)
    }

    /// Apply everything currently queued in the channel, without waiting.
    ///
    /// The result is changed if any action changed state; effects are
    /// concatenated in arrival order.
    pub fn process_pending(&mut self) -> DispatchResult<E> {
        let mut merged = DispatchResult::unchanged();
        while let Ok(action) = self.action_rx.try_recv() {
            merged.merge(Self::step(&mut self.store, &mut self.dispatcher, action));
        }
        merged
    }

    fn step(
        store: &mut EffectStore<S, A, E, M>,
        dispatcher: &mut Dispatcher<A>,
        action: A,
    ) -> DispatchResult<E> {
        let result = store.dispatch(action.clone());
        dispatcher.dispatch(&action);
        debug!(
            action = %action.name(),
            changed = result.changed,
            effects = result.effects.len(),
            "action applied"
        );
        result
    }

    /// Receive and apply actions until `cancel` fires or every
    /// [`ActionSender`] has been dropped, then return the final state.
    ///
    /// Each effect is passed to `on_effect` as soon as its action has been
    /// applied.
    pub async fn run<F>(self, cancel: CancellationToken, mut on_effect: F) -> S
    where
        F: FnMut(E),
    {
        let DispatchRuntime {
            mut store,
            mut dispatcher,
            action_tx,
            mut action_rx,
        } = self;
        // only external senders keep the loop alive
        drop(action_tx);

        info!("dispatch runtime started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("dispatch runtime cancelled");
                    break;
                }
                received = action_rx.recv() => match received {
                    Some(action) => {
                        let result = Self::step(&mut store, &mut dispatcher, action);
                        for effect in result.effects {
                            on_effect(effect);
                        }
                    }
                    None => {
                        info!("all action senders dropped");
                        break;
                    }
                }
            }
        }

        store.into_state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::NoopMiddleware;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Debug, PartialEq)]
    enum FollowAction {
        Followed(String),
        Seen,
    }

    impl Action for FollowAction {
        fn name(&self) -> &'static str {
            match self {
                FollowAction::Followed(_) => "follow:followed",
                FollowAction::Seen => "follow:seen",
            }
        }
    }

    #[derive(Default, Debug)]
    struct Followers {
        new: Vec<String>,
    }

    fn reducer(state: &mut Followers, action: FollowAction) -> DispatchResult<usize> {
        match action {
            FollowAction::Followed(who) => {
                state.new.push(who);
                DispatchResult::changed_with(state.new.len())
            }
            FollowAction::Seen if state.new.is_empty() => DispatchResult::unchanged(),
            FollowAction::Seen => {
                state.new.clear();
                DispatchResult::changed_with(0)
            }
        }
    }

    fn runtime() -> DispatchRuntime<Followers, FollowAction, usize, NoopMiddleware> {
        DispatchRuntime::new(Followers::default(), reducer, NoopMiddleware)
    }

    #[test]
    fn test_dispatch_notifies_handlers_after_reduce() {
        let mut rt = runtime();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        rt.dispatcher_mut()
            .subscribe("follow:followed", move |a| sink.lock().unwrap().push(a.clone()));

        let result = rt.dispatch(FollowAction::Followed("max".into()));
        assert_eq!(result, DispatchResult::changed_with(1));
        assert_eq!(rt.state().new, vec!["max"]);
        assert_eq!(*seen.lock().unwrap(), vec![FollowAction::Followed("max".into())]);

        // handler is tag specific
        rt.dispatch(FollowAction::Seen);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_process_pending_merges_results() {
        let mut rt = runtime();
        let tx = rt.sender();
        tx.send(FollowAction::Seen).unwrap();
        tx.send(FollowAction::Followed("a".into())).unwrap();
        tx.send(FollowAction::Followed("b".into())).unwrap();

        let result = rt.process_pending();
        assert!(result.changed);
        assert_eq!(result.effects, vec![1, 2]);
        assert!(!rt.process_pending().changed);
    }

    #[tokio::test]
    async fn test_run_stops_when_senders_dropped() {
        let rt = runtime();
        let tx = rt.sender();
        let producer = tokio::spawn(async move {
            tx.send(FollowAction::Followed("a".into())).unwrap();
            tx.send(FollowAction::Seen).unwrap();
            tx.send(FollowAction::Followed("b".into())).unwrap();
        });

        let mut effects = Vec::new();
        let state = rt
            .run(CancellationToken::new(), |e| effects.push(e))
            .await;
        producer.await.unwrap();

        assert_eq!(effects, vec![1, 0, 1]);
        assert_eq!(state.new, vec!["b"]);
    }

    #[tokio::test]
    async fn test_run_stops_on_cancel() {
        let rt = runtime();
        let tx = rt.sender();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let state = rt.run(cancel, |_| {}).await;
        assert!(state.new.is_empty());

        let err = tx.send(FollowAction::Seen).unwrap_err();
        assert_eq!(err, DispatchError::ChannelClosed { action: "follow:seen" });
        assert!(tx.is_closed());
    }
}
