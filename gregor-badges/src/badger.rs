//! The badger: keeps badge state current and publishes snapshots.
//!
//! Actions reach the badger either synchronously through
//! [`Badger::dispatch`] or through an [`ActionSender`] feeding
//! [`Badger::run`]. Each change of the exported snapshot is handed to the
//! [`NotifyBadges`] sink.

use gregor_dispatch::{
    ActionLog, ActionLoggerMiddleware, ActionSender, CancellationToken, DispatchRuntime,
    SubscriptionId,
};
use tracing::{debug, info, warn};

use crate::badge_state::BadgeState;
use crate::config::BadgerConfig;
use crate::error::BadgeError;
use crate::protocol::{BadgeStateSnapshot, NotifyBadges};
use crate::reducer::{reducer, BadgeEffect, BadgerAction};

type BadgeRuntime = DispatchRuntime<BadgeState, BadgerAction, BadgeEffect, ActionLoggerMiddleware>;

pub struct Badger<N> {
    runtime: BadgeRuntime,
    notifier: N,
    notify: bool,
}

impl<N: NotifyBadges> Badger<N> {
    pub fn new(config: &BadgerConfig, notifier: N) -> Self {
        let middleware = ActionLoggerMiddleware::with_log(config.action_log_config());
        info!(
            notify = config.notify,
            log_capacity = config.log_capacity,
            "badger created"
        );
        Self {
            runtime: DispatchRuntime::new(BadgeState::new(), reducer, middleware),
            notifier,
            notify: config.notify,
        }
    }

    /// Apply an action now. Returns whether the badge snapshot changed.
    ///
    /// A notifier failure is returned after the state has been updated.
    pub fn dispatch(&mut self, action: impl Into<BadgerAction>) -> Result<bool, BadgeError> {
        let result = self.runtime.dispatch(action.into());
        self.publish_all(result.effects)?;
        Ok(result.changed)
    }

    /// Apply whatever senders have queued, without waiting.
    ///
    /// Every snapshot is offered to the notifier; the first failure is
    /// returned once all of them have been tried.
    pub fn process_pending(&mut self) -> Result<bool, BadgeError> {
        let result = self.runtime.process_pending();
        self.publish_all(result.effects)?;
        Ok(result.changed)
    }

    fn publish_all(&self, effects: Vec<BadgeEffect>) -> Result<(), BadgeError> {
        let mut first_err = None;
        for effect in effects {
            if let Err(err) = publish(&self.notifier, self.notify, effect) {
                match first_err {
                    None => first_err = Some(err),
                    Some(_) => warn!(error = %err, "failed to publish badge state"),
                }
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    pub fn sender(&self) -> ActionSender<BadgerAction> {
        self.runtime.sender()
    }

    /// Call `handler` after every action tagged `action_type` has been applied.
    pub fn on_action<F>(&mut self, action_type: &'static str, handler: F) -> SubscriptionId
    where
        F: FnMut(&BadgerAction) + Send + 'static,
    {
        self.runtime.dispatcher_mut().subscribe(action_type, handler)
    }

    pub fn remove_handler(&mut self, id: SubscriptionId) -> bool {
        self.runtime.dispatcher_mut().unsubscribe(id)
    }

    pub fn state(&self) -> &BadgeState {
        self.runtime.state()
    }

    pub fn snapshot(&self) -> BadgeStateSnapshot {
        self.runtime.state().export()
    }

    pub fn action_log(&self) -> Option<&ActionLog> {
        self.runtime.middleware().log()
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Process sent actions until `cancel` fires or every sender is gone.
    ///
    /// Notifier failures are logged; the loop keeps going.
    pub async fn run(self, cancel: CancellationToken) -> BadgeState {
        let Badger {
            runtime,
            notifier,
            notify,
        } = self;

        runtime
            .run(cancel, |effect| {
                if let Err(err) = publish(&notifier, notify, effect) {
                    warn!(error = %err, "failed to publish badge state");
                }
            })
            .await
    }
}

fn publish<N: NotifyBadges>(
    notifier: &N,
    notify: bool,
    effect: BadgeEffect,
) -> Result<(), BadgeError> {
    match effect {
        BadgeEffect::Notify(snapshot) => {
            if !notify {
                debug!("badge notifications disabled, dropping snapshot");
                return Ok(());
            }
            notifier.badge_state(&snapshot)?;
            debug!(
                total = snapshot.total(),
                conversations = snapshot.conversations.len(),
                inbox_vers = snapshot.inbox_vers,
                "badge state published"
            );
            Ok(())
        }
    }
}
