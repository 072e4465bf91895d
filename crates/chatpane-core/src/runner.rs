//! Effect execution.
//!
//! `EffectRunner` turns `WidgetEffect`s into tokio tasks. Tasks never touch
//! widget state; they report back by sending `WidgetEvent`s into the owner's
//! inbox (converted into the owner's event type via `From`).

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::reveal;
use crate::transport::ChatTransport;
use crate::widget::{PendingDispatch, RevealJob, WidgetEffect, WidgetEvent};

pub struct EffectRunner<T, E> {
    transport: Arc<T>,
    inbox: mpsc::UnboundedSender<E>,
}

impl<T, E> EffectRunner<T, E>
where
    T: ChatTransport + 'static,
    E: From<WidgetEvent> + Send + 'static,
{
    pub fn new(transport: Arc<T>, inbox: mpsc::UnboundedSender<E>) -> Self {
        Self { transport, inbox }
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    pub fn execute_all(&self, effects: Vec<WidgetEffect>) {
        for effect in effects {
            self.execute(effect);
        }
    }

    /// Executes a single effect. Must be called from within a tokio runtime.
    pub fn execute(&self, effect: WidgetEffect) {
        match effect {
            WidgetEffect::Dispatch(dispatch) => self.spawn_dispatch(dispatch),
            WidgetEffect::StartReveal(job) => self.spawn_reveal(job),
            WidgetEffect::CancelReveal { token } => token.cancel(),
        }
    }

    fn spawn_dispatch(&self, dispatch: PendingDispatch) {
        let transport = Arc::clone(&self.transport);
        let tx = self.inbox.clone();
        tokio::spawn(async move {
            let PendingDispatch { id, message } = dispatch;
            let outcome = transport.send(&message).await;
            debug!(dispatch = id.0, ok = outcome.is_ok(), "dispatch settled");
            let _ = tx.send(WidgetEvent::DispatchFinished { id, outcome }.into());
        });
    }

    fn spawn_reveal(&self, job: RevealJob) {
        let tx = self.inbox.clone();
        tokio::spawn(reveal::run_reveal(job, move |entry| {
            tx.send(WidgetEvent::RevealTick { entry }.into()).is_ok()
        }));
    }
}
