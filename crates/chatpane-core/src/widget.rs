//! Chat widget controller.
//!
//! `ChatWidget` owns the open/closed state, the transcript, and the dispatch
//! bookkeeping. It never performs I/O: operations mutate state and return
//! `WidgetEffect`s, and results of those effects come back as `WidgetEvent`s
//! through `ChatWidget::handle`. The owner (TUI runtime or headless session)
//! executes the effects.
//!
//! ## Dispatch ordering
//!
//! With `DispatchPolicy::Concurrent` every send starts its request at once and
//! replies are appended in whatever order the requests complete. With
//! `DispatchPolicy::Queued` at most one request is in flight; later sends are
//! rendered immediately but their requests wait their turn.

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::{Config, DispatchPolicy};
use crate::message::Sender;
use crate::transcript::{EntryId, Transcript};
use crate::transport::TransportError;

/// How the container is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    /// Shown, laid out as a flex column.
    Flex,
    Hidden,
}

/// A text input the widget reads from and clears on send.
pub trait InputField {
    fn value(&self) -> &str;
    fn clear(&mut self);
}

impl InputField for String {
    fn value(&self) -> &str {
        self.as_str()
    }

    fn clear(&mut self) {
        String::clear(self);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DispatchId(pub u64);

/// A message waiting for (or undergoing) its network call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDispatch {
    pub id: DispatchId,
    pub message: String,
}

/// A reveal task to run: `steps` characters of `entry`, one per `interval`.
#[derive(Debug, Clone)]
pub struct RevealJob {
    pub entry: EntryId,
    pub steps: usize,
    pub interval: Duration,
    pub cancel: CancellationToken,
}

/// I/O requested by the widget.
#[derive(Debug)]
pub enum WidgetEffect {
    /// Send one message to the backend.
    Dispatch(PendingDispatch),
    /// Start revealing a bot entry.
    StartReveal(RevealJob),
    /// Stop a running reveal task.
    CancelReveal { token: CancellationToken },
}

/// Results of effects, fed back through `ChatWidget::handle`.
#[derive(Debug)]
pub enum WidgetEvent {
    DispatchFinished {
        id: DispatchId,
        outcome: Result<String, TransportError>,
    },
    RevealTick {
        entry: EntryId,
    },
}

/// Behaviour knobs, usually derived from `Config`.
#[derive(Debug, Clone)]
pub struct WidgetOptions {
    pub typewriter: bool,
    pub reveal_interval: Duration,
    pub interrupt_reveal_on_send: bool,
    pub dispatch: DispatchPolicy,
    pub fallback_message: String,
    pub start_open: bool,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        WidgetOptions::from(&Config::default())
    }
}

impl From<&Config> for WidgetOptions {
    fn from(config: &Config) -> Self {
        Self {
            typewriter: config.typewriter.enabled,
            reveal_interval: config.reveal_interval(),
            interrupt_reveal_on_send: config.typewriter.interrupt_on_send,
            dispatch: config.dispatch,
            fallback_message: config.fallback_message.clone(),
            start_open: config.start_open,
        }
    }
}

#[derive(Debug)]
pub struct ChatWidget {
    is_open: bool,
    transcript: Transcript,
    options: WidgetOptions,
    next_dispatch: u64,
    in_flight: HashSet<DispatchId>,
    queued: VecDeque<PendingDispatch>,
    reveals: HashMap<EntryId, CancellationToken>,
}

impl ChatWidget {
    pub fn new(options: WidgetOptions) -> Self {
        Self {
            is_open: options.start_open,
            transcript: Transcript::new(),
            options,
            next_dispatch: 0,
            in_flight: HashSet::new(),
            queued: VecDeque::new(),
            reveals: HashMap::new(),
        }
    }

    // ========================================================================
    // Visibility
    // ========================================================================

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn display(&self) -> Display {
        if self.is_open {
            Display::Flex
        } else {
            Display::Hidden
        }
    }

    pub fn toggle(&mut self) {
        self.is_open = !self.is_open;
    }

    pub fn open(&mut self) {
        if !self.is_open {
            self.is_open = true;
        }
    }

    pub fn close(&mut self) {
        if self.is_open {
            self.is_open = false;
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn options(&self) -> &WidgetOptions {
        &self.options
    }

    pub fn set_typewriter(&mut self, enabled: bool) {
        self.options.typewriter = enabled;
    }

    /// Number of requests currently awaiting a reply.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Messages rendered but whose request has not started yet (queued policy).
    pub fn queued(&self) -> usize {
        self.queued.len()
    }

    pub fn active_reveals(&self) -> usize {
        self.reveals.len()
    }

    /// True when no request is pending and no reveal is running.
    pub fn is_idle(&self) -> bool {
        self.in_flight.is_empty() && self.queued.is_empty() && self.reveals.is_empty()
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Sends the trimmed input value.
    ///
    /// Empty input is ignored (no entry, no request, input untouched).
    /// Otherwise the text is rendered as a user entry right away, the input
    /// is cleared, and a dispatch is started or queued per the policy.
    pub fn send_message(&mut self, input: &mut impl InputField) -> Vec<WidgetEffect> {
        let text = input.value().trim().to_string();
        if text.is_empty() {
            return Vec::new();
        }

        let mut effects = Vec::new();
        if self.options.interrupt_reveal_on_send {
            effects.extend(self.interrupt_reveals());
        }

        self.append_message(Sender::User, text.clone());
        input.clear();

        let dispatch = PendingDispatch {
            id: self.allocate_dispatch_id(),
            message: text,
        };
        match self.options.dispatch {
            DispatchPolicy::Queued if !self.in_flight.is_empty() => {
                debug!(dispatch = dispatch.id.0, "dispatch queued");
                self.queued.push_back(dispatch);
            }
            _ => effects.push(self.start_dispatch(dispatch)),
        }
        effects
    }

    /// Appends a complete entry and scrolls to the bottom.
    pub fn append_message(&mut self, sender: Sender, text: impl Into<String>) -> EntryId {
        let id = self.transcript.append(sender, text);
        debug!(entry = id.0, %sender, "entry appended");
        id
    }

    /// Appends an empty bot entry and returns the reveal job that fills it.
    ///
    /// Zero-length text leaves the empty entry in place and schedules nothing.
    pub fn append_bot_message_animated(&mut self, text: impl Into<String>) -> Option<RevealJob> {
        let text = text.into();
        let steps = text.chars().count();
        let entry = self.transcript.append_revealing(Sender::Bot, text);
        if steps == 0 {
            return None;
        }

        let cancel = CancellationToken::new();
        self.reveals.insert(entry, cancel.clone());
        Some(RevealJob {
            entry,
            steps,
            interval: self.options.reveal_interval,
            cancel,
        })
    }

    /// Applies the result of an effect.
    pub fn handle(&mut self, event: WidgetEvent) -> Vec<WidgetEffect> {
        match event {
            WidgetEvent::DispatchFinished { id, outcome } => self.finish_dispatch(id, outcome),
            WidgetEvent::RevealTick { entry } => {
                if !self.transcript.reveal_next(entry) {
                    self.reveals.remove(&entry);
                }
                Vec::new()
            }
        }
    }

    /// Completes every running reveal immediately and cancels its task.
    pub fn interrupt_reveals(&mut self) -> Vec<WidgetEffect> {
        let mut entries: Vec<(EntryId, CancellationToken)> = self.reveals.drain().collect();
        entries.sort_by_key(|(entry, _)| *entry);
        entries
            .into_iter()
            .map(|(entry, token)| {
                debug!(entry = entry.0, "reveal interrupted");
                self.transcript.finish_reveal(entry);
                WidgetEffect::CancelReveal { token }
            })
            .collect()
    }

    /// Stops background work before the owner goes away.
    ///
    /// In-flight requests are forgotten; their late results are ignored.
    pub fn shutdown(&mut self) -> Vec<WidgetEffect> {
        self.in_flight.clear();
        self.queued.clear();
        self.reveals
            .drain()
            .map(|(_, token)| WidgetEffect::CancelReveal { token })
            .collect()
    }

    fn allocate_dispatch_id(&mut self) -> DispatchId {
        let id = DispatchId(self.next_dispatch);
        self.next_dispatch = self.next_dispatch.wrapping_add(1);
        id
    }

    fn start_dispatch(&mut self, dispatch: PendingDispatch) -> WidgetEffect {
        debug!(dispatch = dispatch.id.0, "dispatch started");
        self.in_flight.insert(dispatch.id);
        WidgetEffect::Dispatch(dispatch)
    }

    fn finish_dispatch(
        &mut self,
        id: DispatchId,
        outcome: Result<String, TransportError>,
    ) -> Vec<WidgetEffect> {
        if !self.in_flight.remove(&id) {
            debug!(dispatch = id.0, "ignoring result for unknown dispatch");
            return Vec::new();
        }

        let mut effects = Vec::new();
        match outcome {
            Ok(reply) => {
                debug!(dispatch = id.0, chars = reply.chars().count(), "reply received");
                if self.options.typewriter {
                    if let Some(job) = self.append_bot_message_animated(reply) {
                        effects.push(WidgetEffect::StartReveal(job));
                    }
                } else {
                    self.append_message(Sender::Bot, reply);
                }
            }
            Err(err) => {
                warn!(dispatch = id.0, error = %err, "dispatch failed");
                let fallback = self.options.fallback_message.clone();
                self.append_message(Sender::Bot, fallback);
            }
        }

        if self.options.dispatch == DispatchPolicy::Queued
            && self.in_flight.is_empty()
            && let Some(next) = self.queued.pop_front()
        {
            effects.push(self.start_dispatch(next));
        }
        effects
    }
}
