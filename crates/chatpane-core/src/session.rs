//! Headless chat session.
//!
//! Drives a `ChatWidget` without a terminal: effects run on the current tokio
//! runtime and their results come back through an inbox that `settle` drains.
//! Used by the non-interactive CLI modes and by tests.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::runner::EffectRunner;
use crate::transcript::Transcript;
use crate::transport::ChatTransport;
use crate::widget::{ChatWidget, InputField, WidgetEffect, WidgetEvent, WidgetOptions};

type Observer = Box<dyn FnMut(&Transcript)>;

pub struct ChatSession<T> {
    widget: ChatWidget,
    runner: EffectRunner<T, WidgetEvent>,
    inbox_rx: mpsc::UnboundedReceiver<WidgetEvent>,
    observer: Option<Observer>,
}

impl<T: ChatTransport + 'static> ChatSession<T> {
    pub fn new(transport: T, options: WidgetOptions) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let mut widget = ChatWidget::new(options);
        widget.open();
        Self {
            widget,
            runner: EffectRunner::new(Arc::new(transport), inbox_tx),
            inbox_rx,
            observer: None,
        }
    }

    /// Registers a callback invoked after every transcript change.
    #[must_use]
    pub fn with_observer(mut self, observer: impl FnMut(&Transcript) + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn widget(&self) -> &ChatWidget {
        &self.widget
    }

    pub fn transcript(&self) -> &Transcript {
        self.widget.transcript()
    }

    /// Sends `text` as if typed into the input field.
    ///
    /// Returns `false` when the text was empty after trimming.
    pub fn send(&mut self, text: &str) -> bool {
        let mut input = text.to_string();
        self.send_from(&mut input)
    }

    /// Sends the value of `input`, clearing it when something was sent.
    pub fn send_from(&mut self, input: &mut impl InputField) -> bool {
        let before = self.widget.transcript().revision();
        let effects = self.widget.send_message(input);
        let sent = self.widget.transcript().revision() != before;
        self.apply(effects, before);
        sent
    }

    /// Processes reply and reveal events until the widget is idle.
    pub async fn settle(&mut self) {
        while !self.widget.is_idle() {
            let Some(event) = self.inbox_rx.recv().await else {
                break;
            };
            self.dispatch_event(event);
        }
    }

    /// Cancels running reveals and forgets pending requests.
    pub fn shutdown(&mut self) {
        let effects = self.widget.shutdown();
        self.runner.execute_all(effects);
    }

    fn dispatch_event(&mut self, event: WidgetEvent) {
        let before = self.widget.transcript().revision();
        let effects = self.widget.handle(event);
        self.apply(effects, before);
    }

    fn apply(&mut self, effects: Vec<WidgetEffect>, revision_before: u64) {
        if self.widget.transcript().revision() != revision_before
            && let Some(observer) = self.observer.as_mut()
        {
            observer(self.widget.transcript());
        }
        self.runner.execute_all(effects);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::future::Future;
    use std::rc::Rc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tokio::time::Instant;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::DispatchPolicy;
    use crate::message::Sender;
    use crate::transport::{HttpTransport, TransportError};

    /// Replies immediately with a canned result and counts calls.
    struct CannedTransport {
        reply: Result<String, ()>,
        calls: AtomicUsize,
    }

    impl CannedTransport {
        fn ok(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl ChatTransport for CannedTransport {
        fn send(
            &self,
            _message: &str,
        ) -> impl Future<Output = Result<String, TransportError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let reply = self
                .reply
                .clone()
                .map_err(|()| TransportError::Request("connection reset".to_string()));
            async move { reply }
        }
    }

    /// Replies with the message after a per-message delay (echo server).
    struct DelayedEcho {
        delays: Mutex<Vec<Duration>>,
    }

    impl ChatTransport for DelayedEcho {
        fn send(&self, message: &str) -> impl Future<Output = Result<String, TransportError>> + Send {
            let delay = self.delays.lock().unwrap().remove(0);
            let reply = format!("echo {message}");
            async move {
                tokio::time::sleep(delay).await;
                Ok(reply)
            }
        }
    }

    fn plain() -> WidgetOptions {
        WidgetOptions {
            typewriter: false,
            ..WidgetOptions::default()
        }
    }

    fn entries(session: &ChatSession<impl ChatTransport + 'static>) -> Vec<(Sender, String)> {
        session
            .transcript()
            .entries()
            .iter()
            .map(|entry| (entry.sender(), entry.text().to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_empty_send_makes_no_call() {
        let mut session = ChatSession::new(CannedTransport::ok("unused"), plain());
        assert!(!session.send("   "));
        session.settle().await;
        assert!(session.transcript().is_empty());
        assert_eq!(
            session.runner.transport().calls.load(Ordering::SeqCst),
            0
        );
    }

    #[tokio::test]
    async fn test_send_and_settle_renders_reply() {
        let mut session = ChatSession::new(CannedTransport::ok("Hi there"), plain());
        let mut input = "Hello".to_string();
        assert!(session.send_from(&mut input));
        assert!(input.is_empty());

        session.settle().await;
        assert_eq!(
            entries(&session),
            vec![
                (Sender::User, "Hello".to_string()),
                (Sender::Bot, "Hi there".to_string()),
            ]
        );
        assert_eq!(
            session.transcript().scroll_top(),
            session.transcript().scroll_height()
        );
    }

    #[tokio::test]
    async fn test_failure_renders_fallback_once() {
        let mut session = ChatSession::new(CannedTransport::failing(), plain());
        session.send("Hello");
        session.settle().await;
        assert_eq!(
            entries(&session),
            vec![
                (Sender::User, "Hello".to_string()),
                (Sender::Bot, "Sorry, something went wrong.".to_string()),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_typewriter_prefixes_at_fixed_interval() {
        let frames: Rc<RefCell<Vec<(Instant, String)>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&frames);
        let mut session = ChatSession::new(CannedTransport::ok("Hi there"), WidgetOptions::default())
            .with_observer(move |transcript| {
                if let Some(entry) = transcript.last()
                    && entry.sender() == Sender::Bot
                {
                    sink.borrow_mut()
                        .push((Instant::now(), entry.text().to_string()));
                }
            });

        session.send("Hello");
        session.settle().await;

        let frames = frames.borrow();
        let texts: Vec<&str> = frames
            .iter()
            .map(|(_, text)| text.as_str())
            .filter(|text| !text.is_empty())
            .collect();
        assert_eq!(
            texts,
            vec!["H", "Hi", "Hi ", "Hi t", "Hi th", "Hi the", "Hi ther", "Hi there"]
        );

        let revealed: Vec<Instant> = frames
            .iter()
            .filter(|(_, text)| !text.is_empty())
            .map(|(at, _)| *at)
            .collect();
        for pair in revealed.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::from_millis(15));
        }
        assert!(session.widget().is_idle());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_policy_appends_in_completion_order() {
        let transport = DelayedEcho {
            delays: Mutex::new(vec![Duration::from_millis(200), Duration::from_millis(10)]),
        };
        let mut session = ChatSession::new(transport, plain());
        session.send("slow");
        session.send("fast");
        session.settle().await;

        assert_eq!(
            entries(&session),
            vec![
                (Sender::User, "slow".to_string()),
                (Sender::User, "fast".to_string()),
                (Sender::Bot, "echo fast".to_string()),
                (Sender::Bot, "echo slow".to_string()),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_queued_policy_appends_in_send_order() {
        let transport = DelayedEcho {
            delays: Mutex::new(vec![Duration::from_millis(200), Duration::from_millis(10)]),
        };
        let options = WidgetOptions {
            dispatch: DispatchPolicy::Queued,
            ..plain()
        };
        let mut session = ChatSession::new(transport, options);
        session.send("slow");
        session.send("fast");
        session.settle().await;

        assert_eq!(
            entries(&session),
            vec![
                (Sender::User, "slow".to_string()),
                (Sender::User, "fast".to_string()),
                (Sender::Bot, "echo slow".to_string()),
                (Sender::Bot, "echo fast".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_http_backend_roundtrip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(body_json(serde_json::json!({ "message": "Hello" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "reply": "Hi there" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(format!("{}/chat", server.uri()));
        let options = WidgetOptions {
            reveal_interval: Duration::from_millis(1),
            ..WidgetOptions::default()
        };
        let mut session = ChatSession::new(transport, options);
        session.send("Hello");
        session.settle().await;

        assert_eq!(session.transcript().last().unwrap().text(), "Hi there");
    }

    #[tokio::test]
    async fn test_http_backend_missing_reply_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "answer": "x" })),
            )
            .mount(&server)
            .await;

        let transport = HttpTransport::new(format!("{}/chat", server.uri()));
        let mut session = ChatSession::new(transport, plain());
        session.send("Hello");
        session.settle().await;

        assert_eq!(
            session.transcript().last().unwrap().text(),
            "Sorry, something went wrong."
        );
        assert_eq!(session.transcript().len(), 2);
    }
}
