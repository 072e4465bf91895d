//! Line-oriented chat without a terminal UI.
//!
//! Both modes drive a `ChatSession` against the configured endpoint and write
//! transcript text to stdout. Failures surface as the fallback bot message,
//! exactly as in the interactive panel. Reply text is printed literally:
//! terminal control sequences are stripped before they reach stdout.

use std::cell::RefCell;
use std::io::{self, BufRead, Write, stdout};
use std::rc::Rc;

use anyhow::{Context, Result};
use chatpane_core::config::{Config, LabelsConfig};
use chatpane_core::message::Sender;
use chatpane_core::session::ChatSession;
use chatpane_core::text::sanitize_for_display;
use chatpane_core::transcript::{Entry, Transcript};
use chatpane_core::transport::HttpTransport;
use chatpane_core::widget::WidgetOptions;
use tracing::info;

/// Line that ends a piped conversation early.
const QUIT_COMMAND: &str = ":q";

/// Sends each non-empty input line in order, printing every new entry as
/// `<label>: <text>` once its reply has settled.
///
/// Output is line-oriented, so replies are printed whole rather than revealed.
///
/// # Errors
/// Returns an error if reading input or writing output fails.
pub async fn run_lines(config: &Config, input: impl BufRead) -> Result<()> {
    let options = WidgetOptions {
        typewriter: false,
        ..WidgetOptions::from(config)
    };
    let mut session = ChatSession::new(HttpTransport::from_config(config), options);
    let mut out = stdout();
    let mut printed = 0;

    for line in input.lines() {
        let line = line.context("read stdin")?;
        if line.trim() == QUIT_COMMAND {
            break;
        }
        if !session.send(&line) {
            continue;
        }
        session.settle().await;
        printed = print_entries(&mut out, session.transcript(), &config.labels, printed)?;
    }

    info!(entries = session.transcript().len(), "piped chat finished");
    session.shutdown();
    Ok(())
}

/// Sends a single message and streams the reply to stdout.
///
/// With the typewriter enabled the reply appears one character at a time.
///
/// # Errors
/// Returns an error if the message is empty or stdout cannot be written.
pub async fn send_once(config: &Config, message: &str) -> Result<()> {
    if message.trim().is_empty() {
        anyhow::bail!("Message is empty");
    }

    let write_error: Rc<RefCell<Option<io::Error>>> = Rc::default();
    let observer_error = Rc::clone(&write_error);
    let mut printed = 0;
    let mut session = ChatSession::new(
        HttpTransport::from_config(config),
        WidgetOptions::from(config),
    )
    .with_observer(move |transcript| {
        if observer_error.borrow().is_some() {
            return;
        }
        match write_reply_suffix(&mut stdout().lock(), transcript, printed) {
            Ok(next) => printed = next,
            Err(err) => *observer_error.borrow_mut() = Some(err),
        }
    });

    session.send(message);
    session.settle().await;
    session.shutdown();
    if let Some(err) = write_error.take() {
        return Err(err).context("write stdout");
    }
    writeln!(stdout()).context("write stdout")?;
    Ok(())
}

/// Writes the part of the latest bot entry past byte `printed`.
///
/// Returns the new printed length. Entries only grow while revealing, so
/// each call emits just the characters revealed since the last one.
fn write_reply_suffix(
    out: &mut impl Write,
    transcript: &Transcript,
    printed: usize,
) -> io::Result<usize> {
    let Some(entry) = transcript.last() else {
        return Ok(printed);
    };
    if entry.sender() != Sender::Bot || entry.text().len() <= printed {
        return Ok(printed);
    }
    let suffix = entry.text().get(printed..).unwrap_or_default();
    out.write_all(sanitize_for_display(suffix).as_bytes())?;
    out.flush()?;
    Ok(entry.text().len())
}

fn print_entries(
    out: &mut impl Write,
    transcript: &Transcript,
    labels: &LabelsConfig,
    from: usize,
) -> Result<usize> {
    for message in transcript.entries().iter().skip(from).map(Entry::to_message) {
        writeln!(
            out,
            "{}: {}",
            labels.for_sender(message.sender),
            sanitize_for_display(&message.text)
        )
        .context("write stdout")?;
    }
    out.flush().context("flush stdout")?;
    Ok(transcript.len())
}
