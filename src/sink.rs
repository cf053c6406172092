//! Where generated text and outcome notifications go

use std::io::Write;
use std::sync::Mutex;
use tokio::sync::mpsc;
use log::{error, info};

use crate::ContentKind;

/// Result of one submission, as reported to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome
{   Success
  , Failure
}

/// Receives generated text. Only called on success, so a failed request
/// never replaces content already shown.
pub trait ResultSink: Send + Sync
{   fn accept(&self, kind: ContentKind, text: &str);
}

/// Fire-and-forget user notification. Must not block.
pub trait NotificationChannel: Send + Sync
{   fn notify(&self, outcome: Outcome, message: &str);
}

/// Hand a finished result to the sink and notifier
pub fn deliver(
  result: &crate::GenerationResult
, sink: &dyn ResultSink
, notifier: &dyn NotificationChannel
)
{   match result
    {   Ok(content) => {
          sink.accept(content.kind, &content.text);
          notifier.notify(
            Outcome::Success
          , content.kind.success_message()
          );
        }
      , Err(e) => {
          notifier.notify(Outcome::Failure, &e.user_message());
        }
    }
}

// ===== Stock sinks =====

/// Writes each result followed by a newline
pub struct WriterSink<W>
{   writer: Mutex<W>
}

impl<W: Write + Send> WriterSink<W>
{   pub fn new(writer: W) -> Self
    {   WriterSink { writer: Mutex::new(writer) }
    }

    pub fn into_inner(self) -> W
    {   match self.writer.into_inner()
        {   Ok(w) => w
          , Err(poisoned) => poisoned.into_inner()
        }
    }
}

impl<W: Write + Send> ResultSink for WriterSink<W>
{   fn accept(&self, kind: ContentKind, text: &str)
    {   let mut writer = match self.writer.lock()
        {   Ok(w) => w
          , Err(poisoned) => poisoned.into_inner()
        };
        if let Err(e) = writeln!(writer, "{}", text)
          .and_then(|_| writer.flush())
        {   error!("Failed to write {}: {}", kind, e);
        }
    }
}

// ===== Stock notifiers =====

/// Routes notifications to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl NotificationChannel for LogNotifier
{   fn notify(&self, outcome: Outcome, message: &str)
    {   match outcome
        {   Outcome::Success => info!("{}", message)
          , Outcome::Failure => error!("{}", message)
        }
    }
}

/// A notification as delivered through `ChannelNotifier`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification
{   pub outcome: Outcome
  , pub message: String
}

/// Forwards notifications over an unbounded channel so a host can
/// render them however it likes. Never blocks.
#[derive(Debug, Clone)]
pub struct ChannelNotifier
{   tx: mpsc::UnboundedSender<Notification>
}

impl ChannelNotifier
{   pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>)
    {   let (tx, rx) = mpsc::unbounded_channel();
        (ChannelNotifier { tx }, rx)
    }
}

impl NotificationChannel for ChannelNotifier
{   fn notify(&self, outcome: Outcome, message: &str)
    {   // receiver gone means nobody is listening
        let _ = self.tx.send(Notification
        {   outcome
          , message: message.to_string()
        });
    }
}
