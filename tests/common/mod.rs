#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use contentgen::config::{Configuration, Credential};
use contentgen::request::PromptPair;
use contentgen::sink::ResultSink;
use contentgen::{Completion, CompletionCapability, ContentKind, Error};

/// Answers from a script of canned replies, counting calls
pub struct StubCompletion
{   replies: Mutex<VecDeque<Result<Completion, Error>>>
  , fallback: Result<Completion, Error>
  , delay: Duration
  , calls: AtomicUsize
  , seen: Mutex<Vec<(PromptPair, String)>>
}

impl StubCompletion
{   pub fn replying(reply: Result<Completion, Error>) -> Arc<Self>
    {   Self::scripted(vec![], reply, Duration::ZERO)
    }

    pub fn text(text: &str) -> Arc<Self>
    {   Self::replying(Ok(Completion::from_text(text)))
    }

    pub fn slow(text: &str, delay: Duration) -> Arc<Self>
    {   Self::scripted(vec![], Ok(Completion::from_text(text)), delay)
    }

    /// Replies in order, then `fallback` forever
    pub fn scripted(
      replies: Vec<Result<Completion, Error>>
    , fallback: Result<Completion, Error>
    , delay: Duration
    ) -> Arc<Self>
    {   Arc::new(StubCompletion
        {   replies: Mutex::new(replies.into())
          , fallback
          , delay
          , calls: AtomicUsize::new(0)
          , seen: Mutex::new(vec![])
        })
    }

    pub fn calls(&self) -> usize
    {   self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<(PromptPair, String)>
    {   self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionCapability for StubCompletion
{   fn name(&self) -> &str
    {   "stub"
    }

    async fn complete(
      &self
    , prompt: &PromptPair
    , model: &str
    ) -> Result<Completion, Error>
    {   self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap()
          .push((prompt.clone(), model.to_string()));
        if !self.delay.is_zero()
        {   tokio::time::sleep(self.delay).await;
        }
        let next = self.replies.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

/// Echoes which kind of prompt it was given
pub struct KindEcho;

#[async_trait]
impl CompletionCapability for KindEcho
{   fn name(&self) -> &str
    {   "echo"
    }

    async fn complete(
      &self
    , prompt: &PromptPair
    , _model: &str
    ) -> Result<Completion, Error>
    {   let (label, delay) = if prompt.system_instruction()
          .contains("blog writer")
        {   ("article", 300)
        } else if prompt.system_instruction().contains("TikTok")
        {   ("script", 20)
        } else
        {   ("post", 150)
        };
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Ok(Completion::from_text(format!(
          "{} for [{}]", label, prompt.user_instruction()
        )))
    }
}

/// Keeps everything it is given
#[derive(Default)]
pub struct RecordingSink
{   pub accepted: Mutex<Vec<(ContentKind, String)>>
}

impl RecordingSink
{   pub fn accepted(&self) -> Vec<(ContentKind, String)>
    {   self.accepted.lock().unwrap().clone()
    }
}

impl ResultSink for RecordingSink
{   fn accept(&self, kind: ContentKind, text: &str)
    {   self.accepted.lock().unwrap().push((kind, text.to_string()));
    }
}

pub fn ready_config() -> Configuration
{   Configuration::default()
      .with_credential(Credential::Inline("sk-test-key".to_string()))
}

pub fn ready_config_arc() -> Arc<Configuration>
{   Arc::new(ready_config())
}
