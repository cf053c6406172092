//! Completion capability and its provider implementations

pub mod openai;

use async_trait::async_trait;

// Re-export for convenience
pub use openai::OpenAiClient;

/// Raw provider answer. `text` is `None` when the response carried no
/// content field at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion
{   pub text: Option<String>
  , pub finish_reason: Option<String>
}

impl Completion
{   pub fn from_text(text: impl Into<String>) -> Self
    {   Completion
        {   text: Some(text.into())
          , finish_reason: None
        }
    }
}

/// Anything that turns an instruction pair into text.
/// The pipeline only ever sees this trait, so an adapter may call the
/// provider directly or go through a server-side proxy.
#[async_trait]
pub trait CompletionCapability: Send + Sync
{   /// Display name for logs
    fn name(&self) -> &str;

    /// One request, one choice
    async fn complete(
      &self
    , prompt: &crate::request::PromptPair
    , model: &str
    ) -> Result<Completion, crate::error::Error>;
}
