pub mod error;
pub mod config;
pub mod providers;
pub mod request;
pub mod template;
pub mod validator;
pub mod pipeline;
pub mod retry;
pub mod sink;
pub mod client;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use client::{BackendState, GenerationBackend};
pub use config::{Configuration, Credential, RetryConfig};
pub use error::{Error, ErrorKind};
pub use pipeline::GenerationPipeline;
pub use providers::{Completion, CompletionCapability};
pub use request::{GeneratedContent, GenerationRequest, PromptPair};
pub use retry::RetryPolicy;
pub use sink::{NotificationChannel, Outcome, ResultSink};
pub use template::{OptionSet, PromptTemplateEngine};
pub use validator::ConfigurationValidator;

/*

contentgen: one request pipeline for every kind of generated content.
a caller picks a content kind, fills in the closed option set for it,
writes a topic, and gets back either the generated text or a classified
error. the completion service sits behind a single trait so the http
adapter can live client side or behind a server boundary.

contentgen/
├── Cargo.toml
├── src/
│   ├── lib.rs          # Re-exports, content kinds, backend channels
│   ├── main.rs         # CLI front end, one subcommand per kind
│   ├── error.rs        # Error + ErrorKind taxonomy
│   ├── config.rs       # Credential, endpoint, timeout, retry settings
│   ├── validator.rs    # is_ready() gate before any network call
│   ├── template.rs     # Option enums and per-kind prompt skeletons
│   ├── request.rs      # PromptPair, GenerationRequest, results
│   ├── pipeline.rs     # validate -> render -> complete -> normalize
│   ├── retry.rs        # Opt-in caller retry on transport failures
│   ├── sink.rs         # ResultSink / NotificationChannel contracts
│   ├── client.rs       # Task-owning backend, abandonment handling
│   └── providers/
│       ├── mod.rs      # CompletionCapability trait
│       └── openai.rs   # OpenAI-compatible chat completions
└── tests/

*/

/// CONTENTGEN API INTERFACE:

// ===== Generate =====

pub type GenerationResult
  = Result<crate::request::GeneratedContent, crate::error::Error>;
pub type GenerationReplySender
  = tokio::sync::mpsc::UnboundedSender<GenerationResult>;

pub struct SubmitArgs
{   pub kind: ContentKind
  , pub options: crate::template::OptionSet
  , pub intent: String
  , pub reply: GenerationReplySender
}

// ===== KillProcess =====

pub type KillProcessReply = Result<(), crate::error::Error>;
pub type KillProcessReplySender
  = tokio::sync::mpsc::UnboundedSender<KillProcessReply>;

pub struct KillProcessArgs
{   pub reply: KillProcessReplySender
}

// ===== GeneratorHand (sender side) =====

pub struct GeneratorHand
{   pub submit_tx
      : tokio::sync::mpsc::UnboundedSender<SubmitArgs>
  , pub kill_process_tx
      : tokio::sync::mpsc::UnboundedSender<KillProcessArgs>
}

// ===== GeneratorFoot (receiver side) =====

pub struct GeneratorFoot
{   pub submit_rx
      : tokio::sync::mpsc::UnboundedReceiver<SubmitArgs>
  , pub kill_process_rx
      : tokio::sync::mpsc::UnboundedReceiver<KillProcessArgs>
}

/// CONTENTGEN STRUCTURES:

/// The closed set of things this crate can write.
/// Each kind owns one prompt skeleton and one option schema.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize
)]
#[serde(rename_all = "kebab-case")]
pub enum ContentKind
{   /// Long-form markdown blog post
    Article
  , /// Short-video script with VISUAL / AUDIO / TEXT ON SCREEN sections
    ShortVideoScript
  , /// Single micro-post within 280 characters
    MicroPost
}

impl ContentKind
{   pub const ALL: [ContentKind; 3] = [
      ContentKind::Article
    , ContentKind::ShortVideoScript
    , ContentKind::MicroPost
    ];

    /// Noun used in the user instruction ("Write a {label} about: ...")
    pub fn subject_label(self) -> &'static str
    {   match self
        {   ContentKind::Article => "blog post"
          , ContentKind::ShortVideoScript => "TikTok script"
          , ContentKind::MicroPost => "tweet"
        }
    }

    /// Notification text fired after a successful generation
    pub fn success_message(self) -> &'static str
    {   match self
        {   ContentKind::Article => "AI content generated successfully!"
          , ContentKind::ShortVideoScript => {
              "TikTok script generated successfully!"
            }
          , ContentKind::MicroPost => "Tweet generated successfully!"
        }
    }

    /// Micro-posts keep the provider output byte-for-byte so the
    /// character budget the prompt asked for is preserved.
    pub fn trims_output(self) -> bool
    {   !matches!(self, ContentKind::MicroPost)
    }
}

impl fmt::Display for ContentKind
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.write_str(self.subject_label())
    }
}
