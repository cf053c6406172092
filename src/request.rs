//! Request and result types flowing through the pipeline

use serde::{Deserialize, Serialize};

/// System + user instruction sent to the completion service.
/// Rendered once per request and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptPair
{   system_instruction: String
  , user_instruction: String
}

impl PromptPair
{   pub fn new(
      system_instruction: impl Into<String>
    , user_instruction: impl Into<String>
    ) -> Self
    {   PromptPair
        {   system_instruction: system_instruction.into()
          , user_instruction: user_instruction.into()
        }
    }

    pub fn system_instruction(&self) -> &str
    {   &self.system_instruction
    }

    pub fn user_instruction(&self) -> &str
    {   &self.user_instruction
    }
}

/// One submission, owned by the pipeline call that built it
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest
{   /// What is being written
    pub kind: crate::ContentKind
  , /// Validated options for that kind
    pub options: crate::template::OptionSet
  , /// Trimmed user topic
    pub user_intent: String
  , /// Rendered instructions
    pub prompt: PromptPair
}

/// Successful generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedContent
{   /// Kind the text was generated for
    pub kind: crate::ContentKind
  , /// Generated text
    pub text: String
}
