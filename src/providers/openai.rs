use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use log::{debug, trace, error};

// ===== Message Types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , pub content: String
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , /// Number of choices; always one
    pub n: usize
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse
{   #[serde(default)]
    pub choices: Vec<Choice>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   #[serde(default)]
    pub message: Option<ResponseMessage>
  , pub finish_reason: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage
{   #[serde(default)]
    pub role: Option<String>
  , #[serde(default)]
    pub content: Option<String>
}

/// `{"error": {"message": ...}}` body returned on non-2xx
#[derive(Debug, Clone, Deserialize)]
struct ErrorEnvelope
{   error: ErrorBody
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorBody
{   #[serde(default)]
    message: Option<String>
}

impl ChatCompletionRequest
{   /// Single-choice request for an instruction pair
    pub fn for_prompt(
      prompt: &crate::request::PromptPair
    , model: &str
    ) -> Self
    {   ChatCompletionRequest
        {   model: model.to_string()
          , messages: vec![
              ChatMessage
              {   role: "system".to_string()
                , content: prompt.system_instruction().to_string()
              }
            , ChatMessage
              {   role: "user".to_string()
                , content: prompt.user_instruction().to_string()
              }
            ]
          , n: 1
        }
    }
}

// ===== OpenAI-compatible client =====

/// Chat-completions adapter for OpenAI and API-compatible endpoints
/// (including a server-side proxy that keeps the key off the client).
#[derive(Debug, Clone)]
pub struct OpenAiClient
{   config: Arc<crate::config::Configuration>
  , http_client: reqwest::Client
}

impl OpenAiClient
{   pub fn new(config: Arc<crate::config::Configuration>) -> Self
    {   debug!("Creating OpenAiClient for {}", config.api_base);
        OpenAiClient
        {   config
          , http_client: reqwest::Client::new()
        }
    }

    fn endpoint(&self) -> String
    {   format!(
          "{}/chat/completions"
        , self.config.api_base.trim_end_matches('/')
        )
    }

    /// Key is resolved per request so rotation is honored here too
    fn get_api_key(&self) -> Result<String, crate::error::Error>
    {   self.config.api_key()
          .filter(|key| !key.trim().is_empty())
          .ok_or_else(|| {
            error!("No API key for {}", self.config.api_base);
            crate::error::Error::MissingCredential(
              "no API key available at request time".to_string()
            )
          })
    }
}

#[async_trait]
impl crate::providers::CompletionCapability for OpenAiClient
{   fn name(&self) -> &str
    {   "openai"
    }

    async fn complete(
      &self
    , prompt: &crate::request::PromptPair
    , model: &str
    ) -> Result<crate::providers::Completion, crate::error::Error>
    {   debug!("Handling completion for: {}", model);

        let api_key = self.get_api_key()?;
        let request = ChatCompletionRequest::for_prompt(prompt, model);

        trace!("Chat request: {:?}", request);

        let response = self.http_client
          .post(self.endpoint())
          .bearer_auth(api_key)
          .json(&request)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            crate::error::Error::HttpError(e.to_string())
          })?;

        let status = response.status();
        trace!("Chat response status: {}", status);

        if !status.is_success()
        {   let error_text = response.text().await
              .unwrap_or_default();
            error!("Chat API error ({}): {}", status, error_text);
            return Err(classify_error_body(status, &error_text));
        }

        let chat_response: ChatCompletionResponse
          = response.json().await.map_err(|e| {
            error!("Parse error: {}", e);
            crate::error::Error::ParseError(e.to_string())
          })?;

        let first = chat_response.choices.into_iter().next();
        if first.is_none()
        {   debug!("No choices in response");
        }

        Ok(first
          .map(|choice| crate::providers::Completion
          {   text: choice.message.and_then(|m| m.content)
            , finish_reason: choice.finish_reason
          })
          .unwrap_or_default())
    }
}

/// Longest slice of a raw error body kept in `HttpError`
const RAW_BODY_LIMIT: usize = 512;

/// Provider message verbatim when the body carries one, else the
/// status and the raw body cut to `RAW_BODY_LIMIT` bytes
fn classify_error_body(
  status: reqwest::StatusCode
, body: &str
) -> crate::error::Error
{   let message = serde_json::from_str::<ErrorEnvelope>(body)
      .ok()
      .and_then(|envelope| envelope.error.message)
      .filter(|m| !m.trim().is_empty());

    match message
    {   Some(message) => crate::error::Error::ApiError(message)
      , None => {
          let raw = body.trim();
          if raw.is_empty()
          {   crate::error::Error::HttpError(format!(
                "provider returned {}", status
              ))
          } else
          {   crate::error::Error::HttpError(format!(
                "provider returned {}: {}", status, truncate_body(raw)
              ))
          }
        }
    }
}

fn truncate_body(raw: &str) -> &str
{   if raw.len() <= RAW_BODY_LIMIT
    {   return raw;
    }
    let mut end = RAW_BODY_LIMIT;
    while !raw.is_char_boundary(end)
    {   end -= 1;
    }
    &raw[..end]
}
