use std::time::Duration;
use thiserror::Error as ThisError;

/// Coarse failure classes surfaced to callers and notification channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind
{   ConfigurationMissing
  , InvalidInput
  , TransportFailure
  , EmptyResponse
  , Timeout
}

/// Custom error type for content generation
/// Implements Clone for sending through channels
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum Error
{   /// Credential absent or not shaped like a provider key
    #[error("Missing or malformed API credential: {0}")]
    MissingCredential(String)
  , /// Configuration source could not be loaded
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String)
  , /// Option value outside its closed set, or unknown option name
    #[error("Invalid value '{value}' for option '{option}'")]
    InvalidOption
    {   option: String
      , value: String
    }
  , /// Option set built for a different content kind
    #[error("Options for {found} cannot render a {expected}")]
    OptionKindMismatch
    {   expected: crate::ContentKind
      , found: crate::ContentKind
    }
  , /// User intent empty or whitespace-only
    #[error("Nothing to write about: the topic is empty")]
    EmptyIntent
  , /// HTTP request error
    #[error("HTTP error: {0}")]
    HttpError(String)
  , /// API returned an error response
    #[error("API error: {0}")]
    ApiError(String)
  , /// Failed to parse API response
    #[error("Parse error: {0}")]
    ParseError(String)
  , /// Provider answered without usable text
    #[error("API response contained no text")]
    EmptyResponse
  , /// Request exceeded the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration)
  , /// Backend task is gone
    #[error("Generation backend disconnected")]
    BackendClosed
}

impl Error
{   /// Classify into the failure taxonomy
    pub fn kind(&self) -> ErrorKind
    {   match self
        {   Error::MissingCredential(_)
          | Error::InvalidConfiguration(_) => {
              ErrorKind::ConfigurationMissing
            }
          , Error::InvalidOption { .. }
          | Error::OptionKindMismatch { .. }
          | Error::EmptyIntent => ErrorKind::InvalidInput
          , Error::HttpError(_)
          | Error::ApiError(_)
          | Error::ParseError(_)
          | Error::BackendClosed => ErrorKind::TransportFailure
          , Error::EmptyResponse => ErrorKind::EmptyResponse
          , Error::Timeout(_) => ErrorKind::Timeout
        }
    }

    /// Short, non-technical message for notifications.
    /// Provider messages are passed through verbatim.
    pub fn user_message(&self) -> String
    {   match self
        {   Error::MissingCredential(_)
          | Error::InvalidConfiguration(_) => {
              "Invalid API key. Please check your configuration"
                .to_string()
            }
          , Error::InvalidOption { option, value } => {
              format!("'{}' is not a valid {}", value, option)
            }
          , Error::OptionKindMismatch { expected, .. } => {
              format!("Those options don't apply to a {}", expected)
            }
          , Error::EmptyIntent => {
              "Please describe what you want to write about".to_string()
            }
          , Error::ApiError(msg) if !msg.trim().is_empty() => {
              msg.clone()
            }
          , Error::HttpError(_)
          | Error::ApiError(_)
          | Error::ParseError(_)
          | Error::BackendClosed => {
              "Failed to generate content. Please try again.".to_string()
            }
          , Error::EmptyResponse => {
              "The service returned no content. Please try again."
                .to_string()
            }
          , Error::Timeout(_) => {
              "The request took too long. Please try again.".to_string()
            }
        }
    }

    /// Whether a caller-side retry may help
    pub fn is_retryable(&self) -> bool
    {   self.kind() == ErrorKind::TransportFailure
    }
}

impl From<serde_json::Error> for Error
{   fn from(e: serde_json::Error) -> Self
    {   Error::ParseError(e.to_string())
    }
}
