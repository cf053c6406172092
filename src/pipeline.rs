//! validate -> render -> complete -> normalize

use std::sync::Arc;
use log::{debug, trace, error, info};

use crate::error::Error;
use crate::providers::CompletionCapability;
use crate::request::{GeneratedContent, GenerationRequest};
use crate::template::{OptionSet, PromptTemplateEngine};
use crate::validator::ConfigurationValidator;
use crate::{ContentKind, GenerationResult};

/// One pipeline serves every content kind; per-kind behavior lives in
/// the template engine's skeleton table.
///
/// A call makes at most one outbound request and never retries. Every
/// failure comes back as an `Err`, nothing panics past the caller.
pub struct GenerationPipeline
{   config: Arc<crate::config::Configuration>
  , validator: ConfigurationValidator
  , engine: PromptTemplateEngine
  , completion: Arc<dyn CompletionCapability>
}

impl GenerationPipeline
{   pub fn new(
      config: Arc<crate::config::Configuration>
    , completion: Arc<dyn CompletionCapability>
    ) -> Self
    {   debug!(
          "Creating GenerationPipeline over {} (model {})"
        , completion.name()
        , config.model
        );
        GenerationPipeline
        {   validator: ConfigurationValidator::new(config.clone())
          , engine: PromptTemplateEngine::new()
          , config
          , completion
        }
    }

    /// Pipeline backed by the OpenAI-compatible HTTP adapter
    pub fn openai(config: Arc<crate::config::Configuration>) -> Self
    {   let client = crate::providers::OpenAiClient::new(config.clone());
        GenerationPipeline::new(config, Arc::new(client))
    }

    pub fn config(&self) -> &crate::config::Configuration
    {   &self.config
    }

    pub async fn generate(
      &self
    , kind: ContentKind
    , options: &OptionSet
    , user_intent: &str
    ) -> GenerationResult
    {   let request = self.prepare(kind, options, user_intent)?;
        self.execute(request).await
    }

    /// Steps that must pass before any network call: the credential
    /// gate, then template rendering.
    pub fn prepare(
      &self
    , kind: ContentKind
    , options: &OptionSet
    , user_intent: &str
    ) -> Result<GenerationRequest, Error>
    {   self.validator.ensure_ready().map_err(|e| {
          error!("Configuration not ready: {}", e);
          e
        })?;

        let prompt = self.engine
          .render(kind, options, user_intent)
          .map_err(|e| {
            debug!("Render failed for {:?}: {}", kind, e);
            e
          })?;

        trace!("Rendered prompt: {:?}", prompt);

        Ok(GenerationRequest
        {   kind
          , options: *options
          , user_intent: user_intent.trim().to_string()
          , prompt
        })
    }

    async fn execute(&self, request: GenerationRequest)
      -> GenerationResult
    {   let timeout = self.config.timeout();
        debug!(
          "Requesting {:?} from {} (timeout {:?})"
        , request.kind
        , self.completion.name()
        , timeout
        );

        let completion = tokio::time::timeout(
          timeout
        , self.completion.complete(&request.prompt, &self.config.model)
        ).await
          .map_err(|_| {
            error!("Completion timed out after {:?}", timeout);
            Error::Timeout(timeout)
          })??;

        let text = match completion.text
        {   Some(text) if !text.trim().is_empty() => text
          , _ => {
              error!(
                "Empty completion (finish_reason: {:?})"
              , completion.finish_reason
              );
              return Err(Error::EmptyResponse);
            }
        };

        let text = if request.kind.trims_output()
        {   text.trim().to_string()
        } else
        {   text
        };

        info!("Generated {} ({} chars)", request.kind, text.chars().count());
        Ok(GeneratedContent
        {   kind: request.kind
          , text
        })
    }
}
