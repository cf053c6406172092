//! Opt-in caller retry for transport failures
//!
//! The pipeline itself never retries. This layer re-runs it only while
//! the failure is a `TransportFailure`; bad input, missing credentials,
//! empty responses and timeouts are returned as-is.

use std::time::Duration;
use log::{debug, warn};

use crate::template::OptionSet;
use crate::{ContentKind, GenerationResult};

/// Retry policy for failed requests
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy
{   pub max_retries: usize
  , pub backoff_multiplier: f32
  , pub initial_backoff: Duration
}

impl RetryPolicy
{   /// Create a new retry policy
    pub fn new(
      max_retries: usize
    , backoff_multiplier: f32
    , initial_backoff_ms: u64
    ) -> Self
    {   RetryPolicy
        {   max_retries
          , backoff_multiplier
          , initial_backoff: Duration::from_millis(
              initial_backoff_ms
            )
        }
    }

    /// Policy from configuration, `None` when retries are disabled
    pub fn from_config(
      config: &crate::config::RetryConfig
    ) -> Option<Self>
    {   config.enabled.then(|| RetryPolicy::new(
          config.max_retries
        , config.backoff_multiplier
        , config.initial_backoff_ms
        ))
    }

    /// Calculate backoff duration for attempt number
    pub fn backoff_for_attempt(
      &self
    , attempt: usize
    ) -> Duration
    {   debug!("Calculating backoff for attempt {}", attempt);
        let multiplier
          = self.backoff_multiplier.powi(attempt as i32);
        Duration::from_millis(
          (self.initial_backoff.as_millis() as f32
            * multiplier) as u64
        )
    }
}

impl Default for RetryPolicy
{   fn default() -> Self
    {   RetryPolicy::new(3, 2.0, 100)
    }
}

/// Run the pipeline, retrying transport failures with backoff
pub async fn generate_with_retry(
  pipeline: &crate::pipeline::GenerationPipeline
, policy: &RetryPolicy
, kind: ContentKind
, options: &OptionSet
, user_intent: &str
) -> GenerationResult
{   let mut attempt = 0;
    loop
    { match pipeline.generate(kind, options, user_intent).await
      {   Err(e) if e.is_retryable() && attempt < policy.max_retries => {
            let wait = policy.backoff_for_attempt(attempt);
            warn!(
              "Attempt {} failed ({}), retrying in {:?}"
            , attempt + 1
            , e
            , wait
            );
            tokio::time::sleep(wait).await;
            attempt += 1;
          }
        , result => return result
      }
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn backoff_grows_geometrically()
    {   let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_for_attempt(0), Duration::from_millis(100));
        assert_eq!(policy.backoff_for_attempt(1), Duration::from_millis(200));
        assert_eq!(policy.backoff_for_attempt(3), Duration::from_millis(800));
    }

    #[test]
    fn disabled_config_gives_no_policy()
    {   let config = crate::config::RetryConfig::default();
        assert!(RetryPolicy::from_config(&config).is_none());

        let config = crate::config::RetryConfig
        {   enabled: true
          , max_retries: 1
          , ..config
        };
        let policy = RetryPolicy::from_config(&config).unwrap();
        assert_eq!(policy.max_retries, 1);
    }
}
