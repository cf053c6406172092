//! Configuration for the completion endpoint and request policy

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use log::{debug, error};

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_KEY_PREFIX: &str = "sk-";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_KEY: &str = "CONTENTGEN_API_KEY";
pub const ENV_API_BASE: &str = "CONTENTGEN_API_BASE";
pub const ENV_MODEL: &str = "CONTENTGEN_MODEL";
pub const ENV_TIMEOUT_SECS: &str = "CONTENTGEN_TIMEOUT_SECS";
pub const ENV_KEY_PREFIX: &str = "CONTENTGEN_KEY_PREFIX";

/// Where the API key comes from.
/// `Env` is re-read on every lookup so a rotated key is picked up
/// without restarting.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Credential
{   /// Key stored in the configuration itself
    Inline(String)
  , /// Name of the environment variable holding the key
    Env(String)
}

impl Credential
{   /// Current key value, if any
    pub fn resolve(&self) -> Option<String>
    {   match self
        {   Credential::Inline(key) => Some(key.clone())
          , Credential::Env(var) => std::env::var(var).ok()
        }
    }
}

impl fmt::Debug for Credential
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   match self
        {   Credential::Inline(_) => f.write_str("Inline(<redacted>)")
          , Credential::Env(var) => write!(f, "Env({})", var)
        }
    }
}

/// Caller-side retry settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig
{   /// Retry transport failures at all
    pub enabled: bool
  , /// Max extra attempts after the first
    pub max_retries: usize
  , /// Backoff multiplier for retries
    pub backoff_multiplier: f32
  , /// Initial backoff duration in milliseconds
    pub initial_backoff_ms: u64
}

impl Default for RetryConfig
{   fn default() -> Self
    {   RetryConfig
        {   enabled: false
          , max_retries: 3
          , backoff_multiplier: 2.0
          , initial_backoff_ms: 100
        }
    }
}

/// Process-wide settings, read-only once loaded.
/// Shared as `Arc<Configuration>` by the validator and the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration
{   /// API credential source
    pub credential: Option<Credential>
  , /// Chat completion base URL
    pub api_base: String
  , /// Model identifier sent with every request
    pub model: String
  , /// Prefix a well-formed key starts with
    pub key_prefix: String
  , /// Request timeout in seconds
    pub timeout_secs: u64
  , /// Caller retry policy
    pub retry: RetryConfig
}

impl Default for Configuration
{   fn default() -> Self
    {   Configuration
        {   credential: None
          , api_base: DEFAULT_API_BASE.to_string()
          , model: DEFAULT_MODEL.to_string()
          , key_prefix: DEFAULT_KEY_PREFIX.to_string()
          , timeout_secs: DEFAULT_TIMEOUT_SECS
          , retry: RetryConfig::default()
        }
    }
}

impl Configuration
{   /// Load from `CONTENTGEN_*` environment variables.
    /// The key itself is referenced by name, not copied.
    pub fn from_env() -> Result<Self, crate::error::Error>
    {   Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env` over an arbitrary variable source
    pub fn from_lookup<F>(lookup: F)
      -> Result<Self, crate::error::Error>
    where
      F: Fn(&str) -> Option<String>
    {   debug!("Loading configuration from environment");
        let mut config = Configuration
        {   credential: Some(Credential::Env(ENV_API_KEY.to_string()))
          , ..Configuration::default()
        };

        if let Some(base) = lookup(ENV_API_BASE)
        {   config.api_base = base;
        }
        if let Some(model) = lookup(ENV_MODEL)
        {   config.model = model;
        }
        if let Some(prefix) = lookup(ENV_KEY_PREFIX)
        {   config.key_prefix = prefix;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS)
        {   config.timeout_secs = raw.trim().parse().map_err(|_| {
              error!("Bad {} value: {}", ENV_TIMEOUT_SECS, raw);
              crate::error::Error::InvalidConfiguration(format!(
                "{} must be a whole number of seconds, got '{}'"
              , ENV_TIMEOUT_SECS
              , raw
              ))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file; missing fields take defaults
    pub fn from_json_file(path: impl AsRef<Path>)
      -> Result<Self, crate::error::Error>
    {   let path = path.as_ref();
        debug!("Loading configuration from {}", path.display());
        let raw = std::fs::read_to_string(path).map_err(|e| {
          error!("Failed to read {}: {}", path.display(), e);
          crate::error::Error::InvalidConfiguration(format!(
            "cannot read {}: {}", path.display(), e
          ))
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str)
      -> Result<Self, crate::error::Error>
    {   let config: Configuration
          = serde_json::from_str(raw).map_err(|e| {
            error!("Configuration parse error: {}", e);
            crate::error::Error::InvalidConfiguration(e.to_string())
          })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<(), crate::error::Error>
    {   if self.timeout_secs == 0
        {   return Err(crate::error::Error::InvalidConfiguration(
              "timeout_secs must be greater than zero".to_string()
            ));
        }
        if self.api_base.trim().is_empty()
        {   return Err(crate::error::Error::InvalidConfiguration(
              "api_base must not be empty".to_string()
            ));
        }
        if self.model.trim().is_empty()
        {   return Err(crate::error::Error::InvalidConfiguration(
              "model must not be empty".to_string()
            ));
        }
        Ok(())
    }

    pub fn with_credential(mut self, credential: Credential) -> Self
    {   self.credential = Some(credential);
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self
    {   self.api_base = api_base.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self
    {   self.timeout_secs = timeout.as_secs().max(1);
        self
    }

    /// Resolve the credential now
    pub fn api_key(&self) -> Option<String>
    {   self.credential.as_ref().and_then(Credential::resolve)
    }

    pub fn timeout(&self) -> Duration
    {   Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests
{   use super::*;
    use std::collections::HashMap;

    #[test]
    fn env_lookup_overrides_defaults()
    {   let vars: HashMap<&str, &str> = HashMap::from([
          (ENV_MODEL, "gpt-4o-mini")
        , (ENV_TIMEOUT_SECS, "15")
        ]);
        let config = Configuration::from_lookup(|name| {
          vars.get(name).map(|v| v.to_string())
        }).unwrap();

        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.timeout(), Duration::from_secs(15));
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(
          config.credential
        , Some(Credential::Env(ENV_API_KEY.to_string()))
        );
    }

    #[test]
    fn bad_timeout_is_rejected()
    {   let err = Configuration::from_lookup(|name| {
          (name == ENV_TIMEOUT_SECS).then(|| "soon".to_string())
        }).unwrap_err();
        assert_eq!(
          err.kind()
        , crate::error::ErrorKind::ConfigurationMissing
        );

        let err = Configuration::from_lookup(|name| {
          (name == ENV_TIMEOUT_SECS).then(|| "0".to_string())
        }).unwrap_err();
        assert!(matches!(
          err
        , crate::error::Error::InvalidConfiguration(_)
        ));
    }

    #[test]
    fn json_fills_missing_fields()
    {   let config = Configuration::from_json_str(
          r#"{ "credential": { "inline": "sk-abc" }
             , "retry": { "enabled": true } }"#
        ).unwrap();

        assert_eq!(config.api_key().as_deref(), Some("sk-abc"));
        assert_eq!(config.model, DEFAULT_MODEL);
        assert!(config.retry.enabled);
        assert_eq!(config.retry.max_retries, 3);
    }

    #[test]
    fn debug_hides_inline_key()
    {   let rendered
          = format!("{:?}", Credential::Inline("sk-secret".into()));
        assert!(!rendered.contains("sk-secret"));
    }
}
