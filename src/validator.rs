//! Credential gate checked before any network call

use std::sync::Arc;
use log::{debug, trace};

/// Answers "can a request be attempted right now?"
///
/// The credential is resolved on every call instead of being cached, so
/// a key rotated in the environment takes effect without a restart.
#[derive(Debug, Clone)]
pub struct ConfigurationValidator
{   config: Arc<crate::config::Configuration>
}

impl ConfigurationValidator
{   pub fn new(config: Arc<crate::config::Configuration>) -> Self
    {   ConfigurationValidator { config }
    }

    pub fn is_ready(&self) -> bool
    {   match self.config.api_key()
        {   Some(key) => {
              let ready = is_well_formed(&key, &self.config.key_prefix);
              trace!("Credential present, well-formed: {}", ready);
              ready
            }
          , None => {
              debug!("No credential configured");
              false
            }
        }
    }

    /// `is_ready` as a `Result`, for `?` call sites
    pub fn ensure_ready(&self) -> Result<(), crate::error::Error>
    {   if self.is_ready()
        {   Ok(())
        } else
        {   Err(crate::error::Error::MissingCredential(
              match &self.config.credential
              {   Some(crate::config::Credential::Env(var)) => {
                    format!("{} is unset or malformed", var)
                  }
                , Some(crate::config::Credential::Inline(_)) => {
                    "configured key is malformed".to_string()
                  }
                , None => "no credential configured".to_string()
              }
            ))
        }
    }
}

/// Shape check only: non-empty, no whitespace, provider prefix, and
/// something after the prefix.
fn is_well_formed(key: &str, prefix: &str) -> bool
{   !key.is_empty()
      && !key.chars().any(char::is_whitespace)
      && key.starts_with(prefix)
      && key.len() > prefix.len()
}

#[cfg(test)]
mod tests
{   use super::*;
    use crate::config::{Configuration, Credential};

    fn validator(credential: Option<Credential>) -> ConfigurationValidator
    {   ConfigurationValidator::new(Arc::new(Configuration
        {   credential
          , ..Configuration::default()
        }))
    }

    #[test]
    fn accepts_prefixed_key()
    {   let v = validator(Some(Credential::Inline("sk-test123".into())));
        assert!(v.is_ready());
        assert!(v.ensure_ready().is_ok());
    }

    #[test]
    fn rejects_missing_or_malformed()
    {   assert!(!validator(None).is_ready());
        for bad in ["", "sk-", "pk-test123", "sk-has space", " sk-abc"]
        {   let v = validator(Some(Credential::Inline(bad.into())));
            assert!(!v.is_ready(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn unset_env_reference_is_not_ready()
    {   let v = validator(Some(Credential::Env(
          "CONTENTGEN_TEST_NEVER_SET_7F3A".into()
        )));
        assert!(!v.is_ready());
        let err = v.ensure_ready().unwrap_err();
        assert_eq!(
          err.kind()
        , crate::error::ErrorKind::ConfigurationMissing
        );
    }

    #[test]
    fn custom_prefix()
    {   let v = ConfigurationValidator::new(Arc::new(Configuration
        {   credential: Some(Credential::Inline("gsk_abc".into()))
          , key_prefix: "gsk_".to_string()
          , ..Configuration::default()
        }));
        assert!(v.is_ready());
    }
}
