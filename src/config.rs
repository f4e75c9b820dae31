//! Process configuration
//!
//! All settings come from the environment (optionally seeded from a `.env`
//! file) and are validated once at startup, so a missing credential is
//! reported before any page is rendered.

use std::env;
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

pub const VIMEO_CLIENT_ID: &str = "VIMEO_CLIENT_ID";
pub const VIMEO_CLIENT_SECRET: &str = "VIMEO_CLIENT_SECRET";
pub const VIMEO_ACCESS_TOKEN: &str = "VIMEO_ACCESS_TOKEN";
pub const SANITY_PROJECT_ID: &str = "SANITY_PROJECT_ID";
pub const SANITY_DATASET: &str = "SANITY_DATASET";
pub const SANITY_API_VERSION: &str = "SANITY_API_VERSION";
pub const SANITY_USE_CDN: &str = "SANITY_USE_CDN";
pub const SANITY_API_TOKEN: &str = "SANITY_API_TOKEN";

const DEFAULT_DATASET: &str = "production";
const DEFAULT_API_VERSION: &str = "2024-01-01";

/// Errors that can occur while loading configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or blank
    #[error("Missing required configuration: {0} must be set")]
    MissingVariable(&'static str),

    /// A variable is set but cannot be interpreted
    #[error("Invalid value for {name}: {value:?} ({reason})")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Loads a `.env` file from the working directory or its parents, if any.
///
/// Variables already present in the environment take precedence.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => debug!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "Failed to load .env file"),
    }
}

/// Credentials for the Vimeo API.
#[derive(Clone, PartialEq, Eq)]
pub struct VimeoCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub access_token: String,
}

impl fmt::Debug for VimeoCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VimeoCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

impl VimeoCredentials {
    /// Reads the three Vimeo credentials from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads the credentials through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            client_id: required(&lookup, VIMEO_CLIENT_ID)?,
            client_secret: required(&lookup, VIMEO_CLIENT_SECRET)?,
            access_token: required(&lookup, VIMEO_ACCESS_TOKEN)?,
        })
    }
}

/// Connection settings for the Sanity content lake.
#[derive(Clone, PartialEq, Eq)]
pub struct SanityConfig {
    pub project_id: String,
    pub dataset: String,
    /// API version date without the leading `v`, e.g. `2024-01-01`
    pub api_version: String,
    /// Query the edge cache instead of the live API
    pub use_cdn: bool,
    /// Read token for private datasets
    pub token: Option<String>,
}

impl fmt::Debug for SanityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SanityConfig")
            .field("project_id", &self.project_id)
            .field("dataset", &self.dataset)
            .field("api_version", &self.api_version)
            .field("use_cdn", &self.use_cdn)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl SanityConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let project_id = required(&lookup, SANITY_PROJECT_ID)?;
        let dataset = optional(&lookup, SANITY_DATASET).unwrap_or_else(|| DEFAULT_DATASET.into());
        let api_version = optional(&lookup, SANITY_API_VERSION)
            .map(|v| v.trim_start_matches('v').to_string())
            .unwrap_or_else(|| DEFAULT_API_VERSION.into());
        let use_cdn = match optional(&lookup, SANITY_USE_CDN) {
            None => false,
            Some(raw) => parse_flag(SANITY_USE_CDN, &raw)?,
        };

        Ok(Self {
            project_id,
            dataset,
            api_version,
            use_cdn,
            token: optional(&lookup, SANITY_API_TOKEN),
        })
    }
}

/// Complete configuration for one process.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub sanity: SanityConfig,
    pub vimeo: VimeoCredentials,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            sanity: SanityConfig::from_lookup(&lookup)?,
            vimeo: VimeoCredentials::from_lookup(&lookup)?,
        })
    }
}

fn optional<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, name).ok_or(ConfigError::MissingVariable(name))
}

fn parse_flag(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name,
            value: raw.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn complete() -> Vec<(&'static str, &'static str)> {
        vec![
            (VIMEO_CLIENT_ID, "client"),
            (VIMEO_CLIENT_SECRET, "secret"),
            (VIMEO_ACCESS_TOKEN, "token"),
            (SANITY_PROJECT_ID, "abc123"),
        ]
    }

    #[test]
    fn test_complete_configuration_loads() {
        let config = AppConfig::from_lookup(lookup_from(&complete())).unwrap();
        assert_eq!(config.vimeo.client_id, "client");
        assert_eq!(config.vimeo.access_token, "token");
        assert_eq!(config.sanity.project_id, "abc123");
        assert_eq!(config.sanity.dataset, "production");
        assert_eq!(config.sanity.api_version, "2024-01-01");
        assert!(!config.sanity.use_cdn);
        assert_eq!(config.sanity.token, None);
    }

    #[test]
    fn test_each_missing_credential_is_named() {
        for missing in [VIMEO_CLIENT_ID, VIMEO_CLIENT_SECRET, VIMEO_ACCESS_TOKEN] {
            let pairs: Vec<_> = complete().into_iter().filter(|(k, _)| *k != missing).collect();
            let err = VimeoCredentials::from_lookup(lookup_from(&pairs)).unwrap_err();
            assert_eq!(err, ConfigError::MissingVariable(missing));
            assert!(err.to_string().contains(missing));
        }
    }

    #[test]
    fn test_blank_credential_counts_as_missing() {
        let mut pairs = complete();
        pairs.push((VIMEO_ACCESS_TOKEN, "   "));
        // later entry wins in the map
        let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert_eq!(err, ConfigError::MissingVariable(VIMEO_ACCESS_TOKEN));
    }

    #[test]
    fn test_sanity_overrides() {
        let mut pairs = complete();
        pairs.extend([
            (SANITY_DATASET, "staging"),
            (SANITY_API_VERSION, "v2025-02-19"),
            (SANITY_USE_CDN, "TRUE"),
            (SANITY_API_TOKEN, "sk-read"),
        ]);
        let sanity = SanityConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(sanity.dataset, "staging");
        assert_eq!(sanity.api_version, "2025-02-19");
        assert!(sanity.use_cdn);
        assert_eq!(sanity.token.as_deref(), Some("sk-read"));
    }

    #[test]
    fn test_invalid_flag_is_rejected() {
        let mut pairs = complete();
        pairs.push((SANITY_USE_CDN, "sometimes"));
        let err = SanityConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: SANITY_USE_CDN, .. }));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let credentials = VimeoCredentials::from_lookup(lookup_from(&complete())).unwrap();
        let debug = format!("{credentials:?}");
        assert!(debug.contains("client"));
        assert!(!debug.contains("secret\""));
        assert!(!debug.contains("token\""));
    }
}
