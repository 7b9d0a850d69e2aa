//! Layered configuration: defaults, `harvester.toml`, then `HARVESTER_*` env vars.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;

use crate::client::DEFAULT_SEARCH_URL;
use crate::harvest::{HarvestProfile, MatchPolicy, Pacing, ProfileKind, RetryPolicy};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Environment variable {0} is not set; a GitHub token is required")]
    MissingToken(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarvesterConfig {
    pub profile: ProfileKind,

    /// Result file; falls back to the profile's default path.
    pub store_path: Option<PathBuf>,

    /// Lookback used when the store is missing or empty.
    pub cold_start_days: u32,

    pub max_pages: u32,
    pub page_delay_secs: u64,
    pub file_delay_secs: u64,

    pub retry_max_attempts: u32,
    pub retry_base_delay_secs: u64,
    pub retry_max_delay_secs: u64,

    /// Overrides the profile's match policy.
    pub match_policy: Option<MatchPolicy>,

    pub search_url: String,
    pub content_timeout_secs: u64,

    /// Name of the variable holding the token.
    pub token_env: String,
}

impl Default for HarvesterConfig {
    fn default() -> Self {
        Self {
            profile: ProfileKind::Manifest,
            store_path: None,
            cold_start_days: 7,
            max_pages: 10,
            page_delay_secs: 2,
            file_delay_secs: 2,
            retry_max_attempts: 3,
            retry_base_delay_secs: 60,
            retry_max_delay_secs: 15 * 60,
            match_policy: None,
            search_url: DEFAULT_SEARCH_URL.to_string(),
            content_timeout_secs: 10,
            token_env: "GITHUB_TOKEN".to_string(),
        }
    }
}

impl HarvesterConfig {
    /// Loads `.env`, then `file` (or `harvester.toml` if present), then the environment.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let file_source = match file {
            Some(path) => File::from(path).required(true),
            None => File::with_name("harvester").required(false),
        };

        let config = Config::builder()
            .add_source(file_source)
            .add_source(Environment::with_prefix("HARVESTER").try_parsing(true))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Reads the token. An unset or blank variable is fatal.
    pub fn token(&self) -> Result<String, ConfigError> {
        match std::env::var(&self.token_env) {
            Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            _ => Err(ConfigError::MissingToken(self.token_env.clone())),
        }
    }

    pub fn harvest_profile(&self) -> HarvestProfile {
        let profile = HarvestProfile::for_kind(self.profile);
        match self.match_policy {
            Some(policy) => profile.with_policy(policy),
            None => profile,
        }
    }

    pub fn resolved_store_path(&self) -> PathBuf {
        self.store_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(HarvestProfile::for_kind(self.profile).default_store))
    }

    pub fn pacing(&self) -> Pacing {
        Pacing {
            page_delay: Duration::from_secs(self.page_delay_secs),
            file_delay: Duration::from_secs(self.file_delay_secs),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_max_attempts,
            Duration::from_secs(self.retry_base_delay_secs),
        )
        .with_max_delay(Duration::from_secs(self.retry_max_delay_secs))
    }

    pub fn content_timeout(&self) -> Duration {
        Duration::from_secs(self.content_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = HarvesterConfig::default();
        assert_eq!(cfg.profile, ProfileKind::Manifest);
        assert_eq!(cfg.resolved_store_path(), PathBuf::from("trocalaoca.txt"));
        assert_eq!(cfg.pacing(), Pacing::default());
        assert_eq!(cfg.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("harvester.toml");
        std::fs::write(
            &path,
            r#"
profile = "playlist"
cold_start_days = 300
max_pages = 15
match_policy = "loose"
"#,
        )
        .unwrap();

        let cfg = HarvesterConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.profile, ProfileKind::Playlist);
        assert_eq!(cfg.cold_start_days, 300);
        assert_eq!(cfg.max_pages, 15);
        assert_eq!(cfg.match_policy, Some(MatchPolicy::Loose));
        assert_eq!(cfg.resolved_store_path(), PathBuf::from("todas.txt"));
        // Untouched keys keep their defaults.
        assert_eq!(cfg.file_delay_secs, 2);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = HarvesterConfig::load(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_missing_token_is_fatal() {
        let cfg = HarvesterConfig {
            token_env: "LINK_HARVESTER_TEST_TOKEN_UNSET".to_string(),
            ..HarvesterConfig::default()
        };
        let err = cfg.token().unwrap_err();
        assert!(matches!(err, ConfigError::MissingToken(ref name) if name == "LINK_HARVESTER_TEST_TOKEN_UNSET"));
    }

    #[test]
    fn test_token_is_trimmed() {
        std::env::set_var("LINK_HARVESTER_TEST_TOKEN_SET", "  ghp_abc \n");
        let cfg = HarvesterConfig {
            token_env: "LINK_HARVESTER_TEST_TOKEN_SET".to_string(),
            ..HarvesterConfig::default()
        };
        assert_eq!(cfg.token().unwrap(), "ghp_abc");
    }

    #[test]
    fn test_policy_override_applies_to_profile() {
        let cfg = HarvesterConfig {
            match_policy: Some(MatchPolicy::Loose),
            ..HarvesterConfig::default()
        };
        assert_eq!(
            cfg.harvest_profile(),
            HarvestProfile::manifest().with_policy(MatchPolicy::Loose)
        );
    }
}
