//! Configuration loading and validation
//!
//! The whole configuration lives in one TOML file. The path is resolved by
//! the CLI layer (flag, then `SWEEPARR_CONFIG`, then `./sweeparr.toml`);
//! this module only loads and validates.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Plex connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct PlexConfig {
    pub url: String,
    pub token: String,
    /// Library section holding movies
    #[serde(default = "default_section")]
    pub section: String,
}

/// Tautulli connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct TautulliConfig {
    pub url: String,
    pub api_key: String,
}

/// One Radarr instance
#[derive(Debug, Clone, Deserialize)]
pub struct RadarrInstanceConfig {
    /// Label used in logs ("4k", "1080p", ...)
    pub name: String,
    pub url: String,
    pub api_key: String,
}

/// Overseerr connection and login settings
#[derive(Debug, Clone, Deserialize)]
pub struct OverseerrConfig {
    pub url: String,
    pub api_key: String,
    pub email: String,
    pub password: String,
}

/// Retention thresholds
#[derive(Debug, Clone, Deserialize)]
pub struct RetentionConfig {
    /// Days granted when the requester is an administrator or absent
    pub admin_days: i64,
    /// Days granted when a non-admin user requested the movie
    pub user_days: i64,
    /// Days granted when the owner rated the movie at or below the cutoff
    pub low_rating_days: i64,
    /// Owner rating at or above this never expires (0-10)
    pub never_expire_rating: f64,
    /// Owner rating at or below this gets the aggressive window (0-10)
    pub low_rating_cutoff: f64,
    /// Width of the "expiring soon" warning window in days
    #[serde(default = "default_expiring_soon_days")]
    pub expiring_soon_days: i64,
    /// Movies evaluated concurrently
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

/// Top-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub plex: PlexConfig,
    pub tautulli: TautulliConfig,
    pub radarr: Vec<RadarrInstanceConfig>,
    pub overseerr: OverseerrConfig,
    /// Emails treated as administrators, matched case-insensitively
    #[serde(default)]
    pub admin_emails: Vec<String>,
    pub retention: RetentionConfig,
}

fn default_section() -> String {
    "Movies".to_string()
}

fn default_expiring_soon_days() -> i64 {
    30
}

fn default_concurrency() -> usize {
    10
}

impl Config {
    /// Load and validate configuration from a TOML file
    ///
    /// Read failures surface as [`Error::Io`]; the CLI layer attaches
    /// the path context.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Constraints the TOML schema cannot express
    fn validate(&self) -> Result<()> {
        if self.radarr.is_empty() {
            return Err(Error::Config(
                "At least one [[radarr]] instance is required".to_string(),
            ));
        }

        for instance in &self.radarr {
            if instance.url.trim().is_empty() || instance.api_key.trim().is_empty() {
                return Err(Error::Config(format!(
                    "Radarr instance '{}' is missing url or api_key",
                    instance.name
                )));
            }
        }

        let r = &self.retention;
        if r.admin_days <= 0 || r.user_days <= 0 || r.low_rating_days <= 0 {
            return Err(Error::Config(
                "Retention day thresholds must be positive".to_string(),
            ));
        }

        if r.expiring_soon_days <= 0 {
            return Err(Error::Config(
                "expiring_soon_days must be positive".to_string(),
            ));
        }

        if !(0.0..=10.0).contains(&r.never_expire_rating)
            || !(0.0..=10.0).contains(&r.low_rating_cutoff)
        {
            return Err(Error::Config(
                "Rating thresholds must be between 0 and 10".to_string(),
            ));
        }

        if r.low_rating_cutoff >= r.never_expire_rating {
            return Err(Error::Config(
                "low_rating_cutoff must be below never_expire_rating".to_string(),
            ));
        }

        if r.concurrency == 0 {
            return Err(Error::Config("concurrency must be at least 1".to_string()));
        }

        Ok(())
    }
}
