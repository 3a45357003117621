//! CLI configuration loading

use anyhow::{Context, Result};
use bop_core::config::ApiConfig;
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Settings file looked up in the platform config directory
const SETTINGS_FILE: &str = "settings.json";

/// Credential file kept in the data directory
const CREDENTIALS_FILE: &str = "credentials.json";

/// Resolved client settings
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSettings {
    /// Backend base URL, e.g. `https://bop.example.com/api/v1`
    #[serde(default)]
    pub api_url: Option<String>,
    pub timeout_secs: u64,
    pub data_dir: PathBuf,
}

/// Values given on the command line; they win over every other source
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config_file: Option<PathBuf>,
    pub api_url: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

fn project_dirs() -> Option<ProjectDirs> {
    let dirs = ProjectDirs::from("com", "BOP", "bop");
    if dirs.is_none() {
        warn!("Failed to determine platform-specific directories, will use fallback");
    }
    dirs
}

/// Platform data directory, `./.bop` when none can be determined
pub fn default_data_dir() -> PathBuf {
    project_dirs().map_or_else(|| PathBuf::from("./.bop"), |d| d.data_dir().to_path_buf())
}

fn default_settings_file() -> Option<PathBuf> {
    project_dirs().map(|d| d.config_dir().join(SETTINGS_FILE))
}

impl ClientSettings {
    /// Load defaults, then the settings file, then `BOP_*` variables, then
    /// the command line
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named settings file is missing, or a
    /// source cannot be parsed
    pub fn load(overrides: &Overrides) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("timeout_secs", ApiConfig::REQUEST_TIMEOUT.as_secs())?
            .set_default("data_dir", default_data_dir().to_string_lossy().to_string())?;

        if let Some(path) = &overrides.config_file {
            debug!(path = %path.display(), "Loading settings file");
            builder = builder.add_source(config::File::from(path.as_path()).required(true));
        } else if let Some(path) = default_settings_file() {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix("BOP"))
            .set_override_option("api_url", overrides.api_url.clone())?
            .set_override_option(
                "data_dir",
                overrides
                    .data_dir
                    .as_ref()
                    .map(|p| p.to_string_lossy().to_string()),
            )?
            .set_override_option("timeout_secs", overrides.timeout_secs)?
            .build()
            .context("Failed to read client settings")?;

        settings
            .try_deserialize()
            .context("Invalid client settings")
    }

    /// Base URL to use, falling back to the local development backend
    pub fn api_url(&self) -> String {
        match self.api_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => {
                warn!(
                    "{} is not set, falling back to {}",
                    ApiConfig::API_URL_ENV,
                    ApiConfig::FALLBACK_API_URL
                );
                ApiConfig::FALLBACK_API_URL.to_string()
            }
        }
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.data_dir.join(CREDENTIALS_FILE)
    }
}

pub fn log_path_in(data_dir: &Path) -> PathBuf {
    data_dir.join("cli.log")
}
