use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::{
    cache::{CacheSettings, DEFAULT_CACHE_MAX_ENTRIES, DEFAULT_CACHE_TTL},
    model::MAX_PERIODS,
    provider::{nominatim::NOMINATIM_URL, nws::NWS_URL},
};

const USER_AGENT_BASE: &str = concat!("forecast-cli/", env!("CARGO_PKG_VERSION"));

/// Optional overrides for the upstream base URLs.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Endpoints {
    pub nominatim: Option<String>,
    pub nws: Option<String>,
}

/// Cache tuning. Missing fields fall back to the built-in defaults.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
    pub max_entries: u64,
    pub max_periods: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_CACHE_TTL.as_secs(),
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            max_periods: MAX_PERIODS,
        }
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Contact appended to the User-Agent. Nominatim and NWS both ask
    /// clients to identify themselves.
    pub contact: Option<String>,

    /// Example TOML:
    /// [endpoints]
    /// nws = "http://localhost:8080"
    #[serde(default)]
    pub endpoints: Endpoints,

    #[serde(default)]
    pub cache: CacheConfig,
}

impl Config {
    pub fn nominatim_url(&self) -> &str {
        self.endpoints.nominatim.as_deref().unwrap_or(NOMINATIM_URL)
    }

    pub fn nws_url(&self) -> &str {
        self.endpoints.nws.as_deref().unwrap_or(NWS_URL)
    }

    pub fn user_agent(&self) -> String {
        match self.contact.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            Some(contact) => format!("{USER_AGENT_BASE} ({contact})"),
            None => USER_AGENT_BASE.to_string(),
        }
    }

    pub fn cache_settings(&self) -> CacheSettings {
        CacheSettings {
            ttl: Duration::from_secs(self.cache.ttl_secs),
            max_entries: self.cache.max_entries,
        }
    }

    pub fn max_periods(&self) -> usize {
        self.cache.max_periods
    }

    pub fn set_contact(&mut self, contact: String) {
        let contact = contact.trim().to_string();
        self.contact = (!contact.is_empty()).then_some(contact);
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        if cfg.cache.max_periods == 0 {
            return Err(anyhow!("cache.max_periods must be at least 1"));
        }
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "forecast", "forecast-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
