//! Configuration loading from TOML files

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use folioline_core::{DEFAULT_PAGE_SIZE, HttpConfig, OkapiConfig};
use serde::Deserialize;

/// Global configuration for folioline
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub okapi: OkapiSection,
    pub output: OutputConfig,
    pub fetch: FetchConfig,
    pub http: HttpSection,
}

/// Gateway connection. Every field falls back to an `OKAPI_*` variable.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct OkapiSection {
    pub url: String,
    pub tenant: String,
    #[serde(deserialize_with = "deserialize_env_var")]
    pub username: Option<String>,
    #[serde(deserialize_with = "deserialize_env_var")]
    pub password: Option<String>,
}

impl Default for OkapiSection {
    fn default() -> Self {
        Self {
            url: std::env::var("OKAPI_URL").unwrap_or_default(),
            tenant: std::env::var("OKAPI_TENANT").unwrap_or_default(),
            username: std::env::var("OKAPI_USERNAME").ok(),
            password: std::env::var("OKAPI_PASSWORD").ok(),
        }
    }
}

impl std::fmt::Debug for OkapiSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OkapiSection")
            .field("url", &self.url)
            .field("tenant", &self.tenant)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./output"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub page_size: usize,
    /// Patron group id identifying staff users
    pub staff_patron_group: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            staff_patron_group: None,
        }
    }
}

/// Timeouts in seconds
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    pub connect_timeout: u64,
    pub request_timeout: u64,
}

impl Default for HttpSection {
    fn default() -> Self {
        let defaults = HttpConfig::default();
        Self {
            connect_timeout: defaults.connect_timeout.as_secs(),
            request_timeout: defaults.request_timeout.as_secs(),
        }
    }
}

/// Deserialize a string that may contain environment variable reference like ${VAR}
fn deserialize_env_var<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| expand_env_var(&s)))
}

/// Expand ${VAR} to environment variable value
fn expand_env_var(s: &str) -> Option<String> {
    if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(var_name).ok()
    } else {
        Some(s.to_string())
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./folioline.toml (current directory)
    /// 2. ~/.config/folioline/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("folioline.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "folioline") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Gateway settings, failing on the first missing one
    pub fn okapi(&self) -> Result<OkapiConfig> {
        anyhow::ensure!(
            !self.okapi.url.is_empty(),
            "Okapi URL not set ([okapi] url or OKAPI_URL)"
        );
        anyhow::ensure!(
            !self.okapi.tenant.is_empty(),
            "Okapi tenant not set ([okapi] tenant or OKAPI_TENANT)"
        );
        let username = self
            .okapi
            .username
            .clone()
            .context("Okapi username not set ([okapi] username or OKAPI_USERNAME)")?;
        let password = self
            .okapi
            .password
            .clone()
            .context("Okapi password not set ([okapi] password or OKAPI_PASSWORD)")?;
        Ok(OkapiConfig {
            base_url: self.okapi.url.clone(),
            tenant: self.okapi.tenant.clone(),
            username,
            password,
        })
    }

    pub fn http(&self) -> HttpConfig {
        HttpConfig {
            connect_timeout: Duration::from_secs(self.http.connect_timeout),
            request_timeout: Duration::from_secs(self.http.request_timeout),
        }
    }

    /// Staff patron group, CLI override first
    pub fn staff_patron_group(&self, cli: Option<&str>) -> Result<String> {
        cli.map(String::from)
            .or_else(|| self.fetch.staff_patron_group.clone())
            .context("Staff patron group not set ([fetch] staff_patron_group or --patron-group)")
    }
}
