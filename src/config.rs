use anyhow::{bail, Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::DataSourceError;
use crate::filter::FilterSet;

/// Largest page size the GitHub listing endpoints accept
pub const MAX_PER_PAGE: u8 = 100;

/// Main configuration structure for repofilter
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    /// GitHub authentication and listing settings
    #[serde(default)]
    pub github: GitHubConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// GitHub configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GitHubConfig {
    /// Authentication method
    #[serde(default = "default_auth_method")]
    pub auth_method: String, // "auto", "gh_cli", "token"

    /// Organization whose repositories are listed
    pub organization: Option<String>,

    /// API root for GitHub Enterprise Server (api.github.com if null)
    pub base_url: Option<String>,

    /// Repositories requested per page
    #[serde(default = "default_per_page")]
    pub per_page: u8,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String, // "info"

    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,
}

// Default value functions
fn default_auth_method() -> String {
    "auto".to_string()
}
fn default_per_page() -> u8 {
    MAX_PER_PAGE
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            auth_method: default_auth_method(),
            organization: None,
            base_url: None,
            per_page: default_per_page(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            color: default_true(),
        }
    }
}

impl Config {
    /// Load configuration from the default location or create a default config
    pub fn load_or_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load(&config_path)
        } else {
            let config = Self::default();

            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
            }

            config.save(&config_path)?;

            tracing::info!("Created default configuration at: {:?}", config_path);
            Ok(config)
        }
    }

    /// Load configuration from a specific file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {:?}", path))?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    /// Get the default configuration file path (XDG compliant)
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = config_dir().context("Failed to get user config directory")?;

        Ok(config_dir.join("repofilter").join("config.yml"))
    }

    /// Reject settings that would only fail later, mid-read
    pub fn validate(&self) -> Result<()> {
        match self.github.auth_method.as_str() {
            "auto" | "gh_cli" | "token" => {}
            other => bail!("Unknown auth method: {}", other),
        }

        if self.github.per_page == 0 || self.github.per_page > MAX_PER_PAGE {
            bail!(
                "github.per_page must be between 1 and {}, got {}",
                MAX_PER_PAGE,
                self.github.per_page
            );
        }

        Ok(())
    }

    /// Organization to list, with an optional override taking precedence
    pub fn organization(&self, override_org: Option<&str>) -> Result<String, DataSourceError> {
        override_org
            .map(str::to_string)
            .or_else(|| self.github.organization.clone())
            .filter(|org| !org.trim().is_empty())
            .ok_or_else(|| {
                DataSourceError::Config(
                    "no organization configured; set github.organization or pass --org"
                        .to_string(),
                )
            })
    }
}

/// Typed input of a single read: the ordered filter list.
///
/// Filters are compiled when the input is built, so holding a `ReadInput`
/// means every pattern is valid.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawReadInput")]
pub struct ReadInput {
    filters: FilterSet,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawReadInput {
    filters: Vec<String>,
}

impl TryFrom<RawReadInput> for ReadInput {
    type Error = DataSourceError;

    fn try_from(raw: RawReadInput) -> Result<Self, Self::Error> {
        Self::new(raw.filters)
    }
}

impl ReadInput {
    pub fn new<S: AsRef<str>>(filters: impl IntoIterator<Item = S>) -> Result<Self, DataSourceError> {
        let raw: Vec<S> = filters.into_iter().collect();
        Ok(Self {
            filters: FilterSet::compile(&raw)?,
        })
    }

    /// Load a read input document (YAML or JSON) from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {:?}", path))?;

        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse input file: {:?}", path))
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }
}
