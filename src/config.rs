use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::github::DEFAULT_API_URL;

/// Config file looked up in the current directory when no path is given.
pub const CONFIG_FILE: &str = ".gh-activity.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration loaded from .gh-activity.toml.
/// All fields are optional; the tool works with zero config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// Personal access token. `--token` wins over it, GITHUB_TOKEN loses.
    pub token: Option<String>,
    /// REST API root, for GitHub Enterprise installs.
    pub api_url: Option<String>,
}

impl Config {
    /// Load `path`, or .gh-activity.toml in the current directory when it exists.
    /// An explicitly given path must exist.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let default = Path::new(CONFIG_FILE);
                if default.exists() {
                    Self::load_from(default)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Token precedence: command line, config file, GITHUB_TOKEN.
    /// Empty values count as absent.
    pub fn resolve_token(&self, cli_token: Option<&str>) -> Option<String> {
        self.resolve_token_with(cli_token, std::env::var("GITHUB_TOKEN").ok())
    }

    fn resolve_token_with(
        &self,
        cli_token: Option<&str>,
        env_token: Option<String>,
    ) -> Option<String> {
        let present = |token: &String| !token.trim().is_empty();
        cli_token
            .map(str::to_string)
            .filter(present)
            .or_else(|| self.github.token.clone().filter(present))
            .or_else(|| env_token.filter(present))
    }

    pub fn api_url(&self) -> &str {
        self.github.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }
}
