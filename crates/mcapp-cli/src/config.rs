//! CLI configuration.
//!
//! Settings come from a TOML file (`~/.mcapp/config.toml` unless
//! `--config` names another) and are then overridden by global flags and
//! their environment variables.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cli::Cli;
use crate::error::CliError;

/// Directory under the home directory holding the config file.
const CONFIG_DIR: &str = ".mcapp";

/// Config file name.
const CONFIG_FILE: &str = "config.toml";

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Connection and context settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Management server URL, e.g. `https://rancher.example.com`.
    pub server_url: String,
    /// Bearer token.
    pub token: Option<String>,
    /// Current project ID, the default install target.
    pub project: Option<String>,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            token: None,
            project: None,
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Default config file location.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Loads the config file.
    ///
    /// An explicit path must exist. Without one, a missing default file
    /// yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!(
                "failed to read config file '{}': {e}",
                path.display()
            ))
        })?;
        debug!(path = %path.display(), "loaded config file");
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn from_toml(content: &str) -> Result<Self, CliError> {
        toml::from_str(content).map_err(|e| CliError::Config(format!("invalid TOML: {e}")))
    }

    /// Applies flag and environment overrides.
    #[must_use]
    pub fn with_overrides(
        mut self,
        server: Option<&str>,
        token: Option<&str>,
        project: Option<&str>,
    ) -> Self {
        if let Some(server) = server {
            self.server_url = server.to_string();
        }
        if let Some(token) = token {
            self.token = Some(token.to_string());
        }
        if let Some(project) = project {
            self.project = Some(project.to_string());
        }
        self
    }

    /// Builds the effective configuration for a parsed command line.
    ///
    /// # Errors
    ///
    /// Returns an error if loading or validation fails.
    pub fn resolve(cli: &Cli) -> Result<Self, CliError> {
        let config = Self::load(cli.config.as_deref())?.with_overrides(
            cli.server.as_deref(),
            cli.token.as_deref(),
            cli.project.as_deref(),
        );
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the server URL is missing or not http(s), or
    /// the timeout is zero.
    pub fn validate(&self) -> Result<(), CliError> {
        if self.server_url.is_empty() {
            return Err(CliError::Config(
                "server URL is not set, use --server or server_url in the config file".to_string(),
            ));
        }
        if !self.server_url.starts_with("http://") && !self.server_url.starts_with("https://") {
            return Err(CliError::Config(format!(
                "invalid server URL: {}, must start with http:// or https://",
                self.server_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(CliError::Config(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// The configured current project, if any.
    #[must_use]
    pub fn current_project(&self) -> Option<&str> {
        self.project.as_deref().filter(|p| !p.is_empty())
    }
}
