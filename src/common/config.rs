//! Configuration file handling

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use super::paths::config_path;
use super::{Error, Result};
use crate::session::{Credentials, Role};

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Backend connection settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Login credentials per role
    #[serde(default)]
    pub accounts: Accounts,

    /// Report output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Backend connection settings
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// API root, e.g. `http://localhost:8000/api`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_timeout() -> u64 {
    10
}

/// Credentials for the three roles the workflow acts as
#[derive(Debug, Deserialize)]
pub struct Accounts {
    #[serde(default = "default_client")]
    pub client: Credentials,

    #[serde(default = "default_manager")]
    pub manager: Credentials,

    #[serde(default = "default_admin")]
    pub admin: Credentials,
}

impl Default for Accounts {
    fn default() -> Self {
        Self {
            client: default_client(),
            manager: default_manager(),
            admin: default_admin(),
        }
    }
}

fn default_client() -> Credentials {
    Credentials::new("juan_cliente", "juan123")
}
fn default_manager() -> Credentials {
    Credentials::new("carlos_manager", "carlos123")
}
fn default_admin() -> Credentials {
    Credentials::new("admin", "admin123")
}

impl Accounts {
    /// Credentials for a role
    pub fn get(&self, role: Role) -> &Credentials {
        match role {
            Role::Client => &self.client,
            Role::Manager => &self.manager,
            Role::Admin => &self.admin,
        }
    }
}

/// Report output configuration
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Characters of a raw response body echoed in verbose mode
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,

    /// Entries printed from long listings (transactions, audit log)
    #[serde(default = "default_list_preview")]
    pub list_preview: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            preview_chars: default_preview_chars(),
            list_preview: default_list_preview(),
        }
    }
}

fn default_preview_chars() -> usize {
    300
}
fn default_list_preview() -> usize {
    3
}

impl Config {
    /// Load configuration
    ///
    /// An explicit path must exist. Without one, the default config file is
    /// used when present and built-in defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_file(path);
        }

        if let Some(path) = config_path() {
            if path.exists() {
                return Self::load_file(&path);
            }
        }
        Ok(Self::default())
    }

    fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Replace the base URL (CLI flag / environment override)
    pub fn override_base_url(&mut self, base_url: Option<String>) {
        if let Some(url) = base_url {
            self.server.base_url = url;
        }
    }

    /// Per-request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.server.timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.server.base_url.trim().is_empty() {
            return Err(Error::Config("server.base_url must not be empty".to_string()));
        }
        if self.server.timeout_secs == 0 {
            return Err(Error::Config("server.timeout_secs must be at least 1".to_string()));
        }
        for role in Role::ALL {
            if self.accounts.get(role).username.is_empty() {
                return Err(Error::Config(format!("accounts.{role}.username must not be empty")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_local_backend() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.base_url, "http://localhost:8000/api");
        assert_eq!(config.server.timeout_secs, 10);
        assert_eq!(config.accounts.client.username, "juan_cliente");
        assert_eq!(config.accounts.manager.username, "carlos_manager");
        assert_eq!(config.accounts.admin.username, "admin");
        assert_eq!(config.output.list_preview, 3);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = Config::parse(
            r#"
[server]
base_url = "https://shop.example.com/api/"

[accounts.manager]
username = "maria"
password = "s3cret"
"#,
        )
        .unwrap();
        assert_eq!(config.server.base_url, "https://shop.example.com/api/");
        assert_eq!(config.server.timeout_secs, 10);
        assert_eq!(config.accounts.get(Role::Manager).username, "maria");
        assert_eq!(config.accounts.get(Role::Client).username, "juan_cliente");
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = Config::parse("[server]\ntimeout_secs = 0\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let err = Config::parse("[server\nbase_url = 1").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let err = Config::load(Some(Path::new("/nonexistent/returns-smoke.toml"))).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }

    #[test]
    fn test_base_url_override() {
        let mut config = Config::default();
        config.override_base_url(Some("http://10.0.0.5/api".to_string()));
        assert_eq!(config.server.base_url, "http://10.0.0.5/api");
        config.override_base_url(None);
        assert_eq!(config.server.base_url, "http://10.0.0.5/api");
    }
}
