//! Configuration file handling.
//!
//! The configuration file is stored at `$WARD_REPORT_HOME/config.json` and
//! holds the reporting endpoint, request settings and front-end defaults.
//! The bot credential token is never stored here; it comes from the
//! environment only.

use crate::Result;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const APP_NAME: &str = "ward-report";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";

const DEFAULT_ENDPOINT: &str = "https://tirupati.emunicipal.ap.gov.in/ptis/report/dailyCollection";
const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_PORT: u16 = 10000;

fn default_user_agent() -> String {
    format!("ward-report/{}", env!("CARGO_PKG_VERSION"))
}

/// The runtime configuration. Instantiate it with the path to
/// `$WARD_REPORT_HOME`, from where it loads and validates `config.json`.
/// A `Config` is passed to the [`crate::Collector`] at construction; nothing
/// reads module-level or process-global settings.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    endpoint: Url,
}

impl Config {
    /// Creates the data directory and writes an initial `config.json` with
    /// default settings, optionally overriding the endpoint and the ward
    /// filter.
    ///
    /// # Errors
    /// Returns an error if file operations fail or the endpoint URL is
    /// invalid.
    pub async fn create(
        dir: impl Into<PathBuf>,
        endpoint_url: Option<&str>,
        revenue_ward: Option<&str>,
    ) -> Result<Self> {
        let root = dir.into();
        tokio::fs::create_dir_all(&root)
            .await
            .with_context(|| format!("Unable to create data directory {}", root.display()))?;

        let mut config_file = ConfigFile::default();
        if let Some(url) = endpoint_url {
            config_file.endpoint_url = url.to_string();
        }
        if let Some(ward) = revenue_ward {
            config_file.revenue_ward = ward.to_string();
        }
        let endpoint = parse_endpoint(&config_file.endpoint_url)?;

        let config_path = root.join(CONFIG_JSON);
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
            endpoint,
        })
    }

    /// Loads and validates `config.json` from `home`.
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        let root = home.into();
        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!(
                "The config file is missing '{}', run 'ward-report init' first",
                config_path.display()
            )
        }
        let config_file = ConfigFile::load(&config_path).await?;
        let endpoint = parse_endpoint(&config_file.endpoint_url)?;

        Ok(Self {
            root,
            config_path,
            config_file,
            endpoint,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// The reporting endpoint, used for both the handshake GET and the data
    /// POST.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Per-request timeout for upstream calls.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.config_file.timeout_secs)
    }

    pub fn user_agent(&self) -> &str {
        &self.config_file.user_agent
    }

    /// The `revenueWard` form filter. Empty means city-wide reporting; a
    /// fixed ward string limits the query to that ward.
    pub fn revenue_ward(&self) -> &str {
        &self.config_file.revenue_ward
    }

    /// Listening port for the web front end. `PORT` in the environment
    /// overrides this at the CLI layer.
    pub fn port(&self) -> u16 {
        self.config_file.port
    }

    /// Where spreadsheet exports are written. Relative paths resolve against
    /// the data directory.
    pub fn export_dir(&self) -> PathBuf {
        match &self.config_file.export_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => self.root.join(dir),
            None => self.root.clone(),
        }
    }

    /// A `Config` that never touches the filesystem, for unit tests.
    #[cfg(test)]
    pub(crate) fn for_tests(endpoint_url: &str, revenue_ward: &str) -> Self {
        let config_file = ConfigFile {
            endpoint_url: endpoint_url.to_string(),
            revenue_ward: revenue_ward.to_string(),
            ..ConfigFile::default()
        };
        let endpoint = parse_endpoint(&config_file.endpoint_url).unwrap();
        Self {
            root: PathBuf::from("."),
            config_path: PathBuf::from(CONFIG_JSON),
            config_file,
            endpoint,
        }
    }
}

fn parse_endpoint(url: &str) -> Result<Url> {
    Url::parse(url).with_context(|| format!("Invalid endpoint URL '{url}'"))
}

/// The serialization format of `config.json`.
///
/// Example:
/// ```json
/// {
///   "app_name": "ward-report",
///   "config_version": 1,
///   "endpoint_url": "https://tirupati.emunicipal.ap.gov.in/ptis/report/dailyCollection",
///   "timeout_secs": 15,
///   "user_agent": "ward-report/0.1.0",
///   "revenue_ward": "",
///   "port": 10000
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(default)]
struct ConfigFile {
    /// Application name, should always be "ward-report"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// The municipal daily-collection reporting endpoint
    endpoint_url: String,

    /// Per-request timeout in seconds
    timeout_secs: u64,

    /// User-Agent header sent upstream
    user_agent: String,

    /// Fixed ward filter for the data POST; empty means city-wide
    revenue_ward: String,

    /// Listening port for the web front end
    port: u16,

    /// Directory for spreadsheet exports (relative to the data directory or
    /// absolute); defaults to the data directory itself
    #[serde(skip_serializing_if = "Option::is_none")]
    export_dir: Option<PathBuf>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            endpoint_url: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: default_user_agent(),
            revenue_ward: String::new(),
            port: DEFAULT_PORT,
            export_dir: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written
    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        tokio::fs::write(path, data)
            .await
            .with_context(|| format!("Unable to write config file at {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn create_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("ward-report");

        let created = Config::create(&home, None, Some("Revenue Ward No 18"))
            .await
            .unwrap();
        assert_eq!(created.endpoint().as_str(), DEFAULT_ENDPOINT);
        assert_eq!(created.revenue_ward(), "Revenue Ward No 18");

        let loaded = Config::load(&home).await.unwrap();
        assert_eq!(loaded.endpoint().as_str(), DEFAULT_ENDPOINT);
        assert_eq!(loaded.revenue_ward(), "Revenue Ward No 18");
        assert_eq!(loaded.timeout(), Duration::from_secs(15));
        assert_eq!(loaded.port(), 10000);
    }

    #[tokio::test]
    async fn load_without_init_fails() {
        let dir = TempDir::new().unwrap();
        let result = Config::load(dir.path().join("nope")).await;
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("config file is missing"));
    }

    #[tokio::test]
    async fn custom_endpoint_is_honored() {
        let dir = TempDir::new().unwrap();
        let config = Config::create(dir.path(), Some("http://localhost:9999/report"), None)
            .await
            .unwrap();
        assert_eq!(config.endpoint().as_str(), "http://localhost:9999/report");
    }

    #[tokio::test]
    async fn invalid_endpoint_is_rejected() {
        let dir = TempDir::new().unwrap();
        let result = Config::create(dir.path(), Some("not a url"), None).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn invalid_app_name_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        let json = r#"{"app_name": "something-else"}"#;
        tokio::fs::write(&path, json).await.unwrap();

        let result = Config::load(dir.path()).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[tokio::test]
    async fn minimal_config_gets_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_JSON);
        let json = r#"{"app_name": "ward-report", "port": 8080}"#;
        tokio::fs::write(&path, json).await.unwrap();

        let config = Config::load(dir.path()).await.unwrap();
        assert_eq!(config.port(), 8080);
        assert_eq!(config.endpoint().as_str(), DEFAULT_ENDPOINT);
        assert_eq!(config.revenue_ward(), "");
    }

    #[test]
    fn export_dir_resolves_relative_to_root() {
        let config = Config::for_tests("http://localhost/x", "");
        assert_eq!(config.export_dir(), PathBuf::from("."));
    }
}
