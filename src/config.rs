//! Runtime settings.
//!
//! Precedence, highest first: command line / environment, YAML file, built-in
//! defaults. The API key is only read from the command line or environment.
//!
//! ```yaml
//! bind: 127.0.0.1:5000
//! target_url: https://news.ycombinator.com/
//! model: gpt-4o
//! api_base: https://api.openai.com/v1
//! debug_dump: hn_content.html
//! fetch_timeout_secs: 30
//! completion_timeout_secs: 120
//! allow_missing_api_key: false
//! ```

use crate::api::DEFAULT_API_BASE;
use crate::cli::Cli;
use crate::error::ConfigError;
use crate::extractor::DEFAULT_MODEL;
use crate::fetcher::{DEFAULT_DEBUG_DUMP, DEFAULT_TARGET_URL};
use serde::Deserialize;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use url::Url;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_COMPLETION_TIMEOUT_SECS: u64 = 120;

/// Contents of the optional YAML settings file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub bind: Option<SocketAddr>,
    pub target_url: Option<String>,
    pub model: Option<String>,
    pub api_base: Option<String>,
    pub debug_dump: Option<PathBuf>,
    pub fetch_timeout_secs: Option<u64>,
    pub completion_timeout_secs: Option<u64>,
    pub allow_missing_api_key: Option<bool>,
}

impl FileConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Fully resolved settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind: SocketAddr,
    pub target_url: Url,
    pub model: String,
    pub api_base: Url,
    pub api_key: Option<String>,
    pub debug_dump: PathBuf,
    pub fetch_timeout: Duration,
    pub completion_timeout: Duration,
    pub allow_missing_api_key: bool,
}

impl Settings {
    /// Read the `--config` file if one was given and merge it with `cli`.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => {
                let file = FileConfig::from_path(path)?;
                info!(path = %path.display(), "Loaded configuration file");
                file
            }
            None => FileConfig::default(),
        };
        Self::resolve(cli, file)
    }

    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self, ConfigError> {
        let target_url = cli
            .target_url
            .clone()
            .or(file.target_url)
            .unwrap_or_else(|| DEFAULT_TARGET_URL.to_string());
        let api_base = cli
            .api_base
            .clone()
            .or(file.api_base)
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        Ok(Self {
            bind: cli
                .bind
                .or(file.bind)
                .unwrap_or_else(|| SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT))),
            target_url: parse_url("target_url", target_url)?,
            model: cli
                .model
                .clone()
                .or(file.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_base: parse_url("api_base", api_base)?,
            api_key: cli.api_key.clone().filter(|k| !k.trim().is_empty()),
            debug_dump: cli
                .debug_dump
                .clone()
                .or(file.debug_dump)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DEBUG_DUMP)),
            fetch_timeout: Duration::from_secs(
                cli.fetch_timeout_secs
                    .or(file.fetch_timeout_secs)
                    .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS),
            ),
            completion_timeout: Duration::from_secs(
                cli.completion_timeout_secs
                    .or(file.completion_timeout_secs)
                    .unwrap_or(DEFAULT_COMPLETION_TIMEOUT_SECS),
            ),
            allow_missing_api_key: cli.allow_missing_api_key
                || file.allow_missing_api_key.unwrap_or(false),
        })
    }

    /// Refuse to start without a key unless explicitly allowed.
    pub fn check_api_key(&self) -> Result<(), ConfigError> {
        match (&self.api_key, self.allow_missing_api_key) {
            (Some(_), _) | (None, true) => Ok(()),
            (None, false) => Err(ConfigError::MissingApiKey),
        }
    }
}

fn parse_url(field: &'static str, value: String) -> Result<Url, ConfigError> {
    Url::parse(&value).map_err(|source| ConfigError::InvalidUrl {
        field,
        value,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::resolve(&Cli::default(), FileConfig::default()).unwrap();
        assert_eq!(s.bind, "127.0.0.1:5000".parse().unwrap());
        assert_eq!(s.target_url.as_str(), "https://news.ycombinator.com/");
        assert_eq!(s.model, "gpt-4o");
        assert_eq!(s.api_base.as_str(), "https://api.openai.com/v1");
        assert_eq!(s.api_key, None);
        assert_eq!(s.debug_dump, PathBuf::from("hn_content.html"));
        assert_eq!(s.fetch_timeout, Duration::from_secs(30));
        assert_eq!(s.completion_timeout, Duration::from_secs(120));
        assert!(!s.allow_missing_api_key);
    }

    #[test]
    fn test_cli_overrides_file() {
        let file: FileConfig = serde_yaml::from_str(
            "model: from-file\nbind: 0.0.0.0:7000\nfetch_timeout_secs: 5\n",
        )
        .unwrap();
        let cli = Cli {
            model: Some("from-cli".to_string()),
            ..Cli::default()
        };
        let s = Settings::resolve(&cli, file).unwrap();
        assert_eq!(s.model, "from-cli");
        assert_eq!(s.bind, "0.0.0.0:7000".parse().unwrap());
        assert_eq!(s.fetch_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_unknown_file_key_is_rejected() {
        assert!(serde_yaml::from_str::<FileConfig>("api_key: sk-nope\n").is_err());
    }

    #[test]
    fn test_invalid_url() {
        let cli = Cli {
            target_url: Some("news.ycombinator.com".to_string()),
            ..Cli::default()
        };
        match Settings::resolve(&cli, FileConfig::default()) {
            Err(ConfigError::InvalidUrl { field, .. }) => assert_eq!(field, "target_url"),
            other => panic!("expected invalid url, got {other:?}"),
        }
    }

    #[test]
    fn test_api_key_check() {
        let mut s = Settings::resolve(&Cli::default(), FileConfig::default()).unwrap();
        assert!(matches!(s.check_api_key(), Err(ConfigError::MissingApiKey)));

        s.allow_missing_api_key = true;
        assert!(s.check_api_key().is_ok());

        let cli = Cli {
            api_key: Some("sk-test".to_string()),
            ..Cli::default()
        };
        let s = Settings::resolve(&cli, FileConfig::default()).unwrap();
        assert!(s.check_api_key().is_ok());
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        let cli = Cli {
            api_key: Some("  ".to_string()),
            ..Cli::default()
        };
        let s = Settings::resolve(&cli, FileConfig::default()).unwrap();
        assert_eq!(s.api_key, None);
    }

    #[test]
    fn test_load_reads_yaml_file() {
        let path = std::env::temp_dir().join(format!("awful_hn_cfg_{}.yaml", std::process::id()));
        std::fs::write(&path, "debug_dump: /tmp/hn.html\nallow_missing_api_key: true\n").unwrap();
        let cli = Cli {
            config: Some(path.clone()),
            ..Cli::default()
        };
        let s = Settings::load(&cli).unwrap();
        assert_eq!(s.debug_dump, PathBuf::from("/tmp/hn.html"));
        assert!(s.allow_missing_api_key);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file() {
        let cli = Cli {
            config: Some(PathBuf::from("/definitely/not/here.yaml")),
            ..Cli::default()
        };
        assert!(matches!(Settings::load(&cli), Err(ConfigError::Read { .. })));
    }
}
