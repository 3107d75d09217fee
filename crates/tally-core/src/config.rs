//! Client configuration
//!
//! ## Resolution
//!
//! Settings are resolved in layers, later layers winning:
//! 1. Built-in defaults
//! 2. Config file (`~/.config/tally/config.toml` or an explicit path)
//! 3. Environment (`TALLY_API_URL`, `TALLY_SESSION_FILE`, `TALLY_TIMEOUT_SECS`)
//! 4. Command-line flags (applied by the caller)
//!
//! ```toml
//! api_url = "https://expenses.example.com/api"
//! session_file = "/home/me/.tally-session.json"
//! timeout_secs = 15
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

pub const API_URL_ENV: &str = "TALLY_API_URL";
pub const SESSION_FILE_ENV: &str = "TALLY_SESSION_FILE";
pub const TIMEOUT_ENV: &str = "TALLY_TIMEOUT_SECS";

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Resolved client settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the REST API, without a trailing slash
    pub api_url: String,
    /// Where the session (user + token) is persisted between runs
    pub session_file: PathBuf,
    pub timeout: Duration,
}

/// On-disk shape; every field optional
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    api_url: Option<String>,
    session_file: Option<PathBuf>,
    timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            session_file: default_session_path()
                .unwrap_or_else(|| PathBuf::from("tally-session.json")),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Load defaults, then the config file, then environment overrides.
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        let file = match path {
            Some(p) => Some(read_config_file(p)?),
            None => match default_config_path() {
                Some(p) if p.exists() => Some(read_config_file(&p)?),
                _ => None,
            },
        };
        if let Some(file) = file {
            config.apply_file(file);
        }

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn apply_file(&mut self, file: ConfigFile) {
        if let Some(url) = file.api_url {
            self.api_url = normalize_url(&url);
        }
        if let Some(path) = file.session_file {
            self.session_file = path;
        }
        if let Some(secs) = file.timeout_secs {
            self.timeout = Duration::from_secs(secs);
        }
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup(API_URL_ENV) {
            self.api_url = normalize_url(&url);
        }
        if let Some(path) = lookup(SESSION_FILE_ENV) {
            self.session_file = PathBuf::from(path);
        }
        if let Some(secs) = lookup(TIMEOUT_ENV) {
            let secs = secs.trim().parse::<u64>().map_err(|_| {
                Error::Config(format!("{} must be a number of seconds", TIMEOUT_ENV))
            })?;
            self.timeout = Duration::from_secs(secs);
        }
        Ok(())
    }

    /// Override the API URL (e.g. from a command-line flag)
    pub fn with_api_url(mut self, url: &str) -> Self {
        self.api_url = normalize_url(url);
        self
    }

    /// Override the session file (e.g. from a command-line flag)
    pub fn with_session_file(mut self, path: PathBuf) -> Self {
        self.session_file = path;
        self
    }
}

fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    debug!(path = %path.display(), "Loading config file");
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
    Ok(toml::from_str(&content)?)
}

/// Default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tally").join("config.toml"))
}

/// Default session file location
pub fn default_session_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("tally").join("session.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_file_then_env_layering() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "api_url = \"https://expenses.example.com/api/\"\ntimeout_secs = 5"
        )
        .unwrap();

        let mut config = ClientConfig::default();
        config.apply_file(read_config_file(file.path()).unwrap());
        assert_eq!(config.api_url, "https://expenses.example.com/api");
        assert_eq!(config.timeout, Duration::from_secs(5));

        let env: HashMap<&str, &str> = [
            (API_URL_ENV, "http://127.0.0.1:9000/api"),
            (SESSION_FILE_ENV, "/tmp/session.json"),
        ]
        .into_iter()
        .collect();
        config
            .apply_env(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.api_url, "http://127.0.0.1:9000/api");
        assert_eq!(config.session_file, PathBuf::from("/tmp/session.json"));
        // Untouched by env
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_bad_timeout_env_is_rejected() {
        let mut config = ClientConfig::default();
        let result = config.apply_env(|k| (k == TIMEOUT_ENV).then(|| "soon".to_string()));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_explicit_missing_file_errors() {
        let result = ClientConfig::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_url = ").unwrap();
        assert!(matches!(read_config_file(file.path()), Err(Error::Config(_))));
    }

    #[test]
    fn test_flag_overrides() {
        let config = ClientConfig::default()
            .with_api_url("http://localhost:3000/api/")
            .with_session_file(PathBuf::from("s.json"));
        assert_eq!(config.api_url, "http://localhost:3000/api");
        assert_eq!(config.session_file, PathBuf::from("s.json"));
    }
}
