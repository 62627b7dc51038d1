use std::io;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use reqwest::Url;

use crate::spypoint_client::DEFAULT_API_BASE;

/// Rotate the log file once it would grow past this many bytes.
pub const LOG_MAX_BYTES: u64 = 1024 * 1024;
pub const DEFAULT_LOG_BACKUPS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CutoffMode {
    /// Only photos taken before midnight UTC yesterday.
    Yesterday,
    /// Every photo the API returns.
    All,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    Console,
    RotatingFile {
        path: PathBuf,
        max_bytes: u64,
        backups: usize,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub username: String,
    pub password: String,
    pub download_root: PathBuf,
    pub cutoff: CutoffMode,
    /// Keep going after a transport or write failure on one photo instead of aborting.
    pub continue_on_fetch_error: bool,
    pub log_sink: LogSink,
    pub api_base: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("username must not be empty")]
    EmptyUsername,
    #[error("password must not be empty")]
    EmptyPassword,
    #[error("download path {0} exists but is not a directory")]
    DownloadRootNotDirectory(PathBuf),
    #[error("api base '{0}' is not an http(s) url")]
    InvalidApiBase(String),
}

impl Config {
    pub fn new(username: &str, password: &str, download_root: impl Into<PathBuf>) -> Config {
        Config {
            username: username.to_string(),
            password: password.to_string(),
            download_root: download_root.into(),
            cutoff: CutoffMode::Yesterday,
            continue_on_fetch_error: true,
            log_sink: LogSink::Console,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.username.trim().is_empty() {
            return Err(ConfigError::EmptyUsername);
        }
        if self.password.is_empty() {
            return Err(ConfigError::EmptyPassword);
        }
        if self.download_root.exists() && !self.download_root.is_dir() {
            return Err(ConfigError::DownloadRootNotDirectory(
                self.download_root.clone(),
            ));
        }
        match Url::parse(&self.api_base) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
            _ => Err(ConfigError::InvalidApiBase(self.api_base.clone())),
        }
    }
}

/// Loads `KEY=value` pairs from `path` into the environment. A missing file is not
/// an error; an unreadable or malformed one is.
pub fn load_env_file(path: &Path) -> Result<(), dotenvy::Error> {
    match dotenvy::from_path(path) {
        Err(dotenvy::Error::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults() {
        let config = Config::new("hunter", "secret", "/data");
        assert_eq!(config.cutoff, CutoffMode::Yesterday);
        assert!(config.continue_on_fetch_error);
        assert_eq!(config.log_sink, LogSink::Console);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_missing_credentials() {
        let config = Config::new(" ", "secret", "/data");
        assert_eq!(config.validate(), Err(ConfigError::EmptyUsername));

        let config = Config::new("hunter", "", "/data");
        assert_eq!(config.validate(), Err(ConfigError::EmptyPassword));
    }

    #[test]
    fn rejects_file_as_root() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("photos");
        std::fs::write(&file, b"").unwrap();

        let config = Config::new("hunter", "secret", &file);
        assert_eq!(
            config.validate(),
            Err(ConfigError::DownloadRootNotDirectory(file))
        );
    }

    #[test]
    fn rejects_bad_api_base() {
        let mut config = Config::new("hunter", "secret", "/data");
        config.api_base = "ftp://restapi.example.com".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidApiBase(_))
        ));
    }

    #[test]
    fn missing_env_file_is_fine() {
        let dir = tempdir().unwrap();
        assert!(load_env_file(&dir.path().join(".env")).is_ok());
    }

    #[test]
    fn malformed_env_file_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "SPYPOINT_TEST_USERNAME hunter\n").unwrap();

        assert!(matches!(
            load_env_file(&path),
            Err(dotenvy::Error::LineParse(..))
        ));
    }
}
