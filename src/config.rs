use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const BACKEND_URL_ENV: &str = "RAGCHAT_BACKEND_URL";

/// Where the backend lives and how to reach it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend_url: String,
    pub upload_path: String,
    pub chat_path: String,
    /// Unset means requests never time out.
    pub request_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            upload_path: "/upload/".to_string(),
            chat_path: "/chat/".to_string(),
            request_timeout_secs: None,
        }
    }
}

impl Config {
    /// `<config dir>/ragchat/config.toml` on this platform.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "ragchat").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Defaults, then the config file, then the environment.
    ///
    /// An explicit path must exist; the default path is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => {
                let expanded = shellexpand::tilde(&path.to_string_lossy()).to_string();
                Self::from_file(Path::new(&expanded))?
            }
            None => match Self::default_path() {
                Some(path) if path.is_file() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        debug!(path = %path.display(), "loaded config file");
        Self::from_toml_str(&raw).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("Failed to parse config TOML")
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(BACKEND_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.backend_url = url.trim().to_string();
        }
    }

    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.backend_url)
            .with_context(|| format!("Invalid backend_url {:?}", self.backend_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("backend_url must be http or https, got {}", url.scheme());
        }
        for (key, path) in [("upload_path", &self.upload_path), ("chat_path", &self.chat_path)] {
            if path.trim().is_empty() {
                bail!("{key} must not be empty");
            }
        }
        Ok(())
    }

    /// Absolute URL of `path` on the backend.
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.backend_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }
}
