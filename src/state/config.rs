use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub const API_URL_ENV: &str = "MOODBOARD_API_URL";
pub const DATA_DIR_ENV: &str = "MOODBOARD_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    /// Login and registration are limited to this e-mail domain.
    pub allowed_email_domain: String,
    pub data_dir: PathBuf,
    /// Dictation is stopped automatically after this many seconds.
    pub max_listen_secs: u64,
    pub include_music: bool,
    pub mpv_path: String,
    /// External recognizer printing one JSON event per line. Dictation is
    /// unavailable when unset.
    pub speech_command: Option<Vec<String>>,
    pub seek_step_secs: f64,
    pub volume_step: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            allowed_email_domain: "gmail.com".to_string(),
            data_dir: PathBuf::from(".moodboard"),
            max_listen_secs: 30,
            include_music: true,
            mpv_path: "mpv".to_string(),
            speech_command: None,
            seek_step_secs: 10.0,
            volume_step: 0.05,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config TOML from {:?}", path))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content =
            toml::to_string_pretty(&self).with_context(|| "Failed to serialize config to TOML")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        fs::write(path, content).with_context(|| format!("Failed to write config to {:?}", path))
    }

    /// Explicit path, else `<data_dir>/config.toml` if present, else
    /// defaults. Environment variables win over the file.
    pub fn resolve(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => {
                let mut probe = Self::default();
                probe.apply_env(|key| env::var(key).ok());
                let default_path = probe.config_path();
                if default_path.exists() {
                    Self::load(&default_path)?
                } else {
                    probe
                }
            }
        };

        config.apply_env(|key| env::var(key).ok());
        Ok(config)
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|v| !v.trim().is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join("config.toml")
    }

    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join("session.json")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    pub fn listen_limit(&self) -> Duration {
        Duration::from_secs(self.max_listen_secs)
    }
}
