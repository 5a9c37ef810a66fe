use super::schema::AppConfig;
use std::env;
use std::future::Future;
use std::path::PathBuf;
use thiserror::Error;
use tokio::fs;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Persistence for [`AppConfig`].
pub trait ConfigStore: Send + Sync + 'static {
    /// Stored configuration, or `None` when nothing usable is stored.
    fn load(&self) -> impl Future<Output = Option<AppConfig>> + Send;

    fn save(&self, config: &AppConfig) -> impl Future<Output = Result<(), ConfigError>> + Send;
}

/// Configuration kept as pretty-printed JSON in a single file.
#[derive(Debug, Clone)]
pub struct JsonConfigStore {
    path: PathBuf,
}

impl JsonConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigStore for JsonConfigStore {
    async fn load(&self) -> Option<AppConfig> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "No config file, using defaults");
                return None;
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to read config, using defaults");
                return None;
            }
        };
        match serde_json::from_str::<AppConfig>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to parse config, using defaults");
                None
            }
        }
    }

    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, json).await?;
        Ok(())
    }
}

/// Resolve the config path from `LYRICSYNC_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("LYRICSYNC_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// `$XDG_CONFIG_HOME/lyricsync/config.json`, or `~/.config/lyricsync/config.json`
/// when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("lyricsync").join("config.json"))
}
