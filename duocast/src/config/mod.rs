//! Configuration management for duocast.
//!
//! Settings are layered from:
//! 1. Default values
//! 2. Config file (`~/.duocast/config.toml`)
//! 3. Environment variables

mod schema;

pub use schema::{
    ConfigIssue, DuocastConfig, EmotionConfig, IssueLevel, LlmConfig, PodcastConfig,
    SpeechConfig, SummaryConfig, TranscriptConfig,
};

use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    /// TOML serialization error.
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    /// Missing required field.
    #[error("missing required config: {0}")]
    MissingField(String),
    /// Invalid value.
    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Get the default config directory path.
#[must_use]
pub fn default_config_dir() -> PathBuf {
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".duocast")
}

/// Get the default config file path.
#[must_use]
pub fn config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

/// Load configuration from the default path.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub async fn load_config() -> ConfigResult<DuocastConfig> {
    load_config_from(&config_path()).await
}

/// Load configuration from a specific path. A missing file yields defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub async fn load_config_from(path: &Path) -> ConfigResult<DuocastConfig> {
    if !path.exists() {
        info!(path = %path.display(), "config file not found, using defaults");
        return Ok(DuocastConfig::default());
    }

    let content = tokio::fs::read_to_string(path).await?;
    let config: DuocastConfig = toml::from_str(&content)?;
    debug!(path = %path.display(), "loaded config file");

    Ok(config)
}

/// Save configuration to a specific path.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub async fn save_config_to(config: &DuocastConfig, path: &Path) -> ConfigResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let content = toml::to_string_pretty(config)?;
    tokio::fs::write(path, content).await?;
    info!(path = %path.display(), "saved config file");

    Ok(())
}

/// Write a default config file at `path` unless one exists, then load it.
///
/// # Errors
///
/// Returns an error if the file cannot be written or read back.
pub async fn init_config(path: &Path) -> ConfigResult<DuocastConfig> {
    if path.exists() {
        debug!(path = %path.display(), "config file already present");
    } else {
        save_config_to(&DuocastConfig::default(), path).await?;
        info!("created default config at {}", path.display());
    }

    load_config_from(path).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn default_paths() {
        assert!(default_config_dir().ends_with(".duocast"));
        assert!(config_path().ends_with("config.toml"));
    }

    #[tokio::test]
    async fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml"))
            .await
            .unwrap();
        assert_eq!(config.summary.chunk_size, 15_000);
    }

    #[tokio::test]
    async fn init_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let created = init_config(&path).await.unwrap();
        assert!(path.exists());
        assert_eq!(created.speech.sample_rate, 44_100);

        let mut edited = created;
        edited.podcast.words_per_minute = 170;
        save_config_to(&edited, &path).await.unwrap();

        let again = init_config(&path).await.unwrap();
        assert_eq!(again.podcast.words_per_minute, 170);
    }

    #[tokio::test]
    async fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        tokio::fs::write(&path, "[summary\nchunk_size = ").await.unwrap();
        assert!(matches!(
            load_config_from(&path).await,
            Err(ConfigError::TomlParse(_))
        ));
    }
}
