//! DiskForge configuration: the JSON file at `$HOME/.diskforge/config.json`
//! (or a caller-supplied path) that governs logging, safety, and backup
//! behavior.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("could not determine home directory")]
    NoHomeDirectory,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Info
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub file_enabled: bool,
    pub console_enabled: bool,
    pub json_format: bool,
    pub log_directory: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            file_enabled: true,
            console_enabled: true,
            json_format: false,
            log_directory: default_home_subdir(".diskforge/logs"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    pub danger_mode_enabled: bool,
    pub require_confirmation: bool,
    pub confirmation_timeout_seconds: u64,
    pub preflight_checks_enabled: bool,
    pub dry_run_default: bool,
    pub smart_check_enabled: bool,
    pub mounted_volume_protection: bool,
    pub system_disk_protection: bool,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            danger_mode_enabled: false,
            require_confirmation: true,
            confirmation_timeout_seconds: 300,
            preflight_checks_enabled: true,
            dry_run_default: true,
            smart_check_enabled: true,
            mounted_volume_protection: true,
            system_disk_protection: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultCompression {
    None,
    Gzip,
    Lz4,
    Zstd,
}

impl Default for DefaultCompression {
    fn default() -> Self {
        Self::Zstd
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    pub default_compression: DefaultCompression,
    pub compression_level: u32,
    pub verify_after_write: bool,
    pub chunk_size_mb: u32,
    pub temp_directory: Option<PathBuf>,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            default_compression: DefaultCompression::default(),
            compression_level: 3,
            verify_after_write: true,
            chunk_size_mb: 64,
            temp_directory: None,
        }
    }
}

impl BackupConfig {
    /// Reject out-of-range fields: `compression_level ∈ [1,22]`,
    /// `chunk_size_mb ∈ [1,1024]`.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(1..=22).contains(&self.compression_level) {
            return Err(format!(
                "compression_level must be in [1, 22], got {}",
                self.compression_level
            ));
        }
        if !(1..=1024).contains(&self.chunk_size_mb) {
            return Err(format!(
                "chunk_size_mb must be in [1, 1024], got {}",
                self.chunk_size_mb
            ));
        }
        Ok(())
    }
}

/// System-level backup scope: inert data consumed by the (external)
/// migration/rescue-media generators, carried here because the original
/// implementation ships it and `Config` round-trips it field-for-field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemBackupConfig {
    pub include_recovery_partitions: bool,
    pub include_swap_partitions: bool,
    pub include_hidden_partitions: bool,
    pub include_reserved_partitions: bool,
    pub required_mountpoints: Vec<String>,
    pub capture_partition_table: bool,
    pub capture_boot_metadata: bool,
}

impl Default for SystemBackupConfig {
    fn default() -> Self {
        Self {
            include_recovery_partitions: true,
            include_swap_partitions: false,
            include_hidden_partitions: true,
            include_reserved_partitions: true,
            required_mountpoints: vec!["/".into(), "/boot".into(), "/boot/efi".into()],
            capture_partition_table: true,
            capture_boot_metadata: true,
        }
    }
}

/// Layout-only GUI preferences; the core never reads these beyond
/// round-tripping them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub theme: String,
    pub refresh_interval_ms: u32,
    pub show_hidden_partitions: bool,
    pub confirm_dialog_timeout_seconds: u32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: "system".into(),
            refresh_interval_ms: 5000,
            show_hidden_partitions: false,
            confirm_dialog_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskForgeConfig {
    pub logging: LoggingConfig,
    pub safety: SafetyConfig,
    pub backup: BackupConfig,
    pub system_backup: SystemBackupConfig,
    pub ui: UiConfig,
    pub session_directory: PathBuf,
    pub plugin_directories: Vec<PathBuf>,
}

impl Default for DiskForgeConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            safety: SafetyConfig::default(),
            backup: BackupConfig::default(),
            system_backup: SystemBackupConfig::default(),
            ui: UiConfig::default(),
            session_directory: default_home_subdir(".diskforge/sessions"),
            plugin_directories: Vec::new(),
        }
    }
}

impl DiskForgeConfig {
    pub fn default_path() -> Result<PathBuf> {
        Ok(home_dir()?.join(".diskforge").join("config.json"))
    }

    /// Load from `path`, or from the default path, falling back to
    /// defaults when no file exists yet. `load(save(c)) == c` only once
    /// a file has actually been written.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let data = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config: Self = serde_json::from_str(&data)?;
        Ok(config)
    }

    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: path.clone(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json).map_err(|source| ConfigError::Write { path, source })
    }

    pub fn ensure_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.logging.log_directory).map_err(|source| ConfigError::Write {
            path: self.logging.log_directory.clone(),
            source,
        })?;
        fs::create_dir_all(&self.session_directory).map_err(|source| ConfigError::Write {
            path: self.session_directory.clone(),
            source,
        })?;
        if let Some(tmp) = &self.backup.temp_directory {
            fs::create_dir_all(tmp).map_err(|source| ConfigError::Write {
                path: tmp.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Path for a new session report file, named after the session's
    /// short id.
    pub fn session_report_path(&self, session_short_id: &str) -> PathBuf {
        self.session_directory
            .join(format!("report_{session_short_id}.json"))
    }
}

fn home_dir() -> Result<PathBuf> {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or(ConfigError::NoHomeDirectory)
}

fn default_home_subdir(rel: &str) -> PathBuf {
    home_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(rel)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_json() {
        let config = DiskForgeConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: DiskForgeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn load_save_round_trip_is_field_wise_equal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = DiskForgeConfig::default();
        config.safety.confirmation_timeout_seconds = 123;
        config.backup.compression_level = 9;
        config.save(Some(&path)).unwrap();

        let loaded = DiskForgeConfig::load(Some(&path)).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does_not_exist.json");
        let config = DiskForgeConfig::load(Some(&path)).unwrap();
        assert_eq!(config, DiskForgeConfig::default());
    }

    #[test]
    fn backup_config_rejects_out_of_range_values() {
        let mut config = BackupConfig::default();
        config.compression_level = 0;
        assert!(config.validate().is_err());

        config.compression_level = 3;
        config.chunk_size_mb = 2000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn tolerates_unknown_keys_when_loading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            serde_json::json!({
                "logging": {},
                "safety": {},
                "backup": {},
                "system_backup": {},
                "ui": {},
                "session_directory": "/tmp/x",
                "plugin_directories": [],
                "some_future_field": true,
            })
            .to_string(),
        )
        .unwrap();

        let config = DiskForgeConfig::load(Some(&path)).unwrap();
        assert_eq!(config.session_directory, PathBuf::from("/tmp/x"));
    }
}
