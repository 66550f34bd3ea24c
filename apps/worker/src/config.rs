use std::{env, fmt, fs, path};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use upcheck::monitoring::DEFAULT_INTERVAL;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to read {}: {}", .0.display(), .1)]
    ReadFailed(path::PathBuf, #[source] std::io::Error),
    #[error("Failed to write {}: {}", .0.display(), .1)]
    WriteFailed(path::PathBuf, #[source] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseFailed(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeFailed(#[from] toml::ser::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
    #[error("No config path available, set XDG_CONFIG_HOME or HOME")]
    ConfigPathUnavailable,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scheduler: Scheduler,
    pub storage: Storage,
    pub history: History,
    pub logging: Logging,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scheduler {
    pub interval_seconds: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    File,
    Libsql,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::File => write!(f, "file"),
            Backend::Libsql => write!(f, "libsql"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Storage {
    pub backend: Backend,
    /// Directory of check files, or database file for libsql
    pub path: path::PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct History {
    pub enabled: bool,
    pub path: path::PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub format: String,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self { interval_seconds: DEFAULT_INTERVAL.as_secs() }
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self { backend: Backend::File, path: ".data/checks".into() }
    }
}

impl Default for History {
    fn default() -> Self {
        Self { enabled: true, path: ".logs".into() }
    }
}

impl Default for Logging {
    fn default() -> Self {
        Self { level: "info".into(), format: "compact".into() }
    }
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($XDG_CONFIG_HOME/uppe/worker.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, Error> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(Error::ConfigPathUnavailable);
    };

    Ok(path.join("uppe/worker.toml"))
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "  {:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_title_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str| {
                writeln!(f, "{:indent$}{}", "", label, indent = level * 2)
            }
        };

        let write_title_1 = write_title_indented(1);
        let write_1 = write_indented(1);

        writeln!(f, "Current Worker Configuration:")?;
        write_title_1(f, "Scheduler")?;
        write_1(f, "Interval (s)", &self.scheduler.interval_seconds)?;
        write_title_1(f, "Storage")?;
        write_1(f, "Backend", &self.storage.backend)?;
        write_1(f, "Path", &self.storage.path.display())?;
        write_title_1(f, "History")?;
        write_1(f, "Enabled", &self.history.enabled)?;
        write_1(f, "Path", &self.history.path.display())?;
        write_title_1(f, "Logging")?;
        write_1(f, "Level", &self.logging.level)?;
        write_1(f, "Format", &self.logging.format)?;

        Ok(())
    }
}

impl Config {
    /// Generate Config structure from file
    ///
    /// Creates a default config in ~/.config/uppe/worker.toml
    ///  or the specified path if one does not exist
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, Error> {
        let config_path: path::PathBuf = if let Some(path) = optional_path {
            normalize_toml_path(path.as_ref())
        } else {
            default_config_path()?
        };

        let config = if config_path.exists() {
            let raw_string = fs::read_to_string(&config_path)
                .map_err(|err| Error::ReadFailed(config_path.clone(), err))?;
            toml::from_str::<Self>(raw_string.as_str())?
        } else {
            let config = Self::default();
            config.write_config(&config_path)?;
            config
        };

        config.validate()?;
        Ok(config)
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &path::Path) -> Result<(), Error> {
        let config_str: String = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| Error::WriteFailed(parent.to_path_buf(), err))?;
        }

        fs::write(path, config_str).map_err(|err| Error::WriteFailed(path.to_path_buf(), err))
    }

    fn validate(&self) -> Result<(), Error> {
        if self.scheduler.interval_seconds == 0 {
            return Err(Error::Invalid("scheduler.interval_seconds must be at least 1".into()));
        }
        if self.storage.path.as_os_str().is_empty() {
            return Err(Error::Invalid("storage.path cannot be empty".into()));
        }
        if self.history.enabled && self.history.path.as_os_str().is_empty() {
            return Err(Error::Invalid("history.path cannot be empty when history is enabled".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/worker.toml");

        let config = Config::from_config(Some(&path)).unwrap();

        assert_eq!(config, Config::default());
        assert!(path.exists());
        assert_eq!(Config::from_config(Some(&path)).unwrap(), config);
    }

    #[test]
    fn test_extension_is_normalized() {
        let dir = tempdir().unwrap();
        Config::from_config(Some(dir.path().join("worker"))).unwrap();

        assert!(dir.path().join("worker.toml").exists());
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("worker.toml");
        fs::write(&path, "[scheduler]\ninterval_seconds = 15\n\n[storage]\nbackend = \"libsql\"\npath = \"checks.db\"\n").unwrap();

        let config = Config::from_config(Some(&path)).unwrap();

        assert_eq!(config.scheduler.interval_seconds, 15);
        assert_eq!(config.storage.backend, Backend::Libsql);
        assert_eq!(config.storage.path, path::PathBuf::from("checks.db"));
        assert_eq!(config.history, History::default());
        assert_eq!(config.logging, Logging::default());
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("worker.toml");
        fs::write(&path, "[scheduler]\ninterval_seconds = 0\n").unwrap();

        assert!(matches!(Config::from_config(Some(&path)), Err(Error::Invalid(_))));
    }

    #[test]
    fn test_unknown_backend_fails_to_parse() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("worker.toml");
        fs::write(&path, "[storage]\nbackend = \"postgres\"\n").unwrap();

        assert!(matches!(Config::from_config(Some(&path)), Err(Error::ParseFailed(_))));
    }

    #[test]
    fn test_display_lists_every_section() {
        let rendered = Config::default().to_string();

        for section in ["Scheduler", "Storage", "History", "Logging"] {
            assert!(rendered.contains(section), "missing {section} in:\n{rendered}");
        }
        assert!(rendered.contains("Interval (s): 60"));
    }
}
