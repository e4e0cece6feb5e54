use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
  pub sources: SourcesConfig,
  pub storage: StorageConfig,
  pub logging: LoggingConfig,
  /// Records per page when `--limit` isn't given
  pub page_size: u32,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      sources: SourcesConfig::default(),
      storage: StorageConfig::default(),
      logging: LoggingConfig::default(),
      page_size: 10,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
  /// Base URL of the commerce API serving products
  pub products_url: String,
  /// Base URL of the game-data API serving berries
  pub berries_url: String,
  /// Berry detail requests kept in flight per page
  pub concurrency: usize,
}

impl Default for SourcesConfig {
  fn default() -> Self {
    Self {
      products_url: "https://fakestoreapi.com".to_string(),
      berries_url: "https://pokeapi.co/api/v2".to_string(),
      concurrency: 8,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
  /// Set to false to keep edits in memory only
  pub enabled: bool,
  /// SQLite file holding persisted collections (default: $XDG_DATA_HOME/equinox/store.db)
  pub path: Option<PathBuf>,
}

impl Default for StorageConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      path: None,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
  /// Filter directive, overridden by EQUINOX_LOG
  pub level: String,
  /// Directory for log files (default: $XDG_DATA_HOME/equinox/logs)
  pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: "info".to_string(),
      directory: None,
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./equinox.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/equinox/config.yaml
  ///
  /// Nothing here is secret, so with no file at all the defaults are used.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("equinox.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("equinox").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    // An empty file deserializes to null
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    Ok(serde_yaml::from_str(contents)?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.page_size, 10);
    assert_eq!(config.sources.berries_url, "https://pokeapi.co/api/v2");
    assert!(config.storage.enabled);
    assert_eq!(config.logging.level, "info");
  }

  #[test]
  fn test_partial_file_keeps_other_defaults() {
    let config = Config::parse(
      r#"
page_size: 25
sources:
  products_url: http://localhost:8080
storage:
  path: /tmp/equinox.db
"#,
    )
    .unwrap();

    assert_eq!(config.page_size, 25);
    assert_eq!(config.sources.products_url, "http://localhost:8080");
    assert_eq!(config.sources.concurrency, 8);
    assert_eq!(config.storage.path, Some(PathBuf::from("/tmp/equinox.db")));
    assert!(config.storage.enabled);
  }

  #[test]
  fn test_empty_file() {
    let config = Config::parse("\n").unwrap();
    assert_eq!(config.page_size, 10);
  }

  #[test]
  fn test_missing_explicit_path() {
    assert!(Config::load(Some(Path::new("/nonexistent/equinox.yaml"))).is_err());
  }
}
