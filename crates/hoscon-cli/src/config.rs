//! Runtime configuration: an optional TOML file layered under
//! `HOSCON_`-prefixed environment variables.
//!
//! ```toml
//! store_path  = "~/hoscon/hoscon.db"
//! export_dir  = "exports"
//! departments = ["Emergency", "ICU", "Surgery"]
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

/// Departments seeded when the configuration does not name any.
pub const DEFAULT_DEPARTMENTS: &[&str] = &[
  "Emergency",
  "Intensive Care",
  "Surgery",
  "Radiology",
  "Laboratory",
  "Pharmacy",
  "Wards",
  "Facilities",
];

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  #[serde(default = "default_store_path")]
  pub store_path:  PathBuf,
  #[serde(default = "default_export_dir")]
  pub export_dir:  PathBuf,
  #[serde(default = "default_departments")]
  pub departments: Vec<String>,
}

fn default_store_path() -> PathBuf { PathBuf::from("hoscon.db") }

fn default_export_dir() -> PathBuf { PathBuf::from("exports") }

fn default_departments() -> Vec<String> {
  DEFAULT_DEPARTMENTS.iter().map(|d| d.to_string()).collect()
}

impl AppConfig {
  /// Load from `path` (if it exists) and the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("HOSCON")
          .try_parsing(true)
          .list_separator(",")
          .with_list_parse_key("departments"),
      )
      .build()
      .with_context(|| format!("failed to read config file {}", path.display()))?;

    let mut cfg: AppConfig = settings
      .try_deserialize()
      .context("failed to deserialise AppConfig")?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    cfg.export_dir = expand_tilde(&cfg.export_dir);
    Ok(cfg)
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = AppConfig::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(cfg.store_path, PathBuf::from("hoscon.db"));
    assert_eq!(cfg.export_dir, PathBuf::from("exports"));
    assert_eq!(cfg.departments.len(), DEFAULT_DEPARTMENTS.len());
  }

  #[test]
  fn file_values_override_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hoscon.toml");
    std::fs::write(
      &path,
      "store_path = \"/tmp/event.db\"\ndepartments = [\"Emergency\", \"ICU\"]\n",
    )
    .unwrap();

    let cfg = AppConfig::load(&path).unwrap();
    assert_eq!(cfg.store_path, PathBuf::from("/tmp/event.db"));
    assert_eq!(cfg.export_dir, PathBuf::from("exports"));
    assert_eq!(cfg.departments, ["Emergency", "ICU"]);
  }

  #[test]
  fn tilde_expands_to_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(expand_tilde(Path::new("~/x.db")), PathBuf::from(home).join("x.db"));
    assert_eq!(expand_tilde(Path::new("/abs/x.db")), PathBuf::from("/abs/x.db"));
  }
}
