//! Configuration read from `config.toml` in the data directory.
//!
//! Every field is optional in the file; missing fields take their defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::fields::DeletePolicy;

pub const CONFIG_FILE: &str = "config.toml";
pub const DIR_ENV: &str = "TASKBOARD_DIR";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_data_file")]
    pub data_file: String,
    #[serde(default)]
    pub delete_policy: DeletePolicy,
    #[serde(default = "default_true")]
    pub seed_demo_data: bool,
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            delete_policy: DeletePolicy::default(),
            seed_demo_data: default_true(),
            log_format: LogFormat::default(),
        }
    }
}

fn default_data_file() -> String {
    "taskboard.json".to_string()
}

const fn default_true() -> bool {
    true
}

impl Config {
    /// Load `config.toml` from `dir`, or defaults when the file is absent.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
    }

    /// Full path of the snapshot file inside `dir`.
    pub fn data_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.data_file)
    }
}

/// Data directory: explicit flag, then `TASKBOARD_DIR`, then `~/.taskboard`.
pub fn resolve_data_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    if let Some(dir) = env::var_os(DIR_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".taskboard")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.delete_policy, DeletePolicy::Cascade);
        assert_eq!(cfg.data_path(dir.path()), dir.path().join("taskboard.json"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let raw = "delete_policy = \"orphan\"\nlog_format = \"json\"\n";
        fs::write(dir.path().join(CONFIG_FILE), raw).unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg.delete_policy, DeletePolicy::Orphan);
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert!(cfg.seed_demo_data);
        assert_eq!(cfg.data_file, "taskboard.json");
    }

    #[test]
    fn test_bad_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "delete_policy = 3").unwrap();
        assert!(Config::load(dir.path()).is_err());
    }

    #[test]
    fn test_explicit_dir_wins() {
        assert_eq!(resolve_data_dir(Some(Path::new("/tmp/x"))), PathBuf::from("/tmp/x"));
    }
}
