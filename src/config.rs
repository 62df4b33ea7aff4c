//! Runtime configuration shared by every reconcile.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config holds where the cluster tools live and how they are driven.
///
/// Every field has a default, so a partial YAML file is enough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub oc_binary: PathBuf,
    pub oadm_binary: PathBuf,
    pub kubeconfig: PathBuf,
    pub namespace: String,
    /// Seconds to wait between deleting and recreating a resource.
    pub settle_delay: u64,
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            oc_binary: PathBuf::from("/usr/bin/oc"),
            oadm_binary: PathBuf::from("/usr/bin/oadm"),
            kubeconfig: PathBuf::from("/etc/origin/master/admin.kubeconfig"),
            namespace: "default".to_string(),
            settle_delay: 15,
            verbose: false,
        }
    }
}

impl Config {
    /// Parses a configuration from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| Error::config(format!("invalid config: {}", e)))
    }

    /// Reads a configuration file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {}", path.display(), e)))?;
        Config::from_yaml(&contents)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_delay)
    }
}
