// Configuration loading for the gossamer CLI
//
// The gossip tunables live in a JSON file; missing fields fall back to the
// LAN profile.

use anyhow::{Context, Result};
use gossamer_core::GossipConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Named starting points for a config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Lan,
    Wan,
    Local,
}

impl Profile {
    pub fn config(self) -> GossipConfig {
        match self {
            Profile::Lan => GossipConfig::lan(),
            Profile::Wan => GossipConfig::wan(),
            Profile::Local => GossipConfig::local(),
        }
    }
}

/// Load config from `path`, or the LAN defaults when no path is given
pub fn load(path: Option<&Path>) -> Result<GossipConfig> {
    let config = match path {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        }
        None => GossipConfig::default(),
    };

    config.validate().context("Invalid gossip configuration")?;
    Ok(config)
}

/// Save config to `path`
pub fn save(config: &GossipConfig, path: &Path) -> Result<()> {
    let contents = serde_json::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write config file {}", path.display()))?;
    Ok(())
}

/// Flattened key/value view for display
pub fn list(config: &GossipConfig) -> Vec<(String, String)> {
    let value = serde_json::to_value(config).unwrap_or_default();
    match value {
        serde_json::Value::Object(map) => map
            .into_iter()
            .map(|(k, v)| {
                let v = match v {
                    serde_json::Value::Null => "(unset)".to_string(),
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (k, v)
            })
            .collect(),
        _ => Vec::new(),
    }
}
