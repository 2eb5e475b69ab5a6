//! Server configuration
//!
//! Defaults, optionally overridden by a JSON file named in `QUICKDB_CONFIG`,
//! then by individual environment variables.

use crate::aof::AofConfig;
use crate::commands::ReplyStyle;
use crate::quicklist::DEFAULT_NODE_CAPACITY;
use anyhow::Context;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Path of an optional JSON configuration file
pub const CONFIG_ENV: &str = "QUICKDB_CONFIG";
/// Overrides `bind_addr`
pub const ADDR_ENV: &str = "QUICKDB_ADDR";
/// AOF path, or `off` to disable the log
pub const AOF_ENV: &str = "QUICKDB_AOF";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the RESP listener binds to
    pub bind_addr: String,

    /// Elements per quicklist node for newly created lists
    pub list_node_capacity: usize,

    pub reply_style: ReplyStyle,

    pub aof: AofConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: "127.0.0.1:3000".to_string(),
            list_node_capacity: DEFAULT_NODE_CAPACITY,
            reply_style: ReplyStyle::default(),
            aof: AofConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load the configuration from the process environment
    pub fn load() -> anyhow::Result<Self> {
        let mut config = match env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };

        config.apply_overrides(env::var(ADDR_ENV).ok(), env::var(AOF_ENV).ok());
        Ok(config)
    }

    /// Parse a JSON configuration file; missing fields keep their defaults
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        Self::from_json(&contents)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_json(contents: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    fn apply_overrides(&mut self, addr: Option<String>, aof: Option<String>) {
        if let Some(addr) = addr {
            self.bind_addr = addr;
        }

        match aof.as_deref() {
            Some("off") => self.aof.enabled = false,
            Some(path) => {
                self.aof.enabled = true;
                self.aof.path = PathBuf::from(path);
            }
            None => {}
        }
    }
}
