use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Leading hex zeros required of every mined block unless configured.
pub const DEFAULT_DIFFICULTY: u32 = 3;

/// Node settings, loaded from a TOML file and overridable from the CLI.
/// Constructed once in `main` and passed down; there is no global config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Multiaddr to listen on; `None` runs the node outbound-only.
    pub listen: Option<String>,
    /// Static bootstrap peers dialed once at startup.
    pub bootstrap: Vec<String>,
    /// Proof-of-work difficulty for every block, genesis included.
    pub difficulty: u32,
    /// Reward address for mined blocks; mining is off without one.
    pub miner: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            listen: None,
            bootstrap: vec![],
            difficulty: DEFAULT_DIFFICULTY,
            miner: None,
        }
    }
}

impl Settings {
    pub fn from_file(path: &Path) -> Result<Settings> {
        let raw = fs::read_to_string(path)?;
        let settings = toml::from_str(&raw)?;
        Ok(settings)
    }

    pub fn is_miner(&self) -> bool {
        self.miner.is_some()
    }
}
