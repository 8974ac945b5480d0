use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Declaration of one axis in a deployment description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxisDecl {
    pub name: String,
    /// Base bus identifier as a base-16 string, e.g. `"0x10"`.
    pub node_id: String,
    #[serde(default)]
    pub home_switch: bool,
}

/// Deployment description: which axes exist on the bus and how fast the
/// tick loop runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    pub axes: Vec<AxisDecl>,
}

fn default_tick_interval_ms() -> u64 {
    100
}

impl RegistryConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("invalid registry configuration")
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read configuration file: {}", path))?;
        Self::from_json(&text)
    }
}
