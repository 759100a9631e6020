use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crowdfund_campaigns::EngineConfig;
use crowdfund_core::Timestamp;

/// Where the ledger reads time from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ClockMode {
    #[default]
    System,
    /// Fixed start time, moved only by `advance` steps.
    Manual { start: Timestamp },
}

/// Application configuration.
///
/// Sources, lowest precedence first: defaults, the JSON file named by `CROWDFUND_CONFIG`,
/// then `CROWDFUND_*` variables for the engine settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub clock: ClockMode,
}

impl AppConfig {
    pub const CONFIG_PATH_VAR: &'static str = "CROWDFUND_CONFIG";

    pub fn load() -> anyhow::Result<Self> {
        let base = match std::env::var(Self::CONFIG_PATH_VAR) {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };

        Ok(Self {
            engine: base.engine.overridden_by(|key| std::env::var(key).ok()),
            ..base
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing config file {}", path.display()))
    }
}
