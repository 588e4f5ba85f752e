use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::rank::RankConfig;

/// Engine configuration, parsed from TOML. Every section and field is
/// optional; an empty document is the default configuration.
///
/// ```toml
/// [rank]
/// damping = 0.85
/// iterations = 100
/// tolerance = 1e-6
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub rank: RankConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rank: RankConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from `path`. A missing file is not an error; it
    /// means defaults.
    ///
    /// # Errors
    ///
    /// Fails when the file exists but cannot be read, parsed, or holds
    /// out-of-range values.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_toml_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Parse configuration from a TOML document.
    ///
    /// # Errors
    ///
    /// Fails on malformed TOML, unknown field types, a damping factor
    /// outside `(0, 1)`, or a non-positive tolerance.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw).context("invalid engine config TOML")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.rank.damping > 0.0 && self.rank.damping < 1.0,
            "rank.damping must be strictly between 0 and 1, got {}",
            self.rank.damping
        );
        if let Some(tolerance) = self.rank.tolerance {
            ensure!(
                tolerance > 0.0,
                "rank.tolerance must be positive, got {tolerance}"
            );
        }
        Ok(())
    }
}
