//! Engine configuration
//!
//! Every policy table is a named-field struct with the reference values as
//! its `Default`. A JSON policy file only needs the fields it overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::EngineError;
use crate::archive::DEFAULT_FLUSH_EVERY;
use crate::constellation::ConstellationPolicy;
use crate::search::{ScoringPolicy, DEFAULT_DIMENSIONS};
use crate::vitality::{DecayPolicy, ResonancePolicy, DEFAULT_PRUNE_THRESHOLD};

/// Environment variable overriding the embedding dimension
pub const ENV_DIMENSIONS: &str = "GLYPH_DIMENSIONS";

/// Environment variable naming the archive file
pub const ENV_ARCHIVE_PATH: &str = "GLYPH_ARCHIVE_PATH";

/// Configuration for one engine instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fixed embedding dimension
    pub dimensions: usize,
    /// Archive file; `None` keeps evicted glyphs in memory only
    pub archive_path: Option<PathBuf>,
    /// Archive calls between durable writes
    pub archive_flush_every: usize,
    /// Vitality below which `prune_with_default_threshold` evicts
    pub prune_threshold: f64,
    pub decay: DecayPolicy,
    pub resonance: ResonancePolicy,
    pub scoring: ScoringPolicy,
    pub constellation: ConstellationPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_DIMENSIONS,
            archive_path: None,
            archive_flush_every: DEFAULT_FLUSH_EVERY,
            prune_threshold: DEFAULT_PRUNE_THRESHOLD,
            decay: DecayPolicy::default(),
            resonance: ResonancePolicy::default(),
            scoring: ScoringPolicy::default(),
            constellation: ConstellationPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Default configuration for a given embedding dimension
    pub fn with_dimensions(dimensions: usize) -> Self {
        Self {
            dimensions,
            ..Default::default()
        }
    }

    /// Set the archive file
    pub fn with_archive_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.archive_path = Some(path.into());
        self
    }

    /// Defaults overridden by `GLYPH_DIMENSIONS` / `GLYPH_ARCHIVE_PATH`
    pub fn from_env() -> Result<Self, EngineError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the env keys
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, EngineError> {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_DIMENSIONS) {
            config.dimensions = raw.trim().parse().map_err(|_| {
                EngineError::InvalidConfig(format!("{} is not a dimension: {:?}", ENV_DIMENSIONS, raw))
            })?;
        }
        if let Some(raw) = lookup(ENV_ARCHIVE_PATH).filter(|p| !p.is_empty()) {
            config.archive_path = Some(PathBuf::from(raw));
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a (possibly partial) JSON configuration
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| EngineError::InvalidConfig(format!("invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file
    pub fn from_json_file(path: &Path) -> Result<Self, EngineError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            EngineError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.dimensions == 0 {
            return Err(EngineError::InvalidConfig("dimensions must be at least 1".to_string()));
        }
        if self.archive_flush_every == 0 {
            return Err(EngineError::InvalidConfig(
                "archive_flush_every must be at least 1".to_string(),
            ));
        }
        self.decay.validate().map_err(EngineError::InvalidConfig)?;
        self.resonance.validate().map_err(EngineError::InvalidConfig)?;
        self.scoring.validate().map_err(EngineError::InvalidConfig)?;
        Ok(())
    }
}
