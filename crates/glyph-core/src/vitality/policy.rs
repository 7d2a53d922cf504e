//! Decay and resonance policy tables

use serde::{Deserialize, Serialize};

use crate::glyph::Mood;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Decay rate for glyphs born under an unknown mood
pub const DEFAULT_DECAY_RATE: f64 = 0.01;

/// Vitality boost contributed by each resonance
pub const DEFAULT_BOOST_PER_RESONANCE: f64 = 0.05;

/// Maximum resonance boost
pub const DEFAULT_MAX_BOOST: f64 = 0.5;

/// Resonance count after which decay starts slowing
pub const DEFAULT_SLOWDOWN_AFTER: u32 = 5;

/// Multiplier applied to the decay rate on each resonance past the threshold
pub const DEFAULT_SLOWDOWN_FACTOR: f64 = 0.98;

// ============================================================================
// DECAY POLICY
// ============================================================================

/// Creation-time decay rate per mood
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayPolicy {
    pub dreaming: f64,
    pub contemplative: f64,
    pub focused: f64,
    pub hyperactive: f64,
    pub transcendent: f64,
    /// Rate for moods not in the table
    pub default_rate: f64,
}

impl Default for DecayPolicy {
    fn default() -> Self {
        Self {
            dreaming: 0.001,
            contemplative: 0.005,
            focused: 0.01,
            hyperactive: 0.02,
            transcendent: 0.0005,
            default_rate: DEFAULT_DECAY_RATE,
        }
    }
}

impl DecayPolicy {
    /// Decay rate for a known mood
    pub fn rate_for(&self, mood: Mood) -> f64 {
        match mood {
            Mood::Dreaming => self.dreaming,
            Mood::Contemplative => self.contemplative,
            Mood::Focused => self.focused,
            Mood::Hyperactive => self.hyperactive,
            Mood::Transcendent => self.transcendent,
        }
    }

    /// Decay rate for a mood name, falling back to `default_rate`
    pub fn rate_for_name(&self, mood: &str) -> f64 {
        Mood::parse_name(mood)
            .map(|m| self.rate_for(m))
            .unwrap_or(self.default_rate)
    }

    /// Every configured rate must be finite and strictly positive
    pub fn validate(&self) -> Result<(), String> {
        let rates = Mood::ALL
            .iter()
            .map(|m| (m.as_str(), self.rate_for(*m)))
            .chain(std::iter::once(("default", self.default_rate)));

        for (name, rate) in rates {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(format!("decay rate for {} must be > 0, got {}", name, rate));
            }
        }
        Ok(())
    }
}

// ============================================================================
// RESONANCE POLICY
// ============================================================================

/// How access frequency offsets decay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResonancePolicy {
    pub boost_per_resonance: f64,
    pub max_boost: f64,
    pub slowdown_after: u32,
    pub slowdown_factor: f64,
}

impl Default for ResonancePolicy {
    fn default() -> Self {
        Self {
            boost_per_resonance: DEFAULT_BOOST_PER_RESONANCE,
            max_boost: DEFAULT_MAX_BOOST,
            slowdown_after: DEFAULT_SLOWDOWN_AFTER,
            slowdown_factor: DEFAULT_SLOWDOWN_FACTOR,
        }
    }
}

impl ResonancePolicy {
    /// Boost in [0, max_boost] for a resonance count
    pub fn boost(&self, resonance_count: u32) -> f64 {
        (resonance_count as f64 * self.boost_per_resonance).min(self.max_boost)
    }

    /// The slowdown factor must keep the decay rate non-increasing and positive
    pub fn validate(&self) -> Result<(), String> {
        if !(self.slowdown_factor > 0.0 && self.slowdown_factor <= 1.0) {
            return Err(format!(
                "slowdown_factor must be in (0, 1], got {}",
                self.slowdown_factor
            ));
        }
        if !(0.0..=1.0).contains(&self.max_boost) {
            return Err(format!("max_boost must be in [0, 1], got {}", self.max_boost));
        }
        Ok(())
    }
}
