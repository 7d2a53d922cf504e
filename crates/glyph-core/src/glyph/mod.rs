//! Glyph module - Core record types
//!
//! Implements the memory record model with:
//! - Glyphs carrying opaque content plus an embedding
//! - Mood context supplied by the caller at creation and search time
//! - Emotional weight (per-mood affinity) derived from the mood context
//! - Append-only transformation history

mod node;

pub use node::{Glyph, Transformation};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mood name used when the caller's context does not name one
pub const NEUTRAL_MOOD: &str = "NEUTRAL";

/// Default system coherence percentage (`scup`) in a mood context
pub const DEFAULT_SCUP: f64 = 50.0;

/// Default entropy in a mood context
pub const DEFAULT_ENTROPY: f64 = 500_000.0;

// ============================================================================
// MOODS
// ============================================================================

/// The five named moods the engine has policy for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mood {
    /// Dreams fade slowly
    Dreaming,
    /// Thoughts linger
    Contemplative,
    /// Sharp but temporary
    Focused,
    /// Quick turnover
    Hyperactive,
    /// Near eternal
    Transcendent,
}

impl Mood {
    /// All moods, in policy-table order
    pub const ALL: [Mood; 5] = [
        Mood::Dreaming,
        Mood::Contemplative,
        Mood::Focused,
        Mood::Hyperactive,
        Mood::Transcendent,
    ];

    /// Convert to the wire name used in mood contexts and emotional weights
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Dreaming => "DREAMING",
            Mood::Contemplative => "CONTEMPLATIVE",
            Mood::Focused => "FOCUSED",
            Mood::Hyperactive => "HYPERACTIVE",
            Mood::Transcendent => "TRANSCENDENT",
        }
    }

    /// Parse from an exact mood name. Unknown names, including other
    /// casings, yield `None`.
    pub fn parse_name(s: &str) -> Option<Self> {
        match s {
            "DREAMING" => Some(Mood::Dreaming),
            "CONTEMPLATIVE" => Some(Mood::Contemplative),
            "FOCUSED" => Some(Mood::Focused),
            "HYPERACTIVE" => Some(Mood::Hyperactive),
            "TRANSCENDENT" => Some(Mood::Transcendent),
            _ => None,
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// MOOD CONTEXT
// ============================================================================

/// Mood context handed in by the orchestrator
///
/// The engine never infers mood; it only reads these three values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoodContext {
    /// Current mood name (free-form; unknown names fall back to defaults)
    pub mood: String,
    /// System coherence, nominally 0-100
    pub scup: f64,
    /// Entropy, nominally 0-1,000,000
    pub entropy: f64,
}

impl Default for MoodContext {
    fn default() -> Self {
        Self {
            mood: NEUTRAL_MOOD.to_string(),
            scup: DEFAULT_SCUP,
            entropy: DEFAULT_ENTROPY,
        }
    }
}

impl MoodContext {
    /// Context with the given mood and default scup/entropy
    pub fn new(mood: impl Into<String>) -> Self {
        Self {
            mood: mood.into(),
            ..Default::default()
        }
    }

    /// Set scup
    pub fn with_scup(mut self, scup: f64) -> Self {
        self.scup = scup;
        self
    }

    /// Set entropy
    pub fn with_entropy(mut self, entropy: f64) -> Self {
        self.entropy = entropy;
        self
    }

    /// The named mood, if the context names one of the five known moods
    pub fn known_mood(&self) -> Option<Mood> {
        Mood::parse_name(&self.mood)
    }

    /// Per-mood affinity of a glyph born under this context
    pub fn emotional_weight(&self) -> BTreeMap<String, f64> {
        let s = self.scup / 100.0;
        let e = self.entropy / 1_000_000.0;

        Mood::ALL
            .iter()
            .map(|mood| {
                let affinity = match mood {
                    Mood::Dreaming => e * 0.8 + (1.0 - s) * 0.2,
                    Mood::Contemplative => (1.0 - (s - 0.5).abs()) * 0.6 + e * 0.4,
                    Mood::Focused => s * 0.7 + (1.0 - e) * 0.3,
                    Mood::Hyperactive => e * 0.6 + s * 0.4,
                    Mood::Transcendent => s * 0.5 + e * 0.5,
                };
                (mood.as_str().to_string(), affinity)
            })
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
