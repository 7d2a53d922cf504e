//! Glyph - The fundamental unit of memory
//!
//! Each glyph represents one remembered item with:
//! - Opaque content and a caller-supplied embedding
//! - Temporal bookkeeping in logical ticks
//! - Resonance count and a decay rate that only ever slows
//! - Per-mood emotional weight and semantic neighbors

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

// ============================================================================
// TRANSFORMATION RECORD
// ============================================================================

/// One entry in a glyph's append-only transformation log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transformation {
    /// Kind of transformation (e.g. "resonance")
    #[serde(rename = "type")]
    pub kind: String,
    /// Free-form parameters
    #[serde(default)]
    pub params: serde_json::Map<String, serde_json::Value>,
    /// Tick at which it was applied
    pub tick: u64,
    /// Vitality of the glyph when it was applied
    pub vitality_at_time: f64,
}

// ============================================================================
// GLYPH
// ============================================================================

/// A memory record combining content, embedding, and temporal metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Glyph {
    /// Unique identifier within one engine instance
    pub id: String,
    /// Opaque payload
    pub content: String,
    /// Raw (unnormalized) embedding as supplied by the caller
    pub embedding: Vec<f32>,
    /// Tick of creation
    pub birth_tick: u64,
    /// Tick of the most recent resonance (creation counts as one)
    pub last_resonance_tick: u64,
    /// Number of resonances since creation
    pub resonance_count: u32,
    /// Exponential decay rate per tick, never increases
    pub decay_rate: f64,
    /// Mood name -> affinity
    pub emotional_weight: BTreeMap<String, f64>,
    /// Ids of the glyphs that were nearest at creation time
    pub semantic_neighbors: Vec<String>,
    /// Applied transformations, oldest first
    pub transformation_history: Vec<Transformation>,
}

impl Glyph {
    /// Create a fresh glyph born at `tick`
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        embedding: Vec<f32>,
        tick: u64,
        decay_rate: f64,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            embedding,
            birth_tick: tick,
            last_resonance_tick: tick,
            resonance_count: 0,
            decay_rate,
            emotional_weight: BTreeMap::new(),
            semantic_neighbors: Vec::new(),
            transformation_history: Vec::new(),
        }
    }

    /// Derive the default id for content created at `tick`
    ///
    /// Same tick plus same content yields the same id, which the engine
    /// rejects as a collision.
    pub fn derive_id(tick: u64, content: &str) -> String {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        content.hash(&mut hasher);
        format!("glyph_{}_{}", tick, hasher.finish() % 10_000)
    }

    /// Age in ticks since birth
    pub fn age(&self, tick: u64) -> u64 {
        tick.saturating_sub(self.birth_tick)
    }

    /// Ticks elapsed since the last resonance
    pub fn ticks_since_resonance(&self, tick: u64) -> u64 {
        tick.saturating_sub(self.last_resonance_tick)
    }

    /// Affinity toward a mood, if the glyph carries a weight for it
    pub fn mood_affinity(&self, mood: &str) -> Option<f64> {
        self.emotional_weight.get(mood).copied()
    }

    /// Append a transformation record
    pub fn record_transformation(
        &mut self,
        kind: impl Into<String>,
        params: serde_json::Map<String, serde_json::Value>,
        tick: u64,
        vitality_at_time: f64,
    ) {
        self.transformation_history.push(Transformation {
            kind: kind.into(),
            params,
            tick,
            vitality_at_time,
        });
    }
}
