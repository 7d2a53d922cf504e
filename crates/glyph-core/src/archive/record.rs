//! Archive Record - flattened glyph snapshot
//!
//! This is the durability contract: any replacement store must read and
//! write these exact field names.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::glyph::{Glyph, Transformation};

/// Storage-format-independent snapshot of an evicted glyph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveRecord {
    pub id: String,
    pub content: String,
    /// Raw embedding as a plain numeric array
    pub embedding: Vec<f32>,
    pub birth_tick: u64,
    pub last_resonance_tick: u64,
    pub resonance_count: u32,
    pub decay_rate: f64,
    #[serde(default)]
    pub emotional_weight: BTreeMap<String, f64>,
    #[serde(default)]
    pub semantic_neighbors: Vec<String>,
    #[serde(default)]
    pub transformation_history: Vec<Transformation>,
}

impl From<&Glyph> for ArchiveRecord {
    fn from(glyph: &Glyph) -> Self {
        Self {
            id: glyph.id.clone(),
            content: glyph.content.clone(),
            embedding: glyph.embedding.clone(),
            birth_tick: glyph.birth_tick,
            last_resonance_tick: glyph.last_resonance_tick,
            resonance_count: glyph.resonance_count,
            decay_rate: glyph.decay_rate,
            emotional_weight: glyph.emotional_weight.clone(),
            semantic_neighbors: glyph.semantic_neighbors.clone(),
            transformation_history: glyph.transformation_history.clone(),
        }
    }
}

impl From<ArchiveRecord> for Glyph {
    fn from(record: ArchiveRecord) -> Self {
        Self {
            id: record.id,
            content: record.content,
            embedding: record.embedding,
            birth_tick: record.birth_tick,
            last_resonance_tick: record.last_resonance_tick,
            resonance_count: record.resonance_count,
            decay_rate: record.decay_rate,
            emotional_weight: record.emotional_weight,
            semantic_neighbors: record.semantic_neighbors,
            transformation_history: record.transformation_history,
        }
    }
}
