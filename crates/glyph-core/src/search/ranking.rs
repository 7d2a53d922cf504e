//! Composite ranking
//!
//! score = 0.4 * similarity + 0.3 * vitality + 0.2 * mood + 0.1 * constellation
//!
//! The weights, the 0.1 dead floor and the 0.3 constellation cap are the
//! reference policy; they are fields so tests and experiments can swap them.

use serde::{Deserialize, Serialize};

use crate::glyph::Glyph;
use crate::vitality::DEAD_FLOOR;

/// Weights and limits for search ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub similarity_weight: f64,
    pub vitality_weight: f64,
    pub mood_weight: f64,
    pub constellation_weight: f64,
    /// Candidates below this vitality are never returned
    pub dead_floor: f64,
    /// Cap on the summed constellation bonus
    pub constellation_bonus_cap: f64,
    /// Per-member multiplier applied to query/member similarity
    pub member_bonus_factor: f64,
    /// Candidate pool size is `k * candidate_multiplier`
    pub candidate_multiplier: usize,
    /// Affinity used when a glyph has no weight for the current mood
    pub neutral_mood_affinity: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            similarity_weight: 0.4,
            vitality_weight: 0.3,
            mood_weight: 0.2,
            constellation_weight: 0.1,
            dead_floor: DEAD_FLOOR,
            constellation_bonus_cap: 0.3,
            member_bonus_factor: 0.1,
            candidate_multiplier: 3,
            neutral_mood_affinity: 0.5,
        }
    }
}

impl ScoringPolicy {
    /// Weighted sum of the four ranking signals
    pub fn composite(
        &self,
        similarity: f64,
        vitality: f64,
        mood_affinity: f64,
        constellation_bonus: f64,
    ) -> f64 {
        similarity * self.similarity_weight
            + vitality * self.vitality_weight
            + mood_affinity * self.mood_weight
            + constellation_bonus * self.constellation_weight
    }

    /// Size of the candidate pool requested from the index
    pub fn candidate_pool(&self, k: usize, index_len: usize) -> usize {
        k.saturating_mul(self.candidate_multiplier).min(index_len)
    }

    /// A glyph's affinity toward `mood`, neutral when it has none recorded
    pub fn mood_affinity(&self, glyph: &Glyph, mood: &str) -> f64 {
        glyph.mood_affinity(mood).unwrap_or(self.neutral_mood_affinity)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.candidate_multiplier == 0 {
            return Err("candidate_multiplier must be at least 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.dead_floor) {
            return Err(format!("dead_floor must be in [0, 1], got {}", self.dead_floor));
        }
        Ok(())
    }
}

/// A ranked search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Snapshot of the glyph at search time
    pub glyph: Glyph,
    /// Composite score
    pub score: f64,
    /// Cosine similarity to the query
    pub similarity: f64,
    /// Vitality at the search tick
    pub vitality: f64,
    /// Affinity toward the current mood
    pub mood_affinity: f64,
    /// Capped constellation bonus
    pub constellation_bonus: f64,
}
