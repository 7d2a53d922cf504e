//! Constellation Tracker
//!
//! Named clusters of semantically related glyphs.
//!
//! - A new glyph founds a constellation keyed by its own id, seeded with its
//!   top-3 nearest neighbors from the pre-insertion index.
//! - It also joins at most one existing constellation that already holds one
//!   of its neighbors (first match wins).
//! - Deleting a glyph removes it from every membership list; constellations
//!   left empty are dropped.
//!
//! Neighbor discovery runs against the index *before* the new glyph is
//! inserted, so a glyph is never its own neighbor. A batched creation path
//! would have to pick an ordering: glyphs created in the same batch cannot
//! see each other unless inserts are interleaved with the lookups.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::glyph::Glyph;
use crate::search::{cosine_similarity, mean_vector, ScoringPolicy, VectorIndex, VectorSearchError};

// ============================================================================
// POLICY
// ============================================================================

/// How constellations are formed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstellationPolicy {
    /// Neighbors fetched from the index for a new glyph
    pub neighbor_count: usize,
    /// Neighbors copied into the new glyph's own constellation
    pub seed_members: usize,
    /// Existing constellations a new glyph may join besides its own
    pub max_extra_memberships: usize,
}

impl Default for ConstellationPolicy {
    fn default() -> Self {
        Self {
            neighbor_count: 5,
            seed_members: 3,
            max_extra_memberships: 1,
        }
    }
}

// ============================================================================
// TYPES
// ============================================================================

/// A named, ordered set of member glyph ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constellation {
    pub id: String,
    pub members: Vec<String>,
}

impl Constellation {
    pub fn contains(&self, glyph_id: &str) -> bool {
        self.members.iter().any(|m| m == glyph_id)
    }
}

/// Summary of a constellation with at least two live members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstellationData {
    pub id: String,
    /// Live members in constellation order
    pub members: Vec<String>,
    /// Mean embedding of the live members
    pub centroid: Vec<f32>,
    /// Mean pairwise cosine similarity of the live members
    pub coherence: f64,
}

// ============================================================================
// TRACKER
// ============================================================================

/// Tracks every constellation in creation order
#[derive(Debug, Clone, Default)]
pub struct ConstellationTracker {
    constellations: Vec<Constellation>,
    policy: ConstellationPolicy,
}

impl ConstellationTracker {
    pub fn new(policy: ConstellationPolicy) -> Self {
        Self {
            constellations: Vec::new(),
            policy,
        }
    }

    /// Number of constellations (including ones with a single member)
    pub fn len(&self) -> usize {
        self.constellations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constellations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constellation> {
        self.constellations.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Constellation> {
        self.constellations.iter().find(|c| c.id == id)
    }

    /// Ids of every constellation the glyph belongs to
    pub fn constellations_of(&self, glyph_id: &str) -> Vec<&str> {
        self.constellations
            .iter()
            .filter(|c| c.contains(glyph_id))
            .map(|c| c.id.as_str())
            .collect()
    }

    /// Nearest live neighbors of `embedding` in the current index
    pub fn discover_neighbors<I: VectorIndex>(
        &self,
        index: &I,
        embedding: &[f32],
        live: &HashMap<String, Glyph>,
    ) -> Result<Vec<(String, f32)>, VectorSearchError> {
        let k = self.policy.neighbor_count.min(index.len());
        Ok(index
            .query(embedding, k)?
            .into_iter()
            .filter(|(id, _)| live.contains_key(id))
            .collect())
    }

    /// Register a new glyph given its neighbors, most similar first
    pub fn link(&mut self, glyph_id: &str, neighbors: &[(String, f32)]) {
        let mut members = Vec::with_capacity(1 + self.policy.seed_members);
        members.push(glyph_id.to_string());
        members.extend(
            neighbors
                .iter()
                .take(self.policy.seed_members)
                .map(|(id, _)| id.clone()),
        );

        let mut joined = 0;
        'neighbors: for (neighbor_id, _) in neighbors {
            if joined >= self.policy.max_extra_memberships {
                break;
            }
            for constellation in self.constellations.iter_mut() {
                if constellation.contains(neighbor_id) && !constellation.contains(glyph_id) {
                    constellation.members.push(glyph_id.to_string());
                    joined += 1;
                    continue 'neighbors;
                }
            }
        }

        self.constellations.push(Constellation {
            id: glyph_id.to_string(),
            members,
        });
    }

    /// Remove one glyph from every constellation
    pub fn remove(&mut self, glyph_id: &str) {
        for constellation in self.constellations.iter_mut() {
            constellation.members.retain(|m| m != glyph_id);
        }
        self.constellations.retain(|c| !c.members.is_empty());
    }

    /// Remove a batch of glyphs in one pass
    pub fn remove_all(&mut self, glyph_ids: &HashSet<String>) {
        if glyph_ids.is_empty() {
            return;
        }
        for constellation in self.constellations.iter_mut() {
            constellation.members.retain(|m| !glyph_ids.contains(m));
        }
        self.constellations.retain(|c| !c.members.is_empty());
    }

    /// Relatedness bonus for a search candidate
    ///
    /// Sums `similarity(query, member) * member_bonus_factor` over every other
    /// live member of every constellation containing the candidate, capped at
    /// `constellation_bonus_cap`.
    pub fn bonus(
        &self,
        glyph_id: &str,
        query: &[f32],
        live: &HashMap<String, Glyph>,
        policy: &ScoringPolicy,
    ) -> f64 {
        let mut bonus = 0.0;

        for constellation in self.constellations.iter().filter(|c| c.contains(glyph_id)) {
            for member_id in &constellation.members {
                if member_id == glyph_id {
                    continue;
                }
                if let Some(member) = live.get(member_id) {
                    let similarity = cosine_similarity(query, &member.embedding) as f64;
                    bonus += similarity * policy.member_bonus_factor;
                }
            }
        }

        bonus.min(policy.constellation_bonus_cap)
    }

    /// Constellations with at least two active members, with centroid and
    /// coherence computed over those members only
    pub fn data(
        &self,
        live: &HashMap<String, Glyph>,
        is_active: impl Fn(&Glyph) -> bool,
    ) -> Vec<ConstellationData> {
        self.constellations
            .iter()
            .filter_map(|constellation| {
                let members: Vec<&Glyph> = constellation
                    .members
                    .iter()
                    .filter_map(|id| live.get(id))
                    .filter(|g| is_active(*g))
                    .collect();

                if members.len() < 2 {
                    return None;
                }

                let embeddings: Vec<&[f32]> =
                    members.iter().map(|g| g.embedding.as_slice()).collect();

                Some(ConstellationData {
                    id: constellation.id.clone(),
                    members: members.iter().map(|g| g.id.clone()).collect(),
                    centroid: mean_vector(&embeddings),
                    coherence: coherence(&embeddings),
                })
            })
            .collect()
    }
}

/// Mean pairwise cosine similarity; 0.0 with fewer than two vectors
pub fn coherence(embeddings: &[&[f32]]) -> f64 {
    if embeddings.len() < 2 {
        return 0.0;
    }

    let mut total = 0.0f64;
    let mut pairs = 0usize;
    for i in 0..embeddings.len() {
        for j in (i + 1)..embeddings.len() {
            total += cosine_similarity(embeddings[i], embeddings[j]) as f64;
            pairs += 1;
        }
    }

    total / pairs as f64
}

// ============================================================================
// TESTS
// ============================================================================
