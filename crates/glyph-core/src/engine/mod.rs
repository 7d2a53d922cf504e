//! Memory Engine
//!
//! Orchestrates the vitality model, vector index, constellation tracker and
//! archival store:
//!
//! - `create`: decay policy → pre-insert neighbor query → constellations →
//!   index insert
//! - `search`: k-NN candidates → dead-floor filter → composite score
//! - `prune`: vitality scan → archive → constellation cleanup → one rebuild
//!
//! The engine is single-writer. Mutating calls take `&mut self` and the tick
//! is always an explicit argument.

mod config;

pub use config::{EngineConfig, ENV_ARCHIVE_PATH, ENV_DIMENSIONS};

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::archive::{ArchivalStore, ArchiveError};
use crate::constellation::{ConstellationData, ConstellationTracker};
use crate::glyph::{Glyph, MoodContext};
use crate::search::{FlatIndex, SearchHit, VectorIndex, VectorSearchError};
use crate::vitality::{resonate_with_policy, vitality_with_policy};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Engine error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Embedding length differs from the engine's fixed dimension
    #[error("Embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    /// Glyph not found
    #[error("Glyph not found: {0}")]
    NotFound(String),
    /// A live glyph already uses this id
    #[error("Glyph id already in use: {0}")]
    DuplicateId(String),
    /// Archive error
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),
    /// Vector index error
    #[error("Vector index error: {0}")]
    Index(#[from] VectorSearchError),
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Engine result type
pub type Result<T> = std::result::Result<T, EngineError>;

/// Point-in-time engine statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineStats {
    pub live_glyphs: usize,
    pub indexed_vectors: usize,
    pub constellations: usize,
    pub archived_glyphs: usize,
    pub pending_archive: usize,
    /// Mean vitality of live glyphs at the stats tick (0.0 when empty)
    pub mean_vitality: f64,
    /// Live glyphs below the search dead floor
    pub below_dead_floor: usize,
}

// ============================================================================
// MEMORY ENGINE
// ============================================================================

/// Vector-indexed, time-decaying glyph store
pub struct MemoryEngine<I: VectorIndex = FlatIndex> {
    config: EngineConfig,
    glyphs: HashMap<String, Glyph>,
    /// Creation order of live glyphs; rebuilds replay it
    order: Vec<String>,
    index: I,
    constellations: ConstellationTracker,
    archive: ArchivalStore,
}

impl MemoryEngine<FlatIndex> {
    /// Create an engine backed by the exact flat index
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let index = FlatIndex::new(config.dimensions);
        Self::with_index(config, index)
    }
}

impl<I: VectorIndex> MemoryEngine<I> {
    /// Create an engine over a caller-supplied (empty) index
    pub fn with_index(config: EngineConfig, index: I) -> Result<Self> {
        config.validate()?;

        if index.dimensions() != config.dimensions {
            return Err(EngineError::InvalidConfig(format!(
                "index has {} dimensions, config has {}",
                index.dimensions(),
                config.dimensions
            )));
        }
        if !index.is_empty() {
            return Err(EngineError::InvalidConfig(
                "engine must start from an empty index".to_string(),
            ));
        }

        let archive = match &config.archive_path {
            Some(path) => ArchivalStore::open(path, config.archive_flush_every),
            None => ArchivalStore::in_memory(config.archive_flush_every),
        };
        let constellations = ConstellationTracker::new(config.constellation.clone());

        Ok(Self {
            config,
            glyphs: HashMap::new(),
            order: Vec::new(),
            index,
            constellations,
            archive,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    /// Number of live glyphs
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.glyphs.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Result<&Glyph> {
        self.glyphs
            .get(id)
            .ok_or_else(|| EngineError::NotFound(id.to_string()))
    }

    /// Live glyphs in creation order
    pub fn glyphs(&self) -> impl Iterator<Item = &Glyph> {
        self.order.iter().filter_map(|id| self.glyphs.get(id))
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    pub fn constellations(&self) -> &ConstellationTracker {
        &self.constellations
    }

    pub fn archive(&self) -> &ArchivalStore {
        &self.archive
    }

    fn check_dimensions(&self, embedding: &[f32]) -> Result<()> {
        if embedding.len() != self.config.dimensions {
            return Err(EngineError::DimensionMismatch {
                expected: self.config.dimensions,
                got: embedding.len(),
            });
        }
        Ok(())
    }

    // ========================================================================
    // CREATION
    // ========================================================================

    /// Create a glyph with an id derived from `tick` and `content`
    pub fn create(
        &mut self,
        content: &str,
        embedding: Vec<f32>,
        mood: &MoodContext,
        tick: u64,
    ) -> Result<Glyph> {
        let id = Glyph::derive_id(tick, content);
        self.create_with_id(id, content, embedding, mood, tick)
    }

    /// Create a glyph under a caller-chosen id
    pub fn create_with_id(
        &mut self,
        id: impl Into<String>,
        content: &str,
        embedding: Vec<f32>,
        mood: &MoodContext,
        tick: u64,
    ) -> Result<Glyph> {
        let id = id.into();
        self.check_dimensions(&embedding)?;
        if self.glyphs.contains_key(&id) {
            return Err(EngineError::DuplicateId(id));
        }

        let decay_rate = self.config.decay.rate_for_name(&mood.mood);
        let mut glyph = Glyph::new(id.clone(), content, embedding, tick, decay_rate);
        glyph.emotional_weight = mood.emotional_weight();

        let neighbors =
            self.constellations
                .discover_neighbors(&self.index, &glyph.embedding, &self.glyphs)?;
        glyph.semantic_neighbors = neighbors.iter().map(|(n, _)| n.clone()).collect();

        self.constellations.link(&id, &neighbors);
        if let Err(e) = self.index.insert(&id, &glyph.embedding) {
            self.constellations.remove(&id);
            return Err(e.into());
        }

        tracing::debug!(
            id = %id,
            tick,
            decay_rate,
            neighbors = glyph.semantic_neighbors.len(),
            "Glyph created"
        );

        self.glyphs.insert(id.clone(), glyph.clone());
        self.order.push(id);
        Ok(glyph)
    }

    // ========================================================================
    // VITALITY
    // ========================================================================

    /// Vitality of a live glyph at `tick`
    pub fn vitality_of(&self, id: &str, tick: u64) -> Result<f64> {
        let glyph = self.get(id)?;
        Ok(vitality_with_policy(glyph, tick, &self.config.resonance))
    }

    /// Touch a glyph, refreshing its vitality; returns the updated glyph
    pub fn resonate(&mut self, id: &str, tick: u64, strength: f64) -> Result<&Glyph> {
        let policy = &self.config.resonance;
        let glyph = self
            .glyphs
            .get_mut(id)
            .ok_or_else(|| EngineError::NotFound(id.to_string()))?;

        let before = vitality_with_policy(glyph, tick, policy);
        resonate_with_policy(glyph, tick, strength, policy);

        let mut params = serde_json::Map::new();
        params.insert("strength".to_string(), serde_json::json!(strength));
        glyph.record_transformation("resonance", params, tick, before);

        Ok(glyph)
    }

    /// Append a transformation record to a live glyph
    pub fn transform(
        &mut self,
        id: &str,
        kind: &str,
        params: serde_json::Map<String, serde_json::Value>,
        tick: u64,
    ) -> Result<()> {
        let policy = &self.config.resonance;
        let glyph = self
            .glyphs
            .get_mut(id)
            .ok_or_else(|| EngineError::NotFound(id.to_string()))?;

        let vitality = vitality_with_policy(glyph, tick, policy);
        glyph.record_transformation(kind, params, tick, vitality);
        Ok(())
    }

    // ========================================================================
    // RETRIEVAL
    // ========================================================================

    /// Rank live glyphs against `query`, best first
    ///
    /// Glyphs below the dead floor are never returned, however similar.
    pub fn search(
        &self,
        query: &[f32],
        mood: &MoodContext,
        k: usize,
        tick: u64,
    ) -> Result<Vec<SearchHit>> {
        self.check_dimensions(query)?;

        if k == 0 || self.index.is_empty() {
            return Ok(vec![]);
        }

        let scoring = &self.config.scoring;
        let pool = scoring.candidate_pool(k, self.index.len());
        let candidates = self.index.query(query, pool)?;

        let mut hits = Vec::with_capacity(candidates.len());
        for (id, similarity) in candidates {
            let Some(glyph) = self.glyphs.get(&id) else {
                continue;
            };

            let vitality = vitality_with_policy(glyph, tick, &self.config.resonance);
            if vitality < scoring.dead_floor {
                continue;
            }

            let similarity = similarity as f64;
            let mood_affinity = scoring.mood_affinity(glyph, &mood.mood);
            let constellation_bonus = self.constellations.bonus(&id, query, &self.glyphs, scoring);
            let score = scoring.composite(similarity, vitality, mood_affinity, constellation_bonus);

            hits.push(SearchHit {
                glyph: glyph.clone(),
                score,
                similarity,
                vitality,
                mood_affinity,
                constellation_bonus,
            });
        }

        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(k);
        Ok(hits)
    }

    /// Search, then resonate every returned glyph at `tick`
    ///
    /// Returned scores (and glyph snapshots) are from before the resonance.
    pub fn recall(
        &mut self,
        query: &[f32],
        mood: &MoodContext,
        k: usize,
        tick: u64,
    ) -> Result<Vec<SearchHit>> {
        let hits = self.search(query, mood, k, tick)?;
        for hit in &hits {
            self.resonate(&hit.glyph.id, tick, 1.0)?;
        }
        Ok(hits)
    }

    // ========================================================================
    // EVICTION
    // ========================================================================

    /// Archive and remove every glyph whose vitality at `tick` is below
    /// `threshold`; the index is rebuilt once for the whole batch
    pub fn prune(&mut self, threshold: f64, tick: u64) -> Result<usize> {
        let resonance = &self.config.resonance;
        let dead: Vec<String> = self
            .order
            .iter()
            .filter(|id| {
                self.glyphs
                    .get(*id)
                    .is_some_and(|g| vitality_with_policy(g, tick, resonance) < threshold)
            })
            .cloned()
            .collect();

        if dead.is_empty() {
            return Ok(0);
        }

        for id in &dead {
            if let Some(glyph) = self.glyphs.remove(id) {
                self.archive.archive(&glyph);
            }
        }

        let dead_set: HashSet<String> = dead.into_iter().collect();
        self.constellations.remove_all(&dead_set);
        self.order.retain(|id| !dead_set.contains(id));
        self.rebuild_index()?;

        tracing::info!(
            pruned = dead_set.len(),
            remaining = self.glyphs.len(),
            tick,
            "Pruned faded glyphs"
        );

        Ok(dead_set.len())
    }

    /// `prune` with the configured threshold
    pub fn prune_with_default_threshold(&mut self, tick: u64) -> Result<usize> {
        self.prune(self.config.prune_threshold, tick)
    }

    /// Rebuild the index from the live set in creation order
    pub fn rebuild_index(&mut self) -> Result<()> {
        let snapshot: Vec<(&str, &[f32])> = self
            .order
            .iter()
            .filter_map(|id| self.glyphs.get(id))
            .map(|g| (g.id.as_str(), g.embedding.as_slice()))
            .collect();

        self.index.rebuild_from(&snapshot)?;
        tracing::debug!(vectors = snapshot.len(), "Vector index rebuilt");
        Ok(())
    }

    // ========================================================================
    // INSPECTION
    // ========================================================================

    /// Constellations with at least two members whose vitality at `tick` is
    /// above the dead floor
    pub fn get_constellation_data(&self, tick: u64) -> Vec<ConstellationData> {
        let floor = self.config.scoring.dead_floor;
        let resonance = &self.config.resonance;
        self.constellations
            .data(&self.glyphs, |g| vitality_with_policy(g, tick, resonance) > floor)
    }

    pub fn stats(&self, tick: u64) -> EngineStats {
        let vitalities: Vec<f64> = self
            .glyphs
            .values()
            .map(|g| vitality_with_policy(g, tick, &self.config.resonance))
            .collect();

        let mean_vitality = if vitalities.is_empty() {
            0.0
        } else {
            vitalities.iter().sum::<f64>() / vitalities.len() as f64
        };

        EngineStats {
            live_glyphs: self.glyphs.len(),
            indexed_vectors: self.index.len(),
            constellations: self.constellations.len(),
            archived_glyphs: self.archive.len(),
            pending_archive: self.archive.pending_len(),
            mean_vitality,
            below_dead_floor: vitalities
                .iter()
                .filter(|v| **v < self.config.scoring.dead_floor)
                .count(),
        }
    }

    /// Graceful shutdown: flush the archive and surface any write error
    pub fn close(self) -> Result<()> {
        let Self { archive, .. } = self;
        archive.close()?;
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
