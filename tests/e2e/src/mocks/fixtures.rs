//! Test Data Factory
//!
//! Provides utilities for generating deterministic test data:
//! - Embeddings with controlled geometry (axes, seeded, near-duplicates)
//! - Pre-built engine scenarios for common test cases

use std::collections::HashMap;

use glyph_core::{Glyph, MemoryEngine, MoodContext};

/// Deterministic embedding generator for a fixed dimension
#[derive(Debug, Clone)]
pub struct EmbeddingFactory {
    dimensions: usize,
}

impl EmbeddingFactory {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Unit vector along axis `i` (wrapping)
    pub fn axis(&self, i: usize) -> Vec<f32> {
        let mut v = vec![0.0; self.dimensions];
        v[i % self.dimensions] = 1.0;
        v
    }

    /// Dense pseudo-random vector; same seed, same vector
    pub fn seeded(&self, seed: usize) -> Vec<f32> {
        (0..self.dimensions)
            .map(|j| ((seed * self.dimensions + j) as f32 * 0.7 + 0.3).sin())
            .collect()
    }

    /// `base` nudged by a small deterministic offset
    pub fn near(&self, base: &[f32], epsilon: f32, seed: usize) -> Vec<f32> {
        let noise = self.seeded(seed);
        base.iter()
            .zip(noise.iter())
            .map(|(b, n)| b + epsilon * n)
            .collect()
    }

    /// `count` copies of the same vector
    pub fn identical(&self, seed: usize, count: usize) -> Vec<Vec<f32>> {
        vec![self.seeded(seed); count]
    }
}

/// Scenario containing related test data
#[derive(Debug)]
pub struct TestScenario {
    /// IDs of created glyphs
    pub glyph_ids: Vec<String>,
    /// Description of the scenario
    pub description: String,
    /// Named glyph ids for test assertions
    pub metadata: HashMap<String, String>,
}

/// Pre-built engine scenarios
pub struct GlyphScenarios;

impl GlyphScenarios {
    fn create(engine: &mut MemoryEngine, id: &str, embedding: Vec<f32>, mood: &str, tick: u64) -> Glyph {
        engine
            .create_with_id(id, id, embedding, &MoodContext::new(mood), tick)
            .expect("Failed to create scenario glyph")
    }

    /// One glyph per mood, all born at `tick` on distinct axes
    pub fn create_mood_spectrum(
        engine: &mut MemoryEngine,
        embeddings: &EmbeddingFactory,
        tick: u64,
    ) -> TestScenario {
        let mut ids = Vec::new();
        let mut metadata = HashMap::new();

        for (i, mood) in glyph_core::Mood::ALL.iter().enumerate() {
            let id = format!("mood-{}", mood.as_str().to_lowercase());
            Self::create(engine, &id, embeddings.axis(i), mood.as_str(), tick);
            metadata.insert(mood.as_str().to_string(), id.clone());
            ids.push(id);
        }

        TestScenario {
            glyph_ids: ids,
            description: "One glyph per mood with independent embeddings".to_string(),
            metadata,
        }
    }

    /// `long_lived` slow-decaying glyphs plus `short_lived` fast-decaying ones
    pub fn create_decay_scenario(
        engine: &mut MemoryEngine,
        embeddings: &EmbeddingFactory,
        long_lived: usize,
        short_lived: usize,
        tick: u64,
    ) -> TestScenario {
        let mut ids = Vec::new();
        let mut metadata = HashMap::new();

        for i in 0..long_lived {
            let id = format!("slow-{}-{}", tick, i);
            Self::create(engine, &id, embeddings.seeded(i), "TRANSCENDENT", tick);
            ids.push(id);
        }
        for i in 0..short_lived {
            let id = format!("fast-{}-{}", tick, i);
            Self::create(engine, &id, embeddings.seeded(10_000 + i), "HYPERACTIVE", tick);
            ids.push(id);
        }

        metadata.insert("long_lived".to_string(), long_lived.to_string());
        metadata.insert("short_lived".to_string(), short_lived.to_string());

        TestScenario {
            glyph_ids: ids,
            description: "Decay scenario with slow and fast moods".to_string(),
            metadata,
        }
    }

    /// Three glyphs with identical embeddings created in order a, b, c
    pub fn create_cluster_scenario(
        engine: &mut MemoryEngine,
        embeddings: &EmbeddingFactory,
        tick: u64,
    ) -> TestScenario {
        let mut ids = Vec::new();
        let mut metadata = HashMap::new();

        for (label, embedding) in ["a", "b", "c"].iter().zip(embeddings.identical(7, 3)) {
            Self::create(engine, label, embedding, "CONTEMPLATIVE", tick);
            metadata.insert(label.to_string(), label.to_string());
            ids.push(label.to_string());
        }

        TestScenario {
            glyph_ids: ids,
            description: "Identical embeddings forming one tight constellation".to_string(),
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyph_core::{cosine_similarity, EngineConfig};

    #[test]
    fn test_axis_is_unit() {
        let factory = EmbeddingFactory::new(4);
        assert_eq!(factory.axis(1), vec![0.0, 1.0, 0.0, 0.0]);
        assert_eq!(factory.axis(5), factory.axis(1));
    }

    #[test]
    fn test_seeded_is_deterministic() {
        let factory = EmbeddingFactory::new(16);
        assert_eq!(factory.seeded(3), factory.seeded(3));
        assert_ne!(factory.seeded(3), factory.seeded(4));
    }

    #[test]
    fn test_near_stays_similar() {
        let factory = EmbeddingFactory::new(16);
        let base = factory.seeded(1);
        let close = factory.near(&base, 0.01, 99);
        assert!(cosine_similarity(&base, &close) > 0.99);
    }

    #[test]
    fn test_mood_spectrum() {
        let mut engine = MemoryEngine::new(EngineConfig::with_dimensions(8)).unwrap();
        let factory = EmbeddingFactory::new(8);
        let scenario = GlyphScenarios::create_mood_spectrum(&mut engine, &factory, 0);

        assert_eq!(scenario.glyph_ids.len(), 5);
        assert!(scenario.metadata.contains_key("DREAMING"));
        assert_eq!(engine.len(), 5);
    }
}
