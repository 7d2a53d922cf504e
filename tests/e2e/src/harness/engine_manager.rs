//! Test Engine Manager
//!
//! Provides isolated engine instances for testing:
//! - Engines whose archive lives in a temporary directory
//! - Seeding helpers with caller-chosen ids
//! - Close-and-reopen to exercise the archive on disk

use glyph_core::{EngineConfig, Glyph, MemoryEngine, MoodContext};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::mocks::EmbeddingFactory;

/// Manager for test engines
///
/// Each manager owns a temporary directory holding the archive file, so
/// tests never see each other's evictions. The directory is removed when
/// the manager is dropped.
///
/// # Example
///
/// ```rust,ignore
/// let mut env = TestEngineManager::new_temp(8);
/// env.create("a", env.embeddings.axis(0), "FOCUSED", 0);
/// env.engine.prune(0.05, 500)?;
/// let env = env.close_and_reopen();
/// ```
pub struct TestEngineManager {
    /// The engine under test
    pub engine: MemoryEngine,
    /// Embedding factory matching the engine's dimension
    pub embeddings: EmbeddingFactory,
    config: EngineConfig,
    /// Temporary directory (kept alive to prevent premature deletion)
    _temp_dir: TempDir,
    archive_path: PathBuf,
}

impl TestEngineManager {
    /// Create an engine with default policies and a temporary archive
    pub fn new_temp(dimensions: usize) -> Self {
        Self::with_config(EngineConfig::with_dimensions(dimensions))
    }

    /// Create an engine from `config`, pointing its archive at a temp file
    pub fn with_config(config: EngineConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let archive_path = temp_dir.path().join("test_glyph_archive.json");
        let config = config.with_archive_path(&archive_path);

        let engine = MemoryEngine::new(config.clone()).expect("Failed to create test engine");

        Self {
            engine,
            embeddings: EmbeddingFactory::new(config.dimensions),
            config,
            _temp_dir: temp_dir,
            archive_path,
        }
    }

    /// Path of the archive file
    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Create a glyph whose id is its label
    pub fn create(&mut self, id: &str, embedding: Vec<f32>, mood: &str, tick: u64) -> Glyph {
        self.engine
            .create_with_id(id, id, embedding, &MoodContext::new(mood), tick)
            .expect("Failed to create glyph")
    }

    /// Seed `count` glyphs with distinct seeded embeddings at `tick`
    pub fn seed(&mut self, prefix: &str, count: usize, mood: &str, tick: u64) -> Vec<String> {
        (0..count)
            .map(|i| {
                let id = format!("{}-{}", prefix, i);
                let embedding = self.embeddings.seeded(i + prefix.len() * 1_000);
                self.create(&id, embedding, mood, tick).id
            })
            .collect()
    }

    /// Vitality of a live glyph
    pub fn vitality(&self, id: &str, tick: u64) -> f64 {
        self.engine.vitality_of(id, tick).expect("glyph should be live")
    }

    /// Close the engine (flushing the archive) and open a fresh one on the
    /// same archive file
    pub fn close_and_reopen(self) -> Self {
        let Self {
            engine,
            embeddings,
            config,
            _temp_dir,
            archive_path,
        } = self;

        engine.close().expect("Failed to close engine");
        let engine = MemoryEngine::new(config.clone()).expect("Failed to reopen engine");

        Self {
            engine,
            embeddings,
            config,
            _temp_dir,
            archive_path,
        }
    }

    /// Drop the engine without closing it, then reopen on the same archive
    pub fn drop_and_reopen(self) -> Self {
        let Self {
            engine,
            embeddings,
            config,
            _temp_dir,
            archive_path,
        } = self;

        drop(engine);
        let engine = MemoryEngine::new(config.clone()).expect("Failed to reopen engine");

        Self {
            engine,
            embeddings,
            config,
            _temp_dir,
            archive_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyph_core::VectorIndex;

    #[test]
    fn test_temp_engine_creation() {
        let env = TestEngineManager::new_temp(8);
        assert!(env.engine.is_empty());
        assert!(!env.archive_path().exists());
        assert_eq!(env.engine.dimensions(), 8);
    }

    #[test]
    fn test_seed() {
        let mut env = TestEngineManager::new_temp(8);
        let ids = env.seed("s", 10, "FOCUSED", 0);

        assert_eq!(ids.len(), 10);
        assert_eq!(env.engine.len(), 10);
        assert_eq!(env.engine.index().len(), 10);
    }

    #[test]
    fn test_close_and_reopen_keeps_archive() {
        let mut env = TestEngineManager::new_temp(8);
        env.seed("s", 3, "HYPERACTIVE", 0);
        assert_eq!(env.engine.prune(0.05, 1_000).unwrap(), 3);

        let env = env.close_and_reopen();
        assert!(env.archive_path().exists());
        assert!(env.engine.is_empty());
        assert_eq!(env.engine.archive().len(), 3);
    }
}
