//! # Glyph Core
//!
//! Temporal memory engine for symbolic records ("glyphs"). Each glyph carries
//! opaque content plus a fixed-dimension embedding, and fades over logical
//! time unless it is recalled:
//!
//! - **Vitality**: Exponential decay with a mood-dependent rate, softened by
//!   accumulated resonance
//! - **Composite Ranking**: Similarity, vitality, mood affinity and
//!   constellation context blended into one score
//! - **Constellations**: Lightweight clusters formed from nearest neighbors at
//!   creation time
//! - **Archival Tier**: Faded glyphs are pruned from the live set and written,
//!   in batches, to a durable JSON archive
//!
//! Time is a caller-supplied `u64` tick. The engine never reads a wall clock
//! for vitality.
//!
//! ## Quick Start
//!
//! ```rust
//! use glyph_core::{EngineConfig, MemoryEngine, MoodContext};
//!
//! let mut engine = MemoryEngine::new(EngineConfig::with_dimensions(3))?;
//! let mood = MoodContext::new("FOCUSED");
//!
//! let glyph = engine.create("first light", vec![1.0, 0.0, 0.0], &mood, 0)?;
//! let hits = engine.search(&[1.0, 0.0, 0.0], &mood, 5, 10)?;
//! assert_eq!(hits[0].glyph.id, glyph.id);
//!
//! engine.prune(0.05, 1_000)?;
//! engine.close()?;
//! # Ok::<(), glyph_core::EngineError>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `hnsw`: Approximate HNSW index backed by USearch. The default build uses
//!   an exact flat index.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod archive;
pub mod constellation;
pub mod engine;
pub mod glyph;
pub mod search;
pub mod vitality;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use glyph::{Glyph, Mood, MoodContext, Transformation, NEUTRAL_MOOD};

pub use vitality::{
    resonate, vitality, DecayPolicy, ResonancePolicy, DEAD_FLOOR, DEFAULT_PRUNE_THRESHOLD,
};

pub use search::{
    cosine_similarity, FlatIndex, ScoringPolicy, SearchHit, VectorIndex, VectorSearchError,
    DEFAULT_DIMENSIONS,
};

#[cfg(feature = "hnsw")]
pub use search::{HnswConfig, HnswIndex};

pub use constellation::{Constellation, ConstellationData, ConstellationPolicy, ConstellationTracker};

pub use archive::{ArchivalStore, ArchiveError, ArchiveRecord, DEFAULT_FLUSH_EVERY};

pub use engine::{EngineConfig, EngineError, EngineStats, MemoryEngine, Result};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        ConstellationData, EngineConfig, EngineError, EngineStats, Glyph, MemoryEngine, Mood,
        MoodContext, Result, SearchHit, VectorIndex,
    };

    #[cfg(feature = "hnsw")]
    pub use crate::HnswIndex;
}
