//! End-to-end test support for the glyph engine
//!
//! - `harness`: isolated engines over temporary archive files
//! - `mocks`: deterministic embeddings and pre-built scenarios

pub mod harness;

pub use harness::TestEngineManager;
pub use mocks::{EmbeddingFactory, GlyphScenarios, TestScenario};
