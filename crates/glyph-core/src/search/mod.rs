//! Search Module
//!
//! Provides the retrieval side of the engine:
//! - The `VectorIndex` adapter interface (insert, query, rebuild)
//! - An exact flat inner-product index (always available)
//! - An HNSW index backed by USearch (`hnsw` feature)
//! - Composite ranking policy

mod flat;
mod ranking;
mod vector;

#[cfg(feature = "hnsw")]
mod hnsw;

pub use flat::FlatIndex;
pub use ranking::{ScoringPolicy, SearchHit};
pub use vector::{
    cosine_similarity, mean_vector, normalized, VectorIndex, VectorSearchError, DEFAULT_DIMENSIONS,
};

#[cfg(feature = "hnsw")]
pub use hnsw::{
    HnswConfig, HnswIndex, DEFAULT_CONNECTIVITY, DEFAULT_EXPANSION_ADD, DEFAULT_EXPANSION_SEARCH,
};
