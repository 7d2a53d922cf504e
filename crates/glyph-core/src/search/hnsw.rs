//! HNSW Vector Index
//!
//! Uses USearch for HNSW (Hierarchical Navigable Small World) indexing.
//!
//! USearch can delete points, but this adapter still honours the
//! rebuild-on-prune contract so the engine behaves the same on every
//! backend. Keys are insertion positions, which keeps the id table a plain
//! `Vec`.

use usearch::{Index, IndexOptions, MetricKind, ScalarKind};

use super::vector::{check_dimensions, normalized, VectorIndex, VectorSearchError, DEFAULT_DIMENSIONS};

// ============================================================================
// CONSTANTS
// ============================================================================

/// HNSW connectivity parameter (higher = better recall, more memory)
pub const DEFAULT_CONNECTIVITY: usize = 16;

/// HNSW expansion factor for index building
pub const DEFAULT_EXPANSION_ADD: usize = 128;

/// HNSW expansion factor for search (higher = better recall, slower)
pub const DEFAULT_EXPANSION_SEARCH: usize = 64;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Configuration for the HNSW index
#[derive(Debug, Clone)]
pub struct HnswConfig {
    /// Number of dimensions
    pub dimensions: usize,
    /// HNSW connectivity parameter
    pub connectivity: usize,
    /// Expansion factor for adding vectors
    pub expansion_add: usize,
    /// Expansion factor for searching
    pub expansion_search: usize,
    /// Scalar storage type; F32 keeps scores comparable with the flat index
    pub quantization: ScalarKind,
}

impl Default for HnswConfig {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_DIMENSIONS,
            connectivity: DEFAULT_CONNECTIVITY,
            expansion_add: DEFAULT_EXPANSION_ADD,
            expansion_search: DEFAULT_EXPANSION_SEARCH,
            quantization: ScalarKind::F32,
        }
    }
}

impl HnswConfig {
    /// Default parameters for a given dimension
    pub fn with_dimensions(dimensions: usize) -> Self {
        Self {
            dimensions,
            ..Default::default()
        }
    }

    fn options(&self) -> IndexOptions {
        IndexOptions {
            dimensions: self.dimensions,
            metric: MetricKind::Cos,
            quantization: self.quantization,
            connectivity: self.connectivity,
            expansion_add: self.expansion_add,
            expansion_search: self.expansion_search,
            multi: false,
        }
    }
}

// ============================================================================
// HNSW INDEX
// ============================================================================

/// HNSW approximate nearest-neighbor index
pub struct HnswIndex {
    index: Index,
    config: HnswConfig,
    ids: Vec<String>,
}

impl HnswIndex {
    /// Create a new index with default parameters for `dimensions`
    pub fn new(dimensions: usize) -> Result<Self, VectorSearchError> {
        Self::with_config(HnswConfig::with_dimensions(dimensions))
    }

    /// Create a new index with custom configuration
    pub fn with_config(config: HnswConfig) -> Result<Self, VectorSearchError> {
        let index = Index::new(&config.options())
            .map_err(|e| VectorSearchError::IndexCreation(e.to_string()))?;

        Ok(Self {
            index,
            config,
            ids: Vec::new(),
        })
    }

    /// Reserve capacity for a specified number of vectors
    /// usearch requires this before add() to avoid segmentation faults
    fn reserve(&self, capacity: usize) -> Result<(), VectorSearchError> {
        self.index.reserve(capacity).map_err(|e| {
            VectorSearchError::IndexCreation(format!("Failed to reserve capacity: {}", e))
        })
    }
}

impl VectorIndex for HnswIndex {
    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    fn len(&self) -> usize {
        self.index.size()
    }

    fn insert(&mut self, id: &str, embedding: &[f32]) -> Result<(), VectorSearchError> {
        check_dimensions(self.config.dimensions, embedding.len())?;

        let current_capacity = self.index.capacity();
        let current_size = self.index.size();
        if current_size >= current_capacity {
            // Reserve more capacity (double or at least 16)
            let new_capacity = std::cmp::max(current_capacity * 2, 16);
            self.reserve(new_capacity)?;
        }

        let key = self.ids.len() as u64;
        self.index
            .add(key, normalized(embedding).as_slice())
            .map_err(|e| VectorSearchError::IndexAdd(e.to_string()))?;
        self.ids.push(id.to_string());

        Ok(())
    }

    fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<(String, f32)>, VectorSearchError> {
        check_dimensions(self.config.dimensions, embedding.len())?;

        if k == 0 || self.is_empty() {
            return Ok(vec![]);
        }

        let results = self
            .index
            .search(normalized(embedding).as_slice(), k)
            .map_err(|e| VectorSearchError::IndexSearch(e.to_string()))?;

        let mut hits = Vec::with_capacity(results.keys.len());
        for (key, distance) in results.keys.iter().zip(results.distances.iter()) {
            if let Some(id) = self.ids.get(*key as usize) {
                // Convert distance to similarity (1 - distance for cosine)
                hits.push((id.clone(), 1.0 - distance));
            }
        }
        hits.sort_by(|a, b| b.1.total_cmp(&a.1));

        Ok(hits)
    }

    fn rebuild_from(&mut self, snapshot: &[(&str, &[f32])]) -> Result<(), VectorSearchError> {
        let mut rebuilt = HnswIndex::with_config(self.config.clone())?;
        if !snapshot.is_empty() {
            rebuilt.reserve(snapshot.len())?;
        }
        for (id, embedding) in snapshot {
            rebuilt.insert(id, embedding)?;
        }

        *self = rebuilt;
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
