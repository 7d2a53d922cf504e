//! Vector Index Interface
//!
//! Every adapter stores L2-normalized vectors so that inner product equals
//! cosine similarity. The contract has no point deletion: removing anything
//! means `rebuild_from` with the surviving set.

// ============================================================================
// CONSTANTS
// ============================================================================

/// Default embedding dimensions (MiniLM-class sentence encoders)
pub const DEFAULT_DIMENSIONS: usize = 384;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Vector search error types
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum VectorSearchError {
    /// Failed to create the index
    IndexCreation(String),
    /// Failed to add a vector
    IndexAdd(String),
    /// Failed to search
    IndexSearch(String),
    /// Dimension mismatch
    InvalidDimensions(usize, usize),
}

impl std::fmt::Display for VectorSearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VectorSearchError::IndexCreation(e) => write!(f, "Index creation failed: {}", e),
            VectorSearchError::IndexAdd(e) => write!(f, "Failed to add vector: {}", e),
            VectorSearchError::IndexSearch(e) => write!(f, "Search failed: {}", e),
            VectorSearchError::InvalidDimensions(expected, got) => {
                write!(f, "Invalid dimensions: expected {}, got {}", expected, got)
            }
        }
    }
}

impl std::error::Error for VectorSearchError {}

// ============================================================================
// INDEX TRAIT
// ============================================================================

/// Approximate nearest-neighbor index keyed by glyph id
pub trait VectorIndex {
    /// Number of dimensions every vector must have
    fn dimensions(&self) -> usize;

    /// Number of vectors currently indexed
    fn len(&self) -> usize;

    /// Check if the index is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a vector; normalization happens inside the adapter
    fn insert(&mut self, id: &str, embedding: &[f32]) -> Result<(), VectorSearchError>;

    /// Up to `k` `(id, cosine_similarity)` pairs, most similar first
    fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<(String, f32)>, VectorSearchError>;

    /// Discard everything and re-insert `snapshot` in order
    fn rebuild_from(&mut self, snapshot: &[(&str, &[f32])]) -> Result<(), VectorSearchError>;
}

pub(crate) fn check_dimensions(expected: usize, got: usize) -> Result<(), VectorSearchError> {
    if expected != got {
        return Err(VectorSearchError::InvalidDimensions(expected, got));
    }
    Ok(())
}

// ============================================================================
// VECTOR MATH
// ============================================================================

/// L2-normalized copy of `v`; a zero vector stays zero
pub fn normalized(v: &[f32]) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter().map(|x| x / norm).collect()
    } else {
        v.to_vec()
    }
}

/// Compute cosine similarity between two vectors
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut dot_product = 0.0_f32;
    let mut norm_a = 0.0_f32;
    let mut norm_b = 0.0_f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot_product += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denominator = (norm_a * norm_b).sqrt();
    if denominator > 0.0 {
        dot_product / denominator
    } else {
        0.0
    }
}

/// Arithmetic mean of a set of vectors; empty input yields an empty vector
pub fn mean_vector(vectors: &[&[f32]]) -> Vec<f32> {
    let Some(first) = vectors.first() else {
        return vec![];
    };

    let dim = first.len();
    let count = vectors.len() as f32;
    let mut centroid = vec![0.0f32; dim];

    for v in vectors {
        for (slot, val) in centroid.iter_mut().zip(v.iter()) {
            *slot += val;
        }
    }

    for val in &mut centroid {
        *val /= count;
    }

    centroid
}
