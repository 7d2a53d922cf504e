//! Exact Flat Index
//!
//! Brute-force inner product over one contiguous buffer of normalized
//! vectors. Results are exact and deterministic: equal scores keep insertion
//! order, so rebuilding from the same snapshot reproduces the same answers.

use super::vector::{check_dimensions, normalized, VectorIndex, VectorSearchError};

/// Exact inner-product index
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dimensions: usize,
    data: Vec<f32>,
    ids: Vec<String>,
}

impl FlatIndex {
    /// Create an empty index for vectors of `dimensions`
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            data: Vec::new(),
            ids: Vec::new(),
        }
    }

    /// Ids in insertion order
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    fn row(&self, position: usize) -> &[f32] {
        let start = position * self.dimensions;
        &self.data[start..start + self.dimensions]
    }
}

impl VectorIndex for FlatIndex {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn len(&self) -> usize {
        self.ids.len()
    }

    fn insert(&mut self, id: &str, embedding: &[f32]) -> Result<(), VectorSearchError> {
        check_dimensions(self.dimensions, embedding.len())?;
        self.data.extend(normalized(embedding));
        self.ids.push(id.to_string());
        Ok(())
    }

    fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<(String, f32)>, VectorSearchError> {
        check_dimensions(self.dimensions, embedding.len())?;

        if k == 0 || self.is_empty() {
            return Ok(vec![]);
        }

        let query = normalized(embedding);
        let mut scored: Vec<(usize, f32)> = (0..self.ids.len())
            .map(|pos| {
                let dot = self
                    .row(pos)
                    .iter()
                    .zip(query.iter())
                    .map(|(a, b)| a * b)
                    .sum::<f32>();
                (pos, dot)
            })
            .collect();

        // stable sort: ties stay in insertion order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(pos, score)| (self.ids[pos].clone(), score))
            .collect())
    }

    fn rebuild_from(&mut self, snapshot: &[(&str, &[f32])]) -> Result<(), VectorSearchError> {
        let mut rebuilt = FlatIndex::new(self.dimensions);
        rebuilt.data.reserve(snapshot.len() * self.dimensions);
        rebuilt.ids.reserve(snapshot.len());

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
