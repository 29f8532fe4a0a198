//! Per-cell layer weight maps produced by surface classification.

use serde::{Deserialize, Serialize};

/// One weight vector per grid cell, one entry per layer rule.
///
/// Stored cell-major: the weights of cell `(x, y)` are the `layer_count`
/// consecutive values starting at `(y * width + x) * layer_count`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerWeights {
    width: usize,
    height: usize,
    layer_count: usize,
    weights: Vec<f32>,
    unmatched: usize,
}

impl LayerWeights {
    pub(crate) fn from_parts(
        width: usize,
        height: usize,
        layer_count: usize,
        weights: Vec<f32>,
        unmatched: usize,
    ) -> Self {
        debug_assert_eq!(weights.len(), width * height * layer_count);
        Self {
            width,
            height,
            layer_count,
            weights,
            unmatched,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn layer_count(&self) -> usize {
        self.layer_count
    }

    /// Weight vector for cell `(x, y)`.
    pub fn cell(&self, x: usize, y: usize) -> &[f32] {
        let start = (y * self.width + x) * self.layer_count;
        &self.weights[start..start + self.layer_count]
    }

    /// Flat cell-major weights.
    pub fn as_slice(&self) -> &[f32] {
        &self.weights
    }

    /// Extracts layer `layer` as a row-major mask, one value per cell.
    pub fn layer_mask(&self, layer: usize) -> Vec<f32> {
        assert!(layer < self.layer_count, "layer {layer} out of {}", self.layer_count);
        self.weights
            .chunks(self.layer_count)
            .map(|cell| cell[layer])
            .collect()
    }

    /// Number of cells no rule matched (left as all-zero vectors).
    pub fn unmatched_cells(&self) -> usize {
        self.unmatched
    }
}
