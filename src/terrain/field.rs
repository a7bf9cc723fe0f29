//! Height field data structure.

use serde::{Deserialize, Serialize};

use crate::error::TerrainError;

/// A dense grid of normalized heights.
///
/// Values are stored in row-major order and always lie in `[0, 1]`. The field
/// is immutable once built. Deserialization goes through
/// [`HeightField::from_heights`], so stored data is checked the same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "HeightFieldData")]
pub struct HeightField {
    width: u32,
    height: u32,
    heights: Vec<f32>,
}

/// Unvalidated wire form of [`HeightField`].
#[derive(Deserialize)]
struct HeightFieldData {
    width: u32,
    height: u32,
    heights: Vec<f32>,
}

impl TryFrom<HeightFieldData> for HeightField {
    type Error = TerrainError;

    fn try_from(data: HeightFieldData) -> Result<Self, Self::Error> {
        HeightField::from_heights(data.width, data.height, data.heights)
    }
}

impl HeightField {
    /// Wraps precomputed heights, checking length and range.
    pub fn from_heights(width: u32, height: u32, heights: Vec<f32>) -> Result<Self, TerrainError> {
        let expected = cell_count(width, height)?;
        if heights.len() != expected {
            return Err(TerrainError::invalid(format!(
                "height data length {} != expected {}",
                heights.len(),
                expected
            )));
        }
        if let Some((i, h)) = heights
            .iter()
            .enumerate()
            .find(|(_, h)| !(0.0..=1.0).contains(*h))
        {
            return Err(TerrainError::invalid(format!(
                "height {} at index {} is outside [0, 1]",
                h, i
            )));
        }
        Ok(Self::new_unchecked(width, height, heights))
    }

    pub(crate) fn new_unchecked(width: u32, height: u32, heights: Vec<f32>) -> Self {
        debug_assert_eq!(heights.len(), width as usize * height as usize);
        Self {
            width,
            height,
            heights,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of cells (`width * height`).
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// Height at column `x`, row `y`.
    ///
    /// # Panics
    /// If `x` or `y` is outside the grid.
    pub fn get(&self, x: u32, y: u32) -> f32 {
        assert!(x < self.width && y < self.height, "({}, {}) outside {}x{} field", x, y, self.width, self.height);
        self.heights[(y as usize) * (self.width as usize) + x as usize]
    }

    /// Row `y` as a slice of `width` heights.
    ///
    /// # Panics
    /// If `y` is outside the grid.
    pub fn row(&self, y: u32) -> &[f32] {
        let w = self.width as usize;
        let start = y as usize * w;
        &self.heights[start..start + w]
    }

    /// Row-major heights, ready for a single-channel float texture upload.
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    pub fn into_heights(self) -> Vec<f32> {
        self.heights
    }

    /// Minimum and maximum height.
    pub fn value_range(&self) -> (f32, f32) {
        let mut min = f32::MAX;
        let mut max = f32::MIN;

        for &h in &self.heights {
            min = min.min(h);
            max = max.max(h);
        }

        (min, max)
    }
}

/// Validates grid dimensions and returns the cell count.
pub(crate) fn cell_count(width: u32, height: u32) -> Result<usize, TerrainError> {
    if width == 0 || height == 0 {
        return Err(TerrainError::invalid(format!(
            "grid dimensions must be at least 1x1, got {}x{}",
            width, height
        )));
    }
    (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| TerrainError::invalid(format!("grid {}x{} is too large", width, height)))
}
