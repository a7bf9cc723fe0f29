//! Heightmap generation using fractal noise.

use std::time::Instant;

use log::debug;
use rayon::prelude::*;

use super::field::{cell_count, HeightField};
use crate::error::TerrainError;
use crate::noise::{FractalNoise, FractalNoiseConfig, GradientSource};

/// Generates a `width` x `height` field of heights in `[0, 1]`.
///
/// Cell `(x, y)` is `noise.sample(x, y, grid_size)`, stored at
/// `y * width + x`. Rows are filled in parallel; the result is identical to a
/// sequential fill.
///
/// # Arguments
/// * `width` - Number of columns (at least 1)
/// * `height` - Number of rows (at least 1)
/// * `grid_size` - Cells per base-frequency lattice cell (finite, > 0)
/// * `noise` - Fractal noise generator
///
/// # Returns
/// The height field, or `TerrainError::InvalidArgument` before any sampling
/// when an argument is out of range
pub fn generate_height_field<G: GradientSource>(
    width: u32,
    height: u32,
    grid_size: f64,
    noise: &FractalNoise<G>,
) -> Result<HeightField, TerrainError> {
    let cells = cell_count(width, height)?;
    if !(grid_size.is_finite() && grid_size > 0.0) {
        return Err(TerrainError::invalid(format!(
            "grid_size must be finite and positive, got {}",
            grid_size
        )));
    }

    let start = Instant::now();
    let mut heights = vec![0.0f32; cells];

    heights
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, h) in row.iter_mut().enumerate() {
                *h = noise.sample(x as f64, y as f64, grid_size);
            }
        });

    debug!(
        "generated {}x{} height field (grid_size {}, {} octaves) in {:.2?}",
        width,
        height,
        grid_size,
        noise.config().octaves,
        start.elapsed()
    );

    Ok(HeightField::new_unchecked(width, height, heights))
}

/// Builds the generator described by `config` and generates a height field.
pub fn generate_height_field_with_config(
    width: u32,
    height: u32,
    grid_size: f64,
    config: &FractalNoiseConfig,
) -> Result<HeightField, TerrainError> {
    let noise = FractalNoise::from_config(config)?;
    generate_height_field(width, height, grid_size, &noise)
}
