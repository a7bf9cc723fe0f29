//! Noise generation module for terrain synthesis.
//!
//! Perlin gradient noise over two interchangeable gradient sources, summed
//! across octaves into normalized heights.

mod fractal;
mod gradient;
mod perlin;

pub use fractal::{FractalNoise, FractalNoiseConfig};
pub use gradient::{GradientKind, GradientSource, Gradients, HashedGradients, PermutationTable, TABLE_SIZE};
pub use perlin::{cerp, fade, lerp, Interpolation, PerlinNoise};
