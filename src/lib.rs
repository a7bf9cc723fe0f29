//! Perlin-noise terrain generator.
//!
//! This crate generates normalized height fields from octave-summed Perlin
//! noise and the triangle-strip index buffers used to render them as a 3D
//! mesh.

pub mod error;
pub mod export;
pub mod noise;
pub mod terrain;

pub use error::TerrainError;
pub use noise::{FractalNoise, FractalNoiseConfig, GradientKind, Interpolation};
pub use terrain::{generate_height_field, generate_mesh_indices, HeightField, StripLayout, TerrainMesh};
