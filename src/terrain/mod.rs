//! Terrain generation module.
//!
//! Builds normalized height fields from fractal noise and the triangle-strip
//! meshes used to render them.

mod field;
mod heightmap;
mod mesh;

pub use field::HeightField;
pub use heightmap::{generate_height_field, generate_height_field_with_config};
pub use mesh::{generate_mesh_indices, StripLayout, TerrainMesh};
