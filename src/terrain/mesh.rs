//! Triangle-strip mesh over a height field grid.

use std::ops::Range;

use super::field::{cell_count, HeightField};
use crate::error::TerrainError;

/// Strip structure of a `width` x `height` vertex grid.
///
/// The grid is drawn as `height - 1` horizontal strips. Strip `s` holds
/// `2 * width` indices alternating between row `s` and row `s + 1`, so each
/// strip can be issued as its own triangle-strip draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripLayout {
    width: u32,
    height: u32,
}

impl StripLayout {
    /// Validates the grid and checks every vertex is addressable by a `u32`.
    pub fn new(width: u32, height: u32) -> Result<Self, TerrainError> {
        cell_count(width, height)?;
        if (width as u64) * (height as u64) > u32::MAX as u64 + 1 {
            return Err(TerrainError::IndexOverflow { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn num_strips(&self) -> usize {
        self.height as usize - 1
    }

    pub fn vertices_per_strip(&self) -> usize {
        2 * self.width as usize
    }

    /// Total index count, `(height - 1) * 2 * width`.
    pub fn index_count(&self) -> usize {
        self.num_strips() * self.vertices_per_strip()
    }

    /// Index range of strip `strip` within the index buffer.
    pub fn strip_range(&self, strip: usize) -> Range<usize> {
        let start = strip * self.vertices_per_strip();
        start..start + self.vertices_per_strip()
    }

    /// Byte offset of strip `strip` in a `u32` element buffer.
    pub fn strip_offset_bytes(&self, strip: usize) -> usize {
        self.strip_range(strip).start * std::mem::size_of::<u32>()
    }

    /// Builds the index buffer.
    pub fn indices(&self) -> Vec<u32> {
        let width = self.width;
        let mut indices = Vec::with_capacity(self.index_count());

        for row in 0..self.height - 1 {
            for col in 0..width {
                indices.push(row * width + col);
                indices.push((row + 1) * width + col);
            }
        }

        indices
    }
}

/// Builds the triangle-strip index buffer for a `width` x `height` grid.
///
/// Depends only on the dimensions, so the result can be cached and reused
/// for any height field of the same size. A single-row grid has no strips and
/// yields an empty buffer.
pub fn generate_mesh_indices(width: u32, height: u32) -> Result<Vec<u32>, TerrainError> {
    Ok(StripLayout::new(width, height)?.indices())
}

/// Vertex positions and strip indices for a height field.
///
/// Only [`TerrainMesh::build`] creates one, so positions, indices and layout
/// always describe the same grid.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainMesh {
    positions: Vec<[f32; 3]>,
    indices: Vec<u32>,
    layout: StripLayout,
}

impl TerrainMesh {
    /// Lays the field out on the XZ plane centred on the origin, one unit per
    /// cell, with `y = h * vertical_scale - vertical_shift`.
    pub fn build(
        field: &HeightField,
        vertical_scale: f32,
        vertical_shift: f32,
    ) -> Result<Self, TerrainError> {
        if !(vertical_scale.is_finite() && vertical_shift.is_finite()) {
            return Err(TerrainError::invalid(format!(
                "vertical scale {} and shift {} must be finite",
                vertical_scale, vertical_shift
            )));
        }

        let layout = StripLayout::new(field.width(), field.height())?;
        let half_w = field.width() as f32 / 2.0;
        let half_h = field.height() as f32 / 2.0;

        let mut positions = Vec::with_capacity(field.len());
        for row in 0..field.height() {
            for (col, &h) in field.row(row).iter().enumerate() {
                positions.push([
                    col as f32 - half_w,
                    h * vertical_scale - vertical_shift,
                    row as f32 - half_h,
                ]);
            }
        }

        Ok(Self {
            positions,
            indices: layout.indices(),
            layout,
        })
    }

    /// One `[x, y, z]` per grid cell, row-major, y up.
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    /// Triangle-strip indices, see [`StripLayout`].
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn layout(&self) -> &StripLayout {
        &self.layout
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Positions as a flat `x, y, z, x, y, z, ...` float slice.
    pub fn positions_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Expands the strips into individual triangles.
    ///
    /// Odd triangles within a strip have their first two vertices swapped so
    /// all triangles share one winding. Degenerate triangles are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        (0..self.layout.num_strips()).flat_map(move |strip| {
            let indices = &self.indices[self.layout.strip_range(strip)];
            indices.windows(3).enumerate().filter_map(|(k, w)| {
                let tri = if k % 2 == 0 {
                    [w[0], w[1], w[2]]
                } else {
                    [w[1], w[0], w[2]]
                };
                let degenerate = tri[0] == tri[1] || tri[1] == tri[2] || tri[0] == tri[2];
                (!degenerate).then_some(tri)
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_field(width: u32, height: u32, h: f32) -> HeightField {
        HeightField::from_heights(width, height, vec![h; (width * height) as usize]).unwrap()
    }

    #[test]
    fn test_indices_length_and_range() {
        for (w, h) in [(2, 2), (3, 5), (17, 4), (400, 3)] {
            let indices = generate_mesh_indices(w, h).unwrap();
            assert_eq!(indices.len(), (2 * w * (h - 1)) as usize);
            assert!(indices.iter().all(|&i| i < w * h));
        }
    }

    #[test]
    fn test_indices_3x3() {
        let indices = generate_mesh_indices(3, 3).unwrap();
        assert_eq!(indices, vec![0, 3, 1, 4, 2, 5, 3, 6, 4, 7, 5, 8]);
    }

    #[test]
    fn test_indices_idempotent() {
        assert_eq!(generate_mesh_indices(9, 7).unwrap(), generate_mesh_indices(9, 7).unwrap());
    }

    #[test]
    fn test_single_row_has_no_strips() {
        let layout = StripLayout::new(5, 1).unwrap();
        assert_eq!(layout.num_strips(), 0);
        assert!(generate_mesh_indices(5, 1).unwrap().is_empty());
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(generate_mesh_indices(0, 3), Err(TerrainError::InvalidArgument(_))));
        assert!(matches!(generate_mesh_indices(3, 0), Err(TerrainError::InvalidArgument(_))));
    }

    #[test]
    fn test_index_overflow_rejected() {
        assert_eq!(
            StripLayout::new(65_537, 65_536),
            Err(TerrainError::IndexOverflow { width: 65_537, height: 65_536 })
        );
        assert!(StripLayout::new(65_536, 65_536).is_ok());
    }

    #[test]
    fn test_strip_layout() {
        let layout = StripLayout::new(400, 400).unwrap();
        assert_eq!(layout.num_strips(), 399);
        assert_eq!(layout.vertices_per_strip(), 800);
        assert_eq!(layout.index_count(), 399 * 800);
        assert_eq!(layout.strip_range(2), 1600..2400);
        assert_eq!(layout.strip_offset_bytes(2), 1600 * 4);
    }

    #[test]
    fn test_strip_alternates_rows() {
        let layout = StripLayout::new(4, 3).unwrap();
        let indices = layout.indices();
        for strip in 0..layout.num_strips() {
            let slice = &indices[layout.strip_range(strip)];
            for (k, &i) in slice.iter().enumerate() {
                let expected_row = strip as u32 + (k % 2) as u32;
                assert_eq!(i / 4, expected_row);
                assert_eq!(i % 4, (k / 2) as u32);
            }
        }
    }

    #[test]
    fn test_mesh_positions() {
        let field = HeightField::from_heights(2, 2, vec![0.0, 0.5, 1.0, 0.25]).unwrap();
        let mesh = TerrainMesh::build(&field, 64.0, 16.0).unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.positions()[0], [-1.0, -16.0, -1.0]);
        assert_eq!(mesh.positions()[1], [0.0, 16.0, -1.0]);
        assert_eq!(mesh.positions()[2], [-1.0, 48.0, 0.0]);
        assert_eq!(mesh.positions()[3], [0.0, 0.0, 0.0]);
        assert_eq!(mesh.positions_flat().len(), 12);
        assert_eq!(mesh.positions_flat()[4], 16.0);
        assert_eq!(mesh.indices(), &[0, 2, 1, 3]);
        assert_eq!(mesh.layout(), &StripLayout::new(2, 2).unwrap());
    }

    #[test]
    fn test_mesh_parts_agree() {
        let mesh = TerrainMesh::build(&flat_field(7, 3, 0.5), 1.0, 0.0).unwrap();
        assert_eq!(mesh.positions().len(), 21);
        assert_eq!(mesh.indices().len(), mesh.layout().index_count());
        assert_eq!(mesh.indices(), generate_mesh_indices(7, 3).unwrap().as_slice());
        assert!(mesh.indices().iter().all(|&i| (i as usize) < mesh.vertex_count()));
    }

    #[test]
    fn test_mesh_rejects_non_finite_scale() {
        let field = flat_field(2, 2, 0.5);
        assert!(TerrainMesh::build(&field, f32::NAN, 0.0).is_err());
        assert!(TerrainMesh::build(&field, 1.0, f32::INFINITY).is_err());
    }

    #[test]
    fn test_triangle_count() {
        let mesh = TerrainMesh::build(&flat_field(5, 4, 0.5), 1.0, 0.0).unwrap();
        assert_eq!(mesh.triangles().count(), 3 * (2 * 5 - 2));

        let single_column = TerrainMesh::build(&flat_field(1, 4, 0.5), 1.0, 0.0).unwrap();
        assert_eq!(single_column.triangles().count(), 0);
    }

    #[test]
    fn test_triangles_share_winding() {
        let mesh = TerrainMesh::build(&flat_field(6, 5, 0.3), 10.0, 0.0).unwrap();
        for tri in mesh.triangles() {
            let [a, b, c] = tri.map(|i| glam::Vec3::from_array(mesh.positions()[i as usize]));
            let normal = (b - a).cross(c - a);
            assert!(normal.y > 0.0, "triangle {:?} faces down", tri);
        }
    }
}
