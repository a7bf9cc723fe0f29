//! Lattice gradient sources for Perlin noise.
//!
//! Two interchangeable strategies produce the gradient at an integer lattice
//! corner: a shuffled permutation table (classic Perlin) and a stateless
//! integer avalanche hash.

use std::f64::consts::{FRAC_1_SQRT_2, PI};

use glam::{DVec2, DVec3};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Produces a gradient vector for any integer lattice coordinate.
///
/// Implementations must be pure: the same coordinates on the same instance
/// always return the same vector.
pub trait GradientSource: Send + Sync {
    /// Unit gradient at a 2D lattice corner.
    fn gradient_2d(&self, ix: i32, iy: i32) -> DVec2;

    /// Gradient at a 3D lattice corner.
    fn gradient_3d(&self, ix: i32, iy: i32, iz: i32) -> DVec3;
}

/// Which gradient strategy a generator should build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientKind {
    /// Seeded 256-entry permutation table.
    Permutation,
    /// Table-free avalanche hash of the coordinates.
    #[default]
    Hashed,
}

/// Number of distinct entries in the permutation.
pub const TABLE_SIZE: usize = 256;
const TABLE_MASK: i32 = TABLE_SIZE as i32 - 1;

/// Ken Perlin's published permutation.
const REFERENCE_PERMUTATION: [u8; TABLE_SIZE] = [
    151, 160, 137, 91, 90, 15, 131, 13, 201, 95, 96, 53, 194, 233, 7, 225, 140, 36, 103, 30,
    69, 142, 8, 99, 37, 240, 21, 10, 23, 190, 6, 148, 247, 120, 234, 75, 0, 26, 197, 62, 94,
    252, 219, 203, 117, 35, 11, 32, 57, 177, 33, 88, 237, 149, 56, 87, 174, 20, 125, 136, 171,
    168, 68, 175, 74, 165, 71, 134, 139, 48, 27, 166, 77, 146, 158, 231, 83, 111, 229, 122, 60,
    211, 133, 230, 220, 105, 92, 41, 55, 46, 245, 40, 244, 102, 143, 54, 65, 25, 63, 161, 1,
    216, 80, 73, 209, 76, 132, 187, 208, 89, 18, 169, 200, 196, 135, 130, 116, 188, 159, 86,
    164, 100, 109, 198, 173, 186, 3, 64, 52, 217, 226, 250, 124, 123, 5, 202, 38, 147, 118, 126,
    255, 82, 85, 212, 207, 206, 59, 227, 47, 16, 58, 17, 182, 189, 28, 42, 223, 183, 170, 213,
    119, 248, 152, 2, 44, 154, 163, 70, 221, 153, 101, 155, 167, 43, 172, 9, 129, 22, 39, 253,
    19, 98, 108, 110, 79, 113, 224, 232, 178, 185, 112, 104, 218, 246, 97, 228, 251, 34, 242,
    193, 238, 210, 144, 12, 191, 179, 162, 241, 81, 51, 145, 235, 249, 14, 239, 107, 49, 192,
    214, 31, 181, 199, 106, 157, 184, 84, 204, 176, 115, 121, 50, 45, 127, 4, 150, 254, 138,
    236, 205, 93, 222, 114, 67, 29, 24, 72, 243, 141, 128, 195, 78, 66, 215, 61, 156, 180,
];

/// Eight unit directions selected by the low three bits of a 2D hash.
const GRADIENTS_2D: [DVec2; 8] = [
    DVec2::new(1.0, 0.0),
    DVec2::new(-1.0, 0.0),
    DVec2::new(0.0, 1.0),
    DVec2::new(0.0, -1.0),
    DVec2::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2),
    DVec2::new(-FRAC_1_SQRT_2, FRAC_1_SQRT_2),
    DVec2::new(FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
    DVec2::new(-FRAC_1_SQRT_2, -FRAC_1_SQRT_2),
];

/// The 12 cube-edge directions of improved Perlin noise, padded to 16 so the
/// low four bits of a hash index it directly.
const GRADIENTS_3D: [DVec3; 16] = [
    DVec3::new(1.0, 1.0, 0.0),
    DVec3::new(-1.0, 1.0, 0.0),
    DVec3::new(1.0, -1.0, 0.0),
    DVec3::new(-1.0, -1.0, 0.0),
    DVec3::new(1.0, 0.0, 1.0),
    DVec3::new(-1.0, 0.0, 1.0),
    DVec3::new(1.0, 0.0, -1.0),
    DVec3::new(-1.0, 0.0, -1.0),
    DVec3::new(0.0, 1.0, 1.0),
    DVec3::new(0.0, -1.0, 1.0),
    DVec3::new(0.0, 1.0, -1.0),
    DVec3::new(0.0, -1.0, -1.0),
    DVec3::new(1.0, 1.0, 0.0),
    DVec3::new(0.0, -1.0, 1.0),
    DVec3::new(-1.0, 1.0, 0.0),
    DVec3::new(0.0, -1.0, -1.0),
];

/// Classic Perlin permutation table.
///
/// Holds a shuffle of `0..=255` stored twice, so `p[p[x] + y]` stays in
/// bounds for any `x, y` in `0..=255` without a second wrap.
#[derive(Debug, Clone)]
pub struct PermutationTable {
    p: Box<[u8; TABLE_SIZE * 2]>,
}

impl PermutationTable {
    /// Builds a table by shuffling the identity permutation with a seeded RNG.
    pub fn new(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut permutation: Vec<u8> = (0..=u8::MAX).collect();
        permutation.shuffle(&mut rng);
        Self::from_permutation(&permutation)
    }

    /// Builds a table from Ken Perlin's fixed reference permutation.
    pub fn reference() -> Self {
        Self::from_permutation(&REFERENCE_PERMUTATION)
    }

    fn from_permutation(permutation: &[u8]) -> Self {
        debug_assert_eq!(permutation.len(), TABLE_SIZE);
        let mut p = Box::new([0u8; TABLE_SIZE * 2]);
        p[..TABLE_SIZE].copy_from_slice(permutation);
        p[TABLE_SIZE..].copy_from_slice(permutation);
        Self { p }
    }

    /// The 256-entry permutation (first half of the duplicated table).
    pub fn permutation(&self) -> &[u8] {
        &self.p[..TABLE_SIZE]
    }

    #[inline]
    fn at(&self, index: usize) -> usize {
        self.p[index] as usize
    }

    #[inline]
    fn hash_2d(&self, ix: i32, iy: i32) -> usize {
        // Every coordinate must be masked before it touches the table.
        let x = (ix & TABLE_MASK) as usize;
        let y = (iy & TABLE_MASK) as usize;
        self.at(self.at(x) + y)
    }

    #[inline]
    fn hash_3d(&self, ix: i32, iy: i32, iz: i32) -> usize {
        let z = (iz & TABLE_MASK) as usize;
        self.at(self.hash_2d(ix, iy) + z)
    }
}

impl GradientSource for PermutationTable {
    fn gradient_2d(&self, ix: i32, iy: i32) -> DVec2 {
        GRADIENTS_2D[self.hash_2d(ix, iy) & 7]
    }

    fn gradient_3d(&self, ix: i32, iy: i32, iz: i32) -> DVec3 {
        GRADIENTS_3D[self.hash_3d(ix, iy, iz) & 15]
    }
}

/// Table-free gradients from an integer avalanche hash.
///
/// Needs no per-instance state beyond the seed. A seed of 0 reproduces the
/// unseeded hash.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HashedGradients {
    seed: u32,
}

const HALF_BITS: u32 = u32::BITS / 2;

/// Scales a full-range `u32` onto `[0, 2π)`.
const HASH_TO_ANGLE: f64 = PI / 2_147_483_648.0;

impl HashedGradients {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    #[inline]
    fn avalanche(&self, ix: i32, iy: i32) -> u32 {
        let mut a = (ix as u32).wrapping_mul(3_284_157_443);
        let mut b = iy as u32;
        b ^= a.rotate_left(HALF_BITS);
        b = b.wrapping_mul(1_911_520_717);
        a ^= b.rotate_left(HALF_BITS) ^ self.seed;
        a.wrapping_mul(2_048_419_325)
    }
}

impl GradientSource for HashedGradients {
    fn gradient_2d(&self, ix: i32, iy: i32) -> DVec2 {
        let angle = self.avalanche(ix, iy) as f64 * HASH_TO_ANGLE;
        DVec2::new(angle.sin(), angle.cos())
    }

    fn gradient_3d(&self, ix: i32, iy: i32, iz: i32) -> DVec3 {
        let column = self.avalanche(self.avalanche(ix, iy) as i32, iz);
        let angle = column as f64 * HASH_TO_ANGLE;
        let z = self.avalanche(iz, column as i32) as f64 / u32::MAX as f64 * 2.0 - 1.0;
        let r = (1.0 - z * z).max(0.0).sqrt();
        DVec3::new(r * angle.sin(), r * angle.cos(), z)
    }
}

/// Runtime-selected gradient strategy.
#[derive(Debug, Clone)]
pub enum Gradients {
    Permutation(PermutationTable),
    Hashed(HashedGradients),
}

impl Gradients {
    /// Builds the strategy named by `kind` from a single seed.
    pub fn from_kind(kind: GradientKind, seed: u64) -> Self {
        match kind {
            GradientKind::Permutation => Gradients::Permutation(PermutationTable::new(seed)),
            GradientKind::Hashed => Gradients::Hashed(HashedGradients::new(fold_seed(seed))),
        }
    }

    pub fn kind(&self) -> GradientKind {
        match self {
            Gradients::Permutation(_) => GradientKind::Permutation,
            Gradients::Hashed(_) => GradientKind::Hashed,
        }
    }
}

impl GradientSource for Gradients {
    #[inline]
    fn gradient_2d(&self, ix: i32, iy: i32) -> DVec2 {
        match self {
            Gradients::Permutation(table) => table.gradient_2d(ix, iy),
            Gradients::Hashed(hash) => hash.gradient_2d(ix, iy),
        }
    }

    #[inline]
    fn gradient_3d(&self, ix: i32, iy: i32, iz: i32) -> DVec3 {
        match self {
            Gradients::Permutation(table) => table.gradient_3d(ix, iy, iz),
            Gradients::Hashed(hash) => hash.gradient_3d(ix, iy, iz),
        }
    }
}

/// Folds a 64-bit seed into the 32 bits the hash consumes.
fn fold_seed(seed: u64) -> u32 {
    (seed as u32) ^ ((seed >> 32) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_unit(v: DVec2) {
        assert!((v.length() - 1.0).abs() < 1e-12, "{:?} is not unit length", v);
    }

    #[test]
    fn test_table_is_a_permutation() {
        let table = PermutationTable::new(7);
        let mut seen = [false; TABLE_SIZE];
        for &v in table.permutation() {
            assert!(!seen[v as usize], "value {} appears twice", v);
            seen[v as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_table_is_duplicated() {
        let table = PermutationTable::new(99);
        for i in 0..TABLE_SIZE {
            assert_eq!(table.p[i], table.p[i + TABLE_SIZE]);
        }
    }

    #[test]
    fn test_table_seed_reproducibility() {
        assert_eq!(
            PermutationTable::new(42).permutation(),
            PermutationTable::new(42).permutation()
        );
        assert_ne!(
            PermutationTable::new(1).permutation(),
            PermutationTable::new(2).permutation()
        );
    }

    #[test]
    fn test_reference_table_starts_with_published_values() {
        let table = PermutationTable::reference();
        assert_eq!(&table.permutation()[..4], &[151, 160, 137, 91]);
        assert_eq!(table.permutation()[255], 180);
    }

    #[test]
    fn test_table_wraps_every_coordinate() {
        let table = PermutationTable::reference();
        for &(x, y) in &[(0, 0), (17, -3), (-1, -1), (i32::MAX, i32::MIN), (1000, 70000)] {
            assert_eq!(
                table.gradient_2d(x, y),
                table.gradient_2d(x & 255, y & 255),
                "wrap mismatch at ({}, {})",
                x,
                y
            );
            assert_eq!(
                table.gradient_3d(x, y, 9),
                table.gradient_3d(x.wrapping_add(256), y.wrapping_sub(512), 9 + 1024)
            );
        }
    }

    #[test]
    fn test_table_gradients_are_unit_2d() {
        let table = PermutationTable::new(3);
        for x in -8..8 {
            for y in -8..8 {
                assert_unit(table.gradient_2d(x, y));
            }
        }
    }

    #[test]
    fn test_table_3d_gradients_are_cube_edges() {
        let table = PermutationTable::new(5);
        for x in 0..16 {
            for z in 0..16 {
                let g = table.gradient_3d(x, 3, z);
                let zeros = [g.x, g.y, g.z].iter().filter(|c| **c == 0.0).count();
                assert_eq!(zeros, 1, "{:?} is not an edge direction", g);
                assert_eq!(g.length_squared(), 2.0);
            }
        }
    }

    #[test]
    fn test_hashed_gradients_are_unit() {
        let hash = HashedGradients::new(0);
        for x in -20..20 {
            for y in -20..20 {
                assert_unit(hash.gradient_2d(x, y));
                let g = hash.gradient_3d(x, y, x ^ y);
                assert!((g.length() - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_hashed_gradients_are_pure() {
        let hash = HashedGradients::new(1234);
        assert_eq!(hash.gradient_2d(-5, 9), hash.gradient_2d(-5, 9));
        assert_eq!(hash.gradient_3d(8, 2, 1), hash.gradient_3d(8, 2, 1));
    }

    #[test]
    fn test_hashed_seed_changes_gradients() {
        let a = HashedGradients::new(1);
        let b = HashedGradients::new(2);
        let differing = (0..32).filter(|&i| a.gradient_2d(i, i * 3) != b.gradient_2d(i, i * 3)).count();
        assert!(differing > 24);
    }

    #[test]
    fn test_unseeded_hash_origin() {
        // All multiplications of zero stay zero, so the angle is zero.
        let g = HashedGradients::new(0).gradient_2d(0, 0);
        assert_eq!(g, DVec2::new(0.0, 1.0));
    }

    #[test]
    fn test_gradients_enum_dispatch() {
        let table = Gradients::from_kind(GradientKind::Permutation, 11);
        assert_eq!(table.kind(), GradientKind::Permutation);
        assert_eq!(
            table.gradient_2d(4, 5),
            PermutationTable::new(11).gradient_2d(4, 5)
        );

        let hashed = Gradients::from_kind(GradientKind::Hashed, 11);
        assert_eq!(hashed.kind(), GradientKind::Hashed);
        assert_eq!(hashed.gradient_2d(4, 5), HashedGradients::new(11).gradient_2d(4, 5));
    }

    #[test]
    fn test_fold_seed() {
        assert_eq!(fold_seed(0), 0);
        assert_eq!(fold_seed(5), 5);
        assert_eq!(fold_seed(1 << 32), 1);
    }
}
