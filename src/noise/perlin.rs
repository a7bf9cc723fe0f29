//! Gradient-noise kernel.

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use super::gradient::GradientSource;

/// Interpolation applied between corner contributions.
///
/// Both variants receive weights already passed through [`fade`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// `a + t (b - a)`
    #[default]
    Linear,
    /// Smoothstep-shaped `(b - a)(3 - 2t)t² + a`.
    CubicHermite,
}

impl Interpolation {
    #[inline]
    pub fn apply(self, a: f64, b: f64, t: f64) -> f64 {
        match self {
            Interpolation::Linear => lerp(a, b, t),
            Interpolation::CubicHermite => cerp(a, b, t),
        }
    }
}

/// Quintic fade curve `6t⁵ - 15t⁴ + 10t³`.
#[inline]
pub fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

#[inline]
pub fn cerp(a: f64, b: f64, t: f64) -> f64 {
    (b - a) * (3.0 - t * 2.0) * t * t + a
}

/// Splits a coordinate into its lattice cell and the offset inside it.
#[inline]
fn split(v: f64) -> (i32, f64) {
    let floor = v.floor();
    (floor as i32, v - floor)
}

/// Perlin gradient noise over a pluggable gradient source.
///
/// The output is roughly within `[-1, 1]` but not hard-bounded.
#[derive(Debug, Clone)]
pub struct PerlinNoise<G> {
    gradients: G,
    interpolation: Interpolation,
}

impl<G: GradientSource> PerlinNoise<G> {
    pub fn new(gradients: G, interpolation: Interpolation) -> Self {
        Self {
            gradients,
            interpolation,
        }
    }

    pub fn gradients(&self) -> &G {
        &self.gradients
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Samples 2D noise at `point`.
    ///
    /// Returns exactly zero at every integer lattice point.
    pub fn get_2d(&self, point: [f64; 2]) -> f64 {
        let (x0, fx) = split(point[0]);
        let (y0, fy) = split(point[1]);
        let x1 = x0.wrapping_add(1);
        let y1 = y0.wrapping_add(1);

        let corner = |ix: i32, iy: i32, dx: f64, dy: f64| {
            self.gradients.gradient_2d(ix, iy).dot(DVec2::new(dx, dy))
        };

        let n00 = corner(x0, y0, fx, fy);
        let n10 = corner(x1, y0, fx - 1.0, fy);
        let n01 = corner(x0, y1, fx, fy - 1.0);
        let n11 = corner(x1, y1, fx - 1.0, fy - 1.0);

        let u = fade(fx);
        let v = fade(fy);
        let interp = self.interpolation;

        let nx0 = interp.apply(n00, n10, u);
        let nx1 = interp.apply(n01, n11, u);
        interp.apply(nx0, nx1, v)
    }

    /// Samples 3D noise at `point`, interpolating along x, then y, then z.
    pub fn get_3d(&self, point: [f64; 3]) -> f64 {
        let (x0, fx) = split(point[0]);
        let (y0, fy) = split(point[1]);
        let (z0, fz) = split(point[2]);
        let x1 = x0.wrapping_add(1);
        let y1 = y0.wrapping_add(1);
        let z1 = z0.wrapping_add(1);

        let corner = |ix: i32, iy: i32, iz: i32, dx: f64, dy: f64, dz: f64| {
            self.gradients
                .gradient_3d(ix, iy, iz)
                .dot(DVec3::new(dx, dy, dz))
        };

        let n000 = corner(x0, y0, z0, fx, fy, fz);
        let n100 = corner(x1, y0, z0, fx - 1.0, fy, fz);
        let n010 = corner(x0, y1, z0, fx, fy - 1.0, fz);
        let n110 = corner(x1, y1, z0, fx - 1.0, fy - 1.0, fz);
        let n001 = corner(x0, y0, z1, fx, fy, fz - 1.0);
        let n101 = corner(x1, y0, z1, fx - 1.0, fy, fz - 1.0);
        let n011 = corner(x0, y1, z1, fx, fy - 1.0, fz - 1.0);
        let n111 = corner(x1, y1, z1, fx - 1.0, fy - 1.0, fz - 1.0);

        let u = fade(fx);
        let v = fade(fy);
        let w = fade(fz);
        let interp = self.interpolation;

        let near = interp.apply(
            interp.apply(n000, n100, u),
            interp.apply(n010, n110, u),
            v,
        );
        let far = interp.apply(
            interp.apply(n001, n101, u),
            interp.apply(n011, n111, u),
            v,
        );
        interp.apply(near, far, w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::gradient::{Gradients, GradientKind, HashedGradients, PermutationTable};

    fn kernels() -> Vec<PerlinNoise<Gradients>> {
        let mut out = Vec::new();
        for kind in [GradientKind::Hashed, GradientKind::Permutation] {
            for interp in [Interpolation::Linear, Interpolation::CubicHermite] {
                out.push(PerlinNoise::new(Gradients::from_kind(kind, 42), interp));
            }
        }
        out
    }

    #[test]
    fn test_fade_endpoints() {
        assert_eq!(fade(0.0), 0.0);
        assert_eq!(fade(1.0), 1.0);
        assert_eq!(fade(0.5), 0.5);
    }

    #[test]
    fn test_fade_is_quintic() {
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            let expected = 6.0 * t.powi(5) - 15.0 * t.powi(4) + 10.0 * t.powi(3);
            assert!((fade(t) - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_interpolations_agree_on_endpoints() {
        for interp in [Interpolation::Linear, Interpolation::CubicHermite] {
            assert_eq!(interp.apply(2.0, 5.0, 0.0), 2.0);
            assert_eq!(interp.apply(2.0, 5.0, 1.0), 5.0);
            assert_eq!(interp.apply(2.0, 5.0, 0.5), 3.5);
        }
    }

    #[test]
    fn test_zero_at_lattice_points() {
        for kernel in kernels() {
            for &(x, y) in &[(0.0, 0.0), (1.0, 0.0), (5.0, 5.0), (-3.0, 7.0)] {
                assert_eq!(kernel.get_2d([x, y]), 0.0, "non-zero at ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_3d_zero_at_lattice_points() {
        for kernel in kernels() {
            assert_eq!(kernel.get_3d([2.0, -4.0, 1.0]), 0.0);
        }
    }

    #[test]
    fn test_deterministic() {
        for kernel in kernels() {
            let a = kernel.get_2d([3.7, -1.25]);
            let b = kernel.get_2d([3.7, -1.25]);
            assert_eq!(a, b);
            assert_eq!(kernel.get_3d([0.3, 0.6, 0.5]), kernel.get_3d([0.3, 0.6, 0.5]));
        }
    }

    #[test]
    fn test_not_constant_between_lattice_points() {
        for kernel in kernels() {
            let values: Vec<f64> = (0..64)
                .map(|i| kernel.get_2d([i as f64 * 0.37 + 0.11, i as f64 * 0.23 + 0.07]))
                .collect();
            assert!(values.iter().any(|v| v.abs() > 1e-3));
        }
    }

    #[test]
    fn test_roughly_bounded() {
        for kernel in kernels() {
            for i in 0..500 {
                let p = [i as f64 * 0.173, i as f64 * 0.091 - 20.0];
                let v = kernel.get_2d(p);
                assert!(v.abs() < 1.5, "{} at {:?}", v, p);
                let w = kernel.get_3d([p[0], p[1], 0.5]);
                assert!(w.abs() < 1.5, "{} at {:?}", w, p);
            }
        }
    }

    #[test]
    fn test_continuous_across_cell_boundary() {
        for kernel in kernels() {
            let eps = 1e-9;
            let left = kernel.get_2d([3.0 - eps, 0.4]);
            let right = kernel.get_2d([3.0 + eps, 0.4]);
            assert!((left - right).abs() < 1e-6);
        }
    }

    #[test]
    fn test_negative_coordinates_use_floor() {
        // -0.5 lies in cell -1, not cell 0.
        let kernel = PerlinNoise::new(HashedGradients::new(0), Interpolation::Linear);
        let g = kernel.gradients().gradient_2d(-1, 0);
        let h = kernel.gradients().gradient_2d(0, 0);
        let expected = lerp(g.dot(DVec2::new(0.5, 0.0)), h.dot(DVec2::new(-0.5, 0.0)), 0.5);
        assert!((kernel.get_2d([-0.5, 0.0]) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_generic_over_concrete_source() {
        let kernel = PerlinNoise::new(PermutationTable::reference(), Interpolation::Linear);
        assert_eq!(kernel.interpolation(), Interpolation::Linear);
        assert_eq!(kernel.get_2d([10.0, 20.0]), 0.0);
        assert_ne!(kernel.get_2d([10.5, 20.25]), 0.0);
    }
}
