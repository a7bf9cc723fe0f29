//! Multi-octave fractal noise producing normalized terrain heights.

use serde::{Deserialize, Serialize};

use super::gradient::{GradientKind, GradientSource, Gradients};
use super::perlin::{Interpolation, PerlinNoise};
use crate::error::TerrainError;

/// Configuration for multi-octave fractal noise generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FractalNoiseConfig {
    /// Number of noise octaves.
    pub octaves: u8,
    /// Frequency of the first octave.
    pub frequency: f64,
    /// Frequency multiplier per octave (typically 2.0).
    pub lacunarity: f64,
    /// Amplitude divisor per octave. 2.0 halves each octave; 1.7 keeps more
    /// high-frequency detail and gives rougher terrain.
    pub persistence: f64,
    /// Scale applied to the octave sum before clamping.
    pub contrast: f64,
    /// Fixed z coordinate for sampling a slice of 3D noise; `None` samples 2D.
    pub z_slice: Option<f64>,
    /// Gradient strategy.
    pub gradient: GradientKind,
    /// Interpolation between corner contributions.
    pub interpolation: Interpolation,
    /// Random seed for reproducible generation.
    pub seed: u64,
}

impl Default for FractalNoiseConfig {
    fn default() -> Self {
        Self {
            octaves: 12,
            frequency: 1.0,
            lacunarity: 2.0,
            persistence: 2.0,
            contrast: 1.2,
            z_slice: None,
            gradient: GradientKind::Hashed,
            interpolation: Interpolation::Linear,
            seed: 0,
        }
    }
}

impl FractalNoiseConfig {
    /// Creates a new noise configuration with the given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// Hashed gradients halving each octave, blended with cubic Hermite
    /// interpolation; soft rolling hills.
    pub fn smooth(seed: u64) -> Self {
        Self {
            persistence: 2.0,
            gradient: GradientKind::Hashed,
            interpolation: Interpolation::CubicHermite,
            seed,
            ..Default::default()
        }
    }

    /// Classic permutation-table noise sliced at z = 0.5 with slower amplitude
    /// decay; craggier terrain.
    pub fn rough(seed: u64) -> Self {
        Self {
            persistence: 1.7,
            z_slice: Some(0.5),
            gradient: GradientKind::Permutation,
            seed,
            ..Default::default()
        }
    }

    /// Checks that every parameter yields finite, well-defined output.
    pub fn validate(&self) -> Result<(), TerrainError> {
        if self.octaves == 0 {
            return Err(TerrainError::invalid("octaves must be at least 1"));
        }
        for (name, value) in [
            ("frequency", self.frequency),
            ("lacunarity", self.lacunarity),
            ("persistence", self.persistence),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(TerrainError::invalid(format!(
                    "{} must be finite and positive, got {}",
                    name, value
                )));
            }
        }
        if !self.contrast.is_finite() {
            return Err(TerrainError::invalid(format!(
                "contrast must be finite, got {}",
                self.contrast
            )));
        }
        if let Some(z) = self.z_slice {
            if !z.is_finite() {
                return Err(TerrainError::invalid(format!("z_slice must be finite, got {}", z)));
            }
        }
        Ok(())
    }
}

/// Octave-summed Perlin noise that maps grid cells to heights in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct FractalNoise<G = Gradients> {
    kernel: PerlinNoise<G>,
    config: FractalNoiseConfig,
}

impl FractalNoise<Gradients> {
    /// Builds the gradient strategy and kernel described by `config`.
    pub fn from_config(config: &FractalNoiseConfig) -> Result<Self, TerrainError> {
        config.validate()?;
        let gradients = Gradients::from_kind(config.gradient, config.seed);
        let kernel = PerlinNoise::new(gradients, config.interpolation);
        Ok(Self {
            kernel,
            config: config.clone(),
        })
    }
}

impl<G: GradientSource> FractalNoise<G> {
    /// Wraps an existing kernel. The kernel's own gradients and interpolation
    /// take precedence over `config.gradient`, `config.interpolation` and
    /// `config.seed`.
    pub fn new(kernel: PerlinNoise<G>, config: FractalNoiseConfig) -> Result<Self, TerrainError> {
        config.validate()?;
        Ok(Self { kernel, config })
    }

    pub fn config(&self) -> &FractalNoiseConfig {
        &self.config
    }

    pub fn kernel(&self) -> &PerlinNoise<G> {
        &self.kernel
    }

    /// Raw octave sum at grid cell `(x, y)`, before contrast and clamping.
    ///
    /// `grid_size` is the number of cells spanned by one base-frequency
    /// lattice cell; callers must pass a finite positive value.
    pub fn octave_sum(&self, x: f64, y: f64, grid_size: f64) -> f64 {
        let config = &self.config;
        let mut total = 0.0;
        let mut frequency = config.frequency;
        let mut amplitude = 1.0;

        for _ in 0..config.octaves {
            let sx = x * frequency / grid_size;
            let sy = y * frequency / grid_size;
            let noise = match config.z_slice {
                Some(z) => self.kernel.get_3d([sx, sy, z]),
                None => self.kernel.get_2d([sx, sy]),
            };
            total += noise * amplitude;
            frequency *= config.lacunarity;
            amplitude /= config.persistence;
        }

        total
    }

    /// Height at grid cell `(x, y)` in `[0, 1]`.
    ///
    /// The sum is clamped to `[-1, 1]` before being remapped, which keeps the
    /// result inside `[0, 1]` for any octave count or decay.
    pub fn sample(&self, x: f64, y: f64, grid_size: f64) -> f32 {
        let value = (self.octave_sum(x, y, grid_size) * self.config.contrast).clamp(-1.0, 1.0);
        ((value + 1.0) / 2.0) as f32
    }
}
