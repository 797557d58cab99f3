//! Multi-octave fractal Brownian motion (fBm) heightmap sampler.
//!
//! Composites several octaves of simplex noise over the horizontal plane to
//! produce terrain heights with features at many spatial frequencies.

use noise::{NoiseFn, Simplex};

/// Configuration for multi-octave fBm noise used in heightmap generation.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightmapParams {
    /// World seed for deterministic generation.
    pub seed: u64,
    /// Number of noise octaves to composite.
    pub octaves: u32,
    /// Frequency multiplier between successive octaves. Default: 2.0.
    pub lacunarity: f64,
    /// Amplitude multiplier between successive octaves. Default: 0.5.
    pub persistence: f64,
    /// Frequency of the first (lowest) octave.
    pub base_frequency: f64,
    /// Amplitude of the first octave, in world units.
    pub amplitude: f64,
}

impl Default for HeightmapParams {
    fn default() -> Self {
        Self {
            seed: 0,
            octaves: 4,
            lacunarity: 2.0,
            persistence: 0.5,
            amplitude: 8.0,
            base_frequency: 0.01,
        }
    }
}

/// Generates terrain height values using fractal Brownian motion over simplex noise.
pub struct HeightmapSampler {
    noise: Simplex,
    params: HeightmapParams,
}

impl HeightmapSampler {
    /// Create a new sampler with the given parameters.
    pub fn new(params: HeightmapParams) -> Self {
        let noise = Simplex::new(params.seed as u32);
        Self { noise, params }
    }

    /// Height at world position `(x, z)`.
    ///
    /// The range is approximately `[-max_amplitude, +max_amplitude]`.
    pub fn sample(&self, x: f64, z: f64) -> f64 {
        let mut total = 0.0;
        let mut frequency = self.params.base_frequency;
        let mut amplitude = self.params.amplitude;

        for _ in 0..self.params.octaves {
            total += self.noise.get([x * frequency, z * frequency]) * amplitude;
            frequency *= self.params.lacunarity;
            amplitude *= self.params.persistence;
        }

        total
    }

    /// Theoretical maximum absolute height (geometric series of amplitudes).
    pub fn max_amplitude(&self) -> f64 {
        let mut sum = 0.0;
        let mut amp = self.params.amplitude;
        for _ in 0..self.params.octaves {
            sum += amp;
            amp *= self.params.persistence;
        }
        sum
    }

    pub fn params(&self) -> &HeightmapParams {
        &self.params
    }
}
