//! The elevation query contract.

/// Synchronous, best-effort terrain height lookup.
///
/// `None` means the column at `(x, z)` is not known yet (for example its
/// chunk has not been generated). That is a normal answer, not an error.
/// Implementations must never block: asynchronous generation belongs behind
/// this interface, not in front of it.
pub trait ElevationProvider {
    /// Terrain height at the horizontal position `(x, z)`, if known.
    fn elevation_at(&self, x: f32, z: f32) -> Option<f32>;
}

impl<F> ElevationProvider for F
where
    F: Fn(f32, f32) -> Option<f32>,
{
    fn elevation_at(&self, x: f32, z: f32) -> Option<f32> {
        self(x, z)
    }
}

/// Terrain at a constant height everywhere.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlatGround {
    pub height: f32,
}

impl FlatGround {
    pub fn new(height: f32) -> Self {
        Self { height }
    }
}

impl ElevationProvider for FlatGround {
    fn elevation_at(&self, _x: f32, _z: f32) -> Option<f32> {
        Some(self.height)
    }
}

/// Terrain that has not loaded anywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unloaded;

impl ElevationProvider for Unloaded {
    fn elevation_at(&self, _x: f32, _z: f32) -> Option<f32> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(provider: &dyn ElevationProvider, x: f32, z: f32) -> Option<f32> {
        provider.elevation_at(x, z)
    }

    #[test]
    fn test_flat_ground_is_constant() {
        let ground = FlatGround::new(3.5);
        assert_eq!(query(&ground, 0.0, 0.0), Some(3.5));
        assert_eq!(query(&ground, -1e4, 42.0), Some(3.5));
    }

    #[test]
    fn test_unloaded_is_always_absent() {
        assert_eq!(query(&Unloaded, 10.0, 1.0), None);
    }

    #[test]
    fn test_closure_acts_as_provider() {
        let ramp = |x: f32, _z: f32| if x >= 0.0 { Some(x * 0.5) } else { None };
        assert_eq!(query(&ramp, 4.0, 0.0), Some(2.0));
        assert_eq!(query(&ramp, -1.0, 0.0), None);
    }
}
