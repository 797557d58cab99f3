//! Sparse, chunked terrain height store.
//!
//! The horizontal plane is cut into square chunks of `chunk_size` world
//! units. A chunk holds a `resolution x resolution` grid of heights whose
//! border samples coincide with its neighbours' borders, so bilinear
//! sampling is continuous across chunk edges. Columns whose chunk is not
//! resident have no elevation.

use hashbrown::HashMap;
use tracing::warn;

use crate::error::TerrainError;
use crate::provider::ElevationProvider;

/// Integer address of a chunk on the horizontal grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// The chunk containing world position `(x, z)`, or `None` when the
    /// position is not finite or lies beyond the `i32` chunk grid.
    pub fn containing(x: f32, z: f32, chunk_size: f32) -> Option<Self> {
        Some(Self {
            x: grid_index(x / chunk_size)?,
            z: grid_index(z / chunk_size)?,
        })
    }

    /// This coordinate moved by `(dx, dz)` chunks, or `None` on overflow.
    pub fn offset(self, dx: i32, dz: i32) -> Option<Self> {
        Some(Self {
            x: self.x.checked_add(dx)?,
            z: self.z.checked_add(dz)?,
        })
    }

    /// World position of the chunk's minimum corner.
    pub fn origin(self, chunk_size: f32) -> (f32, f32) {
        (self.x as f32 * chunk_size, self.z as f32 * chunk_size)
    }

    /// Chebyshev distance in chunks.
    pub fn distance(self, other: ChunkCoord) -> u32 {
        self.x.abs_diff(other.x).max(self.z.abs_diff(other.z))
    }

    /// Squared Euclidean distance in chunks, used to order generation.
    pub fn distance_squared(self, other: ChunkCoord) -> u64 {
        let dx = u64::from(self.x.abs_diff(other.x));
        let dz = u64::from(self.z.abs_diff(other.z));
        dx * dx + dz * dz
    }
}

fn grid_index(cells: f32) -> Option<i32> {
    let cell = cells.floor();
    // i32::MAX as f32 rounds up to 2^31, so the upper bound is exclusive.
    (i32::MIN as f32..i32::MAX as f32)
        .contains(&cell)
        .then_some(cell as i32)
}

/// One chunk worth of terrain heights.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationChunk {
    coord: ChunkCoord,
    size: f32,
    resolution: u32,
    /// Row-major, `heights[iz * resolution + ix]`.
    heights: Vec<f32>,
}

impl ElevationChunk {
    /// Build a chunk from a precomputed height grid.
    pub fn new(
        coord: ChunkCoord,
        size: f32,
        resolution: u32,
        heights: Vec<f32>,
    ) -> Result<Self, TerrainError> {
        if !size.is_finite() || size <= 0.0 {
            return Err(TerrainError::InvalidChunkSize(size));
        }
        if resolution < 2 {
            return Err(TerrainError::ResolutionTooSmall(resolution));
        }
        let expected = (resolution as usize) * (resolution as usize);
        if heights.len() != expected {
            return Err(TerrainError::SampleCountMismatch {
                expected,
                actual: heights.len(),
            });
        }
        Ok(Self {
            coord,
            size,
            resolution,
            heights,
        })
    }

    /// Build a chunk by evaluating `height(x, z)` at every grid point.
    pub fn from_fn(
        coord: ChunkCoord,
        size: f32,
        resolution: u32,
        height: impl Fn(f32, f32) -> f32,
    ) -> Result<Self, TerrainError> {
        if resolution < 2 {
            return Err(TerrainError::ResolutionTooSmall(resolution));
        }
        let (ox, oz) = coord.origin(size);
        let step = size / (resolution - 1) as f32;
        let mut heights = Vec::with_capacity((resolution * resolution) as usize);
        for iz in 0..resolution {
            for ix in 0..resolution {
                heights.push(height(ox + ix as f32 * step, oz + iz as f32 * step));
            }
        }
        Self::new(coord, size, resolution, heights)
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    fn at(&self, ix: usize, iz: usize) -> f32 {
        self.heights[iz * self.resolution as usize + ix]
    }

    /// Bilinear height at world position `(x, z)`, or `None` outside the chunk.
    pub fn sample(&self, x: f32, z: f32) -> Option<f32> {
        let (ox, oz) = self.coord.origin(self.size);
        let u = (x - ox) / self.size;
        let v = (z - oz) / self.size;
        if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
            return None;
        }

        let cells = (self.resolution - 1) as f32;
        let gx = u * cells;
        let gz = v * cells;
        let last = self.resolution as usize - 2;
        let ix = (gx.floor() as usize).min(last);
        let iz = (gz.floor() as usize).min(last);
        let tx = gx - ix as f32;
        let tz = gz - iz as f32;

        let h00 = self.at(ix, iz);
        let h10 = self.at(ix + 1, iz);
        let h01 = self.at(ix, iz + 1);
        let h11 = self.at(ix + 1, iz + 1);

        let near = h00 + (h10 - h00) * tx;
        let far = h01 + (h11 - h01) * tx;
        Some(near + (far - near) * tz)
    }
}

/// Resident terrain chunks keyed by coordinate.
#[derive(Debug, Clone)]
pub struct ChunkedElevation {
    chunk_size: f32,
    chunks: HashMap<ChunkCoord, ElevationChunk>,
}

impl ChunkedElevation {
    /// Create an empty store for chunks of `chunk_size` world units.
    pub fn new(chunk_size: f32) -> Result<Self, TerrainError> {
        if !chunk_size.is_finite() || chunk_size <= 0.0 {
            return Err(TerrainError::InvalidChunkSize(chunk_size));
        }
        Ok(Self {
            chunk_size,
            chunks: HashMap::new(),
        })
    }

    pub fn chunk_size(&self) -> f32 {
        self.chunk_size
    }

    /// Install a chunk, replacing any previous chunk at the same coordinate.
    pub fn insert(&mut self, chunk: ElevationChunk) -> Result<(), TerrainError> {
        if chunk.size() != self.chunk_size {
            return Err(TerrainError::ChunkSizeMismatch {
                chunk: chunk.size(),
                store: self.chunk_size,
            });
        }
        self.chunks.insert(chunk.coord(), chunk);
        Ok(())
    }

    pub fn remove(&mut self, coord: ChunkCoord) -> Option<ElevationChunk> {
        self.chunks.remove(&coord)
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// The chunk containing world position `(x, z)`, if it is on the grid.
    pub fn coord_at(&self, x: f32, z: f32) -> Option<ChunkCoord> {
        ChunkCoord::containing(x, z, self.chunk_size)
    }

    /// Drop every chunk farther than `radius` chunks from `center`.
    /// Returns how many were evicted.
    pub fn retain_within(&mut self, center: ChunkCoord, radius: u32) -> usize {
        let before = self.chunks.len();
        self.chunks
            .retain(|coord, _| coord.distance(center) <= radius);
        before - self.chunks.len()
    }
}

impl ElevationProvider for ChunkedElevation {
    fn elevation_at(&self, x: f32, z: f32) -> Option<f32> {
        let chunk = self.chunks.get(&self.coord_at(x, z)?)?;
        let height = chunk.sample(x, z)?;
        if height.is_finite() {
            Some(height)
        } else {
            warn!(x, z, height, "non-finite terrain sample treated as absent");
            None
        }
    }
}
