//! Terrain elevation: the synchronous height-query contract used by player
//! locomotion, a procedural heightmap, a sparse chunk store, and background
//! chunk streaming that fills the store without ever blocking a query.

mod chunk;
mod error;
mod heightmap;
mod provider;
mod streaming;

pub use chunk::{ChunkCoord, ChunkedElevation, ElevationChunk};
pub use error::TerrainError;
pub use heightmap::{HeightmapParams, HeightmapSampler};
pub use provider::{ElevationProvider, FlatGround, Unloaded};
pub use streaming::{ElevationStreamer, StreamerSettings, generate_chunk_sync};
