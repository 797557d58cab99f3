//! Terrain error types.

/// Errors raised when building chunks or starting the chunk streamer.
#[derive(Debug, thiserror::Error)]
pub enum TerrainError {
    /// Chunk resolution must be at least 2 samples per edge.
    #[error("chunk resolution {0} is below the minimum of 2")]
    ResolutionTooSmall(u32),

    /// The height grid length does not match `resolution * resolution`.
    #[error("expected {expected} height samples, got {actual}")]
    SampleCountMismatch {
        /// `resolution * resolution`.
        expected: usize,
        /// Length of the supplied grid.
        actual: usize,
    },

    /// Chunk edge length must be finite and positive.
    #[error("invalid chunk size {0}")]
    InvalidChunkSize(f32),

    /// A chunk built for one grid was inserted into a store with another.
    #[error("chunk size {chunk} does not match store chunk size {store}")]
    ChunkSizeMismatch {
        /// Edge length of the rejected chunk.
        chunk: f32,
        /// Edge length the store was created with.
        store: f32,
    },

    /// A generation worker thread could not be spawned.
    #[error("failed to spawn terrain worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),
}
