//! Background terrain chunk generation.
//!
//! Generation runs on worker threads. The simulation thread asks for the
//! chunks around the player with [`ElevationStreamer::request_around`] and
//! installs finished ones with [`ElevationStreamer::drain_into`]. Neither
//! call blocks; until a chunk arrives, queries over it simply return `None`.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use dashmap::DashSet;
use tracing::{debug, warn};

use crate::chunk::{ChunkCoord, ChunkedElevation, ElevationChunk};
use crate::error::TerrainError;
use crate::heightmap::{HeightmapParams, HeightmapSampler};

/// Streamer sizing and chunk geometry.
#[derive(Clone, Debug)]
pub struct StreamerSettings {
    /// Edge length of a chunk in world units.
    pub chunk_size: f32,
    /// Height samples per chunk edge.
    pub resolution: u32,
    /// Worker threads. 0 picks `num_cpus - 2` (at least 1).
    pub worker_threads: usize,
    /// Maximum queued generation requests.
    pub queue_capacity: usize,
}

impl Default for StreamerSettings {
    fn default() -> Self {
        Self {
            chunk_size: 32.0,
            resolution: 33,
            worker_threads: 0,
            queue_capacity: 64,
        }
    }
}

/// A generated chunk plus its generation time (for profiling).
struct GeneratedChunk {
    chunk: ElevationChunk,
    generation_time_us: u64,
}

/// Generates terrain chunks on a thread pool.
pub struct ElevationStreamer {
    task_sender: Sender<ChunkCoord>,
    result_receiver: Receiver<Result<GeneratedChunk, ChunkCoord>>,
    pending: Arc<DashSet<ChunkCoord>>,
    in_flight: Arc<AtomicU64>,
    chunk_size: f32,
}

impl ElevationStreamer {
    /// Spawn the worker pool.
    pub fn new(
        params: HeightmapParams,
        settings: StreamerSettings,
    ) -> Result<Self, TerrainError> {
        if !settings.chunk_size.is_finite() || settings.chunk_size <= 0.0 {
            return Err(TerrainError::InvalidChunkSize(settings.chunk_size));
        }
        if settings.resolution < 2 {
            return Err(TerrainError::ResolutionTooSmall(settings.resolution));
        }

        let thread_count = if settings.worker_threads == 0 {
            num_cpus::get().saturating_sub(2).max(1)
        } else {
            settings.worker_threads
        };
        let capacity = settings.queue_capacity.max(1);

        let (task_sender, task_receiver) = bounded::<ChunkCoord>(capacity);
        let (result_sender, result_receiver) = bounded(capacity);
        let sampler = Arc::new(HeightmapSampler::new(params));
        let in_flight = Arc::new(AtomicU64::new(0));

        for index in 0..thread_count {
            let receiver = task_receiver.clone();
            let sender = result_sender.clone();
            let sampler = Arc::clone(&sampler);
            let (chunk_size, resolution) = (settings.chunk_size, settings.resolution);

            std::thread::Builder::new()
                .name(format!("terrain-worker-{index}"))
                .spawn(move || {
                    while let Ok(coord) = receiver.recv() {
                        let start = std::time::Instant::now();
                        let result = generate_chunk_sync(coord, &sampler, chunk_size, resolution)
                            .map(|chunk| GeneratedChunk {
                                chunk,
                                generation_time_us: start.elapsed().as_micros() as u64,
                            })
                            .map_err(|_| coord);
                        if sender.send(result).is_err() {
                            break;
                        }
                    }
                })
                .map_err(TerrainError::WorkerSpawn)?;
        }

        debug!(thread_count, capacity, "terrain streamer started");

        Ok(Self {
            task_sender,
            result_receiver,
            pending: Arc::new(DashSet::new()),
            in_flight,
            chunk_size: settings.chunk_size,
        })
    }

    pub fn chunk_size(&self) -> f32 {
        self.chunk_size
    }

    /// Queue every chunk within `radius` chunks of `(x, z)` that is neither
    /// resident in `store` nor already pending, nearest first.
    ///
    /// Returns the number of chunks queued. Stops early when the queue is
    /// full; the remainder is picked up on a later call. A position off the
    /// chunk grid queues nothing.
    pub fn request_around(&self, x: f32, z: f32, radius: u32, store: &ChunkedElevation) -> usize {
        let Some(center) = ChunkCoord::containing(x, z, self.chunk_size) else {
            debug!(x, z, "position is off the chunk grid, nothing to stream");
            return 0;
        };
        let mut wanted: Vec<ChunkCoord> = neighbourhood(center, radius)
            .filter(|coord| !store.contains(*coord) && !self.pending.contains(coord))
            .collect();
        wanted.sort_by_key(|coord| (coord.distance_squared(center), *coord));

        let mut queued = 0;
        for coord in wanted {
            self.pending.insert(coord);
            match self.task_sender.try_send(coord) {
                Ok(()) => {
                    self.in_flight.fetch_add(1, Ordering::Relaxed);
                    queued += 1;
                }
                Err(TrySendError::Full(_) | TrySendError::Disconnected(_)) => {
                    self.pending.remove(&coord);
                    break;
                }
            }
        }
        queued
    }

    /// Install every finished chunk into `store`. Returns how many were added.
    pub fn drain_into(&self, store: &mut ChunkedElevation) -> usize {
        let mut installed = 0;
        while let Ok(result) = self.result_receiver.try_recv() {
            self.in_flight.fetch_sub(1, Ordering::Relaxed);
            match result {
                Ok(generated) => {
                    let coord = generated.chunk.coord();
                    self.pending.remove(&coord);
                    match store.insert(generated.chunk) {
                        Ok(()) => {
                            installed += 1;
                            debug!(
                                x = coord.x,
                                z = coord.z,
                                micros = generated.generation_time_us,
                                "terrain chunk installed"
                            );
                        }
                        Err(err) => warn!(%err, "discarding generated chunk"),
                    }
                }
                Err(coord) => {
                    self.pending.remove(&coord);
                    warn!(x = coord.x, z = coord.z, "terrain chunk generation failed");
                }
            }
        }
        installed
    }

    /// Chunks queued or being generated.
    pub fn in_flight_count(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    pub fn is_pending(&self, coord: ChunkCoord) -> bool {
        self.pending.contains(&coord)
    }
}

/// Generate one chunk on the calling thread.
pub fn generate_chunk_sync(
    coord: ChunkCoord,
    sampler: &HeightmapSampler,
    chunk_size: f32,
    resolution: u32,
) -> Result<ElevationChunk, TerrainError> {
    ElevationChunk::from_fn(coord, chunk_size, resolution, |x, z| {
        sampler.sample(f64::from(x), f64::from(z)) as f32
    })
}

/// Chunks within Chebyshev `radius` of `center`, clipped at the grid edge.
fn neighbourhood(center: ChunkCoord, radius: u32) -> impl Iterator<Item = ChunkCoord> {
    let r = i32::try_from(radius).unwrap_or(i32::MAX);
    (-r..=r).flat_map(move |dz| (-r..=r).filter_map(move |dx| center.offset(dx, dz)))
}
