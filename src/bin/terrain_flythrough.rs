// ============================================
// Terrain Flythrough - Пролёт над террейном без рендера
// ============================================
//
// terrain_flythrough [config.json]
// RUST_LOG=debug для подробного лога

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use ultraviolet::Vec2;

use endless_terrain::terrain::MeshData;
use endless_terrain::{ChunkCoord, ChunkSink, RayonTaskRunner, TerrainConfig, TerrainStreamer};

const FLIGHT_STEPS: usize = 600;
const FLIGHT_SPEED: f32 = 4.0;
const FRAME_TIME: Duration = Duration::from_millis(16);
const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Считает, что стример отдал наружу
#[derive(Default)]
struct StatsSink {
    meshes_shown: usize,
    vertices_shown: usize,
    bytes_shown: usize,
    visible: usize,
    colliders: usize,
}

impl ChunkSink for StatsSink {
    fn show_mesh(&mut self, coord: ChunkCoord, mesh: &Arc<MeshData>) {
        log::debug!("Chunk {:?}: LOD {} ({} vertices)", coord, mesh.lod, mesh.vertex_count());
        self.meshes_shown += 1;
        self.vertices_shown += mesh.vertex_count();
        self.bytes_shown += mesh.memory_usage();
    }

    fn set_visible(&mut self, _coord: ChunkCoord, visible: bool) {
        if visible {
            self.visible += 1;
        } else {
            self.visible = self.visible.saturating_sub(1);
        }
    }

    fn assign_collider(&mut self, coord: ChunkCoord, _mesh: &Arc<MeshData>) {
        log::info!("Collider assigned to chunk {:?}", coord);
        self.colliders += 1;
    }
}

fn main() {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => match TerrainConfig::load_from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => TerrainConfig::built_in(),
    };

    let runner = match RayonTaskRunner::new(0) {
        Ok(runner) => runner,
        Err(e) => {
            eprintln!("Failed to start worker pool: {}", e);
            std::process::exit(1);
        }
    };

    println!("=== Terrain Flythrough ===");
    println!("Tile size: {} m", config.mesh.mesh_world_size());
    println!("View distance: {} m", config.max_view_distance());
    println!("Worker threads: {}", runner.num_threads());
    println!("==========================");

    let mut streamer = match TerrainStreamer::new(config, Arc::new(runner)) {
        Ok(streamer) => streamer,
        Err(e) => {
            eprintln!("Invalid terrain config: {}", e);
            std::process::exit(1);
        }
    };
    let mut sink = StatsSink::default();
    let started = Instant::now();
    let mut discarded = 0;

    for step in 0..FLIGHT_STEPS {
        let viewer = Vec2::new(step as f32 * FLIGHT_SPEED, step as f32 * FLIGHT_SPEED * 0.25);
        let stats = streamer.update(viewer, &mut sink);
        discarded += stats.discarded;

        if stats.full_pass {
            log::info!(
                "Step {}: {} chunks tracked, {} visible, {} tasks pending",
                step,
                streamer.chunk_count(),
                streamer.visible_chunks().len(),
                streamer.pending_tasks()
            );
        }
        thread::sleep(FRAME_TIME);
    }

    // Дождаться оставшихся задач
    let last_viewer = Vec2::new(FLIGHT_STEPS as f32 * FLIGHT_SPEED, FLIGHT_STEPS as f32 * FLIGHT_SPEED * 0.25);
    let settle_start = Instant::now();
    while streamer.pending_tasks() > 0 && settle_start.elapsed() < SETTLE_TIMEOUT {
        streamer.update(last_viewer, &mut sink);
        thread::sleep(FRAME_TIME);
    }

    println!("=== Done in {:.2}s ===", started.elapsed().as_secs_f32());
    println!("Chunks tracked: {}", streamer.chunk_count());
    println!("Visible chunks: {} (sink: {})", streamer.visible_chunks().len(), sink.visible);
    println!(
        "Meshes shown: {} ({} vertices, {:.1} MB)",
        sink.meshes_shown,
        sink.vertices_shown,
        sink.bytes_shown as f64 / (1024.0 * 1024.0)
    );
    println!("Colliders: {}", sink.colliders);
    println!("Discarded results: {}", discarded);
}
