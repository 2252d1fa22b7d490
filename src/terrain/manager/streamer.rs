// ============================================
// Terrain Streamer - Подгрузка чанков вокруг игрока
// ============================================
//
// Один поток владеет всеми чанками. Воркеры считают карты высот и меши,
// результаты забираются из очереди в начале каждого тика.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use ultraviolet::Vec2;

use crate::settings::{ConfigError, SettingsStore, TerrainConfig};
use crate::tasks::{TaskRunner, WorkQueue};
use crate::terrain::cache::ChunkCoord;
use crate::terrain::generation::FalloffCache;

use super::chunk::{ChunkContext, TerrainChunk};
use super::types::{ChunkEvent, ChunkSink, TickStats};

/// Сдвиг игрока, после которого пересчитывается набор чанков
pub const VIEWER_MOVE_THRESHOLD_FOR_CHUNK_UPDATE: f32 = 25.0;

pub struct TerrainStreamer {
    config: Arc<TerrainConfig>,
    settings: Option<Arc<SettingsStore>>,
    settings_version: u64,
    chunks: HashMap<ChunkCoord, TerrainChunk>,
    visible_chunks: Vec<ChunkCoord>,
    work: WorkQueue<ChunkEvent>,
    falloff: Arc<FalloffCache>,
    generation: u64,
    viewer: Vec2,
    /// Позиция последнего полного прохода
    viewer_at_last_pass: Option<Vec2>,
    /// Позиция прошлого тика
    viewer_at_last_tick: Option<Vec2>,
}

impl TerrainStreamer {
    /// Настройки проверяются и нормализуются здесь (TerrainConfig::validate)
    pub fn new(config: TerrainConfig, runner: Arc<dyn TaskRunner>) -> Result<Self, ConfigError> {
        let config = config.validate()?;
        Ok(Self::with_config(Arc::new(config), None, 0, runner))
    }

    /// Стример, следящий за версией настроек. В хранилище конфиг уже проверен.
    pub fn with_settings(settings: Arc<SettingsStore>, runner: Arc<dyn TaskRunner>) -> Self {
        let (version, config) = settings.snapshot();
        Self::with_config(config, Some(settings), version, runner)
    }

    fn with_config(
        config: Arc<TerrainConfig>,
        settings: Option<Arc<SettingsStore>>,
        settings_version: u64,
        runner: Arc<dyn TaskRunner>,
    ) -> Self {
        log::info!(
            "Terrain streamer: tile {} m, view distance {} m, runner '{}'",
            config.mesh.mesh_world_size(),
            config.max_view_distance(),
            runner.name()
        );

        Self {
            config,
            settings,
            settings_version,
            chunks: HashMap::new(),
            visible_chunks: Vec::new(),
            work: WorkQueue::new(runner),
            falloff: Arc::new(FalloffCache::new()),
            generation: 0,
            viewer: Vec2::zero(),
            viewer_at_last_pass: None,
            viewer_at_last_tick: None,
        }
    }

    /// Один тик: настройки -> готовые результаты -> коллайдеры -> набор чанков
    pub fn update(&mut self, viewer: Vec2, sink: &mut dyn ChunkSink) -> TickStats {
        let mut stats = TickStats::default();
        self.viewer = viewer;

        if self.poll_settings(sink) {
            stats.reset = true;
        }

        self.apply_completions(sink, &mut stats);

        if self.viewer_at_last_tick != Some(viewer) {
            self.viewer_at_last_tick = Some(viewer);
            self.update_colliders(sink);
        }

        let moved_enough = match self.viewer_at_last_pass {
            None => true,
            Some(old) => {
                (old - viewer).mag_sq()
                    > VIEWER_MOVE_THRESHOLD_FOR_CHUNK_UPDATE * VIEWER_MOVE_THRESHOLD_FOR_CHUNK_UPDATE
            }
        };
        if moved_enough {
            self.viewer_at_last_pass = Some(viewer);
            stats.chunks_created = self.update_visible_chunks(sink);
            stats.full_pass = true;
        }

        stats
    }

    /// Сменилась версия настроек -> сбросить все чанки
    fn poll_settings(&mut self, sink: &mut dyn ChunkSink) -> bool {
        let Some(settings) = &self.settings else {
            return false;
        };
        if settings.version() == self.settings_version {
            return false;
        }

        let (version, config) = settings.snapshot();
        self.settings_version = version;
        self.reset(config, sink);
        true
    }

    /// Новое поколение: чанки, очередь и коллайдеры начинаются заново.
    /// Результаты старых задач будут отброшены.
    pub fn reset(&mut self, config: Arc<TerrainConfig>, sink: &mut dyn ChunkSink) {
        for coord in self.visible_chunks.drain(..) {
            sink.set_visible(coord, false);
        }
        log::info!(
            "Terrain reset: {} chunks dropped, generation {} -> {}",
            self.chunks.len(),
            self.generation,
            self.generation + 1
        );

        self.chunks.clear();
        self.config = config;
        self.generation += 1;
        self.viewer_at_last_pass = None;
        self.viewer_at_last_tick = None;
    }

    fn apply_completions(&mut self, sink: &mut dyn ChunkSink, stats: &mut TickStats) {
        for event in self.work.drain() {
            if event.generation() != self.generation {
                log::warn!(
                    "Discarding stale result for chunk {:?} (generation {}, current {})",
                    event.coord(),
                    event.generation(),
                    self.generation
                );
                stats.discarded += 1;
                continue;
            }

            let coord = event.coord();
            let ctx = ChunkContext {
                config: &self.config,
                work: &self.work,
                falloff: &self.falloff,
                generation: self.generation,
            };
            let Some(chunk) = self.chunks.get_mut(&coord) else {
                log::warn!("Discarding result for untracked chunk {:?}", coord);
                stats.discarded += 1;
                continue;
            };

            let visibility = match event {
                ChunkEvent::HeightMapReady { height_field, .. } => {
                    chunk.on_height_map_received(height_field);
                    chunk.update(self.viewer, &ctx, sink)
                }
                ChunkEvent::MeshReady { lod_index, mesh, .. } => {
                    let mesh = match mesh {
                        Ok(mesh) => Arc::new(mesh),
                        Err(e) => {
                            log::warn!("Mesh for chunk {:?} LOD index {} failed: {}", coord, lod_index, e);
                            stats.discarded += 1;
                            continue;
                        }
                    };
                    chunk.on_mesh_received(lod_index, mesh);
                    let visibility = chunk.update(self.viewer, &ctx, sink);
                    if lod_index == chunk.collider_lod_index() {
                        chunk.update_collision_mesh(self.viewer, &ctx, sink);
                    }
                    visibility
                }
            };

            stats.applied += 1;
            if let Some(visible) = visibility {
                self.on_visibility_changed(coord, visible);
            }
        }
    }

    fn update_colliders(&mut self, sink: &mut dyn ChunkSink) {
        let ctx = ChunkContext {
            config: &self.config,
            work: &self.work,
            falloff: &self.falloff,
            generation: self.generation,
        };
        for coord in &self.visible_chunks {
            if let Some(chunk) = self.chunks.get_mut(coord) {
                chunk.update_collision_mesh(self.viewer, &ctx, sink);
            }
        }
    }

    /// Полный проход: видимые чанки, затем квадрат вокруг игрока.
    /// Возвращает число созданных чанков.
    fn update_visible_chunks(&mut self, sink: &mut dyn ChunkSink) -> usize {
        let mut updated: HashSet<ChunkCoord> = HashSet::new();
        let mut changes = Vec::new();
        let mut created = 0;

        let ctx = ChunkContext {
            config: &self.config,
            work: &self.work,
            falloff: &self.falloff,
            generation: self.generation,
        };

        for coord in &self.visible_chunks {
            updated.insert(*coord);
            if let Some(chunk) = self.chunks.get_mut(coord) {
                if let Some(visible) = chunk.update(self.viewer, &ctx, sink) {
                    changes.push((*coord, visible));
                }
            }
        }

        let mesh_world_size = self.config.mesh.mesh_world_size();
        let current = ChunkCoord::from_world(self.viewer, mesh_world_size);
        let radius = self.config.chunks_visible_in_view_distance();

        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let coord = current.offset(dx, dy);
                if updated.contains(&coord) {
                    continue;
                }

                match self.chunks.entry(coord) {
                    Entry::Occupied(mut entry) => {
                        if let Some(visible) = entry.get_mut().update(self.viewer, &ctx, sink) {
                            changes.push((coord, visible));
                        }
                    }
                    Entry::Vacant(entry) => {
                        let mut chunk = TerrainChunk::new(coord, ctx.config);
                        chunk.load(&ctx);
                        entry.insert(chunk);
                        created += 1;
                    }
                }
            }
        }

        for (coord, visible) in changes {
            self.on_visibility_changed(coord, visible);
        }

        if created > 0 {
            log::debug!("Created {} chunks around {:?} (total {})", created, current, self.chunks.len());
        }
        created
    }

    fn on_visibility_changed(&mut self, coord: ChunkCoord, visible: bool) {
        if visible {
            if !self.visible_chunks.contains(&coord) {
                self.visible_chunks.push(coord);
            }
        } else {
            self.visible_chunks.retain(|c| *c != coord);
        }
    }

    pub fn config(&self) -> &Arc<TerrainConfig> {
        &self.config
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&TerrainChunk> {
        self.chunks.get(&coord)
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn visible_chunks(&self) -> &[ChunkCoord] {
        &self.visible_chunks
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Задачи в работе + готовые, но не применённые результаты
    pub fn pending_tasks(&self) -> usize {
        self.work.in_flight() + self.work.ready()
    }
}
