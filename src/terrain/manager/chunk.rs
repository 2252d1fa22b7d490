// ============================================
// Terrain Chunk - Тайл террейна с LOD мешами
// ============================================

use std::sync::Arc;

use ultraviolet::Vec2;

use crate::settings::TerrainConfig;
use crate::tasks::WorkQueue;
use crate::terrain::cache::ChunkCoord;
use crate::terrain::generation::{generate_height_map, FalloffCache, HeightField, HeightRemap};
use crate::terrain::lod::select_lod_index;
use crate::terrain::mesh::{generate_terrain_mesh, MeshData};

use super::types::{ChunkEvent, ChunkSink};

/// Дистанция, ближе которой меш коллайдера передаётся физике
pub const COLLIDER_GENERATION_DISTANCE: f32 = 5.0;

/// Квадрат чанка на плоскости XZ
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkBounds {
    pub centre: Vec2,
    pub half_size: f32,
}

impl ChunkBounds {
    pub fn new(centre: Vec2, size: f32) -> Self {
        Self { centre, half_size: size / 2.0 }
    }

    /// Квадрат расстояния до ближайшей точки квадрата (0 внутри)
    pub fn sqr_distance(&self, point: Vec2) -> f32 {
        let dx = ((point.x - self.centre.x).abs() - self.half_size).max(0.0);
        let dy = ((point.y - self.centre.y).abs() - self.half_size).max(0.0);
        dx * dx + dy * dy
    }
}

/// Всё, что нужно чанку для отправки задач
pub(crate) struct ChunkContext<'a> {
    pub config: &'a TerrainConfig,
    pub work: &'a WorkQueue<ChunkEvent>,
    pub falloff: &'a Arc<FalloffCache>,
    pub generation: u64,
}

/// Слот меша одной полосы LOD
#[derive(Debug)]
pub struct LodMesh {
    lod: u32,
    requested: bool,
    mesh: Option<Arc<MeshData>>,
}

impl LodMesh {
    fn new(lod: u32) -> Self {
        Self { lod, requested: false, mesh: None }
    }

    pub fn lod(&self) -> u32 {
        self.lod
    }

    pub fn has_requested_mesh(&self) -> bool {
        self.requested
    }

    pub fn has_mesh(&self) -> bool {
        self.mesh.is_some()
    }

    pub fn mesh(&self) -> Option<&Arc<MeshData>> {
        self.mesh.as_ref()
    }

    fn request_mesh(
        &mut self,
        coord: ChunkCoord,
        lod_index: usize,
        height_field: &Arc<HeightField>,
        ctx: &ChunkContext,
    ) {
        self.requested = true;

        let height_field = height_field.clone();
        let lod = self.lod;
        let flat_shading = ctx.config.mesh.use_flat_shading;
        let generation = ctx.generation;

        ctx.work.submit(move || ChunkEvent::MeshReady {
            coord,
            generation,
            lod_index,
            // Высоты уже преобразованы кривой при генерации карты
            mesh: generate_terrain_mesh(&height_field, &HeightRemap::passthrough(), lod, flat_shading),
        });
    }
}

/// Тайл бесконечного террейна
#[derive(Debug)]
pub struct TerrainChunk {
    coord: ChunkCoord,
    sample_centre: Vec2,
    bounds: ChunkBounds,
    height_requested: bool,
    height_field: Option<Arc<HeightField>>,
    lod_meshes: Vec<LodMesh>,
    collider_lod_index: usize,
    current_lod: Option<usize>,
    has_collider: bool,
    visible: bool,
    max_view_distance: f32,
}

impl TerrainChunk {
    pub fn new(coord: ChunkCoord, config: &TerrainConfig) -> Self {
        let mesh_world_size = config.mesh.mesh_world_size();

        Self {
            coord,
            sample_centre: coord.sample_centre(config.mesh.tile_cells()),
            bounds: ChunkBounds::new(coord.world_position(mesh_world_size), mesh_world_size),
            height_requested: false,
            height_field: None,
            lod_meshes: config.detail_levels.iter().map(|level| LodMesh::new(level.lod)).collect(),
            collider_lod_index: config.collider_lod_index,
            current_lod: None,
            has_collider: false,
            visible: false,
            max_view_distance: config.max_view_distance(),
        }
    }

    /// Запросить карту высот (один раз)
    pub(crate) fn load(&mut self, ctx: &ChunkContext) {
        if self.height_requested {
            return;
        }
        self.height_requested = true;

        let coord = self.coord;
        let generation = ctx.generation;
        let size = ctx.config.mesh.num_vertices_per_line();
        let settings = ctx.config.height_map.clone();
        let sample_centre = self.sample_centre;
        let falloff = ctx.falloff.clone();

        ctx.work.submit(move || ChunkEvent::HeightMapReady {
            coord,
            generation,
            height_field: Arc::new(generate_height_map(size, size, &settings, sample_centre, &falloff)),
        });
    }

    pub(crate) fn on_height_map_received(&mut self, height_field: Arc<HeightField>) {
        self.height_field = Some(height_field);
    }

    pub(crate) fn on_mesh_received(&mut self, lod_index: usize, mesh: Arc<MeshData>) {
        match self.lod_meshes.get_mut(lod_index) {
            Some(slot) => slot.mesh = Some(mesh),
            None => log::warn!("Chunk {:?}: mesh for unknown LOD index {}", self.coord, lod_index),
        }
    }

    /// Пересчитать видимость и LOD.
    /// Возвращает новую видимость, если она изменилась.
    pub(crate) fn update(&mut self, viewer: Vec2, ctx: &ChunkContext, sink: &mut dyn ChunkSink) -> Option<bool> {
        let height_field = self.height_field.as_ref()?;

        let distance = self.bounds.sqr_distance(viewer).sqrt();
        let visible = distance <= self.max_view_distance;

        if visible {
            let lod_index = select_lod_index(&ctx.config.detail_levels, distance);
            if self.current_lod != Some(lod_index) {
                let slot = &mut self.lod_meshes[lod_index];
                if let Some(mesh) = &slot.mesh {
                    self.current_lod = Some(lod_index);
                    sink.show_mesh(self.coord, mesh);
                } else if !slot.requested {
                    slot.request_mesh(self.coord, lod_index, height_field, ctx);
                }
            }
        }

        if visible != self.visible {
            self.visible = visible;
            sink.set_visible(self.coord, visible);
            return Some(visible);
        }
        None
    }

    /// Коллайдер: заранее запросить меш, отдать физике вблизи. Только один раз.
    pub(crate) fn update_collision_mesh(&mut self, viewer: Vec2, ctx: &ChunkContext, sink: &mut dyn ChunkSink) {
        if self.has_collider {
            return;
        }
        let Some(height_field) = self.height_field.as_ref() else {
            return;
        };

        let sqr_distance = self.bounds.sqr_distance(viewer);
        let threshold = ctx.config.collider_level().sqr_visible_distance_threshold();
        let slot = &mut self.lod_meshes[self.collider_lod_index];

        if sqr_distance < threshold && !slot.requested {
            slot.request_mesh(self.coord, self.collider_lod_index, height_field, ctx);
        }

        if sqr_distance < COLLIDER_GENERATION_DISTANCE * COLLIDER_GENERATION_DISTANCE {
            if let Some(mesh) = &slot.mesh {
                sink.assign_collider(self.coord, mesh);
                self.has_collider = true;
            }
        }
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    pub fn sample_centre(&self) -> Vec2 {
        self.sample_centre
    }

    pub fn bounds(&self) -> ChunkBounds {
        self.bounds
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn has_height_map(&self) -> bool {
        self.height_field.is_some()
    }

    pub fn height_field(&self) -> Option<&Arc<HeightField>> {
        self.height_field.as_ref()
    }

    pub fn current_lod_index(&self) -> Option<usize> {
        self.current_lod
    }

    pub fn current_mesh(&self) -> Option<&Arc<MeshData>> {
        self.current_lod.and_then(|i| self.lod_meshes[i].mesh())
    }

    pub fn has_collider(&self) -> bool {
        self.has_collider
    }

    pub fn collider_lod_index(&self) -> usize {
        self.collider_lod_index
    }

    pub fn lod_mesh(&self, lod_index: usize) -> Option<&LodMesh> {
        self.lod_meshes.get(lod_index)
    }
}
