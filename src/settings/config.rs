// ============================================
// Terrain Config - Data-driven настройки террейна
// ============================================
// Загружается из JSON (assets/terrain/default_terrain.json)

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::terrain::generation::HeightMapSettings;
use crate::terrain::lod::{lod_increment, max_view_distance, DetailLevel, NUM_SUPPORTED_LODS};

/// Поддерживаемые размеры чанка (делятся на все шаги LOD)
pub const SUPPORTED_CHUNK_SIZES: [usize; 10] = [24, 48, 72, 96, 120, 144, 168, 192, 216, 240];
/// Для плоского затенения только первые размеры (вершин в 6 раз больше)
pub const NUM_SUPPORTED_FLAT_SHADED_CHUNK_SIZES: usize = 4;

pub const MIN_MESH_SCALE: f32 = 0.01;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read terrain config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse terrain config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Detail level table is empty")]
    EmptyDetailLevels,
    #[error("Detail level {index} has invalid distance threshold {threshold}")]
    InvalidThreshold { index: usize, threshold: f32 },
    #[error("Collider LOD index {index} is out of range for {count} detail levels")]
    ColliderLodOutOfRange { index: usize, count: usize },
    #[error("Chunk with {vertices_per_line} vertices per line cannot use LOD {lod} (stride {stride})")]
    UnsupportedStride { lod: u32, stride: usize, vertices_per_line: usize },
}

/// Настройки сетки чанка
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshSettings {
    pub chunk_size_index: usize,
    pub flat_shaded_chunk_size_index: usize,
    /// Метров на клетку карты высот
    pub mesh_scale: f32,
    pub use_flat_shading: bool,
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self {
            chunk_size_index: 4,
            flat_shaded_chunk_size_index: 0,
            mesh_scale: 2.5,
            use_flat_shading: false,
        }
    }
}

impl MeshSettings {
    pub fn chunk_size(&self) -> usize {
        if self.use_flat_shading {
            SUPPORTED_CHUNK_SIZES[self.flat_shaded_chunk_size_index.min(NUM_SUPPORTED_FLAT_SHADED_CHUNK_SIZES - 1)]
        } else {
            SUPPORTED_CHUNK_SIZES[self.chunk_size_index.min(SUPPORTED_CHUNK_SIZES.len() - 1)]
        }
    }

    /// Вершин на сторону карты высот, включая бордюр
    pub fn num_vertices_per_line(&self) -> usize {
        self.chunk_size() + 1
    }

    /// Клеток между центрами соседних чанков
    pub fn tile_cells(&self) -> usize {
        self.num_vertices_per_line() - 3
    }

    pub fn mesh_world_size(&self) -> f32 {
        self.tile_cells() as f32 * self.mesh_scale
    }

    fn normalize(&mut self) {
        if self.chunk_size_index >= SUPPORTED_CHUNK_SIZES.len() {
            log::warn!("Chunk size index {} clamped", self.chunk_size_index);
            self.chunk_size_index = SUPPORTED_CHUNK_SIZES.len() - 1;
        }
        if self.flat_shaded_chunk_size_index >= NUM_SUPPORTED_FLAT_SHADED_CHUNK_SIZES {
            log::warn!("Flat shaded chunk size index {} clamped", self.flat_shaded_chunk_size_index);
            self.flat_shaded_chunk_size_index = NUM_SUPPORTED_FLAT_SHADED_CHUNK_SIZES - 1;
        }
        if !(self.mesh_scale >= MIN_MESH_SCALE) {
            log::warn!("Mesh scale {} clamped to {}", self.mesh_scale, MIN_MESH_SCALE);
            self.mesh_scale = MIN_MESH_SCALE;
        }
    }
}

/// Полная конфигурация бесконечного террейна
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub height_map: HeightMapSettings,
    pub mesh: MeshSettings,
    pub detail_levels: Vec<DetailLevel>,
    /// Индекс полосы, чей меш идёт на коллайдер
    pub collider_lod_index: usize,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            height_map: HeightMapSettings::default(),
            mesh: MeshSettings::default(),
            detail_levels: DetailLevel::DEFAULT_LEVELS.to_vec(),
            collider_lod_index: 0,
        }
    }
}

impl TerrainConfig {
    /// Встроенная конфигурация из assets
    pub fn built_in() -> Self {
        match Self::load_from_json(include_str!("../../assets/terrain/default_terrain.json")) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load default terrain config: {}", e);
                Self::default()
            }
        }
    }

    /// Загрузить и проверить конфигурацию из JSON строки
    pub fn load_from_json(json: &str) -> Result<Self, ConfigError> {
        let config: TerrainConfig = serde_json::from_str(json)?;
        config.validate()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::load_from_json(&content)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Нормализовать числовые параметры, отказать на сломанной структуре
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        self.height_map.noise.normalize();
        self.mesh.normalize();

        if self.detail_levels.is_empty() {
            return Err(ConfigError::EmptyDetailLevels);
        }

        for (index, level) in self.detail_levels.iter_mut().enumerate() {
            let threshold = level.visible_distance_threshold;
            if !threshold.is_finite() || threshold < 0.0 {
                return Err(ConfigError::InvalidThreshold { index, threshold });
            }
            if level.lod >= NUM_SUPPORTED_LODS {
                log::warn!("Detail level {} lod {} clamped to {}", index, level.lod, NUM_SUPPORTED_LODS - 1);
                level.lod = NUM_SUPPORTED_LODS - 1;
            }
        }

        let sorted = self.detail_levels.windows(2)
            .all(|w| w[0].visible_distance_threshold <= w[1].visible_distance_threshold);
        if !sorted {
            log::warn!("Detail levels are not sorted by distance, sorting");
            self.detail_levels.sort_by(|a, b| a.visible_distance_threshold.total_cmp(&b.visible_distance_threshold));
        }

        if self.collider_lod_index >= self.detail_levels.len() {
            return Err(ConfigError::ColliderLodOutOfRange {
                index: self.collider_lod_index,
                count: self.detail_levels.len(),
            });
        }

        let vertices_per_line = self.mesh.num_vertices_per_line();
        for level in &self.detail_levels {
            let stride = lod_increment(level.lod);
            if (vertices_per_line - 1) % stride != 0 || vertices_per_line - 1 < 3 * stride {
                return Err(ConfigError::UnsupportedStride { lod: level.lod, stride, vertices_per_line });
            }
        }

        Ok(self)
    }

    pub fn max_view_distance(&self) -> f32 {
        max_view_distance(&self.detail_levels)
    }

    /// Радиус квадрата видимых чанков
    pub fn chunks_visible_in_view_distance(&self) -> i32 {
        (self.max_view_distance() / self.mesh.mesh_world_size()).round() as i32
    }

    pub fn collider_level(&self) -> &DetailLevel {
        &self.detail_levels[self.collider_lod_index]
    }
}
