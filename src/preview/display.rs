// ============================================
// Map Preview - Превью одного тайла для редактора
// ============================================

use serde::{Deserialize, Serialize};
use ultraviolet::Vec2;

use crate::settings::{SettingsStore, TerrainConfig};
use crate::terrain::generation::{
    generate_falloff_map, generate_height_map, generate_noise_map, FalloffCache, HeightField, HeightRemap,
};
use crate::terrain::mesh::{generate_terrain_mesh, MeshData, MeshError};

use super::texture::{TerrainType, TextureData};

/// Куда рисует превью
pub trait MapDisplay {
    fn draw_texture(&mut self, texture: &TextureData);

    fn draw_mesh(&mut self, mesh: &MeshData, texture: Option<&TextureData>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DrawMode {
    /// Карта высот в оттенках серого
    #[default]
    Noise,
    /// Раскраска сырого шума по регионам
    Colour,
    /// Меш тайла по карте высот
    Mesh,
    /// Меш из сырого шума (кривая в мешере) + раскраска
    ColourMesh,
    Falloff,
}

pub struct MapPreview {
    pub draw_mode: DrawMode,
    pub editor_lod: u32,
    pub regions: Vec<TerrainType>,
    seen_version: Option<u64>,
    falloff: FalloffCache,
}

impl Default for MapPreview {
    fn default() -> Self {
        Self::new(DrawMode::default())
    }
}

impl MapPreview {
    pub fn new(draw_mode: DrawMode) -> Self {
        Self {
            draw_mode,
            editor_lod: 0,
            regions: TerrainType::default_regions(),
            seen_version: None,
            falloff: FalloffCache::new(),
        }
    }

    /// Нарисовать центральный тайл в текущем режиме
    pub fn draw_map(&self, config: &TerrainConfig, display: &mut dyn MapDisplay) -> Result<(), MeshError> {
        let size = config.mesh.num_vertices_per_line();

        match self.draw_mode {
            DrawMode::Noise => {
                let field = generate_height_map(size, size, &config.height_map, Vec2::zero(), &self.falloff);
                display.draw_texture(&TextureData::from_height_field(&field));
            }
            DrawMode::Colour => {
                let noise = self.raw_noise(config, size);
                display.draw_texture(&TextureData::from_colour_map(&noise, &self.regions));
            }
            DrawMode::Mesh => {
                let field = generate_height_map(size, size, &config.height_map, Vec2::zero(), &self.falloff);
                let mesh = generate_terrain_mesh(
                    &field,
                    &HeightRemap::passthrough(),
                    self.editor_lod,
                    config.mesh.use_flat_shading,
                )?;
                display.draw_mesh(&mesh, None);
            }
            DrawMode::ColourMesh => {
                let noise = self.raw_noise(config, size);
                let mesh = generate_terrain_mesh(
                    &noise,
                    &config.height_map.remap(),
                    self.editor_lod,
                    config.mesh.use_flat_shading,
                )?;
                let texture = TextureData::from_colour_map(&noise, &self.regions);
                display.draw_mesh(&mesh, Some(&texture));
            }
            DrawMode::Falloff => {
                let falloff = HeightField::from_generated(size, size, generate_falloff_map(size));
                display.draw_texture(&TextureData::from_height_field(&falloff));
            }
        }

        Ok(())
    }

    /// Перерисовать, если настройки поменялись. true - было перерисовано.
    pub fn poll(&mut self, settings: &SettingsStore, display: &mut dyn MapDisplay) -> Result<bool, MeshError> {
        let (version, config) = settings.snapshot();
        if self.seen_version == Some(version) {
            return Ok(false);
        }

        self.draw_map(&config, display)?;
        self.seen_version = Some(version);
        Ok(true)
    }

    fn raw_noise(&self, config: &TerrainConfig, size: usize) -> HeightField {
        let values = generate_noise_map(size, size, &config.height_map.noise, Vec2::zero());
        HeightField::from_generated(size, size, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MeshSettings;
    use crate::terrain::generation::HeightCurve;

    #[derive(Default)]
    struct TestDisplay {
        textures: Vec<TextureData>,
        meshes: Vec<(MeshData, bool)>,
    }

    impl MapDisplay for TestDisplay {
        fn draw_texture(&mut self, texture: &TextureData) {
            self.textures.push(texture.clone());
        }

        fn draw_mesh(&mut self, mesh: &MeshData, texture: Option<&TextureData>) {
            self.meshes.push((mesh.clone(), texture.is_some()));
        }
    }

    fn small_config() -> TerrainConfig {
        TerrainConfig {
            mesh: MeshSettings { chunk_size_index: 0, mesh_scale: 1.0, ..MeshSettings::default() },
            ..TerrainConfig::default()
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn test_texture_modes() {
        let config = small_config();
        let mut display = TestDisplay::default();

        for mode in [DrawMode::Noise, DrawMode::Colour, DrawMode::Falloff] {
            MapPreview::new(mode).draw_map(&config, &mut display).unwrap();
        }
        assert_eq!(display.textures.len(), 3);
        assert!(display.textures.iter().all(|t| t.width == 25 && t.height == 25));
        assert!(display.meshes.is_empty());
    }

    #[test]
    fn test_mesh_modes() {
        let config = small_config();
        let mut display = TestDisplay::default();

        let mut preview = MapPreview::new(DrawMode::Mesh);
        preview.editor_lod = 2;
        preview.draw_map(&config, &mut display).unwrap();
        preview.draw_mode = DrawMode::ColourMesh;
        preview.draw_map(&config, &mut display).unwrap();

        assert_eq!(display.meshes.len(), 2);
        let (mesh, textured) = &display.meshes[0];
        assert_eq!(mesh.lod, 2);
        assert_eq!(mesh.vertex_count(), 5 * 5);
        assert!(!textured);
        assert!(display.meshes[1].1);
    }

    #[test]
    fn test_colour_mesh_uses_curve() {
        let mut config = small_config();
        config.height_map.height_curve = HeightCurve::constant(0.5);
        config.height_map.height_multiplier = 8.0;
        let mut display = TestDisplay::default();

        MapPreview::new(DrawMode::ColourMesh).draw_map(&config, &mut display).unwrap();
        let (mesh, _) = &display.meshes[0];
        assert!(mesh.vertices.iter().all(|v| (v.position[1] - 4.0).abs() < 1e-5));
    }

    #[test]
    fn test_poll_redraws_on_version_change() {
        let store = SettingsStore::new(small_config()).unwrap();
        let mut preview = MapPreview::default();
        let mut display = TestDisplay::default();

        assert!(preview.poll(&store, &mut display).unwrap());
        assert!(!preview.poll(&store, &mut display).unwrap());

        store.modify(|c| c.height_map.noise.seed = 5).unwrap();
        assert!(preview.poll(&store, &mut display).unwrap());
        assert_eq!(display.textures.len(), 2);
    }

    #[test]
    fn test_invalid_lod_reports_error() {
        let config = small_config();
        let mut display = TestDisplay::default();
        let mut preview = MapPreview::new(DrawMode::Mesh);
        preview.editor_lod = 7;
        assert!(preview.draw_map(&config, &mut display).is_err());
    }
}
