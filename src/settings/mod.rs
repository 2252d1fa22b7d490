// ============================================
// Settings Module - Конфигурация террейна
// ============================================

mod config;
mod store;

pub use config::{
    ConfigError, MeshSettings, TerrainConfig, MIN_MESH_SCALE, NUM_SUPPORTED_FLAT_SHADED_CHUNK_SIZES,
    SUPPORTED_CHUNK_SIZES,
};
pub use store::SettingsStore;
