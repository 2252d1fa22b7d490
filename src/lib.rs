// ============================================
// Endless Terrain - Бесконечный процедурный террейн с LOD
// ============================================
//
// Шум -> карта высот -> меш с бордюром для нормалей -> стриминг чанков
// вокруг игрока с фоновой генерацией.

pub mod preview;
pub mod settings;
pub mod tasks;
pub mod terrain;

pub use settings::{ConfigError, SettingsStore, TerrainConfig};
pub use tasks::{InlineTaskRunner, RayonTaskRunner, TaskRunner};
pub use terrain::{ChunkCoord, ChunkSink, MeshData, TerrainStreamer};
