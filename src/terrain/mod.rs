// ============================================
// Terrain Module - Бесконечный террейн с LOD
// ============================================

pub mod cache;
pub mod generation;
pub mod lod;
pub mod manager;
pub mod mesh;

// Re-exports
pub use cache::ChunkCoord;
pub use generation::{generate_height_map, HeightCurve, HeightField, HeightFieldError, HeightMapSettings, NoiseSettings, NormalizeMode};
pub use lod::DetailLevel;
pub use manager::{ChunkSink, TerrainChunk, TerrainStreamer, TickStats};
pub use mesh::{generate_terrain_mesh, MeshData, MeshError, TerrainVertex};
