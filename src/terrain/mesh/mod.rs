// ============================================
// Mesh Module - Меши террейна
// ============================================

mod builder;
mod vertex;

pub use builder::{generate_terrain_mesh, MeshData, MeshError};
pub use vertex::TerrainVertex;
