// ============================================
// Cache Module - Ключи чанков
// ============================================

mod chunk_coord;

pub use chunk_coord::ChunkCoord;
