// ============================================
// LOD Module - Полосы детализации
// ============================================

mod levels;

pub use levels::{lod_increment, max_view_distance, select_lod_index, DetailLevel, NUM_SUPPORTED_LODS};
