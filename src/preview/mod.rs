// ============================================
// Preview Module - Превью тайла (шум, цвет, меш, затухание)
// ============================================

mod display;
mod texture;

pub use display::{DrawMode, MapDisplay, MapPreview};
pub use texture::{TerrainType, TextureData};
