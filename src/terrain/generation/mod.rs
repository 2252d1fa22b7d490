// ============================================
// Generation Module - Генерация карт высот
// ============================================

mod curve;
mod falloff;
mod height;
mod noise;

pub use curve::{CurveKey, HeightCurve, HeightRemap};
pub use falloff::{generate_falloff_map, FalloffCache};
pub use height::{generate_height_map, HeightField, HeightFieldError, HeightMapSettings};
pub use noise::{generate_noise_map, hash2d, noise2d, NoiseSettings, NormalizeMode, MIN_NOISE_SCALE};
