// ============================================
// Height Map - Карта высот чанка
// ============================================

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ultraviolet::Vec2;

use super::curve::{HeightCurve, HeightRemap};
use super::falloff::FalloffCache;
use super::noise::{generate_noise_map, NoiseSettings};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HeightFieldError {
    #[error("Height field {width}x{height} needs {expected} values, got {actual}")]
    SizeMismatch { width: usize, height: usize, expected: usize, actual: usize },
}

/// Готовая карта высот (row-major, index = y * width + x)
#[derive(Debug, Clone, PartialEq)]
pub struct HeightField {
    width: usize,
    height: usize,
    values: Vec<f32>,
    min_value: f32,
    max_value: f32,
}

impl HeightField {
    /// Создать из готовых значений; диапазон считается здесь
    pub fn from_values(width: usize, height: usize, values: Vec<f32>) -> Result<Self, HeightFieldError> {
        let expected = width * height;
        if values.len() != expected {
            return Err(HeightFieldError::SizeMismatch { width, height, expected, actual: values.len() });
        }
        Ok(Self::from_generated(width, height, values))
    }

    /// Для генераторов крейта: размер values уже равен width * height
    pub(crate) fn from_generated(width: usize, height: usize, values: Vec<f32>) -> Self {
        debug_assert_eq!(values.len(), width * height);

        let (min_value, max_value) = if values.is_empty() {
            (0.0, 0.0)
        } else {
            values.iter().fold((f32::MAX, f32::MIN), |(lo, hi), v| (lo.min(*v), hi.max(*v)))
        };

        Self { width, height, values, min_value, max_value }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.values[y * self.width + x]
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn min_value(&self) -> f32 {
        self.min_value
    }

    pub fn max_value(&self) -> f32 {
        self.max_value
    }

    /// Память под значения (байты)
    pub fn memory_usage(&self) -> usize {
        self.values.len() * std::mem::size_of::<f32>()
    }
}

/// Настройки карты высот
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightMapSettings {
    pub noise: NoiseSettings,
    /// Режим острова: затухание к краям центрального тайла
    pub use_falloff: bool,
    pub height_multiplier: f32,
    pub height_curve: HeightCurve,
}

impl Default for HeightMapSettings {
    fn default() -> Self {
        Self {
            noise: NoiseSettings::default(),
            use_falloff: false,
            height_multiplier: 30.0,
            height_curve: HeightCurve::linear(),
        }
    }
}

impl HeightMapSettings {
    pub fn min_height(&self) -> f32 {
        self.height_multiplier * self.height_curve.evaluate(0.0)
    }

    pub fn max_height(&self) -> f32 {
        self.height_multiplier * self.height_curve.evaluate(1.0)
    }

    pub fn remap(&self) -> HeightRemap {
        HeightRemap::new(self.height_multiplier, self.height_curve.clone())
    }
}

/// Сгенерировать карту высот для чанка с центром sample_centre
pub fn generate_height_map(
    width: usize,
    height: usize,
    settings: &HeightMapSettings,
    sample_centre: Vec2,
    falloff_cache: &FalloffCache,
) -> HeightField {
    let mut values = generate_noise_map(width, height, &settings.noise, sample_centre);

    if settings.use_falloff {
        let falloff = falloff_cache.get(width);
        let half = (width / 2) as f32;
        let outside_island = sample_centre.x.abs() > half || sample_centre.y.abs() > half;

        for y in 0..height {
            for x in 0..width {
                let value = &mut values[y * width + x];
                *value = if outside_island {
                    0.0
                } else {
                    // Карта затухания квадратная, берём по меньшей стороне
                    let f = falloff[y.min(width - 1) * width + x];
                    (*value - f).clamp(0.0, 2.0)
                };
            }
        }
    }

    let remap = settings.remap();
    for value in values.iter_mut() {
        *value = remap.evaluate(*value);
    }

    HeightField::from_generated(width, height, values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> HeightMapSettings {
        HeightMapSettings {
            noise: NoiseSettings { scale: 15.0, octaves: 3, seed: 11, ..NoiseSettings::default() },
            use_falloff: false,
            height_multiplier: 10.0,
            height_curve: HeightCurve::linear(),
        }
    }

    #[test]
    fn test_range_tracked() {
        let field = generate_height_map(25, 25, &settings(), Vec2::zero(), &FalloffCache::new());
        let min = field.values().iter().cloned().fold(f32::MAX, f32::min);
        let max = field.values().iter().cloned().fold(f32::MIN, f32::max);
        assert_eq!(field.min_value(), min);
        assert_eq!(field.max_value(), max);
        assert_eq!(field.memory_usage(), 25 * 25 * 4);
    }

    #[test]
    fn test_multiplier_applied() {
        let base = generate_height_map(16, 16, &settings(), Vec2::zero(), &FalloffCache::new());
        let doubled = HeightMapSettings { height_multiplier: 20.0, ..settings() };
        let field = generate_height_map(16, 16, &doubled, Vec2::zero(), &FalloffCache::new());
        for (a, b) in base.values().iter().zip(field.values()) {
            assert!((a * 2.0 - b).abs() < 1e-3);
        }
    }

    #[test]
    fn test_flat_curve_gives_flat_field() {
        let flat = HeightMapSettings { height_curve: HeightCurve::constant(0.5), ..settings() };
        let field = generate_height_map(16, 16, &flat, Vec2::zero(), &FalloffCache::new());
        assert!(field.values().iter().all(|v| (*v - 5.0).abs() < 1e-6));
        assert_eq!(field.min_value(), field.max_value());
    }

    #[test]
    fn test_falloff_island() {
        let island = HeightMapSettings { use_falloff: true, ..settings() };
        let cache = FalloffCache::new();

        let base = generate_height_map(25, 25, &settings(), Vec2::zero(), &cache);
        let centre = generate_height_map(25, 25, &island, Vec2::zero(), &cache);
        // Затухание только опускает рельеф
        for (b, c) in base.values().iter().zip(centre.values()) {
            assert!(*c >= 0.0 && *c <= *b + 1e-5);
        }

        let far = generate_height_map(25, 25, &island, Vec2::new(22.0, 0.0), &cache);
        assert!(far.values().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_from_values_checks_size() {
        assert_eq!(
            HeightField::from_values(3, 2, vec![0.0; 5]),
            Err(HeightFieldError::SizeMismatch { width: 3, height: 2, expected: 6, actual: 5 })
        );
        let field = HeightField::from_values(3, 2, vec![1.0, -2.0, 0.5, 4.0, 0.0, 0.0]).unwrap();
        assert_eq!(field.get(0, 1), 4.0);
        assert_eq!(field.min_value(), -2.0);
        assert_eq!(field.max_value(), 4.0);
    }

    #[test]
    fn test_min_max_height() {
        let s = HeightMapSettings {
            height_curve: HeightCurve::piecewise_linear(&[(0.0, 0.1), (1.0, 0.9)]),
            ..settings()
        };
        assert!((s.min_height() - 1.0).abs() < 1e-5);
        assert!((s.max_height() - 9.0).abs() < 1e-5);
    }
}
