// ============================================
// Noise Functions - Фрактальный шум для карты высот
// ============================================

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use ultraviolet::Vec2;

pub const MIN_NOISE_SCALE: f32 = 0.01;

/// Диапазон случайных смещений октав
const OCTAVE_OFFSET_RANGE: i32 = 100_000;

/// Hash2D возвращает значение в диапазоне 0.0..1.0
#[inline(always)]
pub fn hash2d(x: i32, y: i32) -> f32 {
    let n = x.wrapping_mul(374761393).wrapping_add(y.wrapping_mul(668265263));
    let n = (n ^ (n >> 13)).wrapping_mul(1274126177);
    ((n as u32) as f32) / (u32::MAX as f32)
}

#[inline(always)]
fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// 2D Value Noise, результат 0.0..1.0.
/// Координаты в f64: соседние чанки дают одинаковые значения на общих клетках.
#[inline]
pub fn noise2d(x: f64, y: f64) -> f32 {
    let x_floor = x.floor();
    let y_floor = y.floor();
    let xi = x_floor as i32;
    let yi = y_floor as i32;
    let xf = smoothstep((x - x_floor) as f32);
    let yf = smoothstep((y - y_floor) as f32);

    let n00 = hash2d(xi, yi);
    let n10 = hash2d(xi.wrapping_add(1), yi);
    let n01 = hash2d(xi, yi.wrapping_add(1));
    let n11 = hash2d(xi.wrapping_add(1), yi.wrapping_add(1));

    let nx0 = n00 + xf * (n10 - n00);
    let nx1 = n01 + xf * (n11 - n01);

    nx0 + yf * (nx1 - nx0)
}

/// Режим нормализации шума
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NormalizeMode {
    /// По min/max конкретной карты (только для одиночного превью)
    Local,
    /// По теоретическому максимуму - бесшовно между чанками
    #[default]
    Global,
}

/// Параметры фрактального шума
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseSettings {
    pub normalize_mode: NormalizeMode,
    pub scale: f32,
    pub octaves: u32,
    pub persistence: f32,
    pub lacunarity: f32,
    pub seed: i32,
    pub offset: [f32; 2],
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            normalize_mode: NormalizeMode::Global,
            scale: 50.0,
            octaves: 6,
            persistence: 0.6,
            lacunarity: 2.0,
            seed: 0,
            offset: [0.0, 0.0],
        }
    }
}

impl NoiseSettings {
    /// Привести параметры к допустимым значениям.
    /// Возвращает true, если что-то пришлось исправить.
    pub fn normalize(&mut self) -> bool {
        let mut changed = false;

        if !(self.scale >= MIN_NOISE_SCALE) {
            log::warn!("Noise scale {} clamped to {}", self.scale, MIN_NOISE_SCALE);
            self.scale = MIN_NOISE_SCALE;
            changed = true;
        }
        if self.octaves < 1 {
            log::warn!("Noise octaves {} clamped to 1", self.octaves);
            self.octaves = 1;
            changed = true;
        }
        if !(self.lacunarity >= 1.0) {
            log::warn!("Noise lacunarity {} clamped to 1", self.lacunarity);
            self.lacunarity = 1.0;
            changed = true;
        }
        if !(0.0..=1.0).contains(&self.persistence) {
            let clamped = if self.persistence > 1.0 { 1.0 } else { 0.0 };
            log::warn!("Noise persistence {} clamped to {}", self.persistence, clamped);
            self.persistence = clamped;
            changed = true;
        }

        changed
    }

    /// Сумма амплитуд всех октав
    pub fn max_possible_height(&self) -> f32 {
        let mut amplitude = 1.0;
        let mut total = 0.0;
        for _ in 0..self.octaves {
            total += amplitude;
            amplitude *= self.persistence;
        }
        total
    }

    /// Смещения октав из сида: одинаковы для всех чанков
    fn octave_offsets(&self, sample_centre: Vec2) -> Vec<(f64, f64)> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed as u64);
        (0..self.octaves)
            .map(|_| {
                let rx = rng.gen_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE) as f64;
                let ry = rng.gen_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE) as f64;
                (
                    rx + self.offset[0] as f64 + sample_centre.x as f64,
                    ry - self.offset[1] as f64 - sample_centre.y as f64,
                )
            })
            .collect()
    }
}

/// Сгенерировать карту шума width x height (row-major, index = y * width + x)
pub fn generate_noise_map(
    width: usize,
    height: usize,
    settings: &NoiseSettings,
    sample_centre: Vec2,
) -> Vec<f32> {
    let mut settings = settings.clone();
    settings.normalize();

    let offsets = settings.octave_offsets(sample_centre);
    let scale = settings.scale as f64;
    let half_width = width as f64 / 2.0;
    let half_height = height as f64 / 2.0;

    let mut values = vec![0.0f32; width * height];
    let mut min_local = f32::MAX;
    let mut max_local = f32::MIN;

    for y in 0..height {
        for x in 0..width {
            let mut amplitude = 1.0f32;
            let mut frequency = 1.0f64;
            let mut value = 0.0f32;

            for &(ox, oy) in &offsets {
                let sample_x = (x as f64 - half_width + ox) / scale * frequency;
                let sample_y = (y as f64 - half_height + oy) / scale * frequency;
                let noise = noise2d(sample_x, sample_y) * 2.0 - 1.0;
                value += noise * amplitude;

                amplitude *= settings.persistence;
                frequency *= settings.lacunarity as f64;
            }

            min_local = min_local.min(value);
            max_local = max_local.max(value);
            values[y * width + x] = value;
        }
    }

    match settings.normalize_mode {
        NormalizeMode::Local => {
            let range = max_local - min_local;
            for value in values.iter_mut() {
                *value = if range > 0.0 { (*value - min_local) / range } else { 0.0 };
            }
        }
        NormalizeMode::Global => {
            let max_possible = settings.max_possible_height();
            for value in values.iter_mut() {
                *value = ((*value + 1.0) / max_possible).max(0.0);
            }
        }
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global_settings() -> NoiseSettings {
        NoiseSettings {
            normalize_mode: NormalizeMode::Global,
            scale: 20.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            seed: 7,
            offset: [3.0, -5.0],
        }
    }

    #[test]
    fn test_noise2d_range() {
        for i in 0..200 {
            let v = noise2d(i as f64 * 0.37 - 40.0, i as f64 * 0.71 + 12.5);
            assert!((0.0..=1.0).contains(&v), "value {} out of range", v);
        }
    }

    #[test]
    fn test_local_mode_range_and_determinism() {
        let settings = NoiseSettings {
            normalize_mode: NormalizeMode::Local,
            ..global_settings()
        };
        let a = generate_noise_map(32, 24, &settings, Vec2::zero());
        let b = generate_noise_map(32, 24, &settings, Vec2::zero());
        assert_eq!(a, b);

        let min = a.iter().cloned().fold(f32::MAX, f32::min);
        let max = a.iter().cloned().fold(f32::MIN, f32::max);
        assert!(min.abs() < 1e-6);
        assert!((max - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_seed_changes_field() {
        let a = generate_noise_map(16, 16, &global_settings(), Vec2::zero());
        let other = NoiseSettings { seed: 8, ..global_settings() };
        let b = generate_noise_map(16, 16, &other, Vec2::zero());
        assert_ne!(a, b);
    }

    #[test]
    fn test_global_mode_non_negative() {
        let values = generate_noise_map(20, 20, &global_settings(), Vec2::new(110.0, -66.0));
        assert!(values.iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn test_global_tiling_continuity() {
        let size = 25;
        let tile = (size - 3) as f32;
        let settings = global_settings();

        let a = generate_noise_map(size, size, &settings, Vec2::zero());
        let right = generate_noise_map(size, size, &settings, Vec2::new(tile, 0.0));
        let up = generate_noise_map(size, size, &settings, Vec2::new(0.0, tile));
        let w = size - 3;

        // Правый сосед: колонки W..W+2 у A = колонки 0..2 у соседа
        for y in 0..size {
            for k in 0..3 {
                assert_eq!(a[y * size + w + k], right[y * size + k]);
            }
        }

        // Сосед по +Y лежит в строках выше: строки 0..2 у A = строки W..W+2 у соседа
        for k in 0..3 {
            for x in 0..size {
                assert_eq!(a[k * size + x], up[(w + k) * size + x]);
            }
        }
    }

    #[test]
    fn test_normalize_clamps() {
        let mut settings = NoiseSettings {
            scale: 0.0,
            octaves: 0,
            persistence: 1.5,
            lacunarity: 0.5,
            ..NoiseSettings::default()
        };
        assert!(settings.normalize());
        assert_eq!(settings.scale, MIN_NOISE_SCALE);
        assert_eq!(settings.octaves, 1);
        assert_eq!(settings.persistence, 1.0);
        assert_eq!(settings.lacunarity, 1.0);
        assert!(!settings.normalize());
    }

    #[test]
    fn test_max_possible_height() {
        let settings = NoiseSettings { octaves: 3, persistence: 0.5, ..NoiseSettings::default() };
        assert!((settings.max_possible_height() - 1.75).abs() < 1e-6);
    }
}
