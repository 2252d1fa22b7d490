// ============================================
// Falloff Map - Радиальное затухание к краям (острова)
// ============================================

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

const FALLOFF_STEEPNESS: f32 = 3.0;
const FALLOFF_SHIFT: f32 = 2.2;

/// Карта затухания size x size, значения 0.0..1.0 (0 в центре, 1 у краёв)
pub fn generate_falloff_map(size: usize) -> Vec<f32> {
    let mut map = vec![0.0f32; size * size];

    for j in 0..size {
        for i in 0..size {
            let u = i as f32 / size as f32 * 2.0 - 1.0;
            let v = j as f32 / size as f32 * 2.0 - 1.0;
            let t = u.abs().max(v.abs());
            map[j * size + i] = evaluate(t);
        }
    }

    map
}

#[inline]
fn evaluate(t: f32) -> f32 {
    let a = FALLOFF_STEEPNESS;
    let b = FALLOFF_SHIFT;
    let num = t.powf(a);
    num / (num + (b - b * t).powf(a))
}

/// Кэш карт затухания по размеру, общий для всех воркеров
#[derive(Default)]
pub struct FalloffCache {
    maps: Mutex<HashMap<usize, Arc<Vec<f32>>>>,
}

impl FalloffCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, size: usize) -> Arc<Vec<f32>> {
        let mut maps = self.maps.lock();
        maps.entry(size)
            .or_insert_with(|| {
                log::debug!("Falloff map {}x{} generated", size, size);
                Arc::new(generate_falloff_map(size))
            })
            .clone()
    }

    pub fn len(&self) -> usize {
        self.maps.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.lock().is_empty()
    }
}
