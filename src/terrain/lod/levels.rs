// ============================================
// LOD Levels - Уровни детализации
// ============================================

use serde::{Deserialize, Serialize};

/// Поддерживаемые LOD: 0..=4 (шаги 1, 2, 4, 6, 8)
pub const NUM_SUPPORTED_LODS: u32 = 5;

/// Полоса детализации: до какой дистанции используется lod
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetailLevel {
    pub lod: u32,
    pub visible_distance_threshold: f32,
}

impl DetailLevel {
    pub const fn new(lod: u32, visible_distance_threshold: f32) -> Self {
        Self { lod, visible_distance_threshold }
    }

    pub fn sqr_visible_distance_threshold(&self) -> f32 {
        self.visible_distance_threshold * self.visible_distance_threshold
    }

    pub const DEFAULT_LEVELS: [DetailLevel; 3] = [
        DetailLevel::new(0, 200.0),
        DetailLevel::new(1, 400.0),
        DetailLevel::new(3, 700.0),
    ];
}

/// Шаг прореживания сетки для lod
#[inline]
pub fn lod_increment(lod: u32) -> usize {
    if lod == 0 { 1 } else { lod as usize * 2 }
}

/// Индекс полосы для дистанции: число первых полос (кроме последней),
/// чей порог меньше дистанции
pub fn select_lod_index(levels: &[DetailLevel], distance: f32) -> usize {
    let last = levels.len().saturating_sub(1);
    levels[..last]
        .iter()
        .take_while(|level| distance > level.visible_distance_threshold)
        .count()
}

/// Дальность видимости = порог последней полосы
pub fn max_view_distance(levels: &[DetailLevel]) -> f32 {
    levels.last().map_or(0.0, |level| level.visible_distance_threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVELS: [DetailLevel; 3] = [
        DetailLevel::new(0, 300.0),
        DetailLevel::new(1, 600.0),
        DetailLevel::new(2, 1200.0),
    ];

    #[test]
    fn test_select_lod_index() {
        assert_eq!(select_lod_index(&LEVELS, 0.0), 0);
        assert_eq!(select_lod_index(&LEVELS, 300.0), 0);
        assert_eq!(select_lod_index(&LEVELS, 450.0), 1);
        assert_eq!(select_lod_index(&LEVELS, 900.0), 2);
        // За пределами видимости - последняя полоса
        assert_eq!(select_lod_index(&LEVELS, 5000.0), 2);
        assert_eq!(select_lod_index(&[], 10.0), 0);
    }

    #[test]
    fn test_increments() {
        let strides: Vec<usize> = (0..NUM_SUPPORTED_LODS).map(lod_increment).collect();
        assert_eq!(strides, vec![1, 2, 4, 6, 8]);
    }

    #[test]
    fn test_max_view_distance() {
        assert_eq!(max_view_distance(&LEVELS), 1200.0);
        assert_eq!(LEVELS[1].sqr_visible_distance_threshold(), 360000.0);
    }
}
