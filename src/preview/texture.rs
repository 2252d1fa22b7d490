// ============================================
// Texture Data - Пиксели для превью карт
// ============================================

use serde::{Deserialize, Serialize};

use crate::terrain::generation::HeightField;

/// Регион высоты для раскраски: до height включительно - colour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainType {
    pub name: String,
    pub height: f32,
    pub colour: [u8; 4],
}

impl TerrainType {
    pub fn new(name: &str, height: f32, colour: [u8; 4]) -> Self {
        Self { name: name.to_string(), height, colour }
    }

    /// Набор по умолчанию: вода, песок, трава, скалы, снег
    pub fn default_regions() -> Vec<TerrainType> {
        vec![
            TerrainType::new("deep_water", 0.3, [40, 70, 170, 255]),
            TerrainType::new("water", 0.4, [55, 100, 200, 255]),
            TerrainType::new("sand", 0.45, [210, 205, 125, 255]),
            TerrainType::new("grass", 0.55, [85, 150, 25, 255]),
            TerrainType::new("forest", 0.6, [60, 105, 20, 255]),
            TerrainType::new("rock", 0.7, [90, 70, 65, 255]),
            TerrainType::new("rock_high", 0.9, [75, 60, 55, 255]),
            TerrainType::new("snow", 1.0, [245, 245, 245, 255]),
        ]
    }
}

/// RGBA текстура, строка за строкой (index = y * width + x)
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<[u8; 4]>,
}

impl TextureData {
    /// Градации серого: min -> чёрный, max -> белый
    pub fn from_height_field(field: &HeightField) -> Self {
        let pixels = field.values()
            .iter()
            .map(|v| {
                let t = inverse_lerp(field.min_value(), field.max_value(), *v);
                let c = (t * 255.0).round() as u8;
                [c, c, c, 255]
            })
            .collect();

        Self { width: field.width(), height: field.height(), pixels }
    }

    /// Раскраска по регионам; высота нормализуется в 0..1 по диапазону карты
    pub fn from_colour_map(field: &HeightField, regions: &[TerrainType]) -> Self {
        let pixels = field.values()
            .iter()
            .map(|v| {
                let t = inverse_lerp(field.min_value(), field.max_value(), *v);
                regions.iter()
                    .find(|region| t <= region.height)
                    .map_or([0, 0, 0, 255], |region| region.colour)
            })
            .collect();

        Self { width: field.width(), height: field.height(), pixels }
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        self.pixels[y * self.width + x]
    }

    /// Плоский RGBA буфер для загрузки в текстуру
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

#[inline]
fn inverse_lerp(a: f32, b: f32, v: f32) -> f32 {
    if b > a { ((v - a) / (b - a)).clamp(0.0, 1.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_texture_gradient() {
        let field = HeightField::from_values(3, 1, vec![2.0, 3.0, 4.0]).unwrap();
        let texture = TextureData::from_height_field(&field);
        assert_eq!(texture.pixel(0, 0), [0, 0, 0, 255]);
        assert_eq!(texture.pixel(1, 0), [128, 128, 128, 255]);
        assert_eq!(texture.pixel(2, 0), [255, 255, 255, 255]);
        assert_eq!(texture.as_bytes().len(), 12);
    }

    #[test]
    fn test_flat_field_is_black() {
        let field = HeightField::from_values(2, 2, vec![5.0; 4]).unwrap();
        let texture = TextureData::from_height_field(&field);
        assert!(texture.pixels.iter().all(|p| *p == [0, 0, 0, 255]));
    }

    #[test]
    fn test_colour_regions() {
        let regions = vec![
            TerrainType::new("water", 0.4, [0, 0, 255, 255]),
            TerrainType::new("land", 1.0, [0, 255, 0, 255]),
        ];
        let field = HeightField::from_values(3, 1, vec![0.0, 0.4, 1.0]).unwrap();
        let texture = TextureData::from_colour_map(&field, &regions);
        assert_eq!(texture.pixel(0, 0), [0, 0, 255, 255]);
        assert_eq!(texture.pixel(1, 0), [0, 0, 255, 255]);
        assert_eq!(texture.pixel(2, 0), [0, 255, 0, 255]);
    }
}
