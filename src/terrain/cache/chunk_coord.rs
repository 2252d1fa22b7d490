// ============================================
// Chunk Coord - Идентификатор чанка
// ============================================

use ultraviolet::Vec2;

/// Целочисленная координата тайла: (chunk_x, chunk_y)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Ближайший к позиции тайл
    pub fn from_world(position: Vec2, mesh_world_size: f32) -> Self {
        Self {
            x: (position.x / mesh_world_size).round() as i32,
            y: (position.y / mesh_world_size).round() as i32,
        }
    }

    /// Центр тайла в мировых координатах
    pub fn world_position(&self, mesh_world_size: f32) -> Vec2 {
        Vec2::new(self.x as f32 * mesh_world_size, self.y as f32 * mesh_world_size)
    }

    /// Центр выборки шума в клетках карты высот (tile_cells клеток на тайл).
    /// Целые значения: соседние чанки совпадают на общих клетках.
    pub fn sample_centre(&self, tile_cells: usize) -> Vec2 {
        Vec2::new(
            (self.x as i64 * tile_cells as i64) as f32,
            (self.y as i64 * tile_cells as i64) as f32,
        )
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_world_rounds() {
        assert_eq!(ChunkCoord::from_world(Vec2::new(10.9, -11.1), 22.0), ChunkCoord::new(0, -1));
        assert_eq!(ChunkCoord::from_world(Vec2::new(33.5, 0.0), 22.0), ChunkCoord::new(2, 0));
    }

    #[test]
    fn test_sample_centre_in_cells() {
        let coord = ChunkCoord::new(2, -1);
        // 22 клетки на тайл, масштаб 2.5 -> 55 метров
        assert_eq!(coord.world_position(55.0), Vec2::new(110.0, -55.0));
        assert_eq!(coord.sample_centre(22), Vec2::new(44.0, -22.0));
        assert_eq!(coord.offset(1, 1), ChunkCoord::new(3, 0));
    }
}
