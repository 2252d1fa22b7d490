// ============================================
// Terrain Vertex - Структура вершины
// ============================================

use ultraviolet::{Vec2, Vec3};

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable, Default)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl TerrainVertex {
    /// Смещения атрибутов для вершинного буфера: position, normal, uv
    pub const ATTRIBUTE_OFFSETS: [usize; 3] = [
        0,
        std::mem::size_of::<[f32; 3]>(),
        std::mem::size_of::<[f32; 6]>(),
    ];

    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position: [position.x, position.y, position.z],
            normal: [normal.x, normal.y, normal.z],
            uv: [uv.x, uv.y],
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.position[0], self.position[1], self.position[2])
    }

    pub fn normal(&self) -> Vec3 {
        Vec3::new(self.normal[0], self.normal[1], self.normal[2])
    }
}
