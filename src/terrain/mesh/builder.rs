// ============================================
// Mesh Builder - Меш чанка из карты высот
// ============================================
//
// Карта высот N x N содержит кольцо бордюрных вершин (строки/колонки 0 и N-1).
// Бордюр нужен только для нормалей на стыках чанков и в меш не попадает.

use thiserror::Error;
use ultraviolet::{Vec2, Vec3};

use crate::terrain::generation::{HeightField, HeightRemap};
use crate::terrain::lod::lod_increment;

use super::vertex::TerrainVertex;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeshError {
    #[error("Height field must be square, got {width}x{height}")]
    NotSquare { width: usize, height: usize },
    #[error("Height field {size}x{size} is too small for LOD stride {stride}")]
    GridTooSmall { size: usize, stride: usize },
    #[error("Stride {stride} (lod {lod}) does not divide {size} - 1")]
    UnsupportedStride { lod: u32, stride: usize, size: usize },
}

/// Готовый меш одного LOD
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub lod: u32,
    pub vertices: Vec<TerrainVertex>,
    pub indices: Vec<u32>,
    pub flat_shaded: bool,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Память под вершины и индексы (байты)
    pub fn memory_usage(&self) -> usize {
        self.vertices.len() * std::mem::size_of::<TerrainVertex>()
            + self.indices.len() * std::mem::size_of::<u32>()
    }
}

/// Ссылка на вершину: основная (в меше) или бордюрная (только для нормалей)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VertexRef {
    Main(u32),
    Border(u32),
}

#[derive(Default)]
struct MeshBuffers {
    positions: Vec<Vec3>,
    uvs: Vec<Vec2>,
    border_positions: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
    border_triangles: Vec<[VertexRef; 3]>,
}

impl MeshBuffers {
    fn with_capacity(main: usize, border: usize) -> Self {
        Self {
            positions: Vec::with_capacity(main),
            uvs: Vec::with_capacity(main),
            border_positions: Vec::with_capacity(border),
            triangles: Vec::new(),
            border_triangles: Vec::new(),
        }
    }

    fn add_vertex(&mut self, position: Vec3, uv: Vec2, vertex: VertexRef) {
        match vertex {
            VertexRef::Main(_) => {
                self.positions.push(position);
                self.uvs.push(uv);
            }
            VertexRef::Border(_) => self.border_positions.push(position),
        }
    }

    fn add_triangle(&mut self, a: VertexRef, b: VertexRef, c: VertexRef) {
        match (a, b, c) {
            (VertexRef::Main(a), VertexRef::Main(b), VertexRef::Main(c)) => self.triangles.push([a, b, c]),
            _ => self.border_triangles.push([a, b, c]),
        }
    }

    fn position(&self, vertex: VertexRef) -> Vec3 {
        match vertex {
            VertexRef::Main(i) => self.positions[i as usize],
            VertexRef::Border(i) => self.border_positions[i as usize],
        }
    }

    fn face_normal(&self, a: VertexRef, b: VertexRef, c: VertexRef) -> Vec3 {
        let pa = self.position(a);
        let pb = self.position(b);
        let pc = self.position(c);
        normalize_or_up((pb - pa).cross(pc - pa))
    }

    /// Сглаженные нормали: основные и бордюрные треугольники вкладываются
    /// только в основные вершины
    fn smooth_normals(&self) -> Vec<Vec3> {
        let mut normals = vec![Vec3::zero(); self.positions.len()];

        for &[a, b, c] in &self.triangles {
            let n = self.face_normal(VertexRef::Main(a), VertexRef::Main(b), VertexRef::Main(c));
            normals[a as usize] += n;
            normals[b as usize] += n;
            normals[c as usize] += n;
        }

        for &[a, b, c] in &self.border_triangles {
            let n = self.face_normal(a, b, c);
            for vertex in [a, b, c] {
                if let VertexRef::Main(i) = vertex {
                    normals[i as usize] += n;
                }
            }
        }

        normals.into_iter().map(normalize_or_up).collect()
    }

    fn into_smooth_mesh(self, lod: u32) -> MeshData {
        let normals = self.smooth_normals();
        let vertices = self.positions.iter()
            .zip(&self.uvs)
            .zip(&normals)
            .map(|((p, uv), n)| TerrainVertex::new(*p, *n, *uv))
            .collect();
        let indices = self.triangles.iter().flatten().copied().collect();

        MeshData { lod, vertices, indices, flat_shaded: false }
    }

    /// Плоское затенение: у каждого треугольника свои три вершины
    fn into_flat_mesh(self, lod: u32) -> MeshData {
        let mut vertices = Vec::with_capacity(self.triangles.len() * 3);
        let mut indices = Vec::with_capacity(self.triangles.len() * 3);

        for &[a, b, c] in &self.triangles {
            let n = self.face_normal(VertexRef::Main(a), VertexRef::Main(b), VertexRef::Main(c));
            for i in [a, b, c] {
                indices.push(vertices.len() as u32);
                vertices.push(TerrainVertex::new(self.positions[i as usize], n, self.uvs[i as usize]));
            }
        }

        MeshData { lod, vertices, indices, flat_shaded: true }
    }
}

#[inline]
fn normalize_or_up(v: Vec3) -> Vec3 {
    let mag = v.mag();
    if mag > f32::EPSILON { v / mag } else { Vec3::unit_y() }
}

/// Построить меш по карте высот с бордюром.
/// remap применяется к каждой высоте (passthrough, если карта уже готова).
pub fn generate_terrain_mesh(
    field: &HeightField,
    remap: &HeightRemap,
    lod: u32,
    flat_shading: bool,
) -> Result<MeshData, MeshError> {
    let size = field.width();
    if field.height() != size {
        return Err(MeshError::NotSquare { width: size, height: field.height() });
    }

    let stride = lod_increment(lod);
    if size < 4 || size - 1 < 3 * stride {
        return Err(MeshError::GridTooSmall { size, stride });
    }
    if (size - 1) % stride != 0 {
        return Err(MeshError::UnsupportedStride { lod, stride, size });
    }

    let core_size = size - 2;
    let span = (core_size - 1) as f32;
    let top_left = Vec2::new(-span / 2.0, span / 2.0);
    let denom = (size - 1 - 2 * stride) as f32;

    // Нумерация вершин: бордюр и основные отдельно
    let samples_per_line = (size - 1) / stride + 1;
    let mut vertex_map = Vec::with_capacity(samples_per_line * samples_per_line);
    let mut main_count = 0u32;
    let mut border_count = 0u32;
    for y in (0..size).step_by(stride) {
        for x in (0..size).step_by(stride) {
            let is_border = x == 0 || y == 0 || x == size - 1 || y == size - 1;
            if is_border {
                vertex_map.push(VertexRef::Border(border_count));
                border_count += 1;
            } else {
                vertex_map.push(VertexRef::Main(main_count));
                main_count += 1;
            }
        }
    }

    let vertex_at = |x: usize, y: usize| vertex_map[(y / stride) * samples_per_line + x / stride];
    let mut buffers = MeshBuffers::with_capacity(main_count as usize, border_count as usize);

    for y in (0..size).step_by(stride) {
        for x in (0..size).step_by(stride) {
            let vertex = vertex_at(x, y);
            let percent = Vec2::new(
                (x as f32 - stride as f32) / denom,
                (y as f32 - stride as f32) / denom,
            );
            let height = remap.evaluate(field.get(x, y));
            let position = Vec3::new(
                top_left.x + percent.x * span,
                height,
                top_left.y - percent.y * span,
            );
            buffers.add_vertex(position, percent, vertex);

            if x < size - 1 && y < size - 1 {
                let a = vertex;
                let b = vertex_at(x + stride, y);
                let c = vertex_at(x, y + stride);
                let d = vertex_at(x + stride, y + stride);
                buffers.add_triangle(a, d, c);
                buffers.add_triangle(d, a, b);
            }
        }
    }

    Ok(if flat_shading {
        buffers.into_flat_mesh(lod)
    } else {
        buffers.into_smooth_mesh(lod)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_from_fn(size: usize, offset_x: usize, f: impl Fn(f32, f32) -> f32) -> HeightField {
        let mut values = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                values.push(f((x + offset_x) as f32, y as f32));
            }
        }
        HeightField::from_values(size, size, values).unwrap()
    }

    fn hills(x: f32, y: f32) -> f32 {
        (x * 0.3).sin() * (y * 0.2).cos() * 3.0 + x * 0.05
    }

    #[test]
    fn test_lod0_counts() {
        let n = 25;
        let field = field_from_fn(n, 0, hills);
        let mesh = generate_terrain_mesh(&field, &HeightRemap::passthrough(), 0, false).unwrap();
        assert_eq!(mesh.vertex_count(), (n - 2) * (n - 2));
        assert_eq!(mesh.triangle_count(), 2 * (n - 3) * (n - 3));
        assert!(mesh.indices.iter().all(|i| (*i as usize) < mesh.vertex_count()));
        assert_eq!(mesh.memory_usage(), mesh.vertex_count() * 32 + mesh.indices.len() * 4);
    }

    #[test]
    fn test_simplified_counts() {
        let field = field_from_fn(25, 0, hills);
        let remap = HeightRemap::passthrough();

        let lod1 = generate_terrain_mesh(&field, &remap, 1, false).unwrap();
        assert_eq!(lod1.vertex_count(), 11 * 11);
        assert_eq!(lod1.triangle_count(), 2 * 10 * 10);

        let lod4 = generate_terrain_mesh(&field, &remap, 4, false).unwrap();
        assert_eq!(lod4.vertex_count(), 4);
        assert_eq!(lod4.triangle_count(), 2);
    }

    #[test]
    fn test_mesh_spans_tile() {
        let field = field_from_fn(25, 0, hills);
        let remap = HeightRemap::passthrough();
        for lod in [0, 1, 2, 3, 4] {
            let mesh = generate_terrain_mesh(&field, &remap, lod, false).unwrap();
            let min_x = mesh.vertices.iter().map(|v| v.position[0]).fold(f32::MAX, f32::min);
            let max_x = mesh.vertices.iter().map(|v| v.position[0]).fold(f32::MIN, f32::max);
            assert!((min_x + 11.0).abs() < 1e-4, "lod {} min {}", lod, min_x);
            assert!((max_x - 11.0).abs() < 1e-4, "lod {} max {}", lod, max_x);
        }
    }

    #[test]
    fn test_unit_normals() {
        let field = field_from_fn(25, 0, hills);
        let mesh = generate_terrain_mesh(&field, &HeightRemap::passthrough(), 0, false).unwrap();
        for v in &mesh.vertices {
            assert!((v.normal().mag() - 1.0).abs() < 1e-5);
            assert!(v.normal[1] > 0.0);
        }
    }

    #[test]
    fn test_flat_plane_normals_up() {
        let field = field_from_fn(9, 0, |_, _| 2.0);
        let mesh = generate_terrain_mesh(&field, &HeightRemap::passthrough(), 0, false).unwrap();
        for v in &mesh.vertices {
            assert!((v.normal() - Vec3::unit_y()).mag() < 1e-6);
            assert_eq!(v.position[1], 2.0);
        }
    }

    #[test]
    fn test_adjacent_edge_normals_match() {
        let n = 25;
        let tile = n - 3;
        let left = field_from_fn(n, 0, hills);
        let right = field_from_fn(n, tile, hills);
        let remap = HeightRemap::passthrough();
        let a = generate_terrain_mesh(&left, &remap, 0, false).unwrap();
        let b = generate_terrain_mesh(&right, &remap, 0, false).unwrap();

        let core = n - 2;
        // Основная вершина (x, y) при LOD 0 имеет индекс (y-1)*core + (x-1)
        for y in 1..n - 1 {
            let last_of_a = &a.vertices[(y - 1) * core + (n - 3)];
            let first_of_b = &b.vertices[(y - 1) * core];
            assert!((last_of_a.position[1] - first_of_b.position[1]).abs() < 1e-5);
            assert!(
                (last_of_a.normal() - first_of_b.normal()).mag() < 1e-4,
                "row {}: {:?} vs {:?}", y, last_of_a.normal, first_of_b.normal
            );
        }
    }

    #[test]
    fn test_flat_shading() {
        let field = field_from_fn(13, 0, hills);
        let mesh = generate_terrain_mesh(&field, &HeightRemap::passthrough(), 0, true).unwrap();
        let triangles = 2 * 10 * 10;
        assert!(mesh.flat_shaded);
        assert_eq!(mesh.triangle_count(), triangles);
        assert_eq!(mesh.vertex_count(), triangles * 3);
        let expected: Vec<u32> = (0..(triangles * 3) as u32).collect();
        assert_eq!(mesh.indices, expected);
        for tri in mesh.vertices.chunks(3) {
            assert_eq!(tri[0].normal, tri[1].normal);
            assert_eq!(tri[1].normal, tri[2].normal);
        }
    }

    #[test]
    fn test_remap_applied() {
        let field = field_from_fn(9, 0, |_, _| 0.5);
        let remap = HeightRemap::new(4.0, crate::terrain::generation::HeightCurve::linear());
        let mesh = generate_terrain_mesh(&field, &remap, 0, false).unwrap();
        assert!(mesh.vertices.iter().all(|v| (v.position[1] - 2.0).abs() < 1e-4));
    }

    #[test]
    fn test_errors() {
        let remap = HeightRemap::passthrough();
        let rect = HeightField::from_values(5, 4, vec![0.0; 20]).unwrap();
        assert_eq!(
            generate_terrain_mesh(&rect, &remap, 0, false).unwrap_err(),
            MeshError::NotSquare { width: 5, height: 4 }
        );

        let small = HeightField::from_values(9, 9, vec![0.0; 81]).unwrap();
        assert!(matches!(
            generate_terrain_mesh(&small, &remap, 4, false),
            Err(MeshError::GridTooSmall { .. })
        ));

        let odd = HeightField::from_values(24, 24, vec![0.0; 576]).unwrap();
        assert!(matches!(
            generate_terrain_mesh(&odd, &remap, 1, false),
            Err(MeshError::UnsupportedStride { stride: 2, .. })
        ));
    }
}
