// ============================================
// Streaming Types - Сообщения воркеров и приёмник чанков
// ============================================

use std::sync::Arc;

use crate::terrain::cache::ChunkCoord;
use crate::terrain::generation::HeightField;
use crate::terrain::mesh::{MeshData, MeshError};

/// Результат фоновой задачи для главного потока
#[derive(Debug)]
pub enum ChunkEvent {
    HeightMapReady {
        coord: ChunkCoord,
        generation: u64,
        height_field: Arc<HeightField>,
    },
    MeshReady {
        coord: ChunkCoord,
        generation: u64,
        lod_index: usize,
        mesh: Result<MeshData, MeshError>,
    },
}

impl ChunkEvent {
    pub fn coord(&self) -> ChunkCoord {
        match self {
            ChunkEvent::HeightMapReady { coord, .. } | ChunkEvent::MeshReady { coord, .. } => *coord,
        }
    }

    /// Поколение реестра, для которого считалась задача
    pub fn generation(&self) -> u64 {
        match self {
            ChunkEvent::HeightMapReady { generation, .. } | ChunkEvent::MeshReady { generation, .. } => *generation,
        }
    }
}

/// Внешний потребитель: рендер + физика.
/// Стример только сообщает, что показать, спрятать и отдать коллайдеру.
pub trait ChunkSink {
    /// Текущий меш чанка сменился
    fn show_mesh(&mut self, coord: ChunkCoord, mesh: &Arc<MeshData>);

    fn set_visible(&mut self, coord: ChunkCoord, visible: bool);

    /// Вызывается не больше одного раза на чанк
    fn assign_collider(&mut self, coord: ChunkCoord, mesh: &Arc<MeshData>);
}

/// Статистика одного тика
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    pub applied: usize,
    pub discarded: usize,
    pub chunks_created: usize,
    pub full_pass: bool,
    pub reset: bool,
}
