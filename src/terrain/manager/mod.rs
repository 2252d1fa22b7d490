// ============================================
// Manager Module - Стриминг чанков и выбор LOD
// ============================================

mod chunk;
mod streamer;
mod types;

pub use chunk::{ChunkBounds, LodMesh, TerrainChunk, COLLIDER_GENERATION_DISTANCE};
pub use streamer::{TerrainStreamer, VIEWER_MOVE_THRESHOLD_FOR_CHUNK_UPDATE};
pub use types::{ChunkEvent, ChunkSink, TickStats};

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use crate::terrain::cache::ChunkCoord;
    use crate::terrain::mesh::MeshData;

    use super::ChunkSink;

    /// Запоминает все вызовы для проверок
    #[derive(Default)]
    pub struct RecordingSink {
        pub shown: Vec<(ChunkCoord, u32)>,
        pub visibility: Vec<(ChunkCoord, bool)>,
        pub colliders: Vec<ChunkCoord>,
    }

    impl ChunkSink for RecordingSink {
        fn show_mesh(&mut self, coord: ChunkCoord, mesh: &Arc<MeshData>) {
            self.shown.push((coord, mesh.lod));
        }

        fn set_visible(&mut self, coord: ChunkCoord, visible: bool) {
            self.visibility.push((coord, visible));
        }

        fn assign_collider(&mut self, coord: ChunkCoord, _mesh: &Arc<MeshData>) {
            self.colliders.push(coord);
        }
    }
}
