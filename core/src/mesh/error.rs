//! Error types for mesh surgery.

use crate::cancellation::Cancelled;

use super::buffers::VertexChannel;

/// Errors raised by mesh validation and splitting.
///
/// Every variant except [`Cancelled`](MeshError::Cancelled) describes
/// degenerate input: the operation is aborted and no partial mesh is
/// produced.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    #[error("submesh {index} is out of range (mesh has {count} submeshes)")]
    SubmeshOutOfRange { index: usize, count: usize },

    #[error("submesh {index} contains no triangles")]
    EmptySubmesh { index: usize },

    #[error("no triangles remain after removing submeshes {removed:?}")]
    NothingRetained { removed: Vec<usize> },

    #[error("submesh {submesh} ends at index {end} but the index buffer holds {index_count}")]
    RangeOutOfBounds {
        submesh: usize,
        end: usize,
        index_count: usize,
    },

    #[error("index {index} exceeds vertex count {vertex_count}")]
    IndexOutOfBounds { index: u32, vertex_count: usize },

    #[error("vertex {index} is not part of the remap table")]
    Unmapped { index: u32 },

    #[error("{channel} channel has {len} elements, expected {expected}")]
    ChannelLength {
        channel: VertexChannel,
        len: usize,
        expected: usize,
    },

    #[error("morph frame '{name}' has {len} deltas, expected {expected}")]
    MorphFrameLength {
        name: String,
        len: usize,
        expected: usize,
    },

    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

impl MeshError {
    /// Returns `true` for malformed or empty input, `false` for cancellation.
    pub fn is_degenerate_input(&self) -> bool {
        !matches!(self, Self::Cancelled(_))
    }
}
