//! Dense remapping of a referenced vertex subset.

use super::error::MeshError;

/// Maps the source vertices referenced by a set of index runs onto a compact
/// `0..N` range.
///
/// Compact indices are handed out in the order vertices are first met while
/// scanning the runs left to right, so rebuilding the table from the same
/// indices always yields the same result. Vertices no run references map to
/// `None` and are dropped from any destination mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexRemap {
    source_to_compact: Vec<Option<u32>>,
    compact_to_source: Vec<u32>,
}

impl VertexRemap {
    /// Builds the table for a source mesh of `source_vertex_count` vertices.
    ///
    /// Fails with [`MeshError::IndexOutOfBounds`] if any index is not a
    /// valid source vertex.
    pub fn build<'a, I>(source_vertex_count: usize, index_runs: I) -> Result<Self, MeshError>
    where
        I: IntoIterator<Item = &'a [u32]>,
    {
        let mut source_to_compact = vec![None; source_vertex_count];
        let mut compact_to_source = Vec::new();

        for run in index_runs {
            for &index in run {
                let slot = source_to_compact.get_mut(index as usize).ok_or(
                    MeshError::IndexOutOfBounds {
                        index,
                        vertex_count: source_vertex_count,
                    },
                )?;
                if slot.is_none() {
                    *slot = Some(compact_to_source.len() as u32);
                    compact_to_source.push(index);
                }
            }
        }

        Ok(Self {
            source_to_compact,
            compact_to_source,
        })
    }

    /// Compact index of `source`, or `None` if it is not included.
    pub fn get(&self, source: u32) -> Option<u32> {
        self.source_to_compact.get(source as usize).copied().flatten()
    }

    /// Number of included (compact) vertices.
    pub fn len(&self) -> usize {
        self.compact_to_source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compact_to_source.is_empty()
    }

    /// Number of vertices in the source mesh.
    pub fn source_len(&self) -> usize {
        self.source_to_compact.len()
    }

    /// Source vertex of every compact index, in compact order.
    pub fn compact_to_source(&self) -> &[u32] {
        &self.compact_to_source
    }

    /// Rewrites source indices into compact indices.
    pub fn remap_indices(&self, indices: &[u32]) -> Result<Vec<u32>, MeshError> {
        indices
            .iter()
            .map(|&index| self.get(index).ok_or(MeshError::Unmapped { index }))
            .collect()
    }

    /// Gathers a per-vertex channel into compact order.
    ///
    /// An empty channel stays empty. The channel must otherwise hold one
    /// element per source vertex.
    pub fn gather<T: Clone>(&self, channel: &[T]) -> Vec<T> {
        if channel.is_empty() {
            return Vec::new();
        }
        self.compact_to_source
            .iter()
            .map(|&source| channel[source as usize].clone())
            .collect()
    }
}
