//! Submesh extraction and removal.
//!
//! Both operations share one primitive: build a [`VertexRemap`] over the
//! triangle indices that survive, then copy every populated attribute
//! channel and every morph frame through it. Bind poses and bounds are
//! carried over verbatim.

use crate::cancellation::{CancellationToken, checkpoint};
use crate::{profile_function, profile_scope};

use super::buffers::{MeshBuffers, MorphFrame, SubmeshRange};
use super::error::MeshError;
use super::remap::VertexRemap;

/// The two meshes produced by splitting one submesh off a source mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct SeparatedMesh {
    /// Source mesh without the split-off submesh.
    pub remaining: MeshBuffers,
    /// The split-off submesh as its own single-submesh mesh.
    pub extracted: MeshBuffers,
}

/// Splits meshes by submesh while preserving attributes and morph frames.
///
/// # Example
///
/// ```
/// use rigsmith_core::mesh::{MeshSplitter, generators::generate_box};
///
/// let cube = generate_box(0.5);
/// let lid = MeshSplitter::new().extract_submesh(&cube, 1).unwrap();
/// assert_eq!(lid.submesh_count(), 1);
/// assert_eq!(lid.triangle_count(), 6);
/// ```
#[derive(Debug, Clone)]
pub struct MeshSplitter {
    morph_epsilon: f32,
    cancellation: Option<CancellationToken>,
}

impl MeshSplitter {
    /// Net displacement below which a morph frame is dropped.
    pub const DEFAULT_MORPH_EPSILON: f32 = 0.1;

    pub fn new() -> Self {
        Self {
            morph_epsilon: Self::DEFAULT_MORPH_EPSILON,
            cancellation: None,
        }
    }

    /// Set the morph-frame epsilon.
    #[must_use]
    pub fn with_morph_epsilon(mut self, epsilon: f32) -> Self {
        self.morph_epsilon = epsilon;
        self
    }

    /// Check `token` before every vertex scan.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn morph_epsilon(&self) -> f32 {
        self.morph_epsilon
    }

    /// Builds a mesh holding only the geometry of submesh `submesh`.
    ///
    /// The result has a single submesh starting at index 0. Vertices not
    /// referenced by the submesh are dropped.
    pub fn extract_submesh(
        &self,
        source: &MeshBuffers,
        submesh: usize,
    ) -> Result<MeshBuffers, MeshError> {
        profile_function!();
        source.validate()?;

        let indices = source.submesh_indices(submesh)?;
        if indices.len() < 3 {
            return Err(MeshError::EmptySubmesh { index: submesh });
        }

        checkpoint(self.cancellation.as_ref())?;
        let remap = VertexRemap::build(source.vertex_count(), [indices])?;

        let mut dest = self.copy_through(source, &remap)?;
        dest.name = format!("{}_{}", source.name, submesh);
        dest.indices = remap.remap_indices(indices)?;
        dest.submeshes = vec![
            SubmeshRange::new(0, indices.len() as u32).with_vertices(0, remap.len() as u32),
        ];

        log::debug!(
            "Extracted submesh {submesh} of '{}': {} -> {} vertices, {} morph frames kept",
            source.name,
            source.vertex_count(),
            dest.vertex_count(),
            dest.morph_frames.len()
        );
        Ok(dest)
    }

    /// Builds a mesh holding everything except the submeshes in `excluded`.
    ///
    /// Retained ranges keep their order and index counts and are packed
    /// back to back in the new index buffer.
    pub fn remove_submeshes(
        &self,
        source: &MeshBuffers,
        excluded: &[usize],
    ) -> Result<MeshBuffers, MeshError> {
        profile_function!();
        source.validate()?;

        let count = source.submesh_count();
        if let Some(&index) = excluded.iter().find(|&&i| i >= count) {
            return Err(MeshError::SubmeshOutOfRange { index, count });
        }

        let retained: Vec<usize> = (0..count).filter(|i| !excluded.contains(i)).collect();
        let runs = retained
            .iter()
            .map(|&i| source.submesh_indices(i))
            .collect::<Result<Vec<_>, _>>()?;
        if runs.iter().all(|run| run.len() < 3) {
            let mut removed = excluded.to_vec();
            removed.sort_unstable();
            removed.dedup();
            return Err(MeshError::NothingRetained { removed });
        }

        checkpoint(self.cancellation.as_ref())?;
        let remap = VertexRemap::build(source.vertex_count(), runs.iter().copied())?;

        let mut dest = self.copy_through(source, &remap)?;
        dest.name = source.name.clone();

        let mut cursor = 0u32;
        for (&original, run) in retained.iter().zip(&runs) {
            let range = source.submeshes[original];
            let remapped = remap.remap_indices(run)?;

            // The span starts at the remapped original first vertex, lowered
            // to the smallest index the range uses so it covers every index.
            let (first_vertex, vertex_count) =
                match (remapped.iter().min().copied(), remapped.iter().max().copied()) {
                    (Some(min), Some(max)) => {
                        let first = remap.get(range.first_vertex).map_or(min, |f| f.min(min));
                        (first, max + 1 - first)
                    }
                    _ => (remap.get(range.first_vertex).unwrap_or_default(), 0),
                };

            dest.submeshes.push(
                SubmeshRange::new(cursor, range.index_count)
                    .with_vertices(first_vertex, vertex_count),
            );
            dest.indices.extend_from_slice(&remapped);
            cursor += range.index_count;
        }

        log::debug!(
            "Removed submeshes {excluded:?} from '{}': {} -> {} vertices, {} submeshes kept",
            source.name,
            source.vertex_count(),
            dest.vertex_count(),
            dest.submesh_count()
        );
        Ok(dest)
    }

    /// Splits submesh `submesh` off `source`, returning both halves.
    pub fn separate(
        &self,
        source: &MeshBuffers,
        submesh: usize,
    ) -> Result<SeparatedMesh, MeshError> {
        let extracted = self.extract_submesh(source, submesh)?;
        let remaining = self.remove_submeshes(source, &[submesh])?;
        Ok(SeparatedMesh {
            remaining,
            extracted,
        })
    }

    /// Copies attribute channels, skinning data, bounds and morph frames
    /// through `remap`. Topology is left empty for the caller.
    fn copy_through(
        &self,
        source: &MeshBuffers,
        remap: &VertexRemap,
    ) -> Result<MeshBuffers, MeshError> {
        profile_scope!("copy_through");
        checkpoint(self.cancellation.as_ref())?;

        let mut dest = MeshBuffers {
            positions: remap.gather(&source.positions),
            normals: remap.gather(&source.normals),
            tangents: remap.gather(&source.tangents),
            colors: remap.gather(&source.colors),
            skin_weights: remap.gather(&source.skin_weights),
            bind_poses: source.bind_poses.clone(),
            bounds: source.bounds,
            ..MeshBuffers::default()
        };
        for (dst, src) in dest.uvs.iter_mut().zip(&source.uvs) {
            *dst = remap.gather(src);
        }

        checkpoint(self.cancellation.as_ref())?;
        dest.morph_frames = source
            .morph_frames
            .iter()
            .filter_map(|frame| self.transfer_frame(frame, remap))
            .collect();

        Ok(dest)
    }

    /// Remaps one morph frame, or drops it if it does not move any kept
    /// vertex by more than the epsilon.
    fn transfer_frame(&self, frame: &MorphFrame, remap: &VertexRemap) -> Option<MorphFrame> {
        let transferred = MorphFrame {
            name: frame.name.clone(),
            frame_weight: frame.frame_weight,
            delta_positions: remap.gather(&frame.delta_positions),
            delta_normals: remap.gather(&frame.delta_normals),
            delta_tangents: remap.gather(&frame.delta_tangents),
        };

        if transferred.net_displacement() < self.morph_epsilon {
            log::debug!(
                "Dropping morph frame '{}' (weight {}): no displacement in kept region",
                frame.name,
                frame.frame_weight
            );
            return None;
        }
        Some(transferred)
    }
}

impl Default for MeshSplitter {
    fn default() -> Self {
        Self::new()
    }
}
