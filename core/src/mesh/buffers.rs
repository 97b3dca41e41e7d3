//! CPU-side mesh attribute buffers.
//!
//! This module provides:
//! - [`MeshBuffers`] - Parallel per-vertex attribute arrays, a shared triangle
//!   index buffer, submesh ranges and morph frames
//! - [`SubmeshRange`] - A contiguous slice of the shared index buffer
//! - [`MorphFrame`] - One frame of a morph target (blend shape)
//! - [`SkinWeights`] - Four joint index/weight pairs for skinning
//! - [`Aabb`] - Axis-aligned bounding volume

use std::fmt;
use std::ops::Range;

use crate::math::{Mat4, Vec2, Vec3, Vec4};

use super::error::MeshError;

/// Maximum number of UV channels a mesh can carry.
pub const MAX_UV_CHANNELS: usize = 8;

/// Identifies one per-vertex attribute channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexChannel {
    Position,
    /// UV channel by index (0..8).
    Uv(u8),
    Normal,
    Tangent,
    Color,
    SkinWeights,
}

impl fmt::Display for VertexChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position => f.write_str("position"),
            Self::Uv(n) => write!(f, "uv{n}"),
            Self::Normal => f.write_str("normal"),
            Self::Tangent => f.write_str("tangent"),
            Self::Color => f.write_str("color"),
            Self::SkinWeights => f.write_str("skin weight"),
        }
    }
}

/// Skinning influences of one vertex: up to four joints.
///
/// Unused slots carry joint 0 with weight 0.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SkinWeights {
    /// Indices into the mesh's bind pose array.
    pub joints: [u32; 4],
    /// Influence weights, normally summing to 1.
    pub weights: [f32; 4],
}

impl SkinWeights {
    /// A vertex fully bound to a single joint.
    pub fn single(joint: u32) -> Self {
        Self {
            joints: [joint, 0, 0, 0],
            weights: [1.0, 0.0, 0.0, 0.0],
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// An inverted box that any point will expand.
    pub fn empty() -> Self {
        Self {
            min: Vec3::repeat(f32::INFINITY),
            max: Vec3::repeat(f32::NEG_INFINITY),
        }
    }

    /// Smallest box containing all `points`.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.min = aabb.min.inf(p);
            aabb.max = aabb.max.sup(p);
        }
        aabb
    }

    /// Returns `true` if no point has been added.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

/// A contiguous slice of the shared triangle-index buffer drawn with one
/// material.
///
/// Indices are absolute into the mesh's vertex arrays. `first_vertex` and
/// `vertex_count` describe the span of vertices the range references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SubmeshRange {
    /// Offset of the first index in the shared index buffer.
    pub index_start: u32,
    /// Number of indices (three per triangle).
    pub index_count: u32,
    /// Lowest vertex referenced by the range.
    pub first_vertex: u32,
    /// Number of vertices spanned from `first_vertex`.
    pub vertex_count: u32,
}

impl SubmeshRange {
    /// Creates a range over `index_count` indices starting at `index_start`.
    pub fn new(index_start: u32, index_count: u32) -> Self {
        Self {
            index_start,
            index_count,
            first_vertex: 0,
            vertex_count: 0,
        }
    }

    /// Set the vertex span.
    #[must_use]
    pub fn with_vertices(mut self, first_vertex: u32, vertex_count: u32) -> Self {
        self.first_vertex = first_vertex;
        self.vertex_count = vertex_count;
        self
    }

    /// Index-buffer range covered by this submesh.
    pub fn index_range(&self) -> Range<usize> {
        let start = self.index_start as usize;
        start..start + self.index_count as usize
    }

    /// Number of whole triangles in the range.
    pub fn triangle_count(&self) -> usize {
        self.index_count as usize / 3
    }
}

/// One frame of a morph target.
///
/// Delta arrays are sized to the owning mesh's vertex count. Normal and
/// tangent deltas are optional and may be empty.
#[derive(Debug, Clone, PartialEq)]
pub struct MorphFrame {
    /// Morph target name. Frames of the same target share the name.
    pub name: String,
    /// Weight at which this frame is fully applied.
    pub frame_weight: f32,
    pub delta_positions: Vec<Vec3>,
    pub delta_normals: Vec<Vec3>,
    pub delta_tangents: Vec<Vec3>,
}

impl MorphFrame {
    /// Creates a frame carrying position deltas only.
    pub fn new(name: impl Into<String>, frame_weight: f32, delta_positions: Vec<Vec3>) -> Self {
        Self {
            name: name.into(),
            frame_weight,
            delta_positions,
            delta_normals: Vec::new(),
            delta_tangents: Vec::new(),
        }
    }

    /// Set the normal deltas.
    #[must_use]
    pub fn with_normals(mut self, delta_normals: Vec<Vec3>) -> Self {
        self.delta_normals = delta_normals;
        self
    }

    /// Set the tangent deltas.
    #[must_use]
    pub fn with_tangents(mut self, delta_tangents: Vec<Vec3>) -> Self {
        self.delta_tangents = delta_tangents;
        self
    }

    /// Sum of the per-vertex position delta magnitudes.
    ///
    /// Frames whose net displacement falls below the splitter's epsilon are
    /// treated as not affecting a mesh. Magnitudes are summed rather than
    /// the deltas, so symmetric morphs whose deltas cancel out are kept.
    pub fn net_displacement(&self) -> f32 {
        self.delta_positions.iter().map(|d| d.norm()).sum()
    }
}

/// Parallel per-vertex attribute arrays plus topology.
///
/// Every non-empty attribute array holds exactly [`vertex_count`] elements;
/// an empty array means the channel is absent. [`validate`] checks this
/// invariant along with index and range bounds.
///
/// [`vertex_count`]: MeshBuffers::vertex_count
/// [`validate`]: MeshBuffers::validate
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshBuffers {
    /// Asset name, used for descriptor lookups and logging.
    pub name: String,
    pub positions: Vec<Vec3>,
    /// UV channels 0..8. Empty channels are absent.
    pub uvs: [Vec<Vec2>; MAX_UV_CHANNELS],
    pub normals: Vec<Vec3>,
    /// Tangents with handedness in `w`.
    pub tangents: Vec<Vec4>,
    /// Linear RGBA vertex colors.
    pub colors: Vec<[f32; 4]>,
    pub skin_weights: Vec<SkinWeights>,
    /// Per-joint bind pose matrices; not vertex-indexed.
    pub bind_poses: Vec<Mat4>,
    pub bounds: Aabb,
    /// Shared triangle-index buffer.
    pub indices: Vec<u32>,
    /// Submesh ranges in render-pass order.
    pub submeshes: Vec<SubmeshRange>,
    pub morph_frames: Vec<MorphFrame>,
}

impl MeshBuffers {
    /// Creates a mesh from positions with no other channels.
    pub fn new(name: impl Into<String>, positions: Vec<Vec3>) -> Self {
        let bounds = Aabb::from_points(&positions);
        Self {
            name: name.into(),
            positions,
            bounds,
            ..Self::default()
        }
    }

    /// Set the shared index buffer and its submesh ranges.
    #[must_use]
    pub fn with_submeshes(mut self, indices: Vec<u32>, submeshes: Vec<SubmeshRange>) -> Self {
        self.indices = indices;
        self.submeshes = submeshes;
        self
    }

    /// Append a submesh whose indices are added to the end of the index buffer.
    ///
    /// The vertex span is computed from the indices.
    #[must_use]
    pub fn with_submesh_indices(mut self, indices: &[u32]) -> Self {
        let start = self.indices.len() as u32;
        self.indices.extend_from_slice(indices);
        let mut range = SubmeshRange::new(start, indices.len() as u32);
        if let (Some(min), Some(max)) = (indices.iter().min(), indices.iter().max()) {
            range = range.with_vertices(*min, max - min + 1);
        }
        self.submeshes.push(range);
        self
    }

    /// Set a UV channel.
    #[must_use]
    pub fn with_uvs(mut self, channel: usize, uvs: Vec<Vec2>) -> Self {
        if channel < MAX_UV_CHANNELS {
            self.uvs[channel] = uvs;
        } else {
            log::warn!("Ignoring UV channel {channel}: at most {MAX_UV_CHANNELS} are supported");
        }
        self
    }

    #[must_use]
    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Self {
        self.normals = normals;
        self
    }

    #[must_use]
    pub fn with_tangents(mut self, tangents: Vec<Vec4>) -> Self {
        self.tangents = tangents;
        self
    }

    #[must_use]
    pub fn with_colors(mut self, colors: Vec<[f32; 4]>) -> Self {
        self.colors = colors;
        self
    }

    /// Set skin weights and the bind poses they index.
    #[must_use]
    pub fn with_skin(mut self, skin_weights: Vec<SkinWeights>, bind_poses: Vec<Mat4>) -> Self {
        self.skin_weights = skin_weights;
        self.bind_poses = bind_poses;
        self
    }

    #[must_use]
    pub fn with_morph_frame(mut self, frame: MorphFrame) -> Self {
        self.morph_frames.push(frame);
        self
    }

    /// Number of vertices (length of the position array).
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of whole triangles over all submeshes.
    pub fn triangle_count(&self) -> usize {
        self.submeshes.iter().map(SubmeshRange::triangle_count).sum()
    }

    pub fn submesh_count(&self) -> usize {
        self.submeshes.len()
    }

    /// UV channel `n`, or an empty slice when absent or out of range.
    pub fn uv_channel(&self, n: usize) -> &[Vec2] {
        self.uvs.get(n).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Index slice of submesh `submesh`.
    pub fn submesh_indices(&self, submesh: usize) -> Result<&[u32], MeshError> {
        let range = self
            .submeshes
            .get(submesh)
            .ok_or(MeshError::SubmeshOutOfRange {
                index: submesh,
                count: self.submeshes.len(),
            })?;
        self.indices
            .get(range.index_range())
            .ok_or(MeshError::RangeOutOfBounds {
                submesh,
                end: range.index_range().end,
                index_count: self.indices.len(),
            })
    }

    /// Recompute [`bounds`](Self::bounds) from the positions.
    pub fn recalculate_bounds(&mut self) {
        self.bounds = Aabb::from_points(&self.positions);
    }

    /// Raw bytes of the position array.
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.positions.as_slice())
    }

    /// Raw bytes of the skin weight array.
    pub fn skin_weight_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.skin_weights.as_slice())
    }

    /// Check channel lengths, index bounds and range bounds.
    pub fn validate(&self) -> Result<(), MeshError> {
        let expected = self.vertex_count();
        let check = |channel: VertexChannel, len: usize| {
            if len != 0 && len != expected {
                Err(MeshError::ChannelLength {
                    channel,
                    len,
                    expected,
                })
            } else {
                Ok(())
            }
        };

        for (n, uvs) in self.uvs.iter().enumerate() {
            check(VertexChannel::Uv(n as u8), uvs.len())?;
        }
        check(VertexChannel::Normal, self.normals.len())?;
        check(VertexChannel::Tangent, self.tangents.len())?;
        check(VertexChannel::Color, self.colors.len())?;
        check(VertexChannel::SkinWeights, self.skin_weights.len())?;

        for frame in &self.morph_frames {
            let lens = [
                frame.delta_positions.len(),
                frame.delta_normals.len(),
                frame.delta_tangents.len(),
            ];
            let position_ok = lens[0] == expected;
            let optional_ok = lens[1..].iter().all(|&l| l == 0 || l == expected);
            if !position_ok || !optional_ok {
                return Err(MeshError::MorphFrameLength {
                    name: frame.name.clone(),
                    len: lens.into_iter().find(|&l| l != 0 && l != expected).unwrap_or(0),
                    expected,
                });
            }
        }

        for submesh in 0..self.submeshes.len() {
            self.submesh_indices(submesh)?;
        }

        if let Some(&index) = self.indices.iter().find(|&&i| i as usize >= expected) {
            return Err(MeshError::IndexOutOfBounds {
                index,
                vertex_count: expected,
            });
        }

        Ok(())
    }
}
