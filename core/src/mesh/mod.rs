//! CPU-side mesh buffers and attribute-preserving mesh surgery.
//!
//! This module provides:
//!
//! - [`MeshBuffers`] - Per-vertex attribute arrays, submesh ranges, morph frames
//! - [`spatial_hash`] / [`WeldMap`] - Positional correspondence between buffers
//! - [`VertexRemap`] - Dense remapping of the vertices a set of triangles uses
//! - [`MeshSplitter`] - Submesh extraction and removal
//! - Generators for test shapes (box, sphere)

mod buffers;
mod error;
pub mod generators;
mod remap;
mod spatial_hash;
mod split;

pub use buffers::{
    Aabb, MAX_UV_CHANNELS, MeshBuffers, MorphFrame, SkinWeights, SubmeshRange, VertexChannel,
};
pub use error::MeshError;
pub use remap::VertexRemap;
pub use spatial_hash::{QUANTIZATION_SCALE, WeldMap, quantize, spatial_hash};
pub use split::{MeshSplitter, SeparatedMesh};
