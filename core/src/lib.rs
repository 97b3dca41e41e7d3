//! # Rigsmith Core
//!
//! Geometry and scene building blocks for humanoid rig synthesis: math types,
//! CPU mesh buffers and submesh surgery, weight-map textures and skeletons.

pub mod cancellation;
pub mod math;
pub mod mesh;
pub mod profiling;
pub mod scene;
pub mod texture;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
