//! CPU-side texture types.
//!
//! Provides [`CpuTexture`] for holding raw RGBA8 pixel data and the
//! nearest-pixel weight-map sampling used to drive soft-body constraints.

mod types;

pub use types::{CpuTexture, TextureError, TextureFormat};
