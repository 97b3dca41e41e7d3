//! Soft-body (cloth) rig construction.
//!
//! - [`SoftBodyRigBuilder`]: Samples weight maps into per-particle constraints
//! - [`SoftBodyParameters`]: Whole-mesh solver settings
//! - [`WeightMapSource`] / [`WeightMapLibrary`]: Weight-map resolution

mod builder;
mod params;
mod weight_map;

pub use builder::{
    ClothCoefficient, SoftBodyBuild, SoftBodyComponent, SoftBodyRigBuilder, SoftBodyTarget,
};
pub use params::{SoftBodyParameters, stiffness_from_percentage};
pub use weight_map::{WeightMapLibrary, WeightMapSource};
