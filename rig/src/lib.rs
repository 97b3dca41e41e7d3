//! # Rigsmith Rig
//!
//! Synthesizes physics rigs for humanoid characters from declarative
//! descriptors:
//!
//! - [`ColliderSynthesizer`] turns bone-relative shape descriptors into
//!   capsule and box colliders parented to skeleton joints.
//! - [`SoftBodyRigBuilder`] samples weight maps into per-particle cloth
//!   constraints and picks whole-mesh solver parameters.
//! - [`RigPipeline`] runs both, plus submesh surgery, under one
//!   [`RigConfig`] and summarizes skipped items in a [`RigReport`].
//!
//! Lookup misses never fail an operation. They are returned as
//! [`RigDiagnostic`]s and the affected item falls back to a conservative
//! default (no collider, pinned cloth, default parameters).

pub mod collider;
pub mod config;
pub mod descriptor;
pub mod diagnostics;
pub mod error;
pub mod pipeline;
pub mod softbody;

pub use collider::{
    ColliderPrimitive, ColliderSet, ColliderShape, ColliderSynthesizer, source_to_engine_space,
};
pub use config::{AmbiguityPolicy, InactiveBonePolicy, ParameterSelection, RigConfig};
pub use descriptor::{
    CapsuleAxis, CollisionShapeDescriptor, DescriptorLookup, ShapeKind, SoftBodyDescriptor,
    SoftBodyDescriptorSet, resolve_material_name,
};
pub use diagnostics::{RigDiagnostic, RigReport};
pub use error::{ConfigError, RigError};
pub use pipeline::{BatchOutcome, CharacterInput, CharacterRig, RigPipeline};
pub use softbody::{
    ClothCoefficient, SoftBodyBuild, SoftBodyComponent, SoftBodyParameters, SoftBodyRigBuilder,
    SoftBodyTarget, WeightMapLibrary, WeightMapSource,
};
