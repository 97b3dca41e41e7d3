//! Rigid collider synthesis from bone-relative descriptors.
//!
//! Descriptors are authored in a mirrored, Z-up convention. Each one is
//! converted analytically into scene space with [`source_to_engine_space`]
//! and then re-expressed relative to the joint it belongs to.

use std::f32::consts::FRAC_PI_2;

use serde::Serialize;

use rigsmith_core::cancellation::{CancellationToken, Cancelled, checkpoint};
use rigsmith_core::math::{Quat, Rotation, Transform, Vec3, rotation_x};
use rigsmith_core::profile_function;
use rigsmith_core::scene::{JointResolver, Skeleton, SkeletonError};

use crate::config::{InactiveBonePolicy, RigConfig};
use crate::descriptor::{CapsuleAxis, CollisionShapeDescriptor, ShapeKind};
use crate::diagnostics::RigDiagnostic;

/// Converts a descriptor-space transform into scene space.
///
/// Equivalent to parenting under a node rotated -90° about X and mirrored on
/// X: translation becomes `R·(-x, y, z)`, the rotation is mirrored (y and z
/// negated) then pre-rotated by `R`, and `scale.x` flips sign.
pub fn source_to_engine_space(t: &Transform) -> Transform {
    let correction = rotation_x(-FRAC_PI_2);
    let q = t.rotation.quaternion();
    let mirrored = Rotation::new_unchecked(Quat::new(q.w, q.i, -q.j, -q.k));
    Transform {
        translation: correction * Vec3::new(-t.translation.x, t.translation.y, t.translation.z),
        rotation: correction * mirrored,
        scale: Vec3::new(-t.scale.x, t.scale.y, t.scale.z),
    }
}

/// Scene-unit collider geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ColliderShape {
    /// Capsule; `height` is end to end, caps included.
    Capsule {
        radius: f32,
        height: f32,
        axis: CapsuleAxis,
    },
    /// Box with full edge lengths.
    Box { size: Vec3 },
}

/// A collider ready to be parented onto a joint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColliderPrimitive {
    pub joint_name: String,
    pub joint_index: usize,
    pub shape_name: String,
    pub shape: ColliderShape,
    /// Transform relative to the joint.
    pub local_transform: Transform,
    /// Corrected scene-space transform the primitive was built with.
    pub world_transform: Transform,
    pub margin: f32,
    pub friction: f32,
    pub elasticity: f32,
    pub bone_active: bool,
}

impl ColliderPrimitive {
    pub fn is_capsule(&self) -> bool {
        matches!(self.shape, ColliderShape::Capsule { .. })
    }
}

/// Output of [`ColliderSynthesizer::synthesize`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColliderSet {
    pub primitives: Vec<ColliderPrimitive>,
    pub diagnostics: Vec<RigDiagnostic>,
}

impl ColliderSet {
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Indices of the capsule primitives.
    pub fn capsule_indices(&self) -> Vec<usize> {
        self.primitives
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_capsule())
            .map(|(i, _)| i)
            .collect()
    }

    /// Hands every primitive over to its joint in `skeleton`.
    pub fn attach_to(&self, skeleton: &mut Skeleton) -> Result<(), SkeletonError> {
        for p in &self.primitives {
            skeleton.attach(p.joint_index, p.shape_name.clone())?;
        }
        Ok(())
    }
}

/// Builds [`ColliderPrimitive`]s from [`CollisionShapeDescriptor`]s.
#[derive(Debug, Clone)]
pub struct ColliderSynthesizer {
    model_scale: f32,
    radius_scale: f32,
    inactive_bones: InactiveBonePolicy,
    log_target: String,
    cancellation: Option<CancellationToken>,
}

impl ColliderSynthesizer {
    pub fn new(model_scale: f32, radius_scale: f32) -> Self {
        Self {
            model_scale,
            radius_scale,
            inactive_bones: InactiveBonePolicy::default(),
            log_target: "rigsmith".into(),
            cancellation: None,
        }
    }

    pub fn from_config(config: &RigConfig) -> Self {
        Self::new(config.model_scale, config.radius_scale)
            .with_inactive_bones(config.inactive_bones)
            .with_log_target(config.log_target.clone())
    }

    #[must_use]
    pub fn with_inactive_bones(mut self, policy: InactiveBonePolicy) -> Self {
        self.inactive_bones = policy;
        self
    }

    #[must_use]
    pub fn with_log_target(mut self, target: impl Into<String>) -> Self {
        self.log_target = target.into();
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Scene-unit dimensions of a descriptor's shape.
    pub fn shape_of(&self, d: &CollisionShapeDescriptor) -> ColliderShape {
        match d.shape_kind {
            ShapeKind::Capsule => {
                let radius = d.radius * self.model_scale * self.radius_scale;
                ColliderShape::Capsule {
                    radius,
                    height: d.length * self.model_scale + 2.0 * radius,
                    axis: d.axis,
                }
            }
            ShapeKind::Box => ColliderShape::Box {
                size: d.extent * self.model_scale,
            },
        }
    }

    /// Builds one primitive per descriptor whose joint can be resolved.
    ///
    /// Missing joints are reported in [`ColliderSet::diagnostics`] and the
    /// descriptor is dropped.
    pub fn synthesize<J: JointResolver + ?Sized>(
        &self,
        descriptors: &[CollisionShapeDescriptor],
        joints: &J,
    ) -> Result<ColliderSet, Cancelled> {
        profile_function!();
        let target = self.log_target.as_str();
        let mut set = ColliderSet::default();

        for d in descriptors {
            checkpoint(self.cancellation.as_ref())?;

            if !d.bone_active && self.inactive_bones == InactiveBonePolicy::Skip {
                log::debug!(target: target, "Skipping collider '{}' on inactive bone '{}'", d.shape_name, d.bone_name);
                set.diagnostics.push(RigDiagnostic::InactiveBone {
                    joint: d.bone_name.clone(),
                    shape: d.shape_name.clone(),
                });
                continue;
            }

            let Some(joint) = joints.resolve_joint(&d.bone_name) else {
                log::warn!(target: target, "Joint '{}' not found, discarding collider '{}'", d.bone_name, d.shape_name);
                set.diagnostics.push(RigDiagnostic::MissingJoint {
                    joint: d.bone_name.clone(),
                    shape: d.shape_name.clone(),
                });
                continue;
            };

            let world_transform = source_to_engine_space(&d.source_transform(self.model_scale));
            let Some(local_transform) = joint.world_transform.relative(&world_transform) else {
                log::warn!(target: target, "Joint '{}' is not invertible, discarding collider '{}'", d.bone_name, d.shape_name);
                set.diagnostics.push(RigDiagnostic::DegenerateJoint {
                    joint: d.bone_name.clone(),
                    shape: d.shape_name.clone(),
                });
                continue;
            };

            set.primitives.push(ColliderPrimitive {
                joint_name: joint.name,
                joint_index: joint.index,
                shape_name: d.shape_name.clone(),
                shape: self.shape_of(d),
                local_transform,
                world_transform,
                margin: d.margin * self.model_scale,
                friction: d.friction,
                elasticity: d.elasticity,
                bone_active: d.bone_active,
            });
        }

        log::debug!(
            target: target,
            "Synthesized {} of {} colliders ({} diagnostics)",
            set.primitives.len(),
            descriptors.len(),
            set.diagnostics.len()
        );
        Ok(set)
    }
}

impl Default for ColliderSynthesizer {
    fn default() -> Self {
        Self::from_config(&RigConfig::default())
    }
}
