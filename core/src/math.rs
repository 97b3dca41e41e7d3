//! Math type aliases, the decomposed [`Transform`], and helper functions.
//!
//! All rig math is f32. Quaternions used in transforms are unit quaternions;
//! raw [`Quat`] values are only used at the array conversion boundary.

use serde::{Deserialize, Serialize};

pub use nalgebra;

/// 2D vector (f32).
pub type Vec2 = nalgebra::Vector2<f32>;

/// 3D vector (f32).
pub type Vec3 = nalgebra::Vector3<f32>;

/// 4D vector (f32).
pub type Vec4 = nalgebra::Vector4<f32>;

/// 3x3 matrix (f32).
pub type Mat3 = nalgebra::Matrix3<f32>;

/// 4x4 matrix (f32).
pub type Mat4 = nalgebra::Matrix4<f32>;

/// Quaternion (f32). Stored as `[x, y, z, w]` in memory.
pub type Quat = nalgebra::Quaternion<f32>;

/// Unit quaternion (f32) used for all rotations.
pub type Rotation = nalgebra::UnitQuaternion<f32>;

// ===== Helper functions =====

/// Build a 4x4 TRS matrix from scale, rotation, and translation.
pub fn mat4_from_scale_rotation_translation(
    scale: Vec3,
    rotation: Rotation,
    translation: Vec3,
) -> Mat4 {
    let m = rotation.to_rotation_matrix();
    let rm = m.matrix();
    #[rustfmt::skip]
    let result = Mat4::new(
        rm[(0, 0)] * scale.x, rm[(0, 1)] * scale.y, rm[(0, 2)] * scale.z, translation.x,
        rm[(1, 0)] * scale.x, rm[(1, 1)] * scale.y, rm[(1, 2)] * scale.z, translation.y,
        rm[(2, 0)] * scale.x, rm[(2, 1)] * scale.y, rm[(2, 2)] * scale.z, translation.z,
        0.0,                  0.0,                  0.0,                  1.0,
    );
    result
}

/// Decompose a 4x4 affine matrix into (scale, rotation, translation).
///
/// A mirrored basis (negative determinant) is reported as a negative
/// `scale.x` so the remaining rotation stays proper.
pub fn to_scale_rotation_translation(m: &Mat4) -> (Vec3, Rotation, Vec3) {
    let translation = Vec3::new(m[(0, 3)], m[(1, 3)], m[(2, 3)]);
    let basis: Mat3 = m.fixed_view::<3, 3>(0, 0).into_owned();
    let sign = if basis.determinant() < 0.0 { -1.0 } else { 1.0 };

    let col0 = basis.column(0).into_owned();
    let col1 = basis.column(1).into_owned();
    let col2 = basis.column(2).into_owned();
    let sx = col0.norm() * sign;
    let sy = col1.norm();
    let sz = col2.norm();
    let scale = Vec3::new(sx, sy, sz);

    if sx == 0.0 || sy == 0.0 || sz == 0.0 {
        return (scale, Rotation::identity(), translation);
    }

    let rot_mat = Mat3::from_columns(&[col0 / sx, col1 / sy, col2 / sz]);
    let rotation = Rotation::from_rotation_matrix(
        &nalgebra::Rotation3::from_matrix_unchecked(rot_mat),
    );
    (scale, rotation, translation)
}

/// Create a rotation around the X axis.
pub fn rotation_x(angle: f32) -> Rotation {
    Rotation::from_axis_angle(&Vec3::x_axis(), angle)
}

/// Create a rotation from a `[x, y, z, w]` array, normalizing it.
///
/// A zero-length quaternion yields the identity rotation.
pub fn rotation_from_array(a: [f32; 4]) -> Rotation {
    let q = Quat::new(a[3], a[0], a[1], a[2]);
    if q.norm_squared() <= f32::EPSILON {
        Rotation::identity()
    } else {
        Rotation::from_quaternion(q)
    }
}

/// Convert a rotation to a `[x, y, z, w]` array.
pub fn rotation_to_array(r: &Rotation) -> [f32; 4] {
    let q = r.quaternion();
    [q.coords.x, q.coords.y, q.coords.z, q.coords.w]
}

/// Create a rotation from Euler angles in degrees, applied Z, then X, then Y.
///
/// This is the rotation order used by humanoid rig authoring tools for
/// bone-relative offsets.
pub fn rotation_from_euler_degrees(euler: Vec3) -> Rotation {
    let x = Rotation::from_axis_angle(&Vec3::x_axis(), euler.x.to_radians());
    let y = Rotation::from_axis_angle(&Vec3::y_axis(), euler.y.to_radians());
    let z = Rotation::from_axis_angle(&Vec3::z_axis(), euler.z.to_radians());
    y * x * z
}

/// Translation, rotation and scale, applied in scale-rotate-translate order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Translation relative to the parent space.
    pub translation: Vec3,
    /// Rotation relative to the parent space.
    pub rotation: Rotation,
    /// Per-axis scale. A negative component encodes a mirror.
    pub scale: Vec3,
}

impl Transform {
    /// Identity transform: no translation, identity rotation, unit scale.
    pub fn identity() -> Self {
        Self {
            translation: Vec3::zeros(),
            rotation: Rotation::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }

    /// Creates a transform with the given translation.
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::identity()
        }
    }

    /// Returns this transform with a different rotation.
    #[must_use]
    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Returns this transform with a different scale.
    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Computes the 4x4 matrix for this transform.
    pub fn to_matrix(&self) -> Mat4 {
        mat4_from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Decomposes a 4x4 affine matrix into a transform.
    pub fn from_matrix(m: &Mat4) -> Self {
        let (scale, rotation, translation) = to_scale_rotation_translation(m);
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Composes `self` (parent) with `child`, returning the child's transform
    /// in the parent's parent space.
    pub fn mul(&self, child: &Transform) -> Transform {
        Transform::from_matrix(&(self.to_matrix() * child.to_matrix()))
    }

    /// Expresses `world` relative to `self`, i.e. `self⁻¹ · world`.
    ///
    /// Returns `None` if this transform is not invertible (zero scale).
    pub fn relative(&self, world: &Transform) -> Option<Transform> {
        let inv = self.to_matrix().try_inverse()?;
        Some(Transform::from_matrix(&(inv * world.to_matrix())))
    }

    /// Transforms a point from local space into parent space.
    pub fn transform_point(&self, p: &Vec3) -> Vec3 {
        self.rotation * self.scale.component_mul(p) + self.translation
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn identity_trs_matrix() {
        let m = Transform::identity().to_matrix();
        assert!((m - Mat4::identity()).norm() < 1e-6);
    }

    #[test]
    fn rotation_array_roundtrip() {
        let r = rotation_from_array([0.0, 0.7071068, 0.0, 0.7071068]);
        let arr = rotation_to_array(&r);
        assert!((arr[1] - 0.7071068).abs() < 1e-5);
        assert!((arr[3] - 0.7071068).abs() < 1e-5);
    }

    #[test]
    fn zero_quaternion_is_identity() {
        assert_eq!(rotation_from_array([0.0; 4]), Rotation::identity());
    }

    #[test]
    fn rotation_x_90() {
        let v = rotation_x(FRAC_PI_2) * Vec3::new(0.0, 1.0, 0.0);
        assert!((v - Vec3::new(0.0, 0.0, 1.0)).norm() < 1e-5);
    }

    #[test]
    fn decompose_trs_roundtrip() {
        let t = Transform {
            translation: Vec3::new(5.0, 6.0, 7.0),
            rotation: Rotation::from_axis_angle(&Vec3::y_axis(), 1.0),
            scale: Vec3::new(2.0, 3.0, 4.0),
        };
        let back = Transform::from_matrix(&t.to_matrix());
        assert!((back.translation - t.translation).norm() < 1e-5);
        assert!((back.scale - t.scale).norm() < 1e-5);
        assert!(back.rotation.angle_to(&t.rotation) < 1e-4);
    }

    #[test]
    fn decompose_mirrored_matrix_keeps_proper_rotation() {
        let t = Transform::identity().with_scale(Vec3::new(-1.0, 1.0, 1.0));
        let back = Transform::from_matrix(&t.to_matrix());
        assert!((back.scale - Vec3::new(-1.0, 1.0, 1.0)).norm() < 1e-6);
        assert!(back.rotation.angle() < 1e-5);
    }

    #[test]
    fn relative_undoes_parent() {
        let parent = Transform::from_translation(Vec3::new(1.0, 2.0, 3.0))
            .with_rotation(rotation_x(0.5));
        let child = Transform::from_translation(Vec3::new(0.0, 1.0, 0.0));
        let world = parent.mul(&child);
        let local = parent.relative(&world).unwrap();
        assert!((local.translation - child.translation).norm() < 1e-5);
        assert!(local.rotation.angle() < 1e-4);
    }

    #[test]
    fn transform_point_applies_scale_then_rotation() {
        let t = Transform::from_translation(Vec3::new(0.0, 0.0, 1.0))
            .with_rotation(rotation_x(FRAC_PI_2))
            .with_scale(Vec3::new(1.0, 2.0, 1.0));
        let p = t.transform_point(&Vec3::new(0.0, 1.0, 0.0));
        assert!((p - Vec3::new(0.0, 0.0, 3.0)).norm() < 1e-5);
    }
}
