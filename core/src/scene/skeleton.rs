//! Skeleton joints and joint lookup.

use serde::{Deserialize, Serialize};

use crate::math::Transform;

/// Errors from editing a [`Skeleton`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkeletonError {
    #[error("joint '{0}' already exists")]
    DuplicateJoint(String),
    #[error("parent joint {parent} does not exist (skeleton has {count} joints)")]
    MissingParent { parent: usize, count: usize },
    #[error("joint {joint} does not exist (skeleton has {count} joints)")]
    MissingJoint { joint: usize, count: usize },
}

/// A named joint in a skeleton.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    /// Joint name, unique within the skeleton.
    pub name: String,
    /// Index of the parent joint. Parents always precede their children.
    pub parent: Option<usize>,
    /// Transform relative to the parent joint (or skeleton root).
    pub local: Transform,
}

/// A resolved joint: its index, name and current world transform.
#[derive(Debug, Clone, PartialEq)]
pub struct JointRef {
    pub index: usize,
    pub name: String,
    pub world_transform: Transform,
}

/// Looks joints up by name.
///
/// Implemented by [`Skeleton`]; hosts with their own scene graph implement
/// it to let collider synthesis parent shapes onto their nodes.
pub trait JointResolver {
    /// Finds the joint called `name`, or `None` if there is none.
    fn resolve_joint(&self, name: &str) -> Option<JointRef>;
}

/// A joint hierarchy stored parent-first.
///
/// Each joint may carry named attachments (for example collider nodes) which
/// the skeleton owns once attached.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Skeleton {
    joints: Vec<Joint>,
    #[serde(default)]
    attachments: Vec<Vec<String>>,
}

impl Skeleton {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a joint and returns its index.
    pub fn add_joint(
        &mut self,
        name: impl Into<String>,
        parent: Option<usize>,
        local: Transform,
    ) -> Result<usize, SkeletonError> {
        let name = name.into();
        if self.find_joint(&name).is_some() {
            return Err(SkeletonError::DuplicateJoint(name));
        }
        if let Some(parent) = parent
            && parent >= self.joints.len()
        {
            return Err(SkeletonError::MissingParent {
                parent,
                count: self.joints.len(),
            });
        }
        self.joints.push(Joint {
            name,
            parent,
            local,
        });
        self.attachments.push(Vec::new());
        Ok(self.joints.len() - 1)
    }

    /// Builder form of [`add_joint`](Self::add_joint) for a joint under the
    /// named parent. Unknown parents attach to the root and log a warning.
    #[must_use]
    pub fn with_joint(mut self, name: &str, parent: Option<&str>, local: Transform) -> Self {
        let parent_index = parent.and_then(|p| {
            let index = self.find_joint(p);
            if index.is_none() {
                log::warn!("Parent joint '{}' of '{}' not found, adding at root", p, name);
            }
            index
        });
        if let Err(e) = self.add_joint(name, parent_index, local) {
            log::warn!("Skipping joint: {}", e);
        }
        self
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn joint(&self, index: usize) -> Option<&Joint> {
        self.joints.get(index)
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Index of the joint called `name`.
    pub fn find_joint(&self, name: &str) -> Option<usize> {
        self.joints.iter().position(|j| j.name == name)
    }

    /// World transform of joint `index`, composed from the root down.
    pub fn world_transform(&self, index: usize) -> Option<Transform> {
        let joint = self.joints.get(index)?;
        match joint.parent {
            Some(parent) => Some(self.world_transform(parent)?.mul(&joint.local)),
            None => Some(joint.local),
        }
    }

    /// Records `attachment` as owned by joint `index`.
    pub fn attach(&mut self, index: usize, attachment: impl Into<String>) -> Result<(), SkeletonError> {
        let count = self.joints.len();
        let slot = self
            .attachments
            .get_mut(index)
            .ok_or(SkeletonError::MissingJoint { joint: index, count })?;
        slot.push(attachment.into());
        Ok(())
    }

    /// Attachments owned by joint `index`, in attach order.
    pub fn attachments(&self, index: usize) -> &[String] {
        self.attachments.get(index).map_or(&[], Vec::as_slice)
    }
}

impl JointResolver for Skeleton {
    fn resolve_joint(&self, name: &str) -> Option<JointRef> {
        let index = self.find_joint(name)?;
        Some(JointRef {
            index,
            name: name.to_string(),
            world_transform: self.world_transform(index)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    fn arm() -> Skeleton {
        Skeleton::new()
            .with_joint("Hips", None, Transform::from_translation(Vec3::new(0.0, 1.0, 0.0)))
            .with_joint(
                "Spine",
                Some("Hips"),
                Transform::from_translation(Vec3::new(0.0, 0.5, 0.0)),
            )
            .with_joint(
                "Head",
                Some("Spine"),
                Transform::from_translation(Vec3::new(0.0, 0.25, 0.0)),
            )
    }

    #[test]
    fn world_transform_composes_parents() {
        let skeleton = arm();
        let head = skeleton.find_joint("Head").unwrap();
        let world = skeleton.world_transform(head).unwrap();
        assert!((world.translation - Vec3::new(0.0, 1.75, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn resolve_joint_by_name() {
        let skeleton = arm();
        let spine = skeleton.resolve_joint("Spine").unwrap();
        assert_eq!(spine.index, 1);
        assert!((spine.world_transform.translation.y - 1.5).abs() < 1e-5);
        assert!(skeleton.resolve_joint("Tail").is_none());
    }

    #[test]
    fn duplicate_and_missing_parent_rejected() {
        let mut skeleton = arm();
        assert_eq!(
            skeleton.add_joint("Hips", None, Transform::identity()),
            Err(SkeletonError::DuplicateJoint("Hips".into()))
        );
        assert!(matches!(
            skeleton.add_joint("Foot", Some(9), Transform::identity()),
            Err(SkeletonError::MissingParent { parent: 9, .. })
        ));
        assert_eq!(skeleton.len(), 3);
    }

    #[test]
    fn attachments_are_recorded_per_joint() {
        let mut skeleton = arm();
        skeleton.attach(2, "HeadCollider").unwrap();
        skeleton.attach(2, "JawCollider").unwrap();
        assert_eq!(skeleton.attachments(2), &["HeadCollider", "JawCollider"]);
        assert!(skeleton.attachments(0).is_empty());
        assert!(skeleton.attach(7, "Nope").is_err());
    }
}
