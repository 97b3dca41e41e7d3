//! Skeleton hierarchy for attaching generated physics shapes.
//!
//! - [`Skeleton`]: Named joints with local transforms and attachments
//! - [`Joint`]: A single joint in the hierarchy
//! - [`JointResolver`] / [`JointRef`]: Name lookup used by collider synthesis

mod skeleton;

pub use skeleton::{Joint, JointRef, JointResolver, Skeleton, SkeletonError};
