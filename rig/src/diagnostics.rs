//! Non-fatal problems found while building a rig, and batch summaries.

use std::fmt;

use serde::Serialize;

/// A recoverable problem. The affected item falls back to a conservative
/// default and processing continues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum RigDiagnostic {
    /// No joint with this name exists; the collider was discarded.
    #[error("joint '{joint}' not found, collider '{shape}' discarded")]
    MissingJoint { joint: String, shape: String },
    /// The joint exists but its world transform cannot be inverted.
    #[error("joint '{joint}' has a degenerate transform, collider '{shape}' discarded")]
    DegenerateJoint { joint: String, shape: String },
    /// The descriptor is flagged inactive and the config skips those.
    #[error("bone '{joint}' is inactive, collider '{shape}' skipped")]
    InactiveBone { joint: String, shape: String },
    /// The weight map could not be resolved; a black map was used instead.
    #[error("weight map '{path}' for {mesh}/{material} not found, material fully pinned")]
    MissingWeightMap {
        mesh: String,
        material: String,
        path: String,
    },
    /// No descriptor matches this submesh's material.
    #[error("no soft-body descriptor for {mesh}/{material} (submesh {submesh})")]
    UnresolvedMaterialDescriptor {
        mesh: String,
        material: String,
        submesh: usize,
    },
    /// Several descriptors match this submesh's material.
    #[error("{count} soft-body descriptors match {mesh}/{material} (submesh {submesh})")]
    AmbiguousMaterialDescriptor {
        mesh: String,
        material: String,
        submesh: usize,
        count: usize,
    },
}

/// Counts of degraded or skipped items, for display after a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RigReport {
    pub colliders_built: usize,
    pub colliders_skipped_inactive: usize,
    pub missing_joints: usize,
    pub missing_weight_maps: usize,
    pub unresolved_materials: usize,
    pub ambiguous_materials: usize,
    pub soft_bodies_built: usize,
    pub diagnostics: Vec<RigDiagnostic>,
}

impl RigReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one diagnostic and keeps it.
    pub fn record(&mut self, diagnostic: RigDiagnostic) {
        match &diagnostic {
            RigDiagnostic::MissingJoint { .. } | RigDiagnostic::DegenerateJoint { .. } => {
                self.missing_joints += 1
            }
            RigDiagnostic::InactiveBone { .. } => self.colliders_skipped_inactive += 1,
            RigDiagnostic::MissingWeightMap { .. } => self.missing_weight_maps += 1,
            RigDiagnostic::UnresolvedMaterialDescriptor { .. } => self.unresolved_materials += 1,
            RigDiagnostic::AmbiguousMaterialDescriptor { .. } => self.ambiguous_materials += 1,
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = RigDiagnostic>) {
        for d in diagnostics {
            self.record(d);
        }
    }

    /// Adds another report's counts and diagnostics to this one.
    pub fn merge(&mut self, other: RigReport) {
        self.colliders_built += other.colliders_built;
        self.soft_bodies_built += other.soft_bodies_built;
        self.extend(other.diagnostics);
    }

    /// True if nothing was degraded or skipped.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

impl fmt::Display for RigReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} colliders, {} soft bodies; skipped: {} inactive, {} missing joints, \
             {} missing weight maps, {} unresolved materials, {} ambiguous materials",
            self.colliders_built,
            self.soft_bodies_built,
            self.colliders_skipped_inactive,
            self.missing_joints,
            self.missing_weight_maps,
            self.unresolved_materials,
            self.ambiguous_materials,
        )
    }
}
