//! Fatal error types for rig synthesis.

use std::path::PathBuf;

use rigsmith_core::cancellation::Cancelled;
use rigsmith_core::mesh::MeshError;

/// Errors from loading or validating a [`RigConfig`](crate::RigConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse rig config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid rig config: {field} {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Errors that abort a rig operation.
///
/// Only structural problems end up here. Lookup misses (joints, weight maps,
/// material descriptors) are reported as
/// [`RigDiagnostic`](crate::RigDiagnostic)s instead.
#[derive(Debug, thiserror::Error)]
pub enum RigError {
    #[error(transparent)]
    Mesh(#[from] MeshError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

impl RigError {
    /// Whether the error was caused by cancellation rather than bad input.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_) | Self::Mesh(MeshError::Cancelled(_)))
    }
}
