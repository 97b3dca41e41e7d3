//! Pipeline configuration loaded from `rig.toml`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::descriptor::SoftBodyDescriptor;
use crate::error::ConfigError;

/// What to do with collider descriptors whose bone is flagged inactive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InactiveBonePolicy {
    /// Build the collider anyway; the flag is kept on the primitive.
    #[default]
    Synthesize,
    /// Skip the descriptor and report it.
    Skip,
}

/// Which descriptor to use when several match one material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityPolicy {
    /// The first matching descriptor in declaration order.
    #[default]
    First,
    /// The last matching descriptor in declaration order.
    Last,
    /// None of them; the submesh is treated as unmatched.
    Skip,
}

impl AmbiguityPolicy {
    /// Picks one descriptor out of an ambiguous match.
    pub fn resolve<'a>(&self, matches: &[&'a SoftBodyDescriptor]) -> Option<&'a SoftBodyDescriptor> {
        match self {
            Self::First => matches.first().copied(),
            Self::Last => matches.last().copied(),
            Self::Skip => None,
        }
    }
}

/// Which matched descriptor supplies a mesh's global solver parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterSelection {
    /// The descriptor of the lowest matched submesh.
    FirstMatched,
    /// The descriptor of the highest matched submesh.
    #[default]
    LastMatched,
}

/// Settings shared by every stage of the pipeline.
///
/// All fields are optional in TOML:
///
/// ```toml
/// model_scale = 0.01
/// radius_scale = 1.0
/// inactive_bones = "skip"
/// pass_suffixes = ["_2nd_pass", "_transparent"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    /// Converts descriptor units (centimeters) into scene units.
    pub model_scale: f32,
    /// Extra multiplier applied to capsule radii.
    pub radius_scale: f32,
    /// Morph frames whose summed delta magnitude falls below this are dropped
    /// when splitting meshes.
    pub morph_epsilon: f32,
    pub inactive_bones: InactiveBonePolicy,
    pub ambiguous_descriptors: AmbiguityPolicy,
    pub solver_parameters: ParameterSelection,
    /// Material-name suffixes marking extra render passes of one material.
    pub pass_suffixes: Vec<String>,
    /// Log target used for diagnostics.
    pub log_target: String,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            model_scale: 0.01,
            radius_scale: 1.0,
            morph_epsilon: 0.1,
            inactive_bones: InactiveBonePolicy::default(),
            ambiguous_descriptors: AmbiguityPolicy::default(),
            solver_parameters: ParameterSelection::default(),
            pass_suffixes: vec!["_2nd_pass".into()],
            log_target: "rigsmith".into(),
        }
    }
}

impl RigConfig {
    /// Parses and validates a config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a config from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        log::info!("Loaded rig config from {}", path.display());
        Ok(config)
    }

    /// Serializes the config back to TOML.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }

    #[must_use]
    pub fn with_model_scale(mut self, model_scale: f32) -> Self {
        self.model_scale = model_scale;
        self
    }

    #[must_use]
    pub fn with_radius_scale(mut self, radius_scale: f32) -> Self {
        self.radius_scale = radius_scale;
        self
    }

    #[must_use]
    pub fn with_morph_epsilon(mut self, morph_epsilon: f32) -> Self {
        self.morph_epsilon = morph_epsilon;
        self
    }

    #[must_use]
    pub fn with_inactive_bones(mut self, policy: InactiveBonePolicy) -> Self {
        self.inactive_bones = policy;
        self
    }

    #[must_use]
    pub fn with_ambiguous_descriptors(mut self, policy: AmbiguityPolicy) -> Self {
        self.ambiguous_descriptors = policy;
        self
    }

    #[must_use]
    pub fn with_solver_parameters(mut self, selection: ParameterSelection) -> Self {
        self.solver_parameters = selection;
        self
    }

    #[must_use]
    pub fn with_pass_suffixes(mut self, suffixes: Vec<String>) -> Self {
        self.pass_suffixes = suffixes;
        self
    }

    #[must_use]
    pub fn with_log_target(mut self, target: impl Into<String>) -> Self {
        self.log_target = target.into();
        self
    }

    /// Rejects scales that are not finite and positive, and negative epsilons.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("model_scale", self.model_scale)?;
        positive("radius_scale", self.radius_scale)?;
        if !self.morph_epsilon.is_finite() || self.morph_epsilon < 0.0 {
            return Err(ConfigError::Invalid {
                field: "morph_epsilon",
                reason: format!("must be finite and non-negative, got {}", self.morph_epsilon),
            });
        }
        if self.log_target.is_empty() {
            return Err(ConfigError::Invalid {
                field: "log_target",
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be finite and positive, got {value}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = RigConfig::from_toml_str("").unwrap();
        assert_eq!(config, RigConfig::default());
        assert_eq!(config.model_scale, 0.01);
        assert_eq!(config.pass_suffixes, vec!["_2nd_pass".to_string()]);
    }

    #[test]
    fn parses_policies() {
        let config = RigConfig::from_toml_str(
            r#"
            model_scale = 1.0
            inactive_bones = "skip"
            ambiguous_descriptors = "last"
            solver_parameters = "first_matched"
            pass_suffixes = []
            "#,
        )
        .unwrap();
        assert_eq!(config.model_scale, 1.0);
        assert_eq!(config.inactive_bones, InactiveBonePolicy::Skip);
        assert_eq!(config.ambiguous_descriptors, AmbiguityPolicy::Last);
        assert_eq!(config.solver_parameters, ParameterSelection::FirstMatched);
        assert!(config.pass_suffixes.is_empty());
        assert_eq!(config.radius_scale, 1.0);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            RigConfig::from_toml_str("model_scale = 0.0"),
            Err(ConfigError::Invalid { field: "model_scale", .. })
        ));
        assert!(matches!(
            RigConfig::from_toml_str("morph_epsilon = -1.0"),
            Err(ConfigError::Invalid { field: "morph_epsilon", .. })
        ));
        assert!(matches!(
            RigConfig::from_toml_str("model_scale = \"big\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn toml_round_trip_preserves_config() {
        let config = RigConfig::default()
            .with_radius_scale(1.5)
            .with_inactive_bones(InactiveBonePolicy::Skip);
        let text = config.to_toml_string().unwrap();
        assert_eq!(RigConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = RigConfig::load(Path::new("/nonexistent/rig.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn ambiguity_policy_resolve() {
        let a = SoftBodyDescriptor::new("Skirt", "Cloth").with_mass(1.0);
        let b = SoftBodyDescriptor::new("Skirt", "Cloth").with_mass(2.0);
        let matches = [&a, &b];
        assert_eq!(AmbiguityPolicy::First.resolve(&matches).unwrap().mass, 1.0);
        assert_eq!(AmbiguityPolicy::Last.resolve(&matches).unwrap().mass, 2.0);
        assert!(AmbiguityPolicy::Skip.resolve(&matches).is_none());
    }
}
