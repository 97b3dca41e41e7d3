//! Per-character orchestration of collider and soft-body synthesis.

use rigsmith_core::cancellation::{CancellationToken, checkpoint};
use rigsmith_core::mesh::{MeshBuffers, MeshSplitter, SeparatedMesh};
use rigsmith_core::profile_function;
use rigsmith_core::scene::JointResolver;

use crate::collider::{ColliderPrimitive, ColliderSet, ColliderSynthesizer};
use crate::config::RigConfig;
use crate::descriptor::{CollisionShapeDescriptor, SoftBodyDescriptorSet};
use crate::diagnostics::RigReport;
use crate::error::{ConfigError, RigError};
use crate::softbody::{
    SoftBodyBuild, SoftBodyComponent, SoftBodyRigBuilder, SoftBodyTarget, WeightMapSource,
};

/// Everything needed to rig one character.
pub struct CharacterInput<'a> {
    pub name: String,
    pub joints: &'a dyn JointResolver,
    pub collision_shapes: &'a [CollisionShapeDescriptor],
    pub soft_body_descriptors: &'a SoftBodyDescriptorSet,
    pub targets: Vec<SoftBodyTarget<'a>>,
    pub weight_maps: &'a dyn WeightMapSource,
}

impl<'a> CharacterInput<'a> {
    pub fn new(
        name: impl Into<String>,
        joints: &'a dyn JointResolver,
        collision_shapes: &'a [CollisionShapeDescriptor],
        soft_body_descriptors: &'a SoftBodyDescriptorSet,
        weight_maps: &'a dyn WeightMapSource,
    ) -> Self {
        Self {
            name: name.into(),
            joints,
            collision_shapes,
            soft_body_descriptors,
            targets: Vec::new(),
            weight_maps,
        }
    }

    /// Adds a mesh to build a soft body for.
    #[must_use]
    pub fn with_target(mut self, target: SoftBodyTarget<'a>) -> Self {
        self.targets.push(target);
        self
    }
}

/// The rig synthesized for one character.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterRig {
    pub name: String,
    pub colliders: ColliderSet,
    /// One component per target, in target order.
    pub soft_bodies: Vec<SoftBodyComponent>,
    pub report: RigReport,
}

/// Result of [`RigPipeline::process_batch`].
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub rigs: Vec<CharacterRig>,
    /// Characters that failed on malformed input, with the error.
    pub failures: Vec<(String, RigError)>,
    /// Combined report over every successful character.
    pub report: RigReport,
}

/// Runs the rig synthesis stages with one shared configuration.
///
/// The pipeline only holds immutable settings, so one instance can serve
/// several threads, each with its own inputs.
#[derive(Debug, Clone)]
pub struct RigPipeline {
    config: RigConfig,
    cancellation: Option<CancellationToken>,
}

impl RigPipeline {
    /// Creates a pipeline after validating `config`.
    pub fn new(config: RigConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            cancellation: None,
        })
    }

    /// Check `token` before every expensive scan.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn config(&self) -> &RigConfig {
        &self.config
    }

    fn splitter(&self) -> MeshSplitter {
        let splitter = MeshSplitter::new().with_morph_epsilon(self.config.morph_epsilon);
        match &self.cancellation {
            Some(token) => splitter.with_cancellation(token.clone()),
            None => splitter,
        }
    }

    fn collider_synthesizer(&self) -> ColliderSynthesizer {
        let synth = ColliderSynthesizer::from_config(&self.config);
        match &self.cancellation {
            Some(token) => synth.with_cancellation(token.clone()),
            None => synth,
        }
    }

    fn soft_body_builder(&self) -> SoftBodyRigBuilder {
        let builder = SoftBodyRigBuilder::from_config(&self.config);
        match &self.cancellation {
            Some(token) => builder.with_cancellation(token.clone()),
            None => builder,
        }
    }

    pub fn synthesize_colliders<J: JointResolver + ?Sized>(
        &self,
        descriptors: &[CollisionShapeDescriptor],
        joints: &J,
    ) -> Result<ColliderSet, RigError> {
        Ok(self.collider_synthesizer().synthesize(descriptors, joints)?)
    }

    pub fn build_soft_body<W: WeightMapSource + ?Sized>(
        &self,
        target: &SoftBodyTarget<'_>,
        descriptors: &SoftBodyDescriptorSet,
        colliders: &[ColliderPrimitive],
        weight_maps: &W,
    ) -> Result<SoftBodyBuild, RigError> {
        self.soft_body_builder()
            .build(target, descriptors, colliders, weight_maps)
    }

    pub fn extract_submesh(
        &self,
        mesh: &MeshBuffers,
        submesh: usize,
    ) -> Result<MeshBuffers, RigError> {
        Ok(self.splitter().extract_submesh(mesh, submesh)?)
    }

    pub fn remove_submeshes(
        &self,
        mesh: &MeshBuffers,
        excluded: &[usize],
    ) -> Result<MeshBuffers, RigError> {
        Ok(self.splitter().remove_submeshes(mesh, excluded)?)
    }

    /// Splits `submesh` into its own mesh, returning both assets for the
    /// host to persist.
    pub fn separate_submesh(
        &self,
        mesh: &MeshBuffers,
        submesh: usize,
    ) -> Result<SeparatedMesh, RigError> {
        Ok(self.splitter().separate(mesh, submesh)?)
    }

    /// Synthesizes colliders, then builds a soft body for every target
    /// using them.
    pub fn process_character(&self, input: CharacterInput<'_>) -> Result<CharacterRig, RigError> {
        profile_function!();
        checkpoint(self.cancellation.as_ref())?;

        let mut report = RigReport::new();
        let colliders = self.synthesize_colliders(input.collision_shapes, input.joints)?;
        report.colliders_built = colliders.len();
        report.extend(colliders.diagnostics.iter().cloned());

        let mut soft_bodies = Vec::with_capacity(input.targets.len());
        for target in &input.targets {
            let build = self.build_soft_body(
                target,
                input.soft_body_descriptors,
                &colliders.primitives,
                input.weight_maps,
            )?;
            report.extend(build.diagnostics);
            report.soft_bodies_built += 1;
            soft_bodies.push(build.component);
        }

        if report.is_clean() {
            log::info!(target: self.config.log_target.as_str(), "Character '{}': {}", input.name, report);
        } else {
            log::warn!(target: self.config.log_target.as_str(), "Character '{}': {}", input.name, report);
        }

        Ok(CharacterRig {
            name: input.name,
            colliders,
            soft_bodies,
            report,
        })
    }

    /// Processes characters in order. A malformed character is recorded in
    /// [`BatchOutcome::failures`] without stopping the others; cancellation
    /// stops the whole batch.
    pub fn process_batch<'a, I>(&self, inputs: I) -> Result<BatchOutcome, RigError>
    where
        I: IntoIterator<Item = CharacterInput<'a>>,
    {
        let mut outcome = BatchOutcome::default();
        for input in inputs {
            let name = input.name.clone();
            match self.process_character(input) {
                Ok(rig) => {
                    outcome.report.merge(rig.report.clone());
                    outcome.rigs.push(rig);
                }
                Err(e) if e.is_cancelled() => return Err(e),
                Err(e) => {
                    log::error!(target: self.config.log_target.as_str(), "Character '{}' failed: {}", name, e);
                    outcome.failures.push((name, e));
                }
            }
        }
        log::info!(
            target: self.config.log_target.as_str(),
            "Batch done: {} rigged, {} failed; {}",
            outcome.rigs.len(),
            outcome.failures.len(),
            outcome.report
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RigPipeline>();
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = RigConfig::default().with_model_scale(f32::NAN);
        assert!(matches!(
            RigPipeline::new(config),
            Err(ConfigError::Invalid { field: "model_scale", .. })
        ));
    }

    #[test]
    fn splitter_uses_config_epsilon() {
        let pipeline = RigPipeline::new(RigConfig::default().with_morph_epsilon(0.5)).unwrap();
        assert_eq!(pipeline.splitter().morph_epsilon(), 0.5);
    }
}
