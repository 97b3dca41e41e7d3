//! Per-particle soft-body constraints sampled from weight maps.

use std::sync::Arc;

use serde::Serialize;

use rigsmith_core::cancellation::{CancellationToken, checkpoint};
use rigsmith_core::math::Vec2;
use rigsmith_core::mesh::{MeshBuffers, WeldMap};
use rigsmith_core::texture::CpuTexture;
use rigsmith_core::{profile_function, profile_scope};

use super::params::SoftBodyParameters;
use super::weight_map::WeightMapSource;
use crate::collider::ColliderPrimitive;
use crate::config::{AmbiguityPolicy, ParameterSelection, RigConfig};
use crate::descriptor::{
    DescriptorLookup, SoftBodyDescriptor, SoftBodyDescriptorSet, resolve_material_name,
};
use crate::diagnostics::RigDiagnostic;
use crate::error::RigError;

/// Distance constraints of one cloth particle, in scene units.
///
/// Both zero means the particle is pinned to its skinned position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ClothCoefficient {
    pub max_distance: f32,
    pub collision_sphere_distance: f32,
}

/// A mesh to turn into a soft body, with its per-submesh material names.
#[derive(Debug, Clone)]
pub struct SoftBodyTarget<'a> {
    /// Name descriptors are keyed by. Defaults to the mesh name.
    pub mesh_name: String,
    pub mesh: &'a MeshBuffers,
    /// Material name of each submesh, in submesh order.
    pub materials: Vec<String>,
}

impl<'a> SoftBodyTarget<'a> {
    pub fn new<I, S>(mesh: &'a MeshBuffers, materials: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mesh_name: mesh.name.clone(),
            mesh,
            materials: materials.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn with_mesh_name(mut self, name: impl Into<String>) -> Self {
        self.mesh_name = name.into();
        self
    }
}

/// Soft-body settings to attach to a mesh's renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoftBodyComponent {
    pub mesh_name: String,
    /// Cloth particle of every mesh vertex. Coincident vertices share one.
    pub cloth_vertex_of: Vec<u32>,
    /// One entry per cloth particle.
    pub coefficients: Vec<ClothCoefficient>,
    pub parameters: SoftBodyParameters,
    /// Indices into the collider slice passed to the builder.
    pub capsule_colliders: Vec<usize>,
    /// Submeshes that matched a descriptor.
    pub matched_submeshes: Vec<usize>,
}

impl SoftBodyComponent {
    pub fn particle_count(&self) -> usize {
        self.coefficients.len()
    }

    /// Coefficient of mesh vertex `vertex`.
    pub fn coefficient_for_vertex(&self, vertex: usize) -> Option<&ClothCoefficient> {
        let particle = *self.cloth_vertex_of.get(vertex)?;
        self.coefficients.get(particle as usize)
    }

    /// Number of particles that are free to move.
    pub fn free_particle_count(&self) -> usize {
        self.coefficients
            .iter()
            .filter(|c| c.max_distance > 0.0)
            .count()
    }
}

/// Output of [`SoftBodyRigBuilder::build`].
#[derive(Debug, Clone, PartialEq)]
pub struct SoftBodyBuild {
    pub component: SoftBodyComponent,
    pub diagnostics: Vec<RigDiagnostic>,
}

/// Builds [`SoftBodyComponent`]s from descriptors and weight maps.
#[derive(Debug, Clone)]
pub struct SoftBodyRigBuilder {
    model_scale: f32,
    ambiguity: AmbiguityPolicy,
    selection: ParameterSelection,
    pass_suffixes: Vec<String>,
    log_target: String,
    cancellation: Option<CancellationToken>,
}

impl SoftBodyRigBuilder {
    pub fn new(model_scale: f32) -> Self {
        Self {
            model_scale,
            ambiguity: AmbiguityPolicy::default(),
            selection: ParameterSelection::default(),
            pass_suffixes: Vec::new(),
            log_target: "rigsmith".into(),
            cancellation: None,
        }
    }

    pub fn from_config(config: &RigConfig) -> Self {
        Self::new(config.model_scale)
            .with_ambiguity_policy(config.ambiguous_descriptors)
            .with_parameter_selection(config.solver_parameters)
            .with_pass_suffixes(config.pass_suffixes.clone())
            .with_log_target(config.log_target.clone())
    }

    #[must_use]
    pub fn with_ambiguity_policy(mut self, policy: AmbiguityPolicy) -> Self {
        self.ambiguity = policy;
        self
    }

    #[must_use]
    pub fn with_parameter_selection(mut self, selection: ParameterSelection) -> Self {
        self.selection = selection;
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

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Builds the soft body for `target`.
    ///
    /// Coincident vertices are welded into one particle, every particle
    /// starts pinned, and each submesh with a matching descriptor releases
    /// its particles by the weight map's green channel. The capsules among
    /// `colliders` become the rigid-collision set.
    ///
    /// Fails only on malformed meshes or cancellation. Lookup misses are
    /// returned as diagnostics.
    pub fn build<W: WeightMapSource + ?Sized>(
        &self,
        target: &SoftBodyTarget<'_>,
        descriptors: &SoftBodyDescriptorSet,
        colliders: &[ColliderPrimitive],
        weight_maps: &W,
    ) -> Result<SoftBodyBuild, RigError> {
        profile_function!();
        let log_target = self.log_target.as_str();
        let mesh = target.mesh;
        mesh.validate()?;
        checkpoint(self.cancellation.as_ref())?;

        let weld = {
            profile_scope!("weld_vertices");
            WeldMap::build(&mesh.positions)
        };
        let particle_of = weld.vertex_ids();
        let mut coefficients = vec![ClothCoefficient::default(); weld.id_count()];
        let mut diagnostics = Vec::new();
        let mut parameters = None;
        let mut matched_submeshes = Vec::new();

        let uvs = mesh.uv_channel(0);
        if uvs.is_empty() {
            log::warn!(target: log_target, "Mesh '{}' has no UVs, sampling weight maps at the origin", target.mesh_name);
        }

        for submesh in 0..mesh.submesh_count() {
            let raw_material = target.materials.get(submesh).map_or("", String::as_str);
            let material = resolve_material_name(raw_material, &self.pass_suffixes);
            let Some(descriptor) = self.select_descriptor(
                &target.mesh_name,
                material,
                submesh,
                descriptors,
                &mut diagnostics,
            ) else {
                continue;
            };

            if descriptor.use_rigid_collision {
                let weights = self.resolve_weight_map(descriptor, weight_maps, &mut diagnostics);
                let scale = descriptor.rigid_collision_margin * self.model_scale;
                checkpoint(self.cancellation.as_ref())?;
                profile_scope!("sample_weight_map");
                for &index in mesh.submesh_indices(submesh)? {
                    let uv = uvs.get(index as usize).copied().unwrap_or_else(Vec2::zeros);
                    let distance = scale * weights.sample_green_nearest(&uv);
                    coefficients[particle_of[index as usize] as usize] = ClothCoefficient {
                        max_distance: distance,
                        collision_sphere_distance: distance,
                    };
                }
            }

            if parameters.is_none() || self.selection == ParameterSelection::LastMatched {
                parameters = Some(SoftBodyParameters::from_descriptor(descriptor, self.model_scale));
            }
            matched_submeshes.push(submesh);
        }

        let parameters = parameters.unwrap_or_else(|| {
            log::debug!(target: log_target, "No descriptor matched '{}', using default parameters", target.mesh_name);
            SoftBodyParameters::default()
        });

        let capsule_colliders: Vec<usize> = colliders
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_capsule())
            .map(|(i, _)| i)
            .collect();

        let component = SoftBodyComponent {
            mesh_name: target.mesh_name.clone(),
            cloth_vertex_of: particle_of.to_vec(),
            coefficients,
            parameters,
            capsule_colliders,
            matched_submeshes,
        };
        log::debug!(
            target: log_target,
            "Soft body '{}': {} particles ({} free) from {} vertices, {} capsule colliders",
            component.mesh_name,
            component.particle_count(),
            component.free_particle_count(),
            mesh.vertex_count(),
            component.capsule_colliders.len()
        );

        Ok(SoftBodyBuild {
            component,
            diagnostics,
        })
    }

    fn select_descriptor<'d>(
        &self,
        mesh_name: &str,
        material: &str,
        submesh: usize,
        descriptors: &'d SoftBodyDescriptorSet,
        diagnostics: &mut Vec<RigDiagnostic>,
    ) -> Option<&'d SoftBodyDescriptor> {
        let log_target = self.log_target.as_str();
        match descriptors.lookup(mesh_name, material) {
            DescriptorLookup::Found(d) => Some(d),
            DescriptorLookup::NotFound => {
                log::warn!(target: log_target, "No soft-body descriptor for {}/{} (submesh {})", mesh_name, material, submesh);
                diagnostics.push(RigDiagnostic::UnresolvedMaterialDescriptor {
                    mesh: mesh_name.to_string(),
                    material: material.to_string(),
                    submesh,
                });
                None
            }
            DescriptorLookup::Ambiguous(matches) => {
                log::warn!(
                    target: log_target,
                    "{} soft-body descriptors match {}/{} (submesh {}), policy {:?}",
                    matches.len(),
                    mesh_name,
                    material,
                    submesh,
                    self.ambiguity
                );
                diagnostics.push(RigDiagnostic::AmbiguousMaterialDescriptor {
                    mesh: mesh_name.to_string(),
                    material: material.to_string(),
                    submesh,
                    count: matches.len(),
                });
                self.ambiguity.resolve(&matches)
            }
        }
    }

    fn resolve_weight_map<W: WeightMapSource + ?Sized>(
        &self,
        descriptor: &SoftBodyDescriptor,
        weight_maps: &W,
        diagnostics: &mut Vec<RigDiagnostic>,
    ) -> Arc<CpuTexture> {
        let path = descriptor.weight_map_path.as_deref().unwrap_or_default();
        if let Some(map) = weight_maps.weight_map(path) {
            return map;
        }
        log::warn!(
            target: self.log_target.as_str(),
            "Weight map '{}' for {}/{} not found, pinning material",
            path,
            descriptor.mesh_name,
            descriptor.material_name
        );
        diagnostics.push(RigDiagnostic::MissingWeightMap {
            mesh: descriptor.mesh_name.clone(),
            material: descriptor.material_name.clone(),
            path: path.to_string(),
        });
        Arc::new(CpuTexture::black(1, 1))
    }
}

impl Default for SoftBodyRigBuilder {
    fn default() -> Self {
        Self::from_config(&RigConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::softbody::WeightMapLibrary;
    use rigsmith_core::math::Vec3;
    use rigsmith_core::mesh::generators::generate_box;

    /// Two triangles sharing an edge, with the shared edge duplicated as a
    /// UV seam. UVs put vertices 0..3 on the left half and 3..6 on the right.
    fn seamed_strip() -> MeshBuffers {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let uvs = vec![
            Vec2::new(0.1, 0.1),
            Vec2::new(0.4, 0.1),
            Vec2::new(0.1, 0.9),
            Vec2::new(0.6, 0.1),
            Vec2::new(0.9, 0.9),
            Vec2::new(0.6, 0.9),
        ];
        MeshBuffers::new("Strip", positions)
            .with_uvs(0, uvs)
            .with_submesh_indices(&[0, 1, 2])
            .with_submesh_indices(&[3, 4, 5])
    }

    /// 2x1 map: left pixel green 0, right pixel green 255.
    fn half_map() -> CpuTexture {
        CpuTexture::new(2, 1, vec![0, 0, 0, 255, 0, 255, 0, 255]).unwrap()
    }

    #[test]
    fn coincident_vertices_share_a_particle() {
        let mesh = seamed_strip();
        let target = SoftBodyTarget::new(&mesh, ["Cloth", "Cloth"]);
        let build = SoftBodyRigBuilder::new(1.0)
            .build(&target, &SoftBodyDescriptorSet::default(), &[], &WeightMapLibrary::new())
            .unwrap();
        assert_eq!(build.component.cloth_vertex_of, vec![0, 1, 2, 1, 3, 2]);
        assert_eq!(build.component.particle_count(), 4);
    }

    #[test]
    fn weights_set_distances_last_write_wins() {
        let mesh = seamed_strip();
        let target = SoftBodyTarget::new(&mesh, ["Cloth", "Cloth"]);
        let descriptors = SoftBodyDescriptorSet::default().with(
            SoftBodyDescriptor::new("Strip", "Cloth")
                .with_weight_map("strip.png")
                .with_rigid_collision(true, 50.0),
        );
        let maps = WeightMapLibrary::new().with_map("strip.png", half_map());
        let build = SoftBodyRigBuilder::new(0.01)
            .build(&target, &descriptors, &[], &maps)
            .unwrap();

        let c = &build.component;
        assert!(build.diagnostics.is_empty());
        assert_eq!(c.matched_submeshes, vec![0, 1]);
        // Particle 0 is only in the left half.
        assert_eq!(c.coefficients[0].max_distance, 0.0);
        // Shared particles were last written by the right half.
        assert!((c.coefficients[1].max_distance - 0.5).abs() < 1e-6);
        assert!((c.coefficients[2].collision_sphere_distance - 0.5).abs() < 1e-6);
        assert!((c.coefficient_for_vertex(4).unwrap().max_distance - 0.5).abs() < 1e-6);
    }

    #[test]
    fn rigid_collision_off_leaves_particles_pinned() {
        let mesh = seamed_strip();
        let target = SoftBodyTarget::new(&mesh, ["Cloth", "Cloth"]);
        let descriptors = SoftBodyDescriptorSet::default().with(
            SoftBodyDescriptor::new("Strip", "Cloth")
                .with_weight_map("strip.png")
                .with_rigid_collision(false, 50.0),
        );
        let maps = WeightMapLibrary::new().with_map("strip.png", half_map());
        let build = SoftBodyRigBuilder::new(1.0)
            .build(&target, &descriptors, &[], &maps)
            .unwrap();
        assert_eq!(build.component.free_particle_count(), 0);
        assert_eq!(build.component.matched_submeshes, vec![0, 1]);
    }

    #[test]
    fn missing_weight_map_pins_and_reports() {
        let mesh = generate_box(0.5);
        let target = SoftBodyTarget::new(&mesh, ["A", "B"]).with_mesh_name("Body");
        let descriptors = SoftBodyDescriptorSet::default()
            .with(SoftBodyDescriptor::new("Body", "A").with_weight_map("missing.png"));
        let build = SoftBodyRigBuilder::new(1.0)
            .build(&target, &descriptors, &[], &WeightMapLibrary::new())
            .unwrap();

        assert_eq!(build.component.free_particle_count(), 0);
        assert_eq!(build.component.matched_submeshes, vec![0]);
        assert!(build.diagnostics.contains(&RigDiagnostic::MissingWeightMap {
            mesh: "Body".into(),
            material: "A".into(),
            path: "missing.png".into(),
        }));
        assert!(build.diagnostics.contains(&RigDiagnostic::UnresolvedMaterialDescriptor {
            mesh: "Body".into(),
            material: "B".into(),
            submesh: 1,
        }));
    }

    #[test]
    fn pass_suffix_shares_descriptor() {
        let mesh = generate_box(0.5);
        let target = SoftBodyTarget::new(&mesh, ["Hair", "Hair_2nd_pass (Instance)"]);
        let descriptors = SoftBodyDescriptorSet::default().with(
            SoftBodyDescriptor::new("box", "Hair").with_weight_map("hair.png"),
        );
        let maps = WeightMapLibrary::new()
            .with_map("hair.png", CpuTexture::solid(4, 4, [0, 255, 0, 255]));
        let build = SoftBodyRigBuilder::default()
            .build(&target, &descriptors, &[], &maps)
            .unwrap();
        assert_eq!(build.component.matched_submeshes, vec![0, 1]);
        assert_eq!(build.component.free_particle_count(), 8);
    }

    #[test]
    fn parameter_selection_first_or_last() {
        let mesh = generate_box(0.5);
        let target = SoftBodyTarget::new(&mesh, ["A", "B"]);
        let descriptors = SoftBodyDescriptorSet::default()
            .with(SoftBodyDescriptor::new("box", "A").with_mass(1.0))
            .with(SoftBodyDescriptor::new("box", "B").with_mass(5.0));
        let maps = WeightMapLibrary::new();

        let last = SoftBodyRigBuilder::new(1.0)
            .build(&target, &descriptors, &[], &maps)
            .unwrap();
        assert_eq!(last.component.parameters.collision_mass_scale, 5.0);

        let first = SoftBodyRigBuilder::new(1.0)
            .with_parameter_selection(ParameterSelection::FirstMatched)
            .build(&target, &descriptors, &[], &maps)
            .unwrap();
        assert_eq!(first.component.parameters.collision_mass_scale, 1.0);
    }

    #[test]
    fn ambiguous_descriptors_follow_policy() {
        let mesh = generate_box(0.5);
        let target = SoftBodyTarget::new(&mesh, ["A", "A"]);
        let descriptors = SoftBodyDescriptorSet::default()
            .with(SoftBodyDescriptor::new("box", "A").with_mass(1.0))
            .with(SoftBodyDescriptor::new("box", "A").with_mass(2.0));
        let maps = WeightMapLibrary::new();

        let skipped = SoftBodyRigBuilder::new(1.0)
            .with_ambiguity_policy(AmbiguityPolicy::Skip)
            .build(&target, &descriptors, &[], &maps)
            .unwrap();
        assert!(skipped.component.matched_submeshes.is_empty());
        assert_eq!(skipped.diagnostics.len(), 2);
        assert_eq!(skipped.component.parameters, SoftBodyParameters::default());

        let last = SoftBodyRigBuilder::new(1.0)
            .with_ambiguity_policy(AmbiguityPolicy::Last)
            .build(&target, &descriptors, &[], &maps)
            .unwrap();
        assert_eq!(last.component.parameters.collision_mass_scale, 2.0);
    }

    #[test]
    fn cancelled_build_fails() {
        let token = CancellationToken::new();
        token.cancel();
        let mesh = generate_box(0.5);
        let result = SoftBodyRigBuilder::new(1.0)
            .with_cancellation(token)
            .build(
                &SoftBodyTarget::new(&mesh, ["A", "B"]),
                &SoftBodyDescriptorSet::default(),
                &[],
                &WeightMapLibrary::new(),
            );
        assert!(result.unwrap_err().is_cancelled());
    }
}
