//! Declarative rig descriptors and descriptor lookup.
//!
//! Descriptors are produced by an external configuration parser and are
//! immutable once built. Lengths are in descriptor units (usually
//! centimeters); [`RigConfig::model_scale`](crate::RigConfig::model_scale)
//! converts them to scene units.

use serde::{Deserialize, Serialize};

use rigsmith_core::math::{
    Rotation, Transform, Vec3, rotation_from_array, rotation_from_euler_degrees, rotation_to_array,
};

/// Collider shape family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    #[default]
    Capsule,
    Box,
}

/// Long axis of a capsule in its local space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapsuleAxis {
    X,
    #[default]
    Y,
    Z,
}

impl CapsuleAxis {
    pub fn index(&self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// Unit vector along the axis.
    pub fn direction(&self) -> Vec3 {
        let mut v = Vec3::zeros();
        v[self.index()] = 1.0;
        v
    }
}

/// A bone-relative rigid collider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionShapeDescriptor {
    pub bone_name: String,
    pub shape_name: String,
    /// Advisory flag from the authoring tool.
    pub bone_active: bool,
    pub shape_kind: ShapeKind,
    pub axis: CapsuleAxis,
    pub margin: f32,
    pub friction: f32,
    pub elasticity: f32,
    pub translation: Vec3,
    /// Stored as `[x, y, z, w]`; parsed values are normalized.
    #[serde(with = "rotation_xyzw")]
    pub rotation: Rotation,
    pub scale: Vec3,
    /// Capsule radius.
    pub radius: f32,
    /// Capsule cylinder length, excluding the end caps.
    pub length: f32,
    /// Box size.
    pub extent: Vec3,
}

impl Default for CollisionShapeDescriptor {
    fn default() -> Self {
        Self {
            bone_name: String::new(),
            shape_name: String::new(),
            bone_active: true,
            shape_kind: ShapeKind::Capsule,
            axis: CapsuleAxis::Y,
            margin: 0.0,
            friction: 0.5,
            elasticity: 0.0,
            translation: Vec3::zeros(),
            rotation: Rotation::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            radius: 0.0,
            length: 0.0,
            extent: Vec3::zeros(),
        }
    }
}

impl CollisionShapeDescriptor {
    /// A capsule on `bone`.
    pub fn capsule(
        bone: impl Into<String>,
        shape: impl Into<String>,
        radius: f32,
        length: f32,
    ) -> Self {
        Self {
            bone_name: bone.into(),
            shape_name: shape.into(),
            shape_kind: ShapeKind::Capsule,
            radius,
            length,
            ..Self::default()
        }
    }

    /// A box on `bone`.
    pub fn cuboid(bone: impl Into<String>, shape: impl Into<String>, extent: Vec3) -> Self {
        Self {
            bone_name: bone.into(),
            shape_name: shape.into(),
            shape_kind: ShapeKind::Box,
            extent,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Sets the rotation from authoring-tool Euler angles in degrees.
    #[must_use]
    pub fn with_euler_degrees(mut self, euler: Vec3) -> Self {
        self.rotation = rotation_from_euler_degrees(euler);
        self
    }

    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    #[must_use]
    pub fn with_axis(mut self, axis: CapsuleAxis) -> Self {
        self.axis = axis;
        self
    }

    #[must_use]
    pub fn with_bone_active(mut self, active: bool) -> Self {
        self.bone_active = active;
        self
    }

    #[must_use]
    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    #[must_use]
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    #[must_use]
    pub fn with_elasticity(mut self, elasticity: f32) -> Self {
        self.elasticity = elasticity;
        self
    }

    /// Transform in descriptor space, with translation converted by
    /// `model_scale`.
    pub fn source_transform(&self, model_scale: f32) -> Transform {
        Transform::from_translation(self.translation * model_scale)
            .with_rotation(self.rotation)
            .with_scale(self.scale)
    }
}

mod rotation_xyzw {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{Rotation, rotation_from_array, rotation_to_array};

    pub fn serialize<S: Serializer>(rotation: &Rotation, serializer: S) -> Result<S::Ok, S::Error> {
        rotation_to_array(rotation).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Rotation, D::Error> {
        <[f32; 4]>::deserialize(deserializer).map(rotation_from_array)
    }
}

/// Soft-body settings for one material of one mesh.
///
/// `stretch` and `bending` are percentages of softness, 0 being fully stiff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoftBodyDescriptor {
    pub mesh_name: String,
    pub material_name: String,
    pub activate: bool,
    pub use_gravity: bool,
    /// Path of the grayscale weight map, resolved by a
    /// [`WeightMapSource`](crate::WeightMapSource).
    pub weight_map_path: Option<String>,
    pub mass: f32,
    pub friction: f32,
    pub damping: f32,
    pub drag: f32,
    pub solver_frequency: f32,
    pub tether_limit: f32,
    pub elasticity: f32,
    pub stretch: f32,
    pub bending: f32,
    pub inertia: f32,
    pub use_rigid_collision: bool,
    pub rigid_collision_margin: f32,
    pub use_self_collision: bool,
    pub self_collision_margin: f32,
    pub stiffness_frequency: f32,
}

impl Default for SoftBodyDescriptor {
    fn default() -> Self {
        Self {
            mesh_name: String::new(),
            material_name: String::new(),
            activate: true,
            use_gravity: true,
            weight_map_path: None,
            mass: 1.0,
            friction: 0.5,
            damping: 0.0,
            drag: 0.05,
            solver_frequency: 120.0,
            tether_limit: 1.1,
            elasticity: 0.0,
            stretch: 0.0,
            bending: 0.0,
            inertia: 1.0,
            use_rigid_collision: true,
            rigid_collision_margin: 1.0,
            use_self_collision: false,
            self_collision_margin: 0.0,
            stiffness_frequency: 10.0,
        }
    }
}

impl SoftBodyDescriptor {
    pub fn new(mesh: impl Into<String>, material: impl Into<String>) -> Self {
        Self {
            mesh_name: mesh.into(),
            material_name: material.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_weight_map(mut self, path: impl Into<String>) -> Self {
        self.weight_map_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    #[must_use]
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    #[must_use]
    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    #[must_use]
    pub fn with_stiffness(mut self, stretch: f32, bending: f32) -> Self {
        self.stretch = stretch;
        self.bending = bending;
        self
    }

    #[must_use]
    pub fn with_solver_frequency(mut self, solver: f32, stiffness: f32) -> Self {
        self.solver_frequency = solver;
        self.stiffness_frequency = stiffness;
        self
    }

    #[must_use]
    pub fn with_rigid_collision(mut self, enabled: bool, margin: f32) -> Self {
        self.use_rigid_collision = enabled;
        self.rigid_collision_margin = margin;
        self
    }

    #[must_use]
    pub fn with_self_collision(mut self, enabled: bool, margin: f32) -> Self {
        self.use_self_collision = enabled;
        self.self_collision_margin = margin;
        self
    }

    /// Whether this descriptor targets `mesh`/`material`.
    pub fn matches(&self, mesh: &str, material: &str) -> bool {
        self.mesh_name == mesh && self.material_name == material
    }
}

/// Result of looking a descriptor up by mesh and material.
#[derive(Debug, Clone, PartialEq)]
pub enum DescriptorLookup<'a> {
    NotFound,
    Found(&'a SoftBodyDescriptor),
    /// More than one descriptor matched, in declaration order.
    Ambiguous(Vec<&'a SoftBodyDescriptor>),
}

/// All soft-body descriptors of a character.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SoftBodyDescriptorSet {
    descriptors: Vec<SoftBodyDescriptor>,
}

impl SoftBodyDescriptorSet {
    pub fn new(descriptors: Vec<SoftBodyDescriptor>) -> Self {
        Self { descriptors }
    }

    #[must_use]
    pub fn with(mut self, descriptor: SoftBodyDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SoftBodyDescriptor> {
        self.descriptors.iter()
    }

    /// Names of meshes that have at least one descriptor, first-seen order.
    pub fn mesh_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for d in &self.descriptors {
            if !names.contains(&d.mesh_name.as_str()) {
                names.push(&d.mesh_name);
            }
        }
        names
    }

    /// Finds the descriptors keyed by `(mesh, material)`.
    pub fn lookup(&self, mesh: &str, material: &str) -> DescriptorLookup<'_> {
        let mut matches: Vec<&SoftBodyDescriptor> = self
            .descriptors
            .iter()
            .filter(|d| d.matches(mesh, material))
            .collect();
        match matches.len() {
            0 => DescriptorLookup::NotFound,
            1 => DescriptorLookup::Found(matches.remove(0)),
            _ => DescriptorLookup::Ambiguous(matches),
        }
    }
}

impl FromIterator<SoftBodyDescriptor> for SoftBodyDescriptorSet {
    fn from_iter<I: IntoIterator<Item = SoftBodyDescriptor>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Marker appended by engines to per-renderer material copies.
pub const INSTANCE_MARKER: &str = " (Instance)";

/// Reduces a renderer's material name to the name descriptors are keyed by.
///
/// Strips trailing instance markers, then the first of `pass_suffixes` that
/// ends the name, so every render pass of a material shares one descriptor.
pub fn resolve_material_name<'a, S: AsRef<str>>(name: &'a str, pass_suffixes: &[S]) -> &'a str {
    let mut name = name;
    while let Some(stripped) = name.strip_suffix(INSTANCE_MARKER) {
        name = stripped;
    }
    for suffix in pass_suffixes {
        let suffix = suffix.as_ref();
        if suffix.is_empty() {
            continue;
        }
        if let Some(stripped) = name.strip_suffix(suffix) {
            return stripped;
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn material_suffixes_are_stripped() {
        let suffixes = ["_2nd_pass"];
        assert_eq!(resolve_material_name("Hair_2nd_pass", &suffixes), "Hair");
        assert_eq!(resolve_material_name("Hair", &suffixes), "Hair");
        assert_eq!(
            resolve_material_name("Hair_2nd_pass (Instance)", &suffixes),
            "Hair"
        );
        assert_eq!(resolve_material_name("Hair_2nd_pass", &[] as &[&str]), "Hair_2nd_pass");
    }

    #[test]
    fn only_first_matching_suffix_is_stripped() {
        let suffixes = ["_pass", "_2nd_pass"];
        assert_eq!(resolve_material_name("Skirt_2nd_pass", &suffixes), "Skirt_2nd");
        assert_eq!(resolve_material_name("_pass", &suffixes), "");
    }

    #[test]
    fn lookup_distinguishes_outcomes() {
        let set = SoftBodyDescriptorSet::default()
            .with(SoftBodyDescriptor::new("Skirt", "Cloth"))
            .with(SoftBodyDescriptor::new("Hair", "Strands").with_mass(1.0))
            .with(SoftBodyDescriptor::new("Hair", "Strands").with_mass(3.0));

        assert!(matches!(set.lookup("Skirt", "Cloth"), DescriptorLookup::Found(_)));
        assert_eq!(set.lookup("Skirt", "Lace"), DescriptorLookup::NotFound);
        match set.lookup("Hair", "Strands") {
            DescriptorLookup::Ambiguous(list) => {
                assert_eq!(list.len(), 2);
                assert_eq!(list[1].mass, 3.0);
            }
            other => panic!("expected ambiguous, got {other:?}"),
        }
        assert_eq!(set.mesh_names(), vec!["Skirt", "Hair"]);
    }

    #[test]
    fn collision_descriptor_from_toml() {
        let d: CollisionShapeDescriptor = toml::from_str(
            r#"
            bone_name = "CC_Base_Head"
            shape_name = "Head_Box"
            shape_kind = "box"
            rotation = [0.0, 0.0, 0.0, 2.0]
            extent = [10.0, 20.0, 30.0]
            "#,
        )
        .unwrap();
        assert_eq!(d.shape_kind, ShapeKind::Box);
        assert_eq!(d.rotation, Rotation::identity());
        assert_eq!(d.extent, Vec3::new(10.0, 20.0, 30.0));
        assert!(d.bone_active);
        assert_eq!(d.scale, Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn soft_body_descriptor_defaults_fill_gaps() {
        let d: SoftBodyDescriptor = toml::from_str(
            r#"
            mesh_name = "Skirt"
            material_name = "Cloth"
            weight_map_path = "textures/skirt_weight.png"
            bending = 30.0
            "#,
        )
        .unwrap();
        assert_eq!(d.weight_map_path.as_deref(), Some("textures/skirt_weight.png"));
        assert_eq!(d.bending, 30.0);
        assert_eq!(d.mass, SoftBodyDescriptor::default().mass);
        assert!(d.use_rigid_collision);
    }

    #[test]
    fn capsule_axis_direction() {
        assert_eq!(CapsuleAxis::X.direction(), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(CapsuleAxis::Z.index(), 2);
    }

    #[test]
    fn source_transform_scales_translation_only() {
        let d = CollisionShapeDescriptor::capsule("Spine", "SpineCapsule", 5.0, 10.0)
            .with_translation(Vec3::new(10.0, 0.0, -20.0))
            .with_scale(Vec3::new(2.0, 2.0, 2.0));
        let t = d.source_transform(0.01);
        assert!((t.translation - Vec3::new(0.1, 0.0, -0.2)).norm() < 1e-6);
        assert_eq!(t.scale, Vec3::new(2.0, 2.0, 2.0));
    }
}
