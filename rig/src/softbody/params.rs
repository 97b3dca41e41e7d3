//! Whole-mesh soft-body solver parameters.

use serde::Serialize;

use crate::descriptor::SoftBodyDescriptor;

/// Converts a softness percentage into a `[0, 1]` stiffness.
pub fn stiffness_from_percentage(percentage: f32) -> f32 {
    (1.0 - percentage / 100.0).clamp(0.0, 1.0)
}

/// Global solver settings for one soft body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SoftBodyParameters {
    pub enabled: bool,
    pub use_gravity: bool,
    pub bending_stiffness: f32,
    pub stretching_stiffness: f32,
    pub solver_frequency: f32,
    pub stiffness_frequency: f32,
    pub collision_mass_scale: f32,
    pub friction: f32,
    pub damping: f32,
    pub drag: f32,
    pub world_velocity_scale: f32,
    pub world_acceleration_scale: f32,
    pub tether_limit: f32,
    pub elasticity: f32,
    pub use_self_collision: bool,
    /// Scene units.
    pub self_collision_distance: f32,
}

impl SoftBodyParameters {
    pub fn from_descriptor(d: &SoftBodyDescriptor, model_scale: f32) -> Self {
        Self {
            enabled: d.activate,
            use_gravity: d.use_gravity,
            bending_stiffness: stiffness_from_percentage(d.bending),
            stretching_stiffness: stiffness_from_percentage(d.stretch),
            solver_frequency: d.solver_frequency,
            stiffness_frequency: d.stiffness_frequency,
            collision_mass_scale: d.mass,
            friction: d.friction,
            damping: d.damping,
            drag: d.drag,
            world_velocity_scale: d.inertia,
            world_acceleration_scale: d.inertia,
            tether_limit: d.tether_limit,
            elasticity: d.elasticity,
            use_self_collision: d.use_self_collision,
            self_collision_distance: d.self_collision_margin * model_scale,
        }
    }
}

impl Default for SoftBodyParameters {
    fn default() -> Self {
        Self::from_descriptor(&SoftBodyDescriptor::default(), 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stiffness_clamps() {
        assert_eq!(stiffness_from_percentage(0.0), 1.0);
        assert_eq!(stiffness_from_percentage(25.0), 0.75);
        assert_eq!(stiffness_from_percentage(150.0), 0.0);
        assert_eq!(stiffness_from_percentage(-10.0), 1.0);
    }

    #[test]
    fn descriptor_fields_are_mapped() {
        let d = SoftBodyDescriptor::new("Skirt", "Cloth")
            .with_mass(2.0)
            .with_friction(0.3)
            .with_damping(0.2)
            .with_stiffness(40.0, 10.0)
            .with_solver_frequency(240.0, 20.0)
            .with_self_collision(true, 0.5);
        let p = SoftBodyParameters::from_descriptor(&d, 0.01);
        assert_eq!(p.collision_mass_scale, 2.0);
        assert_eq!(p.friction, 0.3);
        assert_eq!(p.damping, 0.2);
        assert!((p.stretching_stiffness - 0.6).abs() < 1e-6);
        assert!((p.bending_stiffness - 0.9).abs() < 1e-6);
        assert_eq!(p.solver_frequency, 240.0);
        assert_eq!(p.stiffness_frequency, 20.0);
        assert!(p.use_self_collision);
        assert!((p.self_collision_distance - 0.005).abs() < 1e-7);
    }
}
