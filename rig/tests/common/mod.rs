//! Shared fixtures for rig integration tests.
#![allow(dead_code)]

use rigsmith_core::math::{Mat4, Transform, Vec2, Vec3, Vec4};
use rigsmith_core::mesh::{MeshBuffers, MorphFrame, SkinWeights};
use rigsmith_core::scene::Skeleton;

/// Install a test logger once per process.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Fills every optional channel with values derived from the vertex index,
/// so a misplaced copy shows up as a wrong value.
pub fn with_all_channels(mesh: MeshBuffers) -> MeshBuffers {
    let n = mesh.vertex_count();
    let f = |i: usize| i as f32;
    let uv0 = mesh.positions.iter().map(|p| Vec2::new(p.x / 10.0, p.y)).collect();
    let uv3 = (0..n).map(|i| Vec2::new(f(i), -f(i))).collect();
    let normals = (0..n).map(|i| Vec3::new(0.0, f(i) * 0.01, 1.0).normalize()).collect();
    let tangents = (0..n).map(|i| Vec4::new(1.0, 0.0, 0.0, if i % 2 == 0 { 1.0 } else { -1.0 })).collect();
    let colors = (0..n).map(|i| [f(i) / n as f32, 0.5, 0.25, 1.0]).collect();
    let skin = (0..n)
        .map(|i| SkinWeights {
            joints: [i as u32 % 2, 1, 0, 0],
            weights: [0.75, 0.25, 0.0, 0.0],
        })
        .collect();

    mesh.with_uvs(0, uv0)
        .with_uvs(3, uv3)
        .with_normals(normals)
        .with_tangents(tangents)
        .with_colors(colors)
        .with_skin(skin, vec![Mat4::identity(), Mat4::new_scaling(2.0)])
}

/// `count` quads in a row sharing their vertical edges, one submesh each.
///
/// Column `c` holds vertices `2c` (bottom) and `2c + 1` (top).
pub fn quad_strip(count: u32) -> MeshBuffers {
    let positions = (0..=count)
        .flat_map(|c| [Vec3::new(c as f32, 0.0, 0.0), Vec3::new(c as f32, 1.0, 0.0)])
        .collect();
    let mut mesh = MeshBuffers::new("strip", positions);
    for q in 0..count {
        let (a, b, c, d) = (2 * q, 2 * q + 2, 2 * q + 3, 2 * q + 1);
        mesh = mesh.with_submesh_indices(&[a, b, c, c, d, a]);
    }
    with_all_channels(mesh)
}

/// `count` separate quads, one submesh each, with one morph frame that
/// only moves the quad `morphed`.
pub fn disjoint_quads(count: u32, morphed: u32) -> MeshBuffers {
    let positions: Vec<Vec3> = (0..count)
        .flat_map(|q| {
            let x = q as f32 * 3.0;
            [
                Vec3::new(x, 0.0, 0.0),
                Vec3::new(x + 1.0, 0.0, 0.0),
                Vec3::new(x + 1.0, 1.0, 0.0),
                Vec3::new(x, 1.0, 0.0),
            ]
        })
        .collect();
    let deltas = (0..positions.len())
        .map(|i| {
            if i as u32 / 4 == morphed {
                Vec3::new(0.0, 0.0, 0.25)
            } else {
                Vec3::zeros()
            }
        })
        .collect();

    let mut mesh = MeshBuffers::new("quads", positions);
    for q in 0..count {
        let base = 4 * q;
        mesh = mesh.with_submesh_indices(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    with_all_channels(mesh).with_morph_frame(MorphFrame::new("Puff", 100.0, deltas))
}

/// Hips, spine, head and both upper arms.
pub fn humanoid_skeleton() -> Skeleton {
    let up = |y: f32| Transform::from_translation(Vec3::new(0.0, y, 0.0));
    Skeleton::new()
        .with_joint("CC_Base_Hip", None, up(1.0))
        .with_joint("CC_Base_Spine01", Some("CC_Base_Hip"), up(0.1))
        .with_joint("CC_Base_Head", Some("CC_Base_Spine01"), up(0.5))
        .with_joint(
            "CC_Base_L_Upperarm",
            Some("CC_Base_Spine01"),
            Transform::from_translation(Vec3::new(0.2, 0.35, 0.0)),
        )
        .with_joint(
            "CC_Base_R_Upperarm",
            Some("CC_Base_Spine01"),
            Transform::from_translation(Vec3::new(-0.2, 0.35, 0.0)),
        )
}
