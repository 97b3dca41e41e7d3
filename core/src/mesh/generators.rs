//! Mesh generators for common shapes.
//!
//! These produce fully populated [`MeshBuffers`] for tests, benchmarks and
//! placeholder assets.

use std::f32::consts::PI;

use crate::math::{Mat4, Vec2, Vec3};

use super::buffers::{MeshBuffers, SkinWeights};

/// Generate an 8-vertex box split into two submeshes.
///
/// Submesh 0 holds the -Z, +Z and -X faces, submesh 1 the +X, -Y and +Y
/// faces; each has 6 triangles. Vertices are shared between faces, normals
/// point away from the center, UVs are a planar XY projection, and every
/// vertex is bound to joint 0.
pub fn generate_box(half_extent: f32) -> MeshBuffers {
    let h = half_extent;
    let positions: Vec<Vec3> = (0..8)
        .map(|i| {
            Vec3::new(
                if i & 1 == 0 { -h } else { h },
                if i & 2 == 0 { -h } else { h },
                if i & 4 == 0 { -h } else { h },
            )
        })
        .collect();
    let normals = positions.iter().map(|p| p.normalize()).collect();
    let uvs = positions
        .iter()
        .map(|p| Vec2::new(p.x / (2.0 * h) + 0.5, p.y / (2.0 * h) + 0.5))
        .collect();

    #[rustfmt::skip]
    let first: [u32; 18] = [
        0, 2, 3, 3, 1, 0, // -Z
        4, 5, 7, 7, 6, 4, // +Z
        0, 4, 6, 6, 2, 0, // -X
    ];
    #[rustfmt::skip]
    let second: [u32; 18] = [
        1, 3, 7, 7, 5, 1, // +X
        0, 1, 5, 5, 4, 0, // -Y
        2, 6, 7, 7, 3, 2, // +Y
    ];

    MeshBuffers::new("box", positions)
        .with_uvs(0, uvs)
        .with_normals(normals)
        .with_skin(vec![SkinWeights::single(0); 8], vec![Mat4::identity()])
        .with_submesh_indices(&first)
        .with_submesh_indices(&second)
}

/// Generate a UV sphere.
///
/// Creates a sphere with the given radius, number of longitudinal segments,
/// and number of latitudinal rings. The seam column and the pole rows are
/// duplicated, so coincident vertices exist. Triangles of the upper half of
/// the rings form submesh 0, the lower half submesh 1.
///
/// # Arguments
///
/// * `radius` - Sphere radius
/// * `segments` - Number of longitudinal segments (around the equator)
/// * `rings` - Number of latitudinal rings (from pole to pole), at least 2
pub fn generate_sphere(radius: f32, segments: u32, rings: u32) -> MeshBuffers {
    let rings = rings.max(2);
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();

    for ring in 0..=rings {
        let theta = ring as f32 * PI / rings as f32;
        let sin_theta = theta.sin();
        let cos_theta = theta.cos();

        for segment in 0..=segments {
            let phi = segment as f32 * 2.0 * PI / segments as f32;
            let n = Vec3::new(sin_theta * phi.cos(), cos_theta, sin_theta * phi.sin());
            positions.push(n * radius);
            normals.push(n);
            uvs.push(Vec2::new(
                segment as f32 / segments as f32,
                1.0 - ring as f32 / rings as f32,
            ));
        }
    }

    let mut upper = Vec::new();
    let mut lower = Vec::new();
    for ring in 0..rings {
        let target = if ring < rings / 2 { &mut upper } else { &mut lower };
        for segment in 0..segments {
            let current = ring * (segments + 1) + segment;
            let next = current + segments + 1;

            target.extend([current, next, current + 1]);
            target.extend([current + 1, next, next + 1]);
        }
    }

    let vertex_count = positions.len();
    MeshBuffers::new("sphere", positions)
        .with_uvs(0, uvs)
        .with_normals(normals)
        .with_skin(
            vec![SkinWeights::single(0); vertex_count],
            vec![Mat4::identity()],
        )
        .with_submesh_indices(&upper)
        .with_submesh_indices(&lower)
}
