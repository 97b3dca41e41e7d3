//! Positional hashing for vertex correspondence across buffers.
//!
//! [`spatial_hash`] quantizes a position to millimeter units and mixes the
//! three axes with large primes. It is an equality proxy for vertices that
//! describe the same physical surface point, not a spatial index: distinct
//! quantized positions may collide and no collision resolution is done.
//!
//! [`WeldMap`] uses the hash to collapse coincident vertices (for example the
//! duplicated vertices along a UV seam) into one shared id.

use std::collections::HashMap;

use crate::math::Vec3;

/// Quantization steps per unit (millimeters for meter-scale meshes).
pub const QUANTIZATION_SCALE: f32 = 1000.0;

const PRIME_X: i64 = 73_856_093;
const PRIME_Y: i64 = 19_349_663;
const PRIME_Z: i64 = 83_492_791;

/// Quantizes each axis to integer units of `1 / QUANTIZATION_SCALE`.
///
/// Non-finite coordinates saturate (NaN maps to 0).
pub fn quantize(p: &Vec3) -> [i64; 3] {
    [
        (p.x * QUANTIZATION_SCALE).round() as i64,
        (p.y * QUANTIZATION_SCALE).round() as i64,
        (p.z * QUANTIZATION_SCALE).round() as i64,
    ]
}

/// Hashes a position. Equal quantized positions always hash equally.
pub fn spatial_hash(p: &Vec3) -> i64 {
    let [x, y, z] = quantize(p);
    x.wrapping_mul(PRIME_X) ^ y.wrapping_mul(PRIME_Y) ^ z.wrapping_mul(PRIME_Z)
}

/// Maps every vertex to the id of the first vertex sharing its hash.
///
/// Ids are dense and assigned in first-seen order, so the map is
/// deterministic for a given position array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeldMap {
    vertex_to_id: Vec<u32>,
    id_count: usize,
}

impl WeldMap {
    /// Builds the map over `positions`.
    pub fn build(positions: &[Vec3]) -> Self {
        let mut hash_to_id: HashMap<i64, u32> = HashMap::with_capacity(positions.len());
        let mut vertex_to_id = Vec::with_capacity(positions.len());
        let mut next_id = 0u32;

        for p in positions {
            let id = *hash_to_id.entry(spatial_hash(p)).or_insert_with(|| {
                let id = next_id;
                next_id += 1;
                id
            });
            vertex_to_id.push(id);
        }

        Self {
            vertex_to_id,
            id_count: next_id as usize,
        }
    }

    /// Welded id of `vertex`, if it is in range.
    pub fn id(&self, vertex: u32) -> Option<u32> {
        self.vertex_to_id.get(vertex as usize).copied()
    }

    /// Number of distinct welded ids.
    pub fn id_count(&self) -> usize {
        self.id_count
    }

    /// Welded id per source vertex.
    pub fn vertex_ids(&self) -> &[u32] {
        &self.vertex_to_id
    }
}
