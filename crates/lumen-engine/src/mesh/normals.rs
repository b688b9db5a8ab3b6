use glam::Vec3;

use super::{MeshError, FLOATS_PER_TRIANGLE};

/// Derives one unit normal per vertex occurrence of a triangle soup.
///
/// Each triangle's face normal (normalized `(v1 - v0) × (v2 - v0)`) is added to
/// the slots of its own three occurrences, then every slot is normalized.
/// Slots are indexed by occurrence, never by position, so corners shared
/// between triangles keep independent normals.
///
/// Degenerate (zero-area) triangles contribute a zero vector and their
/// occurrences come out as `Vec3::ZERO`, which lights to nothing but ambient.
pub fn synthesize_normals(positions: &[f32]) -> Result<Vec<Vec3>, MeshError> {
    if positions.len() % FLOATS_PER_TRIANGLE != 0 {
        return Err(MeshError::PartialTriangle {
            attribute: "position",
            len: positions.len(),
        });
    }

    let mut normals = vec![Vec3::ZERO; positions.len() / 3];

    for (t, tri) in positions.chunks_exact(FLOATS_PER_TRIANGLE).enumerate() {
        let v0 = Vec3::from_slice(&tri[0..3]);
        let v1 = Vec3::from_slice(&tri[3..6]);
        let v2 = Vec3::from_slice(&tri[6..9]);

        let face = (v1 - v0).cross(v2 - v0).normalize_or_zero();

        let first = t * 3;
        for slot in &mut normals[first..first + 3] {
            *slot += face;
        }
    }

    for n in &mut normals {
        *n = n.normalize_or_zero();
    }

    Ok(normals)
}
