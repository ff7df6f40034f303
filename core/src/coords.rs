//! Coordinate system adapter
//!
//! The source engine is left-handed with row vectors (`p' = p * M`); the
//! renderer is right-handed with column vectors (`p' = M * p`). Every spatial
//! value that leaves a record passes through one of these functions.
//!
//! Handedness is switched by mirroring Z. For matrices that is the similarity
//! transform `R * M * R` with `R = diag(1, 1, -1, 1)`.

use glam::{Mat4, Quat, Vec3};
use zenview_shared::SourceMatrix;

const MIRROR_Z: Mat4 = Mat4::from_cols_array(&[
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, -1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
]);

/// Convert a source position into renderer space
#[inline]
pub fn convert_position(v: Vec3) -> Vec3 {
    Vec3::new(v.x, v.y, -v.z)
}

/// Convert a source normal into renderer space
#[inline]
pub fn convert_normal(n: Vec3) -> Vec3 {
    convert_position(n)
}

/// Convert a source rotation into renderer space
///
/// Mirroring Z flips the sense of rotation about X and Y, which is the
/// conjugate of the Z-negated quaternion: `(x, y, z, w) -> (-x, -y, z, w)`.
#[inline]
pub fn convert_rotation(q: Quat) -> Quat {
    Quat::from_xyzw(q.x, q.y, -q.z, q.w).conjugate()
}

/// Convert a source transform into a renderer matrix
pub fn convert_transform(source: &SourceMatrix) -> Mat4 {
    // Row-major row-vector data read as columns is already the column-vector form.
    let m = Mat4::from_cols_array(&source.to_array());
    MIRROR_Z * m * MIRROR_Z
}

/// Array helper for `[f32; 3]` record fields
#[inline]
pub fn convert_position_array(v: [f32; 3]) -> Vec3 {
    convert_position(Vec3::from_array(v))
}

/// Array helper for `[f32; 4]` (xyzw) record fields
#[inline]
pub fn convert_rotation_array(q: [f32; 4]) -> Quat {
    convert_rotation(Quat::from_array(q))
}
