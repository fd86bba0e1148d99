//! Vector helpers the scattering code needs beyond what glam provides.

use crate::Vec3;

/// Below this magnitude in every component a vector counts as zero.
const NEAR_ZERO: f32 = 1e-8;

/// True if every component of `v` is smaller than `1e-8` in magnitude.
#[inline]
pub fn near_zero(v: Vec3) -> bool {
    v.x.abs() < NEAR_ZERO && v.y.abs() < NEAR_ZERO && v.z.abs() < NEAR_ZERO
}

/// Mirror `v` about the plane with normal `n` (`n` must be unit length).
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Bend the unit vector `uv` through a surface with unit normal `n`.
///
/// `etai_over_etat` is the ratio of refractive indices (incident over
/// transmitted). The result is split into the components perpendicular and
/// parallel to `n` (Snell's law).
#[inline]
pub fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}
