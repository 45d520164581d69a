//! Quaternion algebra. Storage is a `Vec4` with `(x, y, z, w)` layout,
//! matching the original's reuse of `struct vec4` for rotations.
//!
//! `mul_from_vec3`, `rotate_vec3`, `inv_rotate_vec3` are grounded in
//! `original_source/quat.c`. `mul`, `from_vectors`, `slerp` are not present
//! in the retrieved source and are built directly from the documented
//! formulas.

use crate::hw_math;
use crate::vec3::Vec3;
use crate::vec4::Vec4;

pub type Quat = Vec4;

pub const IDENTITY: Quat = Vec4 { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

fn invert(q: Quat) -> Quat {
    Vec4::new(-q.x, -q.y, -q.z, q.w)
}

/// `q * v`, treating `v` as the pure quaternion `(v, 0)`. Returns the
/// full `vec4` product, not yet extracted back to a vector.
pub fn mul_from_vec3(q: Quat, v: Vec3) -> Vec4 {
    Vec4::new(
        q.y * v.z - q.z * v.y + q.w * v.x,
        q.z * v.x - q.x * v.z + q.w * v.y,
        q.x * v.y - q.y * v.x + q.w * v.z,
        -(q.x * v.x + q.y * v.y + q.z * v.z),
    )
}

fn mul_to_vec3(q0: Vec4, q1: Vec4) -> Vec3 {
    Vec3::new(
        q0.w * q1.x + q0.x * q1.w + q0.y * q1.z - q0.z * q1.y,
        q0.w * q1.y + q0.y * q1.w + q0.z * q1.x - q0.x * q1.z,
        q0.w * q1.z + q0.z * q1.w + q0.x * q1.y - q0.y * q1.x,
    )
}

/// Full Hamilton product of two quaternions.
pub fn mul(q0: Quat, q1: Quat) -> Quat {
    Vec4::new(
        q0.w * q1.x + q0.x * q1.w + q0.y * q1.z - q0.z * q1.y,
        q0.w * q1.y - q0.x * q1.z + q0.y * q1.w + q0.z * q1.x,
        q0.w * q1.z + q0.x * q1.y - q0.y * q1.x + q0.z * q1.w,
        q0.w * q1.w - q0.x * q1.x - q0.y * q1.y - q0.z * q1.z,
    )
}

pub fn rotate_vec3(q: Quat, v: Vec3) -> Vec3 {
    let tmp = mul_from_vec3(q, v);
    let q_inv = invert(q);
    mul_to_vec3(tmp, q_inv)
}

pub fn inv_rotate_vec3(q: Quat, v: Vec3) -> Vec3 {
    let q_inv = invert(q);
    let tmp = mul_from_vec3(q_inv, v);
    mul_to_vec3(tmp, q)
}

/// The rotation taking unit vector `from` to unit vector `to`.
pub fn from_vectors(from: Vec3, to: Vec3) -> Quat {
    let s = hw_math::sqrt(2.0 * (from.dot(to) + 1.0));
    if s <= f32::EPSILON {
        return IDENTITY;
    }
    let v = from.cross(to).scale(1.0 / s);
    Vec4::new(v.x, v.y, v.z, s * 0.5)
}

/// Spherical linear interpolation. Not renormalized on return; callers
/// that need a unit quaternion must normalize the result themselves.
pub fn slerp(q0: Quat, q1: Quat, t: f32) -> Quat {
    let mut dot = q0.w * q1.w + q0.x * q1.x + q0.y * q1.y + q0.z * q1.z;
    dot = dot.clamp(-1.0, 1.0);
    let angle = dot.abs().acos();
    let sin = hw_math::sin(angle);

    let (s, t_coeff) = if sin.abs() >= 1e-5 {
        (hw_math::sin((1.0 - t) * angle) / sin, hw_math::sin(t * angle) / sin)
    } else {
        (1.0 - t, t)
    };
    let t_coeff = if dot < 0.0 { -t_coeff } else { t_coeff };

    q0.scale(s) + q1.scale(t_coeff)
}
