//! 3x4 affine transform matrix (3x3 rotation/scale block plus a
//! translation column), grounded in `original_source/mat34.c`.
//!
//! Multiplication and vector transform use the original's exact widening
//! pattern: the first product stays in `f32`, every subsequent term is
//! added as an `f64` product narrowed back to `f32` only at the end. This
//! changes the rounding of the result relative to a naive all-`f32` dot
//! product and must be preserved exactly.

use crate::hw_math;
use crate::quat::Quat;
use crate::vec3::Vec3;
use crate::vec4::Vec4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat3x4 {
    pub e00: f32,
    pub e01: f32,
    pub e02: f32,
    pub e03: f32,
    pub e10: f32,
    pub e11: f32,
    pub e12: f32,
    pub e13: f32,
    pub e20: f32,
    pub e21: f32,
    pub e22: f32,
    pub e23: f32,
}

impl Mat3x4 {
    pub const IDENTITY: Mat3x4 = Mat3x4 {
        e00: 1.0, e01: 0.0, e02: 0.0, e03: 0.0,
        e10: 0.0, e11: 1.0, e12: 0.0, e13: 0.0,
        e20: 0.0, e21: 0.0, e22: 1.0, e23: 0.0,
    };

    /// Column 0 of the rotation block: `(e00, e10, e20)`.
    pub fn col0(&self) -> Vec3 {
        Vec3::new(self.e00, self.e10, self.e20)
    }

    pub fn pos(&self) -> Vec3 {
        Vec3::new(self.e03, self.e13, self.e23)
    }

    pub fn from_angles_and_pos(angles: Vec3, pos: Vec3) -> Mat3x4 {
        let (s_x, c_x) = (hw_math::sin(angles.x), hw_math::cos(angles.x));
        let (s_y, c_y) = (hw_math::sin(angles.y), hw_math::cos(angles.y));
        let (s_z, c_z) = (hw_math::sin(angles.z), hw_math::cos(angles.z));

        Mat3x4 {
            e00: c_y * c_z,
            e01: s_x * s_y * c_z - s_z * c_x,
            e02: c_x * c_z * s_y + s_x * s_z,
            e03: pos.x,
            e10: s_z * c_y,
            e11: s_x * s_y * s_z + c_x * c_z,
            e12: s_z * c_x * s_y - s_x * c_z,
            e13: pos.y,
            e20: -s_y,
            e21: s_x * c_y,
            e22: c_x * c_y,
            e23: pos.z,
        }
    }

    pub fn from_quat_and_pos(q: Quat, pos: Vec3) -> Mat3x4 {
        Mat3x4 {
            e00: 1.0 - 2.0 * q.y * q.y - 2.0 * q.z * q.z,
            e01: 2.0 * q.x * q.y - 2.0 * q.w * q.z,
            e02: 2.0 * q.x * q.z + 2.0 * q.w * q.y,
            e03: pos.x,
            e10: 2.0 * q.x * q.y + 2.0 * q.w * q.z,
            e11: 1.0 - 2.0 * q.x * q.x - 2.0 * q.z * q.z,
            e12: 2.0 * q.y * q.z - 2.0 * q.w * q.x,
            e13: pos.y,
            e20: 2.0 * q.x * q.z - 2.0 * q.w * q.y,
            e21: 2.0 * q.y * q.z + 2.0 * q.w * q.x,
            e22: 1.0 - 2.0 * q.x * q.x - 2.0 * q.y * q.y,
            e23: pos.z,
        }
    }

    /// Rodrigues rotation about a unit `axis`, embedded at the origin.
    /// Not present in the retrieved source (only declared); built from
    /// the standard axis-angle rotation matrix using the same
    /// table-driven `sin`/`cos` the other constructors use.
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Mat3x4 {
        let s = hw_math::sin(angle);
        let c = hw_math::cos(angle);
        let t = 1.0 - c;
        Mat3x4 {
            e00: c + t * axis.x * axis.x,
            e01: t * axis.x * axis.y - s * axis.z,
            e02: t * axis.x * axis.z + s * axis.y,
            e03: 0.0,
            e10: t * axis.x * axis.y + s * axis.z,
            e11: c + t * axis.y * axis.y,
            e12: t * axis.y * axis.z - s * axis.x,
            e13: 0.0,
            e20: t * axis.x * axis.z - s * axis.y,
            e21: t * axis.y * axis.z + s * axis.x,
            e22: c + t * axis.z * axis.z,
            e23: 0.0,
        }
    }

    pub fn transpose(&self) -> Mat3x4 {
        Mat3x4 {
            e00: self.e00, e01: self.e10, e02: self.e20, e03: 0.0,
            e10: self.e01, e11: self.e11, e12: self.e21, e13: 0.0,
            e20: self.e02, e21: self.e12, e22: self.e22, e23: 0.0,
        }
    }

    pub fn mul(&self, rhs: &Mat3x4) -> Mat3x4 {
        let row0 = Vec4::new(self.e00, self.e01, self.e02, self.e03);
        let row1 = Vec4::new(self.e10, self.e11, self.e12, self.e13);
        let row2 = Vec4::new(self.e20, self.e21, self.e22, self.e23);

        let col0 = Vec4::new(rhs.e00, rhs.e10, rhs.e20, 0.0);
        let col1 = Vec4::new(rhs.e01, rhs.e11, rhs.e21, 0.0);
        let col2 = Vec4::new(rhs.e02, rhs.e12, rhs.e22, 0.0);
        let col3 = Vec4::new(rhs.e03, rhs.e13, rhs.e23, 1.0);

        Mat3x4 {
            e00: mul_entry(row0, col0),
            e01: mul_entry(row0, col1),
            e02: mul_entry(row0, col2),
            e03: mul_entry(row0, col3),
            e10: mul_entry(row1, col0),
            e11: mul_entry(row1, col1),
            e12: mul_entry(row1, col2),
            e13: mul_entry(row1, col3),
            e20: mul_entry(row2, col0),
            e21: mul_entry(row2, col1),
            e22: mul_entry(row2, col2),
            e23: mul_entry(row2, col3),
        }
    }

    pub fn mul_vec3(&self, v: Vec3) -> Vec3 {
        let row0 = Vec4::new(self.e00, self.e01, self.e02, self.e03);
        let row1 = Vec4::new(self.e10, self.e11, self.e12, self.e13);
        let row2 = Vec4::new(self.e20, self.e21, self.e22, self.e23);

        Vec3::new(
            mul_vec3_entry(row0, v),
            mul_vec3_entry(row1, v),
            mul_vec3_entry(row2, v),
        )
    }

    /// Diagonal matrix with `diag` on the main diagonal and a zero
    /// translation column. Not part of the original's `mat34.c`; grounded
    /// in `player.c`'s local `mat34_from_diag`, used only to embed the
    /// inverse inertia tensor as a matrix for the impulse resolver.
    pub fn from_diag(diag: Vec3) -> Mat3x4 {
        Mat3x4 {
            e00: diag.x, e01: 0.0, e02: 0.0, e03: 0.0,
            e10: 0.0, e11: diag.y, e12: 0.0, e13: 0.0,
            e20: 0.0, e21: 0.0, e22: diag.z, e23: 0.0,
        }
    }

    /// Rotation-only transform: plain `f32` row-dot-vector with no `f64`
    /// widening and no translation term, unlike [`Mat3x4::mul_vec3`].
    /// Grounded in `player.c`'s local `mat33_mul_vec3`, used when a
    /// direction (not a position) is carried through an affine matrix.
    pub fn mul_vec3_linear(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            self.e00 * v.x + self.e01 * v.y + self.e02 * v.z,
            self.e10 * v.x + self.e11 * v.y + self.e12 * v.z,
            self.e20 * v.x + self.e21 * v.y + self.e22 * v.z,
        )
    }
}

fn mul_entry(row: Vec4, col: Vec4) -> f32 {
    let acc = col.x * row.x;
    let acc = (col.y as f64) * (row.y as f64) + acc as f64;
    let acc = (col.z as f64) * (row.z as f64) + acc;
    ((col.w as f64) * (row.w as f64) + acc) as f32
}

fn mul_vec3_entry(row: Vec4, v: Vec3) -> f32 {
    let tmp0 = row.x * v.x;
    let tmp0 = ((row.z as f64) * (v.z as f64) + tmp0 as f64) as f32;
    let tmp1 = row.y * v.y + row.w;
    tmp0 + tmp1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_mul_is_identity() {
        let m = Mat3x4::from_angles_and_pos(Vec3::new(0.1, 0.2, 0.3), Vec3::new(1.0, 2.0, 3.0));
        let product = m.mul(&Mat3x4::IDENTITY);
        assert!((product.e00 - m.e00).abs() < 1e-6);
        assert!((product.e03 - m.e03).abs() < 1e-6);
    }

    #[test]
    fn identity_mul_vec3_is_identity() {
        let v = Vec3::new(1.0, -2.0, 3.0);
        let result = Mat3x4::IDENTITY.mul_vec3(v);
        assert!((result.x - v.x).abs() < 1e-6);
        assert!((result.y - v.y).abs() < 1e-6);
        assert!((result.z - v.z).abs() < 1e-6);
    }

    #[test]
    fn from_quat_and_pos_carries_position_through() {
        let m = Mat3x4::from_quat_and_pos(crate::quat::IDENTITY, Vec3::new(5.0, 6.0, 7.0));
        assert_eq!(m.pos(), Vec3::new(5.0, 6.0, 7.0));
        assert_eq!(m.e00, 1.0);
        assert_eq!(m.e11, 1.0);
        assert_eq!(m.e22, 1.0);
    }

    #[test]
    fn from_axis_angle_rotates_about_z() {
        let m = Mat3x4::from_axis_angle(Vec3::new(0.0, 0.0, 1.0), std::f32::consts::FRAC_PI_2);
        let rotated = m.mul_vec3(Vec3::new(1.0, 0.0, 0.0));
        assert!((rotated.x).abs() < 0.05);
        assert!((rotated.y - 1.0).abs() < 0.05);
    }
}
