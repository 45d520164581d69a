//! Property-based checks of the vector/quaternion algebra's basic laws,
//! in the style of this codebase's `proptest` usage for protocol/model
//! invariants.

use hanachan::quat;
use hanachan::vec3::Vec3;
use proptest::prelude::*;

fn finite_component() -> impl Strategy<Value = f32> {
    prop::num::f32::NORMAL.prop_filter("bounded", |v| v.abs() < 1.0e6)
}

fn vec3_strategy() -> impl Strategy<Value = Vec3> {
    (finite_component(), finite_component(), finite_component())
        .prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn unit_vec3_strategy() -> impl Strategy<Value = Vec3> {
    vec3_strategy().prop_filter_map("nonzero", |v| {
        let n = v.normalize();
        (n.sq_norm() > 0.0).then_some(n)
    })
}

proptest! {
    #[test]
    fn proj_and_rej_recombine_to_the_original_vector(v in vec3_strategy(), axis in unit_vec3_strategy()) {
        let proj = v.proj_unit(axis);
        let rej = v.rej_unit(axis);
        let sum = proj + rej;
        prop_assert!((sum.x - v.x).abs() < 1e-2 * v.x.abs().max(1.0));
        prop_assert!((sum.y - v.y).abs() < 1e-2 * v.y.abs().max(1.0));
        prop_assert!((sum.z - v.z).abs() < 1e-2 * v.z.abs().max(1.0));
    }

    #[test]
    fn rejection_is_orthogonal_to_its_axis(v in vec3_strategy(), axis in unit_vec3_strategy()) {
        let rej = v.rej_unit(axis);
        prop_assert!(rej.dot(axis).abs() < 1.0);
    }

    #[test]
    fn normalize_is_idempotent(v in vec3_strategy()) {
        let once = v.normalize();
        let twice = once.normalize();
        prop_assert!((once.x - twice.x).abs() < 1e-5);
        prop_assert!((once.y - twice.y).abs() < 1e-5);
        prop_assert!((once.z - twice.z).abs() < 1e-5);
    }

    #[test]
    fn rotate_then_inv_rotate_is_the_identity(v in vec3_strategy(), from in unit_vec3_strategy(), to in unit_vec3_strategy()) {
        let q = quat::from_vectors(from, to);
        let rotated = quat::rotate_vec3(q, v);
        let back = quat::inv_rotate_vec3(q, rotated);
        prop_assert!((back.x - v.x).abs() < 1e-1 * v.x.abs().max(1.0));
        prop_assert!((back.y - v.y).abs() < 1e-1 * v.y.abs().max(1.0));
        prop_assert!((back.z - v.z).abs() < 1e-1 * v.z.abs().max(1.0));
    }
}
