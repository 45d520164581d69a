//! Hardcoded vehicle parameters, grounded in `original_source/bsp.c`.
//! Only Flame Runner is supported; nothing here is loaded from a track
//! or vehicle archive.

use crate::vec3::Vec3;

#[derive(Debug, Clone, Copy)]
pub struct BspWheel {
    /// Suspension spring constant (`k_d` in the suspension reaction).
    pub distance_suspension: f32,
    /// Suspension damping constant (`k_v` in the suspension reaction).
    pub speed_suspension: f32,
    pub slack_y: f32,
    pub topmost_pos: Vec3,
    pub wheel_radius: f32,
    pub sphere_radius: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct Bsp {
    pub initial_pos_y: f32,
    pub cuboids: [Vec3; 2],
    pub rot_speed: f32,
    pub wheels: [BspWheel; 2],
}

/// Base forward speed shared by `should_cancel_wheelie` and the soft
/// speed limit assembly. The original hardcodes `82.95f + 1.06f` twice
/// with a `// TODO stop hardcoding fr + fk` comment; this crate
/// centralizes the literal but keeps the exact value.
pub const BASE_SPEED: f32 = 82.95 + 1.06;

impl Bsp {
    pub fn flame_runner() -> Bsp {
        Bsp {
            initial_pos_y: 62.0,
            cuboids: [Vec3::new(90.0, 80.0, 140.0), Vec3::new(0.0, -10.0, -40.0)],
            rot_speed: 0.12,
            wheels: [
                BspWheel {
                    distance_suspension: 0.16,
                    speed_suspension: 0.18,
                    slack_y: 55.0,
                    topmost_pos: Vec3::new(0.0, -40.0, 0.0),
                    wheel_radius: 29.5,
                    sphere_radius: 43.0,
                },
                BspWheel {
                    distance_suspension: 0.17,
                    speed_suspension: 0.2,
                    slack_y: 30.0,
                    topmost_pos: Vec3::new(0.0, 7.0, -75.0),
                    wheel_radius: 41.0,
                    sphere_radius: 43.0,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flame_runner_has_two_wheels_with_distinct_geometry() {
        let bsp = Bsp::flame_runner();
        assert_ne!(bsp.wheels[0].topmost_pos, bsp.wheels[1].topmost_pos);
        assert_eq!(bsp.wheels.len(), 2);
    }

    #[test]
    fn base_speed_matches_the_original_literal() {
        assert!((BASE_SPEED - 84.01).abs() < 1e-4);
    }
}
