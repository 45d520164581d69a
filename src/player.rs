//! Per-frame vehicle integrator, grounded in `original_source/player.c`'s
//! `player_init`/`player_update`/`should_cancel_wheelie`. Step numbering
//! in `update` mirrors the reference server's `update_car_3d` decomposition
//! style: one method per numbered physics step, called in fixed order.

use crate::bsp::{Bsp, BASE_SPEED};
use crate::mat34::Mat3x4;
use crate::quat::{self, Quat};
use crate::rkg::Rkg;
use crate::vec3::Vec3;
use crate::vec4::Vec4;
use crate::wheel::{self, Wheel};

#[derive(Debug, Clone)]
pub struct Player {
    pub rkg: Rkg,
    pub bsp: Bsp,

    pub turn: f32,
    pub wheelie: bool,
    pub wheelie_frame: u32,
    pub wheelie_rot: f32,
    pub wheelie_rot_dec: f32,

    pub ground: bool,
    pub next_top: Vec3,
    pub top: Vec3,
    pub dir: Vec3,
    pub dir_diff: Vec3,

    pub start_boost_charge: f32,
    pub standstill_boost_rot: f32,
    pub mt_boost: u32,

    pub inv_inertia_tensor: Vec3,

    pub pos: Vec3,
    pub normal_acceleration: f32,
    pub speed0: Vec3,
    pub soft_speed_limit: f32,
    pub speed1_norm: f32,
    pub speed1: Vec3,
    pub speed: Vec3,
    pub normal_rot_vec: Vec3,
    pub rot_vec0: Vec3,
    pub turn_rot_z: f32,
    pub rot: Quat,
    pub rot2: Quat,

    pub wheels: [Wheel; 2],
}

impl Player {
    pub fn new(rkg: Rkg, bsp: Bsp) -> Player {
        let masses = [1.0f32 / 12.0, 1.0];
        let mut inertia_tensor = Vec3::ZERO;
        for i in 0..2 {
            let dims = bsp.cuboids[i];
            let tensor = Vec3::new(
                masses[i] * (dims.y * dims.y + dims.z * dims.z),
                masses[i] * (dims.x * dims.x + dims.z * dims.z),
                masses[i] * (dims.x * dims.x + dims.y * dims.y),
            );
            inertia_tensor = inertia_tensor + tensor;
        }
        let det = inertia_tensor.x * inertia_tensor.y * inertia_tensor.z;
        let recip = 1.0 / det;
        let inv_inertia_tensor = Vec3::new(
            recip * (inertia_tensor.y * inertia_tensor.z),
            recip * (inertia_tensor.z * inertia_tensor.x),
            recip * (inertia_tensor.x * inertia_tensor.y),
        );

        let pos = Vec3::new(-14720.0, 1000.0 + bsp.initial_pos_y, -2954.655);
        let wheels = [
            Wheel::init(0, bsp.wheels[0], pos),
            Wheel::init(1, bsp.wheels[1], pos),
        ];

        Player {
            rkg,
            bsp,
            turn: 0.0,
            wheelie: false,
            wheelie_frame: 0,
            wheelie_rot: 0.0,
            wheelie_rot_dec: 0.0,
            ground: false,
            next_top: Vec3::ZERO,
            top: Vec3::ZERO,
            dir: Vec3::new(0.0, 0.0, -1.0),
            dir_diff: Vec3::ZERO,
            start_boost_charge: 0.0,
            standstill_boost_rot: 0.0,
            mt_boost: 0,
            inv_inertia_tensor,
            pos,
            normal_acceleration: 0.0,
            speed0: Vec3::ZERO,
            soft_speed_limit: 0.0,
            speed1_norm: 0.0,
            speed1: Vec3::ZERO,
            speed: Vec3::ZERO,
            normal_rot_vec: Vec3::ZERO,
            rot_vec0: Vec3::ZERO,
            turn_rot_z: 0.0,
            rot: Vec4::new(0.0, 1.0, 0.0, 0.0),
            rot2: Vec4::new(0.0, 1.0, 0.0, 0.0),
            wheels,
        }
    }

    fn should_cancel_wheelie(&self) -> bool {
        if self.wheelie_frame < 15 {
            return false;
        }
        if self.wheelie_frame > 180 {
            return true;
        }
        let speed_ratio = self.speed1_norm / BASE_SPEED;
        self.speed1_norm < 0.0 || speed_ratio < 0.3
    }

    /// The direction byte is stored pre-shifted into its nibble (see
    /// `rkg::parse_input`'s `state << 8` merge), so the discrete stick
    /// value lives in bits 12..16, not 8..16.
    fn discrete_stick_x(&self, frame: u32) -> f32 {
        let input = self.rkg.inputs[(frame - 172) as usize];
        ((input >> 12) as i8) as f32
    }

    pub fn update(&mut self, frame: u32) {
        if frame >= 172 {
            self.step_1_pre_race_inputs(frame);
        }

        self.step_2_direction_smoothing();

        if frame >= 411 {
            self.step_3_turn_smoothing(frame);
        }

        self.step_4_top_update();

        if frame < 411 {
            self.speed0 = self.speed0.rej_unit(self.top);
        }

        self.step_5_gravity();
        self.speed0 = self.speed0.scale(0.998);
        self.step_6_forward_plane_rejection();

        let last_speed1_norm = self.step_7_speed1_norm_decay();
        self.step_8_soft_limit_assembly();
        self.step_9_speed1_vector();
        self.step_10_translate();

        self.step_11_angular_velocity();
        let rot_vec2 = self.step_12_aux_angular_velocity(frame, last_speed1_norm);

        let last_rot = self.rot;
        self.step_13_rotation_integration(rot_vec2);
        self.step_14_top_realignment();
        self.step_15_rebuild_rot2();

        self.ground = false;
        self.next_top = Vec3::ZERO;
        for i in 0..2 {
            wheel::update(i, self, last_rot, frame);
        }
    }

    fn step_1_pre_race_inputs(&mut self, frame: u32) {
        let input = self.rkg.inputs[(frame - 172) as usize];
        let accelerate = input & 1 != 0;
        if accelerate {
            self.start_boost_charge += 0.02 - (0.02 - 0.002) * self.start_boost_charge;
        } else {
            self.start_boost_charge *= 0.96;
        }

        if frame == 411 {
            self.mt_boost = 70;
        }

        if (input >> 5) & 1 != 0 {
            self.wheelie = true;
        }

        if self.wheelie {
            self.wheelie_frame += 1;
            if self.should_cancel_wheelie() {
                self.wheelie = false;
                self.wheelie_frame = 0;
            } else {
                self.wheelie_rot += 0.01;
                if self.wheelie_rot > 0.07 {
                    self.wheelie_rot = 0.07;
                }
            }
        } else if self.wheelie_rot > 0.0 {
            self.wheelie_rot_dec -= 0.001;
            self.wheelie_rot += self.wheelie_rot_dec;
            if self.wheelie_rot < 0.0 {
                self.wheelie_rot = 0.0;
            }
        }

        let stick_x = (self.discrete_stick_x(frame) - 7.0) / 7.0;
        let s;
        if stick_x < -0.2 && !self.wheelie {
            self.turn_rot_z -= 0.08;
            s = 1.0;
        } else if stick_x <= 0.2 || self.wheelie {
            self.turn_rot_z *= 0.9;
            s = 0.0;
        } else {
            self.turn_rot_z += 0.08;
            s = -1.0;
        }

        if self.turn_rot_z < -0.6 {
            self.turn_rot_z = -0.6;
        } else if self.turn_rot_z > 0.6 {
            self.turn_rot_z = 0.6;
        } else {
            let player_mat = Mat3x4::from_quat_and_pos(self.rot2, self.pos);
            self.speed0 = self.speed0 + player_mat.col0().scale(s);
        }
    }

    fn step_2_direction_smoothing(&mut self) {
        let right = quat::rotate_vec3(self.rot, Vec3::new(1.0, 0.0, 0.0));
        let next_dir = right.cross(self.top).normalize().perp_in_plane(self.top);
        let diff = next_dir - self.dir;
        if diff.sq_norm() <= f32::EPSILON {
            self.dir = next_dir;
            self.dir_diff = Vec3::ZERO;
        } else {
            let diff = self.dir_diff + diff.scale(0.7);
            self.dir = (self.dir + diff).normalize();
            self.dir_diff = diff.scale(0.1);
        }
    }

    fn step_3_turn_smoothing(&mut self, frame: u32) {
        let stick_x = (self.discrete_stick_x(frame) - 7.0) / 7.0;
        let reactivity = 0.88;
        self.turn = reactivity * -stick_x + (1.0 - reactivity) * self.turn;
    }

    fn step_4_top_update(&mut self) {
        self.top = if self.ground {
            self.next_top.normalize()
        } else {
            Vec3::new(0.0, 1.0, 0.0)
        };
    }

    fn step_5_gravity(&mut self) {
        self.speed0.y += self.normal_acceleration - 1.3;
        self.normal_acceleration = 0.0;
    }

    fn step_6_forward_plane_rejection(&mut self) {
        let mut forward = quat::rotate_vec3(self.rot, Vec3::new(0.0, 0.0, 1.0));
        forward.y = 0.0;
        if forward.sq_norm() > f32::EPSILON {
            self.speed0 = self.speed0.rej_unit(forward.normalize());
        }
    }

    fn step_7_speed1_norm_decay(&mut self) -> f32 {
        if self.mt_boost == 0 {
            self.speed1_norm *= 0.9924 + (1.0 - 0.9924) * (1.0 - self.turn.abs());
        }
        self.speed1_norm
    }

    fn step_8_soft_limit_assembly(&mut self) {
        let mut next_soft_speed_limit = 1.0f32;
        if self.mt_boost != 0 {
            self.speed1_norm += 3.0;
            next_soft_speed_limit = 1.2;
            self.mt_boost -= 1;
        }
        if self.wheelie {
            next_soft_speed_limit += 0.15;
        }
        next_soft_speed_limit *= BASE_SPEED;

        self.soft_speed_limit -= 3.0;
        if next_soft_speed_limit > self.soft_speed_limit {
            self.soft_speed_limit = next_soft_speed_limit;
        }
        if self.speed1_norm > self.soft_speed_limit {
            self.speed1_norm = self.soft_speed_limit;
        }
    }

    fn step_9_speed1_vector(&mut self) {
        let speed1_dir = self.dir.perp_in_plane(self.top);
        let right = self.top.cross(self.dir);
        let deg_to_rad = std::f32::consts::PI / 180.0;
        let speed1_dir = Mat3x4::from_axis_angle(right, 0.5 * deg_to_rad).mul_vec3_linear(speed1_dir);
        self.speed1 = speed1_dir.scale(self.speed1_norm);
    }

    fn step_10_translate(&mut self) {
        self.speed = self.speed0 + self.speed1;
        let speed_norm = self.speed.norm();
        self.speed = self.speed.normalize().scale(speed_norm);
        self.pos = self.pos + self.speed;
    }

    fn step_11_angular_velocity(&mut self) {
        if self.wheelie {
            self.rot_vec0.x *= 0.9;
        }
        self.rot_vec0 = self.rot_vec0.scale(0.98);

        let a = self.inv_inertia_tensor.mul(self.normal_rot_vec);
        let b = self.inv_inertia_tensor.mul(self.normal_rot_vec + a);
        self.normal_rot_vec = (a + b).scale(0.5);
        self.rot_vec0 = self.rot_vec0 + self.normal_rot_vec;
        self.rot_vec0.z = 0.0;
        self.normal_rot_vec = Vec3::ZERO;
    }

    fn step_12_aux_angular_velocity(&mut self, frame: u32, last_speed1_norm: f32) -> Vec3 {
        let mut rot_vec2 = Vec3::ZERO;
        let up = Vec3::new(0.0, 1.0, 0.0);
        let dot = self.dir.dot(up);
        rot_vec2.x -= self.wheelie_rot * (1.0 - dot.abs());

        let mut turn = self.turn * 0.0216;
        turn *= 0.5;
        if self.wheelie {
            turn *= 0.2;
        }
        rot_vec2.y += turn;

        if frame < 411 {
            self.standstill_boost_rot = 0.015 * -self.start_boost_charge;
        } else {
            let mut acceleration = self.speed1_norm - last_speed1_norm;
            acceleration = acceleration.max(-3.0).min(3.0);
            self.standstill_boost_rot +=
                0.2 * (-acceleration * 0.15 * 0.08 - self.standstill_boost_rot);
        }
        rot_vec2.x += self.standstill_boost_rot;
        rot_vec2.z += 0.05 * self.turn_rot_z;

        rot_vec2
    }

    fn step_13_rotation_integration(&mut self, rot_vec2: Vec3) {
        let rot_vec = self.rot_vec0.scale(self.bsp.rot_speed) + rot_vec2;
        if rot_vec.sq_norm() > f32::EPSILON {
            let tmp = quat::mul_from_vec3(self.rot, rot_vec);
            self.rot = (self.rot + tmp.scale(0.5)).normalize();
        }
    }

    fn step_14_top_realignment(&mut self) {
        let forward = quat::rotate_vec3(self.rot, Vec3::new(0.0, 0.0, 1.0));
        let right = self.top.cross(forward);
        let forward = right.cross(self.top).normalize();
        let right = self.top.cross(forward);
        let up_basis = forward.cross(right).normalize();

        let rot_top = quat::rotate_vec3(self.rot, Vec3::new(0.0, 1.0, 0.0));
        if up_basis.dot(rot_top) < 0.9999 {
            let rot_from_vectors = quat::from_vectors(rot_top, up_basis);
            let prod = quat::mul(rot_from_vectors, self.rot);
            self.rot = quat::slerp(self.rot, prod, 0.1);
        }
        self.rot = self.rot.normalize();
    }

    fn step_15_rebuild_rot2(&mut self) {
        self.rot2 = quat::mul(quat::IDENTITY, self.rot);
        self.rot2 = quat::mul(self.rot2, quat::IDENTITY);
        self.rot2 = self.rot2.normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rkg::Rkg;

    fn test_rkg(inputs: Vec<u16>) -> Rkg {
        Rkg {
            minutes: 0,
            seconds: 0,
            milliseconds: 0,
            track: 0x18,
            vehicle: 0x17,
            character: 0x16,
            year: 2008,
            month: 1,
            day: 1,
            controller: 0,
            ghost_type: 0,
            automatic_drift: false,
            frame_count: inputs.len() as u32,
            inputs,
        }
    }

    #[test]
    fn new_player_starts_at_the_documented_position() {
        let player = Player::new(test_rkg(vec![]), Bsp::flame_runner());
        assert_eq!(player.pos, Vec3::new(-14720.0, 1000.0 + 62.0, -2954.655));
        assert_eq!(player.dir, Vec3::new(0.0, 0.0, -1.0));
        assert!(!player.wheelie);
    }

    #[test]
    fn inv_inertia_tensor_is_the_reciprocal_of_each_axis() {
        let player = Player::new(test_rkg(vec![]), Bsp::flame_runner());
        let bsp = Bsp::flame_runner();
        let masses = [1.0f32 / 12.0, 1.0];
        let mut tensor = Vec3::ZERO;
        for i in 0..2 {
            let dims = bsp.cuboids[i];
            tensor = tensor
                + Vec3::new(
                    masses[i] * (dims.y * dims.y + dims.z * dims.z),
                    masses[i] * (dims.x * dims.x + dims.z * dims.z),
                    masses[i] * (dims.x * dims.x + dims.y * dims.y),
                );
        }
        assert!((player.inv_inertia_tensor.x - 1.0 / tensor.x).abs() < 1e-9);
        assert!((player.inv_inertia_tensor.y - 1.0 / tensor.y).abs() < 1e-9);
        assert!((player.inv_inertia_tensor.z - 1.0 / tensor.z).abs() < 1e-9);
    }

    #[test]
    fn pre_race_frames_do_not_sample_input() {
        let mut player = Player::new(test_rkg(vec![0x1f]), Bsp::flame_runner());
        let before = player.speed0;
        player.update(0);
        // frame 0 < 172: no start-boost charge, no wheelie, no steering input read.
        assert_eq!(player.start_boost_charge, 0.0);
        assert_eq!(player.speed0.y, before.y + (0.0 - 1.3)); // gravity still applies
    }

    #[test]
    fn should_cancel_wheelie_respects_the_frame_floor() {
        let mut player = Player::new(test_rkg(vec![]), Bsp::flame_runner());
        player.wheelie_frame = 10;
        assert!(!player.should_cancel_wheelie());
        player.wheelie_frame = 200;
        assert!(player.should_cancel_wheelie());
    }
}
