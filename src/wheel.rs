//! Per-wheel suspension, ground collision, and impulse resolution,
//! grounded in `original_source/player.c`'s `wheel_init`/`wheel_get_mat`/
//! `find_collision`/`wheel_update`.

use crate::bsp::BspWheel;
use crate::mat34::Mat3x4;
use crate::player::Player;
use crate::quat::{self, Quat};
use crate::vec3::Vec3;

#[derive(Debug, Clone)]
pub struct Wheel {
    pub idx: u8,
    pub bsp_wheel: BspWheel,
    pub pos: Vec3,
    pub down: f32,
    pub last_pos_rel: Vec3,
}

impl Wheel {
    /// The initial position reuses the un-transformed "bottom" direction
    /// `(0, -1, 0)` instead of the player's actual orientation — a bug in
    /// the original that the front wheel inherits verbatim.
    pub fn init(idx: u8, bsp_wheel: BspWheel, player_pos: Vec3) -> Wheel {
        let topmost_pos = player_pos + bsp_wheel.topmost_pos;
        let bottom = Vec3::new(0.0, -1.0, 0.0);
        let pos_rel = bottom.scale(bsp_wheel.slack_y);
        let pos = topmost_pos + pos_rel;
        Wheel {
            idx,
            bsp_wheel,
            pos,
            down: bsp_wheel.slack_y,
            last_pos_rel: pos_rel,
        }
    }

    fn get_mat(&self, player: &Player) -> Mat3x4 {
        let player_mat = Mat3x4::from_quat_and_pos(player.rot2, player.pos);
        if self.idx != 0 {
            return player_mat;
        }
        let handle_pos = Vec3::new(0.0, 51.0, 44.0);
        let deg_to_rad = std::f32::consts::PI / 180.0;
        let handle_angles = Vec3::new(-25.0, 0.0, 0.0).scale(deg_to_rad);
        let handle_mat = Mat3x4::from_angles_and_pos(handle_angles, handle_pos);
        player_mat.mul(&handle_mat)
    }
}

fn find_collision(pos: Vec3, radius: f32) -> Option<Vec3> {
    let dist = 1000.0 - pos.y + radius;
    if dist <= 0.0 {
        return None;
    }
    Some(Vec3::new(0.0, 1.0, 0.0).scale(dist))
}

pub fn update(wheel_idx: usize, player: &mut Player, last_rot: Quat, frame: u32) {
    let wheel_mat = player.wheels[wheel_idx].get_mat(player);
    let bsp_topmost = player.wheels[wheel_idx].bsp_wheel.topmost_pos;
    let topmost_pos = wheel_mat.mul_vec3(bsp_topmost);

    let bottom = wheel_mat.mul_vec3_linear(Vec3::new(0.0, -1.0, 0.0));

    {
        let wheel = &mut player.wheels[wheel_idx];
        wheel.down += 5.0;
        if wheel.down > wheel.bsp_wheel.slack_y {
            wheel.down = wheel.bsp_wheel.slack_y;
        }
    }

    let last_pos = player.wheels[wheel_idx].pos;
    player.wheels[wheel_idx].pos = topmost_pos + bottom.scale(player.wheels[wheel_idx].down);

    let radius_diff = {
        let bw = &player.wheels[wheel_idx].bsp_wheel;
        bw.wheel_radius - bw.sphere_radius
    };
    let sphere_pos_rel = bottom.scale(radius_diff);
    let mut sphere_pos = player.wheels[wheel_idx].pos + sphere_pos_rel;
    let player_mat_last = Mat3x4::from_quat_and_pos(last_rot, player.pos);
    let col0 = player_mat_last.col0().scale(player.turn_rot_z * player.wheels[wheel_idx].bsp_wheel.sphere_radius * 0.3);
    sphere_pos = sphere_pos + col0;

    let mut radius = player.wheels[wheel_idx].bsp_wheel.sphere_radius;
    if frame == 0 {
        radius = 10.0;
    }

    let collision = find_collision(sphere_pos, radius);
    if let Some(nor) = collision {
        player.ground = true;
        player.next_top = player.next_top + Vec3::new(0.0, 1.0, 0.0);
        player.wheels[wheel_idx].pos = player.wheels[wheel_idx].pos + nor;
    }

    {
        let wheel = &mut player.wheels[wheel_idx];
        wheel.down = bottom.dot(wheel.pos - topmost_pos);
        wheel.pos = topmost_pos + bottom.scale(wheel.down);
    }

    if collision.is_some() {
        resolve_impulse(player, wheel_idx, last_pos, sphere_pos);
    }

    let last_pos_rel = player.wheels[wheel_idx].last_pos_rel;
    let pos_rel = player.wheels[wheel_idx].pos - topmost_pos;
    player.wheels[wheel_idx].last_pos_rel = pos_rel;

    if collision.is_some() {
        apply_suspension_reaction(player, wheel_idx, topmost_pos, bottom, last_pos_rel, pos_rel);
    }
}

fn resolve_impulse(player: &mut Player, wheel_idx: usize, last_pos: Vec3, sphere_pos: Vec3) {
    let wheel_pos = player.wheels[wheel_idx].pos;
    let speed = wheel_pos - last_pos - player.speed1;
    let unk0 = Vec3::new(0.0, 10.0 * -1.3, 0.0);
    let speed2 = speed + unk0;
    let nor = Vec3::new(0.0, 1.0, 0.0);
    let dot = speed2.dot(nor);
    if dot >= 0.0 {
        return;
    }

    let rot_mat = Mat3x4::from_quat_and_pos(player.rot, Vec3::ZERO);
    let inv_inertia_tensor = Mat3x4::from_diag(player.inv_inertia_tensor);
    let tmp = rot_mat.mul(&inv_inertia_tensor);
    let rot_mat_t = rot_mat.transpose();
    let rot_mat = tmp.mul(&rot_mat_t);

    let sphere_pos_rel = sphere_pos - player.pos;
    let cross = sphere_pos_rel.cross(nor);
    let cross = rot_mat.mul_vec3_linear(cross);
    let cross2 = cross.cross(sphere_pos_rel);
    let val = -dot / (1.0 + nor.dot(cross2));

    let cross3 = nor.cross(speed.scale(-1.0));
    let cross4 = cross3.cross(nor);
    if cross4.sq_norm() <= f32::EPSILON {
        return;
    }

    let cross4_n = cross4.normalize();
    let mut dot2 = speed.dot(cross4_n);
    if dot2 > 0.0 {
        dot2 = 0.0;
    }
    let cross4_ns = cross4_n.scale(val * dot2 / dot);

    let forward = quat::rotate_vec3(player.rot2, Vec3::new(0.0, 0.0, 1.0));
    let proj = cross4_ns.proj_unit(forward);
    let rej = cross4_ns - proj;

    let mut proj_norm = crate::hw_math::sqrt(proj.sq_norm());
    let mut rej_norm = crate::hw_math::sqrt(rej.sq_norm());

    let tmp_bound = 0.1 * val.abs();
    if proj_norm.abs() > tmp_bound {
        proj_norm = if proj_norm < 0.0 { -tmp_bound } else { tmp_bound };
    }
    let proj = proj.normalize().scale(proj_norm);

    let down = player.wheels[wheel_idx].down;
    let tmp_bound = down * val.abs(); // FIXME down
    if rej_norm.abs() > tmp_bound {
        rej_norm = if rej_norm < 0.0 { -tmp_bound } else { tmp_bound };
    }
    let rej = rej.normalize().scale(rej_norm);

    let sum = proj + rej;
    let rej = sum.rej_unit(player.dir);
    player.speed0 = player.speed0 + rej;

    if !player.wheelie && player.wheelie_rot == 0.0 {
        let cross5 = sphere_pos_rel.cross(sum);
        let cross5_r = rot_mat.mul_vec3_linear(cross5);
        let mut cross5_rr = quat::inv_rotate_vec3(player.rot, cross5_r);
        cross5_rr.y = 0.0;
        player.rot_vec0 = player.rot_vec0 + cross5_rr;
    }
}

fn apply_suspension_reaction(
    player: &mut Player,
    wheel_idx: usize,
    topmost_pos: Vec3,
    bottom: Vec3,
    last_pos_rel: Vec3,
    pos_rel: Vec3,
) {
    let down = bottom.dot(pos_rel);
    let speed = bottom.dot(last_pos_rel - pos_rel);
    let bw = player.wheels[wheel_idx].bsp_wheel;
    let mut acceleration = bottom.scale(-(bw.distance_suspension * (bw.slack_y - down) + bw.speed_suspension * speed));

    if player.speed0.y < 5.0 {
        player.normal_acceleration += acceleration.y;
    }

    acceleration = quat::inv_rotate_vec3(player.rot2, acceleration);
    let topmost_pos_rel = quat::inv_rotate_vec3(player.rot2, topmost_pos - player.pos);
    let mut cross = topmost_pos_rel.cross(acceleration);
    cross.y = 0.0;
    if player.wheelie_rot != 0.0 {
        cross.x = 0.0;
    }
    if !player.wheelie {
        player.normal_rot_vec = player.normal_rot_vec + cross;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsp::Bsp;

    #[test]
    fn init_places_wheel_below_topmost_by_slack() {
        let bsp = Bsp::flame_runner();
        let player_pos = Vec3::new(0.0, 0.0, 0.0);
        let wheel = Wheel::init(0, bsp.wheels[0], player_pos);
        assert_eq!(wheel.down, bsp.wheels[0].slack_y);
        let expected = player_pos + bsp.wheels[0].topmost_pos - Vec3::new(0.0, bsp.wheels[0].slack_y, 0.0);
        assert_eq!(wheel.pos, expected);
    }

    #[test]
    fn find_collision_reports_penetration_depth() {
        let pos = Vec3::new(0.0, 995.0, 0.0);
        let nor = find_collision(pos, 10.0).unwrap();
        assert_eq!(nor, Vec3::new(0.0, 15.0, 0.0));
    }

    #[test]
    fn find_collision_reports_none_above_floor() {
        assert!(find_collision(Vec3::new(0.0, 0.0, 0.0), 10.0).is_none());
    }
}
