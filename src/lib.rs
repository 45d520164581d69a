//! Deterministic, bit-exact re-simulation of a Mario Kart Wii vehicle's
//! per-frame physics from a decoded `.rkg` input ghost, checked against a
//! `.rkrd` reference dump.

pub mod bsp;
pub mod error;
pub mod hw_math;
pub mod mat34;
pub mod player;
pub mod quat;
pub mod rkg;
pub mod rkrd;
pub mod util;
pub mod vec3;
pub mod vec4;
pub mod wheel;
pub mod yaz;

pub use error::HanachanError;
pub use player::Player;
pub use rkg::Rkg;
pub use rkrd::{Rkrd, RkrdFrame};
