//! Reference-dump loader, grounded in `original_source/rkrd.c`. Each
//! frame record is 27 big-endian `u32`s (most reinterpreted as `f32`).

use crate::error::HanachanError;
use crate::util::{pack_u32, read_file, Cursor};
use crate::vec3::Vec3;
use crate::vec4::Vec4;
use std::path::Path;

const VERSION: u32 = 0;
const FRAME_RECORD_WORDS: usize = 27;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RkrdFrame {
    pub dir: Vec3,
    pub pos: Vec3,
    pub speed0: Vec3,
    pub speed1_norm: f32,
    pub speed: Vec3,
    pub rot_vec0: Vec3,
    pub rot_vec2: Vec3,
    pub rot: Vec4,
    pub rot2: Vec4,
}

#[derive(Debug, Clone)]
pub struct Rkrd {
    pub frame_count: u32,
    pub frames: Vec<RkrdFrame>,
}

fn next_vec3(cursor: &mut Cursor) -> Vec3 {
    Vec3::new(cursor.next_f32(), cursor.next_f32(), cursor.next_f32())
}

fn next_vec4(cursor: &mut Cursor) -> Vec4 {
    Vec4::new(cursor.next_f32(), cursor.next_f32(), cursor.next_f32(), cursor.next_f32())
}

impl Rkrd {
    pub fn load(path: &Path) -> Result<Rkrd, HanachanError> {
        let data = read_file(path)?;
        let mut cursor = Cursor::new(&data);

        let fourcc = cursor.next_u32();
        if fourcc != pack_u32(b'R', b'K', b'R', b'D') {
            return Err(HanachanError::BadRkrdMagic);
        }

        let version = cursor.next_u32();
        if version != VERSION {
            return Err(HanachanError::UnsupportedRkrdVersion(version));
        }

        let body_words = cursor.remaining() / 4;
        let frame_count = (body_words / FRAME_RECORD_WORDS) as u32;

        let mut frames = Vec::with_capacity(frame_count as usize);
        for _ in 0..frame_count {
            frames.push(RkrdFrame {
                dir: next_vec3(&mut cursor),
                pos: next_vec3(&mut cursor),
                speed0: next_vec3(&mut cursor),
                speed1_norm: cursor.next_f32(),
                speed: next_vec3(&mut cursor),
                rot_vec0: next_vec3(&mut cursor),
                rot_vec2: next_vec3(&mut cursor),
                rot: next_vec4(&mut cursor),
                rot2: next_vec4(&mut cursor),
            });
        }

        Ok(Rkrd { frame_count, frames })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame_bytes() -> Vec<u8> {
        let mut bytes = Vec::new();
        for _ in 0..FRAME_RECORD_WORDS {
            bytes.extend_from_slice(&1.0f32.to_be_bytes());
        }
        bytes
    }

    #[test]
    fn frame_count_derived_from_body_length() {
        let mut data = Vec::new();
        data.extend_from_slice(&pack_u32(b'R', b'K', b'R', b'D').to_be_bytes());
        data.extend_from_slice(&VERSION.to_be_bytes());
        data.extend_from_slice(&sample_frame_bytes());
        data.extend_from_slice(&sample_frame_bytes());

        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.next_u32(), pack_u32(b'R', b'K', b'R', b'D'));
        assert_eq!(cursor.next_u32(), VERSION);
        assert_eq!(cursor.remaining() / 4 / FRAME_RECORD_WORDS, 2);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut data = Vec::new();
        data.extend_from_slice(&pack_u32(b'X', b'X', b'X', b'X').to_be_bytes());
        data.extend_from_slice(&VERSION.to_be_bytes());
        let mut cursor = Cursor::new(&data);
        let fourcc = cursor.next_u32();
        assert_ne!(fourcc, pack_u32(b'R', b'K', b'R', b'D'));
    }
}
