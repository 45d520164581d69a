//! Byte-order reads and float bit-punning shared by every loader.
//!
//! All multi-byte fields in `.rkg`/`.rkrd`/Yaz payloads are big-endian,
//! matching the original PowerPC target.

use crate::error::HanachanError;
use std::path::Path;

pub fn read_file(path: &Path) -> Result<Vec<u8>, HanachanError> {
    std::fs::read(path).map_err(|source| HanachanError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn get_u8(data: &[u8], offset: usize) -> u8 {
    data[offset]
}

pub fn get_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([data[offset], data[offset + 1]])
}

pub fn get_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

pub fn get_f32(data: &[u8], offset: usize) -> f32 {
    f32::from_bits(get_u32(data, offset))
}

/// A cursor over a big-endian byte slice, advancing as each field is read.
/// Mirrors the original's `next_u8`/`next_u16`/`next_u32` pointer-advancing
/// helpers without needing raw pointers.
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn next_u8(&mut self) -> u8 {
        let val = get_u8(self.data, self.pos);
        self.pos += 1;
        val
    }

    pub fn next_u16(&mut self) -> u16 {
        let val = get_u16(self.data, self.pos);
        self.pos += 2;
        val
    }

    pub fn next_u32(&mut self) -> u32 {
        let val = get_u32(self.data, self.pos);
        self.pos += 4;
        val
    }

    pub fn next_f32(&mut self) -> f32 {
        let val = get_f32(self.data, self.pos);
        self.pos += 4;
        val
    }
}

pub fn pack_u32(b0: u8, b1: u8, b2: u8, b3: u8) -> u32 {
    u32::from_be_bytes([b0, b1, b2, b3])
}
