//! `.rkg` ghost file loader, grounded in `original_source/rkg.c`.
//!
//! This crate targets exactly one track/vehicle/character/drift-mode
//! combination. Values outside the original's valid *range* are load
//! failures; values inside the range but not matching the one supported
//! combination are logged as warnings and the load proceeds, exactly as
//! the original's `printf` warnings do.

use crate::error::HanachanError;
use crate::util::{get_u16, get_u32, get_u8, pack_u32, read_file};
use crate::yaz;
use std::path::Path;

const HEADER_SIZE: usize = 0x88;

#[derive(Debug, Clone)]
pub struct Rkg {
    pub minutes: u8,
    pub seconds: u8,
    pub milliseconds: u16,
    pub track: u8,
    pub vehicle: u8,
    pub character: u8,
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub controller: u8,
    pub ghost_type: u8,
    pub automatic_drift: bool,
    pub frame_count: u32,
    /// One packed `u16` per frame: bits 0..5 buttons, bits 5..8 trick
    /// state, bits 8..16 stick index.
    pub inputs: Vec<u16>,
}

fn track_is_valid(track: u8) -> Result<(), HanachanError> {
    if track >= 0x20 {
        return Err(HanachanError::UnsupportedTrack(track));
    }
    if track != 0x18 {
        tracing::warn!(track, "only rMC3 is supported for now");
    }
    Ok(())
}

fn vehicle_is_valid(vehicle: u8) -> Result<(), HanachanError> {
    if vehicle >= 0x24 {
        return Err(HanachanError::UnsupportedVehicle(vehicle));
    }
    if vehicle != 0x17 {
        tracing::warn!(vehicle, "only Flame Runner is supported for now");
    }
    Ok(())
}

fn character_is_valid(character: u8) -> Result<(), HanachanError> {
    if character >= 0x18 {
        return Err(HanachanError::UnsupportedCharacter(character));
    }
    if character != 0x16 {
        tracing::warn!(character, "only Funky Kong is supported for now");
    }
    Ok(())
}

struct Header {
    minutes: u8,
    seconds: u8,
    milliseconds: u16,
    track: u8,
    vehicle: u8,
    character: u8,
    year: u16,
    month: u8,
    day: u8,
    controller: u8,
    ghost_type: u8,
    automatic_drift: bool,
}

fn parse_header(data: &[u8]) -> Result<Header, HanachanError> {
    if data.len() < HEADER_SIZE {
        return Err(HanachanError::RkgTooShort);
    }
    if get_u32(data, 0x00) != pack_u32(b'R', b'K', b'G', b'D') {
        return Err(HanachanError::BadRkgMagic);
    }

    let minutes = get_u8(data, 0x04) >> 1;
    let seconds = (get_u16(data, 0x04) >> 2 & 0x7f) as u8;
    let milliseconds = get_u16(data, 0x05) & 0x3ff;
    if minutes > 59 || seconds > 59 || milliseconds > 999 {
        return Err(HanachanError::InvalidRaceTime);
    }

    let track = get_u8(data, 0x07) >> 2;
    track_is_valid(track)?;

    let vehicle = get_u8(data, 0x08) >> 2;
    let character = (get_u16(data, 0x08) >> 4 & 0x3f) as u8;
    vehicle_is_valid(vehicle)?;
    character_is_valid(character)?;

    let year = 2000 + (get_u16(data, 0x09) >> 5 & 0x7f);
    let month = (get_u8(data, 0x0a) >> 1) & 0xf;
    let day = (get_u16(data, 0x0a) >> 4 & 0x1f) as u8;

    let controller = get_u8(data, 0x0b) & 0xf;
    if controller >= 4 {
        return Err(HanachanError::InvalidController(controller));
    }

    let compressed = get_u8(data, 0x0c) >> 3 & 1 != 0;
    if !compressed {
        return Err(HanachanError::RkgNotCompressed);
    }

    let ghost_type = (get_u16(data, 0x0c) >> 2 & 0x7f) as u8;

    let automatic_drift = get_u8(data, 0x0d) >> 6 & 1 != 0;
    if automatic_drift {
        tracing::warn!("only manual drift is supported for now");
    }

    Ok(Header {
        minutes,
        seconds,
        milliseconds,
        track,
        vehicle,
        character,
        year,
        month,
        day,
        controller,
        ghost_type,
        automatic_drift,
    })
}

fn parse_input(data: &[u8]) -> Result<(u32, Vec<u16>), HanachanError> {
    let button_input_count = get_u16(data, 0) as usize;
    let direction_input_count = get_u16(data, 2) as usize;
    let trick_input_count = get_u16(data, 4) as usize;
    let total_input_count = button_input_count + direction_input_count + trick_input_count;
    if total_input_count * 2 != data.len() - 8 {
        return Err(HanachanError::RkgInputTableSizeMismatch);
    }

    let mut pos = 8;
    let mut button_frame_count: u32 = 0;
    for _ in 0..button_input_count {
        pos += 1;
        button_frame_count += get_u8(data, pos) as u32;
        pos += 1;
    }

    let mut direction_frame_count: u32 = 0;
    for _ in 0..direction_input_count {
        pos += 1;
        direction_frame_count += get_u8(data, pos) as u32;
        pos += 1;
    }

    let mut trick_frame_count: u32 = 0;
    for _ in 0..trick_input_count {
        trick_frame_count += (get_u16(data, pos) & 0xfff) as u32;
        pos += 2;
    }

    let frame_count = button_frame_count;
    if direction_frame_count != frame_count || trick_frame_count != frame_count {
        return Err(HanachanError::RkgInputCountMismatch);
    }

    let mut inputs = vec![0u16; frame_count as usize];

    pos = 8;
    let mut idx = 0usize;
    for _ in 0..button_input_count {
        let state = get_u8(data, pos);
        pos += 1;
        let frame_count = get_u8(data, pos);
        pos += 1;
        for _ in 0..frame_count {
            inputs[idx] = (state & 0x1f) as u16;
            idx += 1;
        }
    }

    idx = 0;
    for _ in 0..direction_input_count {
        let state = get_u8(data, pos);
        pos += 1;
        let frame_count = get_u8(data, pos);
        pos += 1;
        for _ in 0..frame_count {
            inputs[idx] |= (state as u16) << 8;
            idx += 1;
        }
    }

    idx = 0;
    for _ in 0..trick_input_count {
        let state = get_u8(data, pos) >> 4;
        let frame_count = get_u16(data, pos) & 0xfff;
        pos += 2;
        if state & 0x8 != 0 {
            return Err(HanachanError::RkgInvalidTrickState);
        }
        for _ in 0..frame_count {
            inputs[idx] |= (state as u16) << 5;
            idx += 1;
        }
    }

    Ok((frame_count, inputs))
}

impl Rkg {
    pub fn load(path: &Path) -> Result<Rkg, HanachanError> {
        let data = read_file(path)?;
        let header = parse_header(&data)?;

        let prefix = HEADER_SIZE + 4 + 4;
        if data.len() < prefix {
            return Err(HanachanError::RkgTooShort);
        }
        let src_size = get_u32(&data, HEADER_SIZE) as usize;
        if src_size > data.len() - prefix {
            return Err(HanachanError::RkgCompressedSizeOutOfRange);
        }

        let compressed = &data[prefix..prefix + src_size];
        let decompressed = yaz::decompress(compressed)?;

        let (frame_count, inputs) = parse_input(&decompressed)?;

        Ok(Rkg {
            minutes: header.minutes,
            seconds: header.seconds,
            milliseconds: header.milliseconds,
            track: header.track,
            vehicle: header.vehicle,
            character: header.character,
            year: header.year,
            month: header.month,
            day: header.day,
            controller: header.controller,
            ghost_type: header.ghost_type,
            automatic_drift: header.automatic_drift,
            frame_count,
            inputs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input_payload(buttons: &[(u8, u8)], dirs: &[(u8, u8)], tricks: &[(u8, u16)]) -> Vec<u8> {
        let mut body = Vec::new();
        for &(state, count) in buttons {
            body.push(state);
            body.push(count);
        }
        for &(state, count) in dirs {
            body.push(state);
            body.push(count);
        }
        for &(state, count) in tricks {
            let val = ((state as u16) << 12) | (count & 0xfff);
            body.extend_from_slice(&val.to_be_bytes());
        }

        let mut out = Vec::new();
        out.extend_from_slice(&(buttons.len() as u16).to_be_bytes());
        out.extend_from_slice(&(dirs.len() as u16).to_be_bytes());
        out.extend_from_slice(&(tricks.len() as u16).to_be_bytes());
        out.extend_from_slice(&body);
        out
    }

    #[test]
    fn parses_a_single_frame_input_stream() {
        let payload = input_payload(&[(0x1f, 1)], &[(3, 1)], &[(0, 1)]);
        let (frame_count, inputs) = parse_input(&payload).unwrap();
        assert_eq!(frame_count, 1);
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0] & 0x1f, 0x1f);
        assert_eq!((inputs[0] >> 8) & 0xff, 3);
    }

    #[test]
    fn rejects_mismatched_frame_counts() {
        let payload = input_payload(&[(0x1f, 2)], &[(3, 1)], &[(0, 1)]);
        assert!(matches!(
            parse_input(&payload),
            Err(HanachanError::RkgInputCountMismatch)
        ));
    }

    #[test]
    fn rejects_invalid_trick_state_bit() {
        let payload = input_payload(&[(0x1f, 1)], &[(3, 1)], &[(0x8, 1)]);
        assert!(matches!(
            parse_input(&payload),
            Err(HanachanError::RkgInvalidTrickState)
        ));
    }

    #[test]
    fn track_range_check_rejects_out_of_range_values() {
        assert!(track_is_valid(0x20).is_err());
        assert!(track_is_valid(0x18).is_ok());
        assert!(track_is_valid(0x00).is_ok());
    }
}
