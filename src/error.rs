//! Crate-wide error type. One variant family per loader, grounded in the
//! same `thiserror` style as `TransportError`/`TrackLoadError` in the
//! reference server codebase.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HanachanError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("RKG file too short for header")]
    RkgTooShort,
    #[error("bad RKGD magic")]
    BadRkgMagic,
    #[error("invalid race time in RKG header")]
    InvalidRaceTime,
    #[error("unsupported track id {0:#x}")]
    UnsupportedTrack(u8),
    #[error("unsupported vehicle id {0:#x}")]
    UnsupportedVehicle(u8),
    #[error("unsupported character id {0:#x}")]
    UnsupportedCharacter(u8),
    #[error("invalid controller id {0}")]
    InvalidController(u8),
    #[error("uncompressed RKG data is unsupported")]
    RkgNotCompressed,
    #[error("RKG input stream has inconsistent button/direction/trick frame counts")]
    RkgInputCountMismatch,
    #[error("RKG trick state bit 0x8 is invalid")]
    RkgInvalidTrickState,
    #[error("RKG compressed payload size exceeds file size")]
    RkgCompressedSizeOutOfRange,
    #[error("RKG input record table size does not match declared input counts")]
    RkgInputTableSizeMismatch,

    #[error("Yaz payload too short for header")]
    YazTooShort,
    #[error("bad Yaz0/Yaz1 magic")]
    BadYazMagic,
    #[error("Yaz payload truncated")]
    YazTruncated,
    #[error("Yaz back-reference before start of output")]
    YazRefUnderflow,
    #[error("Yaz back-reference would overrun output buffer")]
    YazOverrun,
    #[error("Yaz decompression did not fill the declared output size")]
    YazShortOutput,

    #[error("bad RKRD magic")]
    BadRkrdMagic,
    #[error("unsupported RKRD version {0}")]
    UnsupportedRkrdVersion(u32),
}
