use clap::Parser;
use hanachan::{player::Player, rkg::Rkg, rkrd::Rkrd, vec3::Vec3, vec4::Vec4};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(author, version, about = "Deterministic Mario Kart Wii ghost replay validator")]
struct Args {
    /// Path to the recorded ghost (.rkg)
    ghost: PathBuf,
    /// Path to the reference physics dump (.rkrd)
    dump: PathBuf,
    /// Override log level (trace|debug|info|warn|error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
    /// Stop at the first desyncing field instead of continuing to scan all of them on that frame
    #[arg(long)]
    stop_at_first_field: bool,
}

#[derive(Debug, PartialEq)]
enum ReplayOutcome {
    Match { frames_checked: u32 },
    Desync { frame: u32, field: &'static str },
}

/// Enables flush-to-zero for the duration of the process, matching the
/// original's `_MM_SET_FLUSH_ZERO_MODE(_MM_FLUSH_ZERO_ON)` call at the
/// top of `main`. Denormal results are round to zero instead of being
/// computed at reduced precision, which the wheelie/integration math
/// depends on bit-for-bit.
#[cfg(target_arch = "x86_64")]
fn enable_flush_to_zero() {
    const FLUSH_ZERO_ON: u32 = 1 << 15;
    unsafe {
        let mxcsr = std::arch::x86_64::_mm_getcsr();
        std::arch::x86_64::_mm_setcsr(mxcsr | FLUSH_ZERO_ON);
    }
}

#[cfg(not(target_arch = "x86_64"))]
fn enable_flush_to_zero() {
    tracing::warn!("flush-to-zero is only implemented for x86_64; results may not be bit-exact");
}

fn log_desync_f32(field: &str, frame: u32, got: f32, want: f32) {
    tracing::error!(
        field,
        frame,
        got,
        want,
        got_bits = format!("{:#010x}", got.to_bits()),
        want_bits = format!("{:#010x}", want.to_bits()),
        "desync"
    );
}

fn vec3_matches(field: &str, frame: u32, got: Vec3, want: Vec3) -> bool {
    if got.x.to_bits() != want.x.to_bits() {
        log_desync_f32(&format!("{field}.x"), frame, got.x, want.x);
        return false;
    }
    if got.y.to_bits() != want.y.to_bits() {
        log_desync_f32(&format!("{field}.y"), frame, got.y, want.y);
        return false;
    }
    if got.z.to_bits() != want.z.to_bits() {
        log_desync_f32(&format!("{field}.z"), frame, got.z, want.z);
        return false;
    }
    true
}

fn vec4_matches(field: &str, frame: u32, got: Vec4, want: Vec4) -> bool {
    if got.x.to_bits() != want.x.to_bits() {
        log_desync_f32(&format!("{field}.x"), frame, got.x, want.x);
        return false;
    }
    if got.y.to_bits() != want.y.to_bits() {
        log_desync_f32(&format!("{field}.y"), frame, got.y, want.y);
        return false;
    }
    if got.z.to_bits() != want.z.to_bits() {
        log_desync_f32(&format!("{field}.z"), frame, got.z, want.z);
        return false;
    }
    if got.w.to_bits() != want.w.to_bits() {
        log_desync_f32(&format!("{field}.w"), frame, got.w, want.w);
        return false;
    }
    true
}

fn replay(player: &mut Player, rkrd: &Rkrd, stop_at_first_field: bool) -> ReplayOutcome {
    let frame_count = (player.rkg.frame_count + 172).min(rkrd.frame_count);

    for frame in 0..frame_count {
        player.update(frame);
        let reference = &rkrd.frames[frame as usize];

        let mut ok = true;

        if !vec3_matches("dir", frame, player.dir, reference.dir) {
            if stop_at_first_field {
                return ReplayOutcome::Desync { frame, field: "dir" };
            }
            ok = false;
        }
        if !vec3_matches("pos", frame, player.pos, reference.pos) {
            if stop_at_first_field {
                return ReplayOutcome::Desync { frame, field: "pos" };
            }
            ok = false;
        }
        if !vec3_matches("speed0", frame, player.speed0, reference.speed0) {
            if stop_at_first_field {
                return ReplayOutcome::Desync { frame, field: "speed0" };
            }
            ok = false;
        }
        if !vec3_matches("speed", frame, player.speed, reference.speed) {
            if stop_at_first_field {
                return ReplayOutcome::Desync { frame, field: "speed" };
            }
            ok = false;
        }
        if player.speed1_norm.to_bits() != reference.speed1_norm.to_bits() {
            log_desync_f32("speed1_norm", frame, player.speed1_norm, reference.speed1_norm);
            if stop_at_first_field {
                return ReplayOutcome::Desync { frame, field: "speed1_norm" };
            }
            ok = false;
        }
        if !vec3_matches("rot_vec0", frame, player.rot_vec0, reference.rot_vec0) {
            if stop_at_first_field {
                return ReplayOutcome::Desync { frame, field: "rot_vec0" };
            }
            ok = false;
        }
        if !vec4_matches("rot", frame, player.rot, reference.rot) {
            if stop_at_first_field {
                return ReplayOutcome::Desync { frame, field: "rot" };
            }
            ok = false;
        }
        if !vec4_matches("rot2", frame, player.rot2, reference.rot2) {
            if stop_at_first_field {
                return ReplayOutcome::Desync { frame, field: "rot2" };
            }
            ok = false;
        }

        if !ok {
            return ReplayOutcome::Desync { frame, field: "multiple" };
        }
    }

    ReplayOutcome::Match { frames_checked: frame_count }
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&args.log_level))
        .init();

    enable_flush_to_zero();

    let rkg = match Rkg::load(&args.ghost) {
        Ok(rkg) => rkg,
        Err(err) => {
            tracing::error!(error = %err, path = ?args.ghost, "failed to load ghost");
            return ExitCode::FAILURE;
        }
    };

    let rkrd = match Rkrd::load(&args.dump) {
        Ok(rkrd) => rkrd,
        Err(err) => {
            tracing::error!(error = %err, path = ?args.dump, "failed to load reference dump");
            return ExitCode::FAILURE;
        }
    };

    let bsp = hanachan::bsp::Bsp::flame_runner();
    let mut player = Player::new(rkg, bsp);

    match replay(&mut player, &rkrd, args.stop_at_first_field) {
        ReplayOutcome::Match { frames_checked } => {
            tracing::info!(frames_checked, "replay matched the reference dump exactly");
        }
        ReplayOutcome::Desync { frame, field } => {
            tracing::error!(frame, field, "replay desynced from the reference dump");
        }
    }

    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_parse_with_positional_paths() {
        let args = Args::try_parse_from(["hanachan", "ghost.rkg", "ref.rkrd"]).unwrap();
        assert_eq!(args.ghost, PathBuf::from("ghost.rkg"));
        assert_eq!(args.dump, PathBuf::from("ref.rkrd"));
        assert_eq!(args.log_level, "info");
        assert!(!args.stop_at_first_field);
    }

    #[test]
    fn args_reject_missing_dump_path() {
        assert!(Args::try_parse_from(["hanachan", "ghost.rkg"]).is_err());
    }

    #[test]
    fn args_accept_stop_at_first_field_flag() {
        let args =
            Args::try_parse_from(["hanachan", "ghost.rkg", "ref.rkrd", "--stop-at-first-field"])
                .unwrap();
        assert!(args.stop_at_first_field);
    }
}
