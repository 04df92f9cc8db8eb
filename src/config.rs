use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// opcode interpretations that differ between CHIP-8 dialects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Quirks {
    /// 8XY6/8XYE shift VX in place rather than shifting VY into VX
    pub shift: bool,
    /// FX55/FX65 leave I where it was rather than moving it past the block
    pub load_store: bool,
}

impl Quirks {
    /// both quirks on or both off
    pub fn uniform(value: bool) -> Self {
        Quirks {
            shift: value,
            load_store: value,
        }
    }
}

/// run a CHIP-8 program in the terminal
#[derive(Debug, Parser)]
#[command(name = "chip8-vm", version)]
pub struct Config {
    /// program image to load at 0x200
    pub rom: PathBuf,

    /// time per instruction, in milliseconds
    #[arg(long, default_value_t = 1.43)]
    pub period_ms: f32,

    /// turn on both the shift and load/store quirks
    #[arg(long)]
    pub quirks: bool,

    /// 8XY6/8XYE shift VX in place
    #[arg(long)]
    pub shift_quirk: bool,

    /// FX55/FX65 leave I unchanged
    #[arg(long)]
    pub load_store_quirk: bool,

    /// no beeping
    #[arg(long)]
    pub mute: bool,
}

impl Config {
    pub fn quirks(&self) -> Quirks {
        Quirks {
            shift: self.quirks || self.shift_quirk,
            load_store: self.quirks || self.load_store_quirk,
        }
    }

    /// the instruction period; nonsense values fall back to no throttling
    pub fn period(&self) -> Duration {
        Duration::try_from_secs_f32(self.period_ms / 1000.0).unwrap_or(Duration::ZERO)
    }
}
