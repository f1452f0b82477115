use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use env_logger::Env;

use emu8_core::constants::{DEFAULT_CYCLE_DELAY_MS, FONT_ADDRESS};
use emu8_core::{Config, Quirks};

mod keymap;
mod run;

/// Which family of interpreters to mimic where they disagree.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum QuirkSet {
    /// Behavior most modern ROMs expect
    Modern,
    /// The original COSMAC VIP interpreter
    Vip,
    /// SUPER-CHIP
    Schip,
}

impl QuirkSet {
    fn quirks(self) -> Quirks {
        match self {
            QuirkSet::Modern => Quirks::default(),
            QuirkSet::Vip => Quirks::cosmac_vip(),
            QuirkSet::Schip => Quirks::super_chip(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about = "Emu-8, a Chip-8 interpreter")]
struct Args {
    /// Path to the ROM file to run
    rom: PathBuf,

    /// Size multiplier for each pixel
    #[arg(short, long, default_value_t = 10)]
    scale: u32,

    /// Milliseconds between CPU cycles
    #[arg(short, long, value_parser = parse_cycle_delay, default_value_t = DEFAULT_CYCLE_DELAY_MS)]
    cycle_delay: f64,

    /// Where to install the font, decimal or 0x-prefixed hex
    #[arg(long, value_parser = parse_address, default_value_t = FONT_ADDRESS)]
    font_address: u16,

    /// Interpreter family to follow for ambiguous instructions
    #[arg(short, long, value_enum, default_value_t = QuirkSet::Modern)]
    quirks: QuirkSet,

    /// Let FX1E set VF when I moves past 0xFFF
    #[arg(long)]
    index_overflow_flag: bool,

    /// Start paused; press N to step and P to resume
    #[arg(long)]
    paused: bool,
}

impl Args {
    fn options(&self) -> run::Options {
        let mut quirks = self.quirks.quirks();
        quirks.index_overflow_flag |= self.index_overflow_flag;
        run::Options {
            rom: self.rom.clone(),
            scale: self.scale,
            cycle_delay: Duration::from_secs_f64(self.cycle_delay / 1000.0),
            config: Config {
                font_address: self.font_address,
                quirks,
            },
            start_paused: self.paused,
        }
    }
}

fn parse_address(s: &str) -> Result<u16, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid address {:?}: {}", s, e))
}

fn parse_cycle_delay(s: &str) -> Result<f64, String> {
    let delay: f64 = s
        .parse()
        .map_err(|e| format!("invalid delay {:?}: {}", s, e))?;
    if !delay.is_finite() || delay < 0.0 {
        return Err(format!("delay must be a non-negative number, got {}", s));
    }
    Ok(delay)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    run::run(args.options())
}
