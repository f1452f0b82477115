use crate::constants::{FONT_ADDRESS, PROGRAM_START, SPRITE_SHEET};
use crate::error::{Chip8Error, Result};

/// # Quirks
/// Historical interpreters disagree on a handful of instructions and ROMs are
/// written against one behavior or the other.
///
/// The default is the behavior most modern ROMs expect:
/// - `8XY6`/`8XYE` shift Vx in place
/// - `BNNN` jumps to NNN + V0
/// - `FX1E` leaves VF alone
/// - `FX55`/`FX65` leave I unchanged
/// - `8XY1`/`8XY2`/`8XY3` leave VF alone
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Quirks {
    /// `8XY6`/`8XYE` shift Vy and store the result in Vx.
    pub shift_uses_vy: bool,
    /// `BXNN` jumps to XNN + Vx instead of NNN + V0.
    pub jump_with_vx: bool,
    /// `FX1E` sets VF when I moves past 0xFFF.
    pub index_overflow_flag: bool,
    /// `FX55`/`FX65` leave I pointing just past the last register copied.
    pub load_store_increments_index: bool,
    /// `8XY1`/`8XY2`/`8XY3` reset VF to 0.
    pub logic_resets_flag: bool,
}

impl Quirks {
    /// The original COSMAC VIP interpreter.
    pub fn cosmac_vip() -> Self {
        Quirks {
            shift_uses_vy: true,
            load_store_increments_index: true,
            logic_resets_flag: true,
            ..Quirks::default()
        }
    }

    /// SUPER-CHIP on the HP48.
    pub fn super_chip() -> Self {
        Quirks {
            jump_with_vx: true,
            ..Quirks::default()
        }
    }
}

/// Interpreter configuration, fixed for the lifetime of a `Chip8`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Where the hex digit sprite sheet is installed.
    pub font_address: u16,
    pub quirks: Quirks,
}

impl Config {
    /// The font has to live entirely inside the reserved area below the program.
    pub fn validate(&self) -> Result<()> {
        let end = usize::from(self.font_address) + SPRITE_SHEET.len();
        if end > usize::from(PROGRAM_START) {
            return Err(Chip8Error::InvalidFontAddress(self.font_address));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            font_address: FONT_ADDRESS,
            quirks: Quirks::default(),
        }
    }
}
