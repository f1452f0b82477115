use std::ops::Range;

use crate::constants::{
    DISPLAY_HEIGHT, DISPLAY_WIDTH, FONT_ADDRESS, KEY_COUNT, MEMORY_SIZE, PIXEL_OFF, PROGRAM_START,
    REGISTER_COUNT, SPRITE_SHEET, STACK_SIZE,
};
use crate::error::{Chip8Error, Result};

/// A snapshot of the Chip8 internal state
///
/// ## CPU
/// Registers
/// - (v) 16 primary 8-bit registers (V0..VF)
///     - the first 15 (V0..VE) are general purpose registers
///     - the 16th (VF) is overwritten as a flag by arithmetic and draw operations
/// - (i) a 16-bit memory address register
///
/// Counter
/// - (pc) a 16-bit program counter
///
/// Pointer
/// - (sp) the number of return addresses currently on the stack
///
/// Timers
/// - 2 8-bit timers (delay & sound)
/// - only ever decremented by the 60Hz timer path, never by executing instructions
///
/// ## Memory
/// - 16 entry stack of return addresses
/// - 4096 bytes of addressable memory
///     - 0x000..0x200 is reserved; the sprite sheet lives somewhere in there
///     - 0x200.. holds the ROM
/// - 64x32 frame buffer
///
/// ## Input
/// - pressed status of the keys 0..F
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct State {
    pub v: [u8; REGISTER_COUNT],
    pub i: u16,
    pub pc: u16,
    pub sp: u8,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub stack: [u16; STACK_SIZE],
    pub memory: [u8; MEMORY_SIZE],
    pub frame_buffer: FrameBuffer,
    pub draw_flag: bool,
    pub keypad: [bool; KEY_COUNT],
}

impl State {
    /// A zeroed machine with the sprite sheet at the conventional address.
    pub fn new() -> Self {
        State::with_font(FONT_ADDRESS)
    }

    /// A zeroed machine with the sprite sheet installed at `font_address`.
    /// The caller is responsible for the address leaving room for all 80 bytes.
    pub fn with_font(font_address: u16) -> Self {
        let mut memory = [0; MEMORY_SIZE];
        let font = usize::from(font_address);
        memory[font..font + SPRITE_SHEET.len()].copy_from_slice(&SPRITE_SHEET);

        State {
            v: [0; REGISTER_COUNT],
            i: 0,
            pc: PROGRAM_START,
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            stack: [0; STACK_SIZE],
            memory,
            frame_buffer: [[PIXEL_OFF; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            draw_flag: false,
            keypad: [false; KEY_COUNT],
        }
    }

    /// The memory indices covering `len` bytes from `start`,
    /// or the first address that falls outside of memory.
    pub fn memory_range(&self, start: u16, len: usize) -> Result<Range<usize>> {
        let start = usize::from(start);
        let end = start + len;
        if end > MEMORY_SIZE {
            return Err(Chip8Error::MemoryOutOfBounds {
                address: start.max(MEMORY_SIZE) as u16,
            });
        }
        Ok(start..end)
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

/// The FrameBuffer is indexed as [y][x]; every cell is either `PIXEL_ON` or `PIXEL_OFF`.
pub type FrameBuffer = [[u32; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
