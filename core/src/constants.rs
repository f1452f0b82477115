/// Size of the addressable memory in bytes.
pub const MEMORY_SIZE: usize = 4096;

/// ROMs are loaded (and execution starts) at this address.
/// Everything below it is reserved for the interpreter.
pub const PROGRAM_START: u16 = 0x200;

/// The largest ROM that fits between `PROGRAM_START` and the end of memory.
pub const MAX_ROM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// Frame buffer cell values. Cells are 32 bits wide so a renderer can treat them as pixels.
pub const PIXEL_ON: u32 = 0xFFFF_FFFF;
pub const PIXEL_OFF: u32 = 0x0000_0000;

/// Sprites are always 8 pixels wide.
pub const SPRITE_WIDTH: usize = 8;

pub const REGISTER_COUNT: usize = 16;

/// Index of VF, the carry/borrow/collision flag.
pub const FLAG: usize = 0xF;

/// Maximum depth of nested subroutine calls.
pub const STACK_SIZE: usize = 16;

pub const KEY_COUNT: usize = 16;

/// Conventional location of the font in the reserved low memory.
pub const FONT_ADDRESS: u16 = 0x050;

/// Bytes (rows) per font glyph.
pub const FONT_SPRITE_SIZE: usize = 5;

/// # Sprite sheet
/// Glyphs for the hex digits 0..F, each 4 pixels wide and 5 rows tall.
///
/// ```text
/// 0xF0  ****
/// 0x90  *  *
/// 0x90  *  *
/// 0x90  *  *
/// 0xF0  ****
/// ```
pub const SPRITE_SHEET: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// The delay and sound timers count down at this rate, independently of the CPU.
pub const TIMER_HZ: u32 = 60;

/// Default time between two CPU cycles in milliseconds (roughly 700 instructions per second).
pub const DEFAULT_CYCLE_DELAY_MS: f64 = 1.4;
