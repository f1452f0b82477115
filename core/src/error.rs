use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while loading or running a program.
///
/// None of these are fatal to the interpreter: after any of them the machine
/// state is left consistent and can be inspected, reset or stepped again.
#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("ROM is too large ({size} bytes), max size is {max} bytes")]
    RomTooLarge { size: usize, max: usize },

    #[error("ROM not found: {}", path.display())]
    RomNotFound { path: PathBuf },

    #[error("unable to read ROM: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown opcode {0:#06X}")]
    UnknownOpcode(u16),

    #[error("stack overflow: subroutine calls nested deeper than the stack allows")]
    StackOverflow,

    #[error("stack underflow: return with an empty call stack")]
    StackUnderflow,

    #[error("memory access out of bounds at address {address:#06X}")]
    MemoryOutOfBounds { address: u16 },

    #[error("invalid key {0:#04X}, keys range from 0x0 to 0xF")]
    InvalidKey(u8),

    #[error("font at {0:#06X} would not fit in reserved memory")]
    InvalidFontAddress(u16),
}

pub type Result<T> = std::result::Result<T, Chip8Error>;
