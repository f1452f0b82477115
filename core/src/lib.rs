pub use chip8::Chip8;
pub use config::{Config, Quirks};
pub use disasm::disassemble;
pub use error::{Chip8Error, Result};
pub use rom::read_rom;

mod chip8;
mod config;
pub mod constants;
mod disasm;
mod error;
mod instruction;
mod opcode;
mod operations;
mod rom;
pub mod state;
