use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::debug;

use crate::constants::MAX_ROM_SIZE;
use crate::error::{Chip8Error, Result};

/// Reads a ROM image from disk.
///
/// A ROM is a raw program with no header; it's returned exactly as stored.
/// Missing files, unreadable files and images that can't fit in memory are all
/// reported to the caller.
pub fn read_rom<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let rom = fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => Chip8Error::RomNotFound {
            path: path.to_path_buf(),
        },
        _ => Chip8Error::Io(e),
    })?;

    if rom.len() > MAX_ROM_SIZE {
        return Err(Chip8Error::RomTooLarge {
            size: rom.len(),
            max: MAX_ROM_SIZE,
        });
    }

    debug!("read {} byte ROM from {}", rom.len(), path.display());
    Ok(rom)
}
