use std::io::Read;

use log::{debug, trace, warn};

use crate::config::Config;
use crate::constants::{KEY_COUNT, MAX_ROM_SIZE, PROGRAM_START};
use crate::disasm::disassemble;
use crate::error::{Chip8Error, Result};
use crate::instruction;
use crate::state::{FrameBuffer, State};

/// # Chip-8
/// Chip-8 is a virtual machine and corresponding interpreted language.
///
/// Tracks:
///  - current `state`
///  - the `config` it was built with
///
/// Supplies interfaces for:
/// - loading roms
/// - pressing and releasing keys
/// - advancing the CPU one instruction at a time
/// - advancing its timers
/// - inspecting its state and frame buffer
///
/// There is no clock in here: the host decides how often to call `cycle` and must call
/// `advance_timers` at 60Hz on its own schedule.
/// A fresh machine is the only way to reset one.
pub struct Chip8 {
    state: State,
    config: Config,
}

impl Chip8 {
    pub fn new() -> Self {
        let config = Config::default();
        Chip8 {
            state: State::with_font(config.font_address),
            config,
        }
    }

    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Chip8 {
            state: State::with_font(config.font_address),
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// A read-only view of the whole machine.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Load a rom from a source file
    ///
    /// # Arguments
    /// * `reader` a file reader that contains a ROM
    pub fn load_rom(&mut self, reader: &mut dyn Read) -> Result<()> {
        let mut rom = Vec::new();
        reader.read_to_end(&mut rom)?;
        self.load_rom_bytes(&rom)
    }

    /// Copies `rom` into memory at 0x200. Nothing else is touched.
    pub fn load_rom_bytes(&mut self, rom: &[u8]) -> Result<()> {
        if rom.len() > MAX_ROM_SIZE {
            return Err(Chip8Error::RomTooLarge {
                size: rom.len(),
                max: MAX_ROM_SIZE,
            });
        }
        let start = usize::from(PROGRAM_START);
        self.state.memory[start..start + rom.len()].copy_from_slice(rom);
        debug!("loaded {} byte ROM at {:#05X}", rom.len(), PROGRAM_START);
        Ok(())
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.state.frame_buffer
    }

    /// Returns the FrameBuffer if it changed since the last call
    pub fn take_frame(&mut self) -> Option<FrameBuffer> {
        if self.state.draw_flag {
            self.state.draw_flag = false;
            Some(self.state.frame_buffer)
        } else {
            None
        }
    }

    /// Set the pressed status of key
    ///
    /// # Arguments
    /// * `key` the index of the key that was pressed, 0x0..=0xF
    pub fn key_press(&mut self, key: u8) -> Result<()> {
        self.set_key(key, true)
    }

    /// Unset the pressed status of key
    ///
    /// # Arguments
    /// * `key` the index of the key that was released, 0x0..=0xF
    pub fn key_release(&mut self, key: u8) -> Result<()> {
        self.set_key(key, false)
    }

    fn set_key(&mut self, key: u8, pressed: bool) -> Result<()> {
        if key as usize >= KEY_COUNT {
            return Err(Chip8Error::InvalidKey(key));
        }
        self.state.keypad[key as usize] = pressed;
        Ok(())
    }

    /// Advances the CPU by a single instruction
    /// - fetches the opcode at pc
    /// - moves pc to the next instruction
    /// - decodes and executes the opcode
    ///
    /// If execution fails the machine is left as it was after the fetch, so the host
    /// can inspect it and decide whether to carry on.
    pub fn cycle(&mut self) -> Result<()> {
        let address = self.state.pc;
        let op = self.current_op()?;
        self.state.pc = address.wrapping_add(0x2);

        trace!(
            "{:03X}: {:04X} {:<16} v{:02X?} i{:03X}",
            address,
            op,
            disassemble(op),
            self.state.v,
            self.state.i
        );

        match instruction::from_op(&op).and_then(|execute| execute(&op, &self.state, &self.config))
        {
            Ok(state) => {
                self.state = state;
                Ok(())
            }
            Err(e) => {
                warn!("{:03X}: {:04X} failed: {}", address, op, e);
                Err(e)
            }
        }
    }

    /// Handles the timers; the host calls this at 60Hz
    /// - decrements each timer that hasn't reached 0 yet
    pub fn advance_timers(&mut self) {
        self.state.delay_timer = self.state.delay_timer.saturating_sub(1);
        self.state.sound_timer = self.state.sound_timer.saturating_sub(1);
    }

    /// Whether a beep should currently be heard.
    pub fn sound_active(&self) -> bool {
        self.state.sound_timer > 0
    }

    /// Gets the opcode currently pointed at by the pc.
    /// Memory is stored as bytes, but opcodes are 16 bits so we combine two subsequent bytes.
    pub fn current_op(&self) -> Result<u16> {
        let range = self.state.memory_range(self.state.pc, 2)?;
        let bytes = &self.state.memory[range];
        Ok(u16::from(bytes[0]) << 8 | u16::from(bytes[1]))
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}
