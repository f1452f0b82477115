use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Error, Result};
use log::{error, info};
use sdl2::event::Event;

use emu8_core::constants::TIMER_HZ;
use emu8_core::{disassemble, read_rom, Chip8, Config};
use emu8_display::Display;

use crate::keymap::{self, Control};

/// Everything the host needs to know to run a ROM.
#[derive(Debug)]
pub struct Options {
    pub rom: PathBuf,
    pub scale: u32,
    pub cycle_delay: Duration,
    pub config: Config,
    pub start_paused: bool,
}

/// A freshly constructed machine with `rom` loaded; also how a reset happens.
fn boot(config: Config, rom: &[u8]) -> Result<Chip8> {
    let mut chip8 = Chip8::with_config(config)?;
    chip8.load_rom_bytes(rom)?;
    Ok(chip8)
}

/// Executes one instruction. Returns false if it failed and the host should pause.
fn execute(chip8: &mut Chip8, announce: bool) -> bool {
    if announce {
        if let Ok(op) = chip8.current_op() {
            info!("{:03X}: {}", chip8.state().pc, disassemble(op));
        }
    }
    match chip8.cycle() {
        Ok(()) => true,
        Err(e) => {
            error!("{} at {:03X}, pausing", e, chip8.state().pc);
            false
        }
    }
}

pub fn run(options: Options) -> Result<()> {
    let rom = read_rom(&options.rom)?;
    let mut chip8 = boot(options.config, &rom)?;
    info!("loaded {} ({} bytes)", options.rom.display(), rom.len());

    // Get SDL2 context
    let sdl = sdl2::init().map_err(Error::msg)?;
    let mut display = Display::new(&sdl, options.scale).map_err(Error::msg)?;
    let mut events = sdl.event_pump().map_err(Error::msg)?;
    display.render(chip8.frame_buffer()).map_err(Error::msg)?;

    // Set initial timing
    let timer_interval = Duration::from_secs(1) / TIMER_HZ;
    let mut last_cycle = Instant::now();
    let mut last_timer = Instant::now();

    // Whether or not the cycle delay should be respected
    let mut fast_forward = false;
    let mut paused = options.start_paused;
    let mut step = false;

    'event: loop {
        // Handle input
        for event in events.poll_iter() {
            match event {
                Event::Quit { .. } => break 'event,
                Event::KeyDown {
                    keycode: Some(key),
                    repeat: false,
                    ..
                } => match (keymap::keypad(key), keymap::control(key)) {
                    (Some(index), _) => chip8.key_press(index)?,
                    (_, Some(Control::Quit)) => break 'event,
                    (_, Some(Control::TogglePause)) => {
                        paused = !paused;
                        last_timer = Instant::now();
                        info!("{}", if paused { "paused" } else { "resumed" });
                    }
                    (_, Some(Control::Step)) => step = true,
                    (_, Some(Control::Reset)) => {
                        chip8 = boot(options.config, &rom)?;
                        display.render(chip8.frame_buffer()).map_err(Error::msg)?;
                        info!("reset");
                    }
                    (_, Some(Control::FastForward)) => fast_forward = true,
                    _ => continue,
                },
                Event::KeyUp {
                    keycode: Some(key), ..
                } => match (keymap::keypad(key), keymap::control(key)) {
                    (Some(index), _) => chip8.key_release(index)?,
                    (_, Some(Control::FastForward)) => fast_forward = false,
                    _ => continue,
                },
                _ => continue,
            };
        }

        // Update state
        let now = Instant::now();
        if paused {
            if step {
                step = false;
                execute(&mut chip8, true);
            }
        } else {
            if fast_forward || now - last_cycle >= options.cycle_delay {
                last_cycle = now;
                paused = !execute(&mut chip8, false);
            }
            // Timers run at 60Hz no matter how fast instructions are executed
            while now - last_timer >= timer_interval {
                last_timer += timer_interval;
                chip8.advance_timers();
            }
        }

        // If the draw flag is set, unset it and render the current frame
        if let Some(frame) = chip8.take_frame() {
            display.render(&frame).map_err(Error::msg)?;
        }

        // Handle timing
        if !fast_forward {
            let elapsed_cycle_time = now.elapsed();
            if options.cycle_delay > elapsed_cycle_time {
                std::thread::sleep(options.cycle_delay - elapsed_cycle_time);
            }
        }
    }

    info!("shutting down");
    Ok(())
}
