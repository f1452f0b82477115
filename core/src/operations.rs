//! Instruction handlers.
//!
//! Each handler receives the state as it is after the fetch (pc already points at the
//! following instruction) and returns the state after execution. Handlers only touch
//! `pc` to jump, call, return or skip.

use crate::config::Config;
use crate::constants::{
    DISPLAY_HEIGHT, DISPLAY_WIDTH, FLAG, FONT_SPRITE_SIZE, PIXEL_OFF, PIXEL_ON, SPRITE_WIDTH,
    STACK_SIZE,
};
use crate::error::{Chip8Error, Result};
use crate::opcode::Opcode;
use crate::state::State;

/// Signature shared by every instruction handler.
pub type Operation = fn(op: &dyn Opcode, state: &State, config: &Config) -> Result<State>;

/// Moves the pc past the next instruction when `condition` holds.
fn skip_if(state: &State, condition: bool) -> State {
    let pc = if condition {
        state.pc.wrapping_add(0x2)
    } else {
        state.pc
    };
    State { pc, ..*state }
}

/// clear
pub fn clr(_op: &dyn Opcode, state: &State, _config: &Config) -> Result<State> {
    Ok(State {
        frame_buffer: [[PIXEL_OFF; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
        draw_flag: true,
        ..*state
    })
}

/// PC = STACK.pop()
pub fn rts(_op: &dyn Opcode, state: &State, _config: &Config) -> Result<State> {
    if state.sp == 0 {
        return Err(Chip8Error::StackUnderflow);
    }
    let sp = state.sp - 0x1;
    Ok(State {
        pc: state.stack[sp as usize],
        sp,
        ..*state
    })
}

/// PC = addr
pub fn jump(op: &dyn Opcode, state: &State, _config: &Config) -> Result<State> {
    Ok(State {
        pc: op.nnn(),
        ..*state
    })
}

/// STACK.push(PC); PC = addr
pub fn call(op: &dyn Opcode, state: &State, _config: &Config) -> Result<State> {
    if state.sp as usize == STACK_SIZE {
        return Err(Chip8Error::StackOverflow);
    }
    let mut stack = state.stack;
    stack[state.sp as usize] = state.pc;
    Ok(State {
        pc: op.nnn(),
        sp: state.sp + 0x1,
        stack,
        ..*state
    })
}

/// if Vx == nn then pc += 2
pub fn ske(op: &dyn Opcode, state: &State, _config: &Config) -> Result<State> {
    Ok(skip_if(state, state.v[op.x() as usize] == op.nn()))
}

/// if Vx != nn then pc += 2
pub fn skne(op: &dyn Opcode, state: &State, _config: &Config) -> Result<State> {
    Ok(skip_if(state, state.v[op.x() as usize] != op.nn()))
}

/// if Vx == Vy then pc += 2
pub fn skre(op: &dyn Opcode, state: &State, _config: &Config) -> Result<State> {
    Ok(skip_if(
        state,
        state.v[op.x() as usize] == state.v[op.y() as usize],
    ))
}

/// Vx = nn
pub fn load(op: &dyn Opcode, state: &State, _config: &Config) -> Result<State> {
    let mut v = state.v;
    v[op.x() as usize] = op.nn();
    Ok(State { v, ..*state })
}

/// Vx += nn
/// Overflow wraps and, unlike `addr`, leaves VF alone
pub fn add(op: &dyn Opcode, state: &State, _config: &Config) -> Result<State> {
    let mut v = state.v;
    v[op.x() as usize] = v[op.x() as usize].wrapping_add(op.nn());
    Ok(State { v, ..*state })
}

/// Vx = Vy
pub fn mv(op: &dyn Opcode, state: &State, _config: &Config) -> Result<State> {
    let mut v = state.v;
    v[op.x() as usize] = v[op.y() as usize];
    Ok(State { v, ..*state })
}

/// Shared body of the bitwise operations.
fn logic(op: &dyn Opcode, state: &State, config: &Config, f: fn(u8, u8) -> u8) -> State {
    let mut v = state.v;
    v[op.x() as usize] = f(v[op.x() as usize], v[op.y() as usize]);
    if config.quirks.logic_resets_flag {
        v[FLAG] = 0x0;
    }
    State { v, ..*state }
}

/// Vx |= Vy
pub fn or(op: &dyn Opcode, state: &State, config: &Config) -> Result<State> {
    Ok(logic(op, state, config, |x, y| x | y))
}

/// Vx &= Vy
pub fn and(op: &dyn Opcode, state: &State, config: &Config) -> Result<State> {
    Ok(logic(op, state, config, |x, y| x & y))
}

/// Vx ^= Vy
pub fn xor(op: &dyn Opcode, state: &State, config: &Config) -> Result<State> {
    Ok(logic(op, state, config, |x, y| x ^ y))
}

/// Vx += Vy; VF = carry
pub fn addr(op: &dyn Opcode, state: &State, _config: &Config) -> Result<State> {
    let (res, carry) = state.v[op.x() as usize].overflowing_add(state.v[op.y() as usize]);
    let mut v = state.v;
    v[op.x() as usize] = res;
    v[FLAG] = carry as u8;
    Ok(State { v, ..*state })
}

/// Vx -= Vy; VF = !borrow
pub fn sub(op: &dyn Opcode, state: &State, _config: &Config) -> Result<State> {
    let (res, borrow) = state.v[op.x() as usize].overflowing_sub(state.v[op.y() as usize]);
    let mut v = state.v;
    v[op.x() as usize] = res;
    v[FLAG] = !borrow as u8;
    Ok(State { v, ..*state })
}

/// The register a shift reads from.
fn shift_source(op: &dyn Opcode, state: &State, config: &Config) -> u8 {
    if config.quirks.shift_uses_vy {
        state.v[op.y() as usize]
    } else {
        state.v[op.x() as usize]
    }
}

/// Vx >>= 1; VF = bit shifted out
pub fn shr(op: &dyn Opcode, state: &State, config: &Config) -> Result<State> {
    let source = shift_source(op, state, config);
    let mut v = state.v;
    v[op.x() as usize] = source >> 1;
    v[FLAG] = source & 0x1;
    Ok(State { v, ..*state })
}

/// Vx = Vy - Vx; VF = !borrow
pub fn subn(op: &dyn Opcode, state: &State, _config: &Config) -> Result<State> {
    let (res, borrow) = state.v[op.y() as usize].overflowing_sub(state.v[op.x() as usize]);
    let mut v = state.v;
    v[op.x() as usize] = res;
    v[FLAG] = !borrow as u8;
    Ok(State { v, ..*state })
}

/// Vx <<= 1; VF = bit shifted out
pub fn shl(op: &dyn Opcode, state: &State, config: &Config) -> Result<State> {
    let source = shift_source(op, state, config);
    let mut v = state.v;
    v[op.x() as usize] = source << 1;
    v[FLAG] = source >> 7;
    Ok(State { v, ..*state })
}

/// if Vx != Vy then pc += 2
pub fn skrne(op: &dyn Opcode, state: &State, _config: &Config) -> Result<State> {
    Ok(skip_if(
        state,
        state.v[op.x() as usize] != state.v[op.y() as usize],
    ))
}

/// I = addr
pub fn loadi(op: &dyn Opcode, state: &State, _config: &Config) -> Result<State> {
    Ok(State {
        i: op.nnn(),
        ..*state
    })
}

/// PC = V0 + addr
pub fn jumpi(op: &dyn Opcode, state: &State, config: &Config) -> Result<State> {
    let offset = if config.quirks.jump_with_vx {
        state.v[op.x() as usize]
    } else {
        state.v[0x0]
    };
    Ok(State {
        pc: op.nnn() + u16::from(offset),
        ..*state
    })
}

/// Vx = rand_byte & nn
pub fn rnd(op: &dyn Opcode, state: &State, _config: &Config) -> Result<State> {
    let rand_byte: u8 = rand::random();
    let mut v = state.v;
    v[op.x() as usize] = rand_byte & op.nn();
    Ok(State { v, ..*state })
}

/// draw_sprite(x=Vx y=Vy size=n)
/// XORs the sprite stored at I..I+n onto the FrameBuffer at x, y.
/// The origin wraps around the screen but the sprite itself is clipped at the edges.
/// Sets VF if any pixel is erased.
pub fn draw(op: &dyn Opcode, state: &State, _config: &Config) -> Result<State> {
    let sprite = &state.memory[state.memory_range(state.i, op.n() as usize)?];
    let origin_x = state.v[op.x() as usize] as usize % DISPLAY_WIDTH;
    let origin_y = state.v[op.y() as usize] as usize % DISPLAY_HEIGHT;

    let mut v = state.v;
    let mut frame_buffer = state.frame_buffer;

    // Reset the flag (used for collision detection)
    v[FLAG] = 0x0;

    for (row, byte) in sprite.iter().enumerate() {
        let y = origin_y + row;
        if y >= DISPLAY_HEIGHT {
            break;
        }
        for bit in 0..SPRITE_WIDTH {
            let x = origin_x + bit;
            if x >= DISPLAY_WIDTH {
                break;
            }
            if byte & (0x80 >> bit) == 0 {
                continue;
            }
            let pixel = &mut frame_buffer[y][x];
            if *pixel == PIXEL_ON {
                v[FLAG] = 0x1;
            }
            *pixel ^= PIXEL_ON;
        }
    }

    Ok(State {
        draw_flag: true,
        v,
        frame_buffer,
        ..*state
    })
}

/// if Vx.pressed then pc += 2
pub fn skpr(op: &dyn Opcode, state: &State, _config: &Config) -> Result<State> {
    let key = state.v[op.x() as usize] & 0xF;
    Ok(skip_if(state, state.keypad[key as usize]))
}

/// if !Vx.pressed then pc += 2
pub fn skup(op: &dyn Opcode, state: &State, _config: &Config) -> Result<State> {
    let key = state.v[op.x() as usize] & 0xF;
    Ok(skip_if(state, !state.keypad[key as usize]))
}

/// Vx = DT
pub fn moved(op: &dyn Opcode, state: &State, _config: &Config) -> Result<State> {
    let mut v = state.v;
    v[op.x() as usize] = state.delay_timer;
    Ok(State { v, ..*state })
}

/// await keypress for Vx
/// Without a pressed key the pc is rewound so this instruction runs again next cycle.
/// With several keys down the lowest one wins.
pub fn keyd(op: &dyn Opcode, state: &State, _config: &Config) -> Result<State> {
    match state.keypad.iter().position(|&pressed| pressed) {
        Some(key) => {
            let mut v = state.v;
            v[op.x() as usize] = key as u8;
            Ok(State { v, ..*state })
        }
        None => Ok(State {
            pc: state.pc.wrapping_sub(0x2),
            ..*state
        }),
    }
}

/// DT = Vx
pub fn setdt(op: &dyn Opcode, state: &State, _config: &Config) -> Result<State> {
    Ok(State {
        delay_timer: state.v[op.x() as usize],
        ..*state
    })
}

/// ST = Vx
pub fn setst(op: &dyn Opcode, state: &State, _config: &Config) -> Result<State> {
    Ok(State {
        sound_timer: state.v[op.x() as usize],
        ..*state
    })
}

/// I += Vx
pub fn addi(op: &dyn Opcode, state: &State, config: &Config) -> Result<State> {
    let i = state.i.wrapping_add(u16::from(state.v[op.x() as usize]));
    let mut v = state.v;
    if config.quirks.index_overflow_flag {
        v[FLAG] = (i > 0x0FFF) as u8;
    }
    Ok(State { i, v, ..*state })
}

/// I = font + Vx * 5
/// Set I to the memory address of the glyph for the low nibble of Vx
pub fn ldspr(op: &dyn Opcode, state: &State, config: &Config) -> Result<State> {
    let digit = u16::from(state.v[op.x() as usize] & 0xF);
    Ok(State {
        i: config.font_address + digit * FONT_SPRITE_SIZE as u16,
        ..*state
    })
}

/// mem[I..I+3] = bcd(Vx)
/// Store BCD repr of Vx in memory starting at address I
pub fn bcd(op: &dyn Opcode, state: &State, _config: &Config) -> Result<State> {
    let value = state.v[op.x() as usize];
    let bcd = [value / 100, value / 10 % 10, value % 10];
    let range = state.memory_range(state.i, bcd.len())?;
    let mut memory = state.memory;
    memory[range].copy_from_slice(&bcd);
    Ok(State { memory, ..*state })
}

/// Where I ends up after copying V0..=Vx to or from memory.
fn index_after_transfer(op: &dyn Opcode, state: &State, config: &Config) -> u16 {
    if config.quirks.load_store_increments_index {
        state.i.wrapping_add(u16::from(op.x()) + 1)
    } else {
        state.i
    }
}

/// mem[I..=I+x] = V0..=Vx
pub fn stor(op: &dyn Opcode, state: &State, config: &Config) -> Result<State> {
    let count = op.x() as usize + 1;
    let range = state.memory_range(state.i, count)?;
    let mut memory = state.memory;
    memory[range].copy_from_slice(&state.v[..count]);
    Ok(State {
        i: index_after_transfer(op, state, config),
        memory,
        ..*state
    })
}

/// V0..=Vx = mem[I..=I+x]
pub fn read(op: &dyn Opcode, state: &State, config: &Config) -> Result<State> {
    let count = op.x() as usize + 1;
    let range = state.memory_range(state.i, count)?;
    let mut v = state.v;
    v[..count].copy_from_slice(&state.memory[range]);
    Ok(State {
        i: index_after_transfer(op, state, config),
        v,
        ..*state
    })
}
