use crate::error::{Chip8Error, Result};
use crate::opcode::Opcode;
use crate::operations::*;

/// Selects the correct Operation for a given Opcode
pub fn from_op(op: &dyn Opcode) -> Result<Operation> {
    let operation: Operation = match op.nibbles() {
        (0x0, 0x0, 0xE, 0x0) => clr,
        (0x0, 0x0, 0xE, 0xE) => rts,
        (0x1, ..) => jump,
        (0x2, ..) => call,
        (0x3, ..) => ske,
        (0x4, ..) => skne,
        (0x5, .., 0x0) => skre,
        (0x6, ..) => load,
        (0x7, ..) => add,
        (0x8, .., 0x0) => mv,
        (0x8, .., 0x1) => or,
        (0x8, .., 0x2) => and,
        (0x8, .., 0x3) => xor,
        (0x8, .., 0x4) => addr,
        (0x8, .., 0x5) => sub,
        (0x8, .., 0x6) => shr,
        (0x8, .., 0x7) => subn,
        (0x8, .., 0xE) => shl,
        (0x9, .., 0x0) => skrne,
        (0xA, ..) => loadi,
        (0xB, ..) => jumpi,
        (0xC, ..) => rnd,
        (0xD, ..) => draw,
        (0xE, _, 0x9, 0xE) => skpr,
        (0xE, _, 0xA, 0x1) => skup,
        (0xF, _, 0x0, 0x7) => moved,
        (0xF, _, 0x0, 0xA) => keyd,
        (0xF, _, 0x1, 0x5) => setdt,
        (0xF, _, 0x1, 0x8) => setst,
        (0xF, _, 0x1, 0xE) => addi,
        (0xF, _, 0x2, 0x9) => ldspr,
        (0xF, _, 0x3, 0x3) => bcd,
        (0xF, _, 0x5, 0x5) => stor,
        (0xF, _, 0x6, 0x5) => read,
        _ => return Err(Chip8Error::UnknownOpcode(op.word())),
    };
    Ok(operation)
}

#[cfg(test)]
mod test_instruction {
    use super::*;
    use crate::config::{Config, Quirks};
    use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH, PIXEL_OFF, PIXEL_ON};
    use crate::state::State;

    const X: u32 = PIXEL_ON;
    const O: u32 = PIXEL_OFF;

    fn execute(op: u16, state: &State) -> State {
        execute_with(op, state, &Config::default())
    }

    fn execute_with(op: u16, state: &State, config: &Config) -> State {
        from_op(&op).unwrap()(&op, state, config).unwrap()
    }

    fn try_execute(op: u16, state: &State) -> Result<State> {
        from_op(&op)?(&op, state, &Config::default())
    }

    #[test]
    fn test_unknown_opcodes() {
        for op in [0x0123u16, 0x5121, 0x800F, 0x9121, 0xE1FF, 0xF1FF].iter() {
            assert!(matches!(
                from_op(op),
                Err(Chip8Error::UnknownOpcode(word)) if word == *op
            ));
        }
    }

    #[test]
    fn test_00e0_cls() {
        let mut state = State::new();
        state.frame_buffer[0][0] = X;
        state.frame_buffer[31][63] = X;
        let state = execute(0x00E0, &state);
        assert!(state.frame_buffer.iter().flatten().all(|&pixel| pixel == O));
        assert!(state.draw_flag);
    }

    #[test]
    fn test_00ee_ret() {
        let mut state = State::new();
        state.sp = 0x1;
        state.stack[0] = 0x0ABC;
        let state = execute(0x00EE, &state);
        assert_eq!(state.sp, 0x0);
        assert_eq!(state.pc, 0x0ABC);
    }

    #[test]
    fn test_00ee_ret_underflows() {
        let state = State::new();
        assert!(matches!(
            try_execute(0x00EE, &state),
            Err(Chip8Error::StackUnderflow)
        ));
    }

    #[test]
    fn test_1nnn_jp() {
        let state = State::new();
        let state = execute(0x1ABC, &state);
        assert_eq!(state.pc, 0x0ABC);
    }

    #[test]
    fn test_2nnn_call() {
        let mut state = State::new();
        state.pc = 0x0ABC;
        let state = execute(0x2123, &state);
        assert_eq!(state.sp, 0x1);
        assert_eq!(state.stack[0], 0x0ABC);
        assert_eq!(state.pc, 0x0123);
    }

    #[test]
    fn test_2nnn_call_overflows() {
        let mut state = State::new();
        state.sp = 16;
        assert!(matches!(
            try_execute(0x2123, &state),
            Err(Chip8Error::StackOverflow)
        ));
    }

    #[test]
    fn test_call_then_ret_returns_to_caller() {
        let mut state = State::new();
        state.pc = 0x0202;
        let state = execute(0x2400, &state);
        let state = execute(0x00EE, &state);
        assert_eq!(state.pc, 0x0202);
        assert_eq!(state.sp, 0);
    }

    #[test]
    fn test_3xnn_se_skips() {
        let mut state = State::new();
        state.v[0x1] = 0x11;
        let state = execute(0x3111, &state);
        assert_eq!(state.pc, 0x0202);
    }

    #[test]
    fn test_3xnn_se_doesntskip() {
        let state = State::new();
        let state = execute(0x3111, &state);
        assert_eq!(state.pc, 0x0200);
    }

    #[test]
    fn test_4xnn_sne_skips() {
        let state = State::new();
        let state = execute(0x4111, &state);
        assert_eq!(state.pc, 0x0202);
    }

    #[test]
    fn test_4xnn_sne_doesntskip() {
        let mut state = State::new();
        state.v[0x1] = 0x11;
        let state = execute(0x4111, &state);
        assert_eq!(state.pc, 0x0200);
    }

    #[test]
    fn test_5xy0_se_skips() {
        let mut state = State::new();
        state.v[0x1] = 0x11;
        state.v[0x2] = 0x11;
        let state = execute(0x5120, &state);
        assert_eq!(state.pc, 0x0202);
    }

    #[test]
    fn test_5xy0_se_doesntskip() {
        let mut state = State::new();
        state.v[0x1] = 0x11;
        let state = execute(0x5120, &state);
        assert_eq!(state.pc, 0x0200);
    }

    #[test]
    fn test_6xnn_ld() {
        let state = State::new();
        let state = execute(0x6122, &state);
        assert_eq!(state.v[0x1], 0x22);
    }

    #[test]
    fn test_7xnn_add_wraps_without_flag() {
        let mut state = State::new();
        state.v[0x1] = 0xFF;
        state.v[0xF] = 0x7;
        let state = execute(0x7102, &state);
        assert_eq!(state.v[0x1], 0x01);
        assert_eq!(state.v[0xF], 0x7);
    }

    #[test]
    fn test_8xy0_ld() {
        let mut state = State::new();
        state.v[0x2] = 0x1;
        let state = execute(0x8120, &state);
        assert_eq!(state.v[0x1], 0x1);
    }

    #[test]
    fn test_8xy1_or() {
        let mut state = State::new();
        state.v[0x1] = 0x6;
        state.v[0x2] = 0x3;
        let state = execute(0x8121, &state);
        assert_eq!(state.v[0x1], 0x7);
    }

    #[test]
    fn test_8xy2_and() {
        let mut state = State::new();
        state.v[0x1] = 0x6;
        state.v[0x2] = 0x3;
        let state = execute(0x8122, &state);
        assert_eq!(state.v[0x1], 0x2);
    }

    #[test]
    fn test_8xy3_xor() {
        let mut state = State::new();
        state.v[0x1] = 0x6;
        state.v[0x2] = 0x3;
        let state = execute(0x8123, &state);
        assert_eq!(state.v[0x1], 0x5);
    }

    #[test]
    fn test_logic_keeps_flag_by_default() {
        let mut state = State::new();
        state.v[0xF] = 0x1;
        let state = execute(0x8121, &state);
        assert_eq!(state.v[0xF], 0x1);
    }

    #[test]
    fn test_logic_resets_flag_quirk() {
        let config = Config {
            quirks: Quirks::cosmac_vip(),
            ..Config::default()
        };
        let mut state = State::new();
        state.v[0xF] = 0x1;
        let state = execute_with(0x8123, &state, &config);
        assert_eq!(state.v[0xF], 0x0);
    }

    #[test]
    fn test_8xy4_add_nocarry() {
        let mut state = State::new();
        state.v[0x1] = 10;
        state.v[0x2] = 5;
        let state = execute(0x8124, &state);
        assert_eq!(state.v[0x1], 15);
        assert_eq!(state.v[0xF], 0x0);
    }

    #[test]
    fn test_8xy4_add_carry() {
        let mut state = State::new();
        state.v[0x1] = 250;
        state.v[0x2] = 10;
        let state = execute(0x8124, &state);
        assert_eq!(state.v[0x1], 4);
        assert_eq!(state.v[0xF], 0x1);
    }

    #[test]
    fn test_8xy4_flag_wins_over_result_in_vf() {
        let mut state = State::new();
        state.v[0xF] = 0x01;
        state.v[0x2] = 0x02;
        let state = execute(0x8F24, &state);
        assert_eq!(state.v[0xF], 0x0);
    }

    #[test]
    fn test_8xy5_sub_noborrow() {
        let mut state = State::new();
        state.v[0x1] = 0x33;
        state.v[0x2] = 0x11;
        let state = execute(0x8125, &state);
        assert_eq!(state.v[0x1], 0x22);
        assert_eq!(state.v[0xF], 0x1);
    }

    #[test]
    fn test_8xy5_sub_equal_is_noborrow() {
        let mut state = State::new();
        state.v[0x1] = 0x11;
        state.v[0x2] = 0x11;
        let state = execute(0x8125, &state);
        assert_eq!(state.v[0x1], 0x00);
        assert_eq!(state.v[0xF], 0x1);
    }

    #[test]
    fn test_8xy5_sub_borrow() {
        let mut state = State::new();
        state.v[0x1] = 0x11;
        state.v[0x2] = 0x12;
        let state = execute(0x8125, &state);
        assert_eq!(state.v[0x1], 0xFF);
        assert_eq!(state.v[0xF], 0x0);
    }

    #[test]
    fn test_8xy6_shr_lsb() {
        let mut state = State::new();
        state.v[0x1] = 0x5;
        let state = execute(0x8106, &state);
        assert_eq!(state.v[0x1], 0x2);
        assert_eq!(state.v[0xF], 0x1);
    }

    #[test]
    fn test_8xy6_shr_nolsb() {
        let mut state = State::new();
        state.v[0x1] = 0x4;
        let state = execute(0x8106, &state);
        assert_eq!(state.v[0x1], 0x2);
        assert_eq!(state.v[0xF], 0x0);
    }

    #[test]
    fn test_8xy6_shr_uses_vy_quirk() {
        let config = Config {
            quirks: Quirks::cosmac_vip(),
            ..Config::default()
        };
        let mut state = State::new();
        state.v[0x1] = 0xF0;
        state.v[0x2] = 0x3;
        let state = execute_with(0x8126, &state, &config);
        assert_eq!(state.v[0x1], 0x1);
        assert_eq!(state.v[0xF], 0x1);
    }

    #[test]
    fn test_8xy7_subn_noborrow() {
        let mut state = State::new();
        state.v[0x1] = 0x11;
        state.v[0x2] = 0x33;
        let state = execute(0x8127, &state);
        assert_eq!(state.v[0x1], 0x22);
        assert_eq!(state.v[0xF], 0x1);
    }

    #[test]
    fn test_8xy7_subn_borrow() {
        let mut state = State::new();
        state.v[0x1] = 0x12;
        state.v[0x2] = 0x11;
        let state = execute(0x8127, &state);
        assert_eq!(state.v[0x1], 0xFF);
        assert_eq!(state.v[0xF], 0x0);
    }

    #[test]
    fn test_8xye_shl_msb() {
        let mut state = State::new();
        state.v[0x1] = 0xFF;
        let state = execute(0x810E, &state);
        // 0xFF * 2 = 0x01FE
        assert_eq!(state.v[0x1], 0xFE);
        assert_eq!(state.v[0xF], 0x1);
    }

    #[test]
    fn test_8xye_shl_nomsb() {
        let mut state = State::new();
        state.v[0x1] = 0x4;
        let state = execute(0x810E, &state);
        assert_eq!(state.v[0x1], 0x8);
        assert_eq!(state.v[0xF], 0x0);
    }

    #[test]
    fn test_9xy0_sne_skips() {
        let mut state = State::new();
        state.v[0x1] = 0x11;
        let state = execute(0x9120, &state);
        assert_eq!(state.pc, 0x0202);
    }

    #[test]
    fn test_9xy0_sne_doesntskip() {
        let mut state = State::new();
        state.v[0x1] = 0x11;
        state.v[0x2] = 0x11;
        let state = execute(0x9120, &state);
        assert_eq!(state.pc, 0x0200);
    }

    #[test]
    fn test_annn_ld() {
        let state = State::new();
        let state = execute(0xAABC, &state);
        assert_eq!(state.i, 0xABC);
    }

    #[test]
    fn test_bnnn_jp() {
        let mut state = State::new();
        state.v[0x0] = 0x2;
        state.v[0xA] = 0x8;
        let state = execute(0xBABC, &state);
        assert_eq!(state.pc, 0xABE);
    }

    #[test]
    fn test_bxnn_jp_quirk() {
        let config = Config {
            quirks: Quirks::super_chip(),
            ..Config::default()
        };
        let mut state = State::new();
        state.v[0x0] = 0x2;
        state.v[0xA] = 0x8;
        let state = execute_with(0xBABC, &state, &config);
        assert_eq!(state.pc, 0xAC4);
    }

    #[test]
    fn test_cxnn_rnd_masks() {
        let mut state = State::new();
        state.v[0x1] = 0xFF;
        let masked = execute(0xC100, &state);
        assert_eq!(masked.v[0x1], 0x00);
        for _ in 0..32 {
            let state = execute(0xC10F, &state);
            assert_eq!(state.v[0x1] & 0xF0, 0x00);
        }
    }

    #[test]
    fn test_dxyn_drw_draws() {
        let mut state = State::new();
        state.v[0x0] = 0x1;
        state.i = 0x050;
        // Draw the 0x0 glyph with a 1x 1y offset
        let state = execute(0xD005, &state);
        let mut expected = [[O; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
        expected[1][1..5].copy_from_slice(&[X, X, X, X]);
        expected[2][1..5].copy_from_slice(&[X, O, O, X]);
        expected[3][1..5].copy_from_slice(&[X, O, O, X]);
        expected[4][1..5].copy_from_slice(&[X, O, O, X]);
        expected[5][1..5].copy_from_slice(&[X, X, X, X]);
        assert_eq!(state.frame_buffer, expected);
        assert_eq!(state.v[0xF], 0x0);
        assert!(state.draw_flag);
    }

    #[test]
    fn test_dxyn_drw_collides() {
        let mut state = State::new();
        state.frame_buffer[0][0] = X;
        state.i = 0x050;
        let state = execute(0xD001, &state);
        assert_eq!(state.v[0xF], 0x1);
        assert_eq!(state.frame_buffer[0][0], O);
    }

    #[test]
    fn test_dxyn_drw_collision_is_not_overwritten() {
        let mut state = State::new();
        // Collide on the first row only, the remaining rows are drawn onto blank pixels
        state.frame_buffer[0][0] = X;
        state.i = 0x050;
        let state = execute(0xD005, &state);
        assert_eq!(state.v[0xF], 0x1);
    }

    #[test]
    fn test_dxyn_drw_xors() {
        let mut state = State::new();
        state.i = 0x300;
        state.memory[0x300] = 0b1100_0000;
        state.v[0x0] = 0x2;
        state.frame_buffer[0][2..6].copy_from_slice(&[O, X, O, X]);
        let state = execute(0xD011, &state);
        assert_eq!(state.frame_buffer[0][2..6], [X, O, O, X]);
    }

    #[test]
    fn test_dxyn_drw_wraps_origin() {
        let mut state = State::new();
        state.i = 0x300;
        state.memory[0x300] = 0x80;
        state.v[0x0] = 64 + 3;
        state.v[0x1] = 32 + 4;
        let state = execute(0xD011, &state);
        assert_eq!(state.frame_buffer[4][3], X);
    }

    #[test]
    fn test_dxyn_drw_clips_bottom() {
        let mut state = State::new();
        state.i = 0x050;
        state.v[0x1] = 30;
        let state = execute(0xD015, &state);
        assert_eq!(state.frame_buffer[30][0..4], [X, X, X, X]);
        assert_eq!(state.frame_buffer[31][0..4], [X, O, O, X]);
        assert!(state.frame_buffer[0..3]
            .iter()
            .all(|row| row.iter().all(|&pixel| pixel == O)));
    }

    #[test]
    fn test_dxyn_drw_out_of_memory() {
        let mut state = State::new();
        state.i = 0xFFE;
        assert!(matches!(
            try_execute(0xD003, &state),
            Err(Chip8Error::MemoryOutOfBounds { address: 0x1000 })
        ));
    }

    #[test]
    fn test_ex9e_skp_skips() {
        let mut state = State::new();
        state.keypad[0xE] = true;
        state.v[0x1] = 0xE;
        let state = execute(0xE19E, &state);
        assert_eq!(state.pc, 0x0202);
    }

    #[test]
    fn test_ex9e_skp_doesntskip() {
        let state = State::new();
        let state = execute(0xE19E, &state);
        assert_eq!(state.pc, 0x0200);
    }

    #[test]
    fn test_exa1_sknp_skips() {
        let state = State::new();
        let state = execute(0xE1A1, &state);
        assert_eq!(state.pc, 0x0202);
    }

    #[test]
    fn test_exa1_sknp_doesntskip() {
        let mut state = State::new();
        state.keypad[0xE] = true;
        state.v[0x1] = 0xE;
        let state = execute(0xE1A1, &state);
        assert_eq!(state.pc, 0x0200);
    }

    #[test]
    fn test_fx07_ld() {
        let mut state = State::new();
        state.delay_timer = 0xF;
        let state = execute(0xF107, &state);
        assert_eq!(state.v[0x1], 0xF);
    }

    #[test]
    fn test_fx0a_ld_rewinds_without_key() {
        let mut state = State::new();
        state.pc = 0x0202;
        let state = execute(0xF10A, &state);
        assert_eq!(state.pc, 0x0200);
        assert_eq!(state.v[0x1], 0x0);
    }

    #[test]
    fn test_fx0a_ld_takes_lowest_pressed_key() {
        let mut state = State::new();
        state.pc = 0x0202;
        state.keypad[0xC] = true;
        state.keypad[0x9] = true;
        let state = execute(0xF10A, &state);
        assert_eq!(state.pc, 0x0202);
        assert_eq!(state.v[0x1], 0x9);
    }

    #[test]
    fn test_fx15_ld() {
        let mut state = State::new();
        state.v[0x1] = 0xF;
        let state = execute(0xF115, &state);
        assert_eq!(state.delay_timer, 0xF);
    }

    #[test]
    fn test_fx18_ld() {
        let mut state = State::new();
        state.v[0x1] = 0xF;
        let state = execute(0xF118, &state);
        assert_eq!(state.sound_timer, 0xF);
    }

    #[test]
    fn test_fx1e_add() {
        let mut state = State::new();
        state.i = 0x1;
        state.v[0x1] = 0x1;
        let state = execute(0xF11E, &state);
        assert_eq!(state.i, 0x2);
    }

    #[test]
    fn test_fx1e_add_leaves_flag_by_default() {
        let mut state = State::new();
        state.i = 0xFFF;
        state.v[0x1] = 0x1;
        state.v[0xF] = 0x5;
        let state = execute(0xF11E, &state);
        assert_eq!(state.i, 0x1000);
        assert_eq!(state.v[0xF], 0x5);
    }

    #[test]
    fn test_fx1e_add_overflow_flag_quirk() {
        let config = Config {
            quirks: Quirks {
                index_overflow_flag: true,
                ..Quirks::default()
            },
            ..Config::default()
        };
        let mut state = State::new();
        state.i = 0xFFF;
        state.v[0x1] = 0x1;
        let state = execute_with(0xF11E, &state, &config);
        assert_eq!(state.v[0xF], 0x1);
        let state = execute_with(0xAFF0, &state, &config);
        let state = execute_with(0xF11E, &state, &config);
        assert_eq!(state.i, 0xFF1);
        assert_eq!(state.v[0xF], 0x0);
    }

    #[test]
    fn test_fx29_ld() {
        let mut state = State::new();
        state.v[0x1] = 0x2;
        let state = execute(0xF129, &state);
        assert_eq!(state.i, 0x050 + 0xA);
    }

    #[test]
    fn test_fx29_ld_uses_configured_font() {
        let config = Config {
            font_address: 0x000,
            ..Config::default()
        };
        let mut state = State::new();
        state.v[0x1] = 0xF;
        let state = execute_with(0xF129, &state, &config);
        assert_eq!(state.i, 0x4B);
    }

    #[test]
    fn test_fx33_ld() {
        let mut state = State::new();
        // 0x7B -> 123
        state.v[0x1] = 0x7B;
        state.i = 0x300;
        let state = execute(0xF133, &state);
        assert_eq!(state.memory[0x300..0x303], [0x1, 0x2, 0x3]);
    }

    #[test]
    fn test_fx33_ld_out_of_memory() {
        let mut state = State::new();
        state.i = 0xFFE;
        assert!(matches!(
            try_execute(0xF133, &state),
            Err(Chip8Error::MemoryOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_fx55_ld() {
        let mut state = State::new();
        state.i = 0x300;
        state.v[0x0..0x5].copy_from_slice(&[0x1, 0x2, 0x3, 0x4, 0x5]);
        let state = execute(0xF455, &state);
        assert_eq!(state.memory[0x300..0x306], [0x1, 0x2, 0x3, 0x4, 0x5, 0x0]);
        assert_eq!(state.i, 0x300);
    }

    #[test]
    fn test_fx55_ld_increments_index_quirk() {
        let config = Config {
            quirks: Quirks::cosmac_vip(),
            ..Config::default()
        };
        let mut state = State::new();
        state.i = 0x300;
        let state = execute_with(0xF455, &state, &config);
        assert_eq!(state.i, 0x305);
    }

    #[test]
    fn test_fx65_ld() {
        let mut state = State::new();
        state.i = 0x300;
        state.memory[0x300..0x306].copy_from_slice(&[0x1, 0x2, 0x3, 0x4, 0x5, 0x6]);
        let state = execute(0xF465, &state);
        assert_eq!(state.v[0x0..0x6], [0x1, 0x2, 0x3, 0x4, 0x5, 0x0]);
        assert_eq!(state.i, 0x300);
    }

    #[test]
    fn test_fx65_ld_out_of_memory() {
        let mut state = State::new();
        state.i = 0xFFC;
        assert!(matches!(
            try_execute(0xFF65, &state),
            Err(Chip8Error::MemoryOutOfBounds { address: 0x1000 })
        ));
    }
}
