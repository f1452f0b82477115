use crate::opcode::Opcode;

/// Renders an opcode in the conventional Chip-8 assembly syntax.
///
/// Words that don't decode to any instruction (sprite data, machine code routines)
/// are rendered as `DATA 0xNNNN`.
pub fn disassemble(op: u16) -> String {
    let (x, y, n, nn, nnn) = (op.x(), op.y(), op.n(), op.nn(), op.nnn());
    match op.nibbles() {
        (0x0, 0x0, 0xE, 0x0) => "CLS".to_string(),
        (0x0, 0x0, 0xE, 0xE) => "RET".to_string(),
        (0x1, ..) => format!("JP {:#05X}", nnn),
        (0x2, ..) => format!("CALL {:#05X}", nnn),
        (0x3, ..) => format!("SE V{:X}, {:#04X}", x, nn),
        (0x4, ..) => format!("SNE V{:X}, {:#04X}", x, nn),
        (0x5, .., 0x0) => format!("SE V{:X}, V{:X}", x, y),
        (0x6, ..) => format!("LD V{:X}, {:#04X}", x, nn),
        (0x7, ..) => format!("ADD V{:X}, {:#04X}", x, nn),
        (0x8, .., 0x0) => format!("LD V{:X}, V{:X}", x, y),
        (0x8, .., 0x1) => format!("OR V{:X}, V{:X}", x, y),
        (0x8, .., 0x2) => format!("AND V{:X}, V{:X}", x, y),
        (0x8, .., 0x3) => format!("XOR V{:X}, V{:X}", x, y),
        (0x8, .., 0x4) => format!("ADD V{:X}, V{:X}", x, y),
        (0x8, .., 0x5) => format!("SUB V{:X}, V{:X}", x, y),
        (0x8, .., 0x6) => format!("SHR V{:X}, V{:X}", x, y),
        (0x8, .., 0x7) => format!("SUBN V{:X}, V{:X}", x, y),
        (0x8, .., 0xE) => format!("SHL V{:X}, V{:X}", x, y),
        (0x9, .., 0x0) => format!("SNE V{:X}, V{:X}", x, y),
        (0xA, ..) => format!("LD I, {:#05X}", nnn),
        (0xB, ..) => format!("JP V0, {:#05X}", nnn),
        (0xC, ..) => format!("RND V{:X}, {:#04X}", x, nn),
        (0xD, ..) => format!("DRW V{:X}, V{:X}, {}", x, y, n),
        (0xE, _, 0x9, 0xE) => format!("SKP V{:X}", x),
        (0xE, _, 0xA, 0x1) => format!("SKNP V{:X}", x),
        (0xF, _, 0x0, 0x7) => format!("LD V{:X}, DT", x),
        (0xF, _, 0x0, 0xA) => format!("LD V{:X}, K", x),
        (0xF, _, 0x1, 0x5) => format!("LD DT, V{:X}", x),
        (0xF, _, 0x1, 0x8) => format!("LD ST, V{:X}", x),
        (0xF, _, 0x1, 0xE) => format!("ADD I, V{:X}", x),
        (0xF, _, 0x2, 0x9) => format!("LD F, V{:X}", x),
        (0xF, _, 0x3, 0x3) => format!("LD B, V{:X}", x),
        (0xF, _, 0x5, 0x5) => format!("LD [I], V{:X}", x),
        (0xF, _, 0x6, 0x5) => format!("LD V{:X}, [I]", x),
        _ => format!("DATA {:#06X}", op),
    }
}
