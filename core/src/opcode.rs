/// # Opcodes
///
/// Chip-8 opcodes are 16 bits each. Their behavior is cased on some combination of:
/// - `(n, _, _, _)` broad categorization; applies to all opcodes
/// - `(_, _, _, n)` specific behavior within a category
/// - `(_, _, n, n)` more specific behavior within a category
/// - `(_, n, n, n)` some fixed function that doesn't require variables (e.g. CLS; clear screen)
///
/// Nibbles not used to determine the operation often (but not always) carry important data.
/// - `(_, n, n, n)` a 12-bit address
/// - `(_, _, n, n)` an 8-bit immediate that is assigned to and/or compared with Vx
/// - `(_, n, _, _)` either the register Vx or the range of registers V0..=Vx
/// - `(_, _, n, _)` the register Vy
/// - `(_, _, _, n)` a 4-bit immediate (sprite height)
pub trait Opcode {
    /// The full 16-bit instruction word.
    fn word(&self) -> u16;

    /// Returns the Opcode's component nibbles, most significant first.
    fn nibbles(&self) -> (u8, u8, u8, u8) {
        let word = self.word();
        (((word & 0xF000) >> 12) as u8, self.x(), self.y(), self.n())
    }

    /// `[_x__]`
    fn x(&self) -> u8 {
        ((self.word() & 0x0F00) >> 8) as u8
    }

    /// `[__y_]`
    fn y(&self) -> u8 {
        ((self.word() & 0x00F0) >> 4) as u8
    }

    /// `[___n]`
    fn n(&self) -> u8 {
        (self.word() & 0x000F) as u8
    }

    /// `[__nn]`
    fn nn(&self) -> u8 {
        (self.word() & 0x00FF) as u8
    }

    /// `[_nnn]`
    fn nnn(&self) -> u16 {
        self.word() & 0x0FFF
    }
}

impl Opcode for u16 {
    fn word(&self) -> u16 {
        *self
    }
}
