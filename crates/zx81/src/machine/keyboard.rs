//! ZX81 keyboard matrix.
//!
//! Forty keys wired as eight half-rows of five. Reading an even port puts
//! the high address byte on the rows: each cleared bit selects one half-row
//! and the selected rows are OR-combined.
//!
//! | Addr bit | Row | Keys (bit 0-4)            |
//! |----------|-----|---------------------------|
//! | A8       | 0   | Shift, Z, X, C, V         |
//! | A9       | 1   | A, S, D, F, G             |
//! | A10      | 2   | Q, W, E, R, T             |
//! | A11      | 3   | 1, 2, 3, 4, 5             |
//! | A12      | 4   | 0, 9, 8, 7, 6             |
//! | A13      | 5   | P, O, I, U, Y             |
//! | A14      | 6   | Newline, L, K, J, H       |
//! | A15      | 7   | Space, ., M, N, B         |

/// Physical ZX81 key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Zx81Key {
    Shift,
    Z,
    X,
    C,
    V,
    A,
    S,
    D,
    F,
    G,
    Q,
    W,
    E,
    R,
    T,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num0,
    Num9,
    Num8,
    Num7,
    Num6,
    P,
    O,
    I,
    U,
    Y,
    Newline,
    L,
    K,
    J,
    H,
    Space,
    Period,
    M,
    N,
    B,
}

impl Zx81Key {
    /// Half-row and bit position in the matrix.
    pub fn matrix_position(self) -> (usize, u8) {
        use Zx81Key::*;
        match self {
            Shift => (0, 0),
            Z => (0, 1),
            X => (0, 2),
            C => (0, 3),
            V => (0, 4),
            A => (1, 0),
            S => (1, 1),
            D => (1, 2),
            F => (1, 3),
            G => (1, 4),
            Q => (2, 0),
            W => (2, 1),
            E => (2, 2),
            R => (2, 3),
            T => (2, 4),
            Num1 => (3, 0),
            Num2 => (3, 1),
            Num3 => (3, 2),
            Num4 => (3, 3),
            Num5 => (3, 4),
            Num0 => (4, 0),
            Num9 => (4, 1),
            Num8 => (4, 2),
            Num7 => (4, 3),
            Num6 => (4, 4),
            P => (5, 0),
            O => (5, 1),
            I => (5, 2),
            U => (5, 3),
            Y => (5, 4),
            Newline => (6, 0),
            L => (6, 1),
            K => (6, 2),
            J => (6, 3),
            H => (6, 4),
            Space => (7, 0),
            Period => (7, 1),
            M => (7, 2),
            N => (7, 3),
            B => (7, 4),
        }
    }
}

/// Pressed keys, one byte per half-row, 1 = pressed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Keyboard {
    rows: [u8; 8],
}

impl Keyboard {
    pub fn set_key(&mut self, key: Zx81Key, pressed: bool) {
        let (row, bit) = key.matrix_position();
        if pressed {
            self.rows[row] |= 1 << bit;
        } else {
            self.rows[row] &= !(1 << bit);
        }
    }

    /// Keys held in the half-rows selected by `addr_high` (bits 0-4,
    /// active high).
    pub fn read(&self, addr_high: u8) -> u8 {
        self.rows
            .iter()
            .enumerate()
            .filter(|(row, _)| addr_high & (1 << row) == 0)
            .fold(0, |acc, (_, keys)| acc | keys)
            & 0x1F
    }

    pub fn release_all(&mut self) {
        self.rows = [0; 8];
    }
}
