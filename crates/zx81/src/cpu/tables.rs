use lazy_static::lazy_static;

use super::regs::Flags;

pub(super) const FLAG_C: u8 = Flags::C.bits();
pub(super) const FLAG_N: u8 = Flags::N.bits();
pub(super) const FLAG_P: u8 = Flags::PV.bits();
pub(super) const FLAG_V: u8 = FLAG_P;
pub(super) const FLAG_3: u8 = Flags::X.bits();
pub(super) const FLAG_H: u8 = Flags::H.bits();
pub(super) const FLAG_5: u8 = Flags::Y.bits();
pub(super) const FLAG_Z: u8 = Flags::Z.bits();
pub(super) const FLAG_S: u8 = Flags::S.bits();

lazy_static! {
    /// Shared by every CPU instance; built on first use and never mutated.
    pub(super) static ref FLAG_TABLES: FlagTables = FlagTables::new();
}

/// Precomputed flag lookups.
///
/// The 8-entry half-carry and overflow tables are indexed by a 3-bit code
/// built from one bit of each operand and of the result:
///
/// ```text
/// lookup = ((a & 0x88) >> 3) | ((b & 0x88) >> 2) | ((result & 0x88) >> 1)
/// ```
///
/// `lookup & 0x07` selects the half-carry entry (bit 3 of each) and
/// `lookup >> 4` the overflow entry (bit 7 of each). 16-bit operations use
/// bits 11 and 15 the same way.
#[derive(Debug)]
pub struct FlagTables {
    /// S, Z and bits 3/5 of a result byte.
    pub sz53: [u8; 256],
    /// `sz53` plus even parity in P/V.
    pub sz53p: [u8; 256],
    pub parity: [u8; 256],
    pub halfcarry_add: [u8; 8],
    pub halfcarry_sub: [u8; 8],
    pub overflow_add: [u8; 8],
    pub overflow_sub: [u8; 8],
}

impl FlagTables {
    fn new() -> Self {
        let mut sz53 = [0u8; 256];
        let mut sz53p = [0u8; 256];
        let mut parity = [0u8; 256];

        for value in 0..256usize {
            let byte = value as u8;
            sz53[value] = byte & (FLAG_3 | FLAG_5 | FLAG_S);
            parity[value] = if byte.count_ones() % 2 == 0 { FLAG_P } else { 0 };
            sz53p[value] = sz53[value] | parity[value];
        }
        sz53[0] |= FLAG_Z;
        sz53p[0] |= FLAG_Z;

        Self {
            sz53,
            sz53p,
            parity,
            halfcarry_add: [0, FLAG_H, FLAG_H, FLAG_H, 0, 0, 0, FLAG_H],
            halfcarry_sub: [0, 0, FLAG_H, 0, FLAG_H, 0, FLAG_H, FLAG_H],
            overflow_add: [0, 0, 0, FLAG_V, FLAG_V, 0, 0, 0],
            overflow_sub: [0, FLAG_V, 0, 0, 0, 0, FLAG_V, 0],
        }
    }

    /// Process-wide instance.
    pub fn shared() -> &'static FlagTables {
        &*FLAG_TABLES
    }
}

#[inline]
pub(super) fn lookup8(a: u8, b: u8, result: u16) -> usize {
    (((a & 0x88) >> 3) | ((b & 0x88) >> 2) | (((result as u8) & 0x88) >> 1)) as usize
}

#[inline]
pub(super) fn lookup16(a: u16, b: u16, result: u32) -> usize {
    (((a & 0x8800) >> 11) | ((b & 0x8800) >> 10) | (((result as u16) & 0x8800) >> 9)) as usize
}
