//! Register frame for the 4-digit HEX display.

use byteorder::{ByteOrder, LittleEndian};

use super::digit::DigitPattern;

/// Four digit patterns packed into one display register word.
///
/// Patterns are shifted in 7 bits apart but the word is written out one
/// byte per 8 bits, so digit boundaries do not line up with byte
/// boundaries. The hardware register expects exactly this layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegisterFrame {
    pub patterns: [DigitPattern; 4],
}

impl RegisterFrame {
    pub const SIZE: usize = 4;

    /// Build a frame from slot-ordered patterns (slot 0 is HEX0).
    pub fn new(patterns: [DigitPattern; 4]) -> Self {
        Self { patterns }
    }

    pub fn packed(&self) -> u32 {
        self.patterns
            .iter()
            .enumerate()
            .fold(0u32, |acc, (i, p)| acc | (u32::from(p.bits()) << (i * 7)))
    }

    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        LittleEndian::write_u32(&mut buf, self.packed());
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::digit::encode;

    fn frame_of(bits: [u8; 4]) -> RegisterFrame {
        RegisterFrame::new(bits.map(DigitPattern::from_bits))
    }

    /// Shift-construct by 7, shift-extract by 8.
    fn reference_bytes(bits: [u8; 4]) -> [u8; 4] {
        let mut f: u32 = 0;
        for (i, b) in bits.iter().enumerate() {
            f |= u32::from(*b) << (i * 7);
        }
        let mut out = [0u8; 4];
        for (j, byte) in out.iter_mut().enumerate() {
            *byte = ((f >> (j * 8)) & 0xFF) as u8;
        }
        out
    }

    #[test]
    fn test_packing_matches_reference() {
        let cases = [
            [0x40, 0x79, 0x24, 0x30],
            [0x7F, 0x7F, 0x7F, 0x7F],
            [0x00, 0x00, 0x00, 0x00],
            [0x12, 0x02, 0x78, 0x10],
            [0x01, 0x00, 0x00, 0x40],
        ];
        for bits in cases {
            assert_eq!(frame_of(bits).to_bytes(), reference_bytes(bits), "{bits:02X?}");
        }
    }

    #[test]
    fn test_known_frame_87_23() {
        // contrast 23 -> (3, 2), brightness 87 -> (7, 8)
        let frame = RegisterFrame::new([
            encode(3).unwrap(),
            encode(2).unwrap(),
            encode(7).unwrap(),
            encode(8).unwrap(),
        ]);
        assert_eq!(frame.packed(), 0x001E_1230);
        assert_eq!(frame.to_bytes(), [0x30, 0x12, 0x1E, 0x00]);
    }

    #[test]
    fn test_all_ones_spans_28_bits() {
        let frame = frame_of([0x7F; 4]);
        assert_eq!(frame.packed(), 0x0FFF_FFFF);
    }
}
