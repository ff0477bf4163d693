//! 7-segment digit patterns.
//!
//! Segments are active-low: a cleared bit lights the segment. Bit 0 is
//! segment `a`, bit 6 is segment `g`; bit 7 is unused.

use std::fmt;

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitError {
    /// Digit outside 0-9, or the code point of an unsupported glyph.
    #[error("No 7-segment pattern for {0:#X}")]
    InvalidDigit(u32),
}

/// Bit pattern for a single 7-segment digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DigitPattern(u8);

impl DigitPattern {
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl fmt::Display for DigitPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}

/// Patterns for 0-9, indexed by digit value.
const DIGIT_TABLE: [u8; 10] = [
    0x40, // 0
    0x79, // 1
    0x24, // 2
    0x30, // 3
    0x19, // 4
    0x12, // 5
    0x02, // 6
    0x78, // 7
    0x00, // 8
    0x10, // 9
];

/// Minus sign: only segment g lit.
const MINUS_PATTERN: u8 = 0x3F;

/// Encode a decimal digit (0-9).
pub fn encode(digit: u32) -> Result<DigitPattern, DigitError> {
    DIGIT_TABLE
        .get(digit as usize)
        .copied()
        .map(DigitPattern)
        .ok_or(DigitError::InvalidDigit(digit))
}

/// Encode a display glyph: an ASCII digit or `'-'`.
pub fn encode_char(glyph: char) -> Result<DigitPattern, DigitError> {
    match glyph {
        '-' => Ok(DigitPattern(MINUS_PATTERN)),
        c => c
            .to_digit(10)
            .map(encode)
            .unwrap_or(Err(DigitError::InvalidDigit(u32::from(c)))),
    }
}
