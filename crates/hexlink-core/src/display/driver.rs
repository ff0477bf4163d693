//! Display driver: brightness/contrast to HEX digits and sign LEDs.

use std::fmt;

use thiserror::Error;
use tracing::debug;

use super::digit::{DigitError, encode};
use super::frame::RegisterFrame;
use crate::register::traits::check_bounds;
use crate::register::{RegisterError, RegisterLayout, RegisterSpace};
use crate::state::Session;

/// LEDR6..LEDR8.
pub const BRIGHTNESS_INDICATOR_MASK: u32 = (1 << 6) | (1 << 7) | (1 << 8);
/// LEDR1..LEDR3.
pub const CONTRAST_INDICATOR_MASK: u32 = (1 << 1) | (1 << 2) | (1 << 3);

#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("Digit error: {0}")]
    Digit(#[from] DigitError),
    #[error("Register error: {0}")]
    Register(#[from] RegisterError),
}

/// One of the two sign indicator LED groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignIndicator {
    Brightness,
    Contrast,
}

impl SignIndicator {
    pub fn mask(self) -> u32 {
        match self {
            SignIndicator::Brightness => BRIGHTNESS_INDICATOR_MASK,
            SignIndicator::Contrast => CONTRAST_INDICATOR_MASK,
        }
    }
}

impl fmt::Display for SignIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignIndicator::Brightness => write!(f, "brightness"),
            SignIndicator::Contrast => write!(f, "contrast"),
        }
    }
}

/// Ones and tens digits of `|value| % 100`.
pub fn display_digits(value: i32) -> (u32, u32) {
    let v = value.unsigned_abs() % 100;
    (v % 10, v / 10)
}

/// Drives the HEX display and indicator LEDs through a register space.
pub struct DisplayDriver<R: RegisterSpace> {
    regs: R,
    display_offset: usize,
    indicator_offset: usize,
}

impl<R: RegisterSpace> DisplayDriver<R> {
    /// Resolve peripheral offsets from `layout` against the mapped window.
    pub fn new(regs: R, layout: &RegisterLayout) -> Result<Self, RegisterError> {
        layout.validate()?;
        let display_offset = layout.display_register();
        let indicator_offset = layout.indicator_register();
        check_bounds(display_offset, RegisterFrame::SIZE, regs.span())?;
        check_bounds(indicator_offset, 4, regs.span())?;
        Ok(Self {
            regs,
            display_offset,
            indicator_offset,
        })
    }

    /// Show brightness on HEX3..HEX2 and contrast on HEX1..HEX0.
    ///
    /// Values are shown as `|value| % 100`; sign goes to the indicators.
    pub fn render_digits(&mut self, brightness: i32, contrast: i32) -> Result<RegisterFrame, DisplayError> {
        let (c_ones, c_tens) = display_digits(contrast);
        let (b_ones, b_tens) = display_digits(brightness);
        let frame = RegisterFrame::new([
            encode(c_ones)?,
            encode(c_tens)?,
            encode(b_ones)?,
            encode(b_tens)?,
        ]);
        self.regs.write_at(self.display_offset, &frame.to_bytes())?;
        debug!(brightness, contrast, packed = %format!("0x{:08X}", frame.packed()), "HEX display updated");
        Ok(frame)
    }

    /// Light or clear the sign LEDs whose state no longer matches the session.
    ///
    /// Returns the indicators that changed, with their new lit state.
    pub fn update_sign_indicators(
        &mut self,
        session: &mut Session,
    ) -> Result<Vec<(SignIndicator, bool)>, DisplayError> {
        let mut changed = Vec::new();

        let negative = session.brightness < 0;
        if negative != session.brightness_negative_indicator_on {
            self.set_indicator(SignIndicator::Brightness, negative)?;
            session.brightness_negative_indicator_on = negative;
            changed.push((SignIndicator::Brightness, negative));
        }

        let negative = session.contrast < 0;
        if negative != session.contrast_negative_indicator_on {
            self.set_indicator(SignIndicator::Contrast, negative)?;
            session.contrast_negative_indicator_on = negative;
            changed.push((SignIndicator::Contrast, negative));
        }

        Ok(changed)
    }

    /// Read-modify-write one indicator group, preserving all other bits.
    pub fn set_indicator(&mut self, indicator: SignIndicator, on: bool) -> Result<(), DisplayError> {
        let current = self.regs.read_u32(self.indicator_offset)?;
        let value = if on {
            current | indicator.mask()
        } else {
            current & !indicator.mask()
        };
        self.regs.write_u32(self.indicator_offset, value)?;
        debug!(indicator = %indicator, on, leds = %format!("{:#012b}", value), "Indicator updated");
        Ok(())
    }

    pub fn registers(&self) -> &R {
        &self.regs
    }

    /// Release the underlying register space.
    pub fn close(&mut self) -> Result<(), RegisterError> {
        self.regs.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register::MemoryRegisterSpace;

    const SPAN: usize = 0x1000;

    fn test_layout() -> RegisterLayout {
        RegisterLayout {
            span: SPAN,
            ..Default::default()
        }
    }

    fn driver() -> (DisplayDriver<MemoryRegisterSpace>, MemoryRegisterSpace) {
        let regs = MemoryRegisterSpace::new(SPAN);
        let handle = regs.clone();
        (DisplayDriver::new(regs, &test_layout()).unwrap(), handle)
    }

    #[test]
    fn test_display_digits() {
        assert_eq!(display_digits(87), (7, 8));
        assert_eq!(display_digits(5), (5, 0));
        assert_eq!(display_digits(-42), (2, 4));
        assert_eq!(display_digits(123), (3, 2));
        assert_eq!(display_digits(i32::MIN), (8, 4));
    }

    #[test]
    fn test_render_87_23() {
        let (mut drv, handle) = driver();
        drv.render_digits(87, 23).unwrap();
        assert_eq!(handle.writes_at(0x100), vec![vec![0x30, 0x12, 0x1E, 0x00]]);
    }

    #[test]
    fn test_render_does_not_drift() {
        let (mut drv, handle) = driver();
        drv.render_digits(1, 2).unwrap();
        drv.render_digits(3, 4).unwrap();
        drv.render_digits(-99, 150).unwrap();
        let writes = handle.get_writes();
        assert_eq!(writes.len(), 3);
        assert!(writes.iter().all(|(offset, data)| *offset == 0x100 && data.len() == 4));
    }

    #[test]
    fn test_negative_renders_magnitude() {
        let (mut drv, _handle) = driver();
        let neg = drv.render_digits(-87, -23).unwrap();
        let pos = drv.render_digits(87, 23).unwrap();
        assert_eq!(neg, pos);
    }

    #[test]
    fn test_brightness_sign_transitions() {
        let (mut drv, handle) = driver();
        let mut session = Session::with_values(5, 0);
        assert!(drv.update_sign_indicators(&mut session).unwrap().is_empty());

        session.brightness = -5;
        let changed = drv.update_sign_indicators(&mut session).unwrap();
        assert_eq!(changed, vec![(SignIndicator::Brightness, true)]);
        assert_eq!(handle.peek(0x110, 4), vec![0xC0, 0x01, 0x00, 0x00]);
        assert_eq!(handle.writes_at(0x110).len(), 1);

        // Repeated negatives do not touch the register.
        session.brightness = -17;
        assert!(drv.update_sign_indicators(&mut session).unwrap().is_empty());
        assert_eq!(handle.writes_at(0x110).len(), 1);

        session.brightness = 5;
        let changed = drv.update_sign_indicators(&mut session).unwrap();
        assert_eq!(changed, vec![(SignIndicator::Brightness, false)]);
        assert_eq!(handle.peek(0x110, 4), vec![0, 0, 0, 0]);
        assert_eq!(handle.writes_at(0x110).len(), 2);
        assert!(!session.brightness_negative_indicator_on);
    }

    #[test]
    fn test_indicator_preserves_other_bits() {
        let (mut drv, handle) = driver();
        handle.poke(0x110, &0x8000_0201u32.to_le_bytes());

        let mut session = Session::with_values(0, -1);
        drv.update_sign_indicators(&mut session).unwrap();
        assert_eq!(
            drv.registers().read_u32(0x110).unwrap(),
            0x8000_0201 | CONTRAST_INDICATOR_MASK
        );

        session.brightness = -1;
        session.contrast = 1;
        let changed = drv.update_sign_indicators(&mut session).unwrap();
        assert_eq!(
            changed,
            vec![(SignIndicator::Brightness, true), (SignIndicator::Contrast, false)]
        );
        assert_eq!(
            drv.registers().read_u32(0x110).unwrap(),
            0x8000_0201 | BRIGHTNESS_INDICATOR_MASK
        );
    }

    #[test]
    fn test_offsets_must_fit_span() {
        let regs = MemoryRegisterSpace::new(0x100);
        let layout = RegisterLayout {
            span: 0x1000,
            ..Default::default()
        };
        assert!(matches!(
            DisplayDriver::new(regs, &layout),
            Err(RegisterError::OutOfBounds { .. })
        ));
    }
}
