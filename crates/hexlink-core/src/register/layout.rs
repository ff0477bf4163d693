//! Physical address layout of the peripheral window.

use serde::{Deserialize, Serialize};

use super::traits::RegisterError;

/// HPS-to-FPGA peripheral region base.
pub const HW_REGS_BASE: u64 = 0xFC00_0000;
/// Bytes mapped from `HW_REGS_BASE`.
pub const HW_REGS_SPAN: usize = 0x0400_0000;
/// Lightweight HPS-to-FPGA bridge.
pub const LW_BRIDGE_OFFSET: u64 = 0xFF20_0000;
/// HEX3..HEX0 7-segment displays.
pub const HEX_DISPLAY_OFFSET: u64 = 0x0000_0100;
/// Red LED bank.
pub const LED_OFFSET: u64 = 0x0000_0110;

/// Where the mapped window sits and where the peripherals sit inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterLayout {
    /// Physical address the mapping starts at.
    pub base_address: u64,
    /// Size of the mapping; must be a power of two.
    pub span: usize,
    /// Physical address of the lightweight bridge.
    pub bridge_offset: u64,
    /// Display peripheral offset behind the bridge.
    pub display_offset: u64,
    /// Indicator LED peripheral offset behind the bridge.
    pub indicator_offset: u64,
}

impl Default for RegisterLayout {
    fn default() -> Self {
        Self {
            base_address: HW_REGS_BASE,
            span: HW_REGS_SPAN,
            bridge_offset: LW_BRIDGE_OFFSET,
            display_offset: HEX_DISPLAY_OFFSET,
            indicator_offset: LED_OFFSET,
        }
    }
}

impl RegisterLayout {
    pub fn validate(&self) -> Result<(), RegisterError> {
        if !self.span.is_power_of_two() {
            return Err(RegisterError::InvalidSpan(self.span));
        }
        Ok(())
    }

    /// Offset of a bridge peripheral within the mapped span.
    pub fn mapped_offset(&self, peripheral_offset: u64) -> usize {
        let mask = (self.span as u64).wrapping_sub(1);
        (self.bridge_offset.wrapping_add(peripheral_offset) & mask) as usize
    }

    pub fn display_register(&self) -> usize {
        self.mapped_offset(self.display_offset)
    }

    pub fn indicator_register(&self) -> usize {
        self.mapped_offset(self.indicator_offset)
    }
}
