//! HEX display module.

pub mod digit;
pub mod driver;
pub mod frame;

pub use digit::{DigitError, DigitPattern};
pub use driver::{DisplayDriver, DisplayError, SignIndicator};
pub use frame::RegisterFrame;
