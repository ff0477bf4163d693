//! Listener session state.

use std::fmt;

/// What incoming datagrams are currently treated as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Datagrams are commands.
    #[default]
    Idle,
    /// Datagrams are image chunks.
    ReceivingImage,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Idle => write!(f, "IDLE"),
            Mode::ReceivingImage => write!(f, "RECEIVING_IMAGE"),
        }
    }
}

/// The single mutable state of the listener.
#[derive(Debug, Default)]
pub struct Session {
    pub mode: Mode,
    pub brightness: i32,
    pub contrast: i32,
    /// Whether the brightness sign LEDs are currently lit.
    pub brightness_negative_indicator_on: bool,
    /// Whether the contrast sign LEDs are currently lit.
    pub contrast_negative_indicator_on: bool,
    pub image_buffer: Vec<u8>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with restored display values.
    pub fn with_values(brightness: i32, contrast: i32) -> Self {
        Self {
            brightness,
            contrast,
            ..Self::default()
        }
    }

    /// Transition to a new mode.
    pub fn goto_mode(&mut self, new_mode: Mode) {
        if self.mode != new_mode {
            tracing::debug!(from = %self.mode, to = %new_mode, "Mode transition");
        }
        self.mode = new_mode;
    }

    pub fn is_receiving_image(&self) -> bool {
        self.mode == Mode::ReceivingImage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let session = Session::new();
        assert_eq!(session.mode, Mode::Idle);
        assert_eq!((session.brightness, session.contrast), (0, 0));
        assert!(!session.brightness_negative_indicator_on);
        assert!(!session.contrast_negative_indicator_on);
        assert!(session.image_buffer.is_empty());
    }

    #[test]
    fn test_goto_mode() {
        let mut session = Session::with_values(12, -3);
        session.goto_mode(Mode::ReceivingImage);
        assert!(session.is_receiving_image());
        session.goto_mode(Mode::Idle);
        assert!(!session.is_receiving_image());
        assert_eq!((session.brightness, session.contrast), (12, -3));
    }
}
