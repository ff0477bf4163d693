//! Wire protocol constants.

// ============================================================================
// Network
// ============================================================================

/// Listen on all interfaces.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";

/// UDP port the slider client sends to.
pub const DEFAULT_UDP_PORT: u16 = 80;

/// Nominal image chunk size. Longer datagrams are dropped.
pub const MAX_CHUNK_SIZE: usize = 1024;

/// How long a receive may block before the interrupt flag is checked again.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Pause after a failed receive before trying again.
pub const RECEIVE_RETRY_DELAY_MS: u64 = 50;

/// Consecutive failed receives after which the listener gives up.
pub const MAX_RECEIVE_FAILURES: u32 = 20;

// ============================================================================
// Tokens
// ============================================================================

/// Begins an image transfer.
pub const IMAGE_START_TOKEN: &[u8] = b"O%1";

/// Stops the listener.
pub const SHUTDOWN_TOKEN: &[u8] = b"END";

// ============================================================================
// Commands
// ============================================================================

/// Brightness command tag.
pub const TAG_BRIGHTNESS: u8 = b'B';

/// Contrast command tag.
pub const TAG_CONTRAST: u8 = b'C';

/// Longest command datagram accepted before it is skipped as garbage.
pub const MAX_COMMAND_LEN: usize = 16;
