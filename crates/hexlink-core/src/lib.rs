//! Hexlink-Core: UDP control listener for a memory-mapped 7-segment display.
//!
//! Receives brightness/contrast commands and streamed images over UDP,
//! mirrors the current values onto the board's HEX displays and sign LEDs,
//! and reassembles images for saving.
//!
//! # Architecture
//!
//! The crate is organized into layers:
//!
//! - **Display**: 7-segment patterns, register frame packing, display driver
//! - **Register**: Mapped register window abstraction (/dev/mem, memory)
//! - **Protocol**: Datagram tokens and command parsing
//! - **Payload**: Image chunk reassembly and image sinks
//! - **Net**: Datagram source abstraction (UDP, mock)
//! - **State**: Session state and datagram handlers
//! - **Events**: Observer pattern for UI decoupling
//! - **Session**: Listener configuration and loop
//!
//! # Example
//!
//! ```no_run
//! use hexlink_core::{DevMemRegisterSpace, FileImageSink, Listener, ListenerConfig, UdpDatagramSource};
//!
//! let config = ListenerConfig::default();
//! let regs = DevMemRegisterSpace::open(&config.device_path, &config.registers).expect("mapping failed");
//! let source = UdpDatagramSource::bind(&config.bind_addr, config.port, config.poll_interval())
//!     .expect("bind failed");
//! let sink = FileImageSink::new(&config.image_path);
//!
//! let mut listener = Listener::new(config, regs, source, sink).expect("bad layout");
//! listener.run().expect("listener failed");
//! ```

pub mod display;
pub mod events;
pub mod net;
pub mod params;
pub mod payload;
pub mod protocol;
pub mod register;
pub mod session;
pub mod state;

// Re-exports for convenience
pub use display::{DigitError, DigitPattern, DisplayDriver, DisplayError, RegisterFrame, SignIndicator};
pub use events::{ListenerEvent, ListenerObserver, LogLevel, NullObserver, ShutdownReason, TracingObserver};
pub use net::{DatagramSource, MockDatagramSource, NetError, UdpDatagramSource};
pub use params::{ParamsError, load_parameters, save_parameters};
pub use payload::{AssemblyState, FileImageSink, ImageAssembler, ImageError, ImageSink, MemoryImageSink};
pub use protocol::{Command, CommandError};
pub use register::{DevMemRegisterSpace, MemoryRegisterSpace, RegisterError, RegisterLayout, RegisterSpace};
pub use session::{Listener, ListenerConfig};
pub use state::{Mode, Session};
