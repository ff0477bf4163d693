//! Network layer module.

pub mod mock;
pub mod traits;
pub mod udp;

pub use mock::MockDatagramSource;
pub use traits::{DatagramSource, NetError};
pub use udp::UdpDatagramSource;
