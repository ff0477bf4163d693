//! Datagram source abstraction.
//!
//! Defines the `DatagramSource` trait so the listener loop can run against
//! a real UDP socket or a scripted mock.

use std::net::SocketAddr;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetError {
    #[error("Failed to bind {addr}: {source}")]
    BindFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    #[error("Socket disconnected")]
    Disconnected,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of unconnected datagrams.
pub trait DatagramSource: Send {
    /// Receive one datagram into `buf`, truncating anything that does not fit.
    ///
    /// Returns `Ok(None)` when nothing arrived within the poll interval.
    fn recv(&mut self, buf: &mut [u8]) -> Result<Option<(usize, SocketAddr)>, NetError>;

    /// Release the underlying handle. Calling it again is a no-op.
    fn close(&mut self);

    fn is_open(&self) -> bool;

    fn local_addr(&self) -> Option<SocketAddr>;
}
