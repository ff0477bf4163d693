//! UDP socket datagram source.

use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use tracing::{debug, info, instrument};

use super::traits::{DatagramSource, NetError};

/// Bound, unconnected UDP socket.
pub struct UdpDatagramSource {
    socket: Option<UdpSocket>,
}

impl UdpDatagramSource {
    /// Bind to `bind_addr:port`. Receives give up after `poll_interval` so
    /// the caller can check for shutdown between datagrams.
    #[instrument(level = "info")]
    pub fn bind(bind_addr: &str, port: u16, poll_interval: Duration) -> Result<Self, NetError> {
        let addr = format!("{}:{}", bind_addr, port);
        let socket = UdpSocket::bind(&addr).map_err(|source| NetError::BindFailed {
            addr: addr.clone(),
            source,
        })?;
        socket.set_read_timeout(Some(poll_interval.max(Duration::from_millis(1))))?;
        info!(addr = %addr, "UDP socket bound");
        Ok(Self {
            socket: Some(socket),
        })
    }
}

impl DatagramSource for UdpDatagramSource {
    fn recv(&mut self, buf: &mut [u8]) -> Result<Option<(usize, SocketAddr)>, NetError> {
        let socket = self.socket.as_ref().ok_or(NetError::Disconnected)?;
        match socket.recv_from(buf) {
            Ok((n, peer)) => {
                debug!(peer = %peer, len = n, "Datagram received");
                Ok(Some((n, peer)))
            }
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                ) =>
            {
                Ok(None)
            }
            Err(e) => Err(NetError::ReceiveFailed(e)),
        }
    }

    fn close(&mut self) {
        if self.socket.take().is_some() {
            debug!("UDP socket closed");
        }
    }

    fn is_open(&self) -> bool {
        self.socket.is_some()
    }

    fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok())
    }
}
