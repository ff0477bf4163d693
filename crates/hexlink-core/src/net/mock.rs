//! Mock datagram source for testing.

use std::collections::VecDeque;
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};

use super::traits::{DatagramSource, NetError};

#[derive(Debug)]
enum Scripted {
    Datagram(Vec<u8>),
    Timeout,
    Failure(io::ErrorKind),
}

#[derive(Debug)]
struct MockState {
    queue: VecDeque<Scripted>,
    open: bool,
    close_count: usize,
}

/// Scripted datagram source. Clones share the same queue.
///
/// Once the queue runs dry, `recv` reports `Disconnected`.
#[derive(Debug, Clone)]
pub struct MockDatagramSource {
    state: Arc<Mutex<MockState>>,
    peer: SocketAddr,
}

impl MockDatagramSource {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                queue: VecDeque::new(),
                open: true,
                close_count: 0,
            })),
            peer: SocketAddr::from((Ipv4Addr::LOCALHOST, 50_000)),
        }
    }

    /// Queue a datagram to be returned on a later receive.
    pub fn push(&self, datagram: &[u8]) {
        self.state.lock().unwrap().queue.push_back(Scripted::Datagram(datagram.to_vec()));
    }

    /// Queue an empty poll interval.
    pub fn push_timeout(&self) {
        self.state.lock().unwrap().queue.push_back(Scripted::Timeout);
    }

    /// Queue a receive that fails with `kind`.
    pub fn push_failure(&self, kind: io::ErrorKind) {
        self.state
            .lock()
            .unwrap()
            .queue
            .push_back(Scripted::Failure(kind));
    }

    pub fn pending(&self) -> usize {
        self.state.lock().unwrap().queue.len()
    }

    /// Number of times the source was actually released.
    pub fn close_count(&self) -> usize {
        self.state.lock().unwrap().close_count
    }
}

impl Default for MockDatagramSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DatagramSource for MockDatagramSource {
    fn recv(&mut self, buf: &mut [u8]) -> Result<Option<(usize, SocketAddr)>, NetError> {
        let mut state = self.state.lock().unwrap();
        if !state.open {
            return Err(NetError::Disconnected);
        }
        match state.queue.pop_front() {
            Some(Scripted::Datagram(datagram)) => {
                let n = datagram.len().min(buf.len());
                buf[..n].copy_from_slice(&datagram[..n]);
                Ok(Some((n, self.peer)))
            }
            Some(Scripted::Timeout) => Ok(None),
            Some(Scripted::Failure(kind)) => Err(NetError::ReceiveFailed(kind.into())),
            None => Err(NetError::Disconnected),
        }
    }

    fn close(&mut self) {
        let mut state = self.state.lock().unwrap();
        if state.open {
            state.open = false;
            state.close_count += 1;
        }
    }

    fn is_open(&self) -> bool {
        self.state.lock().unwrap().open
    }

    fn local_addr(&self) -> Option<SocketAddr> {
        None
    }
}
