//! In-memory register space for testing and hardware-less runs.

use std::sync::{Arc, Mutex};

use super::traits::{RegisterError, RegisterSpace, check_bounds};

#[derive(Debug)]
struct MemoryState {
    bytes: Vec<u8>,
    /// Captured writes as (offset, data).
    write_log: Vec<(usize, Vec<u8>)>,
    open: bool,
    close_count: usize,
}

/// Register space backed by a plain byte buffer.
///
/// Clones share the same buffer, so a test can keep a clone for inspection
/// after handing the original to the listener.
#[derive(Debug, Clone)]
pub struct MemoryRegisterSpace {
    state: Arc<Mutex<MemoryState>>,
    span: usize,
}

impl MemoryRegisterSpace {
    pub fn new(span: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState {
                bytes: vec![0u8; span],
                write_log: Vec::new(),
                open: true,
                close_count: 0,
            })),
            span,
        }
    }

    /// Get all captured writes.
    pub fn get_writes(&self) -> Vec<(usize, Vec<u8>)> {
        self.state.lock().unwrap().write_log.clone()
    }

    /// Get captured writes that landed at `offset`.
    pub fn writes_at(&self, offset: usize) -> Vec<Vec<u8>> {
        self.get_writes()
            .into_iter()
            .filter(|(o, _)| *o == offset)
            .map(|(_, d)| d)
            .collect()
    }

    pub fn clear_writes(&self) {
        self.state.lock().unwrap().write_log.clear();
    }

    /// Number of times the space was actually released.
    pub fn close_count(&self) -> usize {
        self.state.lock().unwrap().close_count
    }

    /// Preload bytes without logging a write.
    pub fn poke(&self, offset: usize, data: &[u8]) {
        let mut state = self.state.lock().unwrap();
        state.bytes[offset..offset + data.len()].copy_from_slice(data);
    }

    /// Read bytes regardless of open state.
    pub fn peek(&self, offset: usize, len: usize) -> Vec<u8> {
        self.state.lock().unwrap().bytes[offset..offset + len].to_vec()
    }
}

impl RegisterSpace for MemoryRegisterSpace {
    fn span(&self) -> usize {
        self.span
    }

    fn write_at(&mut self, offset: usize, data: &[u8]) -> Result<(), RegisterError> {
        check_bounds(offset, data.len(), self.span)?;
        let mut state = self.state.lock().unwrap();
        if !state.open {
            return Err(RegisterError::Closed);
        }
        state.bytes[offset..offset + data.len()].copy_from_slice(data);
        state.write_log.push((offset, data.to_vec()));
        Ok(())
    }

    fn read_at(&self, offset: usize, len: usize) -> Result<Vec<u8>, RegisterError> {
        check_bounds(offset, len, self.span)?;
        let state = self.state.lock().unwrap();
        if !state.open {
            return Err(RegisterError::Closed);
        }
        Ok(state.bytes[offset..offset + len].to_vec())
    }

    fn close(&mut self) -> Result<(), RegisterError> {
        let mut state = self.state.lock().unwrap();
        if state.open {
            state.open = false;
            state.close_count += 1;
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.state.lock().unwrap().open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_capture() {
        let mut regs = MemoryRegisterSpace::new(0x200);
        regs.write_at(0x100, &[1, 2, 3, 4]).unwrap();
        regs.write_at(0x110, &[5]).unwrap();

        let writes = regs.get_writes();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0], (0x100, vec![1, 2, 3, 4]));
        assert_eq!(regs.read_at(0x100, 4).unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(regs.writes_at(0x110), vec![vec![5]]);
    }

    #[test]
    fn test_u32_little_endian() {
        let mut regs = MemoryRegisterSpace::new(0x20);
        regs.write_u32(0x10, 0x0000_01C0).unwrap();
        assert_eq!(regs.peek(0x10, 4), vec![0xC0, 0x01, 0x00, 0x00]);
        assert_eq!(regs.read_u32(0x10).unwrap(), 0x1C0);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut regs = MemoryRegisterSpace::new(0x10);
        assert!(matches!(
            regs.write_at(0x0E, &[0; 4]),
            Err(RegisterError::OutOfBounds { .. })
        ));
        assert!(regs.read_at(0x10, 1).is_err());
        assert!(regs.get_writes().is_empty());
    }

    #[test]
    fn test_close_once() {
        let mut regs = MemoryRegisterSpace::new(0x10);
        let handle = regs.clone();
        regs.close().unwrap();
        regs.close().unwrap();
        assert_eq!(handle.close_count(), 1);
        assert!(!handle.is_open());
        assert!(matches!(regs.write_at(0, &[1]), Err(RegisterError::Closed)));
    }
}
