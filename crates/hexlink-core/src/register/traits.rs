//! Register space abstraction.
//!
//! Defines the `RegisterSpace` trait for byte-addressed access to a mapped
//! peripheral window, allowing different implementations (/dev/mem, memory).

use byteorder::{ByteOrder, LittleEndian};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegisterError {
    #[error("Failed to open {path}: {source}")]
    DeviceOpenFailure {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to map {span:#X} bytes at {base:#010X}: {source}")]
    DeviceMapFailure {
        base: u64,
        span: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Span {0:#X} is not a power of two")]
    InvalidSpan(usize),

    #[error("Access of {len} bytes at {offset:#X} exceeds span {span:#X}")]
    OutOfBounds {
        offset: usize,
        len: usize,
        span: usize,
    },

    #[error("Register space already closed")]
    Closed,
}

/// Byte-addressable window onto peripheral registers.
///
/// Offsets are relative to the start of the mapped span. Every access is
/// absolute; there is no cursor.
pub trait RegisterSpace: Send {
    /// Size of the mapped window in bytes.
    fn span(&self) -> usize;

    /// Write all of `data` starting at `offset`.
    fn write_at(&mut self, offset: usize, data: &[u8]) -> Result<(), RegisterError>;

    /// Read `len` bytes starting at `offset`.
    fn read_at(&self, offset: usize, len: usize) -> Result<Vec<u8>, RegisterError>;

    /// Release the mapping and its handle. Calling it again is a no-op.
    fn close(&mut self) -> Result<(), RegisterError>;

    fn is_open(&self) -> bool;

    /// Read a little-endian 32-bit register.
    fn read_u32(&self, offset: usize) -> Result<u32, RegisterError> {
        let bytes = self.read_at(offset, 4)?;
        Ok(LittleEndian::read_u32(&bytes))
    }

    /// Write a little-endian 32-bit register.
    fn write_u32(&mut self, offset: usize, value: u32) -> Result<(), RegisterError> {
        let mut buf = [0u8; 4];
        LittleEndian::write_u32(&mut buf, value);
        self.write_at(offset, &buf)
    }
}

pub(crate) fn check_bounds(offset: usize, len: usize, span: usize) -> Result<(), RegisterError> {
    match offset.checked_add(len) {
        Some(end) if end <= span => Ok(()),
        _ => Err(RegisterError::OutOfBounds { offset, len, span }),
    }
}
