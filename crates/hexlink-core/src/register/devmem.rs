//! `/dev/mem`-backed register space.

use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::ptr;

use memmap2::{MmapMut, MmapOptions};
use tracing::{debug, info, instrument};

use super::layout::RegisterLayout;
use super::traits::{RegisterError, RegisterSpace, check_bounds};

/// Physical memory window mapped through a memory device file.
pub struct DevMemRegisterSpace {
    mmap: Option<MmapMut>,
    file: Option<File>,
    span: usize,
}

impl DevMemRegisterSpace {
    /// Open `path` and map `layout.span` bytes at `layout.base_address`.
    #[instrument(level = "info", fields(base = format!("{:#010X}", layout.base_address), span = format!("{:#X}", layout.span)))]
    pub fn open(path: &str, layout: &RegisterLayout) -> Result<Self, RegisterError> {
        layout.validate()?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_SYNC)
            .open(path)
            .map_err(|source| RegisterError::DeviceOpenFailure {
                path: path.to_string(),
                source,
            })?;

        // SAFETY: the mapping covers device memory that no other part of
        // this process aliases; all access goes through volatile reads and
        // writes below, bounds-checked against `span`.
        let mmap = unsafe {
            MmapOptions::new()
                .offset(layout.base_address)
                .len(layout.span)
                .map_mut(&file)
        }
        .map_err(|source| RegisterError::DeviceMapFailure {
            base: layout.base_address,
            span: layout.span,
            source,
        })?;

        info!(path = %path, "Register window mapped");

        Ok(Self {
            mmap: Some(mmap),
            file: Some(file),
            span: layout.span,
        })
    }

    fn mapping(&self) -> Result<&MmapMut, RegisterError> {
        self.mmap.as_ref().ok_or(RegisterError::Closed)
    }
}

impl RegisterSpace for DevMemRegisterSpace {
    fn span(&self) -> usize {
        self.span
    }

    fn write_at(&mut self, offset: usize, data: &[u8]) -> Result<(), RegisterError> {
        check_bounds(offset, data.len(), self.span)?;
        let mmap = self.mmap.as_mut().ok_or(RegisterError::Closed)?;
        let base = mmap.as_mut_ptr();
        for (i, byte) in data.iter().enumerate() {
            // SAFETY: offset + i < span, checked above.
            unsafe { ptr::write_volatile(base.add(offset + i), *byte) };
        }
        debug!(offset = %format!("{:#X}", offset), len = data.len(), "Register write");
        Ok(())
    }

    fn read_at(&self, offset: usize, len: usize) -> Result<Vec<u8>, RegisterError> {
        check_bounds(offset, len, self.span)?;
        let base = self.mapping()?.as_ptr();
        let bytes = (0..len)
            // SAFETY: offset + i < span, checked above.
            .map(|i| unsafe { ptr::read_volatile(base.add(offset + i)) })
            .collect();
        Ok(bytes)
    }

    fn close(&mut self) -> Result<(), RegisterError> {
        if self.mmap.take().is_some() {
            debug!("Register window unmapped");
        }
        self.file.take();
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.mmap.is_some()
    }
}

impl Drop for DevMemRegisterSpace {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
