//! Image reassembly from UDP chunks.
//!
//! The sender splits an image into fixed-size chunks and sends them back to
//! back. There is no length field: the first chunk shorter than the nominal
//! chunk size is the last one. An image whose size is an exact multiple of
//! the chunk size therefore never completes on its own; it stays in progress
//! until the next start token resets it.

use crate::protocol::constants::MAX_CHUNK_SIZE;
use crate::state::{Mode, Session};

/// Outcome of feeding one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssemblyState {
    /// More chunks expected; `received` bytes buffered so far.
    InProgress { received: usize },
    /// The image is complete.
    Complete(Vec<u8>),
}

/// Accumulates image chunks into the session buffer.
#[derive(Debug, Clone, Copy)]
pub struct ImageAssembler {
    chunk_size: usize,
}

impl Default for ImageAssembler {
    fn default() -> Self {
        Self::new(MAX_CHUNK_SIZE)
    }
}

impl ImageAssembler {
    pub fn new(chunk_size: usize) -> Self {
        Self { chunk_size }
    }

    /// Begin a new image, discarding any partial one.
    pub fn start(&self, session: &mut Session) {
        session.image_buffer.clear();
        session.goto_mode(Mode::ReceivingImage);
    }

    /// Append a chunk. A short chunk is appended and then ends the image.
    pub fn on_chunk(&self, session: &mut Session, chunk: &[u8]) -> AssemblyState {
        session.image_buffer.extend_from_slice(chunk);

        if chunk.len() < self.chunk_size {
            session.goto_mode(Mode::Idle);
            AssemblyState::Complete(std::mem::take(&mut session.image_buffer))
        } else {
            AssemblyState::InProgress {
                received: session.image_buffer.len(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_full_chunks_and_tail() {
        let assembler = ImageAssembler::default();
        let mut session = Session::new();
        assembler.start(&mut session);

        for i in 0..3u8 {
            let state = assembler.on_chunk(&mut session, &vec![i; 1024]);
            assert_eq!(
                state,
                AssemblyState::InProgress {
                    received: (i as usize + 1) * 1024
                }
            );
            assert_eq!(session.mode, Mode::ReceivingImage);
        }

        let AssemblyState::Complete(image) = assembler.on_chunk(&mut session, &[9u8; 200]) else {
            panic!("expected completion");
        };
        assert_eq!(image.len(), 3 * 1024 + 200);
        assert_eq!(image[0], 0);
        assert_eq!(image[2048], 2);
        assert_eq!(image[3 * 1024], 9);
        assert_eq!(session.mode, Mode::Idle);
        assert!(session.image_buffer.is_empty());
    }

    #[test]
    fn test_single_short_chunk() {
        let assembler = ImageAssembler::default();
        let mut session = Session::new();
        assembler.start(&mut session);
        assert_eq!(
            assembler.on_chunk(&mut session, b"tiny"),
            AssemblyState::Complete(b"tiny".to_vec())
        );
    }

    #[test]
    fn test_empty_chunk_completes() {
        let assembler = ImageAssembler::new(4);
        let mut session = Session::new();
        assembler.start(&mut session);
        assembler.on_chunk(&mut session, b"abcd");
        assert_eq!(
            assembler.on_chunk(&mut session, b""),
            AssemblyState::Complete(b"abcd".to_vec())
        );
    }

    #[test]
    fn test_full_size_final_chunk_stays_in_progress() {
        let assembler = ImageAssembler::new(4);
        let mut session = Session::new();
        assembler.start(&mut session);
        assembler.on_chunk(&mut session, b"abcd");
        assert_eq!(
            assembler.on_chunk(&mut session, b"efgh"),
            AssemblyState::InProgress { received: 8 }
        );
        assert!(session.is_receiving_image());
    }

    #[test]
    fn test_start_discards_partial_image() {
        let assembler = ImageAssembler::new(4);
        let mut session = Session::new();
        assembler.start(&mut session);
        assembler.on_chunk(&mut session, b"stal");
        assembler.start(&mut session);
        assert!(session.image_buffer.is_empty());
        assert_eq!(
            assembler.on_chunk(&mut session, b"new"),
            AssemblyState::Complete(b"new".to_vec())
        );
    }
}
