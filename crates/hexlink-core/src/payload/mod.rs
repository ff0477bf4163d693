//! Payload handling module.
//!
//! Provides reassembly of streamed images and the sinks they are handed to.

pub mod assembler;
pub mod sink;

pub use assembler::{AssemblyState, ImageAssembler};
pub use sink::{FileImageSink, ImageError, ImageInfo, ImageSink, MemoryImageSink};
