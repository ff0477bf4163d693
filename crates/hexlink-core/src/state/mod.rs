//! State module.

pub mod handlers;
pub mod machine;

pub use handlers::{HandleResult, HandlerContext, handle_datagram};
pub use machine::{Mode, Session};
