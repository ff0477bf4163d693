//! Register space module.

pub mod devmem;
pub mod layout;
pub mod memory;
pub mod traits;

pub use devmem::DevMemRegisterSpace;
pub use layout::RegisterLayout;
pub use memory::MemoryRegisterSpace;
pub use traits::{RegisterError, RegisterSpace};
