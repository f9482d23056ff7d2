//! Adapter implementations (hexagonal architecture)
//!
//! Concrete implementations of the ports defined in `crate::ports`.

pub mod memory;
pub mod text_file;

pub use memory::MemoryStore;
pub use text_file::TextFileStore;
