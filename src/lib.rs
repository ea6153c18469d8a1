pub mod config;
pub mod constants;
pub mod error;
pub mod frame_allocator;
pub mod io;
pub mod logger;
pub mod memory;
pub mod page_table;
pub mod replacement;
pub mod stats;
pub mod tlb;
pub mod translation;
pub mod vm_manager;

// Re-export commonly used items for convenience
pub use config::{Config, MalformedPolicy};
pub use constants::*;
pub use error::{Result, VmError};
pub use memory::{BackingStore, InMemoryBackingStore, MappedBackingStore};
pub use replacement::ReplacementPolicy;
pub use stats::Statistics;
pub use translation::{Outcome, TlbMode, Translation, Translator, VirtualAddress};
pub use vm_manager::VmManager;
