//! Configuration source implementations.

mod config_source;
mod file;
mod func;
mod memory;

pub use config_source::ConfigSource;
pub use file::FileSource;
pub use func::FnSource;
pub use memory::MemorySource;
