//! Config provider implementations
//!
//! This module provides implementations of the ConfigProvider trait.

pub mod file;
pub mod memory;

pub use file::FileConfigProvider;
pub use memory::MemoryConfigProvider;
