//! Content resolver implementations
//!
//! This module provides implementations of the ContentResolver trait.

pub mod memory;

pub use memory::MemoryContentStore;
