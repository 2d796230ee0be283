//! Memory widget library for barwidget-rs.

mod memory;

pub use memory::{MemoryCounters, MemoryWidget};
