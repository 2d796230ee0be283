//! CPU widget library for barwidget-rs.
//!
//! Re-exports the CPU widget and its counter types.

mod cpu;

pub use cpu::{CpuCounters, CpuSampleState, CpuWidget};
