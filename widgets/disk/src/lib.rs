//! Disk widget library for barwidget-rs.

mod disk;

pub use disk::{DiskStat, DiskWidget};
