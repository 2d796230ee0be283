//! Battery widget library for barwidget-rs.

mod battery;

pub use battery::{battery_glyph, charge_level, BatteryStatus, BatteryWidget};
