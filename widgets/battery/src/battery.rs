//! Battery widget for barwidget-rs.
//!
//! Composes the charge-based percentage, an 11-level banding function, the
//! kernel status classifier, and a glyph lookup table into one display
//! string. The displayed percentage is the raw value; the banded level only
//! selects the icon.

use barwidget_rs_core::{scan, Widget, WidgetError, WidgetOutput};
use std::fs;
use std::path::PathBuf;

/// Charge state reported by the kernel status pseudo-file.
///
/// Derived by exact, case-sensitive match against the four recognized
/// kernel strings; anything else, including an unreadable file, maps to
/// `Unknown`. Each refresh re-derives the state from scratch; there is no
/// transition memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryStatus {
    /// Status file unreadable or unrecognized
    Unknown,
    /// Plugged in but not taking charge
    NotCharging,
    /// Taking charge
    Charging,
    /// Running on battery
    Discharging,
    /// Fully charged
    Charged,
}

impl BatteryStatus {
    /// Classify the trimmed content of a kernel status file.
    #[must_use]
    pub fn from_kernel_status(status: &str) -> Self {
        match status {
            "Charging" => Self::Charging,
            "Discharging" => Self::Discharging,
            "Full" => Self::Charged,
            "Not charging" => Self::NotCharging,
            _ => Self::Unknown,
        }
    }

    /// Whether this state selects the charging glyph column.
    #[must_use]
    pub const fn is_charging(&self) -> bool {
        matches!(self, Self::Charging)
    }
}

/// Band a raw percentage into one of the 11 display levels {0, 10, .., 100}.
///
/// The step function is total and monotonic, with boundaries at every 10%
/// midpoint shifted by 5: `<5 -> 0`, `<15 -> 10`, ..., `<95 -> 90`,
/// `else -> 100`.
#[must_use]
pub const fn charge_level(percentage: u64) -> u8 {
    match percentage {
        0..=4 => 0,
        5..=14 => 10,
        15..=24 => 20,
        25..=34 => 30,
        35..=44 => 40,
        45..=54 => 50,
        55..=64 => 60,
        65..=74 => 70,
        75..=84 => 80,
        85..=94 => 90,
        _ => 100,
    }
}

/// Glyph for a (level, charging) pair.
///
/// Only the charging state selects the charging column; every other state
/// uses the static column. Levels outside {0, 10, .., 100} fall back to the
/// empty-battery outline, unreachable through [`charge_level`].
#[must_use]
pub const fn battery_glyph(level: u8, charging: bool) -> &'static str {
    match level {
        0 => {
            if charging {
                "\u{f089f}" // 󰢟
            } else {
                "\u{f008e}" // 󰂎
            }
        }
        10 => {
            if charging {
                "\u{f089c}" // 󰢜
            } else {
                "\u{f007a}" // 󰁺
            }
        }
        20 => {
            if charging {
                "\u{f0086}" // 󰂆
            } else {
                "\u{f007b}" // 󰁻
            }
        }
        30 => {
            if charging {
                "\u{f0087}" // 󰂇
            } else {
                "\u{f007c}" // 󰁼
            }
        }
        40 => {
            if charging {
                "\u{f0088}" // 󰂈
            } else {
                "\u{f007d}" // 󰁽
            }
        }
        50 => {
            if charging {
                "\u{f089d}" // 󰢝
            } else {
                "\u{f007e}" // 󰁾
            }
        }
        60 => {
            if charging {
                "\u{f0089}" // 󰂉
            } else {
                "\u{f007f}" // 󰁿
            }
        }
        70 => {
            if charging {
                "\u{f089e}" // 󰢞
            } else {
                "\u{f0080}" // 󰂀
            }
        }
        80 => {
            if charging {
                "\u{f008a}" // 󰂊
            } else {
                "\u{f0081}" // 󰂁
            }
        }
        90 => {
            if charging {
                "\u{f008b}" // 󰂋
            } else {
                "\u{f0082}" // 󰂂
            }
        }
        100 => {
            if charging {
                "\u{f0085}" // 󰂅
            } else {
                "\u{f0079}" // 󰁹
            }
        }
        _ => "\u{f008e}", // 󰂎
    }
}

/// Battery widget for one named power-supply device.
///
/// # Examples
///
/// ```no_run
/// use barwidget_rs_battery::BatteryWidget;
/// use barwidget_rs_core::Widget;
///
/// let mut widget = BatteryWidget::new("BAT0");
/// let output = widget.refresh()?;
/// println!("{}", output.text); // e.g. "󰂂 93%"
/// # Ok::<(), barwidget_rs_core::WidgetError>(())
/// ```
#[derive(Debug)]
pub struct BatteryWidget {
    name: String,
    device: String,
    root: PathBuf,
}

impl BatteryWidget {
    const POWER_SUPPLY_ROOT: &'static str = "/sys/class/power_supply";

    /// Longest device name accepted for path substitution.
    const MAX_DEVICE_NAME: usize = 64;

    /// Create a battery widget for the named device under
    /// `/sys/class/power_supply`.
    #[must_use]
    pub fn new(device: impl Into<String>) -> Self {
        let device = device.into();
        Self {
            name: format!("battery-{device}"),
            device,
            root: PathBuf::from(Self::POWER_SUPPLY_ROOT),
        }
    }

    /// Create a battery widget rooted at a specific directory (useful for
    /// testing).
    #[must_use]
    pub fn with_root(device: impl Into<String>, root: PathBuf) -> Self {
        let device = device.into();
        Self {
            name: format!("battery-{device}"),
            device,
            root,
        }
    }

    /// Substitute the device name into the supply-file path.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::Format`] for names that could escape the
    /// supply directory or exceed the accepted length.
    fn supply_path(&self, file: &str) -> Result<PathBuf, WidgetError> {
        if self.device.is_empty() || self.device.len() > Self::MAX_DEVICE_NAME {
            return Err(WidgetError::format(format!(
                "battery device name length out of range: {:?}",
                self.device
            )));
        }
        if self.device.contains(['/', '\0']) {
            return Err(WidgetError::format(format!(
                "battery device name contains path separator: {:?}",
                self.device
            )));
        }

        Ok(self.root.join(&self.device).join(file))
    }

    /// Read one supply counter; 0 on any failure.
    fn read_counter(&self, file: &str) -> u64 {
        self.supply_path(file)
            .and_then(|path| scan::read_u64(&path))
            .unwrap_or(0)
    }

    /// Charge percentage from `charge_now` and `charge_full`.
    ///
    /// An unreadable `charge_full` reads as 0 and would divide by zero; that
    /// case falls back to 0 like every other failed stage.
    #[must_use]
    pub fn percentage(&self) -> u64 {
        let charge_now = self.read_counter("charge_now");
        let charge_full = self.read_counter("charge_full");

        if charge_full == 0 {
            return 0;
        }
        charge_now * 100 / charge_full
    }

    /// Current charge state; `Unknown` if the status file cannot be read.
    #[must_use]
    pub fn status(&self) -> BatteryStatus {
        let content = match self.supply_path("status").map(fs::read_to_string) {
            Ok(Ok(content)) => content,
            _ => return BatteryStatus::Unknown,
        };

        BatteryStatus::from_kernel_status(content.trim_end())
    }
}

impl Widget for BatteryWidget {
    type Error = WidgetError;

    fn refresh(&mut self) -> Result<WidgetOutput, Self::Error> {
        let perc = self.percentage();
        let status = self.status();
        let glyph = battery_glyph(charge_level(perc), status.is_charging());

        let text = format!("{} {}%", glyph, perc);
        let output = WidgetOutput::new(text)
            .with_tooltip(format!("Status: {:?}", status))
            .with_percentage(perc.min(100) as u8);

        Ok(output)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn check_availability(&self) -> Result<(), Self::Error> {
        let path = self.supply_path("status")?;
        if !path.exists() {
            return Err(WidgetError::unavailable(format!(
                "no such power supply: {}",
                path.display()
            )));
        }
        Ok(())
    }
}
