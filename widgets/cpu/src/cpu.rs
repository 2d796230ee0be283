//! CPU widget for barwidget-rs.
//!
//! Combines three readings into one display string: utilization percentage
//! (delta over two successive `/proc/stat` samples), current frequency from
//! the cpufreq scaling file, and package temperature from a thermal zone.

use barwidget_rs_core::{scan, Widget, WidgetError, WidgetOutput};
use std::path::{Path, PathBuf};

/// The seven cumulative counters from the first line of `/proc/stat`.
///
/// All values are in jiffies and monotonically non-decreasing between
/// samples absent a counter reset; a sample is only comparable to the
/// immediately preceding one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuCounters {
    /// Time spent in user mode
    pub user: u64,
    /// Time spent in user mode with low priority
    pub nice: u64,
    /// Time spent in kernel mode
    pub system: u64,
    /// Time spent idle
    pub idle: u64,
    /// Time waiting for I/O to complete
    pub iowait: u64,
    /// Time servicing hardware interrupts
    pub irq: u64,
    /// Time servicing software interrupts
    pub softirq: u64,
}

impl CpuCounters {
    /// Total CPU time across all seven states.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.user + self.nice + self.system + self.idle + self.iowait + self.irq + self.softirq
    }

    /// CPU time spent busy: user + nice + system + irq + softirq.
    ///
    /// Idle and iowait are excluded here but counted in [`total`], giving
    /// the conventional busy-fraction formula.
    ///
    /// [`total`]: CpuCounters::total
    #[must_use]
    pub const fn active(&self) -> u64 {
        self.user + self.nice + self.system + self.irq + self.softirq
    }

    /// Parse the aggregate counters from a `/proc/stat` cpu line.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::Read`] if the line does not carry a label
    /// followed by at least seven unsigned values.
    pub fn parse_stat_line(line: &str) -> Result<Self, WidgetError> {
        let values: Result<Vec<u64>, _> = line
            .split_whitespace()
            .skip(1) // label ("cpu")
            .take(7)
            .map(str::parse)
            .collect();

        let values =
            values.map_err(|_| WidgetError::read("non-numeric counter in /proc/stat line"))?;

        if values.len() < 7 {
            return Err(WidgetError::read(format!(
                "short /proc/stat line: expected 7 counters, got {}",
                values.len()
            )));
        }

        Ok(Self {
            user: values[0],
            nice: values[1],
            system: values[2],
            idle: values[3],
            iowait: values[4],
            irq: values[5],
            softirq: values[6],
        })
    }
}

/// Previous-sample state for utilization deltas.
///
/// One instance persists across refresh ticks; it starts all-zero, which
/// doubles as the first-call sentinel, and is overwritten after every
/// successful read. Not safe for concurrent polling; confine each instance
/// to a single caller.
#[derive(Debug, Default)]
pub struct CpuSampleState {
    prev: CpuCounters,
}

impl CpuSampleState {
    /// Create a fresh state; the first utilization call will report 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Utilization percentage between the persisted sample and `cur`.
    ///
    /// Returns 0 on the first call (all-zero sentinel) and when no counter
    /// time elapsed between samples, e.g. after a counter reset. `cur` is
    /// persisted as the new previous sample in every case. The result is
    /// the truncated integer `100 * active_delta / total_delta`, always in
    /// `0..=100`.
    pub fn utilization(&mut self, cur: CpuCounters) -> u8 {
        let prev = std::mem::replace(&mut self.prev, cur);

        if prev.user == 0 {
            return 0;
        }

        let total_delta = cur.total().saturating_sub(prev.total());
        if total_delta == 0 {
            return 0;
        }

        let active_delta = cur.active().saturating_sub(prev.active());
        (100 * active_delta / total_delta).min(100) as u8
    }
}

/// CPU widget combining utilization, frequency, and temperature.
///
/// # Examples
///
/// ```no_run
/// use barwidget_rs_cpu::CpuWidget;
/// use barwidget_rs_core::Widget;
///
/// let mut widget = CpuWidget::new();
/// let output = widget.refresh()?;
/// println!("{}", output.text); // e.g. " 7% 2.4GHz 45°"
/// # Ok::<(), barwidget_rs_core::WidgetError>(())
/// ```
#[derive(Debug)]
pub struct CpuWidget {
    name: String,
    state: CpuSampleState,
    stat_path: PathBuf,
    freq_path: PathBuf,
    temp_path: PathBuf,
}

impl Default for CpuWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuWidget {
    /// Cumulative counter file.
    const PROC_STAT_PATH: &'static str = "/proc/stat";

    /// Scaling frequency of cpu0, in kHz.
    const FREQ_PATH: &'static str = "/sys/devices/system/cpu/cpu0/cpufreq/scaling_cur_freq";

    /// Package temperature, in millidegrees Celsius.
    const TEMP_PATH: &'static str = "/sys/class/thermal/thermal_zone2/temp";

    /// Create a CPU widget reading the standard kernel locations.
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: "cpu".to_owned(),
            state: CpuSampleState::new(),
            stat_path: PathBuf::from(Self::PROC_STAT_PATH),
            freq_path: PathBuf::from(Self::FREQ_PATH),
            temp_path: PathBuf::from(Self::TEMP_PATH),
        }
    }

    /// Create a CPU widget reading from specific paths (useful for testing).
    #[must_use]
    pub fn with_paths(stat_path: PathBuf, freq_path: PathBuf, temp_path: PathBuf) -> Self {
        Self {
            name: "cpu".to_owned(),
            state: CpuSampleState::new(),
            stat_path,
            freq_path,
            temp_path,
        }
    }

    /// Current frequency in GHz; 0.0 if the cpufreq file cannot be read.
    #[must_use]
    pub fn frequency_ghz(&self) -> f64 {
        match scan::read_u64(&self.freq_path) {
            Ok(khz) => khz as f64 / 1_000_000.0,
            Err(_) => 0.0,
        }
    }

    /// Current temperature in whole degrees; 0 if the zone cannot be read.
    #[must_use]
    pub fn temperature(&self) -> u64 {
        match scan::read_u64(&self.temp_path) {
            Ok(millidegrees) => millidegrees / 1000,
            Err(_) => 0,
        }
    }

    /// Utilization percentage since the previous refresh; 0 if the counter
    /// file cannot be read or no delta is available yet.
    pub fn utilization(&mut self) -> u8 {
        match self.read_counters() {
            Ok(cur) => self.state.utilization(cur),
            Err(_) => 0,
        }
    }

    fn read_counters(&self) -> Result<CpuCounters, WidgetError> {
        let content = std::fs::read_to_string(&self.stat_path)?;
        let first_line = content
            .lines()
            .next()
            .ok_or_else(|| WidgetError::read("empty /proc/stat"))?;
        CpuCounters::parse_stat_line(first_line)
    }
}

impl Widget for CpuWidget {
    type Error = WidgetError;

    fn refresh(&mut self) -> Result<WidgetOutput, Self::Error> {
        let perc = self.utilization();
        let freq = self.frequency_ghz();
        let temp = self.temperature();

        let text = format!("{:2}% {:.1}GHz {:2}°", perc, freq, temp);
        Ok(WidgetOutput::new(text).with_percentage(perc))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn check_availability(&self) -> Result<(), Self::Error> {
        if !Path::new(&self.stat_path).exists() {
            return Err(WidgetError::unavailable(format!(
                "{} does not exist (not a Linux system?)",
                self.stat_path.display()
            )));
        }
        self.read_counters()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn counters(values: [u64; 7]) -> CpuCounters {
        CpuCounters {
            user: values[0],
            nice: values[1],
            system: values[2],
            idle: values[3],
            iowait: values[4],
            irq: values[5],
            softirq: values[6],
        }
    }

    #[test]
    fn test_stat_line_parsing() {
        let line = "cpu  1234 56 789 10000 200 30 40 5 0 0";
        let c = CpuCounters::parse_stat_line(line).unwrap();

        assert_eq!(c.user, 1234);
        assert_eq!(c.nice, 56);
        assert_eq!(c.system, 789);
        assert_eq!(c.idle, 10000);
        assert_eq!(c.iowait, 200);
        assert_eq!(c.irq, 30);
        assert_eq!(c.softirq, 40);
    }

    #[test]
    fn test_stat_line_short_fails() {
        assert!(CpuCounters::parse_stat_line("cpu  1 2 3 4").is_err());
        assert!(CpuCounters::parse_stat_line("cpu").is_err());
        assert!(CpuCounters::parse_stat_line("cpu  1 2 3 4 5 6 x").is_err());
    }

    #[test]
    fn test_active_excludes_idle_and_iowait() {
        let c = counters([10, 20, 30, 1000, 500, 40, 50]);
        assert_eq!(c.total(), 1650);
        assert_eq!(c.active(), 150);
    }

    #[test]
    fn test_first_call_returns_zero_and_persists() {
        let mut state = CpuSampleState::new();
        let first = counters([100, 0, 50, 800, 20, 5, 5]);

        assert_eq!(state.utilization(first), 0);

        // Second call computes a real delta against the persisted sample.
        let second = counters([150, 0, 70, 880, 20, 10, 10]);
        // active delta = 240 - 160 = 80, total delta = 1140 - 980 = 160
        assert_eq!(state.utilization(second), 50);
    }

    #[test]
    fn test_utilization_formula_truncates() {
        let mut state = CpuSampleState::new();
        state.utilization(counters([100, 0, 0, 200, 0, 0, 0]));

        // active delta = 1, total delta = 3: 100*1/3 = 33.33 -> 33
        assert_eq!(state.utilization(counters([101, 0, 0, 202, 0, 0, 0])), 33);
    }

    #[test]
    fn test_zero_total_delta_returns_zero() {
        let mut state = CpuSampleState::new();
        let sample = counters([100, 0, 50, 800, 20, 5, 5]);
        state.utilization(sample);
        assert_eq!(state.utilization(sample), 0);
    }

    #[test]
    fn test_counter_reset_returns_zero() {
        let mut state = CpuSampleState::new();
        state.utilization(counters([1000, 0, 500, 8000, 0, 0, 0]));

        // Counters went backwards (reset); saturating deltas give 0.
        assert_eq!(state.utilization(counters([10, 0, 5, 80, 0, 0, 0])), 0);

        // The reset sample was persisted and the next delta works again.
        assert_eq!(state.utilization(counters([110, 0, 5, 80, 0, 0, 0])), 100);
    }

    #[test]
    fn test_utilization_in_range_for_busy_cpu() {
        let mut state = CpuSampleState::new();
        state.utilization(counters([50, 10, 20, 900, 10, 5, 5]));

        let perc = state.utilization(counters([500, 10, 200, 900, 10, 50, 50]));
        assert!(perc <= 100);
        assert_eq!(perc, 100); // no idle time elapsed at all
    }

    #[test]
    fn test_fallbacks_on_missing_files() {
        let mut widget = CpuWidget::with_paths(
            PathBuf::from("/nonexistent/stat"),
            PathBuf::from("/nonexistent/freq"),
            PathBuf::from("/nonexistent/temp"),
        );

        assert_eq!(widget.utilization(), 0);
        assert_eq!(widget.frequency_ghz(), 0.0);
        assert_eq!(widget.temperature(), 0);

        let output = widget.refresh().unwrap();
        assert_eq!(output.text, " 0% 0.0GHz  0°");
    }

    #[test]
    fn test_refresh_formatting() {
        let mut stat = NamedTempFile::new().unwrap();
        writeln!(stat, "cpu  100 0 50 800 20 5 5 0 0 0").unwrap();
        let mut freq = NamedTempFile::new().unwrap();
        writeln!(freq, "2400000").unwrap();
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "45999").unwrap();

        let mut widget = CpuWidget::with_paths(
            stat.path().to_path_buf(),
            freq.path().to_path_buf(),
            temp.path().to_path_buf(),
        );

        // First refresh: utilization 0 by the first-call rule, but frequency
        // and temperature read through.
        let output = widget.refresh().unwrap();
        assert_eq!(output.text, " 0% 2.4GHz 45°");
        assert_eq!(output.percentage, Some(0));
    }
}
