//! Memory widget for barwidget-rs.
//!
//! Reads `/proc/meminfo` against a fixed 23-line schema and reports used
//! memory in gigabytes. The schema is deliberately strict: if the kernel
//! ever varies the field count or order, the whole read fails uniformly
//! rather than producing a silently wrong number.

use barwidget_rs_core::{format, scan, scan::FieldSpec, Widget, WidgetError, WidgetOutput};
use std::path::{Path, PathBuf};

/// The first 23 lines of `/proc/meminfo`, in kernel order.
///
/// Kept fields feed the used-memory formula; the rest are validated and
/// discarded.
const MEMINFO_SCHEMA: [FieldSpec; 23] = [
    FieldSpec::keep("MemTotal"),
    FieldSpec::keep("MemFree"),
    FieldSpec::skip("MemAvailable"),
    FieldSpec::keep("Buffers"),
    FieldSpec::keep("Cached"),
    FieldSpec::skip("SwapCached"),
    FieldSpec::skip("Active"),
    FieldSpec::skip("Inactive"),
    FieldSpec::skip("Active(anon)"),
    FieldSpec::skip("Inactive(anon)"),
    FieldSpec::skip("Active(file)"),
    FieldSpec::skip("Inactive(file)"),
    FieldSpec::skip("Unevictable"),
    FieldSpec::skip("Mlocked"),
    FieldSpec::skip("SwapTotal"),
    FieldSpec::skip("SwapFree"),
    FieldSpec::skip("Zswap"),
    FieldSpec::skip("Zswapped"),
    FieldSpec::skip("Dirty"),
    FieldSpec::skip("Writeback"),
    FieldSpec::skip("AnonPages"),
    FieldSpec::skip("Mapped"),
    FieldSpec::keep("Shmem"),
];

/// The counters the used-memory formula consumes, in kibibytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryCounters {
    /// Total physical memory
    pub total: u64,
    /// Free physical memory
    pub free: u64,
    /// Memory used for buffers
    pub buffers: u64,
    /// Memory used for page cache
    pub cached: u64,
    /// Shared memory (counted in cache but genuinely in use)
    pub shmem: u64,
}

impl MemoryCounters {
    /// Used memory in kibibytes: `(total - free - buffers - cached) + shmem`.
    ///
    /// Subtractions saturate so a malformed reading degrades rather than
    /// wrapping.
    #[must_use]
    pub const fn used_kib(&self) -> u64 {
        self.total
            .saturating_sub(self.free)
            .saturating_sub(self.buffers)
            .saturating_sub(self.cached)
            + self.shmem
    }

    /// Used memory in gibibytes.
    #[must_use]
    pub fn used_gib(&self) -> f64 {
        format::kib_to_gib(self.used_kib())
    }

    /// Scan meminfo content against the full 23-line schema.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::Read`] if any of the 23 lines is missing,
    /// reordered, or malformed.
    pub fn parse(content: &str) -> Result<Self, WidgetError> {
        let kept = scan::labeled_kib_fields(content, &MEMINFO_SCHEMA)?;

        Ok(Self {
            total: kept[0],
            free: kept[1],
            buffers: kept[2],
            cached: kept[3],
            shmem: kept[4],
        })
    }
}

/// Memory widget reporting used memory as `"<used>Gb"`.
///
/// # Examples
///
/// ```no_run
/// use barwidget_rs_memory::MemoryWidget;
/// use barwidget_rs_core::Widget;
///
/// let mut widget = MemoryWidget::new();
/// let output = widget.refresh()?;
/// println!("{}", output.text); // e.g. "11.3Gb"
/// # Ok::<(), barwidget_rs_core::WidgetError>(())
/// ```
#[derive(Debug)]
pub struct MemoryWidget {
    name: String,
    meminfo_path: PathBuf,
}

impl Default for MemoryWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryWidget {
    const PROC_MEMINFO_PATH: &'static str = "/proc/meminfo";

    /// Create a memory widget reading `/proc/meminfo`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: "memory".to_owned(),
            meminfo_path: PathBuf::from(Self::PROC_MEMINFO_PATH),
        }
    }

    /// Create a memory widget reading a specific path (useful for testing).
    #[must_use]
    pub fn with_path(meminfo_path: PathBuf) -> Self {
        Self {
            name: "memory".to_owned(),
            meminfo_path,
        }
    }

    /// Used memory in gibibytes; 0.0 on any read or scan failure.
    #[must_use]
    pub fn used_gib(&self) -> f64 {
        self.read_counters().map_or(0.0, |c| c.used_gib())
    }

    fn read_counters(&self) -> Result<MemoryCounters, WidgetError> {
        let content = std::fs::read_to_string(&self.meminfo_path)?;
        MemoryCounters::parse(&content)
    }
}

impl Widget for MemoryWidget {
    type Error = WidgetError;

    fn refresh(&mut self) -> Result<WidgetOutput, Self::Error> {
        let text = format!("{:.1}Gb", self.used_gib());
        Ok(WidgetOutput::new(text))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn check_availability(&self) -> Result<(), Self::Error> {
        if !Path::new(&self.meminfo_path).exists() {
            return Err(WidgetError::unavailable(format!(
                "{} does not exist (not a Linux system?)",
                self.meminfo_path.display()
            )));
        }
        self.read_counters()?;
        Ok(())
    }
}
