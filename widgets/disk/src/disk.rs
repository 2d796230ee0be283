//! Disk widget for barwidget-rs.
//!
//! Reports free space for one mount path via `statvfs(3)`. Unlike the other
//! widgets, a failed query is surfaced as a warning before falling back,
//! because a vanished mount is usually actionable.

use barwidget_rs_core::{format, Widget, WidgetError, WidgetOutput};
use std::ffi::CString;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

/// Filesystem statistics for one mount path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskStat {
    /// Fragment size in bytes (`f_frsize`)
    pub fragment_size: u64,
    /// Blocks available to unprivileged users (`f_bavail`)
    pub available_blocks: u64,
}

impl DiskStat {
    /// Free space in gibibytes: `fragment_size * available_blocks / 1024³`.
    #[must_use]
    pub fn free_gib(&self) -> f64 {
        format::bytes_to_gib(self.fragment_size * self.available_blocks)
    }

    /// Query filesystem statistics for `path`.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::Format`] if the path cannot be passed to the
    /// OS call and [`WidgetError::Io`] with the OS error on query failure.
    pub fn query(path: &Path) -> Result<Self, WidgetError> {
        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|_| WidgetError::format("mount path contains NUL byte"))?;

        let mut vfs: libc::statvfs = unsafe { std::mem::zeroed() };
        let rc = unsafe { libc::statvfs(c_path.as_ptr(), &mut vfs) };
        if rc != 0 {
            return Err(WidgetError::Io(io::Error::last_os_error()));
        }

        Ok(Self {
            fragment_size: vfs.f_frsize as u64,
            available_blocks: vfs.f_bavail as u64,
        })
    }
}

/// Disk free-space widget for one mount path.
///
/// # Examples
///
/// ```no_run
/// use barwidget_rs_disk::DiskWidget;
/// use barwidget_rs_core::Widget;
///
/// let mut widget = DiskWidget::new("/");
/// let output = widget.refresh()?;
/// println!("{}", output.text); // e.g. "9.3Gb"
/// # Ok::<(), barwidget_rs_core::WidgetError>(())
/// ```
#[derive(Debug)]
pub struct DiskWidget {
    name: String,
    path: PathBuf,
}

impl DiskWidget {
    /// Create a disk widget for the given mount path.
    #[must_use]
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            name: "disk".to_owned(),
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Free space in gibibytes; 0.0 on query failure, with the failure
    /// logged as a warning.
    #[must_use]
    pub fn free_gib(&self) -> f64 {
        match DiskStat::query(&self.path) {
            Ok(stat) => stat.free_gib(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "statvfs failed");
                0.0
            }
        }
    }
}

impl Widget for DiskWidget {
    type Error = WidgetError;

    fn refresh(&mut self) -> Result<WidgetOutput, Self::Error> {
        let text = format!("{:3.1}Gb", self.free_gib());
        Ok(WidgetOutput::new(text))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn check_availability(&self) -> Result<(), Self::Error> {
        if !self.path.exists() {
            return Err(WidgetError::unavailable(format!(
                "mount path does not exist: {}",
                self.path.display()
            )));
        }
        DiskStat::query(&self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_space_formula() {
        let stat = DiskStat {
            fragment_size: 4096,
            available_blocks: 2_500_000,
        };

        assert!((stat.free_gib() - 9.3132).abs() < 0.001);
    }

    #[test]
    fn test_free_space_formatting() {
        let stat = DiskStat {
            fragment_size: 4096,
            available_blocks: 2_500_000,
        };

        assert_eq!(format!("{:3.1}Gb", stat.free_gib()), "9.3Gb");
    }

    #[test]
    fn test_query_on_real_filesystem() {
        // tempdir lives on whatever filesystem the test runs on; the query
        // itself must succeed and report a sane fragment size.
        let dir = tempfile::tempdir().unwrap();
        let stat = DiskStat::query(dir.path()).unwrap();
        assert!(stat.fragment_size > 0);
    }

    #[test]
    fn test_query_failure_falls_back_to_zero() {
        let widget = DiskWidget::new("/nonexistent/mount/point");
        assert_eq!(widget.free_gib(), 0.0);
    }

    #[test]
    fn test_refresh_fallback_formatting() {
        let mut widget = DiskWidget::new("/nonexistent/mount/point");
        let output = widget.refresh().unwrap();
        assert_eq!(output.text, "0.0Gb");
    }
}
