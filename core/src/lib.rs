//! # barwidget-rs-core
//!
//! Shared library for the barwidget-rs widget suite: the status-bar output
//! type, the common widget trait, error types, and the pseudo-file sampler
//! the individual widgets build on.
//!
//! ## Quick Start
//!
//! ```rust
//! use barwidget_rs_core::{Widget, WidgetError, WidgetOutput};
//!
//! struct MyWidget {
//!     name: String,
//! }
//!
//! impl Widget for MyWidget {
//!     type Error = WidgetError;
//!
//!     fn refresh(&mut self) -> Result<WidgetOutput, Self::Error> {
//!         Ok(WidgetOutput::from_str("42%"))
//!     }
//!
//!     fn name(&self) -> &str {
//!         &self.name
//!     }
//! }
//! ```

use serde::Serialize;

/// One formatted widget reading, emitted as JSON by the widget binaries.
///
/// Only `text` is required; optional fields are omitted from the JSON when
/// `None`. The `text` field carries the final display string for the bar.
///
/// # Examples
///
/// ```rust
/// use barwidget_rs_core::WidgetOutput;
///
/// let output = WidgetOutput::new("73%".to_string())
///     .with_tooltip("Status: Discharging")
///     .with_percentage(73);
/// ```
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WidgetOutput {
    /// The main text to display in the bar
    pub text: String,
    /// Optional tooltip text shown on hover
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    /// Optional percentage value (0-100) for progress indicators
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<u8>,
}

impl WidgetOutput {
    /// Create a new output with just the required text field.
    #[must_use]
    pub const fn new(text: String) -> Self {
        Self {
            text,
            tooltip: None,
            percentage: None,
        }
    }

    /// Create a new output from a string literal.
    #[must_use]
    pub fn from_str(text: &str) -> Self {
        Self::new(text.to_owned())
    }

    /// Add a tooltip to this output.
    #[must_use]
    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    /// Add a percentage value to this output.
    ///
    /// # Panics
    ///
    /// Panics if `percentage` is greater than 100.
    #[must_use]
    pub fn with_percentage(mut self, percentage: u8) -> Self {
        assert!(
            percentage <= 100,
            "Percentage must be <= 100, got {}",
            percentage
        );
        self.percentage = Some(percentage);
        self
    }
}

/// Trait for all status-bar widgets.
///
/// A widget is a single-shot sampler: the refresh loop calls [`refresh`]
/// once per tick and the widget returns a freshly formatted reading. Widgets
/// absorb per-metric read failures internally and degrade to a documented
/// zero/Unknown fallback so one broken sensor never takes down the whole
/// status line; `refresh` erroring is reserved for conditions the caller
/// must see.
///
/// [`refresh`]: Widget::refresh
pub trait Widget {
    /// Error type for widget operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the underlying pseudo-files and return a formatted reading.
    ///
    /// # Errors
    ///
    /// Returns an error only for failures the caller must act on; ordinary
    /// sensor read failures degrade to fallback values instead.
    fn refresh(&mut self) -> Result<WidgetOutput, Self::Error>;

    /// Unique name for this widget, used in logging and diagnostics.
    fn name(&self) -> &str;

    /// Check whether the widget's data sources exist on this system.
    ///
    /// # Errors
    ///
    /// Returns an error if the widget is not available or supported.
    fn check_availability(&self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Common error types for widget operations.
#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    /// I/O error while opening or reading a pseudo-file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A pseudo-file did not yield the expected fields (short scan,
    /// malformed layout, non-numeric value).
    #[error("read failure: {message}")]
    Read {
        /// Description of what failed to scan
        message: String,
    },

    /// A device name could not be substituted into a path template.
    #[error("path format error: {message}")]
    Format {
        /// Description of the rejected substitution
        message: String,
    },

    /// The widget's data source does not exist on this system.
    #[error("widget unavailable: {reason}")]
    Unavailable {
        /// Reason why the widget is unavailable
        reason: String,
    },
}

impl WidgetError {
    /// Create a new read-failure error.
    pub fn read<S: Into<String>>(message: S) -> Self {
        Self::Read {
            message: message.into(),
        }
    }

    /// Create a new path-format error.
    pub fn format<S: Into<String>>(message: S) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    /// Create a new unavailable error.
    pub fn unavailable<S: Into<String>>(reason: S) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}

/// Fixed-layout scanning of kernel pseudo-files.
///
/// The kernel exposes metrics as small text files with a known layout:
/// either a single unsigned integer, or an ordered run of `Label: <value>
/// kB` lines. This module extracts the numeric fields in one pass against a
/// declarative schema; any deviation from the expected layout fails the
/// whole scan uniformly, and no partial result is handed to callers.
pub mod scan {
    use super::WidgetError;
    use std::fs;
    use std::path::Path;

    /// One expected line of a labeled multi-field pseudo-file.
    #[derive(Debug, Clone, Copy)]
    pub struct FieldSpec {
        /// Label the line must start with, without the trailing colon
        pub label: &'static str,
        /// Whether the value is returned or validated-and-discarded
        pub keep: bool,
    }

    impl FieldSpec {
        /// A field whose value is returned to the caller.
        #[must_use]
        pub const fn keep(label: &'static str) -> Self {
            Self { label, keep: true }
        }

        /// A field that must be present but whose value is discarded.
        #[must_use]
        pub const fn skip(label: &'static str) -> Self {
            Self { label, keep: false }
        }
    }

    /// Read a pseudo-file containing a single unsigned integer.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::Io`] if the file cannot be read and
    /// [`WidgetError::Read`] if the first token is not an unsigned integer.
    pub fn read_u64(path: &Path) -> Result<u64, WidgetError> {
        let content = fs::read_to_string(path)?;
        parse_u64(&content)
    }

    /// Parse a single unsigned integer from pseudo-file content.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::Read`] if the content holds no parseable
    /// unsigned integer.
    pub fn parse_u64(content: &str) -> Result<u64, WidgetError> {
        let token = content
            .split_whitespace()
            .next()
            .ok_or_else(|| WidgetError::read("empty pseudo-file"))?;

        token
            .parse()
            .map_err(|_| WidgetError::read(format!("expected unsigned integer, got {:?}", token)))
    }

    /// Read an ordered run of `Label: <value> kB` lines against a schema.
    ///
    /// See [`labeled_kib_fields`] for the matching rules.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::Io`] if the file cannot be read, or the scan
    /// errors from [`labeled_kib_fields`].
    pub fn read_labeled_kib(path: &Path, schema: &[FieldSpec]) -> Result<Vec<u64>, WidgetError> {
        let content = fs::read_to_string(path)?;
        labeled_kib_fields(&content, schema)
    }

    /// Extract the kept values from an ordered run of `Label: <value> kB`
    /// lines.
    ///
    /// Every schema entry must match its line exactly: same label, same
    /// position, a parseable unsigned value. A missing line, a reordered
    /// label, or a malformed value fails the whole scan; lines after the
    /// schema is exhausted are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::Read`] describing the first mismatch.
    pub fn labeled_kib_fields(
        content: &str,
        schema: &[FieldSpec],
    ) -> Result<Vec<u64>, WidgetError> {
        let mut kept = Vec::with_capacity(schema.iter().filter(|f| f.keep).count());
        let mut lines = content.lines().filter(|l| !l.trim().is_empty());

        for spec in schema {
            let line = lines.next().ok_or_else(|| {
                WidgetError::read(format!("missing line for field {:?}", spec.label))
            })?;

            let mut tokens = line.split_whitespace();
            let label = tokens
                .next()
                .and_then(|t| t.strip_suffix(':'))
                .ok_or_else(|| WidgetError::read(format!("unlabeled line {:?}", line)))?;

            if label != spec.label {
                return Err(WidgetError::read(format!(
                    "expected field {:?}, got {:?}",
                    spec.label, label
                )));
            }

            let value: u64 = tokens
                .next()
                .and_then(|t| t.parse().ok())
                .ok_or_else(|| {
                    WidgetError::read(format!("non-numeric value for field {:?}", spec.label))
                })?;

            if spec.keep {
                kept.push(value);
            }
        }

        Ok(kept)
    }
}

/// Unit conversions for widget display values.
pub mod format {
    /// Convert kibibytes to gibibytes.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use barwidget_rs_core::format;
    ///
    /// assert_eq!(format::kib_to_gib(1_048_576), 1.0);
    /// assert_eq!(format::kib_to_gib(524_288), 0.5);
    /// ```
    #[must_use]
    pub fn kib_to_gib(kib: u64) -> f64 {
        kib as f64 / 1024.0 / 1024.0
    }

    /// Convert bytes to gibibytes.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use barwidget_rs_core::format;
    ///
    /// assert_eq!(format::bytes_to_gib(1_073_741_824), 1.0);
    /// ```
    #[must_use]
    pub fn bytes_to_gib(bytes: u64) -> f64 {
        bytes as f64 / 1024.0 / 1024.0 / 1024.0
    }
}

#[cfg(test)]
mod tests {
    use super::scan::{labeled_kib_fields, parse_u64, read_labeled_kib, read_u64, FieldSpec};
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn test_widget_output_builder() {
        let output = WidgetOutput::from_str("73%")
            .with_tooltip("Status: Discharging")
            .with_percentage(73);

        assert_eq!(output.text, "73%");
        assert_eq!(output.tooltip, Some("Status: Discharging".to_owned()));
        assert_eq!(output.percentage, Some(73));
    }

    #[test]
    #[should_panic(expected = "Percentage must be <= 100")]
    fn test_widget_output_invalid_percentage() {
        let _ = WidgetOutput::from_str("150%").with_percentage(150);
    }

    #[test]
    fn test_parse_u64() {
        assert_eq!(parse_u64("2400000\n").unwrap(), 2_400_000);
        assert_eq!(parse_u64("  42  ").unwrap(), 42);
        assert!(parse_u64("").is_err());
        assert!(parse_u64("abc\n").is_err());
        assert!(parse_u64("-5\n").is_err());
    }

    #[test]
    fn test_labeled_fields_in_order() {
        let content = "MemTotal:       16000000 kB\n\
                       MemFree:         1000000 kB\n\
                       Buffers:          200000 kB\n";
        let schema = [
            FieldSpec::keep("MemTotal"),
            FieldSpec::skip("MemFree"),
            FieldSpec::keep("Buffers"),
        ];

        let kept = labeled_kib_fields(content, &schema).unwrap();
        assert_eq!(kept, vec![16_000_000, 200_000]);
    }

    #[test]
    fn test_labeled_fields_wrong_order_fails() {
        let content = "MemFree:         1000000 kB\n\
                       MemTotal:       16000000 kB\n";
        let schema = [FieldSpec::keep("MemTotal"), FieldSpec::keep("MemFree")];

        assert!(labeled_kib_fields(content, &schema).is_err());
    }

    #[test]
    fn test_labeled_fields_short_file_fails() {
        let content = "MemTotal:       16000000 kB\n";
        let schema = [FieldSpec::keep("MemTotal"), FieldSpec::keep("MemFree")];

        assert!(labeled_kib_fields(content, &schema).is_err());
    }

    #[test]
    fn test_labeled_fields_bad_value_fails() {
        let content = "MemTotal:       lots kB\n";
        let schema = [FieldSpec::keep("MemTotal")];

        assert!(labeled_kib_fields(content, &schema).is_err());
    }

    #[test]
    fn test_labeled_fields_trailing_lines_ignored() {
        let content = "MemTotal:       16000000 kB\n\
                       HugePages_Total:       0\n";
        let schema = [FieldSpec::keep("MemTotal")];

        let kept = labeled_kib_fields(content, &schema).unwrap();
        assert_eq!(kept, vec![16_000_000]);
    }

    #[test]
    fn test_read_u64_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "2400000").unwrap();

        assert_eq!(read_u64(file.path()).unwrap(), 2_400_000);
    }

    #[test]
    fn test_read_u64_missing_file_is_io_error() {
        let err = read_u64(&PathBuf::from("/nonexistent/pseudo-file")).unwrap_err();
        assert!(matches!(err, WidgetError::Io(_)));
    }

    #[test]
    fn test_read_labeled_kib_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "MemTotal:       16000000 kB\n\
             MemFree:         1000000 kB\n"
        )
        .unwrap();
        let schema = [FieldSpec::keep("MemTotal"), FieldSpec::skip("MemFree")];

        assert_eq!(read_labeled_kib(file.path(), &schema).unwrap(), vec![16_000_000]);
    }

    #[test]
    fn test_read_labeled_kib_missing_file_is_io_error() {
        let schema = [FieldSpec::keep("MemTotal")];
        let err = read_labeled_kib(&PathBuf::from("/nonexistent/meminfo"), &schema).unwrap_err();
        assert!(matches!(err, WidgetError::Io(_)));
    }

    #[test]
    fn test_unit_conversions() {
        assert_eq!(format::kib_to_gib(1_048_576), 1.0);
        assert!((format::kib_to_gib(11_900_000) - 11.348).abs() < 0.001);
        assert_eq!(format::bytes_to_gib(2 * 1_073_741_824), 2.0);
    }

    #[test]
    fn test_widget_error_constructors() {
        assert!(matches!(
            WidgetError::read("short scan"),
            WidgetError::Read { .. }
        ));
        assert!(matches!(
            WidgetError::format("device name too long"),
            WidgetError::Format { .. }
        ));
        assert!(matches!(
            WidgetError::unavailable("no such zone"),
            WidgetError::Unavailable { .. }
        ));
    }
}
