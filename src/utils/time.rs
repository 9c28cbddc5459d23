//! Time and timestamp utilities

use chrono::Local;

/// Timestamp precision used when stamping a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    /// `2024-01-31 13:45:07`
    Seconds,
    /// `2024-01-31 13:45:07.123456`
    Micros,
}

impl Precision {
    /// strftime pattern for this precision
    pub fn pattern(self) -> &'static str {
        match self {
            Precision::Seconds => "%Y-%m-%d %H:%M:%S",
            Precision::Micros => "%Y-%m-%d %H:%M:%S%.6f",
        }
    }
}

/// Format the current local wall-clock time
pub fn format_timestamp(precision: Precision) -> String {
    Local::now().format(precision.pattern()).to_string()
}
