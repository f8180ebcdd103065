//! Formatting utilities

use humansize::{DECIMAL, format_size};

/// Format a byte count in human-readable form
pub fn format_bytes(bytes: usize) -> String {
    format_size(bytes, DECIMAL)
}

/// Format how full a particle store is
pub fn format_fill(active: usize, capacity: usize) -> String {
    if capacity == 0 {
        "N/A".to_string()
    } else {
        format!("{:.1}%", active as f64 / capacity as f64 * 100.0)
    }
}

/// Format a byte range as `offset..end`
pub fn format_range(offset: usize, len: usize) -> String {
    if len == 0 {
        "-".to_string()
    } else {
        format!("{}..{}", offset, offset + len)
    }
}
