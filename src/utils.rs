//! Formatting helpers for log lines and run summaries.
//!
//! - [`format_count`] - Format counts with K/M suffix (1.5K, 2.3M)
//! - [`format_addresses`] - Format address counts with thousands separators

/// Format a count with K/M suffix for compact display.
///
/// # Examples
/// ```
/// use ccdroutes::utils::format_count;
/// assert_eq!(format_count(500), "500");
/// assert_eq!(format_count(1500), "1.5K");
/// assert_eq!(format_count(1_500_000), "1.5M");
/// ```
pub fn format_count(count: usize) -> String {
    if count >= 1_000_000 {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}K", count as f64 / 1_000.0)
    } else {
        count.to_string()
    }
}

/// Format an address count with thousands separators.
///
/// Takes `u128` so the size of large IPv6 covers stays exact.
///
/// # Examples
/// ```
/// use ccdroutes::utils::format_addresses;
/// assert_eq!(format_addresses(256), "256");
/// assert_eq!(format_addresses(16_777_216), "16,777,216");
/// ```
pub fn format_addresses(n: u128) -> String {
    let digits = n.to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}
