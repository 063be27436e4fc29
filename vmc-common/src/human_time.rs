//! Human-readable clock formatting for media durations
//!
//! Durations up to one hour display as `mm:ss`; longer ones as `hh:mm:ss`.

/// Threshold above which the hour column is shown (seconds)
const HOUR_FORMAT_MIN: u64 = 3600;

/// Format a duration in seconds as `mm:ss`, or `hh:mm:ss` above one hour.
///
/// # Examples
///
/// ```
/// use vmc_common::human_time::format_clock;
///
/// assert_eq!(format_clock(0), "00:00");
/// assert_eq!(format_clock(330), "05:30");
/// assert_eq!(format_clock(3600), "60:00");
/// assert_eq!(format_clock(3661), "01:01:01");
/// ```
pub fn format_clock(seconds: u64) -> String {
    let hours = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if seconds > HOUR_FORMAT_MIN {
        format!("{:02}:{:02}:{:02}", hours, mins, secs)
    } else {
        // Minutes absorb the hour column when it is hidden
        format!("{:02}:{:02}", hours * 60 + mins, secs)
    }
}

/// Interpret a millisecond string (as stored in the Duration field) as a clock.
///
/// Returns `None` for anything that is not a non-negative integer, including
/// the `"null"` placeholder.
pub fn format_millis_str(value: &str) -> Option<String> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .map(|ms| format_clock(ms / 1000))
}
