//! Human-readable duration formatting.
//!
//! Pure conversion from accumulated seconds to display units. Negative
//! input clamps to zero; there are no other failure modes.

/// Seconds split into display units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationParts {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl DurationParts {
    pub fn from_seconds(total_seconds: i64) -> Self {
        let total = total_seconds.max(0) as u64;
        Self {
            hours: total / 3600,
            minutes: (total % 3600) / 60,
            seconds: total % 60,
        }
    }
}

/// `"2h 5m 9s"` form, dropping leading zero units (`"45m 2s"`, `"9s"`).
pub fn format_duration(total_seconds: i64) -> String {
    let parts = DurationParts::from_seconds(total_seconds);
    if parts.hours > 0 {
        format!("{}h {}m {}s", parts.hours, parts.minutes, parts.seconds)
    } else if parts.minutes > 0 {
        format!("{}m {}s", parts.minutes, parts.seconds)
    } else {
        format!("{}s", parts.seconds)
    }
}

/// Whole-minute form used by compact goal displays.
pub fn format_minutes(total_seconds: i64) -> String {
    (total_seconds.max(0) / 60).to_string()
}
