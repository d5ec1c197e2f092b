use chrono::{DateTime, Local, Utc};

/// Renders a store timestamp as a local wall-clock time for list rows.
pub fn format_clock(moment: DateTime<Utc>) -> String {
    moment.with_timezone(&Local).format("%H:%M:%S").to_string()
}
