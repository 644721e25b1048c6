pub mod export;
pub mod json;
pub mod table;

use chrono::{DateTime, FixedOffset, Local, Offset, Utc};

/// Offset of the local time zone right now.
pub fn local_offset() -> FixedOffset {
    Local::now().offset().fix()
}

/// Human-readable `YYYY-MM-DD HH:MM:SS` in the given offset.
pub fn format_timestamp(timestamp: DateTime<Utc>, offset: FixedOffset) -> String {
    timestamp
        .with_timezone(&offset)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
