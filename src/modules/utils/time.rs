use chrono::{DateTime, Local, TimeZone};

const RECORD_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Creation timestamp stored on patient and doctor records
pub fn record_timestamp() -> String {
    format_record_timestamp(&Local::now())
}

/// Format a point in time the way record timestamps are stored
pub fn format_record_timestamp<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format(RECORD_TIMESTAMP_FORMAT).to_string()
}
