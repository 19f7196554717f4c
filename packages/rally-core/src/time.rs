// Message ids are derived from `now_timestamp_millis`, and freshly sent
// messages carry a local `hh:mm AM/PM` display timestamp.

use chrono::{DateTime, Local, TimeZone};

/// Returns the current Unix timestamp in milliseconds.
pub fn now_timestamp_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Display timestamp for a message sent right now.
pub fn display_time_now() -> String {
    display_time(&Local::now())
}

/// Formats a time of day the way the chat bubbles show it, e.g. `09:05 AM`.
pub fn display_time<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format("%I:%M %p").to_string()
}
