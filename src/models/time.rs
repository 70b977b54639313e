//! Timestamp formats
//!
//! Two formats are in use: a compact `MM-DD-YY-hhmm` + am/pm form for archive
//! filenames, and a long form with an explicit fixed time zone for
//! in-document entries. Entries render in UTC-8 labeled "PT".

use chrono::{DateTime, FixedOffset, TimeZone, Utc};

fn pacific() -> FixedOffset {
    // 8 hours west is always in range
    FixedOffset::west_opt(8 * 3600).unwrap()
}

/// Archive filename timestamp for a given instant, e.g. `03-04-25-0205pm`.
pub fn file_timestamp_at(instant: DateTime<Utc>) -> String {
    let local = pacific().from_utc_datetime(&instant.naive_utc());
    local.format("%m-%d-%y-%I%M%P").to_string()
}

/// Archive filename timestamp for now.
pub fn file_timestamp() -> String {
    file_timestamp_at(Utc::now())
}

/// In-document entry timestamp, e.g. `03/04/2025, 02:05:00 PM PT`.
pub fn entry_timestamp_at(instant: DateTime<Utc>) -> String {
    let local = pacific().from_utc_datetime(&instant.naive_utc());
    local.format("%m/%d/%Y, %I:%M:%S %p PT").to_string()
}

/// In-document entry timestamp for now.
pub fn entry_timestamp() -> String {
    entry_timestamp_at(Utc::now())
}
