//! Civil time for the fixed UTC+9 (KST) calendar
//!
//! All "today" / "tomorrow" arithmetic happens here. Korea observes no
//! daylight saving, so a fixed offset is exact.

use chrono::{DateTime, Duration, NaiveTime, SecondsFormat, Utc};

/// Offset of the local calendar from UTC, in hours
pub const KST_OFFSET_HOURS: i64 = 9;

/// IANA zone name sent alongside created events
pub const KST_ZONE: &str = "Asia/Seoul";

fn offset() -> Duration {
    Duration::hours(KST_OFFSET_HOURS)
}

/// Local midnight of the KST day containing `now`, as a UTC instant
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    let local = now + offset();
    local.date_naive().and_time(NaiveTime::MIN).and_utc() - offset()
}

/// Half-open `[midnight, next midnight)` interval for the KST day
/// `day_offset` days after the one containing `now`
pub fn day_range(now: DateTime<Utc>, day_offset: i64) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = start_of_day(now) + Duration::days(day_offset);
    (start, start + Duration::days(1))
}

/// Instant for `hour:minute` local time, `day_offset` days after today
pub fn local_time_on(
    now: DateTime<Utc>,
    day_offset: i64,
    hour: u32,
    minute: u32,
) -> DateTime<Utc> {
    start_of_day(now)
        + Duration::days(day_offset)
        + Duration::hours(i64::from(hour))
        + Duration::minutes(i64::from(minute))
}

/// `YYYY-MM-DD HH:MM` in KST, truncated to the minute
pub fn pretty(instant: DateTime<Utc>) -> String {
    (instant + offset()).format("%Y-%m-%d %H:%M").to_string()
}

/// RFC3339 with millisecond precision and a `Z` suffix
pub fn to_api_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}
