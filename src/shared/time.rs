use chrono::{DateTime, Duration, Utc};

/// `now` minus `days`. A window too large for the calendar saturates at the
/// earliest representable instant instead of overflowing.
pub fn days_before(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    Duration::try_days(days)
        .and_then(|window| now.checked_sub_signed(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
