//! Restock Schedules
//!
//! Rules for expected-restock dates: they must lie in the future when set, they expire once
//! passed, and an order's expected fulfilment date is the latest date among its lines.

use jiff::Timestamp;
use thiserror::Error;

/// Errors raised when setting an expected restock date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// The date is not strictly after the current time.
    #[error("expected restock date {date} must be in the future")]
    NotInFuture {
        /// The rejected date.
        date: Timestamp,
    },
}

/// Accept `date` only if it lies strictly after `now`.
///
/// # Errors
///
/// Returns [`ScheduleError::NotInFuture`] otherwise.
pub fn validate_expected_date(date: Timestamp, now: Timestamp) -> Result<Timestamp, ScheduleError> {
    if date > now {
        Ok(date)
    } else {
        Err(ScheduleError::NotInFuture { date })
    }
}

/// Whether an expected date has passed.
#[must_use]
pub fn is_expired(expected: Timestamp, now: Timestamp) -> bool {
    expected < now
}

/// The note recorded when `expected` passes without a restock.
#[must_use]
pub fn expiry_note(expected: Timestamp) -> String {
    format!(
        "Expected restock date {} passed without a restock",
        expected.strftime("%Y-%m-%d")
    )
}

/// Append `note` to existing notes, one per line.
#[must_use]
pub fn append_note(existing: Option<&str>, note: &str) -> String {
    match existing.map(str::trim_end) {
        Some(existing) if !existing.is_empty() => format!("{existing}\n{note}"),
        _ => note.to_string(),
    }
}

/// The latest of `dates`, or `None` if there are none or any of them is unknown.
#[must_use]
pub fn latest_expected<I>(dates: I) -> Option<Timestamp>
where
    I: IntoIterator<Item = Option<Timestamp>>,
{
    let mut latest: Option<Timestamp> = None;

    for date in dates {
        let date = date?;

        latest = Some(latest.map_or(date, |current| current.max(date)));
    }

    latest
}
