use core::fmt::Display;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{
    DateTime, Local, TimeDelta, TimeZone,
    format::{Item, StrftimeItems},
};

/// Layout used when a caller passes an empty or malformed layout.
pub const DEFAULT_TIME_LAYOUT: &str = "%Y-%m-%d %H:%M:%S";

/// A trait for time sources that return wall-clock timestamps.
///
/// This abstraction allows you to plug in the real system clock or a mocked
/// time source in tests. All samples are relative to the Unix epoch.
///
/// # Example
///
/// ```
/// use tenant_id::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_millis(), 1234);
/// assert_eq!(time.current_nanos(), 1_234_000_000);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the Unix epoch.
    fn current_millis(&self) -> u64;

    /// Returns the current time in nanoseconds since the Unix epoch.
    ///
    /// Defaults to [`Self::current_millis`] scaled up, for sources that have
    /// no finer resolution.
    fn current_nanos(&self) -> u128 {
        u128::from(self.current_millis()) * 1_000_000
    }
}

/// Wall-clock time source backed by [`SystemTime`].
///
/// A clock set before the Unix epoch reads as zero rather than failing.
#[derive(Default, Clone, Copy, Debug)]
pub struct SystemClock;

impl SystemClock {
    fn since_epoch() -> core::time::Duration {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
    }
}

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        u64::try_from(Self::since_epoch().as_millis()).unwrap_or(u64::MAX)
    }

    fn current_nanos(&self) -> u128 {
        Self::since_epoch().as_nanos()
    }
}

/// Resolves a caller-provided `strftime` layout, falling back to
/// [`DEFAULT_TIME_LAYOUT`] when it is empty or contains an invalid specifier.
fn resolve_layout(layout: &str) -> &str {
    if layout.is_empty() || StrftimeItems::new(layout).any(|item| matches!(item, Item::Error)) {
        DEFAULT_TIME_LAYOUT
    } else {
        layout
    }
}

/// Formats "now" in the local time zone.
///
/// # Example
/// ```
/// let now = tenant_id::current_time("");
/// assert_eq!(now.len(), "2006-01-02 15:04:05".len());
/// ```
pub fn current_time(layout: &str) -> String {
    Local::now().format(resolve_layout(layout)).to_string()
}

/// Formats a Unix-millisecond sample in the local time zone.
///
/// Samples outside the range `chrono` can represent are rendered as the raw
/// millisecond count.
pub fn format_millis(millis: u64, layout: &str) -> String {
    i64::try_from(millis)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map_or_else(
            || millis.to_string(),
            |utc| {
                utc.with_timezone(&Local)
                    .format(resolve_layout(layout))
                    .to_string()
            },
        )
}

/// Formats `base + delta` with [`DEFAULT_TIME_LAYOUT`], in `base`'s zone.
///
/// `delta` may be negative. Returns `None` if the sum overflows the
/// representable date range.
///
/// # Example
/// ```
/// use chrono::{TimeDelta, TimeZone, Utc};
///
/// let base = Utc.with_ymd_and_hms(2023, 1, 1, 12, 0, 0).unwrap();
/// assert_eq!(
///     tenant_id::time_after(&base, TimeDelta::hours(1)).as_deref(),
///     Some("2023-01-01 13:00:00"),
/// );
/// ```
pub fn time_after<Tz>(base: &DateTime<Tz>, delta: TimeDelta) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    base.clone()
        .checked_add_signed(delta)
        .map(|at| at.format(DEFAULT_TIME_LAYOUT).to_string())
}
