use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A point in time, stored as microseconds since the Unix epoch.
///
/// Microsecond resolution matches the host `timestamptz` representation, so
/// values exchanged with the host never lose precision.
///
/// # Examples
///
/// ```
/// use tempus_types::time::Timestamp;
/// use std::time::{Duration, UNIX_EPOCH};
///
/// let t = Timestamp::from_system_time(UNIX_EPOCH + Duration::from_secs(60));
/// assert_eq!(t, Timestamp::from_secs(60));
/// assert_eq!(t.as_micros(), 60_000_000);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Lowest representable timestamp, used as "minus infinity" in boxes.
    pub const MIN: Timestamp = Timestamp(i64::MIN);
    /// Highest representable timestamp, used as "plus infinity" in boxes.
    pub const MAX: Timestamp = Timestamp(i64::MAX);

    pub const fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    pub const fn from_millis(millis: i64) -> Self {
        Self(millis * 1_000)
    }

    pub const fn from_secs(secs: i64) -> Self {
        Self(secs * 1_000_000)
    }

    pub const fn as_micros(self) -> i64 {
        self.0
    }

    /// Convert from a `SystemTime`, saturating outside the i64 microsecond range.
    pub fn from_system_time(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(after) => Self(i64::try_from(after.as_micros()).unwrap_or(i64::MAX)),
            Err(before) => Self(
                i64::try_from(before.duration().as_micros())
                    .map(|m| -m)
                    .unwrap_or(i64::MIN),
            ),
        }
    }

    pub fn to_system_time(self) -> SystemTime {
        if self.0 >= 0 {
            UNIX_EPOCH + Duration::from_micros(self.0 as u64)
        } else {
            UNIX_EPOCH - Duration::from_micros(self.0.unsigned_abs())
        }
    }

    /// Shift by a signed number of microseconds, saturating at the bounds.
    pub fn shift(self, micros: i64) -> Self {
        Self(self.0.saturating_add(micros))
    }

    /// Signed distance `self - other` in microseconds.
    pub fn delta(self, other: Timestamp) -> i64 {
        self.0.saturating_sub(other.0)
    }

    /// Distance `self - other` as a float, exact in sign and magnitude even
    /// when it does not fit in an `i64`.
    pub fn delta_f64(self, other: Timestamp) -> f64 {
        (i128::from(self.0) - i128::from(other.0)) as f64
    }

    /// Linear position between `start` and `end`; `ratio` is clamped to `[0, 1]`.
    pub fn lerp(start: Timestamp, end: Timestamp, ratio: f64) -> Self {
        let ratio = ratio.clamp(0.0, 1.0);
        let span = i128::from(end.0) - i128::from(start.0);
        let offset = (span as f64 * ratio).round() as i128;
        let micros = (i128::from(start.0) + offset).clamp(i128::from(i64::MIN), i128::from(i64::MAX));
        Self(micros as i64)
    }
}

impl From<SystemTime> for Timestamp {
    fn from(time: SystemTime) -> Self {
        Self::from_system_time(time)
    }
}

impl From<Timestamp> for SystemTime {
    fn from(t: Timestamp) -> Self {
        t.to_system_time()
    }
}

impl Add<i64> for Timestamp {
    type Output = Timestamp;

    fn add(self, micros: i64) -> Timestamp {
        self.shift(micros)
    }
}

impl Sub<Timestamp> for Timestamp {
    type Output = i64;

    fn sub(self, other: Timestamp) -> i64 {
        self.delta(other)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_time_round_trip() {
        let time = UNIX_EPOCH + Duration::from_micros(1_640_995_200_123_456);
        let t = Timestamp::from_system_time(time);
        assert_eq!(t.as_micros(), 1_640_995_200_123_456);
        assert_eq!(t.to_system_time(), time);
    }

    #[test]
    fn test_before_epoch() {
        let time = UNIX_EPOCH - Duration::from_secs(10);
        let t = Timestamp::from(time);
        assert_eq!(t, Timestamp::from_secs(-10));
        assert_eq!(SystemTime::from(t), time);
    }

    #[test]
    fn test_lerp() {
        let a = Timestamp::from_micros(0);
        let b = Timestamp::from_micros(100);
        assert_eq!(Timestamp::lerp(a, b, 0.25), Timestamp::from_micros(25));
        assert_eq!(Timestamp::lerp(a, b, 2.0), b);
    }

    #[test]
    fn test_lerp_wide_span() {
        let a = Timestamp::from_micros(-5_000_000_000_000_000_000);
        let b = Timestamp::from_micros(5_000_000_000_000_000_000);
        assert_eq!(Timestamp::lerp(a, b, 0.5), Timestamp::from_micros(0));
        assert_eq!(Timestamp::lerp(Timestamp::MIN, Timestamp::MAX, 1.0), Timestamp::MAX);
        assert_eq!(Timestamp::lerp(Timestamp::MIN, Timestamp::MAX, 0.0), Timestamp::MIN);
        assert_eq!(b.delta_f64(a), 1e19);
        assert_eq!(b - a, i64::MAX);
    }

    #[test]
    fn test_shift_saturates() {
        assert_eq!(Timestamp::MAX.shift(1), Timestamp::MAX);
        assert_eq!(Timestamp::from_micros(5) - Timestamp::from_micros(2), 3);
    }
}
