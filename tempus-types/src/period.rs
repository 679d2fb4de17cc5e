use crate::error::{Result, TypesError};
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A bounded time interval with independent bound inclusivity.
///
/// A period whose bounds coincide must be closed on both sides, so every
/// valid period contains at least one timestamp.
///
/// # Examples
///
/// ```
/// use tempus_types::period::Period;
/// use tempus_types::time::Timestamp;
///
/// let a = Period::new(Timestamp::from_secs(0), Timestamp::from_secs(10), true, false)?;
/// let b = Period::new(Timestamp::from_secs(10), Timestamp::from_secs(20), true, true)?;
///
/// // [0, 10) and [10, 20] touch but do not share a timestamp
/// assert!(!a.overlaps(&b));
/// assert!(a.is_adjacent(&b));
/// # Ok::<(), tempus_types::error::TypesError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    lower: Timestamp,
    upper: Timestamp,
    lower_inc: bool,
    upper_inc: bool,
}

impl Period {
    pub fn new(lower: Timestamp, upper: Timestamp, lower_inc: bool, upper_inc: bool) -> Result<Self> {
        if lower > upper {
            return Err(TypesError::InvalidPeriod(format!(
                "lower bound {} must not be after upper bound {}",
                lower, upper
            )));
        }
        if lower == upper && !(lower_inc && upper_inc) {
            return Err(TypesError::InvalidPeriod(format!(
                "instantaneous period at {} must have inclusive bounds",
                lower
            )));
        }
        Ok(Self {
            lower,
            upper,
            lower_inc,
            upper_inc,
        })
    }

    /// Degenerate period `[t, t]`.
    pub fn instant(t: Timestamp) -> Self {
        Self {
            lower: t,
            upper: t,
            lower_inc: true,
            upper_inc: true,
        }
    }

    /// Closed period `[lower, upper]`.
    pub fn closed(lower: Timestamp, upper: Timestamp) -> Result<Self> {
        Self::new(lower, upper, true, true)
    }

    pub fn lower(&self) -> Timestamp {
        self.lower
    }

    pub fn upper(&self) -> Timestamp {
        self.upper
    }

    pub fn lower_inc(&self) -> bool {
        self.lower_inc
    }

    pub fn upper_inc(&self) -> bool {
        self.upper_inc
    }

    pub fn is_instant(&self) -> bool {
        self.lower == self.upper
    }

    /// Length of the period in microseconds.
    pub fn duration(&self) -> i64 {
        self.upper - self.lower
    }

    /// Same period with different inclusivity flags.
    pub fn with_bounds(&self, lower_inc: bool, upper_inc: bool) -> Result<Self> {
        Self::new(self.lower, self.upper, lower_inc, upper_inc)
    }

    pub fn shift(&self, micros: i64) -> Self {
        Self {
            lower: self.lower.shift(micros),
            upper: self.upper.shift(micros),
            ..*self
        }
    }

    pub fn contains_timestamp(&self, t: Timestamp) -> bool {
        let after_lower = self.lower < t || (self.lower == t && self.lower_inc);
        let before_upper = t < self.upper || (t == self.upper && self.upper_inc);
        after_lower && before_upper
    }

    /// Returns true if every timestamp of `other` is in `self`.
    pub fn contains_period(&self, other: &Period) -> bool {
        cmp_lower_bounds(self.lower, self.lower_inc, other.lower, other.lower_inc) != Ordering::Greater
            && cmp_upper_bounds(self.upper, self.upper_inc, other.upper, other.upper_inc)
                != Ordering::Less
    }

    /// Returns true if the periods share at least one timestamp.
    pub fn overlaps(&self, other: &Period) -> bool {
        starts_before_end(self.lower, self.lower_inc, other.upper, other.upper_inc)
            && starts_before_end(other.lower, other.lower_inc, self.upper, self.upper_inc)
    }

    /// Returns true if the periods touch at one bound without sharing it.
    pub fn is_adjacent(&self, other: &Period) -> bool {
        (self.upper == other.lower && self.upper_inc != other.lower_inc)
            || (other.upper == self.lower && other.upper_inc != self.lower_inc)
    }

    /// Every timestamp of `self` is before every timestamp of `other`.
    pub fn is_before(&self, other: &Period) -> bool {
        self.upper < other.lower
            || (self.upper == other.lower && !(self.upper_inc && other.lower_inc))
    }

    /// Every timestamp of `self` is after every timestamp of `other`.
    pub fn is_after(&self, other: &Period) -> bool {
        other.is_before(self)
    }

    pub fn intersection(&self, other: &Period) -> Option<Period> {
        if !self.overlaps(other) {
            return None;
        }
        let (lower, lower_inc) =
            match cmp_lower_bounds(self.lower, self.lower_inc, other.lower, other.lower_inc) {
                Ordering::Less => (other.lower, other.lower_inc),
                _ => (self.lower, self.lower_inc),
            };
        let (upper, upper_inc) =
            match cmp_upper_bounds(self.upper, self.upper_inc, other.upper, other.upper_inc) {
                Ordering::Greater => (other.upper, other.upper_inc),
                _ => (self.upper, self.upper_inc),
            };
        Period::new(lower, upper, lower_inc, upper_inc).ok()
    }

    /// Union of two periods that overlap or are adjacent, `None` otherwise.
    pub fn merge(&self, other: &Period) -> Option<Period> {
        if !self.overlaps(other) && !self.is_adjacent(other) {
            return None;
        }
        Some(self.span(other))
    }

    /// Smallest period covering both, ignoring any gap between them.
    pub fn span(&self, other: &Period) -> Period {
        let (lower, lower_inc) =
            match cmp_lower_bounds(self.lower, self.lower_inc, other.lower, other.lower_inc) {
                Ordering::Greater => (other.lower, other.lower_inc),
                _ => (self.lower, self.lower_inc),
            };
        let (upper, upper_inc) =
            match cmp_upper_bounds(self.upper, self.upper_inc, other.upper, other.upper_inc) {
                Ordering::Less => (other.upper, other.upper_inc),
                _ => (self.upper, self.upper_inc),
            };
        Period {
            lower,
            upper,
            lower_inc,
            upper_inc,
        }
    }

    /// Parts of `self` not covered by `other`: zero, one or two periods.
    pub fn minus(&self, other: &Period) -> Vec<Period> {
        let Some(inter) = self.intersection(other) else {
            return vec![*self];
        };
        let mut result = Vec::with_capacity(2);
        if let Ok(left) = Period::new(self.lower, inter.lower, self.lower_inc, !inter.lower_inc) {
            if cmp_lower_bounds(self.lower, self.lower_inc, inter.lower, inter.lower_inc)
                == Ordering::Less
            {
                result.push(left);
            }
        }
        if let Ok(right) = Period::new(inter.upper, self.upper, !inter.upper_inc, self.upper_inc) {
            if cmp_upper_bounds(self.upper, self.upper_inc, inter.upper, inter.upper_inc)
                == Ordering::Greater
            {
                result.push(right);
            }
        }
        result
    }
}

/// Order two lower bounds; at equal timestamps an inclusive bound starts first.
pub fn cmp_lower_bounds(t1: Timestamp, inc1: bool, t2: Timestamp, inc2: bool) -> Ordering {
    t1.cmp(&t2).then_with(|| inc2.cmp(&inc1))
}

/// Order two upper bounds; at equal timestamps an exclusive bound ends first.
pub fn cmp_upper_bounds(t1: Timestamp, inc1: bool, t2: Timestamp, inc2: bool) -> Ordering {
    t1.cmp(&t2).then_with(|| inc1.cmp(&inc2))
}

fn starts_before_end(lower: Timestamp, lower_inc: bool, upper: Timestamp, upper_inc: bool) -> bool {
    lower < upper || (lower == upper && lower_inc && upper_inc)
}

impl Ord for Period {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_lower_bounds(self.lower, self.lower_inc, other.lower, other.lower_inc).then_with(|| {
            cmp_upper_bounds(self.upper, self.upper_inc, other.upper, other.upper_inc)
        })
    }
}

impl PartialOrd for Period {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}, {}{}",
            if self.lower_inc { '[' } else { '(' },
            self.lower,
            self.upper,
            if self.upper_inc { ']' } else { ')' }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lower: i64, upper: i64, lower_inc: bool, upper_inc: bool) -> Period {
        Period::new(
            Timestamp::from_micros(lower),
            Timestamp::from_micros(upper),
            lower_inc,
            upper_inc,
        )
        .unwrap()
    }

    #[test]
    fn test_invalid_periods() {
        let t = Timestamp::from_micros;
        assert!(Period::new(t(10), t(5), true, true).is_err());
        assert!(Period::new(t(5), t(5), true, false).is_err());
        assert!(Period::new(t(5), t(5), true, true).is_ok());
    }

    #[test]
    fn test_shared_boundary_semantics() {
        let half_open = p(0, 10, true, false);
        let closed = p(0, 10, true, true);
        let next = p(10, 20, true, true);

        assert!(!half_open.overlaps(&next));
        assert!(half_open.is_adjacent(&next));
        assert!(half_open.is_before(&next));

        assert!(closed.overlaps(&next));
        assert!(!closed.is_adjacent(&next));
        assert!(!closed.is_before(&next));
    }

    #[test]
    fn test_contains() {
        let period = p(0, 10, false, true);
        assert!(!period.contains_timestamp(Timestamp::from_micros(0)));
        assert!(period.contains_timestamp(Timestamp::from_micros(10)));
        assert!(period.contains_period(&p(0, 10, false, false)));
        assert!(!period.contains_period(&p(0, 10, true, true)));
    }

    #[test]
    fn test_ordering() {
        assert!(p(0, 10, true, true) < p(0, 10, false, true));
        assert!(p(0, 10, true, false) < p(0, 10, true, true));
        assert!(p(0, 10, true, true) < p(0, 11, true, false));
        assert!(p(0, 10, true, true) < p(1, 2, true, true));
    }

    #[test]
    fn test_intersection() {
        let a = p(0, 10, true, false);
        let b = p(5, 15, false, true);
        assert_eq!(a.intersection(&b), Some(p(5, 10, false, false)));
        assert_eq!(p(0, 10, true, true).intersection(&p(10, 20, true, true)), Some(p(10, 10, true, true)));
        assert_eq!(a.intersection(&p(10, 20, true, true)), None);
    }

    #[test]
    fn test_merge() {
        assert_eq!(p(0, 10, true, false).merge(&p(10, 20, true, true)), Some(p(0, 20, true, true)));
        assert_eq!(p(0, 10, true, false).merge(&p(10, 20, false, true)), None);
        assert_eq!(p(0, 10, true, true).merge(&p(5, 8, true, true)), Some(p(0, 10, true, true)));
    }

    #[test]
    fn test_minus() {
        let whole = p(0, 10, true, true);
        assert_eq!(whole.minus(&p(3, 5, true, false)), vec![p(0, 3, true, false), p(5, 10, true, true)]);
        assert_eq!(whole.minus(&p(0, 10, false, false)), vec![p(0, 0, true, true), p(10, 10, true, true)]);
        assert_eq!(whole.minus(&p(-5, 20, true, true)), Vec::<Period>::new());
        assert_eq!(whole.minus(&p(20, 30, true, true)), vec![whole]);
    }

    #[test]
    fn test_serde_round_trip() {
        let period = p(5, 10, false, true);
        let json = serde_json::to_string(&period).unwrap();
        let back: Period = serde_json::from_str(&json).unwrap();
        assert_eq!(back, period);
    }

    #[test]
    fn test_display() {
        assert_eq!(p(1, 2, false, true).to_string(), "(1, 2]");
    }
}
