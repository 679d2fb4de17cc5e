use crate::error::{Result, TypesError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A bounded range of numeric values with independent bound inclusivity.
///
/// Integer ranges are kept in the canonical `[lower, upper)` form produced by
/// [`ValueRange::canonical_int`], so an integer value `v` is contained exactly
/// when the float image of `v` is.
///
/// # Examples
///
/// ```
/// use tempus_types::range::ValueRange;
///
/// let r = ValueRange::new(1.0, 5.0, true, false)?;
/// assert!(r.contains_value(1.0));
/// assert!(!r.contains_value(5.0));
/// assert!(r.adjacent_to(5.0));
///
/// // [1, 4] over integers is stored as [1, 5)
/// let ints = ValueRange::canonical_int(1, 4, true, true)?;
/// assert_eq!(ints, ValueRange::new(1.0, 5.0, true, false)?);
/// # Ok::<(), tempus_types::error::TypesError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    lower: f64,
    upper: f64,
    lower_inc: bool,
    upper_inc: bool,
}

impl ValueRange {
    pub fn new(lower: f64, upper: f64, lower_inc: bool, upper_inc: bool) -> Result<Self> {
        if !lower.is_finite() || !upper.is_finite() {
            return Err(TypesError::InvalidRange(format!(
                "bounds must be finite, got {} and {}",
                lower, upper
            )));
        }
        if lower > upper {
            return Err(TypesError::InvalidRange(format!(
                "lower bound {} must not exceed upper bound {}",
                lower, upper
            )));
        }
        if lower == upper && !(lower_inc && upper_inc) {
            return Err(TypesError::InvalidRange(format!(
                "range collapsed on {} must have inclusive bounds",
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

    pub fn closed(lower: f64, upper: f64) -> Result<Self> {
        Self::new(lower, upper, true, true)
    }

    /// Integer range in canonical form: inclusive lower, exclusive upper.
    pub fn canonical_int(lower: i32, upper: i32, lower_inc: bool, upper_inc: bool) -> Result<Self> {
        let lower = if lower_inc { lower as i64 } else { lower as i64 + 1 };
        let upper = if upper_inc { upper as i64 + 1 } else { upper as i64 };
        if lower >= upper {
            return Err(TypesError::InvalidRange(format!(
                "integer range [{}, {}) is empty",
                lower, upper
            )));
        }
        Self::new(lower as f64, upper as f64, true, false)
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn lower_inc(&self) -> bool {
        self.lower_inc
    }

    pub fn upper_inc(&self) -> bool {
        self.upper_inc
    }

    pub fn contains_value(&self, value: f64) -> bool {
        let above = self.lower < value || (self.lower == value && self.lower_inc);
        let below = value < self.upper || (value == self.upper && self.upper_inc);
        above && below
    }

    pub fn overlaps(&self, other: &ValueRange) -> bool {
        let starts_before = |l: f64, li: bool, u: f64, ui: bool| l < u || (l == u && li && ui);
        starts_before(self.lower, self.lower_inc, other.upper, other.upper_inc)
            && starts_before(other.lower, other.lower_inc, self.upper, self.upper_inc)
    }

    pub fn is_adjacent(&self, other: &ValueRange) -> bool {
        (self.upper == other.lower && self.upper_inc != other.lower_inc)
            || (other.upper == self.lower && other.upper_inc != self.lower_inc)
    }

    /// Union of two ranges; fails unless they overlap or touch.
    pub fn union(&self, other: &ValueRange) -> Result<ValueRange> {
        if !self.overlaps(other) && !self.is_adjacent(other) {
            return Err(TypesError::NonContiguousUnion);
        }
        let (lower, lower_inc) = match cmp_lower(self, other) {
            Ordering::Greater => (other.lower, other.lower_inc),
            _ => (self.lower, self.lower_inc),
        };
        let (upper, upper_inc) = match cmp_upper(self, other) {
            Ordering::Less => (other.upper, other.upper_inc),
            _ => (self.upper, self.upper_inc),
        };
        Ok(ValueRange {
            lower,
            upper,
            lower_inc,
            upper_inc,
        })
    }

    /// Sort ranges and merge the ones that overlap or touch.
    pub fn normalize(mut ranges: Vec<ValueRange>) -> Vec<ValueRange> {
        ranges.sort_by(|a, b| a.total_cmp(b));
        let mut result: Vec<ValueRange> = Vec::with_capacity(ranges.len());
        for range in ranges {
            match result.last_mut() {
                Some(last) => match last.union(&range) {
                    Ok(merged) => *last = merged,
                    Err(_) => result.push(range),
                },
                None => result.push(range),
            }
        }
        result
    }

    /// Order by lower bound (inclusive first), then by upper bound.
    pub fn total_cmp(&self, other: &ValueRange) -> Ordering {
        cmp_lower(self, other).then_with(|| cmp_upper(self, other))
    }

    /// The range is strictly to the left of `value`.
    pub fn left_of(&self, value: f64) -> bool {
        self.upper < value || (self.upper == value && !self.upper_inc)
    }

    /// The range does not extend to the right of `value`.
    pub fn overleft_of(&self, value: f64) -> bool {
        self.upper <= value
    }

    /// The range is strictly to the right of `value`.
    pub fn right_of(&self, value: f64) -> bool {
        self.lower > value || (self.lower == value && !self.lower_inc)
    }

    /// The range does not extend to the left of `value`.
    pub fn overright_of(&self, value: f64) -> bool {
        self.lower >= value
    }

    /// `value` sits on an exclusive bound of the range.
    pub fn adjacent_to(&self, value: f64) -> bool {
        (self.upper == value && !self.upper_inc) || (self.lower == value && !self.lower_inc)
    }

    /// `value` does not extend to the right of the range.
    pub fn element_overleft(&self, value: f64) -> bool {
        value <= self.upper
    }

    /// `value` does not extend to the left of the range.
    pub fn element_overright(&self, value: f64) -> bool {
        value >= self.lower
    }
}

fn cmp_lower(a: &ValueRange, b: &ValueRange) -> Ordering {
    a.lower
        .total_cmp(&b.lower)
        .then_with(|| b.lower_inc.cmp(&a.lower_inc))
}

fn cmp_upper(a: &ValueRange, b: &ValueRange) -> Ordering {
    a.upper
        .total_cmp(&b.upper)
        .then_with(|| a.upper_inc.cmp(&b.upper_inc))
}

impl fmt::Display for ValueRange {
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

    fn r(lower: f64, upper: f64, lower_inc: bool, upper_inc: bool) -> ValueRange {
        ValueRange::new(lower, upper, lower_inc, upper_inc).unwrap()
    }

    #[test]
    fn test_validation() {
        assert!(ValueRange::new(2.0, 1.0, true, true).is_err());
        assert!(ValueRange::new(1.0, 1.0, true, false).is_err());
        assert!(ValueRange::new(f64::NAN, 1.0, true, true).is_err());
        assert!(ValueRange::canonical_int(3, 3, true, false).is_err());
        assert_eq!(
            ValueRange::canonical_int(0, 3, false, false).unwrap(),
            r(1.0, 3.0, true, false)
        );
    }

    #[test]
    fn test_union_strict() {
        let a = r(0.0, 5.0, true, false);
        let b = r(5.0, 8.0, true, true);
        assert_eq!(a.union(&b).unwrap(), r(0.0, 8.0, true, true));
        let c = r(6.0, 8.0, true, true);
        assert_eq!(a.union(&c), Err(TypesError::NonContiguousUnion));
    }

    #[test]
    fn test_normalize() {
        let ranges = vec![
            r(10.0, 12.0, true, true),
            r(0.0, 2.0, true, false),
            r(2.0, 3.0, true, true),
            r(1.0, 1.5, true, true),
        ];
        let normalized = ValueRange::normalize(ranges);
        assert_eq!(normalized, vec![r(0.0, 3.0, true, true), r(10.0, 12.0, true, true)]);
    }

    #[test]
    fn test_element_predicates() {
        let range = r(1.0, 5.0, false, false);
        assert!(range.left_of(5.0));
        assert!(range.left_of(6.0));
        assert!(!range.left_of(4.0));
        assert!(range.overleft_of(5.0));
        assert!(range.right_of(1.0));
        assert!(range.overright_of(1.0));
        assert!(range.adjacent_to(1.0));
        assert!(range.adjacent_to(5.0));
        assert!(!range.adjacent_to(3.0));
        assert!(range.element_overleft(5.0));
        assert!(!range.element_overright(0.5));

        let closed = r(1.0, 5.0, true, true);
        assert!(!closed.left_of(5.0));
        assert!(!closed.adjacent_to(5.0));
    }
}
