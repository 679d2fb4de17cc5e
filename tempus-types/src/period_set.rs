use crate::error::{Result, TypesError};
use crate::period::Period;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An ordered set of disjoint periods.
///
/// Consecutive periods never overlap; a normalized set additionally never
/// holds two adjacent periods, so every period set has one canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeriodSet {
    periods: Vec<Period>,
}

impl PeriodSet {
    /// Build a period set.
    ///
    /// With `normalize` the input is sorted and overlapping or adjacent periods
    /// are merged. Without it the input must already be ordered and disjoint.
    pub fn new(mut periods: Vec<Period>, normalize: bool) -> Result<Self> {
        if periods.is_empty() {
            return Err(TypesError::InvalidPeriodSet(
                "a period set must contain at least one period".to_string(),
            ));
        }
        if normalize {
            periods.sort();
            let mut merged: Vec<Period> = Vec::with_capacity(periods.len());
            for period in periods {
                match merged.last_mut() {
                    Some(last) => match last.merge(&period) {
                        Some(union) => *last = union,
                        None => merged.push(period),
                    },
                    None => merged.push(period),
                }
            }
            return Ok(Self { periods: merged });
        }
        for pair in periods.windows(2) {
            if !pair[0].is_before(&pair[1]) {
                return Err(TypesError::InvalidPeriodSet(format!(
                    "periods {} and {} are not ordered and disjoint",
                    pair[0], pair[1]
                )));
            }
        }
        Ok(Self { periods })
    }

    /// Build from periods already in time order, merging the ones that touch.
    pub fn from_ordered(first: Period, rest: impl IntoIterator<Item = Period>) -> Self {
        let mut periods = vec![first];
        for period in rest {
            let last = periods.len() - 1;
            match periods[last].merge(&period) {
                Some(union) => periods[last] = union,
                None => periods.push(period),
            }
        }
        Self { periods }
    }

    pub fn from_period(period: Period) -> Self {
        Self {
            periods: vec![period],
        }
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    pub fn count(&self) -> usize {
        self.periods.len()
    }

    pub fn period_n(&self, n: usize) -> Option<&Period> {
        self.periods.get(n)
    }

    pub fn start_timestamp(&self) -> Timestamp {
        self.periods[0].lower()
    }

    pub fn end_timestamp(&self) -> Timestamp {
        self.periods[self.periods.len() - 1].upper()
    }

    /// Bounding period of the set, gaps included.
    pub fn timespan(&self) -> Period {
        let first = &self.periods[0];
        let last = &self.periods[self.periods.len() - 1];
        first.span(last)
    }

    /// Sum of the period durations in microseconds, saturating.
    pub fn duration(&self) -> i64 {
        self.periods
            .iter()
            .fold(0i64, |total, p| total.saturating_add(p.duration()))
    }

    /// Binary search; see `find_timestamp_in` for the meaning of the result.
    pub fn find_timestamp(&self, t: Timestamp) -> (bool, usize) {
        find_timestamp_in(&self.periods, t)
    }

    pub fn contains_timestamp(&self, t: Timestamp) -> bool {
        self.find_timestamp(t).0
    }

    pub fn overlaps_period(&self, period: &Period) -> bool {
        let (_, start) = self.find_timestamp(period.lower());
        // The period before the gap may still reach into `period`
        let from = start.saturating_sub(1);
        for candidate in &self.periods[from..] {
            if candidate.overlaps(period) {
                return true;
            }
            if period.is_before(candidate) {
                break;
            }
        }
        false
    }

    pub fn shift(&self, micros: i64) -> Self {
        Self {
            periods: self.periods.iter().map(|p| p.shift(micros)).collect(),
        }
    }

    /// Remove `period` from the set; `None` when nothing remains.
    pub fn minus_period(&self, period: &Period) -> Option<PeriodSet> {
        let mut result = Vec::with_capacity(self.periods.len() + 1);
        for current in &self.periods {
            result.extend(current.minus(period));
        }
        if result.is_empty() {
            None
        } else {
            Some(Self { periods: result })
        }
    }

    /// Remove every period of `other` from the set; `None` when nothing remains.
    pub fn minus_period_set(&self, other: &PeriodSet) -> Option<PeriodSet> {
        let mut result = Vec::with_capacity(self.periods.len() + other.periods.len());
        let mut j = 0;
        for current in &self.periods {
            // Skip subtrahends that end before the current period starts
            while j < other.periods.len() && other.periods[j].is_before(current) {
                j += 1;
            }
            let mut pieces = vec![*current];
            let mut k = j;
            while k < other.periods.len() && !current.is_before(&other.periods[k]) {
                pieces = pieces
                    .into_iter()
                    .flat_map(|piece| piece.minus(&other.periods[k]))
                    .collect();
                k += 1;
            }
            result.extend(pieces);
        }
        if result.is_empty() {
            None
        } else {
            Some(Self { periods: result })
        }
    }

    /// Timestamps covered by both sets; `None` when disjoint.
    pub fn intersection(&self, other: &PeriodSet) -> Option<PeriodSet> {
        let mut result = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.periods.len() && j < other.periods.len() {
            let a = &self.periods[i];
            let b = &other.periods[j];
            if let Some(inter) = a.intersection(b) {
                result.push(inter);
            }
            match crate::period::cmp_upper_bounds(a.upper(), a.upper_inc(), b.upper(), b.upper_inc())
            {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
            }
        }
        if result.is_empty() {
            None
        } else {
            Some(Self { periods: result })
        }
    }
}

/// Binary search of `t` over ordered, disjoint periods.
///
/// Returns `(true, i)` if period `i` contains `t`. Otherwise returns
/// `(false, gap)` where every period before `gap` ends before `t` and every
/// period from `gap` on starts after it.
pub fn find_timestamp_in(periods: &[Period], t: Timestamp) -> (bool, usize) {
    let mut first = 0usize;
    let mut last = periods.len();
    while first < last {
        let middle = first + (last - first) / 2;
        let period = &periods[middle];
        if period.contains_timestamp(t) {
            return (true, middle);
        }
        if t <= period.lower() {
            last = middle;
        } else {
            first = middle + 1;
        }
    }
    (false, first)
}

impl From<Period> for PeriodSet {
    fn from(period: Period) -> Self {
        Self::from_period(period)
    }
}

impl fmt::Display for PeriodSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, period) in self.periods.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", period)?;
        }
        write!(f, "}}")
    }
}
