//! Restriction of sequence sets to values and to time.
//!
//! Every `at_*` operation has a `minus_*` counterpart. The complement is
//! taken in time: the periods the `at_*` result covers are removed from the
//! set's own periods, and the set is restricted to what remains.

use super::TSequenceSet;
use crate::temporal::instant::TInstant;
use crate::temporal::instant_set::TInstantSet;
use crate::temporal::sequence::{Fragments, TSequence};
use crate::value::{TemporalNumber, TemporalValue};
use std::cmp::Ordering;
use tempus_types::period::{Period, cmp_upper_bounds};
use tempus_types::period_set::PeriodSet;
use tempus_types::range::ValueRange;
use tempus_types::time::Timestamp;
use tempus_types::timestamp_set::TimestampSet;

impl<V: TemporalValue> TSequenceSet<V> {
    fn restrict_each(&self, restrict: impl Fn(&TSequence<V>) -> Fragments<V>) -> Option<Self> {
        let fragments: Vec<TSequence<V>> =
            self.sequences.iter().flat_map(|s| restrict(s)).collect();
        Self::from_fragments(fragments)
    }

    /// Complement of an `at_*` result within the set.
    fn minus_restriction(&self, at: Option<Self>) -> Option<Self> {
        let Some(at) = at else {
            return Some(self.clone());
        };
        let remaining = self.time().minus_period_set(&at.time())?;
        self.at_period_set(&remaining)
    }

    pub fn at_value(&self, value: &V) -> Option<Self> {
        if !V::box_may_contain(&self.bbox, value) {
            return None;
        }
        self.restrict_each(|s| s.at_value(value))
    }

    pub fn minus_value(&self, value: &V) -> Option<Self> {
        self.minus_restriction(self.at_value(value))
    }

    pub fn at_values(&self, values: &[V]) -> Option<Self> {
        self.restrict_each(|s| s.at_values(values))
    }

    pub fn minus_values(&self, values: &[V]) -> Option<Self> {
        self.minus_restriction(self.at_values(values))
    }

    /// Restrict to the minimum value, including where it is only approached
    /// at an excluded endpoint.
    pub fn at_min(&self) -> Option<Self> {
        let min = self.min_value();
        self.at_extremum(&min)
    }

    /// Removes the instants holding the minimum value. Unlike [`Self::at_min`],
    /// an infimum reached only at an open bound is not removed.
    pub fn minus_min(&self) -> Option<Self> {
        self.minus_value(&self.min_value())
    }

    pub fn at_max(&self) -> Option<Self> {
        let max = self.max_value();
        self.at_extremum(&max)
    }

    pub fn minus_max(&self) -> Option<Self> {
        self.minus_value(&self.max_value())
    }

    fn at_extremum(&self, value: &V) -> Option<Self> {
        self.restrict_each(|s| s.with_closed_bounds().at_value(value))
    }

    pub fn value_at_timestamp(&self, t: Timestamp) -> Option<V> {
        let (found, idx) = self.find_timestamp(t);
        if !found {
            return None;
        }
        self.sequences[idx].value_at_timestamp(t)
    }

    pub fn at_timestamp(&self, t: Timestamp) -> Option<TInstant<V>> {
        self.value_at_timestamp(t).map(|value| TInstant::new(value, t))
    }

    pub fn minus_timestamp(&self, t: Timestamp) -> Option<Self> {
        if !self.intersects_timestamp(t) {
            return Some(self.clone());
        }
        let remaining = self.time().minus_period(&Period::instant(t))?;
        self.at_period_set(&remaining)
    }

    /// Instants at the given timestamps the set is defined on.
    pub fn at_timestamp_set(&self, timestamps: &TimestampSet) -> Option<TInstantSet<V>> {
        if !self.timespan().overlaps(&timestamps.timespan()) {
            return None;
        }
        let mut instants = Vec::new();
        let mut from = 0;
        for &t in timestamps.times() {
            let (found, idx) = self.find_timestamp_from(from, t);
            if idx >= self.sequences.len() {
                break;
            }
            from = idx;
            if found {
                instants.extend(self.sequences[idx].at_timestamp(t));
            }
        }
        TInstantSet::new(instants).ok()
    }

    pub fn minus_timestamp_set(&self, timestamps: &TimestampSet) -> Option<Self> {
        if !self.intersects_timestamp_set(timestamps) {
            return Some(self.clone());
        }
        let times = timestamps.times();
        let excluded = PeriodSet::from_ordered(
            Period::instant(times[0]),
            times[1..].iter().map(|&t| Period::instant(t)),
        );
        let remaining = self.time().minus_period_set(&excluded)?;
        self.at_period_set(&remaining)
    }

    pub fn at_period(&self, period: &Period) -> Option<Self> {
        if !self.timespan().overlaps(period) {
            return None;
        }
        let (_, start) = self.find_timestamp(period.lower());
        let mut fragments = Vec::new();
        for seq in &self.sequences[start..] {
            if period.is_before(seq.period()) {
                break;
            }
            if period.contains_period(seq.period()) {
                fragments.push(seq.clone());
            } else if let Some(cut) = seq.at_period(period) {
                fragments.push(cut);
            }
        }
        Self::from_fragments(fragments)
    }

    pub fn minus_period(&self, period: &Period) -> Option<Self> {
        if !self.timespan().overlaps(period) {
            return Some(self.clone());
        }
        let remaining = self.time().minus_period(period)?;
        self.at_period_set(&remaining)
    }

    /// Merge walk over the sequences and the periods.
    pub fn at_period_set(&self, periods: &PeriodSet) -> Option<Self> {
        if !self.timespan().overlaps(&periods.timespan()) {
            return None;
        }
        let periods = periods.periods();
        let mut fragments = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.sequences.len() && j < periods.len() {
            let seq = &self.sequences[i];
            let period = &periods[j];
            if period.contains_period(seq.period()) {
                fragments.push(seq.clone());
            } else if let Some(cut) = seq.at_period(period) {
                fragments.push(cut);
            }
            match cmp_upper_bounds(
                seq.end_timestamp(),
                seq.upper_inc(),
                period.upper(),
                period.upper_inc(),
            ) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
            }
        }
        Self::from_fragments(fragments)
    }

    pub fn minus_period_set(&self, periods: &PeriodSet) -> Option<Self> {
        if !self.timespan().overlaps(&periods.timespan()) {
            return Some(self.clone());
        }
        let remaining = self.time().minus_period_set(periods)?;
        self.at_period_set(&remaining)
    }
}

impl<V: TemporalNumber> TSequenceSet<V> {
    pub fn at_range(&self, range: &ValueRange) -> Option<Self> {
        let (lo, hi) = V::box_value_extent(&self.bbox)?;
        if range.upper() < lo || range.lower() > hi {
            return None;
        }
        self.restrict_each(|s| s.at_range(range))
    }

    pub fn minus_range(&self, range: &ValueRange) -> Option<Self> {
        self.minus_restriction(self.at_range(range))
    }

    pub fn at_ranges(&self, ranges: &[ValueRange]) -> Option<Self> {
        self.restrict_each(|s| s.at_ranges(ranges))
    }

    pub fn minus_ranges(&self, ranges: &[ValueRange]) -> Option<Self> {
        self.minus_restriction(self.at_ranges(ranges))
    }
}
