use super::TSequenceSet;
use crate::temporal::instant::TInstant;
use crate::temporal::instant_set::TInstantSet;
use crate::temporal::sequence::TSequence;
use crate::value::TemporalValue;
use std::cmp::Ordering;
use tempus_types::period::{Period, cmp_upper_bounds};
use tempus_types::period_set::PeriodSet;
use tempus_types::time::Timestamp;
use tempus_types::timestamp_set::TimestampSet;

impl<V: TemporalValue> TSequenceSet<V> {
    /// Some sequence contains `t`, honouring bound inclusivity.
    pub fn intersects_timestamp(&self, t: Timestamp) -> bool {
        self.find_timestamp(t).0
    }

    pub fn intersects_timestamp_set(&self, timestamps: &TimestampSet) -> bool {
        if !self.timespan().overlaps(&timestamps.timespan()) {
            return false;
        }
        let mut from = 0;
        for &t in timestamps.times() {
            let (found, idx) = self.find_timestamp_from(from, t);
            if found {
                return true;
            }
            if idx >= self.sequences.len() {
                break;
            }
            from = idx;
        }
        false
    }

    pub fn intersects_period(&self, period: &Period) -> bool {
        if !self.timespan().overlaps(period) {
            return false;
        }
        let (found_lower, first) = self.find_timestamp(period.lower());
        let (found_upper, last) = self.find_timestamp_from(first, period.upper());
        if (found_lower && period.lower_inc()) || (found_upper && period.upper_inc()) {
            return true;
        }
        // An open bound may sit on a sequence boundary
        let end = (last + 1).min(self.sequences.len());
        self.sequences[first..end]
            .iter()
            .any(|seq| seq.period().overlaps(period))
    }

    pub fn intersects_period_set(&self, periods: &PeriodSet) -> bool {
        if !self.timespan().overlaps(&periods.timespan()) {
            return false;
        }
        periods.periods().iter().any(|p| self.intersects_period(p))
    }

    pub fn intersects_instant(&self, instant: &TInstant<V>) -> bool {
        self.intersects_timestamp(instant.timestamp())
    }

    pub fn intersects_instant_set(&self, instants: &TInstantSet<V>) -> bool {
        instants
            .instants()
            .iter()
            .any(|i| self.intersects_timestamp(i.timestamp()))
    }

    pub fn intersects_sequence(&self, sequence: &TSequence<V>) -> bool {
        self.intersects_period(sequence.period())
    }

    /// Both sets are defined at some common timestamp.
    pub fn intersects(&self, other: &TSequenceSet<V>) -> bool {
        if !self.timespan().overlaps(&other.timespan()) {
            return false;
        }
        let (mut i, mut j) = (0, 0);
        while i < self.sequences.len() && j < other.sequences.len() {
            let a = self.sequences[i].period();
            let b = other.sequences[j].period();
            if a.overlaps(b) {
                return true;
            }
            match cmp_upper_bounds(a.upper(), a.upper_inc(), b.upper(), b.upper_inc()) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
            }
        }
        false
    }

    /// Time on which both sets are defined.
    pub fn intersection_time(&self, other: &TSequenceSet<V>) -> Option<PeriodSet> {
        if !self.timespan().overlaps(&other.timespan()) {
            return None;
        }
        self.time().intersection(&other.time())
    }
}
