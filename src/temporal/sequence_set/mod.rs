//! Temporal values made of several disjoint sequences.
//!
//! A [`TSequenceSet`] owns an ordered list of sequences whose periods never
//! overlap and never touch with both abutting bounds inclusive. Its bounding
//! box is computed once at construction.

mod intersects;
mod restrict;
mod sync;

use crate::error::{Result, TempusError};
use crate::temporal::Interpolation;
use crate::temporal::instant::TInstant;
use crate::temporal::instant_set::TInstantSet;
use crate::temporal::sequence::TSequence;
use crate::value::{TemporalNumber, TemporalValue};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use tempus_types::bbox::BoundingBox;
use tempus_types::period::Period;
use tempus_types::period_set::PeriodSet;
use tempus_types::range::ValueRange;
use tempus_types::time::Timestamp;

/// A temporal value defined over a set of disjoint periods.
///
/// # Examples
///
/// ```
/// use tempus::temporal::{Interpolation, TInstant, TSequence, TSequenceSet};
/// use tempus::Timestamp;
///
/// let t = Timestamp::from_micros;
/// let seq = |a: (i32, i64), b: (i32, i64), lower_inc, upper_inc| {
///     TSequence::new(
///         vec![TInstant::new(a.0, t(a.1)), TInstant::new(b.0, t(b.1))],
///         lower_inc,
///         upper_inc,
///         Interpolation::Stepwise,
///         true,
///     )
/// };
///
/// let set = TSequenceSet::from_sequences(
///     vec![seq((1, 20), (1, 30), true, true)?, seq((1, 0), (1, 10), true, true)?],
///     true,
/// )?;
///
/// assert_eq!(set.count(), 2);
/// assert_eq!(set.find_timestamp(t(15)), (false, 1));
/// assert_eq!(set.value_at_timestamp(t(25)), Some(1));
/// # Ok::<(), tempus::TempusError>(())
/// ```
#[derive(Debug, Clone)]
pub struct TSequenceSet<V: TemporalValue> {
    sequences: Vec<TSequence<V>>,
    bbox: V::Box,
}

impl<V: TemporalValue> TSequenceSet<V> {
    /// Build a sequence set.
    ///
    /// With `normalize` the input is sorted by period and consecutive
    /// sequences that continue each other are merged. Without it the input
    /// must already be sorted; it is validated but left as given.
    pub fn from_sequences(mut sequences: Vec<TSequence<V>>, normalize: bool) -> Result<Self> {
        if sequences.is_empty() {
            return Err(TempusError::InvalidSequenceSet(
                "a sequence set must contain at least one sequence".to_string(),
            ));
        }
        if sequences.len() == 1 {
            return Ok(Self::from_valid(sequences));
        }
        let interpolation = sequences[0].interpolation();
        if sequences.iter().any(|s| s.interpolation() != interpolation) {
            return Err(TempusError::InvalidSequenceSet(
                "all sequences must share the same interpolation".to_string(),
            ));
        }
        if normalize {
            sequences.sort_by(|a, b| a.period().cmp(b.period()));
        }
        for pair in sequences.windows(2) {
            let (prev, next) = (pair[0].period(), pair[1].period());
            if prev.upper() > next.lower()
                || (prev.upper() == next.lower() && prev.upper_inc() && next.lower_inc())
            {
                return Err(TempusError::InvalidSequenceSet(format!(
                    "sequences {} and {} overlap",
                    prev, next
                )));
            }
        }
        let sequences = if normalize {
            merge_continuations(sequences)
        } else {
            sequences
        };
        Ok(Self::from_valid(sequences))
    }

    pub fn from_sequence(sequence: TSequence<V>) -> Self {
        Self::from_valid(vec![sequence])
    }

    /// One single-instant sequence per instant.
    pub fn from_instant_set(instants: &TInstantSet<V>, interpolation: Interpolation) -> Self {
        let sequences = instants
            .instants()
            .iter()
            .map(|i| TSequence::from_instant(i.clone(), interpolation))
            .collect();
        Self::from_valid(sequences)
    }

    fn from_valid(sequences: Vec<TSequence<V>>) -> Self {
        let mut bbox = sequences[0].bbox().clone();
        for seq in &sequences[1..] {
            bbox.expand(seq.bbox());
        }
        Self { sequences, bbox }
    }

    /// Assemble restriction output; `None` when nothing was kept.
    pub(crate) fn from_fragments(mut fragments: Vec<TSequence<V>>) -> Option<Self> {
        if fragments.is_empty() {
            return None;
        }
        fragments.sort_by(|a, b| a.period().cmp(b.period()));
        let fragments = merge_continuations(open_shared_boundaries(fragments));
        debug_assert!(fragments.windows(2).all(|p| p[0].period().is_before(p[1].period())));
        Some(Self::from_valid(fragments))
    }

    /// Pairwise aligned output of a synchronization, already valid.
    pub(crate) fn from_synchronized(sequences: Vec<TSequence<V>>) -> Option<Self> {
        if sequences.is_empty() {
            return None;
        }
        Some(Self::from_valid(sequences))
    }

    pub fn sequences(&self) -> &[TSequence<V>] {
        &self.sequences
    }

    pub fn sequence_n(&self, n: usize) -> Option<&TSequence<V>> {
        self.sequences.get(n)
    }

    pub fn count(&self) -> usize {
        self.sequences.len()
    }

    /// Cached value × time envelope.
    pub fn bbox(&self) -> &V::Box {
        &self.bbox
    }

    pub fn interpolation(&self) -> Interpolation {
        self.sequences[0].interpolation()
    }

    fn first_sequence(&self) -> &TSequence<V> {
        &self.sequences[0]
    }

    fn last_sequence(&self) -> &TSequence<V> {
        &self.sequences[self.sequences.len() - 1]
    }

    /// Bounding period, gaps included.
    pub fn timespan(&self) -> Period {
        self.first_sequence().period().span(self.last_sequence().period())
    }

    /// Periods on which the value is defined.
    pub fn time(&self) -> PeriodSet {
        PeriodSet::from_ordered(
            *self.first_sequence().period(),
            self.sequences[1..].iter().map(|s| *s.period()),
        )
    }

    /// Sum of the sequence durations in microseconds, saturating.
    pub fn duration(&self) -> i64 {
        self.sequences
            .iter()
            .fold(0i64, |total, s| total.saturating_add(s.duration()))
    }

    pub fn start_timestamp(&self) -> Timestamp {
        self.first_sequence().start_timestamp()
    }

    pub fn end_timestamp(&self) -> Timestamp {
        self.last_sequence().end_timestamp()
    }

    pub fn start_instant(&self) -> &TInstant<V> {
        self.first_sequence().start_instant()
    }

    pub fn end_instant(&self) -> &TInstant<V> {
        self.last_sequence().end_instant()
    }

    pub fn num_instants(&self) -> usize {
        self.sequences.iter().map(TSequence::num_instants).sum()
    }

    /// Instant `n` counting across all sequences from zero.
    pub fn instant_n(&self, mut n: usize) -> Option<&TInstant<V>> {
        for seq in &self.sequences {
            if n < seq.num_instants() {
                return seq.instant_n(n);
            }
            n -= seq.num_instants();
        }
        None
    }

    pub fn instants(&self) -> Vec<&TInstant<V>> {
        self.sequences.iter().flat_map(|s| s.instants()).collect()
    }

    /// Distinct timestamps; a boundary shared by two sequences counts once.
    pub fn num_timestamps(&self) -> usize {
        let shared = self
            .sequences
            .windows(2)
            .filter(|p| p[0].end_timestamp() == p[1].start_timestamp())
            .count();
        self.num_instants() - shared
    }

    pub fn timestamps(&self) -> Vec<Timestamp> {
        let mut result: Vec<Timestamp> = self
            .sequences
            .iter()
            .flat_map(|s| s.instants().iter().map(TInstant::timestamp))
            .collect();
        result.dedup();
        result
    }

    pub fn timestamp_n(&self, n: usize) -> Option<Timestamp> {
        self.timestamps().get(n).copied()
    }

    /// Distinct stored values in ascending order.
    pub fn values(&self) -> Vec<V> {
        let mut values: Vec<V> = self
            .sequences
            .iter()
            .flat_map(|s| s.instants().iter().map(|i| i.value().clone()))
            .collect();
        values.sort_by(|a, b| a.value_cmp(b));
        values.dedup_by(|a, b| a.value_eq(b));
        values
    }

    /// Range of values from the bounding box.
    pub fn value_range(&self) -> Result<ValueRange> {
        let (lo, hi) = V::box_value_extent(&self.bbox).ok_or_else(|| {
            TempusError::UnsupportedOperation(format!(
                "value range of temporal {} values",
                V::TYPE_NAME
            ))
        })?;
        Ok(ValueRange::closed(lo, hi)?)
    }

    /// Smallest value; read from the box when the type is numeric.
    pub fn min_value(&self) -> V {
        if let Some(min) = V::box_value_extent(&self.bbox).and_then(|(lo, _)| V::from_extent(lo)) {
            return min;
        }
        self.sequences
            .iter()
            .map(TSequence::min_value)
            .min_by(|a, b| a.value_cmp(b))
            .unwrap_or_else(|| self.first_sequence().first_value())
            .clone()
    }

    pub fn max_value(&self) -> V {
        if let Some(max) = V::box_value_extent(&self.bbox).and_then(|(_, hi)| V::from_extent(hi)) {
            return max;
        }
        self.sequences
            .iter()
            .map(TSequence::max_value)
            .max_by(|a, b| a.value_cmp(b))
            .unwrap_or_else(|| self.first_sequence().first_value())
            .clone()
    }

    /// The value is taken at least once.
    pub fn ever_equals(&self, value: &V) -> bool {
        if !V::box_may_contain(&self.bbox, value) {
            return false;
        }
        self.sequences.iter().any(|s| !s.at_value(value).is_empty())
    }

    /// The value is taken everywhere the temporal value is defined.
    pub fn always_equals(&self, value: &V) -> bool {
        if !V::box_may_contain(&self.bbox, value) {
            return false;
        }
        self.sequences
            .iter()
            .all(|s| s.instants().iter().all(|i| i.value().value_eq(value)))
    }

    pub fn shift(&self, micros: i64) -> Self {
        Self::from_valid(self.sequences.iter().map(|s| s.shift(micros)).collect())
    }

    /// Each sequence ends on the value the next one starts with.
    pub fn continuous_value(&self) -> bool {
        self.sequences
            .windows(2)
            .all(|p| p[0].last_value().value_eq(p[1].first_value()))
    }

    /// No gap in time between consecutive sequences.
    pub fn continuous_time(&self) -> bool {
        self.sequences.windows(2).all(|p| {
            p[0].end_timestamp() == p[1].start_timestamp()
                && (p[0].upper_inc() || p[1].lower_inc())
        })
    }

    pub fn hash_u32(&self) -> u32 {
        let mut h: u32 = 1;
        for seq in &self.sequences {
            h = (h << 5).wrapping_sub(h).wrapping_add(seq.hash_u32());
        }
        h
    }

    /// Binary search of `t` over the sequence periods.
    ///
    /// Returns `(true, i)` if sequence `i` contains `t`, otherwise `(false,
    /// gap)` where `gap` is the index of the first sequence starting after `t`.
    pub fn find_timestamp(&self, t: Timestamp) -> (bool, usize) {
        find_timestamp_in(&self.sequences, t)
    }

    /// Like [`find_timestamp`](Self::find_timestamp) restricted to the
    /// sequences from `from` on; the position is absolute.
    pub fn find_timestamp_from(&self, from: usize, t: Timestamp) -> (bool, usize) {
        let from = from.min(self.sequences.len());
        let (found, pos) = find_timestamp_in(&self.sequences[from..], t);
        (found, from + pos)
    }
}

impl<V: TemporalNumber> TSequenceSet<V> {
    /// Normalized value ranges taken by the sequences.
    pub fn ranges(&self) -> Vec<ValueRange> {
        ValueRange::normalize(
            self.sequences
                .iter()
                .flat_map(TSequence::value_ranges)
                .collect(),
        )
    }

    /// Area under the curve, in value × microseconds.
    pub fn integral(&self) -> f64 {
        self.sequences.iter().map(TSequence::integral).sum()
    }

    /// Time-weighted average; instantaneous sequences are averaged plainly.
    pub fn twavg(&self) -> f64 {
        let duration: f64 = self
            .sequences
            .iter()
            .map(|s| s.end_timestamp().delta_f64(s.start_timestamp()))
            .sum();
        if duration == 0.0 {
            let sum: f64 = self.sequences.iter().map(TSequence::twavg).sum();
            return sum / self.sequences.len() as f64;
        }
        self.integral() / duration
    }

    pub fn to_float(&self) -> TSequenceSet<f64> {
        TSequenceSet::from_valid(self.sequences.iter().map(TSequence::to_float).collect())
    }
}

/// Binary search of `t` over ordered, disjoint sequences.
pub fn find_timestamp_in<V: TemporalValue>(sequences: &[TSequence<V>], t: Timestamp) -> (bool, usize) {
    let mut first = 0usize;
    let mut last = sequences.len();
    while first < last {
        let middle = first + (last - first) / 2;
        let period = sequences[middle].period();
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

/// `next` continues `prev` without a jump in time or value.
fn continues<V: TemporalValue>(prev: &TSequence<V>, next: &TSequence<V>) -> bool {
    prev.end_timestamp() == next.start_timestamp()
        && prev.upper_inc() != next.lower_inc()
        && prev.last_value().value_eq(next.first_value())
        && prev.interpolation() == next.interpolation()
}

fn merge_continuations<V: TemporalValue>(sequences: Vec<TSequence<V>>) -> Vec<TSequence<V>> {
    let input = sequences.len();
    let mut result: Vec<TSequence<V>> = Vec::with_capacity(input);
    for seq in sequences {
        match result.last_mut() {
            Some(prev) if continues(prev, &seq) => *prev = prev.join(&seq),
            _ => result.push(seq),
        }
    }
    if result.len() < input {
        log::debug!(
            "normalization merged {} sequences into {}",
            input,
            result.len()
        );
    }
    result
}

/// Restore disjointness of time-sorted fragments that share an inclusive
/// boundary: the earlier fragment loses its upper bound, or is dropped when
/// it is a single instant.
fn open_shared_boundaries<V: TemporalValue>(fragments: Vec<TSequence<V>>) -> Vec<TSequence<V>> {
    let mut result: Vec<TSequence<V>> = Vec::with_capacity(fragments.len());
    for seq in fragments {
        if let Some(prev) = result.last_mut()
            && prev.end_timestamp() == seq.start_timestamp()
            && prev.upper_inc()
            && seq.lower_inc()
        {
            match prev.with_exclusive_upper() {
                Some(open) if !prev.is_instant() => *prev = open,
                _ => {
                    result.pop();
                }
            }
        }
        result.push(seq);
    }
    result
}

impl<V: TemporalValue> From<TSequence<V>> for TSequenceSet<V> {
    fn from(sequence: TSequence<V>) -> Self {
        Self::from_sequence(sequence)
    }
}

impl<V: TemporalValue> From<TInstant<V>> for TSequenceSet<V> {
    fn from(instant: TInstant<V>) -> Self {
        Self::from_sequence(TSequence::from_instant(
            instant,
            Interpolation::default_for::<V>(),
        ))
    }
}

impl<V: TemporalValue> PartialEq for TSequenceSet<V> {
    fn eq(&self, other: &Self) -> bool {
        self.sequences.len() == other.sequences.len()
            && self.bbox == other.bbox
            && self.sequences == other.sequences
    }
}

impl<V: TemporalValue> Eq for TSequenceSet<V> {}

impl<V: TemporalValue> Ord for TSequenceSet<V> {
    /// Lexicographic over the sequences; an equal shorter prefix sorts first.
    fn cmp(&self, other: &Self) -> Ordering {
        self.sequences
            .iter()
            .zip(&other.sequences)
            .map(|(a, b)| a.cmp(b))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or_else(|| self.sequences.len().cmp(&other.sequences.len()))
    }
}

impl<V: TemporalValue> PartialOrd for TSequenceSet<V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<V: TemporalValue> Hash for TSequenceSet<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.hash_u32());
    }
}

impl<V: TemporalValue> fmt::Display for TSequenceSet<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, seq) in self.sequences.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", seq)?;
        }
        write!(f, "}}")
    }
}
