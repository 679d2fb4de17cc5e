//! Continuous runs of instants sharing one interpolation.

mod restrict;
mod sync;

pub use restrict::Fragments;

use crate::error::{Result, TempusError};
use crate::temporal::Interpolation;
use crate::temporal::instant::TInstant;
use crate::value::{TemporalNumber, TemporalValue};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use tempus_types::bbox::BoundingBox;
use tempus_types::period::Period;
use tempus_types::range::ValueRange;
use tempus_types::time::Timestamp;

/// A gap-free, time-ordered run of instants.
///
/// The period bounds always sit on the first and last instant; an excluded
/// bound keeps its instant stored. Stepwise sequences with an exclusive upper
/// bound store the penultimate value at their last instant since the last
/// value is never observed.
///
/// # Examples
///
/// ```
/// use tempus::temporal::{Interpolation, TInstant, TSequence};
/// use tempus::Timestamp;
///
/// let t = Timestamp::from_secs;
/// let seq = TSequence::new(
///     vec![TInstant::new(0.0, t(0)), TInstant::new(10.0, t(10))],
///     true,
///     true,
///     Interpolation::Linear,
///     true,
/// )?;
///
/// assert_eq!(seq.value_at_timestamp(t(4)), Some(4.0));
/// assert_eq!(seq.value_at_timestamp(t(11)), None);
/// # Ok::<(), tempus::TempusError>(())
/// ```
#[derive(Debug, Clone)]
pub struct TSequence<V: TemporalValue> {
    instants: Vec<TInstant<V>>,
    period: Period,
    interpolation: Interpolation,
    bbox: V::Box,
}

impl<V: TemporalValue> TSequence<V> {
    pub fn new(
        instants: Vec<TInstant<V>>,
        lower_inc: bool,
        upper_inc: bool,
        interpolation: Interpolation,
        normalize: bool,
    ) -> Result<Self> {
        let (Some(first), Some(last)) = (instants.first(), instants.last()) else {
            return Err(TempusError::InvalidSequence(
                "a sequence must contain at least one instant".to_string(),
            ));
        };
        if interpolation == Interpolation::Linear && !V::CONTINUOUS {
            return Err(TempusError::InvalidSequence(format!(
                "linear interpolation is not supported for {} values",
                V::TYPE_NAME
            )));
        }
        for pair in instants.windows(2) {
            if pair[0].timestamp() >= pair[1].timestamp() {
                return Err(TempusError::InvalidSequence(format!(
                    "timestamps must be strictly increasing: {} then {}",
                    pair[0].timestamp(),
                    pair[1].timestamp()
                )));
            }
        }
        if instants.len() == 1 && !(lower_inc && upper_inc) {
            return Err(TempusError::InvalidSequence(format!(
                "a single instant sequence at {} must have inclusive bounds",
                first.timestamp()
            )));
        }
        let period = Period::new(first.timestamp(), last.timestamp(), lower_inc, upper_inc)?;
        Ok(Self::from_parts(instants, period, interpolation, normalize))
    }

    /// Degenerate closed sequence holding one instant.
    pub fn from_instant(instant: TInstant<V>, interpolation: Interpolation) -> Self {
        let period = Period::instant(instant.timestamp());
        Self::from_parts(vec![instant], period, interpolation, false)
    }

    /// Build from instants already known to be ordered and to match `period`.
    pub(crate) fn from_parts(
        mut instants: Vec<TInstant<V>>,
        period: Period,
        interpolation: Interpolation,
        normalize: bool,
    ) -> Self {
        debug_assert!(!instants.is_empty());
        debug_assert_eq!(instants[0].timestamp(), period.lower());
        debug_assert_eq!(instants[instants.len() - 1].timestamp(), period.upper());

        let n = instants.len();
        if interpolation == Interpolation::Stepwise && !period.upper_inc() && n > 1 {
            let penultimate = instants[n - 2].value().clone();
            instants[n - 1] = instants[n - 1].with_value(penultimate);
        }
        if normalize && n > 2 {
            instants = normalize_instants(instants, interpolation);
        }
        let bbox = compute_bbox(&instants);
        Self {
            instants,
            period,
            interpolation,
            bbox,
        }
    }

    pub fn instants(&self) -> &[TInstant<V>] {
        &self.instants
    }

    pub fn num_instants(&self) -> usize {
        self.instants.len()
    }

    pub fn instant_n(&self, n: usize) -> Option<&TInstant<V>> {
        self.instants.get(n)
    }

    pub fn start_instant(&self) -> &TInstant<V> {
        &self.instants[0]
    }

    pub fn end_instant(&self) -> &TInstant<V> {
        &self.instants[self.instants.len() - 1]
    }

    pub fn first_value(&self) -> &V {
        self.start_instant().value()
    }

    pub fn last_value(&self) -> &V {
        self.end_instant().value()
    }

    pub fn period(&self) -> &Period {
        &self.period
    }

    pub fn lower_inc(&self) -> bool {
        self.period.lower_inc()
    }

    pub fn upper_inc(&self) -> bool {
        self.period.upper_inc()
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn bbox(&self) -> &V::Box {
        &self.bbox
    }

    pub fn start_timestamp(&self) -> Timestamp {
        self.period.lower()
    }

    pub fn end_timestamp(&self) -> Timestamp {
        self.period.upper()
    }

    pub fn duration(&self) -> i64 {
        self.period.duration()
    }

    pub fn is_instant(&self) -> bool {
        self.instants.len() == 1
    }

    /// Value at `t` honouring the period bounds.
    pub fn value_at_timestamp(&self, t: Timestamp) -> Option<V> {
        if !self.period.contains_timestamp(t) {
            return None;
        }
        self.value_at_inclusive(t)
    }

    /// Value at `t` treating both bounds as inclusive.
    pub(crate) fn value_at_inclusive(&self, t: Timestamp) -> Option<V> {
        if t < self.start_timestamp() || t > self.end_timestamp() {
            return None;
        }
        match self.instants.binary_search_by(|inst| inst.timestamp().cmp(&t)) {
            Ok(i) => Some(self.instants[i].value().clone()),
            Err(i) => {
                let start = &self.instants[i - 1];
                let end = &self.instants[i];
                Some(self.segment_value(start, end, t))
            }
        }
    }

    fn segment_value(&self, start: &TInstant<V>, end: &TInstant<V>, t: Timestamp) -> V {
        match self.interpolation {
            Interpolation::Stepwise => start.value().clone(),
            Interpolation::Linear => {
                let ratio = t.delta_f64(start.timestamp())
                    / end.timestamp().delta_f64(start.timestamp());
                V::interpolate(start.value(), end.value(), ratio)
            }
        }
    }

    /// Same instants with both bounds made inclusive.
    pub fn with_closed_bounds(&self) -> Self {
        if self.lower_inc() && self.upper_inc() {
            return self.clone();
        }
        let period = Period::instant(self.start_timestamp())
            .span(&Period::instant(self.end_timestamp()));
        Self::from_parts(self.instants.clone(), period, self.interpolation, false)
    }

    /// Same instants with the upper bound made exclusive.
    pub(crate) fn with_exclusive_upper(&self) -> Option<Self> {
        let period = self.period.with_bounds(self.lower_inc(), false).ok()?;
        Some(Self::from_parts(
            self.instants.clone(),
            period,
            self.interpolation,
            true,
        ))
    }

    pub fn shift(&self, micros: i64) -> Self {
        let instants = self.instants.iter().map(|i| i.shift(micros)).collect();
        Self::from_parts(instants, self.period.shift(micros), self.interpolation, false)
    }

    /// Smallest stored value; an excluded endpoint still takes part.
    pub fn min_value(&self) -> &V {
        self.instants
            .iter()
            .map(TInstant::value)
            .min_by(|a, b| a.value_cmp(b))
            .unwrap_or_else(|| self.first_value())
    }

    pub fn max_value(&self) -> &V {
        self.instants
            .iter()
            .map(TInstant::value)
            .max_by(|a, b| a.value_cmp(b))
            .unwrap_or_else(|| self.first_value())
    }

    /// Append `next`, which starts where `self` ends with the same value.
    pub(crate) fn join(&self, next: &TSequence<V>) -> Self {
        let mut instants = self.instants.clone();
        instants.extend(next.instants[1..].iter().cloned());
        let period = self.period.span(&next.period);
        Self::from_parts(instants, period, self.interpolation, true)
    }

    pub fn hash_u32(&self) -> u32 {
        let mut h = (u32::from(self.interpolation == Interpolation::Linear) << 2)
            | (u32::from(self.lower_inc()) << 1)
            | u32::from(self.upper_inc());
        for inst in &self.instants {
            h = (h << 5).wrapping_sub(h).wrapping_add(inst.hash_u32());
        }
        h
    }
}

impl<V: TemporalNumber> TSequence<V> {
    /// Area under the curve, in value × microseconds.
    pub fn integral(&self) -> f64 {
        self.instants
            .windows(2)
            .map(|pair| {
                let width = pair[1].timestamp().delta_f64(pair[0].timestamp());
                let a = pair[0].value().to_f64();
                let b = pair[1].value().to_f64();
                match self.interpolation {
                    Interpolation::Stepwise => a * width,
                    Interpolation::Linear => (a + b) / 2.0 * width,
                }
            })
            .sum()
    }

    /// Time-weighted average; the plain value for an instantaneous sequence.
    pub fn twavg(&self) -> f64 {
        let duration = self.end_timestamp().delta_f64(self.start_timestamp());
        if duration == 0.0 {
            return self.first_value().to_f64();
        }
        self.integral() / duration
    }

    /// Value ranges actually taken by the sequence.
    pub fn value_ranges(&self) -> Vec<ValueRange> {
        let n = self.instants.len();
        match self.interpolation {
            Interpolation::Stepwise => {
                let observed = if n > 1 && !self.upper_inc() { n - 1 } else { n };
                let ranges = self.instants[..observed]
                    .iter()
                    .filter_map(|i| {
                        let v = i.value().to_f64();
                        ValueRange::closed(v, v).ok()
                    })
                    .collect();
                ValueRange::normalize(ranges)
            }
            Interpolation::Linear => {
                let (min, min_inc) = self.extremum_bound(|a, b| a < b);
                let (max, max_inc) = self.extremum_bound(|a, b| a > b);
                ValueRange::new(min, max, min_inc, max_inc)
                    .or_else(|_| ValueRange::closed(min, max))
                    .map(|r| vec![r])
                    .unwrap_or_default()
            }
        }
    }

    /// Extreme value under `better`, and whether an included instant attains it.
    fn extremum_bound(&self, better: impl Fn(f64, f64) -> bool) -> (f64, bool) {
        let n = self.instants.len();
        let mut best = self.instants[0].value().to_f64();
        let mut inc = self.lower_inc() || n == 1;
        for (i, inst) in self.instants.iter().enumerate().skip(1) {
            let v = inst.value().to_f64();
            let included = i < n - 1 || self.upper_inc();
            if better(v, best) {
                best = v;
                inc = included;
            } else if v == best {
                inc |= included;
            }
        }
        (best, inc)
    }

    /// Integer sequence widened to floats, keeping stepwise interpolation.
    pub fn to_float(&self) -> TSequence<f64> {
        let instants = self
            .instants
            .iter()
            .map(|i| TInstant::new(i.value().to_f64(), i.timestamp()))
            .collect();
        TSequence::from_parts(instants, self.period, self.interpolation, false)
    }
}

fn compute_bbox<V: TemporalValue>(instants: &[TInstant<V>]) -> V::Box {
    let mut bbox = instants[0].bbox();
    for inst in &instants[1..] {
        bbox.expand(&inst.bbox());
    }
    bbox
}

/// Drop interior instants that add no information.
fn normalize_instants<V: TemporalValue>(
    instants: Vec<TInstant<V>>,
    interpolation: Interpolation,
) -> Vec<TInstant<V>> {
    let n = instants.len();
    let mut iter = instants.into_iter();
    let mut result: Vec<TInstant<V>> = Vec::with_capacity(n);
    let mut pending: Vec<TInstant<V>> = iter.by_ref().take(2).collect();
    result.push(pending.remove(0));
    let mut middle = pending.remove(0);
    for next in iter {
        let prev = &result[result.len() - 1];
        let redundant = match interpolation {
            Interpolation::Stepwise => prev.value().value_eq(middle.value()),
            Interpolation::Linear => {
                let ratio = middle.timestamp().delta_f64(prev.timestamp())
                    / next.timestamp().delta_f64(prev.timestamp());
                V::collinear(prev.value(), middle.value(), next.value(), ratio)
            }
        };
        if !redundant {
            result.push(middle);
        }
        middle = next;
    }
    result.push(middle);
    result
}

impl<V: TemporalValue> PartialEq for TSequence<V> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<V: TemporalValue> Eq for TSequence<V> {}

impl<V: TemporalValue> Ord for TSequence<V> {
    /// Period first, then instant by instant, then instant count.
    fn cmp(&self, other: &Self) -> Ordering {
        self.period
            .cmp(&other.period)
            .then_with(|| {
                self.instants
                    .iter()
                    .zip(&other.instants)
                    .map(|(a, b)| a.cmp(b))
                    .find(|o| *o != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| self.instants.len().cmp(&other.instants.len()))
            .then_with(|| self.interpolation.cmp(&other.interpolation))
    }
}

impl<V: TemporalValue> PartialOrd for TSequence<V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<V: TemporalValue> Hash for TSequence<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.hash_u32());
    }
}

impl<V: TemporalValue> fmt::Display for TSequence<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", if self.lower_inc() { '[' } else { '(' })?;
        for (i, inst) in self.instants.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", inst)?;
        }
        write!(f, "{}", if self.upper_inc() { ']' } else { ')' })
    }
}
