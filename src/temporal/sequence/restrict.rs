use super::TSequence;
use crate::temporal::Interpolation;
use crate::temporal::instant::TInstant;
use crate::value::{TemporalNumber, TemporalValue};
use smallvec::SmallVec;
use tempus_types::period::Period;
use tempus_types::range::ValueRange;
use tempus_types::time::Timestamp;

/// Pieces of one sequence kept by a restriction, in time order.
pub type Fragments<V> = SmallVec<[TSequence<V>; 2]>;

/// Bounds of segment `i` as seen by a restriction: interior segments own
/// their start instant, the first and last segment follow the period.
fn segment_bounds(i: usize, segments: usize, period: &Period) -> (bool, bool) {
    let lower_inc = if i == 0 { period.lower_inc() } else { true };
    let upper_inc = if i + 1 == segments { period.upper_inc() } else { false };
    (lower_inc, upper_inc)
}

impl<V: TemporalValue> TSequence<V> {
    pub fn at_timestamp(&self, t: Timestamp) -> Option<TInstant<V>> {
        self.value_at_timestamp(t).map(|value| TInstant::new(value, t))
    }

    pub fn at_period(&self, period: &Period) -> Option<TSequence<V>> {
        let inter = self.period.intersection(period)?;
        if inter == self.period {
            return Some(self.clone());
        }
        if inter.is_instant() {
            let value = self.value_at_inclusive(inter.lower())?;
            return Some(TSequence::from_instant(
                TInstant::new(value, inter.lower()),
                self.interpolation,
            ));
        }
        let mut instants = Vec::with_capacity(self.instants.len());
        instants.push(TInstant::new(
            self.value_at_inclusive(inter.lower())?,
            inter.lower(),
        ));
        instants.extend(
            self.instants
                .iter()
                .filter(|i| i.timestamp() > inter.lower() && i.timestamp() < inter.upper())
                .cloned(),
        );
        instants.push(TInstant::new(
            self.value_at_inclusive(inter.upper())?,
            inter.upper(),
        ));
        Some(TSequence::from_parts(
            instants,
            inter,
            self.interpolation,
            true,
        ))
    }

    /// Instantaneous fragment at `t`, kept only if the bound allows it.
    fn instant_fragment(&self, value: V, t: Timestamp) -> TSequence<V> {
        TSequence::from_instant(TInstant::new(value, t), self.interpolation)
    }

    fn fragment(
        &self,
        instants: Vec<TInstant<V>>,
        lower_inc: bool,
        upper_inc: bool,
    ) -> Option<TSequence<V>> {
        let lower = instants.first()?.timestamp();
        let upper = instants.last()?.timestamp();
        let period = Period::new(lower, upper, lower_inc, upper_inc).ok()?;
        Some(TSequence::from_parts(
            instants,
            period,
            self.interpolation,
            true,
        ))
    }

    /// Maximal runs of stepwise segments whose value satisfies `keep`.
    pub(crate) fn stepwise_restrict(&self, keep: impl Fn(&V) -> bool) -> Fragments<V> {
        let n = self.instants.len();
        let mut result = Fragments::new();
        if n == 1 {
            if keep(self.first_value()) {
                result.push(self.clone());
            }
            return result;
        }
        let mut run_start: Option<usize> = None;
        for i in 0..n - 1 {
            if keep(self.instants[i].value()) {
                run_start.get_or_insert(i);
            } else if let Some(start) = run_start.take() {
                // Segments start..i end where segment i begins
                let mut instants = self.instants[start..i].to_vec();
                instants.push(self.instants[i].with_value(self.instants[i - 1].value().clone()));
                let lower_inc = start > 0 || self.lower_inc();
                result.extend(self.fragment(instants, lower_inc, false));
            }
        }
        let last_kept = self.upper_inc() && keep(self.last_value());
        match run_start {
            Some(start) => {
                let instants = self.instants[start..].to_vec();
                let lower_inc = start > 0 || self.lower_inc();
                result.extend(self.fragment(instants, lower_inc, last_kept));
            }
            None if last_kept => {
                let last = self.end_instant();
                result.push(self.instant_fragment(last.value().clone(), last.timestamp()));
            }
            None => {}
        }
        result
    }

    pub fn at_value(&self, value: &V) -> Fragments<V> {
        match self.interpolation {
            Interpolation::Stepwise => self.stepwise_restrict(|v| v.value_eq(value)),
            Interpolation::Linear => self.linear_at_value(value),
        }
    }

    fn linear_at_value(&self, value: &V) -> Fragments<V> {
        let mut result = Fragments::new();
        if self.is_instant() {
            if self.first_value().value_eq(value) {
                result.push(self.clone());
            }
            return result;
        }
        let segments = self.instants.len() - 1;
        for (i, pair) in self.instants.windows(2).enumerate() {
            let (start, end) = (&pair[0], &pair[1]);
            let (lower_inc, upper_inc) = segment_bounds(i, segments, &self.period);
            if start.value().value_eq(end.value()) {
                if start.value().value_eq(value) {
                    result.extend(self.fragment(vec![start.clone(), end.clone()], lower_inc, upper_inc));
                }
                continue;
            }
            let Some(ratio) = V::locate(start.value(), end.value(), value) else {
                continue;
            };
            let t = Timestamp::lerp(start.timestamp(), end.timestamp(), ratio);
            if (t == start.timestamp() && !lower_inc) || (t == end.timestamp() && !upper_inc) {
                continue;
            }
            result.push(self.instant_fragment(value.clone(), t));
        }
        result
    }

    /// Union of `at_value` over distinct values, in time order.
    pub fn at_values(&self, values: &[V]) -> Fragments<V> {
        let mut distinct: Vec<&V> = values.iter().collect();
        distinct.sort_by(|a, b| a.value_cmp(b));
        distinct.dedup_by(|a, b| a.value_eq(b));
        match self.interpolation {
            Interpolation::Stepwise => self.stepwise_restrict(|v| {
                distinct
                    .binary_search_by(|probe| probe.value_cmp(v))
                    .is_ok()
            }),
            Interpolation::Linear => {
                let mut result: Fragments<V> = distinct
                    .into_iter()
                    .flat_map(|v| self.linear_at_value(v))
                    .collect();
                result.sort_by(|a, b| a.period().cmp(b.period()));
                result
            }
        }
    }
}

impl<V: TemporalNumber> TSequence<V> {
    pub fn at_range(&self, range: &ValueRange) -> Fragments<V> {
        match self.interpolation {
            Interpolation::Stepwise => {
                self.stepwise_restrict(|v| range.contains_value(v.to_f64()))
            }
            Interpolation::Linear => self.linear_at_range(range),
        }
    }

    pub fn at_ranges(&self, ranges: &[ValueRange]) -> Fragments<V> {
        let ranges = ValueRange::normalize(ranges.to_vec());
        match self.interpolation {
            Interpolation::Stepwise => self.stepwise_restrict(|v| {
                let x = v.to_f64();
                ranges.iter().any(|r| r.contains_value(x))
            }),
            Interpolation::Linear => {
                let mut result: Fragments<V> = ranges
                    .iter()
                    .flat_map(|r| self.linear_at_range(r))
                    .collect();
                result.sort_by(|a, b| a.period().cmp(b.period()));
                result
            }
        }
    }

    fn linear_at_range(&self, range: &ValueRange) -> Fragments<V> {
        let mut result = Fragments::new();
        if self.is_instant() {
            if range.contains_value(self.first_value().to_f64()) {
                result.push(self.clone());
            }
            return result;
        }
        let segments = self.instants.len() - 1;
        for (i, pair) in self.instants.windows(2).enumerate() {
            let (lower_inc, upper_inc) = segment_bounds(i, segments, &self.period);
            result.extend(self.segment_at_range(&pair[0], &pair[1], lower_inc, upper_inc, range));
        }
        result
    }

    /// Part of one linear segment whose value lies in `range`.
    fn segment_at_range(
        &self,
        start: &TInstant<V>,
        end: &TInstant<V>,
        lower_inc: bool,
        upper_inc: bool,
        range: &ValueRange,
    ) -> Option<TSequence<V>> {
        let a = start.value().to_f64();
        let b = end.value().to_f64();
        if a == b {
            if !range.contains_value(a) {
                return None;
            }
            return self.fragment(vec![start.clone(), end.clone()], lower_inc, upper_inc);
        }

        // Value interval covered by the segment, clipped to the range
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let (clip_lo, lo_inc) = if range.lower() > lo {
            (range.lower(), range.lower_inc())
        } else {
            (lo, range.lower() < lo || range.lower_inc())
        };
        let (clip_hi, hi_inc) = if range.upper() < hi {
            (range.upper(), range.upper_inc())
        } else {
            (hi, range.upper() > hi || range.upper_inc())
        };
        if clip_lo > clip_hi || (clip_lo == clip_hi && !(lo_inc && hi_inc)) {
            return None;
        }

        // Map the clipped values back to positions along the segment
        let ratio = |x: f64| ((x - a) / (b - a)).clamp(0.0, 1.0);
        let ((v1, mut inc1), (v2, mut inc2)) = if a < b {
            ((clip_lo, lo_inc), (clip_hi, hi_inc))
        } else {
            ((clip_hi, hi_inc), (clip_lo, lo_inc))
        };
        let (r1, r2) = (ratio(v1), ratio(v2));
        if r1 == 0.0 {
            inc1 &= lower_inc;
        }
        if r2 == 1.0 {
            inc2 &= upper_inc;
        }
        let t1 = Timestamp::lerp(start.timestamp(), end.timestamp(), r1);
        let t2 = Timestamp::lerp(start.timestamp(), end.timestamp(), r2);
        let value_at = |r: f64, v: f64, inst: &TInstant<V>| {
            if r == 0.0 || r == 1.0 {
                *inst.value()
            } else {
                V::from_f64(v)
            }
        };
        let first = TInstant::new(value_at(r1, v1, if r1 == 1.0 { end } else { start }), t1);
        if t1 == t2 {
            if inc1 && inc2 {
                return Some(self.instant_fragment(*first.value(), t1));
            }
            return None;
        }
        let last = TInstant::new(value_at(r2, v2, if r2 == 0.0 { start } else { end }), t2);
        self.fragment(vec![first, last], inc1, inc2)
    }
}
