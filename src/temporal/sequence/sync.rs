use super::TSequence;
use crate::temporal::Interpolation;
use crate::temporal::instant::TInstant;
use crate::value::TemporalValue;
use tempus_types::time::Timestamp;

impl<V: TemporalValue> TSequence<V> {
    /// Align two sequences on their common period.
    ///
    /// Every instant of either operand inside the common period becomes an
    /// instant of both results. With `crossings`, when both sequences are
    /// linear, the timestamps at which their values meet strictly inside a
    /// segment are added as well.
    pub fn synchronize(
        &self,
        other: &TSequence<V>,
        crossings: bool,
    ) -> Option<(TSequence<V>, TSequence<V>)> {
        let inter = self.period.intersection(&other.period)?;
        if inter.is_instant() {
            let t = inter.lower();
            let a = TInstant::new(self.value_at_inclusive(t)?, t);
            let b = TInstant::new(other.value_at_inclusive(t)?, t);
            return Some((
                TSequence::from_instant(a, self.interpolation),
                TSequence::from_instant(b, other.interpolation),
            ));
        }

        let mut times = Vec::with_capacity(self.instants.len() + other.instants.len());
        times.push(inter.lower());
        let inside = |i: &TInstant<V>| i.timestamp() > inter.lower() && i.timestamp() < inter.upper();
        let (mut i, mut j) = (0, 0);
        let (left, right) = (&self.instants, &other.instants);
        while i < left.len() || j < right.len() {
            let next = match (left.get(i), right.get(j)) {
                (Some(a), Some(b)) if a.timestamp() == b.timestamp() => {
                    i += 1;
                    j += 1;
                    a
                }
                (Some(a), Some(b)) if a.timestamp() < b.timestamp() => {
                    i += 1;
                    a
                }
                (Some(a), None) => {
                    i += 1;
                    a
                }
                (_, Some(b)) => {
                    j += 1;
                    b
                }
                (None, None) => break,
            };
            if inside(next) {
                times.push(next.timestamp());
            }
        }
        times.push(inter.upper());

        let with_crossings = crossings
            && self.interpolation == Interpolation::Linear
            && other.interpolation == Interpolation::Linear;

        let mut sync1 = Vec::with_capacity(times.len());
        let mut sync2 = Vec::with_capacity(times.len());
        for (k, &t) in times.iter().enumerate() {
            if with_crossings && k > 0 {
                if let Some(tc) = self.crossing_between(other, times[k - 1], t) {
                    sync1.push(TInstant::new(self.value_at_inclusive(tc)?, tc));
                    sync2.push(TInstant::new(other.value_at_inclusive(tc)?, tc));
                }
            }
            sync1.push(TInstant::new(self.value_at_inclusive(t)?, t));
            sync2.push(TInstant::new(other.value_at_inclusive(t)?, t));
        }

        Some((
            TSequence::from_parts(sync1, inter, self.interpolation, false),
            TSequence::from_parts(sync2, inter, other.interpolation, false),
        ))
    }

    /// Timestamp strictly inside `(t1, t2)` where both linear values meet.
    fn crossing_between(
        &self,
        other: &TSequence<V>,
        t1: Timestamp,
        t2: Timestamp,
    ) -> Option<Timestamp> {
        let a1 = self.value_at_inclusive(t1)?;
        let a2 = self.value_at_inclusive(t2)?;
        let b1 = other.value_at_inclusive(t1)?;
        let b2 = other.value_at_inclusive(t2)?;
        let ratio = V::crossing(&a1, &a2, &b1, &b2)?;
        let tc = Timestamp::lerp(t1, t2, ratio);
        (tc > t1 && tc < t2).then_some(tc)
    }

    /// Values of both at the instant's timestamp, if the sequence covers it.
    pub fn synchronize_instant(&self, instant: &TInstant<V>) -> Option<(TInstant<V>, TInstant<V>)> {
        let own = self.at_timestamp(instant.timestamp())?;
        Some((own, instant.clone()))
    }
}
