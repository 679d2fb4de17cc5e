use super::TSequenceSet;
use crate::temporal::instant::TInstant;
use crate::temporal::instant_set::TInstantSet;
use crate::temporal::sequence::TSequence;
use crate::value::TemporalValue;
use std::cmp::Ordering;
use tempus_types::period::cmp_upper_bounds;

impl<V: TemporalValue> TSequenceSet<V> {
    /// Align two sequence sets on the time they share.
    ///
    /// Both results hold one sequence per overlapping pair, with identical
    /// periods and timestamps. `None` when the sets never overlap in time.
    pub fn synchronize(
        &self,
        other: &TSequenceSet<V>,
        crossings: bool,
    ) -> Option<(TSequenceSet<V>, TSequenceSet<V>)> {
        if !self.timespan().overlaps(&other.timespan()) {
            log::trace!("synchronize: timespans {} and {} are disjoint", self.timespan(), other.timespan());
            return None;
        }
        let (_, mut i) = self.find_timestamp(other.start_timestamp());
        let (_, mut j) = other.find_timestamp(self.start_timestamp());

        let mut sync1 = Vec::new();
        let mut sync2 = Vec::new();
        while i < self.sequences.len() && j < other.sequences.len() {
            let a = &self.sequences[i];
            let b = &other.sequences[j];
            if let Some((sa, sb)) = a.synchronize(b, crossings) {
                sync1.push(sa);
                sync2.push(sb);
            }
            match cmp_upper_bounds(a.end_timestamp(), a.upper_inc(), b.end_timestamp(), b.upper_inc()) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
            }
        }
        log::debug!("synchronize: {} overlapping sequence pairs", sync1.len());
        Some((
            Self::from_synchronized(sync1)?,
            Self::from_synchronized(sync2)?,
        ))
    }

    /// Align with a single sequence; the second result carries its pieces.
    pub fn synchronize_sequence(
        &self,
        sequence: &TSequence<V>,
        crossings: bool,
    ) -> Option<(TSequenceSet<V>, TSequenceSet<V>)> {
        if !self.timespan().overlaps(sequence.period()) {
            return None;
        }
        let (_, start) = self.find_timestamp(sequence.start_timestamp());
        let mut sync1 = Vec::new();
        let mut sync2 = Vec::new();
        for seq in &self.sequences[start..] {
            if sequence.period().is_before(seq.period()) {
                break;
            }
            if let Some((sa, sb)) = seq.synchronize(sequence, crossings) {
                sync1.push(sa);
                sync2.push(sb);
            }
        }
        Some((
            Self::from_synchronized(sync1)?,
            Self::from_synchronized(sync2)?,
        ))
    }

    /// Own value at the instant's timestamp paired with the instant.
    pub fn synchronize_instant(&self, instant: &TInstant<V>) -> Option<(TInstant<V>, TInstant<V>)> {
        let own = self.at_timestamp(instant.timestamp())?;
        Some((own, instant.clone()))
    }

    /// Instants at the timestamps of `instants` that fall inside the set.
    pub fn synchronize_instant_set(
        &self,
        instants: &TInstantSet<V>,
    ) -> Option<(TInstantSet<V>, TInstantSet<V>)> {
        let mut sync1 = Vec::new();
        let mut sync2 = Vec::new();
        let mut from = 0;
        for inst in instants.instants() {
            let t = inst.timestamp();
            let (found, idx) = self.find_timestamp_from(from, t);
            from = idx;
            if idx >= self.sequences.len() {
                break;
            }
            if found {
                if let Some(own) = self.sequences[idx].at_timestamp(t) {
                    sync1.push(own);
                    sync2.push(inst.clone());
                }
            }
        }
        Some((TInstantSet::new(sync1).ok()?, TInstantSet::new(sync2).ok()?))
    }
}
