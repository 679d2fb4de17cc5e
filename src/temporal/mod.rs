//! Temporal values and the four shapes they come in.
//!
//! | Shape | Type | Defined on |
//! |-------|------|------------|
//! | instant | [`TInstant`] | one timestamp |
//! | instant set | [`TInstantSet`] | finitely many timestamps |
//! | sequence | [`TSequence`] | one period |
//! | sequence set | [`TSequenceSet`] | disjoint periods |
//!
//! [`Temporal`] erases the shape when operands of different shapes meet.

pub mod instant;
pub mod instant_set;
pub mod sequence;
pub mod sequence_set;

pub use instant::TInstant;
pub use instant_set::TInstantSet;
pub use sequence::{Fragments, TSequence};
pub use sequence_set::TSequenceSet;

use crate::config::Config;
use crate::value::TemporalValue;
use serde::{Deserialize, Serialize};
use tempus_types::period::Period;
use tempus_types::period_set::PeriodSet;

/// How values evolve between two consecutive instants.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// Value holds until the next instant.
    #[default]
    Stepwise,
    /// Value moves linearly towards the next instant.
    Linear,
}

impl Interpolation {
    /// Linear for continuous value types, stepwise otherwise.
    pub fn default_for<V: TemporalValue>() -> Self {
        if V::CONTINUOUS {
            Interpolation::Linear
        } else {
            Interpolation::Stepwise
        }
    }

    pub const fn to_u8(self) -> u8 {
        match self {
            Interpolation::Stepwise => 0,
            Interpolation::Linear => 1,
        }
    }

    pub const fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Interpolation::Stepwise),
            1 => Some(Interpolation::Linear),
            _ => None,
        }
    }
}

/// A temporal value of any shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Temporal<V: TemporalValue> {
    Instant(TInstant<V>),
    InstantSet(TInstantSet<V>),
    Sequence(TSequence<V>),
    SequenceSet(TSequenceSet<V>),
}

impl<V: TemporalValue> Temporal<V> {
    pub fn bbox(&self) -> V::Box {
        match self {
            Temporal::Instant(i) => i.bbox(),
            Temporal::InstantSet(is) => is.bbox().clone(),
            Temporal::Sequence(s) => s.bbox().clone(),
            Temporal::SequenceSet(ss) => ss.bbox().clone(),
        }
    }

    pub fn timespan(&self) -> Period {
        match self {
            Temporal::Instant(i) => Period::instant(i.timestamp()),
            Temporal::InstantSet(is) => is.timespan(),
            Temporal::Sequence(s) => *s.period(),
            Temporal::SequenceSet(ss) => ss.timespan(),
        }
    }

    /// Periods on which the value is defined.
    pub fn time(&self) -> PeriodSet {
        match self {
            Temporal::Instant(i) => PeriodSet::from_period(Period::instant(i.timestamp())),
            Temporal::InstantSet(is) => {
                let mut periods = is.timestamps().into_iter().map(Period::instant);
                let first = periods.next().unwrap_or_else(|| is.timespan());
                PeriodSet::from_ordered(first, periods)
            }
            Temporal::Sequence(s) => PeriodSet::from_period(*s.period()),
            Temporal::SequenceSet(ss) => ss.time(),
        }
    }

    /// The value as a sequence set; instants become single-instant sequences.
    pub fn to_sequence_set(&self) -> TSequenceSet<V> {
        let interpolation = Interpolation::default_for::<V>();
        match self {
            Temporal::Instant(i) => TSequenceSet::from(i.clone()),
            Temporal::InstantSet(is) => TSequenceSet::from_instant_set(is, interpolation),
            Temporal::Sequence(s) => TSequenceSet::from_sequence(s.clone()),
            Temporal::SequenceSet(ss) => ss.clone(),
        }
    }

    /// Align two temporal values of any shape on their common time.
    ///
    /// The results keep the shapes a pairwise synchronization produces:
    /// instants when either side is an instant, instant sets when either side
    /// is an instant set, and sequence sets when either side is a set.
    pub fn synchronize(&self, other: &Temporal<V>, crossings: bool) -> Option<(Temporal<V>, Temporal<V>)> {
        use Temporal::*;
        let pair = match (self, other) {
            (Instant(a), Instant(b)) => {
                if a.timestamp() != b.timestamp() {
                    return None;
                }
                (Instant(a.clone()), Instant(b.clone()))
            }
            (Instant(a), InstantSet(b)) => (Instant(a.clone()), Instant(b.at_timestamp(a.timestamp())?)),
            (Instant(a), Sequence(b)) => {
                let (own, inst) = b.synchronize_instant(a)?;
                (Instant(inst), Instant(own))
            }
            (Instant(a), SequenceSet(b)) => {
                let (own, inst) = b.synchronize_instant(a)?;
                (Instant(inst), Instant(own))
            }
            (InstantSet(a), InstantSet(b)) => {
                let (sa, sb) = a.synchronize(b)?;
                (InstantSet(sa), InstantSet(sb))
            }
            (InstantSet(a), Sequence(b)) => {
                let (sa, sb) = synchronize_instants_with_sequence(a, b)?;
                (InstantSet(sa), InstantSet(sb))
            }
            (InstantSet(a), SequenceSet(b)) => {
                let (own, instants) = b.synchronize_instant_set(a)?;
                (InstantSet(instants), InstantSet(own))
            }
            (Sequence(a), Sequence(b)) => {
                let (sa, sb) = a.synchronize(b, crossings)?;
                (Sequence(sa), Sequence(sb))
            }
            (Sequence(a), SequenceSet(b)) => {
                let (own, pieces) = b.synchronize_sequence(a, crossings)?;
                (SequenceSet(pieces), SequenceSet(own))
            }
            (SequenceSet(a), SequenceSet(b)) => {
                let (sa, sb) = a.synchronize(b, crossings)?;
                (SequenceSet(sa), SequenceSet(sb))
            }
            _ => {
                let (b, a) = other.synchronize(self, crossings)?;
                (a, b)
            }
        };
        Some(pair)
    }

    /// [`synchronize`](Self::synchronize) with crossings taken from `config`.
    pub fn synchronize_with_config(
        &self,
        other: &Temporal<V>,
        config: &Config,
    ) -> Option<(Temporal<V>, Temporal<V>)> {
        self.synchronize(other, config.crossings)
    }
}

fn synchronize_instants_with_sequence<V: TemporalValue>(
    instants: &TInstantSet<V>,
    sequence: &TSequence<V>,
) -> Option<(TInstantSet<V>, TInstantSet<V>)> {
    let (sync1, sync2): (Vec<_>, Vec<_>) = instants
        .instants()
        .iter()
        .filter_map(|inst| {
            let (own, inst) = sequence.synchronize_instant(inst)?;
            Some((inst, own))
        })
        .unzip();
    Some((TInstantSet::new(sync1).ok()?, TInstantSet::new(sync2).ok()?))
}

impl<V: TemporalValue> From<TInstant<V>> for Temporal<V> {
    fn from(value: TInstant<V>) -> Self {
        Temporal::Instant(value)
    }
}

impl<V: TemporalValue> From<TInstantSet<V>> for Temporal<V> {
    fn from(value: TInstantSet<V>) -> Self {
        Temporal::InstantSet(value)
    }
}

impl<V: TemporalValue> From<TSequence<V>> for Temporal<V> {
    fn from(value: TSequence<V>) -> Self {
        Temporal::Sequence(value)
    }
}

impl<V: TemporalValue> From<TSequenceSet<V>> for Temporal<V> {
    fn from(value: TSequenceSet<V>) -> Self {
        Temporal::SequenceSet(value)
    }
}
