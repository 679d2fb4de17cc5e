use crate::error::{Result, TempusError};
use crate::temporal::instant::TInstant;
use crate::value::TemporalValue;
use std::cmp::Ordering;
use std::fmt;
use tempus_types::bbox::BoundingBox;
use tempus_types::period::Period;
use tempus_types::time::Timestamp;

/// A discrete temporal value: instants with nothing in between.
#[derive(Debug, Clone)]
pub struct TInstantSet<V: TemporalValue> {
    instants: Vec<TInstant<V>>,
    bbox: V::Box,
}

impl<V: TemporalValue> TInstantSet<V> {
    /// Instants must be given in strictly increasing time order.
    pub fn new(instants: Vec<TInstant<V>>) -> Result<Self> {
        let Some(first) = instants.first() else {
            return Err(TempusError::InvalidInstantSet(
                "an instant set must contain at least one instant".to_string(),
            ));
        };
        for pair in instants.windows(2) {
            if pair[0].timestamp() >= pair[1].timestamp() {
                return Err(TempusError::InvalidInstantSet(format!(
                    "timestamps must be strictly increasing: {} then {}",
                    pair[0].timestamp(),
                    pair[1].timestamp()
                )));
            }
        }
        let mut bbox = first.bbox();
        for inst in &instants[1..] {
            bbox.expand(&inst.bbox());
        }
        Ok(Self { instants, bbox })
    }

    pub fn instants(&self) -> &[TInstant<V>] {
        &self.instants
    }

    pub fn count(&self) -> usize {
        self.instants.len()
    }

    pub fn instant_n(&self, n: usize) -> Option<&TInstant<V>> {
        self.instants.get(n)
    }

    pub fn bbox(&self) -> &V::Box {
        &self.bbox
    }

    pub fn timespan(&self) -> Period {
        let first = self.instants[0].timestamp();
        let last = self.instants[self.instants.len() - 1].timestamp();
        Period::instant(first).span(&Period::instant(last))
    }

    pub fn timestamps(&self) -> Vec<Timestamp> {
        self.instants.iter().map(TInstant::timestamp).collect()
    }

    pub fn value_at_timestamp(&self, t: Timestamp) -> Option<&V> {
        self.instants
            .binary_search_by(|inst| inst.timestamp().cmp(&t))
            .ok()
            .map(|i| self.instants[i].value())
    }

    pub fn at_timestamp(&self, t: Timestamp) -> Option<TInstant<V>> {
        self.value_at_timestamp(t)
            .map(|value| TInstant::new(value.clone(), t))
    }

    pub fn shift(&self, micros: i64) -> Self {
        let instants: Vec<_> = self.instants.iter().map(|i| i.shift(micros)).collect();
        let mut bbox = instants[0].bbox();
        for inst in &instants[1..] {
            bbox.expand(&inst.bbox());
        }
        Self { instants, bbox }
    }

    /// Instants at the timestamps both values are defined on.
    pub fn synchronize(&self, other: &TInstantSet<V>) -> Option<(TInstantSet<V>, TInstantSet<V>)> {
        if !self.timespan().overlaps(&other.timespan()) {
            return None;
        }
        let mut sync1 = Vec::new();
        let mut sync2 = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.instants.len() && j < other.instants.len() {
            let a = &self.instants[i];
            let b = &other.instants[j];
            match a.timestamp().cmp(&b.timestamp()) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    sync1.push(a.clone());
                    sync2.push(b.clone());
                    i += 1;
                    j += 1;
                }
            }
        }
        Some((Self::new(sync1).ok()?, Self::new(sync2).ok()?))
    }
}

impl<V: TemporalValue> PartialEq for TInstantSet<V> {
    fn eq(&self, other: &Self) -> bool {
        self.instants == other.instants
    }
}

impl<V: TemporalValue> fmt::Display for TInstantSet<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, inst) in self.instants.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", inst)?;
        }
        write!(f, "}}")
    }
}
