use crate::error::{Result, TypesError};
use crate::period::Period;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// A non-empty, strictly increasing set of timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimestampSet {
    times: Vec<Timestamp>,
}

impl TimestampSet {
    /// Build a set from arbitrary timestamps; input is sorted and deduplicated.
    pub fn new(mut times: Vec<Timestamp>) -> Result<Self> {
        if times.is_empty() {
            return Err(TypesError::InvalidTimestampSet(
                "a timestamp set must contain at least one timestamp".to_string(),
            ));
        }
        times.sort_unstable();
        times.dedup();
        Ok(Self { times })
    }

    pub fn times(&self) -> &[Timestamp] {
        &self.times
    }

    pub fn count(&self) -> usize {
        self.times.len()
    }

    pub fn time_n(&self, n: usize) -> Option<Timestamp> {
        self.times.get(n).copied()
    }

    pub fn timespan(&self) -> Period {
        Period::instant(self.times[0]).span(&Period::instant(self.times[self.times.len() - 1]))
    }

    pub fn contains(&self, t: Timestamp) -> bool {
        self.times.binary_search(&t).is_ok()
    }
}
