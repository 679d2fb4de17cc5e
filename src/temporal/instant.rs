use crate::value::{DisplayValue, TemporalValue, timestamp_hash};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use tempus_types::time::Timestamp;

/// A single value observed at a single timestamp.
#[derive(Debug, Clone)]
pub struct TInstant<V: TemporalValue> {
    value: V,
    t: Timestamp,
}

impl<V: TemporalValue> TInstant<V> {
    pub fn new(value: V, t: Timestamp) -> Self {
        Self { value, t }
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn timestamp(&self) -> Timestamp {
        self.t
    }

    pub fn into_value(self) -> V {
        self.value
    }

    pub fn bbox(&self) -> V::Box {
        self.value.make_box(self.t)
    }

    pub fn shift(&self, micros: i64) -> Self {
        Self::new(self.value.clone(), self.t.shift(micros))
    }

    /// Same timestamp, different value.
    pub fn with_value(&self, value: V) -> Self {
        Self::new(value, self.t)
    }

    pub fn hash_u32(&self) -> u32 {
        let h = self.value.value_hash();
        (h << 5).wrapping_sub(h).wrapping_add(timestamp_hash(self.t))
    }
}

impl<V: TemporalValue> PartialEq for TInstant<V> {
    fn eq(&self, other: &Self) -> bool {
        self.t == other.t && self.value.value_eq(&other.value)
    }
}

impl<V: TemporalValue> Eq for TInstant<V> {}

impl<V: TemporalValue> Ord for TInstant<V> {
    /// Value first, then timestamp.
    fn cmp(&self, other: &Self) -> Ordering {
        self.value
            .value_cmp(&other.value)
            .then_with(|| self.t.cmp(&other.t))
    }
}

impl<V: TemporalValue> PartialOrd for TInstant<V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<V: TemporalValue> Hash for TInstant<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.hash_u32());
    }
}

impl<V: TemporalValue> fmt::Display for TInstant<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", DisplayValue(&self.value), self.t)
    }
}
