//! Bounding-box glue for R-tree style indexes over temporal numbers.
//!
//! Index entries store a [`TBox`] per temporal value. Queries are reduced to
//! a box as well, with the dimensions they do not constrain left infinite,
//! and tested against entries with the box predicates. Boxes lose bound
//! inclusivity, so every match must be rechecked against the exact value.

use crate::error::{Result, TempusError};
use crate::temporal::{TInstant, Temporal};
use crate::value::TemporalNumber;
use tempus_types::bbox::TBox;
use tempus_types::period::Period;
use tempus_types::period_set::PeriodSet;
use tempus_types::range::ValueRange;
use tempus_types::time::Timestamp;
use tempus_types::timestamp_set::TimestampSet;

/// Box operators understood by the consistency checks.
///
/// Numbers follow the R-tree strategy numbering; the time operators use the
/// numbers after the range operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Strategy {
    Left = 1,
    OverLeft = 2,
    Overlaps = 3,
    OverRight = 4,
    Right = 5,
    Same = 6,
    Contains = 7,
    ContainedBy = 8,
    OverBefore = 28,
    Before = 29,
    After = 30,
    OverAfter = 31,
}

impl TryFrom<u16> for Strategy {
    type Error = TempusError;

    fn try_from(number: u16) -> Result<Self> {
        let strategy = match number {
            1 => Strategy::Left,
            2 => Strategy::OverLeft,
            3 => Strategy::Overlaps,
            4 => Strategy::OverRight,
            5 => Strategy::Right,
            6 => Strategy::Same,
            7 => Strategy::Contains,
            8 => Strategy::ContainedBy,
            28 => Strategy::OverBefore,
            29 => Strategy::Before,
            30 => Strategy::After,
            31 => Strategy::OverAfter,
            other => {
                return Err(TempusError::UnrecognizedOperator(format!(
                    "unrecognized strategy number: {}",
                    other
                )));
            }
        };
        Ok(strategy)
    }
}

/// Right-hand side of an indexed operator.
#[derive(Debug, Clone)]
pub enum QueryOperand<'a, V: TemporalNumber> {
    Number(V),
    Range(ValueRange),
    Timestamp(Timestamp),
    TimestampSet(&'a TimestampSet),
    Period(Period),
    PeriodSet(&'a PeriodSet),
    Box(TBox),
    Temporal(&'a Temporal<V>),
}

impl<V: TemporalNumber> QueryOperand<'_, V> {
    /// Query box; unconstrained dimensions are infinite.
    pub fn to_box(&self) -> TBox {
        match self {
            QueryOperand::Number(v) => TBox::from_value(v.to_f64()),
            QueryOperand::Range(range) => TBox::from_range(range),
            QueryOperand::Timestamp(t) => TBox::from_timestamp(*t),
            QueryOperand::TimestampSet(ts) => TBox::from_timestamp_set(ts),
            QueryOperand::Period(p) => TBox::from_period(p),
            QueryOperand::PeriodSet(ps) => TBox::from_period_set(ps),
            QueryOperand::Box(bbox) => *bbox,
            QueryOperand::Temporal(temp) => temp.bbox(),
        }
    }
}

/// Outcome of a consistency check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Consistency {
    pub matches: bool,
    /// Always true: the exact operator must confirm a match.
    pub recheck: bool,
}

/// Test a leaf entry against the query.
///
/// Strict position tests are relaxed to `<=`/`>=` since a key ending where
/// the query starts may still be strictly left of it once bound inclusivity
/// is taken into account.
pub fn leaf_consistent(key: &TBox, query: &TBox, strategy: Strategy) -> bool {
    match strategy {
        Strategy::Overlaps => key.overlaps(query),
        Strategy::Contains => key.contains(query),
        Strategy::ContainedBy => key.contained(query),
        Strategy::Same => key.same(query),
        Strategy::Left => key.xmax <= query.xmin,
        Strategy::OverLeft => key.overleft(query),
        Strategy::Right => key.xmin >= query.xmax,
        Strategy::OverRight => key.overright(query),
        Strategy::Before => key.tmax <= query.tmin,
        Strategy::OverBefore => key.overbefore(query),
        Strategy::After => key.tmin >= query.tmax,
        Strategy::OverAfter => key.overafter(query),
    }
}

/// Test an internal entry: false only if no key below it can match.
pub fn internal_consistent(key: &TBox, query: &TBox, strategy: Strategy) -> bool {
    match strategy {
        Strategy::Overlaps | Strategy::ContainedBy => key.overlaps(query),
        Strategy::Contains | Strategy::Same => key.contains(query),
        Strategy::Left => !key.overright(query),
        Strategy::OverLeft => !key.right(query),
        Strategy::Right => !key.overleft(query),
        Strategy::OverRight => !key.left(query),
        Strategy::Before => !key.overafter(query),
        Strategy::OverBefore => !key.after(query),
        Strategy::After => !key.overbefore(query),
        Strategy::OverAfter => !key.before(query),
    }
}

/// Consistency check as called by the index.
///
/// A missing key or query never matches. Unknown strategy numbers are
/// reported as [`TempusError::UnrecognizedOperator`].
pub fn consistent<V: TemporalNumber>(
    key: Option<&TBox>,
    query: Option<QueryOperand<'_, V>>,
    strategy: u16,
    is_leaf: bool,
) -> Result<Consistency> {
    let strategy = Strategy::try_from(strategy)?;
    let matches = match (key, query) {
        (Some(key), Some(query)) => {
            let query = query.to_box();
            if is_leaf {
                leaf_consistent(key, &query, strategy)
            } else {
                internal_consistent(key, &query, strategy)
            }
        }
        _ => false,
    };
    log::trace!(
        "consistent: {:?} on {} entry -> {}",
        strategy,
        if is_leaf { "leaf" } else { "internal" },
        matches
    );
    Ok(Consistency {
        matches,
        recheck: true,
    })
}

/// Index key of a temporal number.
pub fn compress<V: TemporalNumber>(value: &Temporal<V>) -> TBox {
    value.bbox()
}

/// Rebuild an instant from the key of an index entry over instants.
pub fn fetch_instant<V: TemporalNumber>(key: &TBox) -> TInstant<V> {
    TInstant::new(V::from_f64(key.xmax), key.tmax)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal::{Interpolation, TSequence, TSequenceSet};

    fn t(micros: i64) -> Timestamp {
        Timestamp::from_micros(micros)
    }

    fn key() -> TBox {
        TBox::new(0.0, 10.0, t(0), t(100))
    }

    #[test]
    fn test_strategy_numbers() {
        assert_eq!(Strategy::try_from(3u16).unwrap(), Strategy::Overlaps);
        assert_eq!(Strategy::try_from(31u16).unwrap(), Strategy::OverAfter);
        assert_eq!(Strategy::Before as u16, 29);
        assert!(matches!(
            Strategy::try_from(13u16),
            Err(TempusError::UnrecognizedOperator(_))
        ));
    }

    #[test]
    fn test_leaf_relaxed_position_tests() {
        // A key ending exactly where the query starts may still be left of it
        let query = TBox::from_value(10.0);
        assert!(leaf_consistent(&key(), &query, Strategy::Left));
        assert!(!key().left(&query));

        let query = TBox::from_timestamp(t(100));
        assert!(leaf_consistent(&key(), &query, Strategy::Before));
        let query = TBox::from_timestamp(t(0));
        assert!(leaf_consistent(&key(), &query, Strategy::After));
        let query = TBox::from_value(0.0);
        assert!(leaf_consistent(&key(), &query, Strategy::Right));
    }

    #[test]
    fn test_infinite_dimensions_are_ignored() {
        let period = Period::closed(t(50), t(200)).unwrap();
        let query = TBox::from_period(&period);
        assert!(leaf_consistent(&key(), &query, Strategy::Overlaps));
        assert!(!leaf_consistent(&key(), &query, Strategy::Contains));

        let range = ValueRange::closed(2.0, 3.0).unwrap();
        let query = TBox::from_range(&range);
        assert!(leaf_consistent(&key(), &query, Strategy::Overlaps));
        assert!(!leaf_consistent(&key(), &query, Strategy::Before));
    }

    #[test]
    fn test_internal_consistent() {
        let query = TBox::new(20.0, 30.0, t(0), t(10));
        assert!(!internal_consistent(&key(), &query, Strategy::Overlaps));
        assert!(internal_consistent(&key(), &query, Strategy::Left));
        assert!(!internal_consistent(&key(), &query, Strategy::Right));
        assert!(internal_consistent(&key(), &query, Strategy::After));

        let inner = TBox::new(2.0, 3.0, t(10), t(20));
        assert!(internal_consistent(&key(), &inner, Strategy::Contains));
        assert!(internal_consistent(&key(), &inner, Strategy::Same));
        assert!(internal_consistent(&key(), &inner, Strategy::ContainedBy));
    }

    #[test]
    fn test_consistent_entry_point() {
        let result = consistent::<f64>(Some(&key()), Some(QueryOperand::Number(5.0)), 3, true).unwrap();
        assert_eq!(
            result,
            Consistency {
                matches: true,
                recheck: true
            }
        );
        let result = consistent::<f64>(None, Some(QueryOperand::Number(5.0)), 3, true).unwrap();
        assert!(!result.matches);
        assert!(result.recheck);
        let result = consistent::<f64>(Some(&key()), None, 3, false).unwrap();
        assert!(!result.matches);
        assert!(consistent::<f64>(Some(&key()), None, 99, true).is_err());

        let ts = TimestampSet::new(vec![t(150), t(300)]).unwrap();
        let result =
            consistent::<i32>(Some(&key()), Some(QueryOperand::TimestampSet(&ts)), 29, true).unwrap();
        assert!(result.matches);
    }

    #[test]
    fn test_compress_and_fetch() {
        let seq = TSequence::new(
            vec![TInstant::new(3, t(10)), TInstant::new(7, t(20))],
            true,
            true,
            Interpolation::Stepwise,
            true,
        )
        .unwrap();
        let value = Temporal::SequenceSet(TSequenceSet::from_sequence(seq));
        let bbox = compress(&value);
        assert_eq!(bbox, TBox::new(3.0, 7.0, t(10), t(20)));

        let query = QueryOperand::Temporal(&value);
        let result = consistent(Some(&key()), Some(query), 7, true).unwrap();
        assert!(result.matches);

        let instant: TInstant<i32> = fetch_instant(&TBox::from_value_at(4.0, t(5)));
        assert_eq!(instant, TInstant::new(4, t(5)));
        let instant: TInstant<f64> = fetch_instant(&TBox::from_value_at(4.5, t(5)));
        assert_eq!(*instant.value(), 4.5);
    }
}
