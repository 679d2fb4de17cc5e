//! Property-based tests for sequence sets.
//!
//! Generated sets are built from per-sequence shapes: a gap (in multiples of
//! the instant spacing) after the previous sequence, the values of its
//! instants, and its bounds. Stepwise sets hold integers and are checked
//! exactly. Linear sets hold small whole floats spaced 60 microseconds apart,
//! so every whole value is crossed on a whole microsecond.

use proptest::prelude::*;
use tempus::codec;
use tempus::prelude::*;

const STEP: i64 = 3;
const LINEAR_STEP: i64 = 60;
const TOLERANCE: f64 = 1e-9;

type SequenceShape = (i64, Vec<i32>, bool, bool);

fn t(micros: i64) -> Timestamp {
    Timestamp::from_micros(micros)
}

fn build_sequences(shapes: &[SequenceShape]) -> Vec<TSequence<i32>> {
    build_spaced(shapes, STEP, Interpolation::Stepwise)
}

fn build_spaced<V: TemporalValue + From<i32>>(
    shapes: &[SequenceShape],
    spacing: i64,
    interpolation: Interpolation,
) -> Vec<TSequence<V>> {
    let mut sequences: Vec<TSequence<V>> = Vec::with_capacity(shapes.len());
    let mut cursor = 0i64;
    for (gap, values, lower_inc, upper_inc) in shapes {
        let (lower_inc, upper_inc) = if values.len() == 1 {
            (true, true)
        } else {
            (*lower_inc, *upper_inc)
        };
        let mut start = cursor + gap * spacing;
        if let Some(prev) = sequences.last()
            && prev.end_timestamp().as_micros() == start
            && prev.upper_inc()
            && lower_inc
        {
            start += 1;
        }
        let instants: Vec<TInstant<V>> = values
            .iter()
            .enumerate()
            .map(|(k, v)| TInstant::new(V::from(*v), t(start + k as i64 * spacing)))
            .collect();
        cursor = start + (values.len() as i64 - 1) * spacing;
        sequences.push(
            TSequence::new(instants, lower_inc, upper_inc, interpolation, true)
                .expect("generated sequence is valid"),
        );
    }
    sequences
}

fn sequence_shapes() -> impl Strategy<Value = Vec<SequenceShape>> {
    prop::collection::vec(
        (
            0i64..4,
            prop::collection::vec(-3i32..3, 1..5),
            any::<bool>(),
            any::<bool>(),
        ),
        1..6,
    )
}

fn sequence_set() -> impl Strategy<Value = TSequenceSet<i32>> {
    sequence_shapes().prop_map(|shapes| {
        TSequenceSet::from_sequences(build_sequences(&shapes), true)
            .expect("generated sequences are disjoint")
    })
}

fn linear_set() -> impl Strategy<Value = TSequenceSet<f64>> {
    sequence_shapes().prop_map(|shapes| {
        TSequenceSet::from_sequences(build_spaced(&shapes, LINEAR_STEP, Interpolation::Linear), true)
            .expect("generated sequences are disjoint")
    })
}

fn period() -> impl Strategy<Value = Period> {
    (-2i64..60, 0i64..20, any::<bool>(), any::<bool>()).prop_map(|(lower, len, lo, hi)| {
        let (lo, hi) = if len == 0 { (true, true) } else { (lo, hi) };
        Period::new(t(lower), t(lower + len), lo, hi).expect("generated period is valid")
    })
}

fn value_range() -> impl Strategy<Value = ValueRange> {
    (-4i32..4, 0i32..4, any::<bool>(), any::<bool>()).prop_map(|(lower, len, lo, hi)| {
        let (lo, hi) = if len == 0 { (true, true) } else { (lo, hi) };
        ValueRange::new(lower as f64, (lower + len) as f64, lo, hi)
            .expect("generated range is valid")
    })
}

/// Every timestamp around `s` is covered by exactly one side, with the value
/// `s` has there, and neither side is defined where `s` is not.
fn assert_partition(
    s: &TSequenceSet<i32>,
    at: impl Fn(Timestamp) -> Option<i32>,
    minus: impl Fn(Timestamp) -> Option<i32>,
) {
    let from = s.start_timestamp().as_micros() - 1;
    let to = s.end_timestamp().as_micros() + 1;
    for micros in from..=to {
        let ts = t(micros);
        let expected = s.value_at_timestamp(ts);
        let (a, m) = (at(ts), minus(ts));
        match expected {
            None => assert!(a.is_none() && m.is_none(), "restriction defined outside {} at {}", s, micros),
            Some(v) => {
                assert!(a.is_some() != m.is_some(), "{} at {}: at={:?} minus={:?}", s, micros, a, m);
                assert_eq!(a.or(m), Some(v), "{} at {}", s, micros);
            }
        }
    }
}

/// Float counterpart of [`assert_partition`], comparing values within
/// [`TOLERANCE`].
fn assert_partition_linear(
    s: &TSequenceSet<f64>,
    at: &Option<TSequenceSet<f64>>,
    minus: &Option<TSequenceSet<f64>>,
) {
    let from = s.start_timestamp().as_micros() - 1;
    let to = s.end_timestamp().as_micros() + 1;
    for micros in from..=to {
        let ts = t(micros);
        let (a, m) = (value_of(at)(ts), value_of(minus)(ts));
        match s.value_at_timestamp(ts) {
            None => assert!(a.is_none() && m.is_none(), "restriction defined outside {} at {}", s, micros),
            Some(v) => {
                assert!(a.is_some() != m.is_some(), "{} at {}: at={:?} minus={:?}", s, micros, a, m);
                let got = a.or(m).unwrap_or(f64::NAN);
                assert!((got - v).abs() < TOLERANCE, "{} at {}: {} != {}", s, micros, got, v);
            }
        }
    }
}

fn value_of<V: TemporalValue>(set: &Option<TSequenceSet<V>>) -> impl Fn(Timestamp) -> Option<V> + '_ {
    move |ts| set.as_ref().and_then(|s| s.value_at_timestamp(ts))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_codec_round_trip(s in sequence_set()) {
        let bytes = codec::encode(&s);
        let decoded: TSequenceSet<i32> = codec::decode(&bytes).expect("encoded set decodes");
        prop_assert_eq!(&decoded, &s);
        prop_assert_eq!(codec::encode(&decoded), bytes);
        prop_assert_eq!(decoded.hash_u32(), s.hash_u32());
    }

    #[test]
    fn prop_normalization_ignores_input_order(shapes in sequence_shapes()) {
        let sequences = build_sequences(&shapes);
        let forward = TSequenceSet::from_sequences(sequences.clone(), true).expect("valid input");
        let mut reversed = sequences;
        reversed.reverse();
        let backward = TSequenceSet::from_sequences(reversed, true).expect("valid input");
        prop_assert_eq!(&forward, &backward);

        // Normalized output never holds two sequences that could merge
        for pair in forward.sequences().windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            let mergeable = prev.end_timestamp() == next.start_timestamp()
                && prev.upper_inc() != next.lower_inc()
                && prev.last_value() == next.first_value();
            prop_assert!(!mergeable, "{} and {} should have merged", prev, next);
        }
    }

    #[test]
    fn prop_find_timestamp_matches_linear_scan(s in sequence_set(), offset in -2i64..70) {
        let ts = t(offset);
        let expected = match s.sequences().iter().position(|seq| seq.period().contains_timestamp(ts)) {
            Some(i) => (true, i),
            None => (false, s.sequences().iter().filter(|seq| seq.start_timestamp() < ts).count()),
        };
        prop_assert_eq!(s.find_timestamp(ts), expected);
        prop_assert_eq!(s.intersects_timestamp(ts), expected.0);
    }

    #[test]
    fn prop_synchronize_is_symmetric(a in sequence_set(), b in sequence_set()) {
        match (a.synchronize(&b, true), b.synchronize(&a, true)) {
            (Some((sa, sb)), Some((sb2, sa2))) => {
                prop_assert_eq!(&sa, &sa2);
                prop_assert_eq!(&sb, &sb2);
                prop_assert_eq!(sa.timestamps(), sb.timestamps());
                for (x, y) in sa.sequences().iter().zip(sb.sequences()) {
                    prop_assert_eq!(x.period(), y.period());
                }
            }
            (None, None) => prop_assert!(a.intersection_time(&b).is_none()),
            other => prop_assert!(false, "asymmetric result {:?}", other),
        }
    }

    #[test]
    fn prop_value_restrictions_partition(s in sequence_set(), value in -3i32..3) {
        let at = s.at_value(&value);
        let minus = s.minus_value(&value);
        if let Some(at) = &at {
            prop_assert!(at.always_equals(&value));
        }
        assert_partition(&s, value_of(&at), value_of(&minus));

        let values = [value, value + 2];
        assert_partition(&s, value_of(&s.at_values(&values)), value_of(&s.minus_values(&values)));
    }

    #[test]
    fn prop_range_restrictions_partition(s in sequence_set(), range in value_range()) {
        assert_partition(&s, value_of(&s.at_range(&range)), value_of(&s.minus_range(&range)));
    }

    #[test]
    fn prop_ranges_restrictions_partition(
        s in sequence_set(),
        ranges in prop::collection::vec(value_range(), 1..4),
    ) {
        let at = s.at_ranges(&ranges);
        if let Some(at) = &at {
            for v in at.values() {
                prop_assert!(ranges.iter().any(|r| r.contains_value(f64::from(v))), "{} outside {:?}", v, ranges);
            }
        }
        assert_partition(&s, value_of(&at), value_of(&s.minus_ranges(&ranges)));
    }

    #[test]
    fn prop_linear_range_restrictions_partition(
        s in linear_set(),
        range in value_range(),
        ranges in prop::collection::vec(value_range(), 1..4),
    ) {
        let at = s.at_range(&range);
        if let Some(at) = &at {
            let extent = at.value_range().expect("floats have a range");
            prop_assert!(extent.lower() >= range.lower() - TOLERANCE);
            prop_assert!(extent.upper() <= range.upper() + TOLERANCE);
        }
        assert_partition_linear(&s, &at, &s.minus_range(&range));
        assert_partition_linear(&s, &s.at_ranges(&ranges), &s.minus_ranges(&ranges));
    }

    #[test]
    fn prop_linear_value_restrictions_partition(s in linear_set(), value in -3i32..3) {
        let value = f64::from(value);
        let at = s.at_value(&value);
        if let Some(at) = &at {
            prop_assert!(at.always_equals(&value));
        }
        assert_partition_linear(&s, &at, &s.minus_value(&value));

        let values = [value, value + 2.0, value - 3.0];
        assert_partition_linear(&s, &s.at_values(&values), &s.minus_values(&values));
    }

    #[test]
    fn prop_linear_synchronize_is_symmetric(a in linear_set(), b in linear_set()) {
        match (a.synchronize(&b, true), b.synchronize(&a, true)) {
            (Some((sa, sb)), Some((sb2, sa2))) => {
                prop_assert_eq!(&sa, &sa2);
                prop_assert_eq!(&sb, &sb2);
                prop_assert_eq!(sa.timestamps(), sb.timestamps());
                for ts in sa.timestamps() {
                    let (x, y) = (sa.value_at_timestamp(ts), a.value_at_timestamp(ts));
                    prop_assert!(matches!((x, y), (Some(x), Some(y)) if (x - y).abs() < TOLERANCE));
                }
            }
            (None, None) => prop_assert!(a.intersection_time(&b).is_none()),
            other => prop_assert!(false, "asymmetric result {:?}", other),
        }
    }

    #[test]
    fn prop_period_restrictions_partition(s in sequence_set(), period in period()) {
        let at = s.at_period(&period);
        if let Some(at) = &at {
            prop_assert!(period.contains_period(&at.timespan()));
        }
        assert_partition(&s, value_of(&at), value_of(&s.minus_period(&period)));
    }

    #[test]
    fn prop_period_set_restrictions_partition(
        s in sequence_set(),
        periods in prop::collection::vec(period(), 1..4),
    ) {
        let ps = PeriodSet::new(periods, true).expect("non-empty input");
        assert_partition(&s, value_of(&s.at_period_set(&ps)), value_of(&s.minus_period_set(&ps)));
    }

    #[test]
    fn prop_timestamp_restrictions_partition(
        s in sequence_set(),
        offsets in prop::collection::vec(-2i64..60, 1..5),
    ) {
        let ts = t(offsets[0]);
        let at = s.at_timestamp(ts);
        let minus = s.minus_timestamp(ts);
        assert_partition(
            &s,
            |x| at.as_ref().filter(|i| i.timestamp() == x).map(|i| *i.value()),
            value_of(&minus),
        );

        let set = TimestampSet::new(offsets.into_iter().map(t).collect()).expect("non-empty input");
        let at = s.at_timestamp_set(&set);
        let minus = s.minus_timestamp_set(&set);
        assert_partition(
            &s,
            |x| at.as_ref().and_then(|i| i.value_at_timestamp(x).copied()),
            value_of(&minus),
        );
    }
}
