use tempus::index::{self, QueryOperand, Strategy};
use tempus::prelude::*;
use tempus::codec;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn t(micros: i64) -> Timestamp {
    Timestamp::from_micros(micros)
}

fn step(values: &[(i32, i64)], lower_inc: bool, upper_inc: bool) -> TSequence<i32> {
    let instants = values.iter().map(|&(v, ts)| TInstant::new(v, t(ts))).collect();
    TSequence::new(instants, lower_inc, upper_inc, Interpolation::Stepwise, true)
        .expect("valid stepwise sequence")
}

fn lin(values: &[(f64, i64)], lower_inc: bool, upper_inc: bool) -> TSequence<f64> {
    let instants = values.iter().map(|&(v, ts)| TInstant::new(v, t(ts))).collect();
    TSequence::new(instants, lower_inc, upper_inc, Interpolation::Linear, true)
        .expect("valid linear sequence")
}

/// Every timestamp in and around `s` is covered by exactly one of `at` and
/// `minus`, with the value `s` has there.
fn assert_partition_f64(s: &TSequenceSet<f64>, at: Option<&TSequenceSet<f64>>, minus: Option<&TSequenceSet<f64>>) {
    let from = s.start_timestamp().as_micros() - 2;
    let to = s.end_timestamp().as_micros() + 2;
    for micros in from..=to {
        let ts = t(micros);
        let sv = s.value_at_timestamp(ts);
        let av = at.and_then(|a| a.value_at_timestamp(ts));
        let mv = minus.and_then(|m| m.value_at_timestamp(ts));
        match sv {
            None => assert!(av.is_none() && mv.is_none(), "defined outside at {}", micros),
            Some(v) => {
                let got = match (av, mv) {
                    (Some(a), None) => a,
                    (None, Some(m)) => m,
                    other => panic!("at {} expected exactly one side, got {:?}", micros, other),
                };
                assert!((got - v).abs() < 1e-9, "at {}: {} != {}", micros, got, v);
            }
        }
    }
}

#[test]
fn test_merge_both_inclusive_rejected() {
    init_logging();
    let result = TSequenceSet::from_sequences(
        vec![step(&[(1, 10), (1, 20)], true, true), step(&[(1, 20), (1, 30)], true, false)],
        true,
    );
    assert!(matches!(result, Err(TempusError::InvalidSequenceSet(_))));
}

#[test]
fn test_merge_exclusive_then_inclusive() {
    init_logging();
    let set = TSequenceSet::from_sequences(
        vec![
            step(&[(1, 10), (1, 20)], true, false),
            step(&[(1, 20), (1, 30)], true, false),
            step(&[(1, 30), (1, 40)], false, true),
        ],
        true,
    )
    .expect("valid input");
    assert_eq!(set.count(), 2);
    assert_eq!(set.to_string(), "{[1@10, 1@30), (1@30, 1@40]}");
}

#[test]
fn test_merge_inclusive_then_exclusive() {
    let set = TSequenceSet::from_sequences(
        vec![step(&[(1, 20), (1, 30)], true, true), step(&[(1, 30), (1, 40)], false, true)],
        true,
    )
    .expect("valid input");
    assert_eq!(set.count(), 1);
    assert_eq!(set.to_string(), "{[1@20, 1@40]}");
}

#[test]
fn test_no_merge_on_value_jump() {
    let set = TSequenceSet::from_sequences(
        vec![step(&[(1, 10), (1, 20)], true, false), step(&[(2, 20), (2, 30)], true, false)],
        true,
    )
    .expect("valid input");
    assert_eq!(set.count(), 2);
    assert!(set.continuous_time());
    assert!(!set.continuous_value());
}

#[test]
fn test_find_timestamp_example() {
    let set = TSequenceSet::from_sequences(
        vec![
            step(&[(1, 0), (1, 10)], true, true),
            step(&[(1, 20), (1, 30)], true, true),
            step(&[(1, 40), (1, 50)], true, true),
        ],
        true,
    )
    .expect("valid input");
    assert_eq!(set.find_timestamp(t(15)), (false, 1));
    assert_eq!(set.find_timestamp(t(25)), (true, 1));
    assert!(!set.intersects_timestamp(t(15)));
    assert_eq!(set.value_at_timestamp(t(15)), None);
}

#[test]
fn test_synchronize_and_compare() {
    init_logging();
    let a = TSequenceSet::from_sequences(
        vec![lin(&[(0.0, 0), (20.0, 20)], true, true), lin(&[(5.0, 30), (5.0, 40)], true, true)],
        true,
    )
    .expect("valid input");
    let b = TSequenceSet::from_sequences(vec![lin(&[(20.0, 0), (0.0, 20)], true, false)], true)
        .expect("valid input");

    let (sa, sb) = a.synchronize(&b, true).expect("overlapping");
    assert_eq!(sa.timestamps(), vec![t(0), t(10), t(20)]);
    assert_eq!(sa.timestamps(), sb.timestamps());
    assert_eq!(sa.value_at_timestamp(t(10)), sb.value_at_timestamp(t(10)));
    assert!(!sa.sequences()[0].upper_inc());

    let config = Config::default().with_crossings(false);
    let (ta, _) = Temporal::from(a.clone())
        .synchronize_with_config(&Temporal::from(b.clone()), &config)
        .expect("overlapping");
    match ta {
        Temporal::SequenceSet(set) => assert_eq!(set.num_instants(), 2),
        other => panic!("unexpected shape {:?}", other),
    }
}

#[test]
fn test_restriction_partition() {
    let s = TSequenceSet::from_sequences(
        vec![
            lin(&[(0.0, 0), (10.0, 10), (4.0, 16)], true, false),
            lin(&[(4.0, 20), (4.0, 25)], false, true),
            lin(&[(8.0, 30), (0.0, 38)], true, true),
        ],
        true,
    )
    .expect("valid input");

    let at = s.at_value(&4.0);
    let minus = s.minus_value(&4.0);
    assert_partition_f64(&s, at.as_ref(), minus.as_ref());

    let range = ValueRange::new(2.0, 8.0, true, false).expect("valid range");
    assert_partition_f64(&s, s.at_range(&range).as_ref(), s.minus_range(&range).as_ref());

    let period = Period::new(t(5), t(32), false, true).expect("valid period");
    assert_partition_f64(&s, s.at_period(&period).as_ref(), s.minus_period(&period).as_ref());

    let ps = PeriodSet::new(
        vec![
            Period::closed(t(2), t(4)).expect("valid period"),
            Period::new(t(14), t(22), true, false).expect("valid period"),
        ],
        true,
    )
    .expect("valid period set");
    assert_partition_f64(&s, s.at_period_set(&ps).as_ref(), s.minus_period_set(&ps).as_ref());

    let minus = s.minus_timestamp(t(10));
    let at = s.at_timestamp(t(10)).map(TSequenceSet::from);
    assert_partition_f64(&s, at.as_ref(), minus.as_ref());
}

#[test]
fn test_codec_round_trip_and_errors() {
    let set = TSequenceSet::from_sequences(
        vec![step(&[(3, 0), (5, 10), (4, 20)], true, false), step(&[(7, 30)], true, true)],
        true,
    )
    .expect("valid input");
    let bytes = codec::encode(&set);
    let decoded: TSequenceSet<i32> = codec::decode(&bytes).expect("decodes");
    assert_eq!(decoded, set);
    assert_eq!(decoded.hash_u32(), set.hash_u32());
    assert_eq!(codec::encode(&decoded), bytes);

    assert!(matches!(
        codec::decode::<i32>(&bytes[..bytes.len() - 2]),
        Err(TempusError::UnexpectedEof)
    ));
    let config = Config::default().with_max_sequences(1);
    assert!(matches!(
        codec::decode_with_config::<i32>(&bytes, &config),
        Err(TempusError::InvalidInput(_))
    ));
}

#[test]
fn test_index_round_trip() {
    let set = TSequenceSet::from_sequences(
        vec![lin(&[(1.0, 100), (3.0, 200)], true, true), lin(&[(9.0, 300), (7.0, 400)], true, true)],
        true,
    )
    .expect("valid input");
    let value = Temporal::from(set);
    let key = index::compress(&value);
    assert_eq!(key, TBox::new(1.0, 9.0, t(100), t(400)));

    let overlapping = index::consistent(
        Some(&key),
        Some(QueryOperand::<f64>::Period(Period::closed(t(250), t(260)).expect("valid period"))),
        Strategy::Overlaps as u16,
        true,
    )
    .expect("known strategy");
    assert!(overlapping.matches);
    assert!(overlapping.recheck);

    // The box overlaps the gap; only the exact check can tell
    assert!(!value.to_sequence_set().intersects_period(&Period::closed(t(250), t(260)).expect("valid period")));

    let after = index::consistent(
        Some(&key),
        Some(QueryOperand::Number(10.0)),
        Strategy::Left as u16,
        false,
    )
    .expect("known strategy");
    assert!(after.matches);

    assert!(matches!(
        index::consistent::<f64>(Some(&key), None, 0, true),
        Err(TempusError::UnrecognizedOperator(_))
    ));
}

#[test]
fn test_text_values() {
    let set = TSequenceSet::from_sequences(
        vec![TSequence::new(
            vec![
                TInstant::new("idle".to_string(), t(0)),
                TInstant::new("busy".to_string(), t(10)),
                TInstant::new("idle".to_string(), t(20)),
            ],
            true,
            true,
            Interpolation::Stepwise,
            true,
        )
        .expect("valid sequence")],
        true,
    )
    .expect("valid input");
    assert_eq!(set.values(), vec!["busy".to_string(), "idle".to_string()]);
    let idle = set.at_value(&"idle".to_string()).expect("idle at some point");
    assert_eq!(idle.count(), 2);
    assert!(matches!(set.value_range(), Err(TempusError::UnsupportedOperation(_))));
    assert!(
        TSequence::new(
            vec![TInstant::new("a".to_string(), t(0)), TInstant::new("b".to_string(), t(1))],
            true,
            true,
            Interpolation::Linear,
            true,
        )
        .is_err()
    );
}

#[test]
fn test_wide_timestamp_span() {
    const FAR: i64 = 5_000_000_000_000_000_000;
    let up = TSequenceSet::from_sequence(lin(&[(0.0, -FAR), (10.0, FAR)], true, true));
    let down = TSequenceSet::from_sequence(lin(&[(10.0, -FAR), (0.0, FAR)], true, true));

    let at = up.at_value(&5.0).expect("5 is crossed");
    assert_eq!(at.timestamps(), vec![t(0)]);
    assert_eq!(up.value_at_timestamp(t(0)), Some(5.0));

    let range = ValueRange::closed(2.0, 8.0).expect("valid range");
    let at = up.at_range(&range).expect("range is crossed");
    assert_eq!(at.count(), 1);
    assert!(at.start_timestamp() > t(-FAR) && at.end_timestamp() < t(FAR));

    let (sa, sb) = up.synchronize(&down, true).expect("overlapping");
    assert_eq!(sa.timestamps(), vec![t(-FAR), t(0), t(FAR)]);
    assert_eq!(sa.timestamps(), sb.timestamps());
    assert!((up.twavg() - 5.0).abs() < 1e-9);

    let long = TSequenceSet::from_sequences(
        vec![
            lin(&[(1.0, -FAR), (1.0, -1_000_000_000_000_000_000)], true, true),
            lin(&[(1.0, 0), (1.0, 6_000_000_000_000_000_000)], true, true),
        ],
        true,
    )
    .expect("valid input");
    assert_eq!(long.duration(), i64::MAX);
}

#[test]
fn test_signed_zero_values() {
    let negative = TSequenceSet::from_sequence(lin(&[(-0.0, 0), (-0.0, 10)], true, true));
    assert!(negative.ever_equals(&0.0));
    assert!(negative.always_equals(&0.0));
    let at = negative.at_value(&0.0).expect("zero is held");
    assert_eq!(at.duration(), 10);
    assert!(negative.minus_value(&0.0).is_none());

    let merged = TSequenceSet::from_sequences(
        vec![lin(&[(-0.0, 0), (-0.0, 10)], true, false), lin(&[(0.0, 10), (0.0, 20)], true, true)],
        true,
    )
    .expect("valid input");
    assert_eq!(merged.count(), 1);
    assert_eq!(merged.duration(), 20);
}
