use mdsweep_core::{Decimal, SweepError};
use mdsweep_exp::DecimalRange;
use proptest::prelude::*;

fn dec(text: &str) -> Decimal {
    text.parse().expect("decimal")
}

#[test]
fn threshold_window_is_boundary_inclusive() {
    let range = DecimalRange::new(dec("0.105"), dec("0.115"), dec("0.001")).expect("range");
    let values: Vec<String> = range.iter().map(|value| value.to_string()).collect();
    assert_eq!(values.len(), 11);
    assert_eq!(values.first().map(String::as_str), Some("0.105"));
    assert_eq!(values.last().map(String::as_str), Some("0.115"));
    assert_eq!(values[5], "0.11");
}

#[test]
fn scenario_rates() {
    let range = DecimalRange::new(dec("0.01"), dec("0.03"), dec("0.01")).expect("range");
    let values: Vec<Decimal> = range.iter().collect();
    assert_eq!(values, vec![dec("0.01"), dec("0.02"), dec("0.03")]);
}

#[test]
fn hundreds_of_steps_do_not_drift() {
    let range = DecimalRange::new(dec("0.001"), dec("1"), dec("0.001")).expect("range");
    assert_eq!(range.len(), 1000);
    assert_eq!(range.iter().last(), Some(dec("1")));
    assert_eq!(range.iter().nth(99), Some(dec("0.1")));
}

#[test]
fn iteration_restarts() {
    let range = DecimalRange::new(dec("0.1"), dec("0.3"), dec("0.1")).expect("range");
    let first: Vec<_> = range.iter().collect();
    let second: Vec<_> = (&range).into_iter().collect();
    assert_eq!(first, second);
    assert_eq!(range.iter().len(), 3);
}

#[test]
fn rejects_non_positive_step() {
    for step in ["0", "-0.01"] {
        let err = DecimalRange::new(dec("0.01"), dec("0.03"), dec(step)).unwrap_err();
        assert!(matches!(err, SweepError::InvalidRange(_)));
        assert_eq!(err.info().code, "range.step");
    }
}

#[test]
fn rejects_reversed_bounds() {
    let err = DecimalRange::new(dec("0.2"), dec("0.1"), dec("0.01")).unwrap_err();
    assert!(matches!(err, SweepError::InvalidRange(_)));
    assert!(err.is_fatal());
}

proptest! {
    #[test]
    fn progression_properties(
        start in 0i64..10_000,
        span in 0i64..10_000,
        step in 1i64..500,
        scale in 0u32..6,
    ) {
        let start = Decimal::from_units(start as i128, scale).unwrap();
        let end = Decimal::from_units((start.units_at(scale).unwrap() + span as i128), scale).unwrap();
        let step_dec = Decimal::from_units(step as i128, scale).unwrap();
        let range = DecimalRange::new(start, end, step_dec).unwrap();
        let values: Vec<Decimal> = range.iter().collect();

        prop_assert_eq!(values.len(), range.len());
        prop_assert_eq!(values[0], start);
        let last = *values.last().unwrap();
        prop_assert!(last <= end);
        let last_units = last.units_at(scale).unwrap();
        prop_assert!(last_units + step as i128 > end.units_at(scale).unwrap());
        for pair in values.windows(2) {
            let gap = pair[1].units_at(scale).unwrap() - pair[0].units_at(scale).unwrap();
            prop_assert_eq!(gap, step as i128);
        }
    }
}
