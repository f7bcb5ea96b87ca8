use std::path::PathBuf;

use mdsweep_core::SweepError;
use mdsweep_exp::serde::from_yaml_slice;
use mdsweep_exp::{load_plan, RateAxis, SweepPlan};

fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join(relative)
}

fn scenario() -> SweepPlan {
    load_plan(fixture_path("plans/scenario_a.yaml")).expect("plan loads")
}

#[test]
fn yaml_roundtrip_preserves_plan_and_hash() {
    let plan = scenario();
    let yaml = plan.to_yaml_string().expect("serialize");
    let reparsed: SweepPlan = from_yaml_slice(yaml.as_bytes()).expect("reparse");
    assert_eq!(reparsed, plan);
    assert_eq!(reparsed.plan_hash().unwrap(), plan.plan_hash().unwrap());
}

#[test]
fn defaults_fill_optional_sections() {
    let plan = scenario();
    assert_eq!(plan.scheduler.descriptor_dir, PathBuf::from("."));
    assert!(plan.resources.setup.is_empty());
    assert_eq!(plan.resources.time.as_secs(), 86_400);
    assert!(plan.rate_precision.is_none());
}

#[test]
fn plan_hash_tracks_content() {
    let plan = scenario();
    let mut changed = plan.clone();
    changed.fixed.num_experiments += 1;
    assert_ne!(plan.plan_hash().unwrap(), changed.plan_hash().unwrap());
}

#[test]
fn malformed_range_is_invalid_range() {
    let mut plan = scenario();
    if let RateAxis::Range { range } = &mut plan.axes.error_rates {
        range.step = "-0.01".parse().unwrap();
    } else {
        panic!("fixture uses a generated range");
    }
    let err = plan.validate().unwrap_err();
    assert!(matches!(err, SweepError::InvalidRange(_)));
}

#[test]
fn explicit_rate_list_is_accepted() {
    let mut plan = scenario();
    plan.axes.error_rates = RateAxis::Values(vec!["0.05".parse().unwrap(), "0.1".parse().unwrap()]);
    plan.validate().expect("valid");
    assert_eq!(plan.jobs().unwrap().len(), 2 * 2);
}

#[test]
fn domain_violations_are_config_errors() {
    let cases: Vec<(&str, Box<dyn Fn(&mut SweepPlan)>)> = vec![
        ("plan.error_rates", Box::new(|plan: &mut SweepPlan| {
            plan.axes.error_rates = RateAxis::Values(vec!["1.5".parse().unwrap()]);
        })),
        ("plan.axes", Box::new(|plan: &mut SweepPlan| plan.axes.seeds = vec![1, 1])),
        ("plan.lattice_sizes", Box::new(|plan: &mut SweepPlan| plan.axes.lattice_sizes = vec![0])),
        ("plan.bias_prob", Box::new(|plan: &mut SweepPlan| {
            plan.fixed.bias_prob = "1.01".parse().unwrap();
        })),
        ("resources.mem", Box::new(|plan: &mut SweepPlan| plan.resources.mem = "lots".to_string())),
        ("naming.precision", Box::new(|plan: &mut SweepPlan| plan.rate_precision = Some(1))),
    ];
    for (code, mutate) in cases {
        let mut plan = scenario();
        mutate(&mut plan);
        let err = plan.validate().unwrap_err();
        assert!(matches!(err, SweepError::Config(_)), "{code}: {err}");
        assert_eq!(err.info().code, code);
    }
}

#[test]
fn missing_file_is_reported() {
    let err = load_plan(fixture_path("plans/does-not-exist.yaml")).unwrap_err();
    assert_eq!(err.info().code, "plan.read");
}
