use mdsweep_core::errors::{ErrorInfo, SweepError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("job", "decoding_latticesize3_bonddim20")
        .with_context("reason", "example")
}

#[test]
fn invalid_range_is_fatal() {
    let err = SweepError::InvalidRange(sample_info("range.step", "step must be positive"));
    assert_eq!(err.info().code, "range.step");
    assert!(err.is_fatal());
    assert_eq!(err.kind(), "invalid-range");
}

#[test]
fn per_job_errors_are_not_fatal() {
    let errors = [
        SweepError::WorkloadInvocation(sample_info("workload.exit", "exit status 1")),
        SweepError::Submission(sample_info("scheduler.exit", "sbatch rejected")),
        SweepError::DescriptorWrite(sample_info("descriptor.write", "read-only")),
    ];
    for err in errors {
        assert!(!err.is_fatal(), "{} should not be fatal", err.kind());
        assert!(err.info().context.contains_key("job"));
    }
}

#[test]
fn display_includes_context_and_hint() {
    let err = SweepError::Config(
        ErrorInfo::new("plan.axes", "empty axis")
            .with_context("axis", "seeds")
            .with_hint("declare at least one seed"),
    );
    let text = err.to_string();
    assert!(text.starts_with("config error: empty axis (code: plan.axes)"));
    assert!(text.contains("axis=seeds"));
    assert!(text.contains("hint: declare at least one seed"));
}

#[test]
fn serde_roundtrip_preserves_family() {
    let err = SweepError::Submission(sample_info("scheduler.spawn", "sbatch not found"));
    let json = serde_json::to_string(&err).expect("serialize");
    assert!(json.contains("\"family\":\"Submission\""));
    let back: SweepError = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, err);
}
