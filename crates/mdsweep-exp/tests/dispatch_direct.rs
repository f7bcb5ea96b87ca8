use std::path::PathBuf;

use mdsweep_core::{ErrorInfo, SweepError};
use mdsweep_exp::{
    load_plan, run_direct, DispatchMode, DispatchOpts, Job, JobLifecycle, JobStatus, Workload,
};

fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join(relative)
}

/// Records every job it sees and fails the ones at `fail_at`.
#[derive(Default)]
struct RecordingWorkload {
    fail_at: Vec<usize>,
    seen: Vec<String>,
}

impl Workload for RecordingWorkload {
    fn run(&mut self, job: &Job) -> Result<(), SweepError> {
        self.seen.push(job.id.to_string());
        if self.fail_at.contains(&job.index) {
            return Err(SweepError::WorkloadInvocation(
                ErrorInfo::new("workload.exit", "workload exited with status 1")
                    .with_context("job", job.id.to_string()),
            ));
        }
        Ok(())
    }
}

#[test]
fn failing_job_does_not_stop_the_sweep() {
    let plan = load_plan(fixture_path("plans/scenario_a.yaml")).expect("plan loads");
    let mut workload = RecordingWorkload {
        fail_at: vec![1],
        ..Default::default()
    };
    let report = run_direct(&plan, &mut workload, &DispatchOpts::default()).expect("sweep");
    assert_eq!(report.mode, DispatchMode::Direct);
    assert_eq!(workload.seen.len(), 6);
    assert_eq!(report.jobs.len(), 6);

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].index, 1);
    match &failures[0].status {
        JobStatus::Failed { error } => {
            assert!(matches!(error, SweepError::WorkloadInvocation(_)));
        }
        other => panic!("unexpected status {other:?}"),
    }
    for job in report.jobs.iter().filter(|job| job.index != 1) {
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.lifecycle, JobLifecycle::Completed);
    }
}

#[test]
fn dry_run_executes_nothing() {
    let plan = load_plan(fixture_path("plans/scenario_a.yaml")).expect("plan loads");
    let mut workload = RecordingWorkload::default();
    let opts = DispatchOpts {
        dry_run: true,
        ..Default::default()
    };
    let report = run_direct(&plan, &mut workload, &opts).expect("sweep");
    assert!(workload.seen.is_empty());
    match &report.jobs[0].status {
        JobStatus::Planned { command } => {
            assert!(command.starts_with("python examples/decoding/quantum_surface.py --lattice_size 3"));
        }
        other => panic!("unexpected status {other:?}"),
    }
}

#[test]
fn skip_and_limit_select_a_window() {
    let plan = load_plan(fixture_path("plans/scenario_a.yaml")).expect("plan loads");
    let mut workload = RecordingWorkload::default();
    let opts = DispatchOpts {
        skip: 2,
        limit: Some(3),
        dry_run: false,
    };
    let report = run_direct(&plan, &mut workload, &opts).expect("sweep");
    let indices: Vec<_> = report.jobs.iter().map(|job| job.index).collect();
    assert_eq!(indices, vec![2, 3, 4]);
    assert_eq!(
        workload.seen[0],
        "decoding_latticesize3_bonddim20_errorrate0p03_errormodelBitflip_seed123"
    );
}

#[test]
fn invalid_plan_aborts_before_dispatch() {
    let mut plan = load_plan(fixture_path("plans/scenario_a.yaml")).expect("plan loads");
    plan.axes.bond_dims.clear();
    let mut workload = RecordingWorkload::default();
    let err = run_direct(&plan, &mut workload, &DispatchOpts::default()).unwrap_err();
    assert!(err.is_fatal());
    assert!(workload.seen.is_empty());
}

#[cfg(unix)]
#[test]
fn process_workload_reports_exit_status() {
    use mdsweep_exp::{ProcessWorkload, WorkloadSpec};

    let mut plan = load_plan(fixture_path("plans/scenario_a.yaml")).expect("plan loads");
    // $2 is the lattice size: fail only for L = 5
    plan.workload = WorkloadSpec {
        program: "sh".to_string(),
        args: vec!["-c".to_string(), "test \"$2\" != 5".to_string(), "workload".to_string()],
        working_dir: None,
    };
    let mut workload = ProcessWorkload::new(plan.workload.clone());
    let report = run_direct(&plan, &mut workload, &DispatchOpts::default()).expect("sweep");
    let failed: Vec<u32> = report
        .failures()
        .map(|job| job.tuple.lattice_size)
        .collect();
    assert_eq!(failed, vec![5, 5, 5]);
    let first_failure = report.failures().next().expect("failure");
    match &first_failure.status {
        JobStatus::Failed { error } => {
            assert_eq!(error.info().code, "workload.exit");
            assert_eq!(error.info().context.get("exit").map(String::as_str), Some("1"));
        }
        other => panic!("unexpected status {other:?}"),
    }
}

#[cfg(unix)]
#[test]
fn missing_program_is_an_invocation_failure() {
    use mdsweep_exp::{ProcessWorkload, WorkloadSpec};

    let plan = load_plan(fixture_path("plans/scenario_a.yaml")).expect("plan loads");
    let mut workload = ProcessWorkload::new(WorkloadSpec {
        program: "/nonexistent/mdsweep-workload".to_string(),
        args: Vec::new(),
        working_dir: None,
    });
    let report = run_direct(&plan, &mut workload, &DispatchOpts::default()).expect("sweep");
    assert_eq!(report.failures().count(), 6);
}
