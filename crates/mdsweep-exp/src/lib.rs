//! Sweep enumeration and dispatch for decoding experiments.

pub mod descriptor;
pub mod dispatch;
pub mod grid;
pub mod naming;
pub mod plan;
pub mod range;
pub mod scheduler;
pub mod serde;
pub mod workload;

pub use descriptor::{build_descriptor, Directive, JobDescriptor, ResourcePlan, WallTime};
pub use dispatch::{
    run_direct, run_submit, DispatchMode, DispatchOpts, JobLifecycle, JobOutcome, JobStatus,
    SweepReport,
};
pub use grid::{cartesian, Grid};
pub use naming::{Job, JobId, JobNamer};
pub use plan::{load_plan, AxesSpec, Jobs, RateAxis, SweepPlan};
pub use range::{DecimalRange, RangeSpec};
pub use scheduler::{CommandScheduler, Scheduler, SchedulerSpec, SubmitAck};
pub use workload::{ProcessWorkload, Workload, WorkloadSpec};

pub use crate::serde::{content_hash, to_canonical_json_bytes};
