use mdsweep_core::errors::SweepError;
use mdsweep_core::ParameterTuple;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::descriptor::{build_descriptor, join_quoted};
use crate::naming::{Job, JobId};
use crate::plan::{Jobs, SweepPlan};
use crate::scheduler::{Scheduler, ScopedDescriptor};
use crate::workload::Workload;

/// Strategy used for every job of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// Run the workload in-process, one job at a time.
    Direct,
    /// Write a descriptor per job and hand it to the scheduler.
    Submit,
}

/// Last lifecycle state a job reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobLifecycle {
    Pending,
    DescriptorWritten,
    Submitted,
    DescriptorRemoved,
    Completed,
}

/// Result of one dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum JobStatus {
    /// Listed only; nothing was executed or submitted.
    Planned { command: String },
    Completed,
    Submitted { queue_id: String },
    Failed { error: SweepError },
}

impl JobStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, JobStatus::Failed { .. })
    }
}

/// Per-job entry of a [`SweepReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOutcome {
    pub index: usize,
    pub job_id: JobId,
    pub tuple: ParameterTuple,
    pub lifecycle: JobLifecycle,
    pub status: JobStatus,
}

/// Record of a whole sweep, in dispatch order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub plan_hash: String,
    pub mode: DispatchMode,
    pub jobs: Vec<JobOutcome>,
}

impl SweepReport {
    pub fn failures(&self) -> impl Iterator<Item = &JobOutcome> {
        self.jobs.iter().filter(|job| job.status.is_failure())
    }
}

/// Options narrowing or rehearsing a sweep.
#[derive(Debug, Clone, Default)]
pub struct DispatchOpts {
    /// Jobs to skip from the start of the enumeration.
    pub skip: usize,
    /// Maximum number of jobs to dispatch after skipping.
    pub limit: Option<usize>,
    /// Announce jobs without running or submitting them.
    pub dry_run: bool,
}

type Selected = std::iter::Take<std::iter::Skip<Jobs>>;

fn select_jobs(plan: &SweepPlan, opts: &DispatchOpts) -> Result<(usize, Selected), SweepError> {
    let jobs = plan.jobs()?;
    let total = jobs.len();
    let selected = jobs.skip(opts.skip).take(opts.limit.unwrap_or(usize::MAX));
    Ok((total, selected))
}

fn outcome(job: Job, lifecycle: JobLifecycle, status: JobStatus) -> JobOutcome {
    match &status {
        JobStatus::Failed { error: err } => error!(job = %job.id, error = %err, "job failed"),
        JobStatus::Completed => info!(job = %job.id, "job completed"),
        JobStatus::Submitted { queue_id } => info!(job = %job.id, queue_id = %queue_id, "job submitted"),
        JobStatus::Planned { command } => info!(job = %job.id, command = %command, "job planned"),
    }
    JobOutcome {
        index: job.index,
        job_id: job.id,
        tuple: job.tuple,
        lifecycle,
        status,
    }
}

/// Runs every job synchronously through `workload`.
///
/// A failing job is recorded and the sweep continues with the next one.
pub fn run_direct<W: Workload>(
    plan: &SweepPlan,
    workload: &mut W,
    opts: &DispatchOpts,
) -> Result<SweepReport, SweepError> {
    plan.validate()?;
    let plan_hash = plan.plan_hash()?;
    let (total, jobs) = select_jobs(plan, opts)?;
    info!(plan_hash = %plan_hash, jobs = total, mode = "direct", "starting sweep");
    let mut outcomes = Vec::new();
    for job in jobs {
        let job = job?;
        info!(job = %job.id, index = job.index + 1, total, "dispatching");
        let report = if opts.dry_run {
            let command = join_quoted(&plan.workload.command_tokens(&job.tuple));
            outcome(job, JobLifecycle::Pending, JobStatus::Planned { command })
        } else {
            match workload.run(&job) {
                Ok(()) => outcome(job, JobLifecycle::Completed, JobStatus::Completed),
                Err(err) => outcome(job, JobLifecycle::Pending, JobStatus::Failed { error: err }),
            }
        };
        outcomes.push(report);
    }
    Ok(SweepReport {
        plan_hash,
        mode: DispatchMode::Direct,
        jobs: outcomes,
    })
}

/// Writes, submits and removes one descriptor per job.
///
/// The descriptor is removed right after the submit call returns, whether
/// or not the scheduler accepted it. Write and submit failures are recorded
/// per job and never abort the sweep.
pub fn run_submit<S: Scheduler>(
    plan: &SweepPlan,
    scheduler: &mut S,
    opts: &DispatchOpts,
) -> Result<SweepReport, SweepError> {
    plan.validate()?;
    let plan_hash = plan.plan_hash()?;
    let (total, jobs) = select_jobs(plan, opts)?;
    info!(plan_hash = %plan_hash, jobs = total, mode = "submit", "starting sweep");
    let mut outcomes = Vec::new();
    for job in jobs {
        let job = job?;
        info!(job = %job.id, index = job.index + 1, total, "submitting");
        let report = submit_job(plan, scheduler, job, opts.dry_run);
        outcomes.push(report);
    }
    Ok(SweepReport {
        plan_hash,
        mode: DispatchMode::Submit,
        jobs: outcomes,
    })
}

fn submit_job<S: Scheduler>(
    plan: &SweepPlan,
    scheduler: &mut S,
    job: Job,
    dry_run: bool,
) -> JobOutcome {
    let descriptor = build_descriptor(&job, &plan.resources, &plan.workload);
    if dry_run {
        let command = descriptor.command_line();
        return outcome(job, JobLifecycle::Pending, JobStatus::Planned { command });
    }
    let written = match ScopedDescriptor::write(
        &plan.scheduler.descriptor_dir,
        &job.id,
        &descriptor.render(),
    ) {
        Ok(written) => written,
        Err(err) => return outcome(job, JobLifecycle::Pending, JobStatus::Failed { error: err }),
    };
    let submitted = scheduler.submit(written.path());
    let reached = if submitted.is_ok() {
        JobLifecycle::Submitted
    } else {
        JobLifecycle::DescriptorWritten
    };
    let lifecycle = match written.remove() {
        Ok(()) => JobLifecycle::DescriptorRemoved,
        Err(err) => {
            warn!(job = %job.id, error = %err, "descriptor left on disk");
            reached
        }
    };
    match submitted {
        Ok(ack) => outcome(
            job,
            lifecycle,
            JobStatus::Submitted {
                queue_id: ack.queue_id,
            },
        ),
        Err(err) => outcome(job, lifecycle, JobStatus::Failed { error: err }),
    }
}
