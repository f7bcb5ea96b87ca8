use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use mdsweep_exp::{
    load_plan, run_direct, to_canonical_json_bytes, DispatchOpts, ProcessWorkload, SweepReport,
};
use tracing::info;

#[derive(Args, Debug)]
pub struct SweepArgs {
    /// YAML sweep plan.
    #[arg(long)]
    pub plan: PathBuf,
    /// Announce every job without running or submitting anything.
    #[arg(long)]
    pub dry_run: bool,
    /// Skip the first N jobs of the enumeration.
    #[arg(long, default_value_t = 0)]
    pub skip: usize,
    /// Dispatch at most N jobs after skipping.
    #[arg(long)]
    pub limit: Option<usize>,
    /// Write the per-job outcomes as JSON to this file.
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl SweepArgs {
    pub fn opts(&self) -> DispatchOpts {
        DispatchOpts {
            skip: self.skip,
            limit: self.limit,
            dry_run: self.dry_run,
        }
    }
}

pub fn run(args: &SweepArgs) -> Result<(), Box<dyn Error>> {
    let plan = load_plan(&args.plan)?;
    info!(plan = %args.plan.display(), "loaded sweep plan");
    let mut workload = ProcessWorkload::new(plan.workload.clone());
    let report = run_direct(&plan, &mut workload, &args.opts())?;
    finish(args, &report)
}

pub fn finish(args: &SweepArgs, report: &SweepReport) -> Result<(), Box<dyn Error>> {
    if let Some(path) = &args.report {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, to_canonical_json_bytes(report)?)?;
        info!(report = %path.display(), "wrote sweep report");
    }
    println!("sweep complete");
    Ok(())
}
