use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use mdsweep_core::{ErrorInfo, SweepError};
use mdsweep_exp::{build_descriptor, load_plan};

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// YAML sweep plan.
    #[arg(long)]
    pub plan: PathBuf,
    /// Zero based job index as printed by `mdsweep list`.
    #[arg(long)]
    pub index: usize,
}

pub fn run(args: &RenderArgs) -> Result<(), Box<dyn Error>> {
    let plan = load_plan(&args.plan)?;
    let mut jobs = plan.jobs()?;
    let total = jobs.len();
    let job = jobs.nth(args.index).ok_or_else(|| {
        SweepError::Config(
            ErrorInfo::new("render.index", "job index out of range")
                .with_context("index", args.index.to_string())
                .with_context("jobs", total.to_string()),
        )
    })??;
    print!(
        "{}",
        build_descriptor(&job, &plan.resources, &plan.workload).render()
    );
    Ok(())
}
