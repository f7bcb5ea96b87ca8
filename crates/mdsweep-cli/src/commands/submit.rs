use std::error::Error;

use mdsweep_exp::{load_plan, run_submit, CommandScheduler};
use tracing::info;

use super::run::{finish, SweepArgs};

pub fn run(args: &SweepArgs) -> Result<(), Box<dyn Error>> {
    let plan = load_plan(&args.plan)?;
    info!(plan = %args.plan.display(), "loaded sweep plan");
    let mut scheduler = CommandScheduler::new(&plan.scheduler);
    let report = run_submit(&plan, &mut scheduler, &args.opts())?;
    finish(args, &report)
}
