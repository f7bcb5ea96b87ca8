use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use mdsweep_exp::load_plan;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// YAML sweep plan.
    #[arg(long)]
    pub plan: PathBuf,
}

pub fn run(args: &ListArgs) -> Result<(), Box<dyn Error>> {
    let plan = load_plan(&args.plan)?;
    for job in plan.jobs()? {
        let job = job?;
        println!("{}\t{}", job.index, job.id);
    }
    Ok(())
}
