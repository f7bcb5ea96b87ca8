use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    list::{self, ListArgs},
    render::{self, RenderArgs},
    run::{self, SweepArgs},
    submit,
    version::{self, VersionArgs},
};

mod commands;
mod logging;

#[derive(Parser, Debug)]
#[command(name = "mdsweep", about = "Decoding experiment sweep orchestrator")]
struct Cli {
    /// Log level for mdsweep crates; `RUST_LOG` overrides it.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run every job of the sweep locally, one after another.
    Run(SweepArgs),
    /// Write a batch script per job and submit it to the scheduler.
    Submit(SweepArgs),
    /// Print job ids in dispatch order.
    List(ListArgs),
    /// Print the batch script for one job.
    Render(RenderArgs),
    /// Print version information.
    Version(VersionArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level);
    match cli.command {
        Command::Run(args) => run::run(&args),
        Command::Submit(args) => submit::run(&args),
        Command::List(args) => list::run(&args),
        Command::Render(args) => render::run(&args),
        Command::Version(args) => version::run(&args),
    }
}
