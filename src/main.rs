use std::process::ExitCode;

use clap::Parser;
use visa_forecast::commands::base_commands::{CliArgs, Commands};
use visa_forecast::commands::completions_cmd::completions_command;
use visa_forecast::commands::plot_backlog_cmd::plot_backlog_command;
use visa_forecast::commands::simulate_cmd::simulate_command;
use visa_forecast::services::tracing_setup::init_tracing;

fn main() -> ExitCode {
    init_tracing();

    let args = CliArgs::parse();
    match args.command {
        cmd @ Commands::Simulate { .. } => simulate_command(cmd),
        cmd @ Commands::PlotBacklog { .. } => plot_backlog_command(cmd),
        Commands::Completions { shell } => completions_command(shell),
    }
}
