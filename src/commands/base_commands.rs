use chrono::Local;
use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::services::depletion::DepletionModel;

#[derive(Parser)]
#[command(author, version, about)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Simulate the wait until a priority date becomes current
    Simulate {
        /// Tidy inventory YAML file
        #[arg(short, long)]
        inventory: String,
        /// Hidden backlog snapshot YAML file
        #[arg(short = 'b', long)]
        hidden_backlog: Option<String>,
        /// Country of chargeability
        #[arg(short, long, default_value = "India")]
        country: String,
        /// Preference category
        #[arg(short = 'p', long, default_value = "EB2")]
        category: String,
        /// Priority date to forecast (YYYY-MM-DD)
        #[arg(short, long)]
        target_date: String,
        /// Visa bulletin final action date (YYYY-MM-DD)
        #[arg(short = 'u', long)]
        cutoff_date: Option<String>,
        /// Simulation start date (YYYY-MM-DD)
        #[arg(short, long, default_value_t = default_start_date())]
        start_date: String,
        /// Number of trials (defaults to the config value)
        #[arg(short = 'n', long)]
        trials: Option<usize>,
        /// Master seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,
        /// Queue depletion model
        #[arg(short, long, value_enum, default_value_t = DepletionModel::MonthlyBuckets)]
        model: DepletionModel,
        /// Report the probability of waiting less than this many years
        #[arg(short, long, default_value_t = 5.0)]
        within: f64,
        /// Simulation config YAML file
        #[arg(long)]
        config: Option<String>,
        /// Output report file (.yaml or .json)
        #[arg(short, long)]
        output: String,
    },
    /// Plot the backlog queue by priority month into a PNG chart
    PlotBacklog {
        /// Tidy inventory YAML file
        #[arg(short, long)]
        inventory: String,
        /// Hidden backlog snapshot YAML file
        #[arg(short = 'b', long)]
        hidden_backlog: Option<String>,
        /// Country of chargeability
        #[arg(short, long, default_value = "India")]
        country: String,
        /// Preference category
        #[arg(short = 'p', long, default_value = "EB2")]
        category: String,
        /// Date the projection of hidden backlog is anchored at (YYYY-MM-DD)
        #[arg(short, long, default_value_t = default_start_date())]
        start_date: String,
        /// Simulation config YAML file
        #[arg(long)]
        config: Option<String>,
        /// Output PNG file
        #[arg(short, long)]
        output: String,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn default_start_date() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn simulate_defaults_start_date_model_and_threshold() {
        let args = CliArgs::parse_from([
            "visa-forecast",
            "simulate",
            "-i",
            "inventory.yaml",
            "-t",
            "2016-08-11",
            "-o",
            "output.yaml",
        ]);

        if let Commands::Simulate {
            start_date,
            model,
            within,
            country,
            category,
            trials,
            ..
        } = args.command
        {
            assert_eq!(start_date, default_start_date());
            assert_eq!(model, DepletionModel::MonthlyBuckets);
            assert_eq!(within, 5.0);
            assert_eq!(country, "India");
            assert_eq!(category, "EB2");
            assert_eq!(trials, None);
        } else {
            panic!("expected simulate command");
        }
    }

    #[test]
    fn simulate_parses_annual_model() {
        let args = CliArgs::parse_from([
            "visa-forecast",
            "simulate",
            "-i",
            "inventory.yaml",
            "-t",
            "2016-08-11",
            "-o",
            "output.yaml",
            "--model",
            "annual-aggregate",
            "--seed",
            "7",
        ]);

        if let Commands::Simulate { model, seed, .. } = args.command {
            assert_eq!(model, DepletionModel::AnnualAggregate);
            assert_eq!(seed, Some(7));
        } else {
            panic!("expected simulate command");
        }
    }

    #[test]
    fn plot_backlog_defaults_start_date_to_today() {
        let args = CliArgs::parse_from([
            "visa-forecast",
            "plot-backlog",
            "-i",
            "inventory.yaml",
            "-o",
            "backlog.png",
        ]);

        if let Commands::PlotBacklog { start_date, .. } = args.command {
            assert_eq!(start_date, default_start_date());
        } else {
            panic!("expected plot-backlog command");
        }
    }
}
