use std::process::ExitCode;

use chrono::NaiveDate;

use crate::commands::base_commands::Commands;
use crate::services::backlog_plot::write_backlog_plot_png;
use crate::services::simulation::load_backlog_queue;
use crate::services::simulation_config::{
    load_simulation_config_from_yaml_file, SimulationConfig,
};

pub fn plot_backlog_command(cmd: Commands) -> ExitCode {
    if let Commands::PlotBacklog {
        inventory,
        hidden_backlog,
        country,
        category,
        start_date,
        config,
        output,
    } = cmd
    {
        let config = match config {
            Some(path) => match load_simulation_config_from_yaml_file(&path) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Failed to load simulation config: {e:?}");
                    return ExitCode::FAILURE;
                }
            },
            None => SimulationConfig::default(),
        };
        let start_date = match NaiveDate::parse_from_str(&start_date, "%Y-%m-%d") {
            Ok(date) => date,
            Err(e) => {
                eprintln!("Failed to parse start date {start_date}: {e:?}");
                return ExitCode::FAILURE;
            }
        };

        let loaded = match load_backlog_queue(
            &inventory,
            hidden_backlog.as_deref(),
            &country,
            &category,
            start_date,
            &config.projection,
        ) {
            Ok(loaded) => loaded,
            Err(e) => {
                eprintln!("Failed to build backlog queue: {e:?}");
                return ExitCode::FAILURE;
            }
        };

        let title = format!("{country} {category} backlog");
        if let Err(e) = write_backlog_plot_png(&output, &loaded.queue, &title) {
            eprintln!("Failed to plot backlog: {e:?}");
            return ExitCode::FAILURE;
        }
        println!(
            "Backlog of {} visible and {} projected applicants written to {output}",
            loaded.queue.visible_total().round(),
            loaded.queue.projected_total().round()
        );
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
