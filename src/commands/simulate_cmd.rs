use std::process::ExitCode;

use plotters::style::{BLACK, RGBColor};

use crate::commands::base_commands::Commands;
use crate::commands::report_format::format_simulation_report;
use crate::services::histogram::{write_histogram_png, HistogramMarker};
use crate::services::simulation::{simulate_from_files, SimulationRequest};
use crate::services::simulation_config::{
    load_simulation_config_from_yaml_file, SimulationConfig,
};
use crate::services::simulation_types::SimulationOutput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Yaml,
    Json,
}

impl OutputFormat {
    fn from_path(path: &str) -> Self {
        if path.to_ascii_lowercase().ends_with(".json") {
            OutputFormat::Json
        } else {
            OutputFormat::Yaml
        }
    }

    fn serialize(self, output: &SimulationOutput) -> Result<String, String> {
        match self {
            OutputFormat::Yaml => serde_yaml::to_string(output).map_err(|e| format!("{e:?}")),
            OutputFormat::Json => serde_json::to_string_pretty(output).map_err(|e| format!("{e:?}")),
        }
    }
}

pub fn simulate_command(cmd: Commands) -> ExitCode {
    if let Commands::Simulate {
        inventory,
        hidden_backlog,
        country,
        category,
        target_date,
        cutoff_date,
        start_date,
        trials,
        seed,
        model,
        within,
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

        let request = SimulationRequest {
            inventory_path: inventory,
            hidden_backlog_path: hidden_backlog,
            country,
            category,
            target_date,
            cutoff_date,
            start_date,
            trials,
            seed,
            model,
            threshold_years: within,
        };
        let simulation = match simulate_from_files(&request, &config) {
            Ok(result) => result,
            Err(e) => {
                eprintln!("Failed to simulate visa wait: {e:?}");
                return ExitCode::FAILURE;
            }
        };

        let contents = match OutputFormat::from_path(&output).serialize(&simulation) {
            Ok(contents) => contents,
            Err(e) => {
                eprintln!("Failed to serialize simulation output: {e}");
                return ExitCode::FAILURE;
            }
        };
        if let Err(e) = std::fs::write(&output, contents) {
            eprintln!("Failed to write simulation output: {e:?}");
            return ExitCode::FAILURE;
        }

        let report = &simulation.report;
        if report.already_current {
            println!("Date already current. 0 wait time");
            println!("Simulation result written to {output}");
            return ExitCode::SUCCESS;
        }

        let histogram_path = format!("{output}.png");
        let markers = [
            HistogramMarker {
                label: "Median".to_string(),
                years: report.p50.years,
                color: BLACK,
            },
            HistogramMarker {
                label: "P95".to_string(),
                years: report.p95.years,
                color: RGBColor(220, 38, 38),
            },
        ];
        if let Err(e) = write_histogram_png(&histogram_path, &simulation.results, &markers) {
            eprintln!("Failed to write simulation histogram: {e:?}");
            return ExitCode::FAILURE;
        }

        println!("{}", format_simulation_report(report));
        println!("Simulation result written to {output}");
        println!("Simulation histogram written to {histogram_path}");
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_follows_extension() {
        assert_eq!(OutputFormat::from_path("report.yaml"), OutputFormat::Yaml);
        assert_eq!(OutputFormat::from_path("report.JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::from_path("report"), OutputFormat::Yaml);
    }
}
