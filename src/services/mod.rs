pub mod backlog_plot;
pub mod depletion;
pub mod hidden_backlog_yaml;
pub mod histogram;
pub mod inventory_yaml;
pub mod parameter_sampler;
pub mod percentiles;
pub mod simulation;
pub mod simulation_config;
pub mod simulation_types;
pub mod tracing_setup;
pub mod trial_runner;
