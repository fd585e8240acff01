pub mod base_commands;
pub mod completions_cmd;
pub mod plot_backlog_cmd;
pub mod report_format;
pub mod simulate_cmd;
