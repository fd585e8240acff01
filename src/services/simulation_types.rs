use serde::Serialize;

use crate::services::depletion::DepletionModel;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct WaitPercentile {
    pub years: f64,
    /// Calendar month the wait ends, counted from the simulation start date.
    pub date: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct QueueSummary {
    pub buckets: usize,
    pub visible_pending: f64,
    pub projected_pending: f64,
    /// Unscaled applicants in cohorts before the target date.
    pub pending_ahead: f64,
    pub hidden_backlog: f64,
    /// Share of the queued hidden backlog in cohorts before the target date.
    pub hidden_share_ahead: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SimulationReport {
    pub data_source: String,
    pub country: String,
    pub category: String,
    pub target_date: String,
    pub cutoff_date: Option<String>,
    pub start_date: String,
    pub model: DepletionModel,
    pub trials: usize,
    pub seed: u64,
    pub already_current: bool,
    pub queue: QueueSummary,
    pub mean_years: f64,
    pub p0: WaitPercentile,
    pub p50: WaitPercentile,
    pub p85: WaitPercentile,
    pub p95: WaitPercentile,
    pub p100: WaitPercentile,
    pub threshold_years: f64,
    /// Percentage of trials that waited less than `threshold_years`.
    pub probability_within_threshold: f64,
    pub non_converged_trials: usize,
    pub reliable: bool,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SimulationOutput {
    pub report: SimulationReport,
    pub results: Vec<f64>,
}
