use chrono::NaiveDate;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::backlog::{BacklogQueue, ProjectionConfig};
use crate::domain::inventory::HiddenBacklogSnapshot;
use crate::domain::month::date_after_years;
use crate::domain::trial::ResultSet;
use crate::services::depletion::{DepletionModel, DepletionSettings};
use crate::services::hidden_backlog_yaml::{
    find_snapshot, load_hidden_backlog_from_yaml_file, HiddenBacklogYamlError,
};
use crate::services::inventory_yaml::{load_inventory_from_yaml_file, InventoryYamlError};
use crate::services::parameter_sampler::{ParameterSampler, SamplerError};
use crate::services::percentiles::{mean, probability_before, sorted, value_sorted};
use crate::services::simulation_config::SimulationConfig;
use crate::services::simulation_types::{
    QueueSummary, SimulationOutput, SimulationReport, WaitPercentile,
};
use crate::services::trial_runner::{run_all, TrialPlan};

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("failed to load inventory: {0}")]
    Inventory(#[from] InventoryYamlError),
    #[error("failed to load hidden backlog: {0}")]
    HiddenBacklog(#[from] HiddenBacklogYamlError),
    #[error("invalid simulation parameters: {0}")]
    Sampler(#[from] SamplerError),
    #[error("invalid {field}: {value} (expected YYYY-MM-DD)")]
    InvalidDate { field: &'static str, value: String },
    #[error("trials must be greater than zero")]
    InvalidTrials,
    #[error("threshold years must be a non-negative number")]
    InvalidThreshold,
}

/// Everything a `simulate` run needs besides the [`SimulationConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRequest {
    pub inventory_path: String,
    pub hidden_backlog_path: Option<String>,
    pub country: String,
    pub category: String,
    /// The applicant's priority date.
    pub target_date: String,
    /// Bulletin final action date, if known.
    pub cutoff_date: Option<String>,
    pub start_date: String,
    pub trials: Option<usize>,
    pub seed: Option<u64>,
    pub model: DepletionModel,
    pub threshold_years: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedQueue {
    pub queue: BacklogQueue,
    pub hidden: Option<HiddenBacklogSnapshot>,
}

/// Loads inventory and hidden backlog files and builds the queue for one
/// country and category. Any data error aborts before a trial runs.
pub fn load_backlog_queue(
    inventory_path: &str,
    hidden_backlog_path: Option<&str>,
    country: &str,
    category: &str,
    start_date: NaiveDate,
    projection: &ProjectionConfig,
) -> Result<LoadedQueue, SimulationError> {
    let rows = load_inventory_from_yaml_file(inventory_path)?;
    let hidden = match hidden_backlog_path {
        Some(path) => {
            let snapshots = load_hidden_backlog_from_yaml_file(path)?;
            Some(find_snapshot(&snapshots, country, category)?.clone())
        }
        None => None,
    };
    let hidden_count = hidden.as_ref().map_or(0.0, |snapshot| snapshot.count);

    let queue = BacklogQueue::build(&rows, country, category, hidden_count, start_date, projection);
    debug!(
        rows = rows.len(),
        buckets = queue.len(),
        visible = queue.visible_total(),
        projected = queue.projected_total(),
        "built backlog queue"
    );
    if queue.is_empty() {
        warn!(country, category, "no pending inventory or hidden backlog; wait is zero");
    }

    Ok(LoadedQueue { queue, hidden })
}

pub fn simulate_from_files(
    request: &SimulationRequest,
    config: &SimulationConfig,
) -> Result<SimulationOutput, SimulationError> {
    let target_date = parse_date("target date", &request.target_date)?;
    let cutoff_date = request
        .cutoff_date
        .as_deref()
        .map(|value| parse_date("cutoff date", value))
        .transpose()?;
    let start_date = parse_date("start date", &request.start_date)?;
    if !(request.threshold_years >= 0.0) {
        return Err(SimulationError::InvalidThreshold);
    }
    let trial_count = request.trials.unwrap_or(config.trials);
    if trial_count == 0 {
        return Err(SimulationError::InvalidTrials);
    }
    let sampler = ParameterSampler::from_config(config)?;

    let loaded = load_backlog_queue(
        &request.inventory_path,
        request.hidden_backlog_path.as_deref(),
        &request.country,
        &request.category,
        start_date,
        &config.projection,
    )?;
    let queue = match cutoff_date {
        Some(cutoff) => loaded.queue.after_cutoff(cutoff),
        None => loaded.queue.clone(),
    };

    let plan = TrialPlan {
        target_date,
        cutoff_date,
        trial_count,
        horizon_years: config.horizon_years,
        seed: request
            .seed
            .or(config.seed)
            .unwrap_or_else(|| rand::thread_rng().r#gen()),
        depletion: DepletionSettings::from_config(config, request.model),
    };
    let results = run_all(&queue, &sampler, &plan);

    let hidden_backlog = loaded.hidden.as_ref().map_or(0.0, |snapshot| snapshot.count);
    let queue_summary = QueueSummary {
        buckets: queue.len(),
        visible_pending: queue.visible_total(),
        projected_pending: queue.projected_total(),
        pending_ahead: queue.pending_before(target_date),
        hidden_backlog,
        hidden_share_ahead: queue.hidden_share_before(target_date),
    };

    Ok(build_output(
        request,
        &plan,
        start_date,
        queue_summary,
        &results,
    ))
}

fn build_output(
    request: &SimulationRequest,
    plan: &TrialPlan,
    start_date: NaiveDate,
    queue: QueueSummary,
    results: &ResultSet,
) -> SimulationOutput {
    let wait_years = results.wait_years();
    let sorted_years = sorted(&wait_years);
    let at = |percentile: f64| {
        let years = value_sorted(&sorted_years, percentile).unwrap_or(0.0);
        WaitPercentile {
            years,
            date: format_date(date_after_years(start_date, years)),
        }
    };

    let report = SimulationReport {
        data_source: data_source_name(&request.inventory_path),
        country: request.country.clone(),
        category: request.category.clone(),
        target_date: format_date(plan.target_date),
        cutoff_date: plan.cutoff_date.map(format_date),
        start_date: format_date(start_date),
        model: plan.depletion.model,
        trials: results.len(),
        seed: plan.seed,
        already_current: results.already_current,
        queue,
        mean_years: mean(&wait_years),
        p0: at(0.0),
        p50: at(50.0),
        p85: at(85.0),
        p95: at(95.0),
        p100: at(100.0),
        threshold_years: request.threshold_years,
        probability_within_threshold: probability_before(&wait_years, request.threshold_years),
        non_converged_trials: results.non_converged(),
        reliable: results.is_reliable(),
    };

    SimulationOutput {
        report,
        results: wait_years,
    }
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, SimulationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| SimulationError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn data_source_name(path: &str) -> String {
    std::path::Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
        .to_string()
}
