use crate::services::depletion::DepletionModel;
use crate::services::simulation_types::{SimulationReport, WaitPercentile};

pub fn format_simulation_report(report: &SimulationReport) -> String {
    let cutoff = report.cutoff_date.as_deref().unwrap_or("n/a");
    let model = match report.model {
        DepletionModel::MonthlyBuckets => "monthly buckets",
        DepletionModel::AnnualAggregate => "annual aggregate",
    };

    let mut lines = Vec::new();
    lines.push("Simulation Report".to_string());
    lines.push(format!("Data source: {}", report.data_source));
    lines.push(format!("Queue: {} {}", report.country, report.category));
    lines.push(format!("Target date: {}", report.target_date));
    lines.push(format!("Cutoff date: {cutoff}"));
    lines.push(format!("Start date: {}", report.start_date));
    lines.push(format!("Model: {model}"));
    lines.push(format!("Trials: {} (seed {})", report.trials, report.seed));
    lines.push(format!(
        "Pending ahead: {:.0} (visible {:.0}, projected {:.0})",
        report.queue.pending_ahead, report.queue.visible_pending, report.queue.projected_pending
    ));
    if report.queue.hidden_backlog > 0.0 {
        lines.push(format!(
            "Hidden backlog: {:.0} ({:.0}% queued ahead of target)",
            report.queue.hidden_backlog,
            report.queue.hidden_share_ahead * 100.0
        ));
    }
    lines.push(format!("Mean wait: {:.2} years", report.mean_years));
    lines.push(String::new());
    lines.push("Percentiles:".to_string());
    lines.push("Percentile | Years | Date".to_string());
    lines.push("-----------|-------|-----".to_string());
    lines.push(format_percentile_row("P0", &report.p0));
    lines.push(format_percentile_row("P50", &report.p50));
    lines.push(format_percentile_row("P85", &report.p85));
    lines.push(format_percentile_row("P95", &report.p95));
    lines.push(format_percentile_row("P100", &report.p100));
    lines.push(String::new());
    lines.push(format!(
        "The probability that you will wait less than {} years is {:.2}%",
        report.threshold_years, report.probability_within_threshold
    ));
    if !report.reliable {
        lines.push(format!(
            "Warning: {} of {} trials hit the wait cap; results are unreliable",
            report.non_converged_trials, report.trials
        ));
    }

    lines.join("\n")
}

fn format_percentile_row(label: &str, percentile: &WaitPercentile) -> String {
    format!("{label} | {:.2} | {}", percentile.years, percentile.date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::simulation_types::QueueSummary;

    fn at(years: f64, date: &str) -> WaitPercentile {
        WaitPercentile {
            years,
            date: date.to_string(),
        }
    }

    fn build_report() -> SimulationReport {
        SimulationReport {
            data_source: "inventory.yaml".to_string(),
            country: "India".to_string(),
            category: "EB2".to_string(),
            target_date: "2016-08-11".to_string(),
            cutoff_date: Some("2013-01-01".to_string()),
            start_date: "2026-02-01".to_string(),
            model: DepletionModel::MonthlyBuckets,
            trials: 100,
            seed: 42,
            already_current: false,
            queue: QueueSummary {
                buckets: 60,
                visible_pending: 150_000.0,
                projected_pending: 20_000.0,
                pending_ahead: 90_000.0,
                hidden_backlog: 0.0,
                hidden_share_ahead: 0.0,
            },
            mean_years: 6.4,
            p0: at(1.0, "2027-02-01"),
            p50: at(5.5, "2031-08-01"),
            p85: at(10.0, "2036-02-01"),
            p95: at(12.25, "2038-05-01"),
            p100: at(15.25, "2041-05-01"),
            threshold_years: 5.0,
            probability_within_threshold: 42.0,
            non_converged_trials: 0,
            reliable: true,
        }
    }

    #[test]
    fn format_simulation_report_includes_header_and_table() {
        let output = format_simulation_report(&build_report());

        assert!(output.contains("Simulation Report"));
        assert!(output.contains("Data source: inventory.yaml"));
        assert!(output.contains("Queue: India EB2"));
        assert!(output.contains("Cutoff date: 2013-01-01"));
        assert!(output.contains("Model: monthly buckets"));
        assert!(output.contains("Trials: 100 (seed 42)"));
        assert!(output.contains("Pending ahead: 90000 (visible 150000, projected 20000)"));
        assert!(output.contains("Mean wait: 6.40 years"));
        assert!(output.contains("Percentile | Years | Date"));
        assert!(output.contains("P0 | 1.00 | 2027-02-01"));
        assert!(output.contains("P50 | 5.50 | 2031-08-01"));
        assert!(output.contains("P85 | 10.00 | 2036-02-01"));
        assert!(output.contains("P95 | 12.25 | 2038-05-01"));
        assert!(output.contains("P100 | 15.25 | 2041-05-01"));
        assert!(output.contains("wait less than 5 years is 42.00%"));
        assert!(!output.contains("Warning"));
        assert!(!output.contains("Hidden backlog"));
    }

    #[test]
    fn format_simulation_report_uses_na_for_missing_cutoff() {
        let mut report = build_report();
        report.cutoff_date = None;

        let output = format_simulation_report(&report);
        assert!(output.contains("Cutoff date: n/a"));
    }

    #[test]
    fn format_simulation_report_warns_about_capped_trials() {
        let mut report = build_report();
        report.non_converged_trials = 3;
        report.reliable = false;

        let output = format_simulation_report(&report);
        assert!(output.contains("Warning: 3 of 100 trials hit the wait cap"));
    }

    #[test]
    fn format_simulation_report_shows_hidden_backlog_estimate() {
        let mut report = build_report();
        report.queue.hidden_backlog = 40_000.0;
        report.queue.hidden_share_ahead = 0.25;

        let output = format_simulation_report(&report);
        assert!(output.contains("Hidden backlog: 40000 (25% queued ahead of target)"));
    }
}
