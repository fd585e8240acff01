use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

use crate::domain::inventory::{InventoryBucket, InventoryRow};
use crate::domain::month::{add_months, month_start};

/// How the hidden backlog is spread forward in time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Annual inflow, in principal applicants, before weighting.
    pub base_annual_inflow: f64,
    pub default_weight: f64,
    /// Inflow weights keyed by calendar year.
    pub weight_overrides: BTreeMap<i32, f64>,
    pub horizon_years: u32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            base_annual_inflow: 12_000.0,
            default_weight: 1.0,
            weight_overrides: BTreeMap::from([(2022, 1.25), (2023, 1.35), (2024, 1.3)]),
            horizon_years: 15,
        }
    }
}

impl ProjectionConfig {
    pub fn weight_for(&self, year: i32) -> f64 {
        self.weight_overrides
            .get(&year)
            .copied()
            .unwrap_or(self.default_weight)
    }
}

/// Ordered backlog for one country and category: visible buckets first, then
/// the projected hidden backlog. Dates are strictly ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BacklogQueue {
    buckets: Vec<InventoryBucket>,
}

impl BacklogQueue {
    pub fn build(
        rows: &[InventoryRow],
        country: &str,
        category: &str,
        hidden_count: f64,
        as_of_date: NaiveDate,
        projection: &ProjectionConfig,
    ) -> Self {
        let mut by_month: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for row in rows
            .iter()
            .filter(|row| row.is_awaiting_availability())
            .filter(|row| row.matches(country, category))
            .filter(|row| row.count > 0.0)
        {
            *by_month.entry(month_start(row.date)).or_insert(0.0) += row.count;
        }

        let mut buckets: Vec<InventoryBucket> = by_month
            .into_iter()
            .map(|(date, count)| InventoryBucket::visible(date, count))
            .collect();

        let projection_start = match buckets.last() {
            Some(last) => add_months(last.date, 1),
            None => month_start(as_of_date),
        };
        buckets.extend(project_hidden_backlog(
            projection_start,
            hidden_count,
            projection,
        ));

        Self { buckets }
    }

    pub fn from_buckets(mut buckets: Vec<InventoryBucket>) -> Self {
        buckets.sort_by_key(|bucket| bucket.date);
        buckets.dedup_by(|later, earlier| {
            if later.date == earlier.date {
                earlier.pending_count += later.pending_count;
                true
            } else {
                false
            }
        });
        Self { buckets }
    }

    /// Drops cohorts dated on or before the bulletin cutoff; those are already current.
    pub fn after_cutoff(&self, cutoff_date: NaiveDate) -> Self {
        Self {
            buckets: self
                .buckets
                .iter()
                .filter(|bucket| bucket.date > cutoff_date)
                .cloned()
                .collect(),
        }
    }

    pub fn buckets(&self) -> &[InventoryBucket] {
        &self.buckets
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn visible_total(&self) -> f64 {
        self.buckets
            .iter()
            .filter(|bucket| !bucket.is_projected())
            .map(|bucket| bucket.pending_count)
            .sum()
    }

    pub fn projected_total(&self) -> f64 {
        self.buckets
            .iter()
            .filter(|bucket| bucket.is_projected())
            .map(|bucket| bucket.pending_count)
            .sum()
    }

    /// Unscaled count of applicants in cohorts strictly before `target_date`.
    pub fn pending_before(&self, target_date: NaiveDate) -> f64 {
        self.buckets
            .iter()
            .take_while(|bucket| bucket.date < target_date)
            .map(|bucket| bucket.pending_count)
            .sum()
    }

    /// Projected (hidden backlog) applicants in cohorts strictly before `target_date`.
    pub fn projected_before(&self, target_date: NaiveDate) -> f64 {
        self.buckets
            .iter()
            .take_while(|bucket| bucket.date < target_date)
            .filter(|bucket| bucket.is_projected())
            .map(|bucket| bucket.pending_count)
            .sum()
    }

    /// Share of the queued hidden backlog that sits ahead of `target_date`;
    /// zero when nothing is projected.
    pub fn hidden_share_before(&self, target_date: NaiveDate) -> f64 {
        let total = self.projected_total();
        if total > 0.0 {
            (self.projected_before(target_date) / total).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn last_visible_date(&self) -> Option<NaiveDate> {
        self.buckets
            .iter()
            .rev()
            .find(|bucket| !bucket.is_projected())
            .map(|bucket| bucket.date)
    }
}

fn project_hidden_backlog(
    start: NaiveDate,
    hidden_count: f64,
    projection: &ProjectionConfig,
) -> Vec<InventoryBucket> {
    let mut buckets = Vec::new();
    if !(hidden_count > 0.0) {
        return buckets;
    }

    let mut remaining = hidden_count;
    for offset in 0..projection.horizon_years.saturating_mul(12) {
        if remaining <= 0.0 {
            break;
        }
        let date = add_months(start, offset);
        let monthly_inflow =
            (projection.weight_for(date.year()) * projection.base_annual_inflow / 12.0).max(0.0);
        let allocation = remaining.min(monthly_inflow);
        if allocation > 0.0 {
            buckets.push(InventoryBucket::projected(date, allocation));
            remaining -= allocation;
        }
    }

    if remaining > 0.0 {
        tracing::warn!(
            remaining,
            horizon_years = projection.horizon_years,
            "hidden backlog exceeds projection horizon; remainder is not queued"
        );
    }

    buckets
}

/// Share of the hidden backlog ahead of `target_date`, assuming it is spread
/// linearly between `gap_start` (the last visible month) and the snapshot date.
pub fn hidden_gap_fraction(
    gap_start: NaiveDate,
    snapshot_date: NaiveDate,
    target_date: NaiveDate,
) -> f64 {
    let gap_days = snapshot_date.signed_duration_since(gap_start).num_days();
    let position_days = target_date.signed_duration_since(gap_start).num_days();
    if gap_days <= 0 {
        return if position_days > 0 { 1.0 } else { 0.0 };
    }
    (position_days as f64 / gap_days as f64).clamp(0.0, 1.0)
}
