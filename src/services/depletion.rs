use chrono::NaiveDate;
use clap::ValueEnum;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::backlog::BacklogQueue;
use crate::domain::trial::{TrialParameters, TrialResult};
use crate::services::parameter_sampler::TrialSampler;
use crate::services::simulation_config::SimulationConfig;

/// Which queue model a run uses. Runs never mix the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepletionModel {
    /// Month-by-month, first-in-first-out consumption of each priority-month cohort.
    #[default]
    MonthlyBuckets,
    /// One running total per year with a fractional final year. Ignores
    /// per-cohort ordering and monthly efficiency noise.
    AnnualAggregate,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepletionSettings {
    pub model: DepletionModel,
    pub child_age_out_rate: f64,
    pub max_months: u32,
}

impl DepletionSettings {
    pub fn from_config(config: &SimulationConfig, model: DepletionModel) -> Self {
        Self {
            model,
            child_age_out_rate: config.child_age_out_rate,
            max_months: config.max_months(),
        }
    }

    fn capped(&self) -> TrialResult {
        TrialResult {
            wait_years: self.max_months as f64 / 12.0,
            converged: false,
        }
    }

    fn monthly_decay(&self, attrition_rate: f64) -> f64 {
        (1.0 - (attrition_rate + self.child_age_out_rate) / 12.0).max(0.0)
    }
}

/// Mutable per-trial copy of the queue counts.
#[derive(Debug, Clone, PartialEq)]
pub struct DepletionState {
    counts: Vec<f64>,
    index: usize,
    months_elapsed: u32,
}

impl DepletionState {
    /// Scales visible cohorts by the dependency ratio and projected cohorts
    /// additionally by the duplicate discount.
    pub fn new(queue: &BacklogQueue, params: &TrialParameters) -> Self {
        let hidden_scale = params.dependency_ratio * (1.0 - params.duplicate_discount);
        let counts = queue
            .buckets()
            .iter()
            .map(|bucket| {
                let scale = if bucket.is_projected() {
                    hidden_scale
                } else {
                    params.dependency_ratio
                };
                (bucket.pending_count * scale).max(0.0)
            })
            .collect();

        Self {
            counts,
            index: 0,
            months_elapsed: 0,
        }
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn months_elapsed(&self) -> u32 {
        self.months_elapsed
    }

    pub fn remaining(&self) -> &[f64] {
        &self.counts
    }

    pub fn is_exhausted(&self) -> bool {
        self.index >= self.counts.len()
    }

    /// Runs one month: decays the head cohort, then consumes `supply`,
    /// carrying any surplus into later cohorts (each decayed as it is reached).
    /// Returns the amount consumed, which equals `supply` unless the queue runs out.
    pub fn advance_month(&mut self, supply: f64, decay: f64) -> f64 {
        self.months_elapsed += 1;
        if let Some(head) = self.counts.get_mut(self.index) {
            *head *= decay;
        }

        let mut carry = supply.max(0.0);
        let mut consumed = 0.0;
        while let Some(count) = self.counts.get_mut(self.index) {
            if carry < *count {
                *count -= carry;
                consumed += carry;
                break;
            }
            consumed += *count;
            carry -= *count;
            *count = 0.0;
            self.index += 1;
            if let Some(next) = self.counts.get_mut(self.index) {
                *next *= decay;
            }
        }
        consumed
    }
}

/// Runs single trials against a shared, read-only queue.
#[derive(Debug, Clone, Copy)]
pub struct DepletionSimulator<'a> {
    queue: &'a BacklogQueue,
    settings: DepletionSettings,
}

impl<'a> DepletionSimulator<'a> {
    pub fn new(queue: &'a BacklogQueue, settings: DepletionSettings) -> Self {
        Self { queue, settings }
    }

    pub fn run<S: TrialSampler, R: Rng + ?Sized>(
        &self,
        params: &TrialParameters,
        target_date: NaiveDate,
        sampler: &S,
        rng: &mut R,
    ) -> TrialResult {
        match self.settings.model {
            DepletionModel::MonthlyBuckets => self.run_monthly(params, target_date, sampler, rng),
            DepletionModel::AnnualAggregate => self.run_annual_aggregate(params, target_date),
        }
    }

    fn run_monthly<S: TrialSampler, R: Rng + ?Sized>(
        &self,
        params: &TrialParameters,
        target_date: NaiveDate,
        sampler: &S,
        rng: &mut R,
    ) -> TrialResult {
        let buckets = self.queue.buckets();
        let mut state = DepletionState::new(self.queue, params);

        loop {
            let reached = match buckets.get(state.current_index()) {
                None => true,
                Some(bucket) => bucket.date >= target_date,
            };
            if reached {
                return TrialResult {
                    wait_years: state.months_elapsed() as f64 / 12.0,
                    converged: true,
                };
            }
            if state.months_elapsed() >= self.settings.max_months {
                return self.settings.capped();
            }

            let year = (state.months_elapsed() / 12) as usize;
            let supply = params.base_monthly_quota * sampler.efficiency_factor(rng)
                + params.spillover_for(year) / 12.0;
            let decay = self.settings.monthly_decay(params.attrition_for(year));
            state.advance_month(supply, decay);
        }
    }

    fn run_annual_aggregate(&self, params: &TrialParameters, target_date: NaiveDate) -> TrialResult {
        let state = DepletionState::new(self.queue, params);
        let mut backlog: f64 = self
            .queue
            .buckets()
            .iter()
            .zip(state.remaining())
            .take_while(|(bucket, _)| bucket.date < target_date)
            .map(|(_, count)| *count)
            .sum();

        let max_years = self.settings.max_months as f64 / 12.0;
        let mut years = 0.0;
        let mut year = 0;
        while backlog > 0.0 {
            if years >= max_years {
                return self.settings.capped();
            }
            let attrition = params.attrition_for(year) + self.settings.child_age_out_rate;
            backlog *= (1.0 - attrition).max(0.0);
            let supply = params.base_monthly_quota * 12.0 + params.spillover_for(year);
            if supply > backlog {
                years += backlog / supply;
                break;
            }
            backlog -= supply;
            years += 1.0;
            year += 1;
        }

        TrialResult {
            wait_years: years.min(max_years),
            converged: true,
        }
    }
}
