use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{info, warn};

use crate::domain::backlog::BacklogQueue;
use crate::domain::trial::{ResultSet, TrialResult};
use crate::services::depletion::{DepletionSettings, DepletionSimulator};
use crate::services::parameter_sampler::TrialSampler;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialPlan {
    pub target_date: NaiveDate,
    /// Bulletin cutoff; a target before it is already current.
    pub cutoff_date: Option<NaiveDate>,
    pub trial_count: usize,
    pub horizon_years: usize,
    pub seed: u64,
    pub depletion: DepletionSettings,
}

impl TrialPlan {
    pub fn is_already_current(&self) -> bool {
        self.cutoff_date
            .is_some_and(|cutoff| self.target_date < cutoff)
    }
}

/// Runs `plan.trial_count` independent trials in parallel. Each trial owns an
/// RNG seeded from the plan's master seed, so results depend only on the seed
/// and come back in trial order.
pub fn run_all<S: TrialSampler + Sync>(
    queue: &BacklogQueue,
    sampler: &S,
    plan: &TrialPlan,
) -> ResultSet {
    if plan.is_already_current() {
        info!(
            target_date = %plan.target_date,
            "target date precedes the bulletin cutoff; skipping simulation"
        );
        return ResultSet {
            trials: vec![TrialResult::zero(); plan.trial_count],
            already_current: true,
        };
    }

    info!(
        trials = plan.trial_count,
        buckets = queue.len(),
        model = ?plan.depletion.model,
        seed = plan.seed,
        "running trials"
    );
    let simulator = DepletionSimulator::new(queue, plan.depletion);
    let trials: Vec<TrialResult> = trial_seeds(plan.seed, plan.trial_count)
        .into_par_iter()
        .map(|seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let params = sampler.sample(plan.horizon_years, &mut rng);
            simulator.run(&params, plan.target_date, sampler, &mut rng)
        })
        .collect();

    let results = ResultSet {
        trials,
        already_current: false,
    };
    let non_converged = results.non_converged();
    if non_converged > 0 {
        warn!(
            non_converged,
            trials = results.len(),
            "trials hit the wait cap; results are unreliable"
        );
    }
    info!(trials = results.len(), "trials finished");
    results
}

fn trial_seeds(master_seed: u64, count: usize) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(master_seed);
    (0..count).map(|_| rng.r#gen()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backlog::ProjectionConfig;
    use crate::domain::inventory::InventoryBucket;
    use crate::services::depletion::DepletionModel;
    use crate::services::parameter_sampler::ParameterSampler;
    use crate::services::simulation_config::SimulationConfig;
    use crate::test_support::{fixed_params, on_date, FixedSampler};

    fn plan(target_date: NaiveDate, cutoff_date: Option<NaiveDate>, seed: u64) -> TrialPlan {
        let config = SimulationConfig::default();
        TrialPlan {
            target_date,
            cutoff_date,
            trial_count: 200,
            horizon_years: config.horizon_years,
            seed,
            depletion: DepletionSettings::from_config(&config, DepletionModel::MonthlyBuckets),
        }
    }

    fn realistic_queue() -> BacklogQueue {
        let mut buckets: Vec<InventoryBucket> = (1..=12)
            .map(|month| InventoryBucket::visible(on_date(2014, month, 1), 1_500.0))
            .collect();
        buckets.extend(
            BacklogQueue::build(
                &[],
                "India",
                "EB2",
                20_000.0,
                on_date(2015, 1, 1),
                &ProjectionConfig::default(),
            )
            .buckets()
            .iter()
            .cloned(),
        );
        BacklogQueue::from_buckets(buckets)
    }

    #[test]
    fn target_before_cutoff_returns_all_zero_results() {
        let sampler = FixedSampler::new(fixed_params(0.0, 0.0, 0.0));
        let results = run_all(
            &realistic_queue(),
            &sampler,
            &plan(on_date(2012, 1, 1), Some(on_date(2013, 7, 15)), 1),
        );

        assert!(results.already_current);
        assert_eq!(results.len(), 200);
        assert!(results.wait_years().iter().all(|years| *years == 0.0));
    }

    #[test]
    fn same_seed_reproduces_results() {
        let sampler = ParameterSampler::from_config(&SimulationConfig::default()).unwrap();
        let queue = realistic_queue();
        let plan = plan(on_date(2016, 6, 1), Some(on_date(2013, 7, 15)), 42);

        let first = run_all(&queue, &sampler, &plan);
        let second = run_all(&queue, &sampler, &plan);

        assert_eq!(first, second);
        assert!(!first.already_current);
    }

    #[test]
    fn different_seeds_give_different_distributions() {
        let sampler = ParameterSampler::from_config(&SimulationConfig::default()).unwrap();
        let queue = realistic_queue();

        let first = run_all(&queue, &sampler, &plan(on_date(2016, 6, 1), None, 1));
        let second = run_all(&queue, &sampler, &plan(on_date(2016, 6, 1), None, 2));

        assert_ne!(first.wait_years(), second.wait_years());
    }

    #[test]
    fn every_trial_stays_within_the_cap() {
        let sampler = ParameterSampler::from_config(&SimulationConfig::default()).unwrap();
        let results = run_all(
            &realistic_queue(),
            &sampler,
            &plan(on_date(2030, 1, 1), None, 9),
        );

        assert_eq!(results.len(), 200);
        assert!(results
            .wait_years()
            .iter()
            .all(|years| (0.0..=120.0).contains(years)));
        assert!(results.wait_years().iter().any(|years| *years > 0.0));
    }

    #[test]
    fn zero_trials_yield_empty_result_set() {
        let sampler = FixedSampler::new(fixed_params(1.0, 0.0, 0.0));
        let mut plan = plan(on_date(2016, 6, 1), None, 1);
        plan.trial_count = 0;

        let results = run_all(&realistic_queue(), &sampler, &plan);
        assert!(results.is_empty());
    }
}
