use rand::distributions::{Uniform, WeightedError, WeightedIndex};
use rand::Rng;
use rand_distr::{Distribution, Triangular, TriangularError};
use thiserror::Error;

use crate::domain::trial::TrialParameters;
use crate::services::simulation_config::{SimulationConfig, SimulationConfigError};

#[derive(Error, Debug)]
pub enum SamplerError {
    #[error(transparent)]
    Config(#[from] SimulationConfigError),
    #[error("invalid spillover band weights: {0}")]
    SpilloverWeights(#[from] WeightedError),
    #[error("invalid dependency ratio distribution: {0}")]
    DependencyRatio(#[from] TriangularError),
}

/// Draws the stochastic inputs of a trial. Implementations keep no state
/// between calls; all randomness comes from the RNG handed in.
pub trait TrialSampler {
    fn sample<R: Rng + ?Sized>(&self, horizon_years: usize, rng: &mut R) -> TrialParameters;

    /// Monthly processing-rate multiplier for the base quota.
    fn efficiency_factor<R: Rng + ?Sized>(&self, rng: &mut R) -> f64;
}

#[derive(Debug, Clone)]
enum DependencyRatio {
    Fixed(f64),
    Triangular(Triangular<f64>),
}

#[derive(Debug, Clone)]
pub struct ParameterSampler {
    base_monthly_quota: f64,
    band_ranges: Vec<(u32, u32)>,
    band_index: WeightedIndex<f64>,
    attrition: Uniform<f64>,
    dependency_ratio: DependencyRatio,
    duplicate_discount: Uniform<f64>,
    efficiency: Uniform<f64>,
}

impl ParameterSampler {
    pub fn from_config(config: &SimulationConfig) -> Result<Self, SamplerError> {
        config.validate()?;

        let band_index =
            WeightedIndex::new(config.spillover_bands.iter().map(|band| band.probability))?;
        let band_ranges = config
            .spillover_bands
            .iter()
            .map(|band| (band.min, band.max))
            .collect();

        let dep = config.dependency_ratio;
        let dependency_ratio = if (dep.right - dep.left).abs() < f64::EPSILON {
            DependencyRatio::Fixed(dep.left)
        } else {
            DependencyRatio::Triangular(Triangular::new(dep.left, dep.right, dep.mode)?)
        };

        Ok(Self {
            base_monthly_quota: config.quota.base_monthly_quota(),
            band_ranges,
            band_index,
            attrition: Uniform::new_inclusive(config.attrition.min, config.attrition.max),
            dependency_ratio,
            duplicate_discount: Uniform::new_inclusive(
                config.duplicate_discount.min,
                config.duplicate_discount.max,
            ),
            efficiency: Uniform::new_inclusive(config.efficiency.min, config.efficiency.max),
        })
    }

    fn sample_spillover<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let (min, max) = self.band_ranges[self.band_index.sample(rng)];
        if min < max {
            rng.gen_range(min..max) as f64
        } else {
            min as f64
        }
    }
}

impl TrialSampler for ParameterSampler {
    fn sample<R: Rng + ?Sized>(&self, horizon_years: usize, rng: &mut R) -> TrialParameters {
        let yearly_spillover = (0..horizon_years)
            .map(|_| self.sample_spillover(rng))
            .collect();
        let yearly_attrition_rate = (0..horizon_years)
            .map(|_| self.attrition.sample(rng))
            .collect();
        let dependency_ratio = match &self.dependency_ratio {
            DependencyRatio::Fixed(value) => *value,
            DependencyRatio::Triangular(dist) => dist.sample(rng),
        };

        TrialParameters {
            base_monthly_quota: self.base_monthly_quota,
            yearly_spillover,
            yearly_attrition_rate,
            dependency_ratio,
            duplicate_discount: self.duplicate_discount.sample(rng),
        }
    }

    fn efficiency_factor<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.efficiency.sample(rng)
    }
}
