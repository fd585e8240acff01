use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::backlog::ProjectionConfig;

const PROBABILITY_TOLERANCE: f64 = 1e-6;

#[derive(Error, Debug)]
pub enum SimulationConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config yaml: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuotaConfig {
    pub annual_quota_cap: f64,
    pub country_cap_fraction: f64,
    pub category_preference_fraction: f64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            annual_quota_cap: 140_000.0,
            country_cap_fraction: 0.07,
            category_preference_fraction: 0.286,
        }
    }
}

impl QuotaConfig {
    pub fn base_monthly_quota(&self) -> f64 {
        self.annual_quota_cap * self.country_cap_fraction * self.category_preference_fraction
            / 12.0
    }
}

/// A named spillover scenario: `[min, max)` visas per year, chosen with `probability`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpilloverBand {
    pub name: String,
    pub min: u32,
    pub max: u32,
    pub probability: f64,
}

impl SpilloverBand {
    fn new(name: &str, min: u32, max: u32, probability: f64) -> Self {
        Self {
            name: name.to_string(),
            min,
            max,
            probability,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UniformRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TriangularParams {
    pub left: f64,
    pub mode: f64,
    pub right: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub quota: QuotaConfig,
    pub spillover_bands: Vec<SpilloverBand>,
    /// Annual dropout rate, drawn per year.
    pub attrition: UniformRange,
    /// Family members per principal applicant, drawn per trial.
    pub dependency_ratio: TriangularParams,
    /// Share of the hidden backlog that are duplicate or ported filings, drawn per trial.
    pub duplicate_discount: UniformRange,
    /// Monthly processing-rate noise applied to the base quota.
    pub efficiency: UniformRange,
    pub child_age_out_rate: f64,
    pub horizon_years: usize,
    pub max_wait_years: u32,
    pub trials: usize,
    pub seed: Option<u64>,
    pub projection: ProjectionConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            quota: QuotaConfig::default(),
            spillover_bands: vec![
                SpilloverBand::new("zero", 0, 2_000, 0.30),
                SpilloverBand::new("low", 2_000, 15_000, 0.35),
                SpilloverBand::new("moderate", 15_000, 40_000, 0.25),
                SpilloverBand::new("high", 40_000, 60_000, 0.08),
                SpilloverBand::new("extreme", 100_000, 160_000, 0.02),
            ],
            attrition: UniformRange {
                min: 0.01,
                max: 0.04,
            },
            dependency_ratio: TriangularParams {
                left: 1.9,
                mode: 1.9,
                right: 3.0,
            },
            duplicate_discount: UniformRange {
                min: 0.05,
                max: 0.10,
            },
            efficiency: UniformRange { min: 0.8, max: 1.2 },
            child_age_out_rate: 0.01,
            horizon_years: 100,
            max_wait_years: 120,
            trials: 1_000,
            seed: None,
            projection: ProjectionConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn max_months(&self) -> u32 {
        self.max_wait_years.saturating_mul(12)
    }

    pub fn validate(&self) -> Result<(), SimulationConfigError> {
        let quota = &self.quota;
        if !(quota.annual_quota_cap > 0.0) {
            return Err(invalid("quota.annual_quota_cap", "must be positive"));
        }
        check_fraction("quota.country_cap_fraction", quota.country_cap_fraction)?;
        check_fraction(
            "quota.category_preference_fraction",
            quota.category_preference_fraction,
        )?;

        if self.spillover_bands.is_empty() {
            return Err(invalid("spillover_bands", "at least one band is required"));
        }
        for band in &self.spillover_bands {
            if band.min > band.max {
                return Err(invalid(
                    "spillover_bands",
                    format!("band {} has min {} above max {}", band.name, band.min, band.max),
                ));
            }
            if !(band.probability >= 0.0) {
                return Err(invalid(
                    "spillover_bands",
                    format!("band {} has a negative probability", band.name),
                ));
            }
        }
        let total: f64 = self.spillover_bands.iter().map(|band| band.probability).sum();
        if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(invalid(
                "spillover_bands",
                format!("probabilities sum to {total}, expected 1"),
            ));
        }

        check_rate_range("attrition", self.attrition)?;
        check_rate_range("duplicate_discount", self.duplicate_discount)?;
        check_range("efficiency", self.efficiency)?;
        if self.efficiency.min < 0.0 {
            return Err(invalid("efficiency", "must not be negative"));
        }

        let dep = self.dependency_ratio;
        if !(dep.left <= dep.mode && dep.mode <= dep.right) {
            return Err(invalid(
                "dependency_ratio",
                format!(
                    "expected left <= mode <= right, got {} / {} / {}",
                    dep.left, dep.mode, dep.right
                ),
            ));
        }
        if dep.left < 0.0 {
            return Err(invalid("dependency_ratio", "must not be negative"));
        }

        check_fraction("child_age_out_rate", self.child_age_out_rate)?;
        if self.horizon_years == 0 {
            return Err(invalid("horizon_years", "must be greater than zero"));
        }
        if self.max_wait_years == 0 {
            return Err(invalid("max_wait_years", "must be greater than zero"));
        }
        if self.trials == 0 {
            return Err(invalid("trials", "must be greater than zero"));
        }
        if !(self.projection.base_annual_inflow >= 0.0) {
            return Err(invalid("projection.base_annual_inflow", "must not be negative"));
        }
        if self.projection.default_weight < 0.0
            || self.projection.weight_overrides.values().any(|w| !(*w >= 0.0))
        {
            return Err(invalid("projection", "weights must not be negative"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> SimulationConfigError {
    SimulationConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn check_fraction(field: &'static str, value: f64) -> Result<(), SimulationConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, format!("{value} is outside [0, 1]")))
    }
}

fn check_range(field: &'static str, range: UniformRange) -> Result<(), SimulationConfigError> {
    if range.min.is_finite() && range.max.is_finite() && range.min <= range.max {
        Ok(())
    } else {
        Err(invalid(
            field,
            format!("expected min <= max, got {} / {}", range.min, range.max),
        ))
    }
}

fn check_rate_range(field: &'static str, range: UniformRange) -> Result<(), SimulationConfigError> {
    check_range(field, range)?;
    check_fraction(field, range.min)?;
    check_fraction(field, range.max)
}

/// Loads and validates a [`SimulationConfig`]; fields missing from the file keep their defaults.
pub fn load_simulation_config_from_yaml_file<P: AsRef<Path>>(
    path: P,
) -> Result<SimulationConfig, SimulationConfigError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| SimulationConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    deserialize_simulation_config_from_yaml_str(&contents)
}

pub fn deserialize_simulation_config_from_yaml_str(
    contents: &str,
) -> Result<SimulationConfig, SimulationConfigError> {
    let config = if contents.trim().is_empty() {
        SimulationConfig::default()
    } else {
        serde_yaml::from_str(contents)?
    };
    config.validate()?;
    Ok(config)
}
