use chrono::NaiveDate;
use rand::Rng;

use crate::domain::inventory::{InventoryRow, AWAITING_AVAILABILITY};
use crate::domain::trial::TrialParameters;
use crate::services::parameter_sampler::TrialSampler;

/// A TrialSampler that always returns the same draw and no efficiency noise.
pub struct FixedSampler {
    pub params: TrialParameters,
    pub efficiency: f64,
}

impl FixedSampler {
    pub fn new(params: TrialParameters) -> Self {
        Self {
            params,
            efficiency: 1.0,
        }
    }
}

impl TrialSampler for FixedSampler {
    fn sample<R: Rng + ?Sized>(&self, _horizon_years: usize, _rng: &mut R) -> TrialParameters {
        self.params.clone()
    }

    fn efficiency_factor<R: Rng + ?Sized>(&self, _rng: &mut R) -> f64 {
        self.efficiency
    }
}

/// One year of constant spillover and attrition; dependency ratio 1, no duplicates.
pub fn fixed_params(base_monthly_quota: f64, spillover: f64, attrition: f64) -> TrialParameters {
    TrialParameters {
        base_monthly_quota,
        yearly_spillover: vec![spillover],
        yearly_attrition_rate: vec![attrition],
        dependency_ratio: 1.0,
        duplicate_discount: 0.0,
    }
}

pub fn on_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn build_row(country: &str, category: &str, date: NaiveDate, count: f64) -> InventoryRow {
    InventoryRow {
        country_of_chargeability: country.to_string(),
        preference_category: category.to_string(),
        visa_status: AWAITING_AVAILABILITY.to_string(),
        priority_date_month: date.format("%B").to_string(),
        year: date.format("%Y").to_string(),
        count,
        date,
    }
}
