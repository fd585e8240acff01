/// One trial's draw of the stochastic inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialParameters {
    pub base_monthly_quota: f64,
    pub yearly_spillover: Vec<f64>,
    pub yearly_attrition_rate: Vec<f64>,
    pub dependency_ratio: f64,
    pub duplicate_discount: f64,
}

impl TrialParameters {
    /// Spillover for `year`, clamped to the last drawn year.
    pub fn spillover_for(&self, year: usize) -> f64 {
        clamped(&self.yearly_spillover, year)
    }

    /// Attrition rate for `year`, clamped to the last drawn year.
    pub fn attrition_for(&self, year: usize) -> f64 {
        clamped(&self.yearly_attrition_rate, year)
    }
}

fn clamped(values: &[f64], index: usize) -> f64 {
    values
        .get(index)
        .or_else(|| values.last())
        .copied()
        .unwrap_or(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialResult {
    pub wait_years: f64,
    /// `false` when the trial hit the month cap before reaching the target.
    pub converged: bool,
}

impl TrialResult {
    pub fn zero() -> Self {
        Self {
            wait_years: 0.0,
            converged: true,
        }
    }
}

/// Per-trial results in trial order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub trials: Vec<TrialResult>,
    pub already_current: bool,
}

impl ResultSet {
    pub fn wait_years(&self) -> Vec<f64> {
        self.trials.iter().map(|trial| trial.wait_years).collect()
    }

    pub fn non_converged(&self) -> usize {
        self.trials.iter().filter(|trial| !trial.converged).count()
    }

    pub fn is_reliable(&self) -> bool {
        self.non_converged() == 0
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }
}
