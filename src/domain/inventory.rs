use chrono::NaiveDate;

pub const AWAITING_AVAILABILITY: &str = "Awaiting Availability";

/// One row of the tidy inventory table.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryRow {
    pub country_of_chargeability: String,
    pub preference_category: String,
    pub visa_status: String,
    pub priority_date_month: String,
    pub year: String,
    pub count: f64,
    pub date: NaiveDate,
}

impl InventoryRow {
    pub fn is_awaiting_availability(&self) -> bool {
        self.visa_status.trim().eq_ignore_ascii_case(AWAITING_AVAILABILITY)
    }

    /// Country must match exactly (ignoring case); the category only has to
    /// contain the requested token, so `EB2` selects `2nd (EB2)` style labels.
    pub fn matches(&self, country: &str, category: &str) -> bool {
        self.country_of_chargeability.trim().eq_ignore_ascii_case(country.trim())
            && self
                .preference_category
                .to_ascii_lowercase()
                .contains(&category.trim().to_ascii_lowercase())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketOrigin {
    Visible,
    Projected,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InventoryBucket {
    pub date: NaiveDate,
    pub pending_count: f64,
    pub origin: BucketOrigin,
}

impl InventoryBucket {
    pub fn visible(date: NaiveDate, pending_count: f64) -> Self {
        Self {
            date,
            pending_count,
            origin: BucketOrigin::Visible,
        }
    }

    pub fn projected(date: NaiveDate, pending_count: f64) -> Self {
        Self {
            date,
            pending_count,
            origin: BucketOrigin::Projected,
        }
    }

    pub fn is_projected(&self) -> bool {
        self.origin == BucketOrigin::Projected
    }
}

/// Aggregate count of applicants that are not yet visible in the inventory.
#[derive(Debug, Clone, PartialEq)]
pub struct HiddenBacklogSnapshot {
    pub country: String,
    pub category: String,
    pub count: f64,
    pub snapshot_date: NaiveDate,
}
