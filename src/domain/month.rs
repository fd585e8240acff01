use chrono::{Datelike, Months, NaiveDate};

/// Normalizes a date to the first day of its month.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// Parses `YYYY-MM-DD` or `YYYY-MM` into the first day of that month.
pub fn parse_month(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d"))
        .ok()
        .map(month_start)
}

/// Calendar date reached after waiting `years` from `start`, rounded to whole months.
pub fn date_after_years(start: NaiveDate, years: f64) -> NaiveDate {
    let months = (years.max(0.0) * 12.0).round() as u32;
    add_months(start, months)
}
