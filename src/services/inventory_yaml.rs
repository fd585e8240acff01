use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::inventory::InventoryRow;
use crate::domain::month::parse_month;

/// Bulletin placeholder for "no applicants".
const SENTINEL_NONE: &str = "-";
/// Bulletin placeholder for suppressed small counts.
const SENTINEL_SUPPRESSED: &str = "D";
const SUPPRESSED_COUNT: f64 = 5.0;

#[derive(Error, Debug)]
pub enum InventoryYamlError {
    #[error("failed to read inventory file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse inventory yaml: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid date in inventory row {row}: {value} (expected YYYY-MM-DD or YYYY-MM)")]
    InvalidDate { row: usize, value: String },
    #[error("invalid count in inventory row {row}: {value}")]
    InvalidCount { row: usize, value: String },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScalarRecord {
    Number(f64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct InventoryRecord {
    country_of_chargeability: String,
    preference_category: String,
    visa_status: String,
    #[serde(default)]
    priority_date_month: Option<String>,
    #[serde(default)]
    year: Option<ScalarRecord>,
    count: ScalarRecord,
    date: String,
}

pub fn load_inventory_from_yaml_file<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<InventoryRow>, InventoryYamlError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| InventoryYamlError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    deserialize_inventory_from_yaml_str(&contents)
}

pub fn deserialize_inventory_from_yaml_str(
    contents: &str,
) -> Result<Vec<InventoryRow>, InventoryYamlError> {
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }
    let records: Vec<InventoryRecord> = serde_yaml::from_str(contents)?;
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| convert_record(index + 1, record))
        .collect()
}

fn convert_record(row: usize, record: InventoryRecord) -> Result<InventoryRow, InventoryYamlError> {
    let date = parse_month(&record.date).ok_or_else(|| InventoryYamlError::InvalidDate {
        row,
        value: record.date.clone(),
    })?;
    let count = resolve_count(&record.count).ok_or_else(|| InventoryYamlError::InvalidCount {
        row,
        value: scalar_to_string(&record.count),
    })?;

    Ok(InventoryRow {
        country_of_chargeability: record.country_of_chargeability,
        preference_category: record.preference_category,
        visa_status: record.visa_status,
        priority_date_month: record.priority_date_month.unwrap_or_default(),
        year: record.year.as_ref().map(scalar_to_string).unwrap_or_default(),
        count,
        date,
    })
}

fn resolve_count(count: &ScalarRecord) -> Option<f64> {
    let value = match count {
        ScalarRecord::Number(value) => *value,
        ScalarRecord::Text(text) => match text.trim() {
            SENTINEL_NONE | "" => 0.0,
            SENTINEL_SUPPRESSED => SUPPRESSED_COUNT,
            other => other.replace(',', "").parse::<f64>().ok()?,
        },
    };
    (value.is_finite() && value >= 0.0).then_some(value)
}

fn scalar_to_string(value: &ScalarRecord) -> String {
    match value {
        ScalarRecord::Number(number) if number.fract() == 0.0 => format!("{number:.0}"),
        ScalarRecord::Number(number) => number.to_string(),
        ScalarRecord::Text(text) => text.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::on_date;

    #[test]
    fn deserializes_tidy_rows() {
        let yaml = r#"
- country_of_chargeability: India
  preference_category: EB2
  visa_status: Awaiting Availability
  priority_date_month: August
  year: 2016
  count: 1234
  date: 2016-08-01
- country_of_chargeability: India
  preference_category: EB2
  visa_status: Awaiting Availability
  priority_date_month: January
  year: Prior Years
  count: "2,500"
  date: 2010-01
"#;
        let rows = deserialize_inventory_from_yaml_str(yaml).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].count, 1_234.0);
        assert_eq!(rows[0].date, on_date(2016, 8, 1));
        assert_eq!(rows[0].year, "2016");
        assert_eq!(rows[0].priority_date_month, "August");
        assert_eq!(rows[1].count, 2_500.0);
        assert_eq!(rows[1].date, on_date(2010, 1, 1));
        assert_eq!(rows[1].year, "Prior Years");
    }

    #[test]
    fn resolves_bulletin_sentinels() {
        let yaml = r#"
- { country_of_chargeability: India, preference_category: EB2, visa_status: Awaiting Availability, count: "-", date: 2016-01 }
- { country_of_chargeability: India, preference_category: EB2, visa_status: Awaiting Availability, count: D, date: 2016-02 }
"#;
        let rows = deserialize_inventory_from_yaml_str(yaml).unwrap();

        assert_eq!(rows[0].count, 0.0);
        assert_eq!(rows[1].count, 5.0);
        assert_eq!(rows[1].priority_date_month, "");
    }

    #[test]
    fn rejects_unknown_count_text() {
        let yaml = "- { country_of_chargeability: India, preference_category: EB2, visa_status: x, count: lots, date: 2016-01 }\n";
        let error = deserialize_inventory_from_yaml_str(yaml).expect_err("expected count error");

        assert!(matches!(error, InventoryYamlError::InvalidCount { row: 1, .. }));
    }

    #[test]
    fn rejects_negative_counts() {
        let yaml = "- { country_of_chargeability: India, preference_category: EB2, visa_status: x, count: -3, date: 2016-01 }\n";
        let error = deserialize_inventory_from_yaml_str(yaml).expect_err("expected count error");

        assert!(matches!(error, InventoryYamlError::InvalidCount { .. }));
    }

    #[test]
    fn rejects_invalid_dates_with_row_number() {
        let yaml = r#"
- { country_of_chargeability: India, preference_category: EB2, visa_status: x, count: 1, date: 2016-01 }
- { country_of_chargeability: India, preference_category: EB2, visa_status: x, count: 1, date: August 2016 }
"#;
        let error = deserialize_inventory_from_yaml_str(yaml).expect_err("expected date error");

        assert!(matches!(error, InventoryYamlError::InvalidDate { row: 2, .. }));
    }

    #[test]
    fn rejects_rows_with_missing_columns() {
        let yaml = "- { country_of_chargeability: India, count: 1, date: 2016-01 }\n";
        let error = deserialize_inventory_from_yaml_str(yaml).expect_err("expected parse error");

        assert!(matches!(error, InventoryYamlError::Parse(_)));
    }

    #[test]
    fn empty_document_has_no_rows() {
        assert!(deserialize_inventory_from_yaml_str("").unwrap().is_empty());
        assert!(deserialize_inventory_from_yaml_str("[]").unwrap().is_empty());
    }
}
