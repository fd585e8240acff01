use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::inventory::HiddenBacklogSnapshot;
use crate::domain::month::parse_month;

#[derive(Error, Debug)]
pub enum HiddenBacklogYamlError {
    #[error("failed to read hidden backlog file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse hidden backlog yaml: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid snapshot date for {country} {category}: {value} (expected YYYY-MM-DD)")]
    InvalidDate {
        country: String,
        category: String,
        value: String,
    },
    #[error("invalid hidden backlog count for {country} {category}: {count}")]
    InvalidCount {
        country: String,
        category: String,
        count: f64,
    },
    #[error("no hidden backlog snapshot for {country} {category}")]
    NotFound { country: String, category: String },
}

#[derive(Debug, Deserialize)]
struct SnapshotRecord {
    country: String,
    category: String,
    count: f64,
    snapshot_date: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SnapshotDocument {
    Many(Vec<SnapshotRecord>),
    One(SnapshotRecord),
}

pub fn load_hidden_backlog_from_yaml_file<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<HiddenBacklogSnapshot>, HiddenBacklogYamlError> {
    let path = path.as_ref();
    let contents =
        std::fs::read_to_string(path).map_err(|source| HiddenBacklogYamlError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    deserialize_hidden_backlog_from_yaml_str(&contents)
}

/// Accepts a single snapshot mapping or a sequence of them.
pub fn deserialize_hidden_backlog_from_yaml_str(
    contents: &str,
) -> Result<Vec<HiddenBacklogSnapshot>, HiddenBacklogYamlError> {
    let records = match serde_yaml::from_str::<SnapshotDocument>(contents)? {
        SnapshotDocument::Many(records) => records,
        SnapshotDocument::One(record) => vec![record],
    };
    records.into_iter().map(convert_record).collect()
}

fn convert_record(record: SnapshotRecord) -> Result<HiddenBacklogSnapshot, HiddenBacklogYamlError> {
    let Some(snapshot_date) = chrono::NaiveDate::parse_from_str(&record.snapshot_date, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_month(&record.snapshot_date))
    else {
        return Err(HiddenBacklogYamlError::InvalidDate {
            country: record.country,
            category: record.category,
            value: record.snapshot_date,
        });
    };
    if !record.count.is_finite() || record.count < 0.0 {
        return Err(HiddenBacklogYamlError::InvalidCount {
            country: record.country,
            category: record.category,
            count: record.count,
        });
    }

    Ok(HiddenBacklogSnapshot {
        country: record.country,
        category: record.category,
        count: record.count,
        snapshot_date,
    })
}

/// Picks the snapshot for a country and category (both compared case-insensitively).
pub fn find_snapshot<'a>(
    snapshots: &'a [HiddenBacklogSnapshot],
    country: &str,
    category: &str,
) -> Result<&'a HiddenBacklogSnapshot, HiddenBacklogYamlError> {
    snapshots
        .iter()
        .find(|snapshot| {
            snapshot.country.trim().eq_ignore_ascii_case(country.trim())
                && snapshot.category.trim().eq_ignore_ascii_case(category.trim())
        })
        .ok_or_else(|| HiddenBacklogYamlError::NotFound {
            country: country.to_string(),
            category: category.to_string(),
        })
}
