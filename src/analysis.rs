//! Statistics and selection over track feature records.
//!
//! Numeric values are read leniently: JSON numbers, and strings that parse
//! as `f64` (records read back from older stores may carry those).

use serde_json::Value;
use thiserror::Error;

use crate::{types::TrackFeatureRecord, utils::round2};

#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    #[error("no track data to analyse")]
    EmptyDataset,

    #[error("parameter '{0}' is not a numeric feature of the dataset")]
    UnknownParameter(String),
}

/// Mean and sample standard deviation of one numeric feature.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSummary {
    pub name: String,
    pub mean: f64,
    /// Absent with fewer than two values.
    pub stdev: Option<f64>,
}

pub fn numeric_value(record: &TrackFeatureRecord, key: &str) -> Option<f64> {
    match record.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Numeric feature names of the first record, sorted.
pub fn parameter_list(records: &[TrackFeatureRecord]) -> Vec<String> {
    let Some(first) = records.first() else {
        return Vec::new();
    };

    let mut names: Vec<String> = first
        .fields()
        .keys()
        .filter(|key| numeric_value(first, key).is_some())
        .cloned()
        .collect();
    names.sort();
    names
}

/// Summary of every numeric feature, rounded to two decimals.
pub fn summarize(records: &[TrackFeatureRecord]) -> Result<Vec<FieldSummary>, AnalysisError> {
    if records.is_empty() {
        return Err(AnalysisError::EmptyDataset);
    }

    Ok(parameter_list(records)
        .into_iter()
        .filter_map(|name| summarize_field(records, &name))
        .collect())
}

fn summarize_field(records: &[TrackFeatureRecord], name: &str) -> Option<FieldSummary> {
    let values: Vec<f64> = records
        .iter()
        .filter_map(|r| numeric_value(r, name))
        .collect();
    if values.is_empty() {
        return None;
    }

    let count = values.len() as f64;
    let mean = values.iter().sum::<f64>() / count;
    let stdev = (values.len() > 1).then(|| {
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1.0);
        round2(variance.sqrt())
    });

    Some(FieldSummary {
        name: name.to_string(),
        mean: round2(mean),
        stdev,
    })
}

/// Records whose `parameter` lies within `value ± |value|·tolerance`,
/// bounds included. Records without a numeric `parameter` are left out.
pub fn filter_by_parameter<'a>(
    records: &'a [TrackFeatureRecord],
    parameter: &str,
    value: f64,
    tolerance: f64,
) -> Result<Vec<&'a TrackFeatureRecord>, AnalysisError> {
    if records.is_empty() {
        return Err(AnalysisError::EmptyDataset);
    }
    if !records.iter().any(|r| numeric_value(r, parameter).is_some()) {
        return Err(AnalysisError::UnknownParameter(parameter.to_string()));
    }

    let band = value.abs() * tolerance.abs();
    let (lower, upper) = (value - band, value + band);

    Ok(records
        .iter()
        .filter(|r| numeric_value(r, parameter).is_some_and(|x| lower <= x && x <= upper))
        .collect())
}

pub fn track_uris<'a, I>(records: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a TrackFeatureRecord>,
{
    records.into_iter().map(|r| r.uri().to_string()).collect()
}
