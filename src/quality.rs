// ✅ Quality Evaluator - scalar data-quality metrics for a record set
//
// Two compliance formulas exist in this system's history:
//   missing-cells: 100 × (rows − missing cells) / rows, over the set itself
//   valid-rows:    100 × surviving rows / original rows
// The basis is picked in config; missing-cells is the default. Quality is
// observational: the metrics are logged and persisted, nothing downstream
// consumes them.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::record::{ensure_parent_dir, RawRecord};

// ============================================================================
// COMPLIANCE BASIS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComplianceBasis {
    /// Share of non-missing cells relative to the row count of the set.
    #[default]
    MissingCells,

    /// Share of rows that survived cleaning relative to the raw extract.
    ValidRows,
}

// ============================================================================
// QUALITY METRICS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub total_records: usize,
    pub missing_values: usize,
    /// Percentage in [0, 100]. NaN is the sentinel for "no records to
    /// measure" - never produced by dividing by zero.
    pub compliance_rate: f64,
    pub computed_at: DateTime<Utc>,
}

impl QualityMetrics {
    /// In-set variant: count missing cells across every field of every
    /// record. The rate is clamped so a row missing several cells cannot
    /// push it below zero.
    pub fn from_records(records: &[RawRecord]) -> Self {
        let total_records = records.len();
        let missing_values: usize = records.iter().map(RawRecord::missing_cells).sum();

        let compliance_rate = if total_records == 0 {
            f64::NAN
        } else {
            let rate =
                100.0 * (total_records as f64 - missing_values as f64) / total_records as f64;
            rate.clamp(0.0, 100.0)
        };

        QualityMetrics {
            total_records,
            missing_values,
            compliance_rate,
            computed_at: Utc::now(),
        }
    }

    /// Against-source variant: compare the cleaned row count with the raw
    /// extract's row count.
    pub fn against_source(cleaned_rows: usize, original_rows: usize) -> Self {
        let compliance_rate = if original_rows == 0 {
            f64::NAN
        } else {
            100.0 * cleaned_rows as f64 / original_rows as f64
        };

        QualityMetrics {
            total_records: original_rows,
            missing_values: original_rows.saturating_sub(cleaned_rows),
            compliance_rate,
            computed_at: Utc::now(),
        }
    }

    /// True when the rate carries a value (the set was non-empty).
    pub fn is_defined(&self) -> bool {
        !self.compliance_rate.is_nan()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} records, {} missing values, {:.2}% compliant",
            self.total_records, self.missing_values, self.compliance_rate
        )
    }
}

/// Persist the metrics as JSON next to the tables. NaN serializes as
/// null, which is the on-disk form of the sentinel.
pub fn write_metrics(path: &Path, metrics: &QualityMetrics) -> Result<()> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(metrics)
        .context("failed to serialize quality metrics")?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(region: Option<&str>, risk_score: Option<f64>) -> RawRecord {
        RawRecord {
            location_region: region.map(str::to_string),
            risk_score,
            amount: Some(1.0),
            transaction_type: Some("sale".to_string()),
            receiving_address: Some("a1".to_string()),
            timestamp: Some(1),
        }
    }

    #[test]
    fn test_three_rows_two_missing_cells_is_33_33() {
        // Matches the historical fixture: region missing in row 2,
        // risk_score missing in row 3.
        let records = vec![
            raw(Some("region one"), Some(10.0)),
            raw(None, Some(20.0)),
            raw(Some("region two"), None),
        ];

        let metrics = QualityMetrics::from_records(&records);
        assert_eq!(metrics.total_records, 3);
        assert_eq!(metrics.missing_values, 2);
        assert_eq!(format!("{:.2}", metrics.compliance_rate), "33.33");
    }

    #[test]
    fn test_fully_populated_set_is_100_percent() {
        let records = vec![raw(Some("region"), Some(1.0)); 4];
        let metrics = QualityMetrics::from_records(&records);
        assert_eq!(metrics.missing_values, 0);
        assert_eq!(metrics.compliance_rate, 100.0);
    }

    #[test]
    fn test_empty_set_reports_nan_sentinel() {
        let metrics = QualityMetrics::from_records(&[]);
        assert_eq!(metrics.total_records, 0);
        assert_eq!(metrics.missing_values, 0);
        assert!(metrics.compliance_rate.is_nan());
        assert!(!metrics.is_defined());
    }

    #[test]
    fn test_rate_is_clamped_when_rows_miss_several_cells() {
        // One row, every cell missing: the unclamped formula would go to
        // -500%.
        let records = vec![RawRecord::default()];
        let metrics = QualityMetrics::from_records(&records);
        assert_eq!(metrics.missing_values, crate::record::FIELD_COUNT);
        assert_eq!(metrics.compliance_rate, 0.0);
    }

    #[test]
    fn test_rate_stays_in_bounds_for_nonempty_sets() {
        let records = vec![
            raw(Some("region"), Some(1.0)),
            raw(None, None),
            raw(Some("other"), None),
        ];
        let metrics = QualityMetrics::from_records(&records);
        assert!(metrics.compliance_rate >= 0.0);
        assert!(metrics.compliance_rate <= 100.0);
    }

    #[test]
    fn test_against_source_counts_dropped_rows() {
        let metrics = QualityMetrics::against_source(1, 3);
        assert_eq!(metrics.total_records, 3);
        assert_eq!(metrics.missing_values, 2);
        assert_eq!(format!("{:.2}", metrics.compliance_rate), "33.33");
    }

    #[test]
    fn test_against_source_empty_extract_is_nan() {
        let metrics = QualityMetrics::against_source(0, 0);
        assert!(metrics.compliance_rate.is_nan());
    }

    #[test]
    fn test_metrics_persist_as_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("output").join("metrics.json");

        let metrics = QualityMetrics::from_records(&[raw(Some("region"), Some(1.0))]);
        write_metrics(&path, &metrics).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["total_records"], 1);
        assert_eq!(json["missing_values"], 0);
        assert_eq!(json["compliance_rate"], 100.0);
    }

    #[test]
    fn test_summary_formats_two_decimals() {
        let records = vec![
            raw(Some("region one"), Some(10.0)),
            raw(None, Some(20.0)),
            raw(Some("region two"), None),
        ];
        let summary = QualityMetrics::from_records(&records).summary();
        assert!(summary.contains("33.33%"));
    }
}
