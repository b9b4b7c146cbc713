// 📄 Record model - raw rows, cleaned rows, and the CSV boundary
//
// Two representations, one schema:
//   RawRecord   - every field lenient. Unparseable or empty cells become
//                 missing (None), never errors.
//   CleanRecord - fully typed. Only rows that survived cleaning can be
//                 represented; this is what gets persisted and re-read by
//                 the downstream stages.
//
// All file access for record sets lives here so the stage logic stays
// pure (record set in, record set out).

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;

use crate::error::PipelineError;

/// Columns every input extract must carry. Order matches the cleaned-set
/// schema written back to disk.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "location_region",
    "risk_score",
    "amount",
    "transaction_type",
    "receiving_address",
    "timestamp",
];

/// Cells per record, for missing-cell accounting.
pub const FIELD_COUNT: usize = REQUIRED_COLUMNS.len();

// ============================================================================
// RAW RECORD (lenient)
// ============================================================================

/// One input row as extracted, before cleaning. Every field is optional:
/// a cell that is absent, empty, or unparseable is simply missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub location_region: Option<String>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub risk_score: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub amount: Option<f64>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub transaction_type: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub receiving_address: Option<String>,

    #[serde(default, deserialize_with = "lenient_i64")]
    pub timestamp: Option<i64>,
}

impl RawRecord {
    /// Number of missing cells in this record (0..=FIELD_COUNT).
    pub fn missing_cells(&self) -> usize {
        self.location_region.is_none() as usize
            + self.risk_score.is_none() as usize
            + self.amount.is_none() as usize
            + self.transaction_type.is_none() as usize
            + self.receiving_address.is_none() as usize
            + self.timestamp.is_none() as usize
    }
}

// Coercion helpers for serde. The contract is the same for all three:
// produce None on anything that does not parse, never an error.

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .and_then(|s| s.trim().parse::<f64>().ok())
        // "NaN" and "inf" parse as floats but carry no usable value
        .filter(|v| v.is_finite()))
}

fn lenient_i64<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        let s = s.trim();
        s.parse::<i64>().ok().or_else(|| {
            // Some extracts carry integer timestamps as "1000.0"
            s.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(|v| v as i64)
        })
    }))
}

// ============================================================================
// CLEAN RECORD (typed)
// ============================================================================

/// One surviving row after cleaning. Field order defines the column order
/// of the cleaned-set file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanRecord {
    pub location_region: String,
    pub risk_score: f64,
    pub amount: f64,
    pub transaction_type: String,
    pub receiving_address: String,
    pub timestamp: i64,
}

// ============================================================================
// CSV BOUNDARY
// ============================================================================

/// Check that a header row carries every expected column. Missing columns
/// are a configuration problem, not a data problem, so this is fatal.
pub fn ensure_columns(
    headers: &csv::StringRecord,
    expected: &[&str],
    path: &Path,
) -> std::result::Result<(), PipelineError> {
    for column in expected {
        if !headers.iter().any(|h| h == *column) {
            return Err(PipelineError::MissingColumn {
                column: column.to_string(),
                path: path.to_path_buf(),
            });
        }
    }
    Ok(())
}

/// Load raw records from a delimited extract. `row_limit` caps how many
/// data rows are read (the historical first-N-rows contract); `None`
/// reads the whole file, which is the default contract.
pub fn read_raw_records(path: &Path, row_limit: Option<usize>) -> Result<Vec<RawRecord>> {
    if !path.exists() {
        return Err(PipelineError::FileNotFound(path.to_path_buf()).into());
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    ensure_columns(reader.headers()?, &REQUIRED_COLUMNS, path)?;

    let mut records = Vec::new();
    for result in reader.deserialize() {
        if let Some(limit) = row_limit {
            if records.len() >= limit {
                break;
            }
        }
        let record: RawRecord =
            result.with_context(|| format!("failed to read row from {}", path.display()))?;
        records.push(record);
    }

    Ok(records)
}

/// Load the cleaned set back from disk. Unlike the raw reader this is
/// strict: the cleaned file is produced by this pipeline, so a row that
/// does not type-check means the file is damaged.
pub fn read_clean_records(path: &Path) -> Result<Vec<CleanRecord>> {
    if !path.exists() {
        return Err(PipelineError::FileNotFound(path.to_path_buf()).into());
    }

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    ensure_columns(reader.headers()?, &REQUIRED_COLUMNS, path)?;

    let mut records = Vec::new();
    for result in reader.deserialize() {
        let record: CleanRecord = result.map_err(|e| PipelineError::MalformedTable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        records.push(record);
    }

    Ok(records)
}

/// Persist the cleaned set, header included. A zero-row set still gets a
/// header so downstream stages can tell "empty" from "missing".
pub fn write_clean_records(path: &Path, records: &[CleanRecord]) -> Result<()> {
    ensure_parent_dir(path)?;

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    if records.is_empty() {
        writer.write_record(REQUIRED_COLUMNS)?;
    }
    for record in records {
        writer.serialize(record)?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;

    Ok(())
}

/// Count the data rows of an extract without deserializing them. Used by
/// the against-source compliance formula.
pub fn count_rows(path: &Path) -> Result<usize> {
    if !path.exists() {
        return Err(PipelineError::FileNotFound(path.to_path_buf()).into());
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let mut count = 0;
    for result in reader.records() {
        result.with_context(|| format!("failed to read row from {}", path.display()))?;
        count += 1;
    }
    Ok(count)
}

/// Create the parent directory of an output file if it does not exist.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    const HEADER: &str =
        "location_region,risk_score,amount,transaction_type,receiving_address,timestamp";

    #[test]
    fn test_read_raw_coerces_bad_numbers_to_missing() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "input.csv",
            &format!("{HEADER}\nregion one,not a number,12.5,sale,a1,1000\n"),
        );

        let records = read_raw_records(&path, None).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].location_region.as_deref(), Some("region one"));
        assert_eq!(records[0].risk_score, None);
        assert_eq!(records[0].amount, Some(12.5));
        assert_eq!(records[0].timestamp, Some(1000));
        assert_eq!(records[0].missing_cells(), 1);
    }

    #[test]
    fn test_read_raw_empty_cells_are_missing() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "input.csv", &format!("{HEADER}\n,,,,,\n"));

        let records = read_raw_records(&path, None).unwrap();
        assert_eq!(records[0].missing_cells(), FIELD_COUNT);
    }

    #[test]
    fn test_read_raw_float_timestamp_is_truncated() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "input.csv",
            &format!("{HEADER}\nregion,1,2,sale,a1,1500.0\n"),
        );

        let records = read_raw_records(&path, None).unwrap();
        assert_eq!(records[0].timestamp, Some(1500));
    }

    #[test]
    fn test_read_raw_honors_row_limit() {
        let dir = TempDir::new().unwrap();
        let rows: String = (0..10)
            .map(|i| format!("region,1,2,sale,a{i},{i}\n"))
            .collect();
        let path = write_file(&dir, "input.csv", &format!("{HEADER}\n{rows}"));

        assert_eq!(read_raw_records(&path, Some(3)).unwrap().len(), 3);
        assert_eq!(read_raw_records(&path, None).unwrap().len(), 10);
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "input.csv",
            "location_region,amount,transaction_type,receiving_address,timestamp\nr,1,sale,a,1\n",
        );

        let err = read_raw_records(&path, None).unwrap_err();
        let err = err.downcast::<PipelineError>().unwrap();
        assert!(matches!(
            err,
            PipelineError::MissingColumn { ref column, .. } if column == "risk_score"
        ));
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let err = read_raw_records(&dir.path().join("nope.csv"), None).unwrap_err();
        assert!(matches!(
            err.downcast::<PipelineError>().unwrap(),
            PipelineError::FileNotFound(_)
        ));
    }

    #[test]
    fn test_clean_records_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cleaned_data.csv");
        let records = vec![CleanRecord {
            location_region: "region one".to_string(),
            risk_score: 10.0,
            amount: 100.0,
            transaction_type: "sale".to_string(),
            receiving_address: "a1".to_string(),
            timestamp: 1000,
        }];

        write_clean_records(&path, &records).unwrap();
        let loaded = read_clean_records(&path).unwrap();
        assert_eq!(loaded, records);
    }

    #[test]
    fn test_empty_clean_set_still_writes_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cleaned_data.csv");

        write_clean_records(&path, &[]).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("location_region,"));
        assert_eq!(read_clean_records(&path).unwrap().len(), 0);
    }

    #[test]
    fn test_damaged_clean_file_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "cleaned_data.csv",
            &format!("{HEADER}\nregion,not numeric,2,sale,a1,1\n"),
        );

        let err = read_clean_records(&path).unwrap_err();
        assert!(matches!(
            err.downcast::<PipelineError>().unwrap(),
            PipelineError::MalformedTable { .. }
        ));
    }

    #[test]
    fn test_count_rows_counts_data_rows_only() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "input.csv", &format!("{HEADER}\nr,1,2,sale,a,1\n,,,,,\n"));
        assert_eq!(count_rows(&path).unwrap(), 2);
    }
}
