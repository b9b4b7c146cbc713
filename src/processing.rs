// 📊 Processor - derive the two summary tables from the cleaned set
//
// Table 1 (risk summary): mean risk_score per location_region, highest
// mean first.
// Table 2 (top transactions): the 3 largest "sale" amounts, counting only
// each receiving address's most recent sale.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::PipelineError;
use crate::record::{ensure_parent_dir, CleanRecord};

/// Table 2 never carries more rows than this.
pub const TOP_SALES_LIMIT: usize = 3;

// ============================================================================
// TABLE ROWS
// ============================================================================

/// One Table 1 row: a region and its mean risk score. Field order defines
/// the persisted column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRisk {
    pub location_region: String,
    pub risk_score: f64,
}

/// One Table 2 row: an address's latest sale, projected to the three
/// reported columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopSale {
    pub receiving_address: String,
    pub amount: f64,
    pub timestamp: i64,
}

const TABLE1_COLUMNS: [&str; 2] = ["location_region", "risk_score"];
const TABLE2_COLUMNS: [&str; 3] = ["receiving_address", "amount", "timestamp"];

// ============================================================================
// TABLE 1 - MEAN RISK BY REGION
// ============================================================================

/// Group by region, mean the risk scores, sort by mean descending.
/// Grouping runs in first-seen order and the sort is stable, so regions
/// with equal means keep their first-seen order.
pub fn region_risk_summary(records: &[CleanRecord]) -> Vec<RegionRisk> {
    let mut seen_order: Vec<&str> = Vec::new();
    let mut sums: HashMap<&str, (f64, usize)> = HashMap::new();

    for record in records {
        let entry = sums
            .entry(record.location_region.as_str())
            .or_insert_with(|| {
                seen_order.push(record.location_region.as_str());
                (0.0, 0)
            });
        entry.0 += record.risk_score;
        entry.1 += 1;
    }

    let mut rows: Vec<RegionRisk> = seen_order
        .into_iter()
        .map(|region| {
            let (sum, count) = sums[region];
            RegionRisk {
                location_region: region.to_string(),
                risk_score: sum / count as f64,
            }
        })
        .collect();

    rows.sort_by(|a, b| b.risk_score.total_cmp(&a.risk_score));
    rows
}

// ============================================================================
// TABLE 2 - TOP SALES
// ============================================================================

/// Keep "sale" rows, reduce to each address's chronologically last sale,
/// then take the largest amounts. The reduction is keyed and ordered by
/// address, and the amount sort is stable, so ties keep address order.
pub fn top_sales(records: &[CleanRecord]) -> Vec<TopSale> {
    let mut sales: Vec<&CleanRecord> = records
        .iter()
        .filter(|record| record.transaction_type == "sale")
        .collect();

    // Stable: equal timestamps keep input order, so the later row wins
    // the last-write-wins reduction below.
    sales.sort_by_key(|record| record.timestamp);

    let mut latest: BTreeMap<&str, &CleanRecord> = BTreeMap::new();
    for record in sales {
        latest.insert(record.receiving_address.as_str(), record);
    }

    let mut rows: Vec<TopSale> = latest
        .into_values()
        .map(|record| TopSale {
            receiving_address: record.receiving_address.clone(),
            amount: record.amount,
            timestamp: record.timestamp,
        })
        .collect();

    rows.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    rows.truncate(TOP_SALES_LIMIT);
    rows
}

// ============================================================================
// TABLE PERSISTENCE
// ============================================================================

/// Persist one of the derived tables, header included even when empty.
fn write_table<T: Serialize>(path: &Path, columns: &[&str], rows: &[T]) -> Result<()> {
    ensure_parent_dir(path)?;

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    if rows.is_empty() {
        writer.write_record(columns)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}

pub fn write_region_summary(path: &Path, rows: &[RegionRisk]) -> Result<()> {
    write_table(path, &TABLE1_COLUMNS, rows)
}

pub fn write_top_sales(path: &Path, rows: &[TopSale]) -> Result<()> {
    write_table(path, &TABLE2_COLUMNS, rows)
}

/// Load a persisted table. Missing file or damaged contents are fatal; a
/// header-only file is a valid empty table.
fn read_table<T: for<'de> Deserialize<'de>>(path: &Path, columns: &[&str]) -> Result<Vec<T>> {
    if !path.exists() {
        return Err(PipelineError::FileNotFound(path.to_path_buf()).into());
    }

    let mut reader =
        csv::Reader::from_path(path).map_err(|e| table_error(path, &e.to_string()))?;

    let headers = reader
        .headers()
        .map_err(|e| table_error(path, &e.to_string()))?
        .clone();
    crate::record::ensure_columns(&headers, columns, path)?;

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: T = result.map_err(|e| table_error(path, &e.to_string()))?;
        rows.push(row);
    }
    Ok(rows)
}

pub fn read_region_summary(path: &Path) -> Result<Vec<RegionRisk>> {
    read_table(path, &TABLE1_COLUMNS)
}

pub fn read_top_sales(path: &Path) -> Result<Vec<TopSale>> {
    read_table(path, &TABLE2_COLUMNS)
}

fn table_error(path: &Path, reason: &str) -> PipelineError {
    PipelineError::MalformedTable {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
