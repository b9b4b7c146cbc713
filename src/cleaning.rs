// 🧹 Cleaner - coerce fields, filter junk rows, keep the survivors
//
// Whole-set transformation from raw extract rows to typed records:
//   1. risk_score / amount already arrive coerced (unparseable = missing).
//   2. Keep only rows whose location_region is letters/whitespace.
//   3. Drop rows still missing risk_score or amount.
// Rows are filtered, never rejected: a malformed row is not an error.

use regex::Regex;

use crate::record::{CleanRecord, RawRecord};

pub struct Cleaner {
    region_pattern: Regex,
}

impl Cleaner {
    pub fn new() -> Self {
        Cleaner {
            // One or more ASCII letters or whitespace, nothing else.
            // Digits, symbols, and empty values all fail the match.
            region_pattern: Regex::new(r"^[A-Za-z\s]+$").expect("region pattern is valid"),
        }
    }

    /// Run the full cleaning pass over a raw record set. Output order is
    /// input order; the set can only shrink.
    pub fn clean(&self, records: Vec<RawRecord>) -> Vec<CleanRecord> {
        records
            .into_iter()
            .filter_map(|record| self.clean_record(record))
            .collect()
    }

    /// A record survives only if every field of the cleaned schema can be
    /// filled: a valid region, numeric risk_score and amount, and the
    /// transaction fields needed by the downstream tables.
    fn clean_record(&self, record: RawRecord) -> Option<CleanRecord> {
        let location_region = record.location_region?;
        if !self.region_pattern.is_match(&location_region) {
            return None;
        }

        Some(CleanRecord {
            location_region,
            risk_score: record.risk_score?,
            amount: record.amount?,
            transaction_type: record.transaction_type?,
            receiving_address: record.receiving_address?,
            timestamp: record.timestamp?,
        })
    }
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
