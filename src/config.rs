// ⚙️ Pipeline configuration - file layout and policy knobs
//
// Defaults reproduce the historical data/ layout. A TOML file can
// override any subset of fields; unknown keys are rejected so a typo in a
// config file fails loudly instead of silently using a default.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::quality::ComplianceBasis;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Raw extract the Cleaner reads.
    pub input_path: PathBuf,

    /// Cleaned set, handed from Cleaner to Processor and Quality.
    pub cleaned_path: PathBuf,

    /// Derived tables, handed from Processor to Reporter.
    pub table1_path: PathBuf,
    pub table2_path: PathBuf,

    /// Quality metrics JSON.
    pub metrics_path: PathBuf,

    /// Cap on input rows read by the Cleaner. The default contract reads
    /// the whole file; set this to reproduce the historical
    /// first-100-rows behavior.
    pub row_limit: Option<usize>,

    /// Which compliance formula the Quality stage applies.
    pub compliance_basis: ComplianceBasis,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            input_path: PathBuf::from("data/input.csv"),
            cleaned_path: PathBuf::from("data/cleaned_data.csv"),
            table1_path: PathBuf::from("data/output/table1.csv"),
            table2_path: PathBuf::from("data/output/table2.csv"),
            metrics_path: PathBuf::from("data/output/metrics.json"),
            row_limit: None,
            compliance_basis: ComplianceBasis::default(),
        }
    }
}

impl PipelineConfig {
    /// Load from a TOML file. Missing keys fall back to the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = toml::from_str(&text)
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Rebase every path under a directory. Used by tests and embedders
    /// that run the pipeline against a scratch directory.
    pub fn under_dir(dir: &Path) -> Self {
        PipelineConfig {
            input_path: dir.join("input.csv"),
            cleaned_path: dir.join("cleaned_data.csv"),
            table1_path: dir.join("output/table1.csv"),
            table2_path: dir.join("output/table2.csv"),
            metrics_path: dir.join("output/metrics.json"),
            row_limit: None,
            compliance_basis: ComplianceBasis::default(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
