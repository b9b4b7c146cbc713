// 🔗 Pipeline - the four stages and their file-based handoff
//
// Each stage is a no-argument operation on the Pipeline: it reads its
// input file(s), transforms in memory, writes its output file(s), and
// logs a milestone. Stages communicate only through the files named in
// the config. run() chains them in order and stops at the first error;
// retries and scheduling belong to whatever invokes the stages, not here.

use anyhow::Result;

use crate::cleaning::Cleaner;
use crate::config::PipelineConfig;
use crate::output::{ConsoleOutput, RunOutput};
use crate::processing;
use crate::quality::{ComplianceBasis, QualityMetrics};
use crate::record;
use crate::report;

// ============================================================================
// STAGE NAMES
// ============================================================================

/// The four stages, in chain order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Clean,
    Process,
    Quality,
    Report,
}

impl Stage {
    pub fn parse(name: &str) -> Option<Stage> {
        match name {
            "clean" => Some(Stage::Clean),
            "process" => Some(Stage::Process),
            "quality" => Some(Stage::Quality),
            "report" => Some(Stage::Report),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Clean => "clean",
            Stage::Process => "process",
            Stage::Quality => "quality",
            Stage::Report => "report",
        }
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

pub struct Pipeline {
    config: PipelineConfig,
    output: Box<dyn RunOutput>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, output: Box<dyn RunOutput>) -> Self {
        Pipeline { config, output }
    }

    /// Default config, logging to the console.
    pub fn with_defaults() -> Self {
        Pipeline::new(PipelineConfig::default(), Box::new(ConsoleOutput))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the whole chain. The first failing stage aborts the run; no
    /// later stage executes.
    pub fn run(&mut self) -> Result<()> {
        self.clean()?;
        self.process()?;
        self.quality()?;
        self.report()?;
        Ok(())
    }

    /// Run one named stage, for per-stage invocation by an external
    /// scheduler.
    pub fn run_stage(&mut self, stage: Stage) -> Result<()> {
        match stage {
            Stage::Clean => self.clean(),
            Stage::Process => self.process(),
            Stage::Quality => self.quality().map(|_| ()),
            Stage::Report => self.report(),
        }
    }

    /// Stage 1: raw extract -> cleaned set.
    pub fn clean(&mut self) -> Result<()> {
        self.output.info("Starting data cleaning.");

        let raw = record::read_raw_records(&self.config.input_path, self.config.row_limit)?;
        let cleaned = Cleaner::new().clean(raw);
        record::write_clean_records(&self.config.cleaned_path, &cleaned)?;

        self.output.info(&format!(
            "Cleaning complete. Records remaining: {}",
            cleaned.len()
        ));
        Ok(())
    }

    /// Stage 2: cleaned set -> Table 1 + Table 2.
    pub fn process(&mut self) -> Result<()> {
        self.output.info("Starting data processing.");

        let records = record::read_clean_records(&self.config.cleaned_path)?;
        let table1 = processing::region_risk_summary(&records);
        let table2 = processing::top_sales(&records);
        processing::write_region_summary(&self.config.table1_path, &table1)?;
        processing::write_top_sales(&self.config.table2_path, &table2)?;

        self.output.info(&format!(
            "Processing complete. Table 1 rows: {}, Table 2 rows: {}.",
            table1.len(),
            table2.len()
        ));
        Ok(())
    }

    /// Stage 3: cleaned set -> quality metrics. Observational only: the
    /// metrics are logged and persisted, and returned for callers that
    /// want them, but the chain does not consume them.
    pub fn quality(&mut self) -> Result<QualityMetrics> {
        self.output.info("Calculating quality metrics.");

        let metrics = match self.config.compliance_basis {
            ComplianceBasis::MissingCells => {
                let records = record::read_raw_records(&self.config.cleaned_path, None)?;
                QualityMetrics::from_records(&records)
            }
            ComplianceBasis::ValidRows => {
                let cleaned = record::read_clean_records(&self.config.cleaned_path)?.len();
                let original = record::count_rows(&self.config.input_path)?;
                QualityMetrics::against_source(cleaned, original)
            }
        };

        self.output
            .info(&format!("Total records: {}", metrics.total_records));
        self.output
            .info(&format!("Missing values: {}", metrics.missing_values));
        self.output.info(&format!(
            "Compliance rate: {:.2}%",
            metrics.compliance_rate
        ));

        crate::quality::write_metrics(&self.config.metrics_path, &metrics)?;
        Ok(metrics)
    }

    /// Stage 4: persisted tables -> console report.
    pub fn report(&mut self) -> Result<()> {
        self.output.info("Generating final report.");

        let table1 = processing::read_region_summary(&self.config.table1_path)?;
        let table2 = processing::read_top_sales(&self.config.table2_path)?;
        report::print_report(self.output.as_mut(), &table1, &table2);
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
