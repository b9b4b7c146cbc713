// Risk Pipeline - Core Library
// Four-stage batch pipeline over transaction extracts:
// clean -> process -> quality -> report, handing off through flat files.

pub mod cleaning;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod processing;
pub mod quality;
pub mod record;
pub mod report;

// Re-export commonly used types
pub use cleaning::Cleaner;
pub use config::PipelineConfig;
pub use error::PipelineError;
pub use output::{ConsoleOutput, MemoryOutput, RunOutput};
pub use pipeline::{Pipeline, Stage};
pub use processing::{region_risk_summary, top_sales, RegionRisk, TopSale, TOP_SALES_LIMIT};
pub use quality::{ComplianceBasis, QualityMetrics};
pub use record::{CleanRecord, RawRecord, FIELD_COUNT, REQUIRED_COLUMNS};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
