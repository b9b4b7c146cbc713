use anyhow::Result;
use std::env;
use std::path::Path;
use std::process;

use risk_pipeline::{ConsoleOutput, Pipeline, PipelineConfig, Stage};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    // risk-pipeline [clean|process|quality|report|run] [config.toml]
    let stage_name = args.get(1).map(String::as_str).unwrap_or("run");
    let config = match args.get(2) {
        Some(path) => PipelineConfig::from_file(Path::new(path))?,
        None => PipelineConfig::default(),
    };

    let mut pipeline = Pipeline::new(config, Box::new(ConsoleOutput));

    if stage_name == "run" {
        return pipeline.run();
    }

    match Stage::parse(stage_name) {
        Some(stage) => pipeline.run_stage(stage),
        None => {
            eprintln!("Unknown stage: {}", stage_name);
            eprintln!("Usage: risk-pipeline [clean|process|quality|report|run] [config.toml]");
            process::exit(1);
        }
    }
}
