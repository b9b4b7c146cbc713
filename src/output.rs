// Run output capability - injected logging/printing seam
//
// Stage logic never calls println! or the log macros directly; every
// milestone line and every report line goes through a RunOutput. The
// production implementation forwards to the `log` facade and stdout, and
// tests capture both streams in memory.

/// Where a pipeline run sends its milestone lines and its report text.
pub trait RunOutput {
    /// Log a milestone line (stage start, completion count, metric value).
    fn info(&mut self, msg: &str);

    /// Write a line of report text for the user (table headers, tables).
    fn write(&mut self, text: &str);
}

/// Production output: milestones go to the `log` facade (INFO level),
/// report text goes to stdout.
#[derive(Debug, Default)]
pub struct ConsoleOutput;

impl RunOutput for ConsoleOutput {
    fn info(&mut self, msg: &str) {
        log::info!("{}", msg);
    }

    fn write(&mut self, text: &str) {
        println!("{}", text);
    }
}

/// Capturing output for tests: keeps every line in memory.
#[derive(Debug, Default)]
pub struct MemoryOutput {
    pub info_lines: Vec<String>,
    pub report_lines: Vec<String>,
}

impl MemoryOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full report text as a single string.
    pub fn report_text(&self) -> String {
        self.report_lines.join("\n")
    }

    /// True if any milestone line contains the given fragment.
    pub fn logged(&self, fragment: &str) -> bool {
        self.info_lines.iter().any(|line| line.contains(fragment))
    }
}

impl RunOutput for MemoryOutput {
    fn info(&mut self, msg: &str) {
        self.info_lines.push(msg.to_string());
    }

    fn write(&mut self, text: &str) {
        self.report_lines.push(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_output_captures_both_streams() {
        let mut output = MemoryOutput::new();
        output.info("Starting data cleaning.");
        output.write("Table 1:");
        output.write("region1  10");

        assert!(output.logged("cleaning"));
        assert!(!output.logged("processing"));
        assert_eq!(output.report_text(), "Table 1:\nregion1  10");
    }
}
