// 🖨️ Reporter - render the derived tables as plain text
//
// Loads nothing itself: the pipeline hands it the loaded tables and an
// output capability, and it prints each table under a header line. An
// empty table prints as its header row and nothing else.

use crate::output::RunOutput;
use crate::processing::{RegionRisk, TopSale, TOP_SALES_LIMIT};

pub const TABLE1_TITLE: &str = "Table 1: mean 'risk_score' by 'location_region'";
pub const TABLE2_TITLE: &str = "Table 2: top 3 'sale' transactions";

/// Print both tables through the injected output.
pub fn print_report(output: &mut dyn RunOutput, table1: &[RegionRisk], table2: &[TopSale]) {
    output.write(TABLE1_TITLE);
    output.write(&render_table(
        &["location_region", "risk_score"],
        &region_rows(table1),
    ));
    output.write("");
    output.write(TABLE2_TITLE);
    output.write(&render_table(
        &["receiving_address", "amount", "timestamp"],
        &sale_rows(table2),
    ));
}

fn region_rows(rows: &[RegionRisk]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| vec![row.location_region.clone(), row.risk_score.to_string()])
        .collect()
}

fn sale_rows(rows: &[TopSale]) -> Vec<Vec<String>> {
    debug_assert!(rows.len() <= TOP_SALES_LIMIT);
    rows.iter()
        .map(|row| {
            vec![
                row.receiving_address.clone(),
                row.amount.to_string(),
                row.timestamp.to_string(),
            ]
        })
        .collect()
}

/// Fixed-width rendering: every column as wide as its widest cell, two
/// spaces between columns.
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(format_row(
        &headers.iter().map(|h| h.to_string()).collect::<Vec<_>>(),
        &widths,
    ));
    for row in rows {
        lines.push(format_row(row, &widths));
    }
    lines.join("\n")
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{:<width$}", cell))
        .collect();
    padded.join("  ").trim_end().to_string()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::MemoryOutput;

    #[test]
    fn test_report_prints_both_tables_with_titles() {
        let table1 = vec![
            RegionRisk {
                location_region: "region one".to_string(),
                risk_score: 15.0,
            },
            RegionRisk {
                location_region: "region two".to_string(),
                risk_score: 10.0,
            },
        ];
        let table2 = vec![TopSale {
            receiving_address: "a1".to_string(),
            amount: 200.0,
            timestamp: 1000,
        }];

        let mut output = MemoryOutput::new();
        print_report(&mut output, &table1, &table2);

        let text = output.report_text();
        assert!(text.contains(TABLE1_TITLE));
        assert!(text.contains(TABLE2_TITLE));
        assert!(text.contains("region one"));
        assert!(text.contains("a1"));
    }

    #[test]
    fn test_empty_table_prints_header_only() {
        let mut output = MemoryOutput::new();
        print_report(&mut output, &[], &[]);

        let text = output.report_text();
        assert!(text.contains("location_region  risk_score"));
        assert!(text.contains("receiving_address  amount  timestamp"));
    }

    #[test]
    fn test_columns_align_to_widest_cell() {
        let rows = vec![
            vec!["abcdefgh".to_string(), "1".to_string()],
            vec!["xy".to_string(), "22".to_string()],
        ];
        let rendered = render_table(&["region", "n"], &rows);

        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "region    n");
        assert_eq!(lines[1], "abcdefgh  1");
        assert_eq!(lines[2], "xy        22");
    }

    #[test]
    fn test_whole_numbers_render_without_trailing_zeroes() {
        let rows = sale_rows(&[TopSale {
            receiving_address: "a1".to_string(),
            amount: 100.0,
            timestamp: 1000,
        }]);
        assert_eq!(rows[0][1], "100");
    }
}
