//! Plain-text formatting of tables, summaries and the variable listing.
//!
//! Formatting lives in one place so output changes stay localized.

use crate::catalog::VariableInfo;
use crate::domain::Table;
use crate::report::TableSummary;

const TIME_WIDTH: usize = 10;
const VALUE_WIDTH: usize = 14;

/// Format the last `max_rows` rows of a table (all rows when `max_rows` is 0).
pub fn format_table(table: &Table, max_rows: usize) -> String {
    let mut out = String::new();

    let mut header = format!("{:<TIME_WIDTH$}", "Time");
    let mut rule = format!("{:-<TIME_WIDTH$}", "");
    for col in &table.columns {
        header.push_str(&format!(" {:>VALUE_WIDTH$}", truncate(&col.name, VALUE_WIDTH)));
        rule.push_str(&format!(" {:-<VALUE_WIDTH$}", ""));
    }
    out.push_str(header.trim_end());
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');

    let skip = if max_rows == 0 { 0 } else { table.len().saturating_sub(max_rows) };
    if skip > 0 {
        out.push_str(&format!("... ({skip} earlier rows)\n"));
    }

    for row in skip..table.len() {
        let mut line = format!("{:<TIME_WIDTH$}", table.periods[row].label());
        for col in &table.columns {
            line.push_str(&format!(" {:>VALUE_WIDTH$}", fmt_value(col.values[row])));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

/// Format a table summary: span plus per-column coverage.
pub fn format_summary(title: &str, summary: &TableSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {title} ===\n"));
    match summary.span {
        Some((first, last)) => out.push_str(&format!("Rows: {} | {first} .. {last}\n", summary.rows)),
        None => out.push_str("Rows: 0\n"),
    }
    for col in &summary.columns {
        let span = match (col.first, col.last) {
            (Some(first), Some(last)) => format!("{first} .. {last}"),
            _ => "-".to_string(),
        };
        out.push_str(&format!("- {:<40} n={:<6} {span}\n", truncate(&col.name, 40), col.observations));
    }
    out
}

/// Format the stored-variable listing.
pub fn format_variable_list(variables: &[VariableInfo]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<12} {:<12} {}\n", "start", "end", "variable"));
    out.push_str(&format!("{:-<12} {:-<12} {:-<8}\n", "", "", ""));
    for v in variables {
        out.push_str(&format!("{:<12} {:<12} {}\n", v.start, v.end, v.label));
    }
    out
}

fn fmt_value(v: f64) -> String {
    if v.is_nan() { "-".to_string() } else { format!("{v:.2}") }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
