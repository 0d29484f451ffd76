//! Plain-text preview of a report.

use std::fmt::Write as _;

use crate::model::{Report, ReportTable, Section};

/// Timestamp format used in report headers.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn pad(value: &str, width: usize) -> String {
    let len = value.chars().count();
    format!("{value}{}", " ".repeat(width.saturating_sub(len)))
}

fn write_pairs(out: &mut String, pairs: &[(String, String)]) {
    let width = pairs
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);
    for (label, value) in pairs {
        let value = if value.is_empty() { "-" } else { value };
        let _ = writeln!(out, "  {}  {value}", pad(label, width));
    }
}

fn write_table(out: &mut String, table: &ReportTable) {
    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &table.rows {
        for (i, value) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(value.chars().count());
            }
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| pad(c, *w))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let _ = writeln!(out, "  {}", line(table.headers.as_slice()));
    let rule_len = widths.iter().sum::<usize>() + 3 * widths.len().saturating_sub(1);
    let _ = writeln!(out, "  {}", "-".repeat(rule_len));

    if table.rows.is_empty() {
        let _ = writeln!(out, "  (no points)");
    }
    for row in &table.rows {
        let _ = writeln!(out, "  {}", line(row.as_slice()));
    }
    if table.omitted > 0 {
        let _ = writeln!(out, "  ... {} more rows not shown", table.omitted);
    }
}

/// Renders `report` as aligned plain text.
#[must_use]
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", report.meta.title);
    let _ = writeln!(out, "{}", "=".repeat(report.meta.title.chars().count()));
    let _ = writeln!(
        out,
        "Generated on: {} (UTC)",
        report.meta.generated_at.format(TIMESTAMP_FORMAT)
    );
    let _ = writeln!(out, "Generated by: {}", report.meta.generated_by);
    let _ = writeln!(
        out,
        "District: {}",
        report.meta.scope.as_deref().unwrap_or("All Districts")
    );

    for section in &report.sections {
        out.push('\n');
        match section {
            Section::Summary { title, rows } => {
                let _ = writeln!(out, "{title}");
                write_pairs(&mut out, rows);
            }
            Section::Table { title, table } => {
                let _ = writeln!(out, "{title}");
                write_table(&mut out, table);
            }
            Section::Fields { title, fields } => {
                let _ = writeln!(out, "{title}");
                write_pairs(&mut out, fields);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ReportContext, district_summary};
    use chrono::{DateTime, Utc};
    use mls_locator_point_models::{PointRecord, PointStatus};

    fn ctx(max_rows: usize) -> ReportContext {
        ReportContext {
            generated_by: "operator".to_string(),
            generated_at: DateTime::parse_from_rfc3339("2025-03-14T09:30:00Z")
                .unwrap()
                .with_timezone(&Utc),
            max_rows,
        }
    }

    #[test]
    fn preview_contains_header_summary_and_rows() {
        let points: Vec<PointRecord> = (0..3)
            .map(|i| PointRecord {
                code: format!("P{i}"),
                name: format!("Point {i}"),
                status: PointStatus::Active,
                ..PointRecord::default()
            })
            .collect();
        let refs: Vec<&PointRecord> = points.iter().collect();

        let text = render_text(&district_summary(&refs, None, &ctx(2)));

        assert!(text.starts_with("MLS Districts Summary Report\n"));
        assert!(text.contains("Generated on: 2025-03-14 09:30:00 (UTC)"));
        assert!(text.contains("Generated by: operator"));
        assert!(text.contains("District: All Districts"));
        assert!(text.contains("Total MLS Points"));
        assert!(text.contains("3 (100.0%)"));
        assert!(text.contains("P1"));
        assert!(!text.contains("P2 "));
        assert!(text.contains("... 1 more rows not shown"));
    }

    #[test]
    fn empty_listing_is_marked() {
        let text = render_text(&district_summary(&[], None, &ctx(50)));
        assert!(text.contains("(no points)"));
    }
}
