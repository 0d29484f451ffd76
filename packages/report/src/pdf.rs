//! PDF rendering with `genpdf` and atomic file output.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use genpdf::elements::{Break, FrameCellDecorator, Paragraph, StyledElement, TableLayout};
use genpdf::style::Style;
use genpdf::{Alignment, Document, Element as _, SimplePageDecorator};
use mls_locator_config::ReportConfig;

use crate::RenderError;
use crate::model::{Report, Section};
use crate::text::TIMESTAMP_FORMAT;

const MARGIN_MM: u8 = 10;
const BODY_FONT_SIZE: u8 = 10;
const TABLE_FONT_SIZE: u8 = 8;

fn load_fonts(
    dir: &Path,
    family: &str,
) -> Result<genpdf::fonts::FontFamily<genpdf::fonts::FontData>, RenderError> {
    genpdf::fonts::from_files(dir, family, None).map_err(|source| RenderError::FontsUnavailable {
        dir: dir.to_path_buf(),
        family: family.to_string(),
        source,
    })
}

/// Relative column widths from the longest value in each column.
fn column_weights(headers: &[String], rows: &[Vec<String>]) -> Vec<usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|v| v.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(1)
                .clamp(4, 30)
        })
        .collect()
}

fn pairs_table(pairs: &[(String, String)]) -> Result<TableLayout, RenderError> {
    let mut table = TableLayout::new(vec![2, 3]);
    table.set_cell_decorator(FrameCellDecorator::new(true, true, false));
    for (label, value) in pairs {
        table
            .row()
            .element(
                Paragraph::new(label.as_str())
                    .styled(Style::new().bold())
                    .padded(1),
            )
            .element(Paragraph::new(value.as_str()).padded(1))
            .push()?;
    }
    Ok(table)
}

fn listing_table(headers: &[String], rows: &[Vec<String>]) -> Result<TableLayout, RenderError> {
    let mut table = TableLayout::new(column_weights(headers, rows));
    table.set_cell_decorator(FrameCellDecorator::new(true, true, false));

    let mut header_row = table.row();
    for header in headers {
        header_row.push_element(
            Paragraph::new(header.as_str())
                .styled(Style::new().bold().with_font_size(TABLE_FONT_SIZE))
                .padded(1),
        );
    }
    header_row.push()?;

    for row in rows {
        let mut table_row = table.row();
        for value in row {
            table_row.push_element(
                Paragraph::new(value.as_str())
                    .styled(Style::new().with_font_size(TABLE_FONT_SIZE))
                    .padded(1),
            );
        }
        table_row.push()?;
    }
    Ok(table)
}

fn section_title(title: &str) -> StyledElement<Paragraph> {
    Paragraph::new(title).styled(Style::new().bold().with_font_size(13))
}

/// Renders `report` to PDF bytes using the TrueType family `family` from
/// `font_dir`.
///
/// # Errors
///
/// Returns [`RenderError::FontsUnavailable`] if the fonts cannot be
/// loaded and [`RenderError::Pdf`] if layout or rendering fails.
pub fn render_pdf(report: &Report, font_dir: &Path, family: &str) -> Result<Vec<u8>, RenderError> {
    let fonts = load_fonts(font_dir, family)?;

    let mut doc = Document::new(fonts);
    doc.set_title(report.meta.title.clone());
    doc.set_font_size(BODY_FONT_SIZE);
    doc.set_line_spacing(1.2);

    let mut decorator = SimplePageDecorator::new();
    decorator.set_margins(MARGIN_MM);
    decorator.set_header(|page| {
        Paragraph::new(format!("MLS Locator Report - Page {page}"))
            .aligned(Alignment::Right)
            .styled(Style::new().with_font_size(7))
    });
    doc.set_page_decorator(decorator);

    doc.push(
        Paragraph::new(report.meta.title.as_str())
            .aligned(Alignment::Center)
            .styled(Style::new().bold().with_font_size(18)),
    );
    doc.push(Break::new(1));
    doc.push(Paragraph::new(format!(
        "Generated on: {} (UTC)",
        report.meta.generated_at.format(TIMESTAMP_FORMAT)
    )));
    doc.push(Paragraph::new(format!(
        "Generated by: {}",
        report.meta.generated_by
    )));
    doc.push(Paragraph::new(format!(
        "District: {}",
        report.meta.scope.as_deref().unwrap_or("All Districts")
    )));

    for section in &report.sections {
        doc.push(Break::new(1.5));
        match section {
            Section::Summary { title, rows } => {
                doc.push(section_title(title));
                doc.push(Break::new(0.5));
                doc.push(pairs_table(rows)?);
            }
            Section::Fields { title, fields } => {
                doc.push(section_title(title));
                doc.push(Break::new(0.5));
                doc.push(pairs_table(fields)?);
            }
            Section::Table { title, table } => {
                doc.push(section_title(title));
                doc.push(Break::new(0.5));
                if table.rows.is_empty() {
                    doc.push(Paragraph::new("No points to list."));
                } else {
                    doc.push(listing_table(&table.headers, &table.rows)?);
                }
                if table.omitted > 0 {
                    doc.push(
                        Paragraph::new(format!(
                            "{} more points not shown.",
                            table.omitted
                        ))
                        .styled(Style::new().italic()),
                    );
                }
            }
        }
    }

    let mut bytes = Vec::new();
    doc.render(&mut bytes)?;
    Ok(bytes)
}

/// Writes `bytes` to `dir/file_name` through a temporary file in the same
/// directory, so the target either appears complete or not at all.
///
/// # Errors
///
/// Returns [`RenderError::Io`] if the directory, temporary file, or final
/// rename fails.
pub fn write_atomic(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf, RenderError> {
    let path = dir.join(file_name);
    let io_err = |source| RenderError::Io {
        path: path.clone(),
        source,
    };

    std::fs::create_dir_all(dir).map_err(io_err)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(bytes).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(&path).map_err(|e| io_err(e.error))?;

    log::info!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(path)
}

/// Renders `report` and writes it to `config.output_dir`. Nothing is
/// written unless rendering succeeds.
///
/// # Errors
///
/// Returns [`RenderError`] if rendering or writing fails.
pub fn generate(report: &Report, config: &ReportConfig) -> Result<PathBuf, RenderError> {
    let bytes = render_pdf(report, &config.font_dir, &config.font_family)?;
    write_atomic(&config.output_dir, &report.file_name(), &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ReportContext, district_summary};

    fn report() -> Report {
        district_summary(
            &[],
            None,
            &ReportContext {
                generated_by: "operator".to_string(),
                generated_at: chrono::Utc::now(),
                max_rows: 50,
            },
        )
    }

    #[test]
    fn missing_fonts_is_an_error_and_writes_nothing() {
        let out = tempfile::tempdir().unwrap();
        let config = ReportConfig {
            font_dir: out.path().join("no-fonts-here"),
            output_dir: out.path().to_path_buf(),
            ..ReportConfig::default()
        };

        let err = generate(&report(), &config).unwrap_err();

        assert!(matches!(err, RenderError::FontsUnavailable { .. }));
        assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
    }

    #[test]
    fn atomic_write_leaves_only_the_target() {
        let out = tempfile::tempdir().unwrap();
        let dir = out.path().join("reports");

        let path = write_atomic(&dir, "MLS_Report_X_2025-01-01.pdf", b"%PDF-1.4").unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4");
        let names: Vec<_> = std::fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("MLS_Report_X_2025-01-01.pdf")]);
    }

    #[test]
    fn atomic_write_replaces_existing_file() {
        let out = tempfile::tempdir().unwrap();
        write_atomic(out.path(), "r.pdf", b"old").unwrap();
        let path = write_atomic(out.path(), "r.pdf", b"new").unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"new");
    }

    /// Renders every report shape with real fonts. Runs only when
    /// `MLS_LOCATOR_TEST_FONT_DIR` points at a directory holding the
    /// family named by `MLS_LOCATOR_TEST_FONT_FAMILY` (default
    /// `LiberationSans`).
    #[test]
    fn renders_reports_with_installed_fonts() {
        use mls_locator_point_models::{District, PointRecord, PointStatus};

        use crate::model::{active_points, point_detail};

        let Some(font_dir) = std::env::var_os("MLS_LOCATOR_TEST_FONT_DIR") else {
            eprintln!("MLS_LOCATOR_TEST_FONT_DIR not set, skipping PDF render");
            return;
        };
        let font_dir = PathBuf::from(font_dir);
        let family = std::env::var("MLS_LOCATOR_TEST_FONT_FAMILY")
            .unwrap_or_else(|_| "LiberationSans".to_string());

        let ctx = ReportContext {
            generated_by: "operator".to_string(),
            generated_at: chrono::Utc::now(),
            max_rows: 50,
        };
        let points: Vec<PointRecord> = (0..60)
            .map(|i| PointRecord {
                code: format!("GN{i:04}"),
                name: format!("Point {i}"),
                mandal_name: if i % 2 == 0 { "Rural" } else { "Urban" }.to_string(),
                status: if i % 3 == 0 {
                    PointStatus::Inactive
                } else {
                    PointStatus::Active
                },
                ..PointRecord::default()
            })
            .collect();
        let refs: Vec<&PointRecord> = points.iter().collect();
        let guntur = District::new("GNTR", "Guntur");

        let reports = [
            report(),
            district_summary(&refs, Some(&guntur), &ctx),
            active_points(&refs, Some(&guntur), &ctx),
            point_detail(&points[0], &ctx),
        ];
        for report in &reports {
            let bytes = render_pdf(report, &font_dir, &family).unwrap();
            assert!(bytes.starts_with(b"%PDF"), "{} is not a PDF", report.meta.title);
        }

        let out = tempfile::tempdir().unwrap();
        let config = ReportConfig {
            font_dir,
            font_family: family,
            output_dir: out.path().to_path_buf(),
            ..ReportConfig::default()
        };
        let path = generate(&reports[1], &config).unwrap();
        assert!(std::fs::read(path).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn column_weights_follow_content() {
        let headers = vec!["Code".to_string(), "Name".to_string()];
        let rows = vec![vec!["A".to_string(), "A rather long point name".to_string()]];
        assert_eq!(column_weights(&headers, &rows), vec![4, 24]);
    }
}
