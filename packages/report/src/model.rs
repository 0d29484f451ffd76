//! The report document model.
//!
//! A [`Report`] is built purely from points already in memory. Rendering
//! (text or PDF) is a separate step that only reads the model.

use chrono::{DateTime, Utc};
use mls_locator_dashboard::PointStats;
use mls_locator_dashboard::projection::{PLACEHOLDER, point_sections};
use mls_locator_point_models::{District, PointRecord, PointStatus};
use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumString};

/// The kinds of report the locator can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    /// Summary statistics plus a listing of every loaded point.
    DistrictSummary,
    /// Only the active points.
    ActivePoints,
    /// Every field of a single point.
    PointDetail,
}

impl ReportKind {
    pub const ALL: &[Self] = &[
        Self::DistrictSummary,
        Self::ActivePoints,
        Self::PointDetail,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::DistrictSummary => "District summary",
            Self::ActivePoints => "Active points",
            Self::PointDetail => "Point detail",
        }
    }
}

/// Who and when, shared by every report built in one call.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub generated_by: String,
    pub generated_at: DateTime<Utc>,
    /// Row cap for the multi-point listings.
    pub max_rows: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportMeta {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub generated_by: String,
    /// District name, or `None` for all districts.
    pub scope: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Rows dropped by the row cap.
    pub omitted: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Section {
    /// Two-column metric/value table.
    Summary {
        title: String,
        rows: Vec<(String, String)>,
    },
    Table {
        title: String,
        table: ReportTable,
    },
    /// Labeled fields of one record.
    Fields {
        title: String,
        fields: Vec<(String, String)>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub kind: ReportKind,
    pub meta: ReportMeta,
    pub stats: PointStats,
    /// Code of the point a detail report describes.
    pub subject: Option<String>,
    pub sections: Vec<Section>,
}

fn cell(value: &str) -> String {
    if value.trim().is_empty() {
        PLACEHOLDER.to_string()
    } else {
        value.to_string()
    }
}

fn status_cell(status: PointStatus) -> String {
    status.to_string()
}

fn capped_table<'a>(
    headers: &[&str],
    points: &[&'a PointRecord],
    max_rows: usize,
    row: impl Fn(&'a PointRecord) -> Vec<String>,
) -> ReportTable {
    ReportTable {
        headers: headers.iter().map(ToString::to_string).collect(),
        rows: points.iter().take(max_rows).map(|&p| row(p)).collect(),
        omitted: points.len().saturating_sub(max_rows),
    }
}

/// Summary statistics and a capped listing of `points`.
#[must_use]
pub fn district_summary(
    points: &[&PointRecord],
    district: Option<&District>,
    ctx: &ReportContext,
) -> Report {
    let stats = PointStats::compute(points.iter().copied());
    let scope = district.map(|d| d.name.clone());

    let title = scope.as_ref().map_or_else(
        || "MLS Districts Summary Report".to_string(),
        |name| format!("{name} District Report"),
    );

    let summary = vec![
        ("Total MLS Points".to_string(), stats.total.to_string()),
        (
            "Active Points".to_string(),
            format!("{} ({:.1}%)", stats.active, stats.active_percentage),
        ),
        (
            "Inactive Points".to_string(),
            format!("{} ({:.1}%)", stats.inactive, stats.inactive_percentage),
        ),
        ("Total Mandals".to_string(), stats.mandals.to_string()),
        (
            "District Coverage".to_string(),
            scope.clone().unwrap_or_else(|| "Multiple Districts".to_string()),
        ),
    ];

    let table = capped_table(
        &["Code", "Name", "Mandal", "Village", "Status", "Incharge", "Phone"],
        points,
        ctx.max_rows,
        |p| {
            vec![
                cell(&p.code),
                cell(&p.name),
                cell(&p.mandal_name),
                cell(&p.village_name),
                status_cell(p.status),
                cell(&p.incharge_name),
                cell(&p.phone_number),
            ]
        },
    );

    Report {
        kind: ReportKind::DistrictSummary,
        meta: ReportMeta {
            title,
            generated_at: ctx.generated_at,
            generated_by: ctx.generated_by.clone(),
            scope,
        },
        stats,
        subject: None,
        sections: vec![
            Section::Summary {
                title: "Summary Statistics".to_string(),
                rows: summary,
            },
            Section::Table {
                title: "Detailed MLS Points".to_string(),
                table,
            },
        ],
    }
}

/// The active subset of `points`. An empty subset still yields a report
/// with zero totals.
#[must_use]
pub fn active_points(
    points: &[&PointRecord],
    district: Option<&District>,
    ctx: &ReportContext,
) -> Report {
    let active: Vec<&PointRecord> = points
        .iter()
        .copied()
        .filter(|p| p.status == PointStatus::Active)
        .collect();
    let stats = PointStats::compute(active.iter().copied());
    let scope = district.map(|d| d.name.clone());

    let title = scope.as_ref().map_or_else(
        || "Active MLS Points Report".to_string(),
        |name| format!("{name} - Active MLS Points Report"),
    );

    let table = capped_table(
        &["Code", "Name", "Mandal", "Incharge", "Phone"],
        &active,
        ctx.max_rows,
        |p| {
            vec![
                cell(&p.code),
                cell(&p.name),
                cell(&p.mandal_name),
                cell(&p.incharge_name),
                cell(&p.phone_number),
            ]
        },
    );

    Report {
        kind: ReportKind::ActivePoints,
        meta: ReportMeta {
            title,
            generated_at: ctx.generated_at,
            generated_by: ctx.generated_by.clone(),
            scope,
        },
        stats,
        subject: None,
        sections: vec![
            Section::Summary {
                title: "Summary".to_string(),
                rows: vec![
                    ("Total Active Points".to_string(), stats.total.to_string()),
                    ("Mandals Covered".to_string(), stats.mandals.to_string()),
                ],
            },
            Section::Table {
                title: "Active MLS Points".to_string(),
                table,
            },
        ],
    }
}

/// Every field of `point`, grouped into point, incharge, and additional
/// facility sections.
#[must_use]
pub fn point_detail(point: &PointRecord, ctx: &ReportContext) -> Report {
    let sections = point_sections(point)
        .into_iter()
        .map(|section| Section::Fields {
            title: section.title,
            fields: section
                .fields
                .into_iter()
                .map(|f| (f.label, f.value))
                .collect(),
        })
        .collect();

    let scope = if point.district_name.is_empty() {
        None
    } else {
        Some(point.district_name.clone())
    };

    Report {
        kind: ReportKind::PointDetail,
        meta: ReportMeta {
            title: "MLS AT A GLANCE".to_string(),
            generated_at: ctx.generated_at,
            generated_by: ctx.generated_by.clone(),
            scope,
        },
        stats: PointStats::compute(std::iter::once(point)),
        subject: Some(point.code.clone()),
        sections,
    }
}

/// Replaces characters that cannot appear in a file name component.
fn sanitize(part: &str) -> String {
    part.trim()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect()
}

impl Report {
    /// Deterministic output file name for this report.
    #[must_use]
    pub fn file_name(&self) -> String {
        let date = self.meta.generated_at.format("%Y-%m-%d");
        let scope = self.meta.scope.as_deref().map(sanitize);

        match (self.kind, scope) {
            (ReportKind::DistrictSummary, Some(scope)) => {
                format!("{scope}_District_Report_{date}.pdf")
            }
            (ReportKind::DistrictSummary, None) => format!("MLS_Districts_Summary_{date}.pdf"),
            (ReportKind::ActivePoints, Some(scope)) => {
                format!("{scope}_Active_Points_Report_{date}.pdf")
            }
            (ReportKind::ActivePoints, None) => format!("Active_Points_Report_{date}.pdf"),
            (ReportKind::PointDetail, _) => format!(
                "MLS_Report_{}_{date}.pdf",
                sanitize(self.subject.as_deref().unwrap_or("unknown"))
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(max_rows: usize) -> ReportContext {
        ReportContext {
            generated_by: "operator".to_string(),
            generated_at: DateTime::parse_from_rfc3339("2025-03-14T09:30:00Z")
                .unwrap()
                .with_timezone(&Utc),
            max_rows,
        }
    }

    fn point(code: &str, status: PointStatus) -> PointRecord {
        PointRecord {
            code: code.to_string(),
            name: format!("Point {code}"),
            mandal_name: "Rural".to_string(),
            district_name: "Guntur".to_string(),
            status,
            ..PointRecord::default()
        }
    }

    fn table(report: &Report) -> &ReportTable {
        report
            .sections
            .iter()
            .find_map(|s| match s {
                Section::Table { table, .. } => Some(table),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn empty_collection_yields_zero_totals() {
        let report = district_summary(&[], None, &ctx(50));
        assert_eq!(report.stats, PointStats::default());
        assert!(table(&report).rows.is_empty());
        assert_eq!(report.meta.title, "MLS Districts Summary Report");

        let Section::Summary { rows, .. } = &report.sections[0] else {
            panic!("expected summary first");
        };
        assert_eq!(rows[0], ("Total MLS Points".to_string(), "0".to_string()));
        assert_eq!(rows[1].1, "0 (0.0%)");
        assert_eq!(rows[4].1, "Multiple Districts");
    }

    #[test]
    fn listing_is_capped_and_counts_omitted_rows() {
        let points: Vec<PointRecord> = (0..60)
            .map(|i| point(&format!("P{i:02}"), PointStatus::Active))
            .collect();
        let refs: Vec<&PointRecord> = points.iter().collect();

        let report = district_summary(&refs, Some(&District::new("GNTR", "Guntur")), &ctx(50));
        assert_eq!(report.stats.total, 60);
        assert_eq!(table(&report).rows.len(), 50);
        assert_eq!(table(&report).omitted, 10);
        assert_eq!(table(&report).rows[0][0], "P00");
    }

    #[test]
    fn active_report_filters_and_allows_empty() {
        let points = [
            point("A", PointStatus::Active),
            point("B", PointStatus::Inactive),
            point("C", PointStatus::Unknown),
        ];
        let refs: Vec<&PointRecord> = points.iter().collect();

        let report = active_points(&refs, None, &ctx(50));
        assert_eq!(report.stats.total, 1);
        assert_eq!(table(&report).rows.len(), 1);
        assert_eq!(table(&report).headers.len(), 5);

        let inactive_only = [&points[1]];
        let empty = active_points(&inactive_only, None, &ctx(50));
        assert_eq!(empty.stats.total, 0);
        assert!(table(&empty).rows.is_empty());
    }

    #[test]
    fn table_cells_use_placeholders() {
        let blank = PointRecord {
            code: "X".to_string(),
            ..PointRecord::default()
        };
        let report = district_summary(&[&blank], None, &ctx(50));
        let row = &table(&report).rows[0];
        assert_eq!(row[1], PLACEHOLDER);
        assert_eq!(row[4], "Unknown");
    }

    #[test]
    fn detail_report_sections() {
        let mut p = point("2821029", PointStatus::Active);
        p.extra
            .insert("godown_area".to_string(), serde_json::json!("1200 sq ft"));
        let report = point_detail(&p, &ctx(50));

        assert_eq!(report.subject.as_deref(), Some("2821029"));
        assert_eq!(report.sections.len(), 3);
        let Section::Fields { title, fields } = &report.sections[2] else {
            panic!("expected field section");
        };
        assert_eq!(title, "Additional Details");
        assert_eq!(
            fields[0],
            ("Godown Area".to_string(), "1200 sq ft".to_string())
        );
    }

    #[test]
    fn file_names() {
        let guntur = District::new("GNTR", "Guntur");
        let east = District::new("EAST", "East Godavari");
        let c = ctx(50);

        assert_eq!(
            district_summary(&[], Some(&guntur), &c).file_name(),
            "Guntur_District_Report_2025-03-14.pdf"
        );
        assert_eq!(
            district_summary(&[], None, &c).file_name(),
            "MLS_Districts_Summary_2025-03-14.pdf"
        );
        assert_eq!(
            active_points(&[], Some(&east), &c).file_name(),
            "East_Godavari_Active_Points_Report_2025-03-14.pdf"
        );
        assert_eq!(
            active_points(&[], None, &c).file_name(),
            "Active_Points_Report_2025-03-14.pdf"
        );

        let p = point("AB/12 3", PointStatus::Active);
        assert_eq!(
            point_detail(&p, &c).file_name(),
            "MLS_Report_AB_12_3_2025-03-14.pdf"
        );
    }

    #[test]
    fn kind_names() {
        assert_eq!(ReportKind::DistrictSummary.to_string(), "district-summary");
        assert_eq!(
            "active-points".parse::<ReportKind>().unwrap(),
            ReportKind::ActivePoints
        );
    }
}
