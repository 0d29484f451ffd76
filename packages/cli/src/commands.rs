//! Scripted subcommands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use mls_locator_cli_utils::{IndicatifProgress, MultiProgress};
use mls_locator_client::PointApi;
use mls_locator_config::LocatorConfig;
use mls_locator_dashboard::DashboardSession;
use mls_locator_dashboard::notify::Level;
use mls_locator_dashboard::progress::ProgressCallback;
use mls_locator_dashboard::projection::{self, TablePage, TableRow};
use mls_locator_point_models::{District, PointRecord, PointStatus};
use mls_locator_report::{Report, ReportContext, ReportKind};

use crate::render;

type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Filters and paging for `load`.
#[derive(Debug, Default)]
pub struct LoadArgs {
    pub district: Option<String>,
    pub search: Option<String>,
    pub status: Option<PointStatus>,
    pub mandal: Option<String>,
    pub page: Option<usize>,
    pub markers: Option<PathBuf>,
    pub json: bool,
}

// ── Session helpers ──────────────────────────────────────────────────

/// A session with user, connectivity, and district list loaded.
pub async fn open_session<A: PointApi + ?Sized>(
    api: &A,
    config: &LocatorConfig,
) -> DashboardSession {
    let mut session = DashboardSession::new(config);
    session.load_user(api).await;
    session.check_health(api).await;
    session.load_districts(api).await;
    session
}

/// Matches `query` against district codes, then names, ignoring case.
/// Unknown values are used as a raw district code.
pub fn resolve_district(session: &DashboardSession, query: &str) -> District {
    let query = query.trim();
    session
        .districts()
        .iter()
        .find(|d| d.code.eq_ignore_ascii_case(query))
        .or_else(|| {
            session
                .districts()
                .iter()
                .find(|d| d.name.eq_ignore_ascii_case(query))
        })
        .cloned()
        .unwrap_or_else(|| {
            log::warn!("District '{query}' is not in the district list; using it as a code");
            session.district_by_code(query)
        })
}

fn reload_progress(
    multi: &MultiProgress,
    district: Option<&District>,
) -> Arc<dyn ProgressCallback> {
    district.map_or_else(
        || IndicatifProgress::sample_bar(multi),
        |d| IndicatifProgress::mandals_bar(multi, &d.name),
    )
}

/// Reloads `district` (or the all-districts sample) with a progress bar.
pub async fn reload<A: PointApi + ?Sized>(
    session: &mut DashboardSession,
    api: &A,
    district: Option<District>,
    multi: &MultiProgress,
) {
    let progress = reload_progress(multi, district.as_ref());
    session.reload(api, district, &progress).await;
}

/// Retries from a clean selection with a progress bar.
pub async fn retry<A: PointApi + ?Sized>(
    session: &mut DashboardSession,
    api: &A,
    multi: &MultiProgress,
) {
    let progress = reload_progress(multi, None);
    session.retry(api, &progress).await;
}

pub fn report_context(session: &DashboardSession, config: &LocatorConfig) -> ReportContext {
    ReportContext {
        generated_by: session.user().to_string(),
        generated_at: Utc::now(),
        max_rows: config.report.max_rows,
    }
}

/// Builds a multi-point report from the loaded store.
pub fn store_report(
    session: &DashboardSession,
    kind: ReportKind,
    config: &LocatorConfig,
) -> Report {
    let points: Vec<&PointRecord> = session.store().all().collect();
    let ctx = report_context(session, config);
    let district = session.selected_district();
    match kind {
        ReportKind::ActivePoints => mls_locator_report::active_points(&points, district, &ctx),
        ReportKind::DistrictSummary | ReportKind::PointDetail => {
            mls_locator_report::district_summary(&points, district, &ctx)
        }
    }
}

/// Prints or writes `report`. A failed write raises an error notification
/// on `session`.
pub fn emit_report(
    session: &mut DashboardSession,
    report: &Report,
    config: &LocatorConfig,
    preview: bool,
) -> CliResult<Option<PathBuf>> {
    if preview {
        print!("{}", mls_locator_report::render_text(report));
        return Ok(None);
    }

    match mls_locator_report::generate(report, &config.report) {
        Ok(path) => {
            session.notify(Level::Success, format!("Report saved: {}", path.display()));
            session.record_activity("Report Generated", report.meta.title.clone());
            Ok(Some(path))
        }
        Err(e) => {
            session.notify(Level::Error, format!("Error generating PDF report: {e}"));
            Err(e.into())
        }
    }
}

pub fn write_markers(session: &DashboardSession, path: &Path) -> CliResult {
    let set = projection::markers(session.store().all());
    let body = serde_json::to_string_pretty(&set.to_geojson())?;
    std::fs::write(path, body)?;
    log::info!(
        "Wrote {} markers to {} ({} points without coordinates)",
        set.markers.len(),
        path.display(),
        set.skipped
    );
    Ok(())
}

// ── Subcommands ──────────────────────────────────────────────────────

pub async fn districts<A: PointApi + ?Sized>(api: &A) -> CliResult {
    let districts = api.districts().await?;
    for d in &districts {
        println!("{:<8} {}", d.code, d.name);
    }
    println!("{} districts", districts.len());
    Ok(())
}

pub async fn mandals<A: PointApi + ?Sized>(api: &A, district: &str) -> CliResult {
    let mandals = api.mandals(district).await?;
    for m in &mandals {
        println!("{:<12} {}", m.code, m.name);
    }
    println!("{} mandals", mandals.len());
    Ok(())
}

pub async fn points<A: PointApi + ?Sized>(api: &A, district: &str, mandal: &str) -> CliResult {
    let points = api.points(district, mandal).await?;
    let rows: Vec<TableRow> = points.iter().map(TableRow::from).collect();
    let count = rows.len();
    let table = TablePage {
        rows,
        page: 1,
        page_count: 1,
        filtered_count: count,
        info: format!("{count} points"),
        has_prev: false,
        has_next: false,
    };
    render::print_table(&format!("{district} / {mandal}"), &table);
    Ok(())
}

pub async fn search<A: PointApi + ?Sized>(
    api: &A,
    config: &LocatorConfig,
    code: &str,
) -> CliResult {
    let mut session = DashboardSession::new(config);
    let point = session.search(api, code).await?;
    render::print_detail(&projection::detail_panel(&point));
    Ok(())
}

pub async fn suggest<A: PointApi + ?Sized>(api: &A, query: &str) -> CliResult {
    let codes = api.all_codes().await?;
    let matches = projection::suggest_codes(&codes, query);
    if matches.is_empty() {
        println!("No codes match '{query}'");
    }
    for code in matches {
        println!("{code}");
    }
    Ok(())
}

pub async fn health<A: PointApi + ?Sized>(api: &A) -> CliResult {
    match api.health().await {
        Ok(status) => {
            println!("Backend: Online");
            if let Some(s) = status.status {
                println!("  status:   {s}");
            }
            if let Some(db) = status.database {
                println!("  database: {db}");
            }
            if let Some(n) = status.records_count {
                println!("  records:  {n}");
            }
            Ok(())
        }
        Err(e) => {
            println!("Backend: Demo mode ({e})");
            Err(e.into())
        }
    }
}

pub async fn load<A: PointApi + ?Sized>(
    api: &A,
    config: &LocatorConfig,
    multi: &MultiProgress,
    args: LoadArgs,
) -> CliResult {
    let mut session = open_session(api, config).await;
    let district = args
        .district
        .as_deref()
        .map(|q| resolve_district(&session, q));
    reload(&mut session, api, district, multi).await;

    if let Some(search) = args.search {
        session.set_search(search);
    }
    session.set_status(args.status);
    session.set_mandal(args.mandal);
    if let Some(page) = args.page {
        session.go_to_page(page);
    }

    if let Some(path) = &args.markers {
        write_markers(&session, path)?;
    }

    let view = projection::project(&session, Utc::now());
    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        render::print_view(&view);
    }
    Ok(())
}

pub async fn report<A: PointApi + ?Sized>(
    api: &A,
    config: &LocatorConfig,
    multi: &MultiProgress,
    kind: ReportKind,
    district: Option<&str>,
    code: Option<&str>,
    preview: bool,
) -> CliResult {
    let mut session = open_session(api, config).await;

    let report = if kind == ReportKind::PointDetail {
        let Some(code) = code else {
            return Err("point-detail reports need --code".into());
        };
        let point = session.search(api, code).await?;
        mls_locator_report::point_detail(&point, &report_context(&session, config))
    } else {
        let district = district.map(|q| resolve_district(&session, q));
        reload(&mut session, api, district, multi).await;
        store_report(&session, kind, config)
    };

    if let Some(path) = emit_report(&mut session, &report, config, preview)? {
        println!("Report saved: {}", path.display());
    }
    Ok(())
}
