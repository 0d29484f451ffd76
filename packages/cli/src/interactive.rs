//! Menu-driven live session.
//!
//! Keeps one [`DashboardSession`] for the whole run and redraws the
//! projected dashboard after every action, the way the web page re-renders
//! after each selection.

use std::path::PathBuf;

use chrono::Utc;
use dialoguer::{Confirm, Input, Select};
use mls_locator_cli_utils::MultiProgress;
use mls_locator_client::PointApi;
use mls_locator_config::LocatorConfig;
use mls_locator_dashboard::notify::Level;
use mls_locator_dashboard::projection::{self, SUGGEST_MIN_CHARS};
use mls_locator_dashboard::{DashboardSession, ViewState};
use mls_locator_point_models::PointStatus;
use mls_locator_report::ReportKind;

use crate::commands;
use crate::render;

enum Action {
    SelectDistrict,
    AllDistricts,
    LoadMandal,
    Filter,
    ClearFilters,
    NextPage,
    PrevPage,
    GoToPage,
    FindCode,
    ViewPoint,
    Report,
    ExportMarkers,
    DismissNotification,
    Retry,
    Quit,
}

impl Action {
    const ALL: &[Self] = &[
        Self::SelectDistrict,
        Self::AllDistricts,
        Self::LoadMandal,
        Self::Filter,
        Self::ClearFilters,
        Self::NextPage,
        Self::PrevPage,
        Self::GoToPage,
        Self::FindCode,
        Self::ViewPoint,
        Self::Report,
        Self::ExportMarkers,
        Self::DismissNotification,
        Self::Retry,
        Self::Quit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::SelectDistrict => "Select district",
            Self::AllDistricts => "Show all districts",
            Self::LoadMandal => "Load mandal points",
            Self::Filter => "Filter table",
            Self::ClearFilters => "Clear filters",
            Self::NextPage => "Next page",
            Self::PrevPage => "Previous page",
            Self::GoToPage => "Go to page",
            Self::FindCode => "Find MLS code",
            Self::ViewPoint => "View point details",
            Self::Report => "Generate report",
            Self::ExportMarkers => "Export map markers (GeoJSON)",
            Self::DismissNotification => "Dismiss notification",
            Self::Retry => "Retry",
            Self::Quit => "Quit",
        }
    }
}

enum FilterField {
    Search,
    Status,
    Mandal,
}

impl FilterField {
    const ALL: &[Self] = &[Self::Search, Self::Status, Self::Mandal];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Search => "Search text",
            Self::Status => "Status",
            Self::Mandal => "Mandal",
        }
    }
}

type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Runs the interactive session until the user quits.
///
/// # Errors
///
/// Returns an error if a terminal prompt fails.
#[allow(clippy::future_not_send)]
pub async fn run<A: PointApi + ?Sized>(
    api: &A,
    config: &LocatorConfig,
    multi: &MultiProgress,
) -> CliResult {
    println!("MLS Point Locator");

    let mut session = commands::open_session(api, config).await;
    session.load_codes(api).await;
    commands::reload(&mut session, api, None, multi).await;

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    loop {
        let now = Utc::now();
        session.notifications_mut().prune(now);
        render::print_view(&projection::project(&session, now));
        println!();

        let default = if matches!(session.view(), ViewState::Error(_)) {
            Action::ALL.iter().position(|a| matches!(a, Action::Retry)).unwrap_or(0)
        } else {
            0
        };
        let idx = Select::new()
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(default)
            .interact()?;

        match Action::ALL[idx] {
            Action::SelectDistrict => select_district(&mut session, api, multi).await?,
            Action::AllDistricts => commands::reload(&mut session, api, None, multi).await,
            Action::LoadMandal => load_mandal(&mut session, api).await?,
            Action::Filter => filter(&mut session)?,
            Action::ClearFilters => session.clear_filters(),
            Action::NextPage => {
                if !session.next_page() {
                    session.notify(Level::Info, "Already on the last page.");
                }
            }
            Action::PrevPage => {
                if !session.prev_page() {
                    session.notify(Level::Info, "Already on the first page.");
                }
            }
            Action::GoToPage => {
                let page: usize = Input::new()
                    .with_prompt(format!("Page (1-{})", session.page_count().max(1)))
                    .default(session.selection().page())
                    .interact_text()?;
                session.go_to_page(page);
            }
            Action::FindCode => find_code(&mut session, api).await?,
            Action::ViewPoint => view_point(&mut session, config)?,
            Action::Report => report(&mut session, config)?,
            Action::ExportMarkers => {
                let path: String = Input::new()
                    .with_prompt("Output file")
                    .default("mls_markers.geojson".to_string())
                    .interact_text()?;
                if let Err(e) = commands::write_markers(&session, &PathBuf::from(path)) {
                    session.notify(Level::Error, format!("Export failed: {e}"));
                }
            }
            Action::DismissNotification => dismiss_notification(&mut session)?,
            Action::Retry => commands::retry(&mut session, api, multi).await,
            Action::Quit => break,
        }
    }

    Ok(())
}

async fn select_district<A: PointApi + ?Sized>(
    session: &mut DashboardSession,
    api: &A,
    multi: &MultiProgress,
) -> CliResult {
    if session.districts().is_empty() {
        session.notify(Level::Warning, "No districts available.");
        return Ok(());
    }

    let labels: Vec<String> = session
        .districts()
        .iter()
        .map(|d| format!("{} ({})", d.name, d.code))
        .collect();
    let idx = Select::new()
        .with_prompt("District")
        .items(&labels)
        .default(0)
        .interact()?;

    let district = session.districts()[idx].clone();
    commands::reload(session, api, Some(district), multi).await;
    Ok(())
}

/// Picks a district and one of its mandals, then merges that mandal's
/// points into the loaded set.
async fn load_mandal<A: PointApi + ?Sized>(session: &mut DashboardSession, api: &A) -> CliResult {
    if session.districts().is_empty() {
        session.notify(Level::Warning, "No districts available.");
        return Ok(());
    }

    let labels: Vec<String> = session
        .districts()
        .iter()
        .map(|d| format!("{} ({})", d.name, d.code))
        .collect();
    let default = session
        .selected_district()
        .and_then(|sel| session.districts().iter().position(|d| d.code == sel.code))
        .unwrap_or(0);
    let idx = Select::new()
        .with_prompt("District")
        .items(&labels)
        .default(default)
        .interact()?;
    let district = session.districts()[idx].clone();

    let mandals = if session.selected_district().map(|d| d.code.as_str())
        == Some(district.code.as_str())
        && !session.mandals().is_empty()
    {
        session.mandals().to_vec()
    } else {
        match api.mandals(&district.code).await {
            Ok(mandals) => mandals,
            Err(e) => {
                log::warn!("Failed to load mandals for {}: {e}", district.code);
                Vec::new()
            }
        }
    };
    if mandals.is_empty() {
        session.notify(
            Level::Warning,
            format!("No mandals found for {} district.", district.name),
        );
        return Ok(());
    }

    let labels: Vec<String> = mandals
        .iter()
        .map(|m| format!("{} ({})", m.name, m.code))
        .collect();
    let pick = Select::new()
        .with_prompt("Mandal")
        .items(&labels)
        .default(0)
        .interact()?;

    session.load_mandal(api, &district, &mandals[pick].code).await;
    Ok(())
}

fn dismiss_notification(session: &mut DashboardSession) -> CliResult {
    let active: Vec<(u64, String)> = session
        .notifications()
        .active(Utc::now())
        .map(|n| (n.id, format!("[{}] {}", n.level, n.message)))
        .collect();
    if active.is_empty() {
        println!("No notifications.");
        return Ok(());
    }

    let labels: Vec<&str> = active.iter().map(|(_, label)| label.as_str()).collect();
    let idx = Select::new()
        .with_prompt("Dismiss")
        .items(&labels)
        .default(0)
        .interact()?;
    session.notifications_mut().dismiss(active[idx].0);
    Ok(())
}

fn filter(session: &mut DashboardSession) -> CliResult {
    let labels: Vec<&str> = FilterField::ALL.iter().map(FilterField::label).collect();
    let idx = Select::new()
        .with_prompt("Filter by")
        .items(&labels)
        .default(0)
        .interact()?;

    match FilterField::ALL[idx] {
        FilterField::Search => {
            let text: String = Input::new()
                .with_prompt("Search (empty clears)")
                .allow_empty(true)
                .default(session.selection().filter().search.clone())
                .interact_text()?;
            session.set_search(text);
        }
        FilterField::Status => {
            let choices = ["All statuses", "Active", "Inactive"];
            let pick = Select::new()
                .with_prompt("Status")
                .items(&choices)
                .default(0)
                .interact()?;
            session.set_status(match pick {
                1 => Some(PointStatus::Active),
                2 => Some(PointStatus::Inactive),
                _ => None,
            });
        }
        FilterField::Mandal => {
            let mut choices = vec!["All mandals".to_string()];
            choices.extend(projection::mandal_options(session.store().all()));
            let pick = Select::new()
                .with_prompt("Mandal")
                .items(&choices)
                .default(0)
                .interact()?;
            session.set_mandal((pick > 0).then(|| choices[pick].clone()));
        }
    }
    Ok(())
}

/// Prompts for a code, offering autocomplete from the loaded code list,
/// then looks it up.
async fn find_code<A: PointApi + ?Sized>(session: &mut DashboardSession, api: &A) -> CliResult {
    let query: String = Input::new().with_prompt("MLS code").interact_text()?;
    let query = query.trim().to_string();

    let mut code = query.clone();
    if query.chars().count() >= SUGGEST_MIN_CHARS {
        let suggestions: Vec<String> = projection::suggest_codes(session.codes(), &query)
            .into_iter()
            .filter(|c| *c != query)
            .map(ToString::to_string)
            .collect();
        if !suggestions.is_empty() {
            let mut choices = vec![format!("Search \"{query}\"")];
            choices.extend(suggestions.iter().cloned());
            let pick = Select::new()
                .with_prompt("Did you mean")
                .items(&choices)
                .default(0)
                .interact()?;
            if pick > 0 {
                code = suggestions[pick - 1].clone();
            }
        }
    }

    if let Ok(point) = session.search(api, &code).await {
        render::print_detail(&projection::detail_panel(&point));
    }
    Ok(())
}

fn view_point(session: &mut DashboardSession, config: &LocatorConfig) -> CliResult {
    let page = projection::table_page(session);
    if page.rows.is_empty() {
        session.notify(Level::Info, "No points on this page.");
        return Ok(());
    }

    let labels: Vec<String> = page
        .rows
        .iter()
        .map(|r| format!("{} - {}", r.code, r.name))
        .collect();
    let idx = Select::new()
        .with_prompt("Point")
        .items(&labels)
        .default(0)
        .interact()?;

    let code = page.rows[idx].code.clone();
    let Some(point) = session.select_point(&code).cloned() else {
        return Ok(());
    };
    render::print_detail(&projection::detail_panel(&point));

    if Confirm::new()
        .with_prompt("Generate a PDF for this point?")
        .default(false)
        .interact()?
    {
        let report = mls_locator_report::point_detail(
            &point,
            &commands::report_context(session, config),
        );
        if let Ok(Some(path)) = commands::emit_report(session, &report, config, false) {
            println!("Report saved: {}", path.display());
        }
    }
    Ok(())
}

fn report(session: &mut DashboardSession, config: &LocatorConfig) -> CliResult {
    let labels: Vec<&str> = ReportKind::ALL.iter().map(|k| k.label()).collect();
    let idx = Select::new()
        .with_prompt("Report")
        .items(&labels)
        .default(0)
        .interact()?;
    let kind = ReportKind::ALL[idx];

    let report = if kind == ReportKind::PointDetail {
        let Some(point) = session.selected_point().cloned() else {
            session.notify(Level::Warning, "Select a point first.");
            return Ok(());
        };
        mls_locator_report::point_detail(&point, &commands::report_context(session, config))
    } else {
        commands::store_report(session, kind, config)
    };

    let preview = Select::new()
        .with_prompt("Output")
        .items(&["Save PDF", "Preview as text"])
        .default(0)
        .interact()?
        == 1;

    if let Ok(Some(path)) = commands::emit_report(session, &report, config, preview) {
        println!("Report saved: {}", path.display());
    }
    Ok(())
}
