//! Read-only projection of session state into view data.
//!
//! Nothing here mutates the session or keeps state of its own. Every
//! function derives its output from the current store and selection, so a
//! renderer (the terminal UI, a JSON dump, a map) only reads.

use chrono::{DateTime, Utc};
use geo::BoundingRect;
use mls_locator_point_models::{PointRecord, PointStatus};
use serde::Serialize;

use crate::filter::{PAGE_SIZE, page_count, page_slice};
use crate::loader::DataOrigin;
use crate::notify::{ActivityEntry, Notification};
use crate::session::{DashboardSession, ViewState};
use crate::stats::PointStats;

/// Placeholder for empty table and panel cells.
pub const PLACEHOLDER: &str = "N/A";

/// Number of buckets kept in the distribution chart.
pub const CHART_BUCKETS: usize = 8;

/// Minimum query length before code suggestions are offered.
pub const SUGGEST_MIN_CHARS: usize = 2;

/// Maximum number of code suggestions.
pub const SUGGEST_LIMIT: usize = 8;

fn or_placeholder(value: &str) -> String {
    if value.trim().is_empty() {
        PLACEHOLDER.to_string()
    } else {
        value.to_string()
    }
}

// ── Selection info ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionInfo {
    pub scope_title: String,
    pub description: String,
    pub chart_title: String,
    pub table_title: String,
    pub point_count: usize,
    pub mandal_count: usize,
    pub last_updated: Option<DateTime<Utc>>,
}

#[must_use]
pub fn selection_info(session: &DashboardSession, stats: &PointStats) -> SelectionInfo {
    let (scope_title, description, chart_title, table_title) = match session.selected_district()
    {
        Some(district) => (
            district.name.clone(),
            format!("Showing detailed data for {} district", district.name),
            format!("{} - Mandal Distribution", district.name),
            format!("{} MLS Points", district.name),
        ),
        None => (
            "All Districts".to_string(),
            match session.origin() {
                DataOrigin::Live => "Showing sample data from multiple districts".to_string(),
                DataOrigin::Demo => "Showing demonstration data (backend unavailable)".to_string(),
            },
            "District Distribution".to_string(),
            "MLS Points Overview".to_string(),
        ),
    };

    SelectionInfo {
        scope_title,
        description,
        chart_title,
        table_title,
        point_count: stats.total,
        mandal_count: stats.mandals,
        last_updated: session.last_updated(),
    }
}

// ── Table ────────────────────────────────────────────────────────────

/// One table row with placeholders already applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub code: String,
    pub name: String,
    pub mandal: String,
    pub village: String,
    pub status: PointStatus,
    pub incharge: String,
    pub phone: String,
}

impl From<&PointRecord> for TableRow {
    fn from(point: &PointRecord) -> Self {
        Self {
            code: or_placeholder(&point.code),
            name: or_placeholder(&point.name),
            mandal: or_placeholder(&point.mandal_name),
            village: or_placeholder(&point.village_name),
            status: point.status,
            incharge: or_placeholder(&point.incharge_name),
            phone: or_placeholder(&point.phone_number),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TablePage {
    pub rows: Vec<TableRow>,
    pub page: usize,
    pub page_count: usize,
    pub filtered_count: usize,
    pub info: String,
    pub has_prev: bool,
    pub has_next: bool,
}

/// `Showing <start> - <end> of <n> entries` for 1-based `page`.
#[must_use]
pub fn pagination_info(page: usize, filtered_count: usize) -> String {
    if filtered_count == 0 {
        return "Showing 0 - 0 of 0 entries".to_string();
    }
    let start = (page.max(1) - 1) * PAGE_SIZE + 1;
    let end = (page.max(1) * PAGE_SIZE).min(filtered_count);
    format!("Showing {start} - {end} of {filtered_count} entries")
}

#[must_use]
pub fn table_page(session: &DashboardSession) -> TablePage {
    let filtered = session.filtered();
    let page = session.selection().page();
    let pages = page_count(filtered.len());

    TablePage {
        rows: page_slice(&filtered, page)
            .iter()
            .map(|p| TableRow::from(*p))
            .collect(),
        page,
        page_count: pages,
        filtered_count: filtered.len(),
        info: pagination_info(page, filtered.len()),
        has_prev: page > 1,
        has_next: page < pages,
    }
}

/// Distinct non-empty mandal names, sorted.
#[must_use]
pub fn mandal_options<'a>(points: impl IntoIterator<Item = &'a PointRecord>) -> Vec<String> {
    let mut names: Vec<String> = points
        .into_iter()
        .filter(|p| !p.mandal_name.is_empty())
        .map(|p| p.mandal_name.clone())
        .collect();
    names.sort();
    names.dedup();
    names
}

// ── Charts ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Mandal,
    District,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartBucket {
    pub label: String,
    pub count: usize,
}

/// Point counts per mandal or district, largest first (ties keep the
/// order the group was first seen), truncated to [`CHART_BUCKETS`].
/// Points with no group name count as `Unknown`.
#[must_use]
pub fn distribution<'a>(
    points: impl IntoIterator<Item = &'a PointRecord>,
    by: GroupBy,
) -> Vec<ChartBucket> {
    let mut buckets: Vec<ChartBucket> = Vec::new();

    for point in points {
        let label = match by {
            GroupBy::Mandal => point.mandal_name.as_str(),
            GroupBy::District => point.district_name.as_str(),
        };
        let label = if label.is_empty() { "Unknown" } else { label };

        if let Some(bucket) = buckets.iter_mut().find(|b| b.label == label) {
            bucket.count += 1;
        } else {
            buckets.push(ChartBucket {
                label: label.to_string(),
                count: 1,
            });
        }
    }

    // `sort_by` is stable, so ties keep first-seen order.
    buckets.sort_by(|a, b| b.count.cmp(&a.count));
    buckets.truncate(CHART_BUCKETS);
    buckets
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusChart {
    pub active: usize,
    pub inactive: usize,
}

impl From<&PointStats> for StatusChart {
    fn from(stats: &PointStats) -> Self {
        Self {
            active: stats.active,
            inactive: stats.inactive,
        }
    }
}

// ── Map markers ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub code: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: PointStatus,
    pub district: String,
    pub mandal: String,
    pub village: String,
}

/// Bounding box of a marker set, for fitting the map view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub min_lng: f64,
    pub max_lat: f64,
    pub max_lng: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarkerSet {
    pub markers: Vec<Marker>,
    /// Points left off the map for missing or invalid coordinates.
    pub skipped: usize,
    pub bounds: Option<Bounds>,
}

/// Builds markers for every point with valid coordinates.
#[must_use]
pub fn markers<'a>(points: impl IntoIterator<Item = &'a PointRecord>) -> MarkerSet {
    let mut set = MarkerSet::default();

    for point in points {
        let Some((latitude, longitude)) = point.coordinates() else {
            log::debug!("No valid coordinates for {}", point.code);
            set.skipped += 1;
            continue;
        };
        set.markers.push(Marker {
            code: point.code.clone(),
            name: point.name.clone(),
            latitude,
            longitude,
            status: point.status,
            district: point.district_name.clone(),
            mandal: point.mandal_name.clone(),
            village: point.village_name.clone(),
        });
    }

    let multi = geo::MultiPoint::new(
        set.markers
            .iter()
            .map(|m| geo::Point::new(m.longitude, m.latitude))
            .collect(),
    );
    set.bounds = multi.bounding_rect().map(|rect| Bounds {
        min_lat: rect.min().y,
        min_lng: rect.min().x,
        max_lat: rect.max().y,
        max_lng: rect.max().x,
    });

    set
}

impl MarkerSet {
    /// Exports the markers as a `GeoJSON` `FeatureCollection` of points.
    #[must_use]
    pub fn to_geojson(&self) -> geojson::FeatureCollection {
        let features = self
            .markers
            .iter()
            .map(|m| {
                let mut properties = geojson::JsonObject::new();
                properties.insert("code".to_string(), m.code.clone().into());
                properties.insert("name".to_string(), m.name.clone().into());
                properties.insert("status".to_string(), m.status.to_string().into());
                properties.insert("district".to_string(), m.district.clone().into());
                properties.insert("mandal".to_string(), m.mandal.clone().into());
                properties.insert("village".to_string(), m.village.clone().into());

                geojson::Feature {
                    bbox: None,
                    geometry: Some(geojson::Geometry::new(geojson::Value::Point(vec![
                        m.longitude,
                        m.latitude,
                    ]))),
                    id: Some(geojson::feature::Id::String(m.code.clone())),
                    properties: Some(properties),
                    foreign_members: None,
                }
            })
            .collect();

        geojson::FeatureCollection {
            bbox: self
                .bounds
                .map(|b| vec![b.min_lng, b.min_lat, b.max_lng, b.max_lat]),
            features,
            foreign_members: None,
        }
    }
}

// ── Detail panel ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailField {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailSection {
    pub title: String,
    pub fields: Vec<DetailField>,
}

fn field(label: &str, value: &str) -> DetailField {
    DetailField {
        label: label.to_string(),
        value: value.to_string(),
    }
}

fn coordinate(value: Option<f64>) -> String {
    value.map_or_else(String::new, |v| format!("{v:.6}"))
}

/// `storage_capacity_mt` -> `Storage Capacity Mt`
fn humanize(key: &str) -> String {
    key.split(|c: char| c == '_' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect::<String>()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn extra_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Labeled fields of one point in three sections: point details,
/// incharge details, and any additional facility columns. Values are raw
/// (empty when missing).
#[must_use]
pub fn point_sections(point: &PointRecord) -> Vec<DetailSection> {
    let mut sections = vec![
        DetailSection {
            title: "MLS Point Details".to_string(),
            fields: vec![
                field("MLS Point Code", &point.code),
                field("MLS Point Name", &point.name),
                field("District Name", &point.district_name),
                field("Mandal Name", &point.mandal_name),
                field("Village Name", &point.village_name),
                field("Address", &point.address),
                field("Latitude", &coordinate(point.latitude)),
                field("Longitude", &coordinate(point.longitude)),
                field("Status", point.status.as_ref()),
            ],
        },
        DetailSection {
            title: "Incharge Details".to_string(),
            fields: vec![
                field("EMP ID", &point.employee_id),
                field("Name", &point.incharge_name),
                field("Designation", &point.designation),
                field("Aadhaar", &point.national_id),
                field("Phone", &point.phone_number),
            ],
        },
    ];

    let extra: Vec<DetailField> = point
        .extra
        .iter()
        .filter(|(key, _)| key.as_str() != crate::fallback::DEMO_MARKER_KEY)
        .map(|(key, value)| field(&humanize(key), &extra_value(value)))
        .collect();
    if !extra.is_empty() {
        sections.push(DetailSection {
            title: "Additional Details".to_string(),
            fields: extra,
        });
    }

    sections
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailPanel {
    pub title: String,
    pub subtitle: String,
    pub sections: Vec<DetailSection>,
}

/// The detail panel for `point`, with placeholders for empty values.
#[must_use]
pub fn detail_panel(point: &PointRecord) -> DetailPanel {
    let mut sections = point_sections(point);
    for section in &mut sections {
        for field in &mut section.fields {
            field.value = or_placeholder(&field.value);
        }
    }

    DetailPanel {
        title: or_placeholder(&point.name),
        subtitle: or_placeholder(&point.code),
        sections,
    }
}

// ── Autocomplete ─────────────────────────────────────────────────────

/// Up to [`SUGGEST_LIMIT`] codes containing `query` case-insensitively,
/// in list order. Queries shorter than [`SUGGEST_MIN_CHARS`] suggest
/// nothing.
#[must_use]
pub fn suggest_codes<'a>(codes: &'a [String], query: &str) -> Vec<&'a str> {
    let query = query.trim().to_lowercase();
    if query.chars().count() < SUGGEST_MIN_CHARS {
        return Vec::new();
    }
    codes
        .iter()
        .filter(|c| c.to_lowercase().contains(&query))
        .take(SUGGEST_LIMIT)
        .map(String::as_str)
        .collect()
}

// ── Whole view ───────────────────────────────────────────────────────

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub user: String,
    pub connectivity: String,
    pub state: ViewStateView,
    pub stats: PointStats,
    pub info: SelectionInfo,
    pub table: TablePage,
    pub distribution: Vec<ChartBucket>,
    pub status_chart: StatusChart,
    pub markers: MarkerSet,
    pub mandal_options: Vec<String>,
    pub notifications: Vec<Notification>,
    pub activity: Vec<ActivityEntry>,
    pub detail: Option<DetailPanel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum ViewStateView {
    Loading,
    Ready,
    Error(String),
}

impl From<&ViewState> for ViewStateView {
    fn from(state: &ViewState) -> Self {
        match state {
            ViewState::Loading => Self::Loading,
            ViewState::Ready => Self::Ready,
            ViewState::Error(message) => Self::Error(message.clone()),
        }
    }
}

/// Projects the whole session as of `now`.
#[must_use]
pub fn project(session: &DashboardSession, now: DateTime<Utc>) -> DashboardView {
    let stats = session.stats();
    let group_by = if session.selected_district().is_some() {
        GroupBy::Mandal
    } else {
        GroupBy::District
    };

    DashboardView {
        user: session.user().to_string(),
        connectivity: session.connectivity().to_string(),
        state: session.view().into(),
        info: selection_info(session, &stats),
        table: table_page(session),
        distribution: distribution(session.store().all(), group_by),
        status_chart: StatusChart::from(&stats),
        markers: markers(session.store().all()),
        mandal_options: mandal_options(session.store().all()),
        notifications: session.notifications().active(now).cloned().collect(),
        activity: session.activity().entries().cloned().collect(),
        detail: session.selected_point().map(detail_panel),
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mls_locator_config::{LoadingConfig, LocatorConfig};
    use mls_locator_point_models::District;

    use crate::progress::null_progress;
    use crate::testing::{FakeApi, active_points};

    fn located(code: &str, lat: Option<f64>, lng: Option<f64>) -> PointRecord {
        PointRecord {
            code: code.to_string(),
            latitude: lat,
            longitude: lng,
            ..PointRecord::default()
        }
    }

    fn grouped(code: &str, district: &str, mandal: &str) -> PointRecord {
        PointRecord {
            code: code.to_string(),
            district_name: district.to_string(),
            mandal_name: mandal.to_string(),
            ..PointRecord::default()
        }
    }

    #[test]
    fn pagination_text() {
        assert_eq!(pagination_info(1, 0), "Showing 0 - 0 of 0 entries");
        assert_eq!(pagination_info(1, 10), "Showing 1 - 10 of 10 entries");
        assert_eq!(pagination_info(2, 60), "Showing 26 - 50 of 60 entries");
        assert_eq!(pagination_info(3, 60), "Showing 51 - 60 of 60 entries");
    }

    #[test]
    fn distribution_sorts_by_count_with_stable_ties() {
        let points = vec![
            grouped("1", "Guntur", "Rural"),
            grouped("2", "Krishna", "Urban"),
            grouped("3", "Krishna", "Urban"),
            grouped("4", "Guntur", ""),
            grouped("5", "", "Rural"),
        ];

        let by_district = distribution(&points, GroupBy::District);
        assert_eq!(
            by_district,
            vec![
                ChartBucket {
                    label: "Guntur".to_string(),
                    count: 2,
                },
                ChartBucket {
                    label: "Krishna".to_string(),
                    count: 2,
                },
                ChartBucket {
                    label: "Unknown".to_string(),
                    count: 1,
                },
            ]
        );

        let by_mandal = distribution(&points, GroupBy::Mandal);
        assert_eq!(by_mandal[0].label, "Rural");
        assert_eq!(by_mandal[1].label, "Urban");
        assert_eq!(by_mandal[2].label, "Unknown");
    }

    #[test]
    fn distribution_keeps_top_eight() {
        let points: Vec<_> = (0..12)
            .map(|i| grouped(&i.to_string(), &format!("D{i}"), ""))
            .collect();
        assert_eq!(distribution(&points, GroupBy::District).len(), CHART_BUCKETS);
    }

    #[test]
    fn markers_skip_invalid_coordinates_and_bound_the_rest() {
        let points = vec![
            located("A", Some(16.3), Some(80.4)),
            located("B", Some(15.5), Some(79.9)),
            located("C", None, Some(80.0)),
            located("D", Some(95.0), Some(80.0)),
            located("E", Some(f64::NAN), Some(80.0)),
        ];

        let set = markers(&points);
        assert_eq!(set.markers.len(), 2);
        assert_eq!(set.skipped, 3);

        let bounds = set.bounds.unwrap();
        assert!((bounds.min_lat - 15.5).abs() < 1e-9);
        assert!((bounds.max_lat - 16.3).abs() < 1e-9);
        assert!((bounds.min_lng - 79.9).abs() < 1e-9);
        assert!((bounds.max_lng - 80.4).abs() < 1e-9);
    }

    #[test]
    fn no_markers_no_bounds() {
        let set = markers(&[located("A", None, None)]);
        assert!(set.markers.is_empty());
        assert!(set.bounds.is_none());
        assert!(set.to_geojson().features.is_empty());
    }

    #[test]
    fn geojson_export_uses_lng_lat_order() {
        let set = markers(&[located("A", Some(16.3), Some(80.4))]);
        let collection = set.to_geojson();
        assert_eq!(collection.features.len(), 1);

        let json = serde_json::to_value(&collection).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["features"][0]["geometry"]["type"], "Point");
        assert_eq!(json["features"][0]["geometry"]["coordinates"][0], 80.4);
        assert_eq!(json["features"][0]["geometry"]["coordinates"][1], 16.3);
        assert_eq!(json["features"][0]["properties"]["code"], "A");
        assert_eq!(json["features"][0]["id"], "A");
    }

    #[test]
    fn mandal_options_are_sorted_and_distinct() {
        let points = vec![
            grouped("1", "", "Urban"),
            grouped("2", "", "Rural"),
            grouped("3", "", ""),
            grouped("4", "", "Urban"),
        ];
        assert_eq!(mandal_options(&points), vec!["Rural", "Urban"]);
    }

    #[test]
    fn suggestions() {
        let codes: Vec<String> = ["2821029", "2821030", "MLS001", "mls002", "AP001"]
            .iter()
            .map(ToString::to_string)
            .collect();

        assert!(suggest_codes(&codes, "2").is_empty());
        assert_eq!(suggest_codes(&codes, "ml"), vec!["MLS001", "mls002"]);
        assert_eq!(suggest_codes(&codes, "001"), vec!["MLS001", "AP001"]);

        let many: Vec<String> = (0..20).map(|i| format!("AP{i:03}")).collect();
        assert_eq!(suggest_codes(&many, "ap").len(), SUGGEST_LIMIT);
    }

    #[test]
    fn detail_panel_sections_and_placeholders() {
        let mut point = PointRecord {
            code: "2821029".to_string(),
            name: "Guntur MLS".to_string(),
            latitude: Some(16.3),
            ..PointRecord::default()
        };
        point
            .extra
            .insert("storage_capacity_mt".to_string(), serde_json::json!(500));
        point
            .extra
            .insert("deo_name".to_string(), serde_json::Value::Null);

        let panel = detail_panel(&point);
        assert_eq!(panel.title, "Guntur MLS");
        assert_eq!(panel.sections.len(), 3);

        let details = &panel.sections[0].fields;
        assert_eq!(details[0].value, "2821029");
        assert_eq!(details[2].value, PLACEHOLDER);
        assert_eq!(details[6].value, "16.300000");
        assert_eq!(details[7].value, PLACEHOLDER);

        let extra = &panel.sections[2].fields;
        assert_eq!(extra[0].label, "Deo Name");
        assert_eq!(extra[0].value, PLACEHOLDER);
        assert_eq!(extra[1].label, "Storage Capacity Mt");
        assert_eq!(extra[1].value, "500");
    }

    #[test]
    fn table_rows_use_placeholders() {
        let row = TableRow::from(&PointRecord::default());
        assert_eq!(row.code, PLACEHOLDER);
        assert_eq!(row.status, PointStatus::Unknown);
    }

    #[tokio::test]
    async fn projects_district_view() {
        let api = FakeApi::default()
            .with_mandals("GNTR", &["Rural", "Urban"])
            .with_points("GNTR", "Rural", active_points("R", 10, "Rural"))
            .with_points("GNTR", "Urban", active_points("U", 30, "Urban"));
        let mut config = LocatorConfig::default();
        config.loading = LoadingConfig::unpaced(30);
        let mut session = DashboardSession::new(&config);
        session
            .reload(&api, Some(District::new("GNTR", "Guntur")), &null_progress())
            .await;
        session.next_page();

        let view = project(&session, Utc::now());

        assert_eq!(view.state, ViewStateView::Ready);
        assert_eq!(view.info.scope_title, "Guntur");
        assert_eq!(view.info.chart_title, "Guntur - Mandal Distribution");
        assert_eq!(view.info.table_title, "Guntur MLS Points");
        assert_eq!(view.table.page, 2);
        assert_eq!(view.table.rows.len(), 15);
        assert_eq!(view.table.info, "Showing 26 - 40 of 40 entries");
        assert!(view.table.has_prev);
        assert!(!view.table.has_next);
        assert_eq!(view.distribution[0].label, "Urban");
        assert_eq!(view.status_chart.active, 40);
        assert_eq!(view.markers.skipped, 40);
        assert_eq!(view.mandal_options, vec!["Rural", "Urban"]);
        assert!(view.detail.is_none());
        assert!(!view.notifications.is_empty());
    }

    #[tokio::test]
    async fn projects_all_districts_titles() {
        let api = FakeApi::default();
        let mut config = LocatorConfig::default();
        config.loading = LoadingConfig::unpaced(30);
        let mut session = DashboardSession::new(&config);
        session.reload(&api, None, &null_progress()).await;

        let view = project(&session, Utc::now());
        assert_eq!(view.info.scope_title, "All Districts");
        assert_eq!(view.info.chart_title, "District Distribution");
        assert_eq!(view.info.table_title, "MLS Points Overview");
        assert_eq!(view.stats.total, 25);
        assert_eq!(view.markers.markers.len(), 25);
    }
}
