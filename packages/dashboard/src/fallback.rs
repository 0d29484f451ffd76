//! Built-in data used when the backend is unreachable.

use mls_locator_point_models::{District, PointRecord, PointStatus};

/// Number of synthetic points in [`demo_points`].
pub const DEMO_POINT_COUNT: usize = 25;

/// Key set in [`PointRecord::extra`] on every synthetic point.
pub const DEMO_MARKER_KEY: &str = "demo_data";

const DEMO_DISTRICTS: [&str; 5] = ["Guntur", "Krishna", "Visakhapatnam", "Vijayawada", "Tirupati"];
const DEMO_MANDALS: [&str; 3] = ["Rural", "Urban", "Coastal"];

const FALLBACK_DISTRICTS: [(&str, &str); 13] = [
    ("ANTP", "Anantapur"),
    ("CHTR", "Chittoor"),
    ("EAST", "East Godavari"),
    ("GNTR", "Guntur"),
    ("KADP", "Kadapa"),
    ("KRSN", "Krishna"),
    ("KRNL", "Kurnool"),
    ("NLLR", "Nellore"),
    ("PRKM", "Prakasam"),
    ("SRKL", "Srikakulam"),
    ("VSKP", "Visakhapatnam"),
    ("VIJN", "Vijayawada"),
    ("WEST", "West Godavari"),
];

/// District list offered when `/api/districts` fails.
#[must_use]
pub fn fallback_districts() -> Vec<District> {
    FALLBACK_DISTRICTS
        .iter()
        .map(|(code, name)| District::new(code, name))
        .collect()
}

/// Deterministic sample dataset for all-districts mode when the code list
/// is unavailable. Every record carries [`DEMO_MARKER_KEY`].
#[must_use]
pub fn demo_points() -> Vec<PointRecord> {
    (1..=DEMO_POINT_COUNT).map(demo_point).collect()
}

#[allow(clippy::cast_precision_loss)]
fn demo_point(i: usize) -> PointRecord {
    let district = DEMO_DISTRICTS[(i - 1) % DEMO_DISTRICTS.len()];
    let mandal = DEMO_MANDALS[(i - 1) / DEMO_DISTRICTS.len() % DEMO_MANDALS.len()];
    let prefix = district[..2].to_uppercase();

    // Spread points over a 2 x 2 degree box around central Andhra Pradesh.
    let lat_offset = ((i * 37) % 100) as f64 / 100.0 - 0.5;
    let lng_offset = ((i * 53) % 100) as f64 / 100.0 - 0.5;

    let mut extra = std::collections::BTreeMap::new();
    extra.insert(DEMO_MARKER_KEY.to_string(), serde_json::Value::Bool(true));

    PointRecord {
        code: format!("AP{prefix}{i:03}"),
        name: format!("MLS Point {district} {i}"),
        district_code: district.to_uppercase(),
        district_name: district.to_string(),
        mandal_code: format!("{prefix}-{mandal}").to_uppercase(),
        mandal_name: format!("{district} {mandal}"),
        village_name: format!("Village {i}"),
        address: format!("Address {i}, {district}"),
        status: if i % 4 == 0 {
            PointStatus::Inactive
        } else {
            PointStatus::Active
        },
        incharge_name: format!("Incharge {i}"),
        phone_number: format!("+91 98480{:05}", i * 1_379),
        latitude: Some(lat_offset.mul_add(2.0, 15.9)),
        longitude: Some(lng_offset.mul_add(2.0, 79.7)),
        extra,
        ..PointRecord::default()
    }
}
