#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! MLS point records and the district/mandal hierarchy they live in.
//!
//! The backend serves a spreadsheet-backed table, so values arrive in
//! loose shapes: codes as numbers, blanks as `null`, coordinates as
//! strings. Everything is normalized here, at the API boundary, into one
//! canonical shape that the rest of the workspace can rely on.

mod wire;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Operational status of an MLS point.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum PointStatus {
    /// The point is operating.
    Active,
    /// The point is registered but not operating.
    Inactive,
    /// Status missing or not one of the recognized values.
    #[default]
    Unknown,
}

impl PointStatus {
    /// Maps a raw status string. Matching is exact and case-sensitive;
    /// anything other than `"Active"` or `"Inactive"` is [`Self::Unknown`].
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "Active" => Self::Active,
            "Inactive" => Self::Inactive,
            _ => Self::Unknown,
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Active, Self::Inactive, Self::Unknown]
    }
}

impl<'de> Deserialize<'de> for PointStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(raw.as_str().map_or(Self::Unknown, Self::from_raw))
    }
}

/// A registered MLS point.
///
/// Identified by [`code`](Self::code). Text fields are never `null`; a
/// missing value is an empty string. Coordinates are `None` when absent
/// or unparseable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    /// Unique point code.
    #[serde(rename = "mls_point_code", default, deserialize_with = "wire::lenient_string")]
    pub code: String,
    /// Display name.
    #[serde(rename = "mls_point_name", default, deserialize_with = "wire::lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "wire::lenient_string")]
    pub district_code: String,
    #[serde(default, deserialize_with = "wire::lenient_string")]
    pub district_name: String,
    #[serde(default, deserialize_with = "wire::lenient_string")]
    pub mandal_code: String,
    #[serde(default, deserialize_with = "wire::lenient_string")]
    pub mandal_name: String,
    #[serde(default, deserialize_with = "wire::lenient_string")]
    pub village_name: String,
    /// Street address.
    #[serde(rename = "mls_point_address", default, deserialize_with = "wire::lenient_string")]
    pub address: String,
    #[serde(default)]
    pub status: PointStatus,
    /// Name of the person in charge of the point.
    #[serde(
        rename = "mls_point_incharge_name",
        default,
        deserialize_with = "wire::lenient_string"
    )]
    pub incharge_name: String,
    #[serde(default, deserialize_with = "wire::lenient_string")]
    pub phone_number: String,
    /// Latitude (WGS84).
    #[serde(default, deserialize_with = "wire::lenient_coordinate")]
    pub latitude: Option<f64>,
    /// Longitude (WGS84).
    #[serde(default, deserialize_with = "wire::lenient_coordinate")]
    pub longitude: Option<f64>,
    /// National identity number of the incharge.
    #[serde(rename = "aadhaar_number", default, deserialize_with = "wire::lenient_string")]
    pub national_id: String,
    #[serde(default, deserialize_with = "wire::lenient_string")]
    pub designation: String,
    /// Employee ID of the incharge.
    #[serde(
        rename = "mls_point_incharge_cfms",
        default,
        deserialize_with = "wire::lenient_string"
    )]
    pub employee_id: String,
    /// Every other column the backend sends (DEO details, storage
    /// capacity, camera counts, ...), kept verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl PointRecord {
    /// Returns `(latitude, longitude)` when both are present, finite, and
    /// within WGS84 bounds.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let lat = self.latitude?;
        let lng = self.longitude?;
        if lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng)
        {
            Some((lat, lng))
        } else {
            None
        }
    }

    /// Returns `true` when [`coordinates`](Self::coordinates) would be
    /// `Some`.
    #[must_use]
    pub fn has_valid_coordinates(&self) -> bool {
        self.coordinates().is_some()
    }
}

/// Errors produced while normalizing loosely-shaped API records.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    /// The value matched none of the recognized shapes.
    #[error("Unrecognized {kind} record: {value}")]
    UnrecognizedShape {
        /// Which kind of record was being normalized.
        kind: AreaKind,
        /// Compact JSON of the offending value (truncated).
        value: String,
    },
}

/// Level of the administrative hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum AreaKind {
    District,
    Mandal,
}

impl AreaKind {
    /// `(code key, name key)` pairs accepted for this kind, in the order
    /// they are tried.
    const fn shapes(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::District => &[
                ("District Code", "District Name"),
                ("code", "name"),
                ("district_code", "district_name"),
            ],
            Self::Mandal => &[
                ("Mandal Code", "Mandal Name"),
                ("code", "name"),
                ("mandal_code", "mandal_name"),
            ],
        }
    }
}

const SHAPE_PREVIEW_LEN: usize = 120;

/// Normalizes one area record into `(code, name)`.
///
/// Accepted shapes are a bare string (code and name identical) or an
/// object carrying one of the key pairs for `kind`. Both code and name
/// must be non-empty; numeric codes are stringified.
///
/// # Errors
///
/// Returns [`NormalizeError::UnrecognizedShape`] for anything else.
pub fn normalize_area(
    kind: AreaKind,
    value: &serde_json::Value,
) -> Result<(String, String), NormalizeError> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => {
            let s = s.trim().to_owned();
            return Ok((s.clone(), s));
        }
        serde_json::Value::Object(map) => {
            for (code_key, name_key) in kind.shapes() {
                let code = map.get(*code_key).and_then(wire::scalar_to_string);
                let name = map.get(*name_key).and_then(wire::scalar_to_string);
                if let (Some(code), Some(name)) = (code, name) {
                    return Ok((code, name));
                }
            }
        }
        _ => {}
    }

    let mut preview = value.to_string();
    if preview.len() > SHAPE_PREVIEW_LEN {
        let cut = (0..=SHAPE_PREVIEW_LEN)
            .rev()
            .find(|i| preview.is_char_boundary(*i))
            .unwrap_or(0);
        preview.truncate(cut);
        preview.push_str("...");
    }
    Err(NormalizeError::UnrecognizedShape {
        kind,
        value: preview,
    })
}

/// A district.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct District {
    pub code: String,
    pub name: String,
}

impl District {
    #[must_use]
    pub fn new(code: &str, name: &str) -> Self {
        Self {
            code: code.to_owned(),
            name: name.to_owned(),
        }
    }

    /// Normalizes a district record from the district-list endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError`] if the shape is not recognized.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, NormalizeError> {
        let (code, name) = normalize_area(AreaKind::District, value)?;
        Ok(Self { code, name })
    }
}

/// A mandal, always scoped to the district it was listed under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mandal {
    pub district_code: String,
    pub code: String,
    pub name: String,
}

impl Mandal {
    #[must_use]
    pub fn new(district_code: &str, code: &str, name: &str) -> Self {
        Self {
            district_code: district_code.to_owned(),
            code: code.to_owned(),
            name: name.to_owned(),
        }
    }

    /// Normalizes a mandal record from the mandal-list endpoint of
    /// `district_code`.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError`] if the shape is not recognized.
    pub fn from_json(
        district_code: &str,
        value: &serde_json::Value,
    ) -> Result<Self, NormalizeError> {
        let (code, name) = normalize_area(AreaKind::Mandal, value)?;
        Ok(Self {
            district_code: district_code.to_owned(),
            code,
            name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_is_case_sensitive() {
        assert_eq!(PointStatus::from_raw("Active"), PointStatus::Active);
        assert_eq!(PointStatus::from_raw("Inactive"), PointStatus::Inactive);
        assert_eq!(PointStatus::from_raw("active"), PointStatus::Unknown);
        assert_eq!(PointStatus::from_raw(""), PointStatus::Unknown);

        let padded: PointRecord =
            serde_json::from_value(json!({"mls_point_code": "X1", "status": " Active "}))
                .unwrap();
        assert_eq!(padded.status, PointStatus::Unknown);
        let numeric: PointRecord =
            serde_json::from_value(json!({"mls_point_code": "X2", "status": 1})).unwrap();
        assert_eq!(numeric.status, PointStatus::Unknown);
    }

    #[test]
    fn parses_backend_point_record() {
        let value = json!({
            "mls_point_code": 2_821_029,
            "mls_point_name": "Tenali MLS",
            "district_code": "GNTR",
            "district_name": "Guntur",
            "mandal_code": 12,
            "mandal_name": "Tenali",
            "village_name": null,
            "latitude": "16.2428",
            "longitude": 80.6400,
            "mls_point_address": "Main Road",
            "mls_point_incharge_name": "K. Rao",
            "phone_number": 9_876_543_210_u64,
            "godown_area_sqft": "12000"
        });
        let point: PointRecord = serde_json::from_value(value).unwrap();
        assert_eq!(point.code, "2821029");
        assert_eq!(point.mandal_code, "12");
        assert_eq!(point.village_name, "");
        assert_eq!(point.phone_number, "9876543210");
        assert_eq!(point.status, PointStatus::Unknown);
        assert_eq!(point.coordinates(), Some((16.2428, 80.64)));
        assert_eq!(point.extra.get("godown_area_sqft"), Some(&json!("12000")));
    }

    #[test]
    fn unparseable_coordinates_are_absent() {
        let value = json!({
            "mls_point_code": "X1",
            "latitude": "n/a",
            "status": "Active"
        });
        let point: PointRecord = serde_json::from_value(value).unwrap();
        assert_eq!(point.latitude, None);
        assert_eq!(point.longitude, None);
        assert_eq!(point.status, PointStatus::Active);
        assert!(!point.has_valid_coordinates());
    }

    #[test]
    fn out_of_range_coordinates_are_not_valid() {
        let point = PointRecord {
            latitude: Some(123.0),
            longitude: Some(80.0),
            ..PointRecord::default()
        };
        assert!(point.coordinates().is_none());
    }

    #[test]
    fn normalizes_district_shapes() {
        assert_eq!(
            District::from_json(&json!("Guntur")).unwrap(),
            District::new("Guntur", "Guntur")
        );
        assert_eq!(
            District::from_json(&json!({"District Code": 5, "District Name": "Guntur"})).unwrap(),
            District::new("5", "Guntur")
        );
        assert_eq!(
            District::from_json(&json!({"code": "GNTR", "name": "Guntur"})).unwrap(),
            District::new("GNTR", "Guntur")
        );
        assert_eq!(
            District::from_json(&json!({"district_code": "GNTR", "district_name": "Guntur"}))
                .unwrap(),
            District::new("GNTR", "Guntur")
        );
    }

    #[test]
    fn normalizes_mandal_under_its_district() {
        let mandal =
            Mandal::from_json("GNTR", &json!({"Mandal Code": "7", "Mandal Name": "Rural"}))
                .unwrap();
        assert_eq!(mandal, Mandal::new("GNTR", "7", "Rural"));
    }

    #[test]
    fn rejects_unrecognized_shapes() {
        assert!(District::from_json(&json!({"id": 1})).is_err());
        assert!(District::from_json(&json!({"code": "GNTR"})).is_err());
        assert!(District::from_json(&json!("")).is_err());
        assert!(Mandal::from_json("GNTR", &json!(42)).is_err());
        // Mandal keys are not accepted for districts.
        assert!(
            District::from_json(&json!({"Mandal Code": "1", "Mandal Name": "Rural"})).is_err()
        );
    }
}
