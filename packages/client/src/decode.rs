//! Decoding of endpoint bodies into canonical records.
//!
//! These functions are the API boundary: everything past them sees only
//! [`District`], [`Mandal`], and [`PointRecord`]. An unrecognized shape is
//! a [`ApiError::Parse`], never a silently dropped row.

use mls_locator_point_models::{District, Mandal, PointRecord};
use serde::Deserialize;

use crate::ApiError;

fn as_array<'v>(
    value: &'v serde_json::Value,
    endpoint: &str,
) -> Result<&'v Vec<serde_json::Value>, ApiError> {
    value.as_array().ok_or_else(|| ApiError::Parse {
        endpoint: endpoint.to_owned(),
        message: "expected a JSON array".to_string(),
    })
}

/// Decodes the district-list body.
///
/// # Errors
///
/// Returns [`ApiError::Parse`] if the body is not an array or an element
/// has an unrecognized shape.
pub fn districts(value: &serde_json::Value, endpoint: &str) -> Result<Vec<District>, ApiError> {
    as_array(value, endpoint)?
        .iter()
        .map(|item| {
            District::from_json(item).map_err(|e| ApiError::Parse {
                endpoint: endpoint.to_owned(),
                message: e.to_string(),
            })
        })
        .collect()
}

/// Decodes the mandal-list body of `district_code`.
///
/// # Errors
///
/// Returns [`ApiError::Parse`] if the body is not an array or an element
/// has an unrecognized shape.
pub fn mandals(
    district_code: &str,
    value: &serde_json::Value,
    endpoint: &str,
) -> Result<Vec<Mandal>, ApiError> {
    as_array(value, endpoint)?
        .iter()
        .map(|item| {
            Mandal::from_json(district_code, item).map_err(|e| ApiError::Parse {
                endpoint: endpoint.to_owned(),
                message: e.to_string(),
            })
        })
        .collect()
}

/// Decodes a points-list body. Records without a code cannot be keyed
/// and are skipped with a warning.
///
/// # Errors
///
/// Returns [`ApiError::Parse`] if the body is not an array of objects.
pub fn points(value: serde_json::Value, endpoint: &str) -> Result<Vec<PointRecord>, ApiError> {
    as_array(&value, endpoint)?;
    let mut points: Vec<PointRecord> =
        serde_json::from_value(value).map_err(|e| ApiError::Parse {
            endpoint: endpoint.to_owned(),
            message: e.to_string(),
        })?;

    let before = points.len();
    points.retain(|p| !p.code.is_empty());
    if points.len() != before {
        log::warn!(
            "Skipped {} records without an MLS code from {endpoint}",
            before - points.len()
        );
    }
    Ok(points)
}

/// Decodes the all-codes body. Numeric codes are stringified; blank
/// entries are skipped.
///
/// # Errors
///
/// Returns [`ApiError::Parse`] if the body is not an array of scalars.
pub fn codes(value: &serde_json::Value, endpoint: &str) -> Result<Vec<String>, ApiError> {
    let mut codes = Vec::new();
    for item in as_array(value, endpoint)? {
        match item {
            serde_json::Value::String(s) => {
                let s = s.trim();
                if !s.is_empty() {
                    codes.push(s.to_owned());
                }
            }
            serde_json::Value::Number(n) => codes.push(n.to_string()),
            serde_json::Value::Null => {}
            other => {
                return Err(ApiError::Parse {
                    endpoint: endpoint.to_owned(),
                    message: format!("expected a code, got {other}"),
                });
            }
        }
    }
    Ok(codes)
}

#[derive(Deserialize)]
struct SearchBody {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    mls_point: Option<PointRecord>,
    #[serde(default)]
    error: Option<String>,
}

/// Decodes a search body.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] when `success` is false or no point is
/// attached, [`ApiError::Parse`] when the body is not a search object.
pub fn search(
    code: &str,
    value: serde_json::Value,
    endpoint: &str,
) -> Result<PointRecord, ApiError> {
    let body: SearchBody = serde_json::from_value(value).map_err(|e| ApiError::Parse {
        endpoint: endpoint.to_owned(),
        message: e.to_string(),
    })?;

    match body {
        SearchBody {
            success: true,
            mls_point: Some(point),
            ..
        } => Ok(point),
        SearchBody { error, .. } => Err(ApiError::NotFound {
            code: code.to_owned(),
            reason: error,
        }),
    }
}
