//! Aggregate statistics over a point collection.

use std::collections::HashSet;

use mls_locator_point_models::{PointRecord, PointStatus};
use serde::Serialize;

/// Summary counts for the current collection. Always derived, never
/// stored alongside the points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PointStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    /// Distinct non-empty mandal names.
    pub mandals: usize,
    pub active_percentage: f64,
    pub inactive_percentage: f64,
}

impl PointStats {
    /// Computes statistics for `points`. Only exact `Active` / `Inactive`
    /// statuses are counted; `Unknown` counts toward neither.
    #[must_use]
    pub fn compute<'a>(points: impl IntoIterator<Item = &'a PointRecord>) -> Self {
        let mut total = 0;
        let mut active = 0;
        let mut inactive = 0;
        let mut mandals = HashSet::new();

        for point in points {
            total += 1;
            match point.status {
                PointStatus::Active => active += 1,
                PointStatus::Inactive => inactive += 1,
                PointStatus::Unknown => {}
            }
            if !point.mandal_name.is_empty() {
                mandals.insert(point.mandal_name.as_str());
            }
        }

        Self {
            total,
            active,
            inactive,
            mandals: mandals.len(),
            active_percentage: percentage(active, total),
            inactive_percentage: percentage(inactive, total),
        }
    }
}

/// `part / total * 100` rounded to one decimal place, or 0 for an empty
/// total.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = part as f64 / total as f64 * 100.0;
    (raw * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(code: &str, status: PointStatus, mandal: &str) -> PointRecord {
        PointRecord {
            code: code.to_string(),
            status,
            mandal_name: mandal.to_string(),
            ..PointRecord::default()
        }
    }

    #[test]
    fn empty_collection_is_all_zero() {
        let stats = PointStats::compute(std::iter::empty());
        assert_eq!(stats, PointStats::default());
        assert!(!stats.active_percentage.is_nan());
    }

    #[test]
    fn counts_exact_statuses_only() {
        let points = [
            point("1", PointStatus::Active, "Rural"),
            point("2", PointStatus::Active, "Urban"),
            point("3", PointStatus::Inactive, "Rural"),
            point("4", PointStatus::Unknown, ""),
        ];
        let stats = PointStats::compute(&points);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.active, 2);
        assert_eq!(stats.inactive, 1);
        assert_eq!(stats.mandals, 2);
        assert!((stats.active_percentage - 50.0).abs() < f64::EPSILON);
        assert!((stats.inactive_percentage - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn percentages_round_to_one_decimal() {
        assert!((percentage(1, 3) - 33.3).abs() < 1e-9);
        assert!((percentage(2, 3) - 66.7).abs() < 1e-9);
        assert!((percentage(1, 7) - 14.3).abs() < 1e-9);
        assert!((percentage(0, 0)).abs() < f64::EPSILON);
    }
}
