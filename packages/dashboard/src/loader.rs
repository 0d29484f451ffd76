//! The sequential fetch cascades behind a district reload.
//!
//! Both loaders are serial: one request at a time, in list
//! order, with a fixed pause between consecutive requests. Individual
//! failures are logged and skipped so a reload always yields whatever
//! could be fetched.

use std::sync::Arc;
use std::time::Duration;

use mls_locator_client::PointApi;
use mls_locator_config::LoadingConfig;
use mls_locator_point_models::{Mandal, PointRecord};

use crate::fallback;
use crate::progress::ProgressCallback;

/// Result of loading one district.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistrictLoad {
    pub mandals: Vec<Mandal>,
    /// Points of every mandal that loaded, concatenated in mandal order.
    pub points: Vec<PointRecord>,
    /// Codes of mandals whose point fetch failed.
    pub failed_mandals: Vec<String>,
    /// Set when the mandal list itself could not be fetched.
    pub mandal_error: Option<String>,
}

/// Where an all-districts sample came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOrigin {
    /// Resolved from the backend.
    Live,
    /// The built-in synthetic dataset.
    Demo,
}

/// Result of loading the all-districts sample.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleLoad {
    pub points: Vec<PointRecord>,
    pub origin: DataOrigin,
    /// Sampled codes that did not resolve.
    pub failed_codes: usize,
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Loads every point of `district_code`: the mandal list first, then each
/// mandal's points in turn.
pub async fn load_district<A: PointApi + ?Sized>(
    api: &A,
    district_code: &str,
    config: &LoadingConfig,
    progress: &Arc<dyn ProgressCallback>,
) -> DistrictLoad {
    let mut load = DistrictLoad::default();

    progress.set_message(format!("Fetching mandals for {district_code}"));
    match api.mandals(district_code).await {
        Ok(mandals) => {
            log::info!("{district_code}: {} mandals", mandals.len());
            load.mandals = mandals;
        }
        Err(e) => {
            log::warn!("Failed to load mandals for {district_code}: {e}");
            load.mandal_error = Some(e.to_string());
        }
    }

    progress.set_total(load.mandals.len() as u64);

    for (i, mandal) in load.mandals.iter().enumerate() {
        if i > 0 {
            pause(config.mandal_delay()).await;
        }
        progress.set_message(format!("{district_code}/{}", mandal.name));

        match api.points(district_code, &mandal.code).await {
            Ok(points) => {
                log::debug!(
                    "Loaded {} points for {district_code}/{}",
                    points.len(),
                    mandal.code
                );
                load.points.extend(points);
            }
            Err(e) => {
                log::warn!(
                    "Failed to load points for {district_code}/{}: {e}",
                    mandal.code
                );
                load.failed_mandals.push(mandal.code.clone());
            }
        }
        progress.inc(1);
    }

    progress.finish(format!(
        "{district_code}: {} points from {} mandals",
        load.points.len(),
        load.mandals.len() - load.failed_mandals.len()
    ));

    load
}

/// Loads the all-districts sample: the first `config.sample_size` codes,
/// each resolved by a single-code search. Falls back to
/// [`fallback::demo_points`] when the code list is unavailable.
pub async fn load_sample<A: PointApi + ?Sized>(
    api: &A,
    config: &LoadingConfig,
    progress: &Arc<dyn ProgressCallback>,
) -> SampleLoad {
    progress.set_message("Fetching point codes".to_string());

    let codes = match api.all_codes().await {
        Ok(codes) => codes,
        Err(e) => {
            log::warn!("Failed to load point codes, using demo data: {e}");
            progress.finish_and_clear();
            return SampleLoad {
                points: fallback::demo_points(),
                origin: DataOrigin::Demo,
                failed_codes: 0,
            };
        }
    };

    let sample: Vec<&String> = codes.iter().take(config.sample_size).collect();
    log::info!(
        "Resolving a sample of {} of {} point codes",
        sample.len(),
        codes.len()
    );
    progress.set_total(sample.len() as u64);

    let mut points = Vec::with_capacity(sample.len());
    let mut failed_codes = 0;

    for (i, code) in sample.into_iter().enumerate() {
        if i > 0 {
            pause(config.sample_delay()).await;
        }
        progress.set_message(format!("Point {code}"));

        match api.search(code).await {
            Ok(point) => points.push(point),
            Err(e) if e.is_not_found() => {
                log::debug!("{e}");
                failed_codes += 1;
            }
            Err(e) => {
                log::warn!("Failed to resolve point {code}: {e}");
                failed_codes += 1;
            }
        }
        progress.inc(1);
    }

    progress.finish(format!("Loaded {} sample points", points.len()));

    SampleLoad {
        points,
        origin: DataOrigin::Live,
        failed_codes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::null_progress;
    use crate::testing::{FakeApi, active_points};
    use mls_locator_point_models::{Mandal, PointStatus};

    #[tokio::test]
    async fn loads_every_mandal_in_order() {
        let api = FakeApi::default()
            .with_mandals("GNTR", &["Rural", "Urban"])
            .with_points("GNTR", "Rural", active_points("R", 10, "Rural"))
            .with_points("GNTR", "Urban", active_points("U", 15, "Urban"));

        let load = load_district(&api, "GNTR", &LoadingConfig::unpaced(30), &null_progress()).await;

        assert_eq!(load.points.len(), 25);
        assert_eq!(load.points[0].code, "R000");
        assert_eq!(load.points[10].code, "U000");
        assert!(load.failed_mandals.is_empty());
        assert_eq!(
            load.mandals,
            vec![
                Mandal::new("GNTR", "Rural", "Rural"),
                Mandal::new("GNTR", "Urban", "Urban"),
            ]
        );
        assert_eq!(
            api.requests(),
            vec![
                "mandals/GNTR",
                "points/GNTR/Rural",
                "points/GNTR/Urban",
            ]
        );
    }

    #[tokio::test]
    async fn one_failed_mandal_keeps_the_others() {
        let api = FakeApi::default()
            .with_mandals("KRSN", &["A", "B", "C"])
            .with_points("KRSN", "A", active_points("A", 2, "A"))
            .with_points("KRSN", "C", active_points("C", 3, "C"));

        let load = load_district(&api, "KRSN", &LoadingConfig::unpaced(30), &null_progress()).await;

        let codes: Vec<_> = load.points.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes, vec!["A000", "A001", "C000", "C001", "C002"]);
        assert_eq!(load.failed_mandals, vec!["B"]);
    }

    #[tokio::test]
    async fn failed_mandal_list_is_empty_not_fatal() {
        let api = FakeApi::default();
        let load = load_district(&api, "NLLR", &LoadingConfig::unpaced(30), &null_progress()).await;

        assert!(load.mandals.is_empty());
        assert!(load.points.is_empty());
        assert!(load.mandal_error.is_some());
    }

    #[tokio::test]
    async fn sample_takes_bounded_prefix() {
        let mut api = FakeApi::default();
        let points = active_points("P", 5, "Rural");
        api = api.with_codes(points.iter().map(|p| p.code.clone()).collect());
        for point in points {
            api = api.with_search_result(point);
        }

        let load = load_sample(&api, &LoadingConfig::unpaced(3), &null_progress()).await;

        assert_eq!(load.origin, DataOrigin::Live);
        let codes: Vec<_> = load.points.iter().map(|p| p.code.as_str()).collect();
        assert_eq!(codes, vec!["P000", "P001", "P002"]);
        assert_eq!(api.requests().len(), 4);
    }

    #[tokio::test]
    async fn unresolved_codes_are_skipped() {
        let api = FakeApi::default()
            .with_codes(vec!["X1".to_string(), "X2".to_string()])
            .with_search_result(PointRecord {
                code: "X2".to_string(),
                status: PointStatus::Inactive,
                ..PointRecord::default()
            });

        let load = load_sample(&api, &LoadingConfig::unpaced(30), &null_progress()).await;

        assert_eq!(load.points.len(), 1);
        assert_eq!(load.failed_codes, 1);
    }

    #[tokio::test]
    async fn code_list_failure_uses_demo_data() {
        let api = FakeApi::default();
        let load = load_sample(&api, &LoadingConfig::unpaced(30), &null_progress()).await;

        assert_eq!(load.origin, DataOrigin::Demo);
        assert_eq!(load.points, fallback::demo_points());
    }
}
