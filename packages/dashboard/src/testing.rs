//! In-memory [`PointApi`] for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use mls_locator_client::{ApiError, HealthStatus, PointApi, UserInfo};
use mls_locator_point_models::{District, Mandal, PointRecord, PointStatus};

/// Serves canned responses. Anything not configured fails with HTTP 503,
/// except searches, which fail as not-found.
#[derive(Default)]
pub struct FakeApi {
    districts: Option<Vec<District>>,
    mandals: HashMap<String, Vec<String>>,
    points: HashMap<(String, String), Vec<PointRecord>>,
    codes: Option<Vec<String>>,
    search: HashMap<String, PointRecord>,
    user: Option<UserInfo>,
    healthy: bool,
    requests: Mutex<Vec<String>>,
}

fn unavailable(endpoint: &str) -> ApiError {
    ApiError::Status {
        endpoint: endpoint.to_string(),
        status: 503,
    }
}

impl FakeApi {
    pub fn with_districts(mut self, districts: Vec<District>) -> Self {
        self.districts = Some(districts);
        self
    }

    pub fn with_mandals(mut self, district: &str, mandals: &[&str]) -> Self {
        self.mandals.insert(
            district.to_string(),
            mandals.iter().map(ToString::to_string).collect(),
        );
        self
    }

    pub fn with_points(mut self, district: &str, mandal: &str, points: Vec<PointRecord>) -> Self {
        self.points
            .insert((district.to_string(), mandal.to_string()), points);
        self
    }

    pub fn with_codes(mut self, codes: Vec<String>) -> Self {
        self.codes = Some(codes);
        self
    }

    pub fn with_search_result(mut self, point: PointRecord) -> Self {
        self.search.insert(point.code.clone(), point);
        self
    }

    pub fn with_user(mut self, user: &str) -> Self {
        self.user = Some(UserInfo {
            user: user.to_string(),
            timestamp: None,
        });
        self
    }

    pub const fn healthy(mut self) -> Self {
        self.healthy = true;
        self
    }

    /// Requests received so far, as `kind/param/...`.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, request: String) {
        self.requests.lock().unwrap().push(request);
    }
}

#[async_trait]
impl PointApi for FakeApi {
    async fn current_user(&self) -> Result<UserInfo, ApiError> {
        self.record("user".to_string());
        self.user.clone().ok_or_else(|| unavailable("/api/user"))
    }

    async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.record("health".to_string());
        if self.healthy {
            Ok(HealthStatus {
                status: Some("healthy".to_string()),
                ..HealthStatus::default()
            })
        } else {
            Err(unavailable("/api/health"))
        }
    }

    async fn districts(&self) -> Result<Vec<District>, ApiError> {
        self.record("districts".to_string());
        self.districts
            .clone()
            .ok_or_else(|| unavailable("/api/districts"))
    }

    async fn mandals(&self, district_code: &str) -> Result<Vec<Mandal>, ApiError> {
        self.record(format!("mandals/{district_code}"));
        self.mandals
            .get(district_code)
            .map(|names| {
                names
                    .iter()
                    .map(|n| Mandal::new(district_code, n, n))
                    .collect()
            })
            .ok_or_else(|| unavailable("/api/mandals"))
    }

    async fn points(
        &self,
        district_code: &str,
        mandal_code: &str,
    ) -> Result<Vec<PointRecord>, ApiError> {
        self.record(format!("points/{district_code}/{mandal_code}"));
        self.points
            .get(&(district_code.to_string(), mandal_code.to_string()))
            .cloned()
            .ok_or_else(|| unavailable("/api/mls_points"))
    }

    async fn all_codes(&self) -> Result<Vec<String>, ApiError> {
        self.record("codes".to_string());
        self.codes
            .clone()
            .ok_or_else(|| unavailable("/api/all_mls_codes"))
    }

    async fn search(&self, code: &str) -> Result<PointRecord, ApiError> {
        self.record(format!("search/{code}"));
        self.search
            .get(code)
            .cloned()
            .ok_or_else(|| ApiError::NotFound {
                code: code.to_string(),
                reason: Some("MLS point not found".to_string()),
            })
    }
}

/// `count` active points coded `<prefix>000`, `<prefix>001`, ... in
/// mandal `mandal`.
pub fn active_points(prefix: &str, count: usize, mandal: &str) -> Vec<PointRecord> {
    (0..count)
        .map(|i| PointRecord {
            code: format!("{prefix}{i:03}"),
            name: format!("Point {prefix} {i}"),
            mandal_code: mandal.to_string(),
            mandal_name: mandal.to_string(),
            status: PointStatus::Active,
            ..PointRecord::default()
        })
        .collect()
}
