//! [`PointApi`] over HTTP.

use async_trait::async_trait;
use mls_locator_config::ApiConfig;
use mls_locator_point_models::{District, Mandal, PointRecord};

use crate::{ApiError, Endpoint, HealthStatus, PointApi, UserInfo, decode, http};

/// Client for the live backend.
#[derive(Debug, Clone)]
pub struct RemoteDataClient {
    http: reqwest::Client,
    base_url: reqwest::Url,
}

impl RemoteDataClient {
    /// Creates a client for `config.base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBaseUrl`] if the URL does not parse or
    /// cannot carry a path, and [`ApiError::Transport`] if the HTTP client
    /// cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url =
            reqwest::Url::parse(config.base_url.trim()).map_err(|e| ApiError::InvalidBaseUrl {
                url: config.base_url.clone(),
                message: e.to_string(),
            })?;
        Endpoint::Health.url(&base_url)?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("mls-locator/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| ApiError::Transport {
                endpoint: "client".to_string(),
                source,
            })?;

        log::debug!("Backend client for {base_url}");

        Ok(Self { http, base_url })
    }

    #[must_use]
    pub const fn base_url(&self) -> &reqwest::Url {
        &self.base_url
    }

    async fn get_json(&self, endpoint: Endpoint<'_>) -> Result<serde_json::Value, ApiError> {
        let url = endpoint.url(&self.base_url)?;
        http::get_json(&self.http, url, &endpoint.to_string()).await
    }
}

#[async_trait]
impl PointApi for RemoteDataClient {
    async fn current_user(&self) -> Result<UserInfo, ApiError> {
        let endpoint = Endpoint::User;
        let value = self.get_json(endpoint).await?;
        serde_json::from_value(value).map_err(|e| ApiError::Parse {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })
    }

    async fn health(&self) -> Result<HealthStatus, ApiError> {
        let endpoint = Endpoint::Health;
        let url = endpoint.url(&self.base_url)?;
        let response = http::send_get(&self.http, url, &endpoint.to_string()).await?;

        // Any 2xx is healthy; the body is informational only.
        let status = match response.json::<HealthStatus>().await {
            Ok(status) => status,
            Err(e) => {
                log::debug!("Unreadable health body: {e}");
                HealthStatus::default()
            }
        };
        Ok(status)
    }

    async fn districts(&self) -> Result<Vec<District>, ApiError> {
        let endpoint = Endpoint::Districts;
        let value = self.get_json(endpoint).await?;
        decode::districts(&value, &endpoint.to_string())
    }

    async fn mandals(&self, district_code: &str) -> Result<Vec<Mandal>, ApiError> {
        let endpoint = Endpoint::Mandals { district_code };
        let value = self.get_json(endpoint).await?;
        decode::mandals(district_code, &value, &endpoint.to_string())
    }

    async fn points(
        &self,
        district_code: &str,
        mandal_code: &str,
    ) -> Result<Vec<PointRecord>, ApiError> {
        let endpoint = Endpoint::Points {
            district_code,
            mandal_code,
        };
        let value = self.get_json(endpoint).await?;
        decode::points(value, &endpoint.to_string())
    }

    async fn all_codes(&self) -> Result<Vec<String>, ApiError> {
        let endpoint = Endpoint::AllCodes;
        let value = self.get_json(endpoint).await?;
        decode::codes(&value, &endpoint.to_string())
    }

    async fn search(&self, code: &str) -> Result<PointRecord, ApiError> {
        let endpoint = Endpoint::Search { code };
        let value = match self.get_json(endpoint).await {
            Ok(value) => value,
            Err(ApiError::Status { status: 404, .. }) => {
                return Err(ApiError::NotFound {
                    code: code.to_owned(),
                    reason: None,
                });
            }
            Err(e) => return Err(e),
        };
        decode::search(code, value, &endpoint.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> ApiConfig {
        ApiConfig {
            base_url: url.to_string(),
            ..ApiConfig::default()
        }
    }

    #[test]
    fn accepts_default_base_url() {
        let client = RemoteDataClient::new(&ApiConfig::default()).unwrap();
        assert_eq!(client.base_url().as_str(), "http://127.0.0.1:5000/");
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let err = RemoteDataClient::new(&config("not a url")).unwrap_err();
        assert!(matches!(err, ApiError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn rejects_base_url_without_path() {
        let err = RemoteDataClient::new(&config("mailto:ops@example.com")).unwrap_err();
        assert!(matches!(err, ApiError::InvalidBaseUrl { .. }));
    }
}
