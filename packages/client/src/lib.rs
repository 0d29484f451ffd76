#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Read-only REST client for the MLS point registry backend.
//!
//! Every backend call goes through the [`PointApi`] trait so the loading
//! pipeline can run against the real [`RemoteDataClient`] or an in-memory
//! fake. The client never retries: each call site decides its own
//! fallback behaviour.

pub mod decode;
pub mod endpoint;
mod http;
pub mod remote;

use async_trait::async_trait;
use mls_locator_point_models::{District, Mandal, PointRecord};
use serde::{Deserialize, Serialize};

pub use endpoint::Endpoint;
pub use remote::RemoteDataClient;

/// Errors that can occur while talking to the backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused,
    /// timeout, DNS failure) or the body could not be read.
    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a non-success status.
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    /// The body was not the JSON shape the endpoint documents.
    #[error("Malformed response from {endpoint}: {message}")]
    Parse { endpoint: String, message: String },

    /// A single-code search found nothing.
    #[error("No MLS point found for code {code}")]
    NotFound {
        code: String,
        /// Backend-supplied reason, if any.
        reason: Option<String>,
    },

    /// The configured base URL cannot carry API paths.
    #[error("Invalid base URL {url}: {message}")]
    InvalidBaseUrl { url: String, message: String },
}

impl ApiError {
    #[must_use]
    pub const fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Identity reported by `/api/user`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Body of a successful `/api/health` call. All fields are optional: any
/// 2xx answer counts as healthy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub records_count: Option<u64>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// The backend operations the locator consumes.
#[async_trait]
pub trait PointApi: Send + Sync {
    /// Fetches the current user identity.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on network or decode failure.
    async fn current_user(&self) -> Result<UserInfo, ApiError>;

    /// Checks backend health. `Ok` means the backend answered 2xx.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on network failure or non-success status.
    async fn health(&self) -> Result<HealthStatus, ApiError>;

    /// Lists all districts.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on network failure or an unrecognized record.
    async fn districts(&self) -> Result<Vec<District>, ApiError>;

    /// Lists the mandals of one district.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on network failure or an unrecognized record.
    async fn mandals(&self, district_code: &str) -> Result<Vec<Mandal>, ApiError>;

    /// Lists the points of one district/mandal pair.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on network or decode failure.
    async fn points(
        &self,
        district_code: &str,
        mandal_code: &str,
    ) -> Result<Vec<PointRecord>, ApiError>;

    /// Lists every known point code.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on network or decode failure.
    async fn all_codes(&self) -> Result<Vec<String>, ApiError>;

    /// Looks up one point by code.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the backend has no such point,
    /// other variants on network or decode failure.
    async fn search(&self, code: &str) -> Result<PointRecord, ApiError>;
}
