//! The fixed set of backend endpoints and their URL construction.

use std::fmt;

use crate::ApiError;

/// One backend endpoint together with its path parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    User,
    Health,
    Districts,
    Mandals {
        district_code: &'a str,
    },
    Points {
        district_code: &'a str,
        mandal_code: &'a str,
    },
    AllCodes,
    Search {
        code: &'a str,
    },
}

impl<'a> Endpoint<'a> {
    /// Raw (unencoded) path segments after the base URL.
    fn segments(&self) -> Vec<&'a str> {
        match *self {
            Self::User => vec!["api", "user"],
            Self::Health => vec!["api", "health"],
            Self::Districts => vec!["api", "districts"],
            Self::Mandals { district_code } => vec!["api", "mandals", district_code],
            Self::Points {
                district_code,
                mandal_code,
            } => vec!["api", "mls_points", district_code, mandal_code],
            Self::AllCodes => vec!["api", "all_mls_codes"],
            Self::Search { code } => vec!["api", "search_mls_code", code],
        }
    }

    /// Builds the request URL. Each path parameter becomes exactly one
    /// percent-encoded segment, so a code containing `/` cannot change the
    /// route.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBaseUrl`] if `base` cannot carry a path
    /// (e.g. a `data:` URL).
    pub fn url(&self, base: &reqwest::Url) -> Result<reqwest::Url, ApiError> {
        let mut url = base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| ApiError::InvalidBaseUrl {
                    url: base.to_string(),
                    message: "URL cannot be a base".to_string(),
                })?;
            path.pop_if_empty();
            path.extend(self.segments());
        }
        Ok(url)
    }
}

impl fmt::Display for Endpoint<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in self.segments() {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(url: &str) -> reqwest::Url {
        reqwest::Url::parse(url).unwrap()
    }

    #[test]
    fn builds_fixed_paths() {
        let url = Endpoint::Districts.url(&base("http://localhost:5000")).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/districts");

        let url = Endpoint::AllCodes.url(&base("http://localhost:5000/")).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/all_mls_codes");
    }

    #[test]
    fn keeps_base_path_prefix() {
        let url = Endpoint::Health
            .url(&base("https://gateway.example/mls/"))
            .unwrap();
        assert_eq!(url.as_str(), "https://gateway.example/mls/api/health");
    }

    #[test]
    fn encodes_path_parameters_as_single_segments() {
        let endpoint = Endpoint::Points {
            district_code: "East Godavari",
            mandal_code: "A/B",
        };
        let url = endpoint.url(&base("http://localhost:5000")).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/mls_points/East%20Godavari/A%2FB"
        );
    }

    #[test]
    fn display_is_unencoded_path() {
        assert_eq!(
            Endpoint::Search { code: "2821029" }.to_string(),
            "/api/search_mls_code/2821029"
        );
    }

    #[test]
    fn rejects_cannot_be_a_base_url() {
        let err = Endpoint::User
            .url(&base("mailto:someone@example.com"))
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidBaseUrl { .. }));
    }
}
