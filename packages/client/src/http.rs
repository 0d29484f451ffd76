//! HTTP send/decode helpers.
//!
//! Every backend call goes through [`send_get`] and, for JSON bodies,
//! [`get_json`]. A failure is returned to the caller on the first
//! attempt. Decode failures log the response metadata and a body preview.

use crate::ApiError;

/// Maximum length of the response body preview included in error logs.
const BODY_PREVIEW_LEN: usize = 500;

/// Sends a GET request and checks the status.
///
/// Returns the response for any 2xx status.
pub async fn send_get(
    client: &reqwest::Client,
    url: reqwest::Url,
    endpoint: &str,
) -> Result<reqwest::Response, ApiError> {
    log::debug!("GET {url}");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| ApiError::Transport {
            endpoint: endpoint.to_owned(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        log::warn!("{endpoint} returned HTTP {status}");
        return Err(ApiError::Status {
            endpoint: endpoint.to_owned(),
            status: status.as_u16(),
        });
    }

    Ok(response)
}

/// Sends a GET request and parses the body as JSON.
pub async fn get_json(
    client: &reqwest::Client,
    url: reqwest::Url,
    endpoint: &str,
) -> Result<serde_json::Value, ApiError> {
    let response = send_get(client, url, endpoint).await?;

    // Capture response metadata before consuming the body.
    let url = response.url().to_string();
    let status = response.status();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    // Read the raw body as text first, then parse as JSON, so the actual
    // content can be logged on failure.
    let text = response
        .text()
        .await
        .map_err(|source| ApiError::Transport {
            endpoint: endpoint.to_owned(),
            source,
        })?;

    serde_json::from_str(&text).map_err(|json_err| {
        log::error!(
            "JSON parse failed.\n  \
             url: {url}\n  \
             status: {status}\n  \
             content-type: {content_type:?}\n  \
             received: {} bytes\n  \
             parse error: {json_err}\n  \
             body preview: {}",
            text.len(),
            preview(&text),
        );
        ApiError::Parse {
            endpoint: endpoint.to_owned(),
            message: format!(
                "{json_err} (received {} bytes, content-type={content_type:?})",
                text.len()
            ),
        }
    })
}

/// Truncates `text` to [`BODY_PREVIEW_LEN`] bytes on a char boundary.
fn preview(text: &str) -> String {
    if text.len() <= BODY_PREVIEW_LEN {
        return text.to_owned();
    }
    let cut = (0..=BODY_PREVIEW_LEN)
        .rev()
        .find(|i| text.is_char_boundary(*i))
        .unwrap_or(0);
    format!("{}...", &text[..cut])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_keeps_short_bodies() {
        assert_eq!(preview("[1,2"), "[1,2");
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        let body = "é".repeat(400);
        let p = preview(&body);
        assert!(p.ends_with("..."));
        assert!(p.len() <= BODY_PREVIEW_LEN + 3);
    }
}
