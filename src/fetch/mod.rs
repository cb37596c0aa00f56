//! HTTP retrieval of JSON documents.
//!
//! [`fetch_json`] performs exactly one GET per call: no caching, no retry.
//! Every failure is returned to the caller as a [`FetchError`].

mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::Result;
use thiserror::Error;
use tracing::debug;

/// Socrata row-limit query parameter.
pub const ROW_LIMIT_PARAM: &str = "$limit";

/// Why a JSON document could not be retrieved.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid url '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("{url} returned invalid JSON")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Retrieves `url` and parses the body as JSON, untransformed.
///
/// # Errors
///
/// Returns a [`FetchError`] if the URL is malformed, the transport fails
/// (DNS, connect, timeout), the status is not 2xx, or the body is not JSON.
#[tracing::instrument(skip(client))]
pub async fn fetch_json<C: HttpClient + ?Sized>(
    client: &C,
    url: &str,
) -> Result<serde_json::Value, FetchError> {
    let parsed = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    let req = reqwest::Request::new(reqwest::Method::GET, parsed);

    // Credential decorators may have added secrets to the request URL.
    let resp = client.execute(req).await.map_err(|source| FetchError::Request {
        url: url.to_string(),
        source: source.without_url(),
    })?;

    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    let body = resp.bytes().await.map_err(|source| FetchError::Request {
        url: url.to_string(),
        source: source.without_url(),
    })?;
    debug!(bytes = body.len(), %status, "Response received");

    serde_json::from_slice(&body).map_err(|source| FetchError::Parse {
        url: url.to_string(),
        source,
    })
}

/// Returns `url` with its `$limit` parameter set to `limit`, replacing any
/// existing one. `None` leaves the URL untouched.
pub fn with_row_limit(url: &str, limit: Option<u32>) -> Result<String> {
    let Some(limit) = limit else {
        return Ok(url.to_string());
    };

    let mut parsed = reqwest::Url::parse(url)?;
    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(k, _)| k != ROW_LIMIT_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    parsed
        .query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(ROW_LIMIT_PARAM, &limit.to_string());

    Ok(parsed.to_string())
}


#[cfg(test)]
mod tests {
    use super::fake::FakeClient;
    use super::*;

    #[tokio::test]
    async fn test_fetch_json_returns_parsed_value() {
        let client = FakeClient::default().route("facilities", 200, r#"[{"areaid":"1"}]"#);

        let value = fetch_json(&client, "https://example.org/facilities.json")
            .await
            .unwrap();

        assert_eq!(value, serde_json::json!([{"areaid": "1"}]));
    }

    #[tokio::test]
    async fn test_fetch_json_rejects_non_success_status() {
        let client = FakeClient::default().route("facilities", 503, "down");

        let err = fetch_json(&client, "https://example.org/facilities.json")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            FetchError::Status { status, .. } if status == reqwest::StatusCode::SERVICE_UNAVAILABLE
        ));
    }

    #[tokio::test]
    async fn test_fetch_json_rejects_invalid_json() {
        let client = FakeClient::default().route("facilities", 200, "<html>not json</html>");

        let err = fetch_json(&client, "https://example.org/facilities.json")
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Parse { .. }));
        assert_eq!(
            err.to_string(),
            "https://example.org/facilities.json returned invalid JSON"
        );
    }

    #[tokio::test]
    async fn test_fetch_json_rejects_relative_url() {
        let client = FakeClient::default();

        let err = fetch_json(&client, "/resource/6wzd-evwu.json")
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::InvalidUrl { .. }));
        assert!(client.seen().is_empty());
    }

    #[test]
    fn test_with_row_limit_none_is_identity() {
        let url = "https://opendata.rdw.nl/resource/b3us-f26s.json";
        assert_eq!(with_row_limit(url, None).unwrap(), url);
    }

    #[test]
    fn test_with_row_limit_replaces_existing_limit() {
        let url = with_row_limit(
            "https://opendata.rdw.nl/resource/b3us-f26s.json?$limit=10&$order=areaid",
            Some(1600),
        )
        .unwrap();

        let parsed = reqwest::Url::parse(&url).unwrap();
        let pairs: Vec<(String, String)> = parsed
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("$order".to_string(), "areaid".to_string()),
                ("$limit".to_string(), "1600".to_string()),
            ]
        );
    }
}
