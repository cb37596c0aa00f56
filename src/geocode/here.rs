use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::Geocoder;
use crate::config::{DEFAULT_COUNTRY_SUFFIX, DEFAULT_GEOCODE_URL};
use crate::fetch::auth::UrlParam;
use crate::fetch::{HttpClient, fetch_json};
use crate::records::Position;

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    items: Vec<GeocodeItem>,
}

#[derive(Debug, Deserialize)]
struct GeocodeItem {
    position: Option<Position>,
}

/// HERE `/v1/geocode` client. Queries take the form `"{city}, {suffix}"`.
pub struct HereGeocoder<C> {
    client: C,
    base_url: String,
    country_suffix: String,
}

impl<C: HttpClient> HereGeocoder<UrlParam<C>> {
    /// Geocoder against the public HERE endpoint, authenticating with `apiKey`.
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_endpoint(
            UrlParam::new(client, "apiKey", api_key),
            DEFAULT_GEOCODE_URL,
            DEFAULT_COUNTRY_SUFFIX,
        )
    }
}

impl<C: HttpClient> HereGeocoder<C> {
    pub fn with_endpoint(
        client: C,
        base_url: impl Into<String>,
        country_suffix: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            country_suffix: country_suffix.into(),
        }
    }

    fn query_url(&self, city: &str) -> Result<String> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .with_context(|| format!("invalid geocoding endpoint '{}'", self.base_url))?;
        url.query_pairs_mut()
            .append_pair("q", &format!("{city}, {}", self.country_suffix));
        Ok(url.to_string())
    }
}

#[async_trait]
impl<C: HttpClient> Geocoder for HereGeocoder<C> {
    async fn locate(&self, city: &str) -> Result<Option<Position>> {
        let url = self.query_url(city)?;
        let body = fetch_json(&self.client, &url).await?;
        let position = parse_response(body)?;
        debug!(city, found = position.is_some(), "Geocoding response parsed");
        Ok(position)
    }
}

/// Takes the first item's position; an empty `items` array is no match.
fn parse_response(body: serde_json::Value) -> Result<Option<Position>> {
    let response: GeocodeResponse =
        serde_json::from_value(body).context("unexpected geocoding response shape")?;
    Ok(response.items.into_iter().next().and_then(|item| item.position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::BasicClient;
    use crate::fetch::fake::FakeClient;
    use std::time::Duration;

    #[test]
    fn test_parses_first_item_position() {
        let body = serde_json::json!({
            "items": [
                {"title": "Leeuwarden, Fryslân, Nederland", "position": {"lat": 53.20132, "lng": 5.80007}},
                {"title": "Leeuwarden", "position": {"lat": 0.0, "lng": 0.0}}
            ]
        });

        let position = parse_response(body).unwrap().unwrap();

        assert!((position.lat - 53.20132).abs() < 1e-6);
        assert!((position.lng - 5.80007).abs() < 1e-6);
    }

    #[test]
    fn test_parses_empty_items() {
        assert!(parse_response(serde_json::json!({"items": []})).unwrap().is_none());
        assert!(parse_response(serde_json::json!({})).unwrap().is_none());
    }

    #[test]
    fn test_rejects_non_object_body() {
        assert!(parse_response(serde_json::json!([1, 2])).is_err());
    }

    #[tokio::test]
    async fn test_locate_sends_query_and_key() {
        let fake = FakeClient::default().route(
            "geocode",
            200,
            r#"{"items":[{"position":{"lat":52.09,"lng":5.12}}]}"#,
        );
        let geocoder = HereGeocoder::new(fake, "k3y");

        let position = geocoder.locate("Utrecht").await.unwrap();

        assert_eq!(
            position,
            Some(Position {
                lat: 52.09,
                lng: 5.12
            })
        );
        let seen = geocoder.client.inner.seen();
        let pairs: Vec<(String, String)> = seen[0]
            .url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("q".to_string(), "Utrecht, NL".to_string()),
                ("apiKey".to_string(), "k3y".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_locate_failure_does_not_expose_api_key() {
        let client = UrlParam::new(
            BasicClient::new(Duration::from_secs(2)).unwrap(),
            "apiKey",
            "TOPSECRETKEY",
        );
        // nothing listens on the discard port
        let geocoder =
            HereGeocoder::with_endpoint(client, "http://127.0.0.1:9/v1/geocode", "NL");

        let err = geocoder.locate("Utrecht").await.unwrap_err();

        assert!(!format!("{err:#}").contains("TOPSECRETKEY"));
        assert!(!format!("{err:?}").contains("TOPSECRETKEY"));
    }

    #[tokio::test]
    async fn test_locate_propagates_http_failure() {
        let geocoder = HereGeocoder::with_endpoint(
            FakeClient::default().route("geocode", 401, "{}"),
            "https://geocode.example/v1/geocode",
            "NL",
        );

        assert!(geocoder.locate("Utrecht").await.is_err());
    }
}
