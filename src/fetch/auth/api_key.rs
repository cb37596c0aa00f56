use crate::fetch::client::HttpClient;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};

/// Header carrying a Socrata application token.
pub const SOCRATA_APP_TOKEN_HEADER: &str = "X-App-Token";

/// An [`HttpClient`] wrapper that sends a credential as an HTTP header.
///
/// The header name and value are validated once in [`ApiKey::new`], so
/// `execute` never has to fail on a malformed credential.
pub struct ApiKey<C> {
    inner: C,
    header_name: HeaderName,
    value: HeaderValue,
}

impl<C> ApiKey<C> {
    pub fn new(inner: C, header_name: &str, key: &str) -> Result<Self> {
        let header_name = HeaderName::from_bytes(header_name.as_bytes())
            .with_context(|| format!("invalid header name '{header_name}'"))?;
        let mut value = HeaderValue::from_str(key).context("credential is not a valid header value")?;
        value.set_sensitive(true);
        Ok(Self {
            inner,
            header_name,
            value,
        })
    }

    /// Socrata's `X-App-Token`, which lifts the anonymous throttling limits
    /// on `opendata.rdw.nl`.
    pub fn socrata(inner: C, token: &str) -> Result<Self> {
        Self::new(inner, SOCRATA_APP_TOKEN_HEADER, token)
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for ApiKey<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.headers_mut()
            .insert(self.header_name.clone(), self.value.clone());
        self.inner.execute(req).await
    }
}
