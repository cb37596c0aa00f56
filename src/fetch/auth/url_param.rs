use crate::fetch::client::HttpClient;
use async_trait::async_trait;

/// An [`HttpClient`] wrapper that appends a credential as a URL query
/// parameter, e.g. HERE's `apiKey`.
pub struct UrlParam<C> {
    pub inner: C,
    pub param_name: String,
    pub key: String,
}

impl<C> UrlParam<C> {
    pub fn new(inner: C, param_name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            inner,
            param_name: param_name.into(),
            key: key.into(),
        }
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for UrlParam<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.url_mut()
            .query_pairs_mut()
            .append_pair(&self.param_name, &self.key);
        self.inner.execute(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::fake::FakeClient;
    use crate::fetch::fetch_json;

    #[tokio::test]
    async fn test_appends_param_after_existing_query() {
        let client = UrlParam::new(
            FakeClient::default().route("geocode", 200, r#"{"items":[]}"#),
            "apiKey",
            "abc",
        );

        fetch_json(&client, "https://geocode.example/v1/geocode?q=Utrecht")
            .await
            .unwrap();

        let seen = client.inner.seen();
        let pairs: Vec<(String, String)> = seen[0]
            .url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("q".to_string(), "Utrecht".to_string()),
                ("apiKey".to_string(), "abc".to_string()),
            ]
        );
    }
}
