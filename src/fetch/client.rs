use async_trait::async_trait;
use reqwest::{Request, Response};
use std::sync::Arc;

/// Transport seam for every outbound request the pipeline makes.
///
/// Auth wrappers in [`super::auth`] decorate an inner client, and tests swap
/// in a canned implementation.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}

#[async_trait]
impl<C: HttpClient + ?Sized> HttpClient for Arc<C> {
    async fn execute(&self, req: Request) -> reqwest::Result<Response> {
        (**self).execute(req).await
    }
}
