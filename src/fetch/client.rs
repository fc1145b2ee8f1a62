use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::{Method, Request, Response, Url};

/// Executes HTTP requests for the measurements API. Wrappers such as
/// [`ApiKey`](super::auth::ApiKey) decorate a request before delegating.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;

    /// GETs `url` asking for JSON, giving up after `timeout`.
    async fn get(&self, url: &Url, timeout: Duration) -> reqwest::Result<Response> {
        let mut req = Request::new(Method::GET, url.clone());
        req.headers_mut()
            .insert(ACCEPT, HeaderValue::from_static("application/json"));
        *req.timeout_mut() = Some(timeout);
        self.execute(req).await
    }
}
