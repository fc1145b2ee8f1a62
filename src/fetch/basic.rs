use super::client::HttpClient;
use anyhow::{Context, Result};
use async_trait::async_trait;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// `reqwest` client identifying itself as envirowatch, with gzip responses
/// enabled and no request decoration.
pub struct BasicClient(reqwest::Client);

impl BasicClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self(client))
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        self.0.execute(req).await
    }
}
