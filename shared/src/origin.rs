use async_trait::async_trait;
use lambda_http::http::{header, HeaderMap, Method, StatusCode};

use crate::types::TargetUrl;

/// User agent the patch servers expect from the official launcher
pub const USER_AGENT: &str = "AQUA_HTTP";

#[derive(Debug, thiserror::Error)]
pub enum OriginError {
    #[error("origin request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// What came back from a patch server
#[derive(Debug, Clone)]
pub struct OriginResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl OriginResponse {
    /// ETag header, if present and valid UTF-8. Non-ASCII tags are kept so
    /// they still name a stable cache key.
    pub fn etag(&self) -> Option<&str> {
        self.headers
            .get(header::ETAG)
            .and_then(|v| std::str::from_utf8(v.as_bytes()).ok())
    }
}

/// One request to the origin, no retries
#[async_trait]
pub trait Origin: Send + Sync {
    async fn fetch(&self, method: Method, target: &TargetUrl) -> Result<OriginResponse, OriginError>;
}

/// Plain HTTP client for the patch servers
pub struct HttpOrigin {
    client: reqwest::Client,
}

impl HttpOrigin {
    pub fn new() -> Result<Self, OriginError> {
        // Redirects are relayed to the caller like any other status
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Origin for HttpOrigin {
    async fn fetch(&self, method: Method, target: &TargetUrl) -> Result<OriginResponse, OriginError> {
        let is_head = method == Method::HEAD;
        let resp = self
            .client
            .request(method, target.origin_url())
            .send()
            .await?;

        let status = resp.status();
        let headers = resp.headers().clone();

        // Whole-body buffering; HEAD bodies are never read
        let body = if is_head {
            Vec::new()
        } else {
            resp.bytes().await?.to_vec()
        };

        Ok(OriginResponse {
            status,
            headers,
            body,
        })
    }
}
