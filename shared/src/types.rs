use serde::{Deserialize, Serialize};
use url::Url;

/// Origin hosts the proxy is allowed to fetch from. Matched exactly against
/// the raw network location, so subdomains, ports and other casings miss.
pub const ALLOWED_HOSTS: [&str; 3] = [
    "patch01.pso2gs.net",
    "download.pso2.jp",
    "sub-download.pso2.jp",
];

pub const NO_URL_MESSAGE: &str = "No URL provided.";
pub const INVALID_URL_MESSAGE: &str = "Invalid URL provided.";
pub const INVALID_BODY_MESSAGE: &str = "Invalid request body.";
pub const INTERNAL_ERROR_MESSAGE: &str = "An error occurred.";

// ========== REQUEST ==========

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("request body is not valid JSON: {0}")]
    MalformedBody(#[from] serde_json::Error),
    #[error("no url field in request body")]
    MissingUrl,
    #[error("url is not an allowed patch URL")]
    InvalidUrl,
}

impl RequestError {
    /// Message returned to the caller
    pub fn message(&self) -> &'static str {
        match self {
            RequestError::MalformedBody(_) => INVALID_BODY_MESSAGE,
            RequestError::MissingUrl => NO_URL_MESSAGE,
            RequestError::InvalidUrl => INVALID_URL_MESSAGE,
        }
    }
}

/// A validated proxy request
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub target: TargetUrl,
}

impl ProxyRequest {
    /// Parse and validate the JSON body `{"url": "..."}`.
    ///
    /// A body that is not an object, or an object without `url`, counts as a
    /// missing URL. A `url` of any type other than string is invalid.
    pub fn parse(body: &str) -> Result<Self, RequestError> {
        let data: serde_json::Value = serde_json::from_str(body)?;
        let url = data.get("url").ok_or(RequestError::MissingUrl)?;
        let url = url.as_str().ok_or(RequestError::InvalidUrl)?;

        Ok(Self {
            target: TargetUrl::parse(url)?,
        })
    }
}

// ========== TARGET URL ==========

/// Parsed origin location: plain HTTP to one of [`ALLOWED_HOSTS`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUrl {
    pub host: String,
    pub port: Option<u16>,
    pub path: String,
}

impl TargetUrl {
    pub fn parse(raw: &str) -> Result<Self, RequestError> {
        if !is_url_allowed(raw) {
            return Err(RequestError::InvalidUrl);
        }

        let parsed = Url::parse(raw).map_err(|_| RequestError::InvalidUrl)?;
        let host = parsed
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or(RequestError::InvalidUrl)?;

        Ok(Self {
            host: host.to_string(),
            port: parsed.port(),
            path: parsed.path().to_string(),
        })
    }

    /// URL sent to the origin. Query and fragment are not forwarded.
    pub fn origin_url(&self) -> String {
        match self.port {
            Some(port) => format!("http://{}:{}{}", self.host, port, self.path),
            None => format!("http://{}{}", self.host, self.path),
        }
    }
}

impl std::fmt::Display for TargetUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "http://{}{}", self.host, self.path)
    }
}

/// Check that a URL is a patch data URL: scheme `http` and a network
/// location that is exactly one of the allowed hosts.
pub fn is_url_allowed(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    if parsed.scheme() != "http" {
        return false;
    }

    // Url normalizes host casing and drops default ports, so compare the
    // authority as written.
    match raw_netloc(url) {
        Some(netloc) => ALLOWED_HOSTS.contains(&netloc),
        None => false,
    }
}

fn raw_netloc(url: &str) -> Option<&str> {
    let (_, rest) = url.trim().split_once("://")?;
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    Some(&rest[..end])
}

// ========== CACHE KEY ==========

/// Object key for an artifact: the ETag without its quotes, or a fresh
/// random identifier when the origin sent none.
pub fn cache_key(etag: Option<&str>) -> String {
    match etag.map(|tag| tag.replace('"', "")) {
        Some(key) if !key.is_empty() => key,
        _ => uuid::Uuid::new_v4().to_string(),
    }
}

// ========== RESPONSE BODIES ==========

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ResultBody {
    pub result: String,
}
