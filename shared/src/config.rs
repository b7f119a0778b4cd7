use std::env;

/// Environment variable holding the cache bucket name
pub const BUCKET_ENV: &str = "bucket";
/// Environment variable holding the bucket's public domain name
pub const BUCKET_ADDRESS_ENV: &str = "bucket_address";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable `{0}` must be set")]
    Missing(&'static str),
}

/// Settings supplied by the deployment, read once at cold start
#[derive(Debug, Clone)]
pub struct Config {
    pub bucket: String,
    pub bucket_address: String,
}

impl Config {
    pub fn new(bucket: impl Into<String>, bucket_address: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            bucket_address: bucket_address.into(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(require(BUCKET_ENV)?, require(BUCKET_ADDRESS_ENV)?))
    }

    /// Public URL of a cached artifact. The key is used verbatim.
    pub fn public_url(&self, key: &str) -> String {
        format!("https://{}/{}", self.bucket_address, key)
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url() {
        let config = Config::new("aqua-bucket", "aqua-bucket.s3.us-east-1.amazonaws.com");
        assert_eq!(
            config.public_url("abc123"),
            "https://aqua-bucket.s3.us-east-1.amazonaws.com/abc123"
        );
        // No escaping is applied
        assert_eq!(
            config.public_url("W/abc-1"),
            "https://aqua-bucket.s3.us-east-1.amazonaws.com/W/abc-1"
        );
    }

    #[test]
    fn test_missing_variable_is_named() {
        let err = ConfigError::Missing(BUCKET_ENV);
        assert_eq!(err.to_string(), "environment variable `bucket` must be set");
    }
}
