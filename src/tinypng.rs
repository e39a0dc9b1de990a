use crate::config::ShrinkConfig;
use crate::constants::{API_USER, RETRY_BACKOFF};
use crate::error::{OptimizeError, Result};
use crate::registry::Optimizer;
use crate::utils::replace_file_atomically;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{HeaderMap, AUTHORIZATION, LOCATION};
use reqwest::{Client, Url};
use std::fs;
use std::io::Write;
use std::path::Path;
use tokio::runtime::Runtime;
use tracing::{debug, warn};

/// Builds the `Authorization` header value for the shrink endpoint.
pub fn basic_auth_header(api_key: &str) -> String {
    let credential = STANDARD.encode(format!("{}:{}", API_USER, api_key));
    format!("Basic {}", credential)
}

/// Shrinks PNG files through the TinyPNG HTTP API.
///
/// The raw file is POSTed to the shrink endpoint, the optimized image is
/// fetched from the `Location` the service answers with, and the output file
/// is replaced only once the download is complete.
pub struct TinyPngOptimizer {
    client: Client,
    runtime: Runtime,
    config: ShrinkConfig,
    authorization: String,
}

impl TinyPngOptimizer {
    pub fn new(config: ShrinkConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| OptimizeError::ClientSetup(format!("Failed to create runtime: {}", e)))?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| OptimizeError::ClientSetup(e.to_string()))?;

        let authorization = basic_auth_header(&config.api_key);

        Ok(Self {
            client,
            runtime,
            config,
            authorization,
        })
    }

    /// Uploads `data` and returns the optimized bytes.
    pub async fn shrink_async(&self, data: Vec<u8>) -> Result<Vec<u8>> {
        let upload_size = data.len();
        let response = self
            .client
            .post(&self.config.shrink_url)
            .header(AUTHORIZATION, &self.authorization)
            .body(data)
            .send()
            .await
            .map_err(OptimizeError::from_http)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OptimizeError::Service(format!(
                "shrink request returned {}: {}",
                status,
                body.trim()
            )));
        }

        let location = resolve_location(response.url(), response.headers())?;
        debug!(%location, upload_size, "shrink accepted");

        let response = self
            .client
            .get(location)
            .send()
            .await
            .map_err(OptimizeError::from_http)?;

        let status = response.status();
        if !status.is_success() {
            return Err(OptimizeError::Service(format!(
                "download of optimized image returned {}",
                status
            )));
        }

        let bytes = response.bytes().await.map_err(OptimizeError::from_http)?;
        if bytes.is_empty() {
            return Err(OptimizeError::Service(
                "service returned an empty image".to_string(),
            ));
        }

        debug!(upload_size, download_size = bytes.len(), "shrink complete");
        Ok(bytes.to_vec())
    }

    /// Blocking wrapper around [`Self::shrink_async`] that retries network
    /// failures up to `retries` extra times.
    pub fn shrink(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut attempt = 0;
        loop {
            match self.runtime.block_on(self.shrink_async(data.to_vec())) {
                Err(OptimizeError::Network(e)) if attempt < self.config.retries => {
                    attempt += 1;
                    warn!(attempt, error = %e, "network failure talking to shrink service, retrying");
                    std::thread::sleep(RETRY_BACKOFF * attempt);
                }
                result => return result,
            }
        }
    }
}

impl Optimizer for TinyPngOptimizer {
    fn optimize(&self, input: &Path, output: &Path) -> Result<()> {
        let data = fs::read(input)?;
        let optimized = self.shrink(&data)?;

        replace_file_atomically(output, |file| {
            file.write_all(&optimized)?;
            Ok(())
        })
    }
}

/// Extracts the optimized image URL from a shrink response. Relative
/// locations are resolved against the request URL.
fn resolve_location(request_url: &Url, headers: &HeaderMap) -> Result<Url> {
    let value = headers.get(LOCATION).ok_or_else(|| {
        OptimizeError::Service("shrink response has no Location header".to_string())
    })?;

    let value = value.to_str().map_err(|_| {
        OptimizeError::Service("shrink response has a non-ASCII Location header".to_string())
    })?;

    request_url
        .join(value)
        .map_err(|e| OptimizeError::Service(format!("invalid Location header {:?}: {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_basic_auth_header() {
        // base64("api:abc123")
        assert_eq!(basic_auth_header("abc123"), "Basic YXBpOmFiYzEyMw==");
    }

    #[test]
    fn test_resolve_location_absolute() {
        let request = Url::parse("https://api.tinypng.com/shrink").unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            LOCATION,
            HeaderValue::from_static("https://api.tinypng.com/output/abc"),
        );

        let url = resolve_location(&request, &headers).unwrap();
        assert_eq!(url.as_str(), "https://api.tinypng.com/output/abc");
    }

    #[test]
    fn test_resolve_location_relative() {
        let request = Url::parse("http://127.0.0.1:8080/shrink").unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(LOCATION, HeaderValue::from_static("/output/xyz"));

        let url = resolve_location(&request, &headers).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/output/xyz");
    }

    #[test]
    fn test_resolve_location_missing() {
        let request = Url::parse("https://api.tinypng.com/shrink").unwrap();
        let result = resolve_location(&request, &HeaderMap::new());
        assert!(matches!(result, Err(OptimizeError::Service(_))));
    }

    #[test]
    fn test_new_builds_client() {
        let optimizer = TinyPngOptimizer::new(ShrinkConfig::new("key")).unwrap();
        assert_eq!(optimizer.authorization, basic_auth_header("key"));
    }
}
