//! Run configuration, built once in `main` and handed to the optimizers.

use crate::constants::{
    API_KEY_ENV, DEFAULT_QUALITY, DEFAULT_RETRIES, DEFAULT_SHRINK_URL, DEFAULT_TIMEOUT_SECS,
    MAX_QUALITY, MIN_QUALITY,
};
use crate::error::{OptimizeError, Result};
use std::env;
use std::fmt;
use std::time::Duration;

/// Settings for the TinyPNG shrink client.
#[derive(Clone)]
pub struct ShrinkConfig {
    pub api_key: String,
    pub shrink_url: String,
    pub timeout: Duration,
    /// Extra attempts after a network failure. Zero means a single attempt.
    pub retries: u32,
}

impl ShrinkConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            shrink_url: DEFAULT_SHRINK_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retries: DEFAULT_RETRIES,
        }
    }

    /// Reads the API key from `TINYPNG_API_KEY`. An empty value counts as missing.
    pub fn from_env() -> Result<Self> {
        match env::var(API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(key.trim())),
            _ => Err(OptimizeError::MissingApiKey(API_KEY_ENV)),
        }
    }

    pub fn with_shrink_url(mut self, url: impl Into<String>) -> Self {
        self.shrink_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }
}

// Keep the key out of logs.
impl fmt::Debug for ShrinkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShrinkConfig")
            .field("api_key", &"<redacted>")
            .field("shrink_url", &self.shrink_url)
            .field("timeout", &self.timeout)
            .field("retries", &self.retries)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub jpeg_quality: u8,
    pub shrink: ShrinkConfig,
}

impl Config {
    pub fn new(jpeg_quality: Option<u8>, shrink: ShrinkConfig) -> Result<Self> {
        let jpeg_quality = jpeg_quality.unwrap_or(DEFAULT_QUALITY);
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&jpeg_quality) {
            return Err(OptimizeError::InvalidQuality(jpeg_quality));
        }

        Ok(Self {
            jpeg_quality,
            shrink,
        })
    }
}
