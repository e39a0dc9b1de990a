use std::time::Duration;

pub const DEFAULT_QUALITY: u8 = 85;
pub const MIN_QUALITY: u8 = 1;
pub const MAX_QUALITY: u8 = 100;

pub const API_KEY_ENV: &str = "TINYPNG_API_KEY";
pub const API_KEY_URL: &str = "https://tinypng.com/developers";
pub const DEFAULT_SHRINK_URL: &str = "https://api.tinypng.com/shrink";
/// Username half of the Basic credential; the key is the password.
pub const API_USER: &str = "api";

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_RETRIES: u32 = 0;
pub const RETRY_BACKOFF: Duration = Duration::from_secs(1);

pub const CONFIRM_PROMPT: &str =
    "This script overwrites all images in specified folder. Proceed?[yes/no]: ";

pub const PROGRESS_SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";

pub const NOT_AN_IMAGE_MARKER: &str = "not an image";
pub const NOT_SUPPORTED_MARKER: &str = "not supported for optimization";
pub const SYMLINK_MARKER: &str = "symbolic link, not followed";
