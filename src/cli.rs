use crate::constants::{DEFAULT_QUALITY, DEFAULT_RETRIES, DEFAULT_SHRINK_URL, DEFAULT_TIMEOUT_SECS};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "img-shrink",
    about = "Shrink JPEG and PNG images in place across a directory tree",
    long_about = "img-shrink walks a folder recursively and overwrites every JPEG and PNG it finds \
                  with a smaller version. JPEG files are re-encoded locally; PNG files are sent to \
                  the TinyPNG service, which requires the TINYPNG_API_KEY environment variable.",
    version,
    after_help = "EXAMPLES:\n  \
    img-shrink ./photos\n  \
    img-shrink ./assets -y -q 90 --timeout 30 --retries 2"
)]
pub struct Args {
    #[arg(help = "Folder whose images will be overwritten")]
    pub folder: PathBuf,

    #[arg(short = 'y', long, help = "Do not ask for confirmation")]
    pub yes: bool,

    #[arg(
        short = 'q',
        long,
        value_parser = clap::value_parser!(u8).range(1..=100),
        help = "JPEG encoder quality (1-100)",
        default_value_t = DEFAULT_QUALITY
    )]
    pub quality: u8,

    #[arg(
        long,
        value_name = "SECS",
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Timeout for each request to the shrink service",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    pub timeout: u64,

    #[arg(
        long,
        help = "Extra attempts after a network failure",
        default_value_t = DEFAULT_RETRIES
    )]
    pub retries: u32,

    #[arg(
        long,
        value_name = "URL",
        help = "Shrink endpoint for PNG uploads",
        default_value = DEFAULT_SHRINK_URL
    )]
    pub endpoint: String,

    #[arg(short = 'v', long, help = "Print debug logs to stderr")]
    pub verbose: bool,
}
