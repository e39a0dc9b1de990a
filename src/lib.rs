pub mod batch;
pub mod cli;
pub mod config;
pub mod confirm;
pub mod constants;
pub mod error;
pub mod formats;
pub mod jpeg;
pub mod logger;
pub mod registry;
pub mod tinypng;
pub mod utils;

pub use batch::{BatchResult, BatchWalker, FileReport, OptimizationOutcome, SkipReason};
pub use config::{Config, ShrinkConfig};
pub use confirm::confirm;
pub use error::{FailureKind, OptimizeError, Result};
pub use formats::detect;
pub use jpeg::JpegOptimizer;
pub use registry::{Optimizer, OptimizerRegistry, SupportedFormat};
pub use tinypng::TinyPngOptimizer;
