use anyhow::Context;
use clap::Parser;
use img_shrink::cli::Args;
use img_shrink::constants::{API_KEY_ENV, API_KEY_URL};
use img_shrink::{confirm, logger, BatchWalker, Config, OptimizeError, OptimizerRegistry, ShrinkConfig};
use std::io;
use std::process::ExitCode;
use std::time::Duration;

fn main() -> ExitCode {
    let args = Args::parse();
    logger::init(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    // The key is checked before anything else so a misconfigured run never
    // reaches the prompt or the filesystem.
    let shrink = ShrinkConfig::from_env()
        .with_context(|| {
            format!(
                "Please set up the {} environment variable and restart. \
                 You can find your key on {}",
                API_KEY_ENV, API_KEY_URL
            )
        })?
        .with_shrink_url(args.endpoint)
        .with_timeout(Duration::from_secs(args.timeout))
        .with_retries(args.retries);

    if !args.folder.is_dir() {
        return Err(OptimizeError::InvalidFolder(args.folder).into());
    }

    if !args.yes && !confirm(io::stdin().lock(), io::stdout())? {
        return Ok(());
    }

    let config = Config::new(Some(args.quality), shrink)?;
    let registry = OptimizerRegistry::from_config(config).context("Failed to set up optimizers")?;

    let mut stdout = io::stdout().lock();
    BatchWalker::new(&registry).run(&args.folder, &mut stdout)?;

    Ok(())
}
