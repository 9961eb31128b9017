//! bgapi-dump: decode captured BGAPI traffic.
//!
//! Reads a hex text capture (one codec frame per line) or a binary serial
//! capture and prints every decoded message as text or JSON.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use log::{info, warn};
use tokio::fs::File;
use tokio::io::{AsyncRead, BufReader};

mod cli;
mod config;
mod dump;
mod hex;
mod logging;

use cli::{Args, InputFormat};
use config::{load_config, ConfigFile, Settings, DEFAULT_CONFIG_PATH};
use dump::{dump_hex, dump_raw, write_layouts, DumpConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Explicit path > auto-detect > default
    let config_path = args.config.clone().or_else(|| {
        let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
        default_path.exists().then_some(default_path)
    });
    let file_config = match &config_path {
        Some(path) => load_config(path).map_err(|e| {
            eprintln!("Failed to load config file {}: {}", path.display(), e);
            e
        })?,
        None => ConfigFile::default(),
    };

    let settings = Settings::resolve(&args, &file_config);
    let log_guard = logging::init_logging(
        settings.log_dir.as_deref(),
        settings.retention_days,
        settings.verbose,
    )?;
    if let Some(path) = &config_path {
        info!("Loaded config from: {}", path.display());
    }

    let mut out = io::BufWriter::new(io::stdout());

    if args.list_layouts {
        write_layouts(&mut out)?;
        out.flush()?;
        return Ok(());
    }

    let dump_config = DumpConfig {
        direction: args.direction,
        output: args.output,
        options: settings.options,
    };

    let reader: Box<dyn AsyncRead + Unpin + Send> = match &args.input {
        Some(path) => Box::new(File::open(path).await?),
        None => Box::new(tokio::io::stdin()),
    };

    let stats = match args.format {
        InputFormat::Hex => dump_hex(BufReader::new(reader), &dump_config, &mut out).await?,
        InputFormat::Raw => dump_raw(reader, &dump_config, &mut out).await?,
    };
    out.flush()?;

    info!(
        "{} frames: {} decoded, {} failed, {} skipped",
        stats.frames, stats.decoded, stats.failed, stats.skipped
    );

    if !stats.is_clean() {
        warn!("{} frames could not be decoded", stats.failed);
        drop(log_guard);
        std::process::exit(1);
    }

    Ok(())
}
