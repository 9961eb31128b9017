//! Command line arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// bgapi-dump - Decode captured BGAPI traffic
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Capture file to read (stdin if omitted)
    pub input: Option<PathBuf>,

    /// Input encoding
    #[arg(short, long, value_enum, default_value_t = InputFormat::Hex)]
    pub format: InputFormat,

    /// Which side sent the captured frames
    #[arg(short, long, value_enum, default_value_t = Direction::Device)]
    pub direction: Direction,

    /// Output encoding
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Ignore bytes after the last declared field
    #[arg(long)]
    pub lenient: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Directory for daily log files
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Number of days to keep log files
    #[arg(long)]
    pub log_retention_days: Option<u64>,

    /// Print the registered message layouts and exit
    #[arg(long)]
    pub list_layouts: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// One frame per line as hex digits
    Hex,
    /// Binary serial capture with BGAPI wire headers
    Raw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Direction {
    /// Responses and events
    Device,
    /// Commands
    Host,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    /// One JSON object per line
    Json,
}
