//! Configuration file and its merge with the command line.

use std::path::{Path, PathBuf};

use bgapi_protocol::{DecodeOptions, TrailingBytes};
use serde::Deserialize;

use crate::cli::Args;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_PATH: &str = "bgapi-dump.toml";

pub const DEFAULT_RETENTION_DAYS: u64 = 7;

/// Configuration file format.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub decode: DecodeSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Deserialize, Default)]
pub struct DecodeSection {
    pub trailing_bytes: Option<TrailingBytes>,
}

#[derive(Debug, Deserialize, Default)]
pub struct LoggingSection {
    pub verbose: Option<bool>,
    pub log_dir: Option<PathBuf>,
    pub retention_days: Option<u64>,
}

pub fn load_config(path: &Path) -> Result<ConfigFile, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    let config: ConfigFile = toml::from_str(&contents)?;
    Ok(config)
}

/// Effective settings; command line flags take precedence over the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub options: DecodeOptions,
    pub verbose: bool,
    pub log_dir: Option<PathBuf>,
    pub retention_days: u64,
}

impl Settings {
    pub fn resolve(args: &Args, file: &ConfigFile) -> Self {
        let trailing_bytes = if args.lenient {
            TrailingBytes::Ignore
        } else {
            file.decode.trailing_bytes.unwrap_or_default()
        };

        Self {
            options: DecodeOptions { trailing_bytes },
            verbose: args.verbose || file.logging.verbose.unwrap_or(false),
            log_dir: args
                .log_dir
                .clone()
                .or_else(|| file.logging.log_dir.clone()),
            retention_days: args
                .log_retention_days
                .or(file.logging.retention_days)
                .unwrap_or(DEFAULT_RETENTION_DAYS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_config_file() {
        let config: ConfigFile = toml::from_str(
            r#"
            [decode]
            trailing_bytes = "ignore"

            [logging]
            verbose = true
            log_dir = "logs"
            retention_days = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.decode.trailing_bytes, Some(TrailingBytes::Ignore));
        assert_eq!(config.logging.verbose, Some(true));
        assert_eq!(config.logging.log_dir, Some(PathBuf::from("logs")));
        assert_eq!(config.logging.retention_days, Some(3));
    }

    #[test]
    fn test_empty_and_invalid_config() {
        let config: ConfigFile = toml::from_str("").unwrap();
        assert_eq!(config.decode.trailing_bytes, None);

        assert!(toml::from_str::<ConfigFile>("[decode]\ntrailing_bytes = \"maybe\"").is_err());
    }

    #[test]
    fn test_defaults_without_file() {
        let args = Args::try_parse_from(["bgapi-dump"]).unwrap();
        let settings = Settings::resolve(&args, &ConfigFile::default());
        assert_eq!(settings.options, DecodeOptions::strict());
        assert!(!settings.verbose);
        assert_eq!(settings.log_dir, None);
        assert_eq!(settings.retention_days, DEFAULT_RETENTION_DAYS);
    }

    #[test]
    fn test_arguments_override_file() {
        let file: ConfigFile = toml::from_str(
            "[logging]\nlog_dir = \"file-logs\"\nretention_days = 30\n",
        )
        .unwrap();
        let args = Args::try_parse_from([
            "bgapi-dump",
            "--lenient",
            "--log-dir",
            "cli-logs",
            "--log-retention-days",
            "1",
        ])
        .unwrap();

        let settings = Settings::resolve(&args, &file);
        assert_eq!(settings.options, DecodeOptions::lenient());
        assert_eq!(settings.log_dir, Some(PathBuf::from("cli-logs")));
        assert_eq!(settings.retention_days, 1);

        let args = Args::try_parse_from(["bgapi-dump"]).unwrap();
        let settings = Settings::resolve(&args, &file);
        assert_eq!(settings.log_dir, Some(PathBuf::from("file-logs")));
        assert_eq!(settings.retention_days, 30);
    }
}
