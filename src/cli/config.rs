// CLI configuration
use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use flvio::ContainerConfig;
use log::LevelFilter;

/// flvio - FLV container CLI tool
#[derive(Parser, Debug)]
#[command(name = "flvio")]
#[command(about = "Inspect and rebase FLV tag containers", long_about = None)]
#[command(version)]
pub struct Config {
    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty", global = true)]
    pub format: OutputFormat,

    /// Quiet mode (suppress progress messages)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging, repeat for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Container configuration JSON file
    #[arg(short, long, value_name = "JSON", global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Pretty,
    /// Compact JSON
    Json,
    /// Table format
    Table,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show header, size and tag statistics
    Info {
        /// FLV file path(s) or glob patterns
        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,
    },

    /// List the tags of a file
    Tags {
        /// FLV file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Stop after this many tags
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Rewrite a file so its timestamps start at zero and never go backwards
    Rebase {
        /// Source FLV file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Destination FLV file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Patch the duration into the metadata tag afterwards
        #[arg(long)]
        sync: bool,
    },

    /// Detect the FLV signature
    Detect {
        /// File path(s)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },
}

impl Config {
    /// Container settings from `--config`, or the defaults
    pub fn container_config(&self) -> anyhow::Result<ContainerConfig> {
        match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing config {}", path.display()))
            }
            None => Ok(ContainerConfig::default()),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_after_subcommand() {
        let config = Config::try_parse_from(["flvio", "tags", "a.flv", "-vv", "--format", "table"]).unwrap();
        assert_eq!(config.format, OutputFormat::Table);
        assert_eq!(config.log_level(), LevelFilter::Trace);
        match config.command {
            Commands::Tags { file, limit } => {
                assert_eq!(file, PathBuf::from("a.flv"));
                assert_eq!(limit, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn quiet_wins_over_verbose() {
        let config = Config::try_parse_from(["flvio", "-q", "-v", "detect", "x"]).unwrap();
        assert_eq!(config.log_level(), LevelFilter::Error);
    }

    #[test]
    fn missing_config_uses_defaults() {
        let config = Config::try_parse_from(["flvio", "detect", "x"]).unwrap();
        assert_eq!(config.container_config().unwrap(), ContainerConfig::default());
    }
}
