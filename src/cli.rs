use crate::config::{parse_depth, parse_fourcc, parse_fourcc_list, Options};
use crate::logging::LogLevel;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

/// List the chunk tree of a RIFF-style container
#[derive(Parser, Debug, Default)]
#[command(name = "riffscan")]
#[command(version)]
#[command(about = "Inspect RIFF-style chunked container files", long_about = None)]
pub struct Cli {
    /// Container file to read
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Expected container tag (default RIFF)
    #[arg(short, long, value_name = "TAG")]
    pub magic: Option<String>,

    /// Comma-separated chunk ids to descend into (default LIST)
    #[arg(short, long, value_name = "IDS")]
    pub descend: Option<String>,

    /// Maximum nesting depth to expand
    #[arg(long = "max-depth", value_name = "N")]
    pub max_depth: Option<String>,

    /// Locate a top-level chunk instead of printing the tree (text id, or
    /// packed hex such as 0x20746d66)
    #[arg(short, long, value_name = "ID")]
    pub find: Option<String>,

    /// Accept a final odd-length chunk without its pad byte
    #[arg(long = "lenient-padding")]
    pub lenient_padding: bool,

    /// Increase log verbosity (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable logging
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Merge CLI arguments into the options struct
    pub fn merge_into_options(&self, mut opts: Options) -> Result<Options> {
        if let Some(ref magic) = self.magic {
            opts.magic = parse_fourcc(magic).context("Invalid container tag")?;
        }

        if let Some(ref descend) = self.descend {
            opts.descend = parse_fourcc_list(descend).context("Invalid descend list")?;
        }

        if let Some(ref depth) = self.max_depth {
            opts.max_depth = parse_depth(depth)?;
        }

        if let Some(ref find) = self.find {
            opts.find = Some(parse_fourcc(find).context("Invalid chunk id to find")?);
        }

        if self.lenient_padding {
            opts.lenient_padding = true;
        }

        opts.log_level = LogLevel::from_verbosity(self.quiet, self.verbose);

        Ok(opts)
    }
}
