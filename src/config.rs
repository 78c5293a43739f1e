use anyhow::{Context, Result};

use crate::logging::LogLevel;
use crate::riff::{FourCc, ReaderOptions, WalkOptions, MAX_WALK_DEPTH};

/// Options for a scan, filled from defaults and the command line
#[derive(Debug, Clone)]
pub struct Options {
    pub magic: FourCc,
    pub descend: Vec<FourCc>,
    pub max_depth: usize,
    /// Look up a single top-level chunk instead of listing the tree
    pub find: Option<FourCc>,
    pub lenient_padding: bool,
    pub log_level: LogLevel,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            magic: FourCc::RIFF,
            descend: vec![FourCc::LIST],
            max_depth: 8,
            find: None,
            lenient_padding: false,
            log_level: LogLevel::Warning,
        }
    }
}

impl Options {
    pub fn reader_options(&self) -> ReaderOptions {
        ReaderOptions {
            magic: self.magic,
            lenient_trailing_pad: self.lenient_padding,
        }
    }

    pub fn walk_options(&self) -> WalkOptions {
        WalkOptions {
            descend: self.descend.clone(),
            max_depth: self.max_depth,
        }
    }
}

/// Parse a single chunk id such as "LIST" or "fmt", or a packed
/// little-endian hex value such as "0x20746d66" for ids that are not
/// printable
pub fn parse_fourcc(s: &str) -> Result<FourCc> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        let value = u32::from_str_radix(hex, 16)
            .with_context(|| format!("Invalid packed chunk id '{}'", s))?;
        return Ok(FourCc::from_u32_le(value));
    }
    s.parse::<FourCc>()
        .with_context(|| format!("Invalid chunk id '{}'", s))
}

/// Parse a comma-separated id list, e.g. "LIST,RIFF". An empty string gives
/// an empty list.
pub fn parse_fourcc_list(s: &str) -> Result<Vec<FourCc>> {
    if s.is_empty() {
        return Ok(Vec::new());
    }
    s.split(',').map(parse_fourcc).collect()
}

/// Parse a nesting depth
pub fn parse_depth(s: &str) -> Result<usize> {
    let depth: usize = s.trim().parse().context("Invalid depth value")?;
    if depth > MAX_WALK_DEPTH {
        anyhow::bail!("Depth must be at most {}", MAX_WALK_DEPTH);
    }
    Ok(depth)
}
