//! Chunk tree listing
//!
//! [`ChunkReader::sink_to_subchunks`] does not stop at the end of the parent
//! payload. The walker keeps that fence itself: it records where each
//! descended payload ends, refuses children that cross it, and climbs back
//! out with [`ChunkReader::reposition`].

use std::io::{Read, Seek};

use super::error::{ReadError, ReadResult};
use super::fourcc::FourCc;
use super::reader::{ChunkHeader, ChunkReader, ReaderState};

const HEADER_SIZE: u64 = 8;

/// Deepest nesting [`walk`] expands, whatever [`WalkOptions::max_depth`] asks
/// for. Each level is one frame of recursion.
pub const MAX_WALK_DEPTH: usize = 64;

/// Which chunks to descend into and how deep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkOptions {
    /// Ids whose payload starts with a list type followed by subchunks
    pub descend: Vec<FourCc>,
    /// Nesting levels below the top level that are expanded, capped at
    /// [`MAX_WALK_DEPTH`]
    pub max_depth: usize,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            descend: vec![FourCc::LIST],
            max_depth: 8,
        }
    }
}

/// One chunk found by [`walk`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkEntry {
    /// 0 for chunks directly inside the container
    pub depth: usize,
    /// Offset of the chunk header
    pub offset: u64,
    pub header: ChunkHeader,
    /// Set for chunks the walker descended into
    pub list_type: Option<FourCc>,
}

/// List every chunk from the current position to the end of the level, in
/// file order, expanding the ids named in `options`.
///
/// The reader must be in `ChunkInfo`. On success it is left at the end of
/// the level in `ChunkInfo`.
pub fn walk<S: Read + Seek>(
    reader: &mut ChunkReader<S>,
    options: &WalkOptions,
) -> ReadResult<Vec<ChunkEntry>> {
    if reader.state() != ReaderState::ChunkInfo {
        return Err(ReadError::WrongState {
            operation: "walk",
            state: reader.state(),
        });
    }
    let max_depth = options.max_depth.min(MAX_WALK_DEPTH);
    let mut entries = Vec::new();
    walk_level(reader, options, max_depth, 0, None, &mut entries)?;
    Ok(entries)
}

fn walk_level<S: Read + Seek>(
    reader: &mut ChunkReader<S>,
    options: &WalkOptions,
    max_depth: usize,
    depth: usize,
    fence: Option<u64>,
    entries: &mut Vec<ChunkEntry>,
) -> ReadResult<()> {
    loop {
        let offset = reader.position()?;
        if let Some(end) = fence {
            if offset >= end {
                return Ok(());
            }
            if end - offset < HEADER_SIZE {
                return Err(ReadError::BadFormat(format!(
                    "{} stray bytes at the end of a list at offset {}",
                    end - offset,
                    offset
                )));
            }
        }

        let header = match reader.read_chunk_info() {
            Ok(header) => header,
            Err(ReadError::End) => return Ok(()),
            Err(err) => return Err(err),
        };
        let payload_end = reader.position()? + u64::from(header.length);
        if let Some(end) = fence {
            if payload_end > end {
                return Err(ReadError::BadFormat(format!(
                    "chunk '{}' at offset {} overruns its parent",
                    header.id, offset
                )));
            }
        }

        let expand = depth < max_depth && options.descend.contains(&header.id);
        if !expand {
            entries.push(ChunkEntry {
                depth,
                offset,
                header,
                list_type: None,
            });
            reader.seek_next_chunk()?;
            continue;
        }

        let next = reader.chunk_end()?;
        let list_type = reader.sink_to_list()?;
        log::debug!(
            "descending into '{}' ({}) at offset {}",
            header.id,
            list_type,
            offset
        );
        entries.push(ChunkEntry {
            depth,
            offset,
            header,
            list_type: Some(list_type),
        });
        walk_level(reader, options, max_depth, depth + 1, Some(payload_end), entries)?;
        reader.reposition(next, header, ReaderState::ChunkInfo)?;
    }
}
