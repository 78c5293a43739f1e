//! Error types for chunk reading
//!
//! Data conditions (`End`, `BadFormat`) are ordinary results callers branch
//! on. `WrongState` means the reader was driven through an invalid
//! transition; it never changes the reader's state.

use std::io;
use std::path::PathBuf;

use super::reader::ReaderState;

/// Errors from [`ChunkReader::open`](super::ChunkReader::open) and
/// [`ChunkReader::open_stream`](super::ChunkReader::open_stream)
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    /// The reader already has a stream bound to it
    #[error("reader is already open")]
    AlreadyOpen,

    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("access denied: {}", .0.display())]
    AccessDenied(PathBuf),

    /// The 12-byte prolog is missing or its container tag is wrong
    #[error("bad container format: {0}")]
    BadFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Errors from the chunk-level operations of an open reader
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// No further chunk header at the current level
    #[error("end of chunk sequence")]
    End,

    /// A header, payload or pad byte was truncated
    #[error("bad chunk format: {0}")]
    BadFormat(String),

    #[error("{operation} is not valid in state {state}")]
    WrongState {
        operation: &'static str,
        state: ReaderState,
    },

    /// The caller's buffer cannot hold the current chunk payload
    #[error("buffer too small for chunk payload: need {need} bytes, have {have}")]
    BufferTooSmall { need: usize, have: usize },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ReadError {
    /// True for the graceful end of a chunk sequence
    pub fn is_end(&self) -> bool {
        matches!(self, ReadError::End)
    }

    pub fn is_bad_format(&self) -> bool {
        matches!(self, ReadError::BadFormat(_))
    }

    pub fn is_wrong_state(&self) -> bool {
        matches!(self, ReadError::WrongState { .. })
    }
}

/// Result type for chunk operations
pub type ReadResult<T> = Result<T, ReadError>;
