//! RIFF-style chunked container reading
//!
//! A container is a 12-byte prolog (tag, total size, form type) followed by
//! chunks laid out as id, little-endian length, payload, and one pad byte
//! when the length is odd. [`ChunkReader`] moves through that layout as an
//! explicit state machine; [`walk`] builds a chunk tree on top of it.

pub mod error;
pub mod fourcc;
pub mod reader;
pub mod walk;

#[cfg(test)]
mod tests;

pub use error::{OpenError, ReadError, ReadResult};
pub use fourcc::{FourCc, ParseFourCcError};
pub use reader::{Bookmark, ChunkHeader, ChunkReader, ReaderOptions, ReaderState};
pub use walk::{walk, ChunkEntry, WalkOptions, MAX_WALK_DEPTH};
