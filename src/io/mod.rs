//! File I/O helpers
//!
//! The chunk reader itself works on any `Read + Seek` stream; this module
//! covers the path-based entry points.

pub mod files;

pub use files::{get_file_size, open_for_read, FileError};
