// riffscan library
// Reader for RIFF-style chunked containers

pub mod cli;
pub mod config;
pub mod io;
pub mod logging;
pub mod riff;

pub use cli::Cli;
pub use config::Options;
pub use logging::LogLevel;
pub use riff::{ChunkHeader, ChunkReader, FourCc, OpenError, ReadError, ReaderState};
