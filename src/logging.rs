//! Logging setup
//!
//! The library logs through the `log` facade. Binaries install the stderr
//! backend below with [`init`].

use std::io::Write;

use log::{LevelFilter, Log, Metadata, Record};

/// Log levels, from silent to everything
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Nothing,
    Error,
    Warning,
    Info,
    Debug,
    All,
}

impl LogLevel {
    /// Level for a `-q` flag and a count of `-v` flags. Warnings are shown
    /// by default.
    pub fn from_verbosity(quiet: bool, verbose: u8) -> Self {
        if quiet {
            return LogLevel::Nothing;
        }
        match verbose {
            0 => LogLevel::Warning,
            1 => LogLevel::Info,
            2 => LogLevel::Debug,
            _ => LogLevel::All,
        }
    }

    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Nothing => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warning => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::All => LevelFilter::Trace,
        }
    }
}

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let _ = writeln!(
            std::io::stderr().lock(),
            "[{}] {}: {}",
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Install the stderr logger at `level`.
///
/// A second call only adjusts the level; the first installed logger stays.
pub fn init(level: LogLevel) {
    if log::set_logger(&LOGGER).is_err() {
        log::debug!("logger already installed, updating level only");
    }
    log::set_max_level(level.to_level_filter());
}
