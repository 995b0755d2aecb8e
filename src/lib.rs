//! Convention over configuration logging.
//!
//! A process-wide logger is built from `CONLOG_*` environment variables (or a
//! `.env` file) the first time it is used. Records are level filtered and
//! rendered as text, JSON or ANSI colored text. File output goes through a
//! [`RotatingWriter`], which rotates on size and keeps a bounded number of
//! numbered files next to the active one.
//!
//! ```no_run
//! conlog::info("service started");
//! conlog::shared().log_fields(
//!     conlog::Level::Warning,
//!     "slow request",
//!     &[("path", "/health".into()), ("millis", 1250.into())],
//! );
//! ```
//!
//! Code using the `log` crate macros can be routed to the same logger with
//! [`init`].
//!
//! The shared logger is never dropped. Console records are written before
//! the logging call returns, and file records are written directly, so
//! nothing is pending when `main` returns. [`flush`] flushes the shared
//! logger's outputs explicitly, for example before a controlled shutdown.

mod async_writer;
mod builder;
mod error;
mod format;
mod level;
mod logger;
mod rotate;
mod singleton;
mod utils;


pub use async_writer::AsyncWriter;
pub use builder::{
    Builder, LogConfig, ENV_COLOR, ENV_CONSOLE, ENV_FILE, ENV_FILE_NUM, ENV_FILE_SIZE, ENV_FORMAT,
    ENV_LEVEL,
};
pub use error::RotateError;
pub use format::{build_message, level_color, Combined, Formatter, LogFormat, Value};
pub use level::{Level, ParseLevelError};
pub use logger::Logger;
pub use rotate::RotatingWriter;
pub use singleton::{reset_for_testing, shared};
pub use utils::{
    parse_bool, parse_file_num, parse_level, parse_size, Size, DEFAULT_FILE_NUM,
    DEFAULT_FILE_SIZE, GB, KB, MB, TB,
};

pub use log::debug;
pub use log::error;
pub use log::info;
pub use log::trace;
pub use log::warn;

pub fn builder() -> Builder {
    Builder::default()
}

/// Installs the shared logger as the `log` crate backend.
///
/// Fails if another `log` backend is already installed.
pub fn init() -> Result<(), log::SetLoggerError> {
    log::set_boxed_logger(Box::new(logger::Bridge))?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}

pub fn debug(message: &str) {
    shared().debug(message);
}

pub fn info(message: &str) {
    shared().info(message);
}

pub fn warning(message: &str) {
    shared().warning(message);
}

pub fn error(message: &str) {
    shared().error(message);
}

/// Flushes the shared logger.
pub fn flush() -> std::io::Result<()> {
    shared().flush()
}

/// Logs `message` at PANIC level on the shared logger, then panics.
pub fn panic(message: &str) -> ! {
    shared().panic(message)
}
