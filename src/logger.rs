use std::{
    fmt,
    io::{self, Write},
    sync::{Mutex, PoisonError},
};

use crate::{
    async_writer::AsyncWriter,
    builder::LogConfig,
    format::{build_message, Combined, Formatter, Value},
    level::Level,
    rotate::RotatingWriter,
    singleton::shared,
};

// capacity of the queue in front of stdout
const CONSOLE_BUFFER: usize = 1024;

/// Shared, lockable output destination.
pub(crate) struct Sink(Mutex<Box<dyn Write + Send>>);

impl Sink {
    pub(crate) fn new<W: Write + Send + 'static>(inner: W) -> Self {
        Self(Mutex::new(Box::new(inner)))
    }

    pub(crate) fn write_all(&self, buf: &[u8]) -> io::Result<()> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .write_all(buf)
    }

    pub(crate) fn flush(&self) -> io::Result<()> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).flush()
    }
}

/// Level filtered logger writing formatted records to one output.
///
/// `Logger` is `Send + Sync`; records from different threads are written
/// whole, one after the other.
pub struct Logger {
    output: Sink,
    min_level: Level,
    formatter: Formatter,
}

impl Logger {
    /// Logger emitting every level as text to `output`.
    pub fn new<W: Write + Send + 'static>(output: W) -> Self {
        Self {
            output: Sink::new(output),
            min_level: Level::Debug,
            formatter: Formatter::Text,
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    pub fn with_formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Builds a logger taking level, format and color from the environment,
    /// writing to `output` instead of the configured file or console.
    pub fn from_env_with_output<W: Write + Send + 'static>(output: W) -> Self {
        Self::from_config_with_output(&LogConfig::from_env(), output)
    }

    /// Like [`Logger::from_env_with_output`], with an explicit config. The
    /// file path, console and rotation settings are ignored.
    pub fn from_config_with_output<W>(config: &LogConfig, output: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Self::new(output)
            .with_formatter(console_formatter(config))
            .with_level(config.level)
    }

    /// Builds a logger following the configured conventions.
    ///
    /// Without a file path records go to stdout through a blocking
    /// [`AsyncWriter`]. With a file path they go to a [`RotatingWriter`], and
    /// with `console` also set, to both.
    /// A file that cannot be opened is reported on stderr and the logger
    /// falls back to the console, so this never fails.
    pub fn from_config(config: &LogConfig) -> Self {
        let file = if config.file_path.is_empty() {
            None
        } else {
            match RotatingWriter::new(&config.file_path, config.max_size, config.max_files) {
                Ok(writer) => Some(writer),
                Err(e) => {
                    eprintln!("{}", e);
                    None
                }
            }
        };
        let logger = match file {
            None => Self::new(console()).with_formatter(console_formatter(config)),
            Some(file) if !config.console => {
                Self::new(file).with_formatter(Formatter::from(config.format))
            }
            Some(file) => {
                let formatter = if config.color {
                    Formatter::Color
                } else {
                    Formatter::Text
                };
                let combined = Combined::new()
                    .console(Sink::new(console()), formatter)
                    .file(Sink::new(file), Formatter::from(config.format));
                Self::new(io::sink()).with_formatter(Formatter::from_parts(combined))
            }
        };
        logger.with_level(config.level)
    }

    pub fn min_level(&self) -> Level {
        self.min_level
    }

    pub fn formatter(&self) -> &Formatter {
        &self.formatter
    }

    pub fn enabled(&self, level: Level) -> bool {
        level >= self.min_level
    }

    /// Writes one record, returning any error from the output.
    ///
    /// Records below the minimum level are dropped without touching the
    /// output.
    pub fn try_log(&self, level: Level, message: &str, fields: &[(&str, Value)]) -> io::Result<()> {
        if !self.enabled(level) {
            return Ok(());
        }
        if fields.is_empty() {
            return self.formatter.format(&self.output, level, message);
        }
        let message = build_message(message, fields, self.formatter.is_color());
        self.formatter.format(&self.output, level, &message)
    }

    pub fn log(&self, level: Level, message: &str) {
        self.log_fields(level, message, &[]);
    }

    pub fn log_fields(&self, level: Level, message: &str, fields: &[(&str, Value)]) {
        if let Err(e) = self.try_log(level, message, fields) {
            eprintln!("{}", e);
        }
    }

    pub fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    pub fn warning(&self, message: &str) {
        self.log(Level::Warning, message);
    }

    pub fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }

    /// Logs `message` at PANIC level, flushes, then panics with it.
    pub fn panic(&self, message: &str) -> ! {
        self.log(Level::Panic, message);
        if let Err(e) = self.flush() {
            eprintln!("{}", e);
        }
        panic!("{}", message);
    }

    pub fn flush(&self) -> io::Result<()> {
        self.output.flush()?;
        self.formatter.flush()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("min_level", &self.min_level)
            .field("formatter", &self.formatter)
            .finish_non_exhaustive()
    }
}

// the shared logger lives in a static and is never dropped, so console
// writes must not be left in the queue when the process exits
fn console() -> AsyncWriter {
    AsyncWriter::blocking(io::stdout(), CONSOLE_BUFFER)
}

fn console_formatter(config: &LogConfig) -> Formatter {
    if config.color {
        Formatter::Color
    } else {
        Formatter::from(config.format)
    }
}

/// Forwards records from the `log` crate macros to the shared logger.
#[derive(Debug)]
pub(crate) struct Bridge;

impl log::Log for Bridge {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        shared().enabled(metadata.level().into())
    }

    fn log(&self, record: &log::Record) {
        let logger = shared();
        let level = Level::from(record.level());
        if !logger.enabled(level) {
            return;
        }
        logger.log(level, &record.args().to_string());
    }

    fn flush(&self) {
        if let Err(e) = shared().flush() {
            eprintln!("{}", e);
        }
    }
}
