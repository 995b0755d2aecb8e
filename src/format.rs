use std::{
    fmt::{self, Write as _},
    io::{self, Write},
    str::FromStr,
};

use chrono::{Local, SecondsFormat};
use serde::Serialize;

use crate::{level::Level, logger::Sink, utils::TIMESTAMP_FORMAT};

pub const COLOR_RESET: &str = "\x1b[0m";
pub const COLOR_RED: &str = "\x1b[31m";
pub const COLOR_GREEN: &str = "\x1b[32m";
pub const COLOR_YELLOW: &str = "\x1b[33m";
pub const COLOR_BLUE: &str = "\x1b[34m";
pub const COLOR_PURPLE: &str = "\x1b[35m";
pub const COLOR_CYAN: &str = "\x1b[36m";
pub const COLOR_WHITE: &str = "\x1b[37m";

/// Output format selected through configuration for uncolored output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = std::convert::Infallible;

    // anything but "json" is text
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("json") {
            Ok(Self::Json)
        } else {
            Ok(Self::Text)
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Json => f.write_str("json"),
        }
    }
}

impl From<LogFormat> for Formatter {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Text => Self::Text,
            LogFormat::Json => Self::Json,
        }
    }
}

/// Renders a level and message into a log record.
///
/// Every record is rendered into a single buffer and handed to the output in
/// one write, so a rotating output never splits a record across files.
pub enum Formatter {
    /// `<timestamp> [<LEVEL>] <message>`
    Text,
    /// One JSON object per line with `timestamp`, `level` and `message`.
    Json,
    /// Text wrapped in the ANSI color of the level.
    Color,
    /// Writes to its own console and file sinks, ignoring the logger output.
    Combined(Box<Combined>),
}

pub struct Combined {
    console: Option<(Sink, Formatter)>,
    file: Option<(Sink, Formatter)>,
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    timestamp: String,
    level: &'a str,
    message: &'a str,
}

impl Formatter {
    /// Colored records to `console` and JSON records to `file`.
    pub fn combined<C, F>(console: C, file: F) -> Self
    where
        C: Write + Send + 'static,
        F: Write + Send + 'static,
    {
        Self::Combined(Box::new(Combined {
            console: Some((Sink::new(console), Self::Color)),
            file: Some((Sink::new(file), Self::Json)),
        }))
    }

    pub(crate) fn from_parts(combined: Combined) -> Self {
        Self::Combined(Box::new(combined))
    }

    pub fn is_color(&self) -> bool {
        matches!(self, Self::Color)
    }

    pub(crate) fn format(&self, out: &Sink, level: Level, message: &str) -> io::Result<()> {
        match self {
            Self::Combined(combined) => combined.format(level, message),
            _ => out.write_all(&self.render(level, message)),
        }
    }

    pub(crate) fn flush(&self) -> io::Result<()> {
        match self {
            Self::Combined(combined) => combined.flush(),
            _ => Ok(()),
        }
    }

    /// Renders one record. A combined formatter renders as text.
    pub fn render(&self, level: Level, message: &str) -> Vec<u8> {
        match self {
            Self::Json => render_json(level, message),
            Self::Color => format!(
                "{}{} [{}] {}{}\n",
                level_color(level),
                Local::now().format(TIMESTAMP_FORMAT),
                level,
                message,
                COLOR_RESET
            )
            .into_bytes(),
            Self::Text | Self::Combined(_) => render_text(level, message),
        }
    }
}

impl fmt::Debug for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("Text"),
            Self::Json => f.write_str("Json"),
            Self::Color => f.write_str("Color"),
            Self::Combined(combined) => f
                .debug_struct("Combined")
                .field("console", &combined.console.as_ref().map(|(_, fmt)| fmt))
                .field("file", &combined.file.as_ref().map(|(_, fmt)| fmt))
                .finish(),
        }
    }
}

impl Combined {
    pub(crate) fn new() -> Self {
        Self {
            console: None,
            file: None,
        }
    }

    pub(crate) fn console(mut self, sink: Sink, formatter: Formatter) -> Self {
        self.console = Some((sink, formatter));
        self
    }

    pub(crate) fn file(mut self, sink: Sink, formatter: Formatter) -> Self {
        self.file = Some((sink, formatter));
        self
    }

    // both sinks get the record, the first error is reported
    fn format(&self, level: Level, message: &str) -> io::Result<()> {
        let console = match &self.console {
            Some((sink, formatter)) => formatter.format(sink, level, message),
            None => Ok(()),
        };
        let file = match &self.file {
            Some((sink, formatter)) => formatter.format(sink, level, message),
            None => Ok(()),
        };
        console.and(file)
    }

    fn flush(&self) -> io::Result<()> {
        for (sink, _) in self.console.iter().chain(self.file.iter()) {
            sink.flush()?;
        }
        Ok(())
    }
}

fn render_text(level: Level, message: &str) -> Vec<u8> {
    format!(
        "{} [{}] {}\n",
        Local::now().format(TIMESTAMP_FORMAT),
        level,
        message
    )
    .into_bytes()
}

fn render_json(level: Level, message: &str) -> Vec<u8> {
    let record = JsonRecord {
        timestamp: Local::now().to_rfc3339_opts(SecondsFormat::Secs, false),
        level: level.as_str(),
        message,
    };
    match serde_json::to_vec(&record) {
        Ok(mut buf) => {
            buf.push(b'\n');
            buf
        }
        Err(_) => render_text(level, message),
    }
}

pub fn level_color(level: Level) -> &'static str {
    match level {
        Level::Debug => COLOR_CYAN,
        Level::Info => COLOR_GREEN,
        Level::Warning => COLOR_YELLOW,
        Level::Error => COLOR_RED,
        Level::Panic => COLOR_PURPLE,
    }
}

/// Value of a structured field appended to a log message.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(String),
    /// Any other value, already rendered with `Display`.
    Other(String),
}

impl Value {
    pub fn other(value: impl fmt::Display) -> Self {
        Self::Other(value.to_string())
    }

    fn color(&self) -> &'static str {
        match self {
            Self::Bool(_) => COLOR_YELLOW,
            Self::Int(_) | Self::Uint(_) => COLOR_GREEN,
            Self::Float(_) => COLOR_PURPLE,
            Self::Str(_) => COLOR_WHITE,
            Self::Other(_) => COLOR_BLUE,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => fmt::Display::fmt(v, f),
            Self::Int(v) => fmt::Display::fmt(v, f),
            Self::Uint(v) => fmt::Display::fmt(v, f),
            Self::Float(v) => fmt::Display::fmt(v, f),
            Self::Str(v) | Self::Other(v) => f.write_str(v),
        }
    }
}

macro_rules! impl_from_value {
    ($variant:ident as $target:ty: $($ty:ty),+) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v as $target)
                }
            }
        )+
    };
}

impl_from_value!(Int as i64: i8, i16, i32, i64, isize);
impl_from_value!(Uint as u64: u8, u16, u32, u64, usize);
impl_from_value!(Float as f64: f32, f64);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

/// Appends `key=value` pairs to `message`, separated by spaces.
///
/// With `color` set, keys are cyan and values take the color of their type.
pub fn build_message(message: &str, fields: &[(&str, Value)], color: bool) -> String {
    let mut out = message.to_owned();
    for (key, value) in fields {
        if !out.is_empty() {
            out.push(' ');
        }
        // writing into a String cannot fail
        let _ = if color {
            write!(
                out,
                "{COLOR_CYAN}{key}{COLOR_RESET}={}{value}{COLOR_RESET}",
                value.color()
            )
        } else {
            write!(out, "{key}={value}")
        };
    }
    out
}
