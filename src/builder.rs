use std::env;

use crate::{
    format::LogFormat,
    level::Level,
    logger::Logger,
    utils::*,
};

pub const ENV_LEVEL: &str = "CONLOG_LEVEL";
pub const ENV_FILE: &str = "CONLOG_FILE";
pub const ENV_FORMAT: &str = "CONLOG_FORMAT";
pub const ENV_CONSOLE: &str = "CONLOG_CONSOLE";
pub const ENV_COLOR: &str = "CONLOG_COLOR";
pub const ENV_FILE_SIZE: &str = "CONLOG_FILE_SIZE";
pub const ENV_FILE_NUM: &str = "CONLOG_FILE_NUM";

/// Logger settings, normally read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Records below this level are dropped.
    pub level: Level,
    /// Log file; empty means console only.
    pub file_path: String,
    pub format: LogFormat,
    /// Also write to the console when logging to a file.
    pub console: bool,
    /// Color console output.
    pub color: bool,
    /// Rotation threshold in bytes, 0 disables rotation.
    pub max_size: Size,
    /// Files kept, the active one included.
    pub max_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::Info,
            file_path: String::new(),
            format: LogFormat::Text,
            console: false,
            color: false,
            max_size: DEFAULT_FILE_SIZE,
            max_files: DEFAULT_FILE_NUM,
        }
    }
}

impl LogConfig {
    /// Reads the `CONLOG_*` variables, loading a `.env` file from the
    /// working directory first if there is one. Variables already set in the
    /// process take precedence over the file.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any variable source. Missing or invalid values
    /// fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(v) = lookup(ENV_LEVEL) {
            config.level = parse_level(&v);
        }
        if let Some(v) = lookup(ENV_FILE) {
            config.file_path = v.trim().to_owned();
        }
        if let Some(v) = lookup(ENV_FORMAT) {
            config.format = v.parse().unwrap_or_default();
        }
        if let Some(v) = lookup(ENV_CONSOLE) {
            config.console = parse_bool(&v);
        }
        if let Some(v) = lookup(ENV_COLOR) {
            config.color = parse_bool(&v);
        }
        if let Some(v) = lookup(ENV_FILE_SIZE) {
            config.max_size = parse_size(&v);
        }
        if let Some(v) = lookup(ENV_FILE_NUM) {
            config.max_files = parse_file_num(&v);
        }
        config
    }
}

/// Fluent construction of a [`Logger`], starting from the defaults or from
/// the environment.
#[derive(Debug, Default)]
pub struct Builder {
    config: LogConfig,
}

impl Builder {
    pub fn from_env() -> Self {
        Self {
            config: LogConfig::from_env(),
        }
    }

    pub fn log_level(mut self, level: Level) -> Self {
        self.config.level = level;
        self
    }

    pub fn file_path(mut self, file_path: &str) -> Self {
        self.config.file_path = file_path.to_owned();
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn console(mut self, console: bool) -> Self {
        self.config.console = console;
        self
    }

    pub fn color(mut self, color: bool) -> Self {
        self.config.color = color;
        self
    }

    pub fn max_size(mut self, max_size: Size) -> Self {
        self.config.max_size = max_size;
        self
    }

    pub fn rotation_count(mut self, count: usize) -> Self {
        self.config.max_files = count.max(1);
        self
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    pub fn build(self) -> Logger {
        Logger::from_config(&self.config)
    }
}

impl From<LogConfig> for Builder {
    fn from(config: LogConfig) -> Self {
        Self { config }
    }
}
