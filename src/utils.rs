use std::path::{Path, PathBuf};

use crate::level::Level;

pub type Size = u64;

pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const KB: Size = 1024;
pub const MB: Size = 1024 * KB;
pub const GB: Size = 1024 * MB;
pub const TB: Size = 1024 * GB;

/// Rotation threshold used when no size is configured or it cannot be parsed.
pub const DEFAULT_FILE_SIZE: Size = 100 * MB;
/// Number of files kept (active one included) when none is configured.
pub const DEFAULT_FILE_NUM: usize = 3;

/// Parses a human readable size such as `100M`, `1GB` or `2048`.
///
/// Units are binary multiples and case-insensitive. A bare number (or a `B`
/// suffix) is a byte count. Input that cannot be parsed yields
/// [`DEFAULT_FILE_SIZE`] instead of an error, so a bad value never stops a
/// logger from being configured.
pub fn parse_size(s: &str) -> Size {
    let s = s.trim().to_ascii_uppercase();
    let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (digits, unit) = s.split_at(split);
    let Ok(value) = digits.parse::<Size>() else {
        return DEFAULT_FILE_SIZE;
    };
    let multiplier = match unit {
        "" | "B" => 1,
        "K" | "KB" => KB,
        "M" | "MB" => MB,
        "G" | "GB" => GB,
        "T" | "TB" => TB,
        _ => return DEFAULT_FILE_SIZE,
    };
    value.checked_mul(multiplier).unwrap_or(DEFAULT_FILE_SIZE)
}

// file count must be at least 1, anything else falls back to the default
pub fn parse_file_num(s: &str) -> usize {
    match s.trim().parse::<usize>() {
        Ok(n) if n >= 1 => n,
        _ => DEFAULT_FILE_NUM,
    }
}

pub fn parse_bool(s: &str) -> bool {
    matches!(
        s.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

// unknown level names resolve to INFO
pub fn parse_level(s: &str) -> Level {
    s.parse().unwrap_or(Level::Info)
}

// path of the rotated file with the given index, `<path>.<index>`
pub(crate) fn rotated_path(path: &Path, index: usize) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{}", index));
    PathBuf::from(name)
}

// directory holding the log file, "." when the path has no parent
pub(crate) fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

// index of a rotated file name `<base>.<N>`, N >= 1 without leading zeros
pub(crate) fn rotated_index(base: &str, name: &str) -> Option<usize> {
    let suffix = name.strip_prefix(base)?.strip_prefix('.')?;
    if suffix.starts_with('0') || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}
