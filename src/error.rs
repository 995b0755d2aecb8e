use std::{io, path::PathBuf};

use thiserror::Error;

/// Filesystem failure inside [`RotatingWriter`](crate::RotatingWriter).
///
/// Each variant names the operation that failed, so a caller can tell a
/// failed rename during rotation apart from a failed append.
#[derive(Debug, Error)]
pub enum RotateError {
    #[error("failed to list rotated files in {dir}: {source}")]
    Scan { dir: PathBuf, source: io::Error },
    #[error("failed to open log file {path}: {source}")]
    Open { path: PathBuf, source: io::Error },
    #[error("failed to rename {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
    #[error("failed to remove {path}: {source}")]
    Remove { path: PathBuf, source: io::Error },
    #[error("failed to write log file {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

impl RotateError {
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            Self::Scan { source, .. }
            | Self::Open { source, .. }
            | Self::Rename { source, .. }
            | Self::Remove { source, .. }
            | Self::Write { source, .. } => source.kind(),
        }
    }
}

impl From<RotateError> for io::Error {
    fn from(err: RotateError) -> Self {
        io::Error::new(err.kind(), err)
    }
}
