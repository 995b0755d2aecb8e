use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::{error::RotateError, utils::*};

/// Size triggered, count bounded log file writer.
///
/// The active file lives at `path`. When a write would push it past
/// `max_size` bytes, the file is rotated first: `<path>.1` is the most recent
/// rotated file and `<path>.<max_files - 1>` the oldest. At most `max_files`
/// files are kept, the active one included.
///
/// The file handle is closed after every write so that nothing holds the
/// log file open between records (external log collectors, cleanup on
/// platforms with mandatory file locks).
#[derive(Debug)]
pub struct RotatingWriter {
    path: PathBuf,
    max_size: Size,
    max_files: usize,
    state: Mutex<FileState>,
}

#[derive(Debug)]
struct FileState {
    handle: Option<File>,
    size: Size,
}

#[derive(Debug)]
struct RotatedFile {
    path: PathBuf,
    index: usize,
}

impl RotatingWriter {
    /// Binds a writer to `path`, creating the file and any missing parent
    /// directories. `max_size` of 0 disables rotation, `max_files` below 1 is
    /// treated as 1.
    pub fn new(
        path: impl AsRef<Path>,
        max_size: Size,
        max_files: usize,
    ) -> Result<Self, RotateError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| RotateError::Open {
                path: path.clone(),
                source,
            })?;
        }
        let size = file_len(&open_append(&path)?, &path)?;
        Ok(Self {
            path,
            max_size,
            max_files: max_files.max(1),
            state: Mutex::new(FileState { handle: None, size }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn max_size(&self) -> Size {
        self.max_size
    }

    pub fn max_files(&self) -> usize {
        self.max_files
    }

    /// Length of the active file as of the last write or rotation.
    pub fn current_size(&self) -> Size {
        self.lock().size
    }

    /// Appends `buf` as one unit, rotating first if it would not fit.
    ///
    /// Returns the number of bytes written, which is always `buf.len()` on
    /// success. On failure nothing is written and the size counter is not
    /// advanced.
    pub fn try_write(&self, buf: &[u8]) -> Result<usize, RotateError> {
        if buf.is_empty() {
            return Ok(0);
        }
        let mut state = self.lock();
        if state.handle.is_none() {
            // the file may have been removed or truncated since the last write
            let file = open_append(&self.path)?;
            state.size = file_len(&file, &self.path)?;
            state.handle = Some(file);
        }
        let len = buf.len() as Size;
        if self.max_size > 0 && state.size.saturating_add(len) > self.max_size {
            self.rotate(&mut state)?;
        }
        let mut file = match state.handle.take() {
            Some(file) => file,
            None => open_append(&self.path)?,
        };
        file.write_all(buf)
            .and_then(|_| file.flush())
            .map_err(|source| RotateError::Write {
                path: self.path.clone(),
                source,
            })?;
        drop(file);
        state.size += len;
        Ok(buf.len())
    }

    /// Releases the file handle if one is open.
    pub fn close(&self) {
        self.lock().handle = None;
    }

    fn lock(&self) -> MutexGuard<'_, FileState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn rotate(&self, state: &mut FileState) -> Result<(), RotateError> {
        state.handle = None;
        let mut rotated = self.rotated_files()?;

        // the active file becomes `.1`, so keep room for it under max_files
        let keep = self.max_files.saturating_sub(2);
        if rotated.len() > keep {
            for file in rotated.drain(keep..).rev() {
                remove(&file.path)?;
            }
        }

        // renumber to 2..=keep+1, highest first so no rename lands on a live file
        for (pos, file) in rotated.iter().enumerate().rev() {
            let index = pos + 2;
            if file.index != index {
                rename(&file.path, &rotated_path(&self.path, index))?;
            }
        }

        if self.path.exists() {
            if self.max_files > 1 {
                rename(&self.path, &rotated_path(&self.path, 1))?;
            } else {
                remove(&self.path)?;
            }
        }

        state.handle = Some(open_append(&self.path)?);
        state.size = 0;
        Ok(())
    }

    // rotated files `<path>.<N>` sorted by index, newest first
    fn rotated_files(&self) -> Result<Vec<RotatedFile>, RotateError> {
        let dir = parent_dir(&self.path);
        let scan_err = |source: io::Error| RotateError::Scan {
            dir: dir.to_path_buf(),
            source,
        };
        let base = self
            .path
            .file_name()
            .map(|v| v.to_string_lossy().to_string())
            .unwrap_or_default();
        let mut files = vec![];
        for entry in fs::read_dir(dir).map_err(scan_err)? {
            let entry = entry.map_err(scan_err)?;
            if !entry.file_type().map_err(scan_err)?.is_file() {
                continue;
            }
            if let Some(index) = rotated_index(&base, &entry.file_name().to_string_lossy()) {
                files.push(RotatedFile {
                    path: entry.path(),
                    index,
                });
            }
        }
        files.sort_unstable_by_key(|f| f.index);
        Ok(files)
    }
}

impl Write for RotatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.try_write(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Write for &RotatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.try_write(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn open_append(path: &Path) -> Result<File, RotateError> {
    File::options()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| RotateError::Open {
            path: path.to_path_buf(),
            source,
        })
}

fn file_len(file: &File, path: &Path) -> Result<Size, RotateError> {
    file.metadata()
        .map(|meta| meta.len())
        .map_err(|source| RotateError::Open {
            path: path.to_path_buf(),
            source,
        })
}

fn rename(from: &Path, to: &Path) -> Result<(), RotateError> {
    fs::rename(from, to).map_err(|source| RotateError::Rename {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })
}

fn remove(path: &Path) -> Result<(), RotateError> {
    fs::remove_file(path).map_err(|source| RotateError::Remove {
        path: path.to_path_buf(),
        source,
    })
}
