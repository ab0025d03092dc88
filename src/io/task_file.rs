use std::fs;
use std::path::{Path, PathBuf};

use crate::io::recovery;
use crate::model::task::{DisplayContext, Task};
use crate::parse::{FormatError, parse_lines};

/// Error type for loading and saving task files
#[derive(Debug, thiserror::Error)]
pub enum TaskFileError {
    #[error("cannot load, the file \"{path}\" does not exist")]
    NotFound { path: PathBuf },
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot load, the file \"{path}\" is not UTF-8 encoded")]
    Encoding { path: PathBuf },
    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Broad class of a `TaskFileError`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Encoding,
    Format,
}

impl TaskFileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TaskFileError::NotFound { .. }
            | TaskFileError::Read { .. }
            | TaskFileError::Write { .. } => ErrorKind::Io,
            TaskFileError::Encoding { .. } => ErrorKind::Encoding,
            TaskFileError::Format(_) => ErrorKind::Format,
        }
    }
}

/// Options for reading and writing a task file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileOptions {
    /// Skip the first line (files from the older header-carrying layout)
    pub skip_header: bool,
    /// Write failures and removals to the recovery log beside the file
    pub recovery_log: bool,
}

/// Read a task file as UTF-8 text without parsing it.
pub fn read_task_text(path: &Path) -> Result<String, TaskFileError> {
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => TaskFileError::NotFound {
            path: path.to_path_buf(),
        },
        _ => TaskFileError::Read {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    String::from_utf8(bytes).map_err(|_| TaskFileError::Encoding {
        path: path.to_path_buf(),
    })
}

/// Load and parse a task file, returning tasks in deadline order.
///
/// `context` is reset and then widened to the longest topic in the file.
pub fn load_tasks(
    path: &Path,
    options: &FileOptions,
    context: &mut DisplayContext,
) -> Result<Vec<Task>, TaskFileError> {
    let text = read_task_text(path)?;
    parse_lines(&text, options.skip_header, context).map_err(|e| {
        if options.recovery_log {
            let bad_line = text.lines().nth(e.line().saturating_sub(1));
            recovery::log_parse_failure(path, &e, bad_line);
        }
        TaskFileError::Format(e)
    })
}

/// Write each line followed by `\n`, replacing the file's contents.
pub fn save_lines<I, S>(path: &Path, lines: I, options: &FileOptions) -> Result<(), TaskFileError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut content = String::new();
    for line in lines {
        content.push_str(line.as_ref());
        content.push('\n');
    }

    recovery::atomic_write(path, content.as_bytes()).map_err(|e| {
        if options.recovery_log {
            recovery::log_write_failure(path, &e, &content);
        }
        TaskFileError::Write {
            path: path.to_path_buf(),
            source: e,
        }
    })
}
