use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error type for configuration, IO, and intermediate-file failures.
#[derive(Debug, Error)]
pub enum WordCountError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("input file {} does not exist", .0.display())]
    InputNotFound(PathBuf),
    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("temporary directory {} was not fully removed", .0.display())]
    Cleanup(PathBuf),
    #[error("malformed record at {}:{line_number}: {line:?}", path.display())]
    MalformedRecord {
        path: PathBuf,
        line_number: usize,
        line: String,
    },
}

impl WordCountError {
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        WordCountError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, WordCountError>;
