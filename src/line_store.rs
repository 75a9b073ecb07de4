//! Buffered, line oriented access to text files.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Lines, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::config::LINE_ENDING;
use crate::error::{Result, WordCountError};

/// Reads a file one line at a time, terminators stripped.
pub struct LineReader {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line_number: usize,
}

impl LineReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => WordCountError::InputNotFound(path.to_path_buf()),
            _ => WordCountError::io(path, e),
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            lines: BufReader::new(file).lines(),
            line_number: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 1-based number of the line most recently returned.
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

impl Iterator for LineReader {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.lines.next()?;
        self.line_number += 1;

        Some(line.map_err(|e| WordCountError::io(&self.path, e)))
    }
}

/// Writes lines to a file through a buffer. Call [`LineWriter::finish`] to
/// surface flush errors; dropping without it still flushes but loses the error.
pub struct LineWriter {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl LineWriter {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = open_writer(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `line` followed by the platform line terminator.
    pub fn write_line(&mut self, line: impl std::fmt::Display) -> Result<()> {
        write!(self.writer, "{}{}", line, LINE_ENDING).map_err(|e| WordCountError::io(&self.path, e))
    }

    pub fn finish(mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| WordCountError::io(&self.path, e))
    }
}

/// Create (truncate) `path` for writing.
///
/// A missing parent directory is created and the open retried once; a second
/// failure is returned.
pub fn open_writer(path: &Path) -> Result<File> {
    match File::create(path) {
        Ok(file) => Ok(file),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let parent = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => return Err(WordCountError::io(path, e)),
            };

            debug!("create missing directory {}", parent.display());
            fs::create_dir_all(parent).map_err(|e| WordCountError::io(parent, e))?;

            File::create(path).map_err(|e| WordCountError::io(path, e))
        }
        Err(e) => Err(WordCountError::io(path, e)),
    }
}

/// Write all `lines` to `path`, replacing previous content.
pub fn write_lines<I, T>(path: impl AsRef<Path>, lines: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: std::fmt::Display,
{
    let mut writer = LineWriter::create(path)?;
    for line in lines {
        writer.write_line(line)?;
    }

    writer.finish()
}
