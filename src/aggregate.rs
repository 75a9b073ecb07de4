//! Count tokens inside each raw partition file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::{Result, WordCountError};
use crate::line_store::{LineReader, LineWriter};
use crate::record::CountRecord;

/// Name of the aggregated partition directory inside the work dir.
pub const SORTGROUP_DIR: &str = "sortgroup";

/// Sorted per-token counts of a single partition.
///
/// Owned by the aggregation of one file and reset before the next, so memory
/// is bounded by the distinct tokens of the largest partition.
#[derive(Debug, Default)]
pub struct LocalAggregator {
    counts: BTreeMap<String, u64>,
}

impl LocalAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, token: &str, count: u64) {
        match self.counts.get_mut(token) {
            Some(c) => *c += count,
            None => {
                self.counts.insert(token.to_string(), count);
            }
        }
    }

    pub fn add_one(&mut self, token: &str) {
        self.add(token, 1);
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }

    /// Records in token order.
    pub fn records(&self) -> impl Iterator<Item = CountRecord> + '_ {
        self.counts
            .iter()
            .map(|(token, count)| CountRecord::new(token.as_str(), *count))
    }

    /// Write the sorted `token<DELIM>count` lines to `output`, then reset.
    pub fn drain_to(&mut self, output: &Path, separator: char) -> Result<usize> {
        let mut writer = LineWriter::create(output)?;
        for record in self.records() {
            writer.write_line(record.display(separator))?;
        }
        writer.finish()?;

        let written = self.counts.len();
        self.clear();

        Ok(written)
    }
}

/// Aggregate one raw partition file (one token per line) into `output`.
///
/// Returns the number of distinct tokens written.
pub fn aggregate_file(
    aggregator: &mut LocalAggregator,
    input: &Path,
    output: &Path,
    separator: char,
) -> Result<usize> {
    aggregator.clear();

    for line in LineReader::open(input)? {
        let token = line?;
        if token.is_empty() {
            continue;
        }

        aggregator.add_one(&token);
    }

    aggregator.drain_to(output, separator)
}

/// Outcome of aggregating every raw partition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregateOutput {
    /// Directory holding the aggregated partition files.
    pub dir: PathBuf,
    /// Number of aggregated files written.
    pub files: usize,
    /// Distinct tokens over all files.
    pub distinct_tokens: u64,
}

/// Files of `dir` in name order, so runs visit partitions identically.
pub(crate) fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| WordCountError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| WordCountError::io(dir, e))?;
        let file_type = entry.file_type().map_err(|e| WordCountError::io(entry.path(), e))?;
        if file_type.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();

    Ok(files)
}

/// Aggregate every file of `raw_dir` into a same-named file under
/// `<parent of raw_dir>/sortgroup/`.
pub fn aggregate_dir(raw_dir: &Path, separator: char) -> Result<AggregateOutput> {
    let files = list_files(raw_dir)?;

    let parent = raw_dir.parent().unwrap_or_else(|| Path::new("."));
    let dir = parent.join(SORTGROUP_DIR);
    fs::create_dir_all(&dir).map_err(|e| WordCountError::io(&dir, e))?;

    let mut aggregator = LocalAggregator::new();
    let mut distinct_tokens = 0u64;

    for input in &files {
        // file_name is always present for entries returned by read_dir
        let name = match input.file_name() {
            Some(name) => name,
            None => continue,
        };
        let output = dir.join(name);

        let written = aggregate_file(&mut aggregator, input, &output, separator)?;
        debug!("aggregated {} into {} tokens", input.display(), written);

        distinct_tokens += written as u64;
    }

    info!(
        "aggregated {} partition files, {} distinct tokens under {}",
        files.len(),
        distinct_tokens,
        dir.display()
    );

    Ok(AggregateOutput {
        dir,
        files: files.len(),
        distinct_tokens,
    })
}
