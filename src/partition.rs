//! Fan the corpus out into hash partitions on disk.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs;
use std::hash::Hasher;
use std::path::{Path, PathBuf};

use fnv::FnvHasher;
use log::{debug, info};

use crate::error::{Result, WordCountError};
use crate::line_store::{LineReader, LineWriter};
use crate::tokenize::{is_blank, Tokenizer};

/// Name of the raw partition directory inside the work dir.
pub const SPLIT_DIR: &str = "split";

/// File name of the partition holding `bucket`.
pub fn partition_file_name(bucket: usize) -> String {
    format!("{}.txt", bucket)
}

/// Bucket of `token` among `partitions`. FNV-1a keeps it stable across runs and builds.
pub fn bucket_for(token: &str, partitions: usize) -> usize {
    let mut hasher = FnvHasher::default();
    hasher.write(token.as_bytes());

    (hasher.finish() % partitions as u64) as usize
}

/// Writers of the raw partition files, one per bucket that has seen a token.
///
/// Files are created on first use. [`BucketWriters::finish`] flushes and
/// closes all of them; an early return drops (and closes) them as well.
pub struct BucketWriters {
    dir: PathBuf,
    writers: BTreeMap<usize, LineWriter>,
}

impl BucketWriters {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            writers: BTreeMap::new(),
        }
    }

    pub fn write(&mut self, bucket: usize, token: &str) -> Result<()> {
        let writer = match self.writers.entry(bucket) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let path = self.dir.join(partition_file_name(bucket));
                debug!("open partition file {}", path.display());
                entry.insert(LineWriter::create(path)?)
            }
        };

        writer.write_line(token)
    }

    /// Number of partition files opened so far.
    pub fn len(&self) -> usize {
        self.writers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writers.is_empty()
    }

    /// Flush and close every writer, returning the number of files written.
    pub fn finish(self) -> Result<usize> {
        let count = self.writers.len();
        for (_, writer) in self.writers {
            writer.finish()?;
        }

        Ok(count)
    }
}

/// Outcome of partitioning one corpus.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartitionOutput {
    /// Directory holding the raw partition files.
    pub dir: PathBuf,
    /// Number of partition files created.
    pub files: usize,
    /// Token occurrences routed.
    pub tokens: u64,
}

/// Read `input` once and route every token to `work_dir/split/<bucket>.txt`.
///
/// The split directory is created even when the corpus has no tokens.
pub fn partition(
    input: &Path,
    work_dir: &Path,
    partitions: usize,
    tokenizer: &Tokenizer,
) -> Result<PartitionOutput> {
    if partitions == 0 {
        return Err(WordCountError::Configuration(
            "partition count must be at least 1".to_string(),
        ));
    }

    let reader = LineReader::open(input)?;

    let dir = work_dir.join(SPLIT_DIR);
    fs::create_dir_all(&dir).map_err(|e| WordCountError::io(&dir, e))?;

    let mut writers = BucketWriters::new(&dir);
    let mut tokens = 0u64;

    for line in reader {
        let line = line?;
        if is_blank(&line) {
            continue;
        }

        for token in tokenizer.tokens(&line) {
            writers.write(bucket_for(token, partitions), token)?;
            tokens += 1;
        }
    }

    let files = writers.finish()?;
    info!(
        "partitioned {} tokens into {} files under {}",
        tokens,
        files,
        dir.display()
    );

    Ok(PartitionOutput { dir, files, tokens })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Delimiter;
    use std::collections::HashMap;

    fn read_lines(path: &Path) -> Vec<String> {
        LineReader::open(path)
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn bucket_is_deterministic_and_in_range() {
        for k in [1, 2, 10, 100, 1000] {
            for token in ["a", "b", "hello", "Hello", "", "日本"] {
                let bucket = bucket_for(token, k);
                assert!(bucket < k);
                assert_eq!(bucket, bucket_for(token, k));
            }
        }
    }

    #[test]
    fn single_partition_takes_everything() {
        assert_eq!(bucket_for("anything", 1), 0);
    }

    #[test]
    fn each_token_lands_in_exactly_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.txt");
        fs::write(&input, "a b a\n\n   \nb c\nd e f a\n").unwrap();

        let tokenizer = Tokenizer::new(Delimiter::Char(' '));
        let out = partition(&input, &dir.path().join("work"), 3, &tokenizer).unwrap();
        assert_eq!(out.tokens, 9);

        let mut seen: HashMap<String, PathBuf> = HashMap::new();
        let mut total = 0;
        for entry in fs::read_dir(&out.dir).unwrap() {
            let path = entry.unwrap().path();
            for token in read_lines(&path) {
                total += 1;
                let previous = seen.entry(token.clone()).or_insert_with(|| path.clone());
                assert_eq!(previous, &path, "token {} in two partitions", token);
                assert_eq!(
                    path.file_name().unwrap().to_str().unwrap(),
                    partition_file_name(bucket_for(&token, 3))
                );
            }
        }

        assert_eq!(total, 9);
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn empty_input_creates_empty_split_dir() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.txt");
        fs::write(&input, "").unwrap();

        let tokenizer = Tokenizer::new(Delimiter::Char(' '));
        let out = partition(&input, dir.path(), 10, &tokenizer).unwrap();

        assert_eq!(out.files, 0);
        assert_eq!(out.tokens, 0);
        assert!(out.dir.is_dir());
        assert_eq!(fs::read_dir(&out.dir).unwrap().count(), 0);
    }

    #[test]
    fn missing_input_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let tokenizer = Tokenizer::new(Delimiter::Char(' '));

        let result = partition(&dir.path().join("nope.txt"), dir.path(), 2, &tokenizer);
        assert!(matches!(result, Err(WordCountError::InputNotFound(_))));
        assert!(!dir.path().join(SPLIT_DIR).exists());
    }
}
