//! k-way merge of aggregated, token-sorted partition files.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::aggregate::list_files;
use crate::error::{Result, WordCountError};
use crate::line_store::{LineReader, LineWriter};
use crate::record::CountRecord;

/// Current head of one source file. Ordered and compared by `(token, source)`.
#[derive(Debug)]
struct HeadEntry {
    record: CountRecord,
    source: usize,
}

impl PartialEq for HeadEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeadEntry {}

impl Ord for HeadEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.record
            .token
            .cmp(&other.record.token)
            .then(self.source.cmp(&other.source))
    }
}

impl PartialOrd for HeadEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Parsing reader over one aggregated file.
struct RecordSource {
    reader: LineReader,
    separator: char,
}

impl RecordSource {
    fn next_record(&mut self) -> Result<Option<CountRecord>> {
        loop {
            let line = match self.reader.next() {
                Some(line) => line?,
                None => return Ok(None),
            };
            if line.is_empty() {
                continue;
            }

            return match CountRecord::parse(&line, self.separator) {
                Some(record) => Ok(Some(record)),
                None => Err(WordCountError::MalformedRecord {
                    path: self.reader.path().to_path_buf(),
                    line_number: self.reader.line_number(),
                    line,
                }),
            };
        }
    }
}

/// Outcome of a merge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeOutput {
    pub path: PathBuf,
    /// Lines written, one per distinct token.
    pub records: u64,
    /// Sum of all counts written.
    pub occurrences: u64,
}

/// Merges sorted record streams through a min-heap holding one head per source.
///
/// A source is dropped (its file closed) as soon as it is exhausted.
pub struct Merger {
    sources: Vec<Option<RecordSource>>,
    heap: BinaryHeap<Reverse<HeadEntry>>,
}

impl Merger {
    /// Open every file and seed the heap with the first record of each non-empty one.
    pub fn open(files: &[PathBuf], separator: char) -> Result<Self> {
        let mut merger = Self {
            sources: Vec::with_capacity(files.len()),
            heap: BinaryHeap::with_capacity(files.len()),
        };

        for (index, path) in files.iter().enumerate() {
            merger.sources.push(Some(RecordSource {
                reader: LineReader::open(path)?,
                separator,
            }));
            merger.advance(index)?;
        }

        Ok(merger)
    }

    /// Push the next record of `source` into the heap, or close it when exhausted.
    fn advance(&mut self, source: usize) -> Result<()> {
        let next = match self.sources[source].as_mut() {
            Some(reader) => reader.next_record()?,
            None => return Ok(()),
        };

        match next {
            Some(record) => self.heap.push(Reverse(HeadEntry { record, source })),
            None => self.sources[source] = None,
        }

        Ok(())
    }

    /// Smallest remaining record, with counts of equal tokens from different
    /// sources summed.
    pub fn next_record(&mut self) -> Result<Option<CountRecord>> {
        let Reverse(head) = match self.heap.pop() {
            Some(head) => head,
            None => return Ok(None),
        };
        self.advance(head.source)?;

        let mut record = head.record;
        while let Some(Reverse(peer)) = self.heap.peek() {
            if peer.record.token != record.token {
                break;
            }

            warn!(
                "token {:?} found in partitions {} and {}, summing counts",
                record.token, head.source, peer.source
            );
            if let Some(Reverse(peer)) = self.heap.pop() {
                record.count += peer.record.count;
                self.advance(peer.source)?;
            }
        }

        Ok(Some(record))
    }

    /// Sources not yet exhausted.
    pub fn open_sources(&self) -> usize {
        self.sources.iter().filter(|s| s.is_some()).count()
    }
}

/// Merge every aggregated file of `dir` into `output`.
///
/// `output` is always created, empty when there is nothing to merge.
pub fn merge(dir: &Path, output: &Path, separator: char) -> Result<MergeOutput> {
    let files = list_files(dir)?;
    let mut merger = Merger::open(&files, separator)?;

    let mut writer = LineWriter::create(output)?;
    let mut records = 0u64;
    let mut occurrences = 0u64;

    while let Some(record) = merger.next_record()? {
        writer.write_line(record.display(separator))?;
        records += 1;
        occurrences += record.count;
    }
    writer.finish()?;

    info!(
        "merged {} files into {}, {} records",
        files.len(),
        output.display(),
        records
    );

    Ok(MergeOutput {
        path: output.to_path_buf(),
        records,
        occurrences,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line_store::write_lines;
    use std::fs;

    fn output_lines(path: &Path) -> Vec<String> {
        LineReader::open(path)
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn head_entries_compare_on_token_and_source() {
        let entry = |token: &str, count: u64, source: usize| HeadEntry {
            record: CountRecord::new(token, count),
            source,
        };

        assert_eq!(entry("a", 1, 0), entry("a", 9, 0));
        assert_ne!(entry("a", 1, 0), entry("a", 1, 1));
        assert!(entry("a", 9, 1) < entry("b", 1, 0));
        assert!(entry("a", 9, 0) < entry("a", 1, 1));
    }

    #[test]
    fn merges_in_token_order() {
        let dir = tempfile::tempdir().unwrap();
        let groups = dir.path().join("sortgroup");
        write_lines(groups.join("0.txt"), ["apple 3", "kiwi 1", "zoo 2"]).unwrap();
        write_lines(groups.join("1.txt"), ["banana 5"]).unwrap();
        write_lines(groups.join("2.txt"), ["cherry 1", "date 4"]).unwrap();

        let output = dir.path().join("out.txt");
        let out = merge(&groups, &output, ' ').unwrap();

        assert_eq!(out.records, 6);
        assert_eq!(out.occurrences, 16);
        assert_eq!(
            output_lines(&output),
            vec!["apple 3", "banana 5", "cherry 1", "date 4", "kiwi 1", "zoo 2"]
        );
    }

    #[test]
    fn orders_by_token_not_by_line_text() {
        // As whole lines "a\tb 1" < "a 1", but token "a" < "a\tb".
        let dir = tempfile::tempdir().unwrap();
        let groups = dir.path().join("sortgroup");
        write_lines(groups.join("0.txt"), ["a\tb 1"]).unwrap();
        write_lines(groups.join("1.txt"), ["a 1"]).unwrap();

        let output = dir.path().join("out.txt");
        merge(&groups, &output, ' ').unwrap();

        assert_eq!(output_lines(&output), vec!["a 1", "a\tb 1"]);
    }

    #[test]
    fn identical_lines_in_two_files_are_not_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let groups = dir.path().join("sortgroup");
        write_lines(groups.join("0.txt"), ["same 2", "x 1"]).unwrap();
        write_lines(groups.join("1.txt"), ["same 2"]).unwrap();

        let output = dir.path().join("out.txt");
        let out = merge(&groups, &output, ' ').unwrap();

        assert_eq!(out.occurrences, 5);
        assert_eq!(output_lines(&output), vec!["same 4", "x 1"]);
    }

    #[test]
    fn empty_files_and_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let groups = dir.path().join("sortgroup");
        fs::create_dir(&groups).unwrap();

        let output = dir.path().join("out.txt");
        let out = merge(&groups, &output, ' ').unwrap();
        assert_eq!(out.records, 0);
        assert!(output.is_file());

        write_lines(groups.join("0.txt"), Vec::<String>::new()).unwrap();
        write_lines(groups.join("1.txt"), ["only 1"]).unwrap();
        merge(&groups, &output, ' ').unwrap();
        assert_eq!(output_lines(&output), vec!["only 1"]);
    }

    #[test]
    fn exhausted_sources_are_closed() {
        let dir = tempfile::tempdir().unwrap();
        let short = dir.path().join("0.txt");
        let long = dir.path().join("1.txt");
        write_lines(&short, ["a 1"]).unwrap();
        write_lines(&long, ["b 1", "c 1"]).unwrap();

        let mut merger = Merger::open(&[short, long], ' ').unwrap();
        assert_eq!(merger.open_sources(), 2);

        assert_eq!(merger.next_record().unwrap(), Some(CountRecord::new("a", 1)));
        assert_eq!(merger.open_sources(), 1);
        assert_eq!(merger.next_record().unwrap(), Some(CountRecord::new("b", 1)));
        assert_eq!(merger.next_record().unwrap(), Some(CountRecord::new("c", 1)));
        assert_eq!(merger.next_record().unwrap(), None);
        assert_eq!(merger.open_sources(), 0);
    }

    #[test]
    fn malformed_line_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let groups = dir.path().join("sortgroup");
        write_lines(groups.join("0.txt"), ["ok 1", "broken"]).unwrap();

        let result = merge(&groups, &dir.path().join("out.txt"), ' ');
        assert!(matches!(
            result,
            Err(WordCountError::MalformedRecord { line_number: 2, .. })
        ));
    }
}
