//! Running median of the number of distinct tokens per record.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};
use std::path::Path;

use log::info;

use crate::error::Result;
use crate::line_store::{LineReader, LineWriter};
use crate::tokenize::{is_blank, Tokenizer};

/// Median of a growing sequence of values.
///
/// The lower half lives in a max-heap and the upper half in a min-heap; the
/// lower half holds at most one element more than the upper half.
#[derive(Debug, Default)]
pub struct RunningMedian {
    lower: BinaryHeap<u64>,
    upper: BinaryHeap<Reverse<u64>>,
}

impl RunningMedian {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `value` and return the median of everything seen so far.
    pub fn push(&mut self, value: u64) -> f64 {
        match self.lower.peek() {
            Some(&top) if value > top => self.upper.push(Reverse(value)),
            _ => self.lower.push(value),
        }

        // rebalance
        if self.lower.len() > self.upper.len() + 1 {
            if let Some(top) = self.lower.pop() {
                self.upper.push(Reverse(top));
            }
        } else if self.upper.len() > self.lower.len() {
            if let Some(Reverse(bottom)) = self.upper.pop() {
                self.lower.push(bottom);
            }
        }

        self.median().unwrap_or_default()
    }

    /// `None` until the first value.
    pub fn median(&self) -> Option<f64> {
        let low = *self.lower.peek()?;

        if self.lower.len() > self.upper.len() {
            return Some(low as f64);
        }

        let Reverse(high) = *self.upper.peek()?;
        Some((low as f64 + high as f64) / 2.0)
    }

    pub fn len(&self) -> usize {
        self.lower.len() + self.upper.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lower.is_empty()
    }
}

/// Number of distinct tokens in `record`.
pub fn unique_token_count(record: &str, tokenizer: &Tokenizer) -> usize {
    tokenizer.tokens(record).collect::<HashSet<_>>().len()
}

/// Whole medians print without a fraction: `2`, `2.5`.
pub fn format_median(median: f64) -> String {
    format!("{}", median)
}

/// Write the running median of distinct tokens per non-blank record of
/// `input` to `output`, one line per record.
pub fn run(input: &Path, output: &Path, tokenizer: &Tokenizer) -> Result<usize> {
    let reader = LineReader::open(input)?;
    let mut writer = LineWriter::create(output)?;
    let mut running = RunningMedian::new();

    for line in reader {
        let line = line?;
        if is_blank(&line) {
            continue;
        }

        let median = running.push(unique_token_count(&line, tokenizer) as u64);
        writer.write_line(format_median(median))?;
    }
    writer.finish()?;

    info!(
        "wrote {} running medians to {}",
        running.len(),
        output.display()
    );

    Ok(running.len())
}
