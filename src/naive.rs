//! In-memory word count for corpora that fit in memory.

use std::collections::BTreeMap;
use std::path::Path;

use log::info;

use crate::error::Result;
use crate::line_store::{LineReader, LineWriter};
use crate::record::CountRecord;
use crate::tokenize::{is_blank, Tokenizer};

/// Count every token of `lines` in one ordered map.
pub fn count_words<I>(lines: I, tokenizer: &Tokenizer) -> Result<BTreeMap<String, u64>>
where
    I: IntoIterator<Item = Result<String>>,
{
    let mut map = BTreeMap::new();

    for line in lines {
        let line = line?;

        // skip blank records
        if is_blank(&line) {
            continue;
        }

        for word in tokenizer.tokens(&line) {
            *map.entry(word.to_string()).or_insert(0) += 1;
        }
    }

    Ok(map)
}

/// Totals of an in-memory count.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NaiveOutput {
    pub tokens: u64,
    pub distinct_tokens: u64,
}

/// Count `input` in memory and write the sorted `token<DELIM>count` lines to `output`.
///
/// Produces the same bytes as the external pipeline for the same input.
pub fn run(input: &Path, output: &Path, tokenizer: &Tokenizer, separator: char) -> Result<NaiveOutput> {
    let map = count_words(LineReader::open(input)?, tokenizer)?;

    let mut writer = LineWriter::create(output)?;
    for (token, count) in map.iter() {
        writer.write_line(CountRecord::new(token.as_str(), *count).display(separator))?;
    }
    writer.finish()?;

    let tokens: u64 = map.values().sum();
    info!(
        "counted {} tokens, {} distinct, in memory into {}",
        tokens,
        map.len(),
        output.display()
    );

    Ok(NaiveOutput {
        tokens,
        distinct_tokens: map.len() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Delimiter, LINE_ENDING};

    #[test]
    fn counts_lines() {
        let tokenizer = Tokenizer::new(Delimiter::Char(' '));
        let lines = ["a b a", "", "  ", "b c"].map(|l| Ok(l.to_string()));
        let map = count_words(lines, &tokenizer).unwrap();

        let pairs: Vec<_> = map.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        assert_eq!(pairs, vec![("a", 2), ("b", 2), ("c", 1)]);
    }

    #[test]
    fn writes_sorted_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        let output = dir.path().join("nested").join("out.txt");
        std::fs::write(&input, "b a\nc a\n").unwrap();

        let tokenizer = Tokenizer::new(Delimiter::Char(' '));
        let out = run(&input, &output, &tokenizer, ' ').unwrap();

        assert_eq!(out.tokens, 4);
        assert_eq!(out.distinct_tokens, 3);
        let expected: String = ["a 2", "b 1", "c 1"]
            .iter()
            .map(|l| format!("{}{}", l, LINE_ENDING))
            .collect();
        assert_eq!(std::fs::read_to_string(&output).unwrap(), expected);
    }
}
