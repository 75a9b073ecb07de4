//! Sequence partition, aggregation and merge over a private temporary tree.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::aggregate::aggregate_dir;
use crate::cleanup::remove_tree;
use crate::config::PipelineConfig;
use crate::error::{Result, WordCountError};
use crate::merge::merge;
use crate::naive;
use crate::partition::partition;
use crate::tokenize::Tokenizer;

/// Upper bound on suffixes tried when `temp<millis>` is taken.
const MAX_TEMP_ATTEMPTS: usize = 1000;

/// The `temp<timestamp>` directory owned by one run.
#[derive(Debug)]
pub struct TempTree {
    root: PathBuf,
}

impl TempTree {
    /// Create a fresh `temp<millis>` directory under `parent`.
    ///
    /// When the name is taken by a concurrent run, `temp<millis>-<n>` is tried.
    pub fn create(parent: &Path) -> Result<Self> {
        fs::create_dir_all(parent).map_err(|e| WordCountError::io(parent, e))?;

        let millis = chrono::Utc::now().timestamp_millis();
        for attempt in 0..MAX_TEMP_ATTEMPTS {
            let name = match attempt {
                0 => format!("temp{}", millis),
                n => format!("temp{}-{}", millis, n),
            };
            let root = parent.join(name);

            match fs::create_dir(&root) {
                Ok(()) => return Ok(Self { root }),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(WordCountError::io(&root, e)),
            }
        }

        Err(WordCountError::io(
            parent,
            io::Error::new(
                io::ErrorKind::AlreadyExists,
                "no free temporary directory name",
            ),
        ))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Delete the whole tree.
    pub fn remove(self) -> Result<()> {
        if remove_tree(&self.root) {
            Ok(())
        } else {
            Err(WordCountError::Cleanup(self.root))
        }
    }
}

/// Totals of one run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Token occurrences in the input.
    pub tokens: u64,
    /// Lines in the output.
    pub distinct_tokens: u64,
    /// Partition files that received at least one token.
    pub partition_files: usize,
}

/// Word count over a corpus, external or in memory.
pub struct Pipeline {
    config: PipelineConfig,
    tokenizer: Tokenizer,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let tokenizer = Tokenizer::new(config.delimiter);

        Ok(Self { config, tokenizer })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn check_input(input: &Path) -> Result<()> {
        if !input.is_file() {
            return Err(WordCountError::InputNotFound(input.to_path_buf()));
        }

        Ok(())
    }

    fn temp_parent(&self, input: &Path) -> PathBuf {
        match &self.config.temp_parent {
            Some(dir) => dir.clone(),
            None => match input.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            },
        }
    }

    /// Partition `input` to disk, aggregate each partition, merge into `output`,
    /// then delete the temporary tree.
    ///
    /// On failure the temporary tree is left behind and its path logged.
    pub fn run(&self, input: &Path, output: &Path) -> Result<RunSummary> {
        Self::check_input(input)?;

        let temp = TempTree::create(&self.temp_parent(input))?;
        info!(
            "word count {} -> {} with {} partitions, temp dir {}",
            input.display(),
            output.display(),
            self.config.partitions,
            temp.root().display()
        );

        let summary = match self.run_stages(input, output, temp.root()) {
            Ok(summary) => summary,
            Err(e) => {
                warn!(
                    "run failed, temporary files left in {}",
                    temp.root().display()
                );
                return Err(e);
            }
        };

        temp.remove()?;
        info!(
            "finished {}: {} tokens, {} distinct",
            output.display(),
            summary.tokens,
            summary.distinct_tokens
        );

        Ok(summary)
    }

    fn run_stages(&self, input: &Path, output: &Path, work_dir: &Path) -> Result<RunSummary> {
        let separator = self.config.delimiter.separator();

        let split = partition(input, work_dir, self.config.partitions, &self.tokenizer)?;
        let groups = aggregate_dir(&split.dir, separator)?;
        let merged = merge(&groups.dir, output, separator)?;

        if merged.occurrences != split.tokens {
            warn!(
                "merged {} occurrences but partitioned {}",
                merged.occurrences, split.tokens
            );
        }

        Ok(RunSummary {
            tokens: split.tokens,
            distinct_tokens: merged.records,
            partition_files: split.files,
        })
    }

    /// Count `input` entirely in memory.
    pub fn run_naive(&self, input: &Path, output: &Path) -> Result<RunSummary> {
        Self::check_input(input)?;

        let separator = self.config.delimiter.separator();
        let counted = naive::run(input, output, &self.tokenizer, separator)?;

        Ok(RunSummary {
            tokens: counted.tokens,
            distinct_tokens: counted.distinct_tokens,
            partition_files: 0,
        })
    }
}

/// Run the external pipeline with `config`.
pub fn run(input: &Path, output: &Path, config: &PipelineConfig) -> Result<RunSummary> {
    Pipeline::new(config.clone())?.run(input, output)
}
