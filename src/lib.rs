//! Word occurrence counts over corpora larger than memory.
//!
//! The corpus is hashed token by token into partition files on disk, each
//! partition is counted on its own in an ordered map, and the sorted partial
//! counts are merged into one globally sorted `token<DELIM>count` file.
//!
//! ```no_run
//! use std::path::Path;
//! use word_counter::config::PipelineConfig;
//!
//! let config = PipelineConfig::default().with_partitions(10);
//! let summary = word_counter::pipeline::run(
//!     Path::new("tweets.txt"),
//!     Path::new("out/wordcount.txt"),
//!     &config,
//! )?;
//! println!("{} distinct tokens", summary.distinct_tokens);
//! # Ok::<(), word_counter::error::WordCountError>(())
//! ```

pub mod aggregate;
pub mod cleanup;
pub mod config;
pub mod error;
pub mod line_store;
pub mod logging;
pub mod median;
pub mod merge;
pub mod naive;
pub mod partition;
pub mod pipeline;
pub mod record;
pub mod tokenize;

pub use config::{Delimiter, PipelineConfig};
pub use error::{Result, WordCountError};
pub use pipeline::{Pipeline, RunSummary};
pub use record::CountRecord;
