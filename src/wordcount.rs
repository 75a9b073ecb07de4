use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::builder::NonEmptyStringValueParser;
use clap::Parser;
use log::info;

use word_counter::logging::init_log;
use word_counter::{Delimiter, Pipeline, PipelineConfig};

/// Count word occurrences of a text file, one record per line.
#[derive(Parser, Debug)]
#[command(name = "wordcount", version, about)]
struct Args {
    /// Input corpus.
    #[arg(value_parser = NonEmptyStringValueParser::new())]
    input: String,

    /// Output file, created with its parent directories if missing.
    #[arg(value_parser = NonEmptyStringValueParser::new())]
    output: String,

    /// Count in memory instead of partitioning to disk.
    #[arg(short, long)]
    naive: bool,

    /// Number of partition files.
    #[arg(short = 'k', long)]
    partitions: Option<usize>,

    /// Token delimiter: a single character, "tab", or "whitespace".
    #[arg(short, long)]
    delimiter: Option<String>,

    /// Directory that receives the temporary partition tree.
    #[arg(long)]
    temp_dir: Option<PathBuf>,

    /// TOML config file, flags override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn build_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_toml_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if let Some(partitions) = args.partitions {
        config = config.with_partitions(partitions);
    }

    if let Some(delimiter) = &args.delimiter {
        config = config.with_delimiter(delimiter.parse::<Delimiter>()?);
    }

    if let Some(dir) = &args.temp_dir {
        config = config.with_temp_parent(dir);
    }

    Ok(config)
}

fn main() -> Result<()> {
    init_log();

    let args = Args::parse();
    let config = build_config(&args)?;
    let pipeline = Pipeline::new(config)?;

    let input = PathBuf::from(&args.input);
    let output = PathBuf::from(&args.output);

    let result = if args.naive {
        pipeline.run_naive(&input, &output)
    } else {
        pipeline.run(&input, &output)
    };
    let summary = result.with_context(|| format!("word count of {} failed", input.display()))?;

    info!(
        "{} tokens, {} distinct, {} partition files",
        summary.tokens, summary.distinct_tokens, summary.partition_files
    );

    Ok(())
}
