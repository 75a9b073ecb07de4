use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::builder::NonEmptyStringValueParser;
use clap::Parser;

use word_counter::logging::init_log;
use word_counter::median;
use word_counter::tokenize::Tokenizer;
use word_counter::Delimiter;

/// Running median of the number of distinct words per record.
#[derive(Parser, Debug)]
#[command(name = "running_median", version, about)]
struct Args {
    #[arg(value_parser = NonEmptyStringValueParser::new())]
    input: String,

    #[arg(value_parser = NonEmptyStringValueParser::new())]
    output: String,

    /// Token delimiter: a single character, "tab", or "whitespace".
    #[arg(short, long, default_value = " ")]
    delimiter: String,
}

fn main() -> Result<()> {
    init_log();

    let args = Args::parse();
    let delimiter: Delimiter = args.delimiter.parse()?;
    let tokenizer = Tokenizer::new(delimiter);

    let input = PathBuf::from(&args.input);
    let output = PathBuf::from(&args.output);

    median::run(&input, &output, &tokenizer)
        .with_context(|| format!("running median of {} failed", input.display()))?;

    Ok(())
}
