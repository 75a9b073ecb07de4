use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{Result, WordCountError};

/// Number of partition files used when nothing else is configured.
pub const DEFAULT_PARTITIONS: usize = 100;

/// Line terminator written to every output and intermediate file.
#[cfg(windows)]
pub const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
pub const LINE_ENDING: &str = "\n";

/// Separator between tokens in a record, and between token and count in the output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Delimiter {
    /// Split on exactly this character.
    Char(char),
    /// Split on any run of whitespace; a single space is written.
    Whitespace,
}

impl Delimiter {
    /// The character written between a token and its count.
    pub fn separator(&self) -> char {
        match self {
            Delimiter::Char(c) => *c,
            Delimiter::Whitespace => ' ',
        }
    }
}

impl Default for Delimiter {
    fn default() -> Self {
        Delimiter::Char(' ')
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delimiter::Char('\t') => write!(f, "\\t"),
            Delimiter::Char(c) => write!(f, "{:?}", c),
            Delimiter::Whitespace => write!(f, "whitespace"),
        }
    }
}

impl FromStr for Delimiter {
    type Err = WordCountError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "whitespace" => return Ok(Delimiter::Whitespace),
            "\\t" | "tab" => return Ok(Delimiter::Char('\t')),
            "space" => return Ok(Delimiter::Char(' ')),
            _ => {}
        }

        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(Delimiter::Char(c)),
            _ => Err(WordCountError::Configuration(format!(
                "delimiter must be a single character or \"whitespace\", got {:?}",
                s
            ))),
        }
    }
}

impl TryFrom<String> for Delimiter {
    type Error = WordCountError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Settings for one word count run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Number of on-disk partitions tokens are hashed into.
    pub partitions: usize,
    pub delimiter: Delimiter,
    /// Directory that receives the `temp<timestamp>` tree. `None` means the input's parent.
    pub temp_parent: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            partitions: DEFAULT_PARTITIONS,
            delimiter: Delimiter::default(),
            temp_parent: None,
        }
    }
}

/// On-disk shape of a TOML config file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    partitions: Option<usize>,
    delimiter: Option<Delimiter>,
    temp_dir: Option<PathBuf>,
}

impl PipelineConfig {
    pub fn with_partitions(mut self, partitions: usize) -> Self {
        self.partitions = partitions;
        self
    }

    pub fn with_delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_temp_parent(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_parent = Some(dir.into());
        self
    }

    /// Check the settings before any file is touched.
    pub fn validate(&self) -> Result<()> {
        if self.partitions == 0 {
            return Err(WordCountError::Configuration(
                "partition count must be at least 1".to_string(),
            ));
        }

        if let Delimiter::Char(c) = self.delimiter {
            if c == '\n' || c == '\r' {
                return Err(WordCountError::Configuration(format!(
                    "delimiter {} collides with the line terminator",
                    self.delimiter
                )));
            }

            // counts are written after the separator
            if c.is_ascii_digit() {
                return Err(WordCountError::Configuration(format!(
                    "delimiter {} can not be a digit",
                    self.delimiter
                )));
            }
        }

        Ok(())
    }

    /// Parse a TOML document, filling missing keys with defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)
            .map_err(|e| WordCountError::Configuration(format!("invalid config: {}", e)))?;

        let defaults = Self::default();
        let config = Self {
            partitions: file.partitions.unwrap_or(defaults.partitions),
            delimiter: file.delimiter.unwrap_or(defaults.delimiter),
            temp_parent: file.temp_dir,
        };
        config.validate()?;

        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| WordCountError::io(path, e))?;

        Self::from_toml_str(&content)
    }
}
