use std::fmt;

/// One aggregated `token<DELIM>count` line.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct CountRecord {
    pub token: String,
    pub count: u64,
}

impl CountRecord {
    pub fn new(token: impl Into<String>, count: u64) -> Self {
        Self {
            token: token.into(),
            count,
        }
    }

    /// Render with the given separator, without line terminator.
    pub fn display(&self, separator: char) -> RecordDisplay<'_> {
        RecordDisplay {
            record: self,
            separator,
        }
    }

    /// Parse a line written by [`CountRecord::display`].
    ///
    /// The count is taken after the last separator, so tokens that contain the
    /// separator character (possible with a whitespace delimiter) still parse.
    pub fn parse(line: &str, separator: char) -> Option<Self> {
        let (token, count) = line.rsplit_once(separator)?;
        let count = count.trim_end_matches('\r').parse::<u64>().ok()?;

        Some(Self::new(token, count))
    }
}

pub struct RecordDisplay<'a> {
    record: &'a CountRecord,
    separator: char,
}

impl fmt::Display for RecordDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.record.token, self.separator, self.record.count)
    }
}
