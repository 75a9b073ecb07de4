use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::Delimiter;

static WHITESPACE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Valid regex pattern"));

/// Carriage returns belong to line terminators and never to a token.
const CARRIAGE_RETURN: char = '\r';

/// Splits records into tokens. Empty tokens are never produced, and a
/// carriage return always splits, so a token written to an intermediate
/// file reads back unchanged.
#[derive(Clone, Debug)]
pub struct Tokenizer {
    splitter: Splitter,
}

#[derive(Clone, Debug)]
enum Splitter {
    Char(char),
    Pattern(&'static Regex),
}

impl Tokenizer {
    pub fn new(delimiter: Delimiter) -> Self {
        let splitter = match delimiter {
            Delimiter::Char(c) => Splitter::Char(c),
            Delimiter::Whitespace => Splitter::Pattern(&WHITESPACE_REGEX),
        };

        Self { splitter }
    }

    /// Tokens of one record, in order of appearance.
    pub fn tokens<'a>(&'a self, record: &'a str) -> Box<dyn Iterator<Item = &'a str> + 'a> {
        match &self.splitter {
            Splitter::Char(c) => {
                let c = *c;
                Box::new(
                    record
                        .split(move |ch: char| ch == c || ch == CARRIAGE_RETURN)
                        .filter(|t| !t.is_empty()),
                )
            }
            Splitter::Pattern(re) => Box::new(re.split(record).filter(|t| !t.is_empty())),
        }
    }
}

/// Blank and whitespace-only records carry no tokens and are skipped by every stage.
pub fn is_blank(record: &str) -> bool {
    record.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_on_space() {
        let tokenizer = Tokenizer::new(Delimiter::Char(' '));
        let tokens: Vec<_> = tokenizer.tokens("a b  a ").collect();
        assert_eq!(tokens, vec!["a", "b", "a"]);
    }

    #[test]
    fn char_delimiter_keeps_other_whitespace() {
        let tokenizer = Tokenizer::new(Delimiter::Char(','));
        let tokens: Vec<_> = tokenizer.tokens("x y,z,,w").collect();
        assert_eq!(tokens, vec!["x y", "z", "w"]);
    }

    #[test]
    fn split_on_whitespace_runs() {
        let tokenizer = Tokenizer::new(Delimiter::Whitespace);
        let tokens: Vec<_> = tokenizer.tokens("\tHello  world\t\tHello ").collect();
        assert_eq!(tokens, vec!["Hello", "world", "Hello"]);
    }

    #[test]
    fn carriage_return_never_ends_up_in_a_token() {
        let tokenizer = Tokenizer::new(Delimiter::Char(' '));
        let tokens: Vec<_> = tokenizer.tokens("a \r b x\r y\rz").collect();
        assert_eq!(tokens, vec!["a", "b", "x", "y", "z"]);

        let tokenizer = Tokenizer::new(Delimiter::Char('\t'));
        let tokens: Vec<_> = tokenizer.tokens("new york\r\tparis").collect();
        assert_eq!(tokens, vec!["new york", "paris"]);
    }

    #[test]
    fn tokens_are_case_sensitive() {
        let tokenizer = Tokenizer::new(Delimiter::Char(' '));
        let tokens: Vec<_> = tokenizer.tokens("Rust rust").collect();
        assert_eq!(tokens, vec!["Rust", "rust"]);
    }

    #[test]
    fn blank_records() {
        assert!(is_blank(""));
        assert!(is_blank("  \t "));
        assert!(!is_blank(" a "));
    }
}
