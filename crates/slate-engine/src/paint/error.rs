use std::fmt;

/// Error returned when a color literal cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorParseError {
    /// The rejected input, verbatim.
    pub literal: String,
    pub message: &'static str,
}

impl ColorParseError {
    pub(crate) fn new(literal: &str, message: &'static str) -> Self {
        Self { literal: literal.to_owned(), message }
    }
}

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid color '{}': {}", self.literal, self.message)
    }
}

impl std::error::Error for ColorParseError {}
