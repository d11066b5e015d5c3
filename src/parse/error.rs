use std::fmt;

/// Errors produced when parsing a field identifier.
#[derive(Debug)]
pub struct ParseError {
    input: String,
    message: String,
}

impl ParseError {
    pub(crate) fn new(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            message: message.into(),
        }
    }

    /// The identifier that failed to parse.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid field identifier '{}': {}",
            self.input, self.message
        )
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ParseError::new("a,,b", "unexpected token");
        assert_eq!(
            err.to_string(),
            "invalid field identifier 'a,,b': unexpected token"
        );
        assert_eq!(err.input(), "a,,b");
    }
}
