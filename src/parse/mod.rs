mod error;
mod grammar;

pub use error::ParseError;

use crate::FieldSelector;

/// Parse a field identifier string (`name(:value)*(,name(:value)*)*`) into
/// its selectors.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not a valid field identifier.
pub fn parse_field_spec(input: &str) -> Result<Vec<FieldSelector>, ParseError> {
    use winnow::Parser;
    grammar::field_spec
        .parse(input)
        .map_err(|e| ParseError::new(input, e.to_string()))
}
