use thiserror::Error;

use crate::parse::ParseError;
use crate::ConfigError;

/// Unified error type covering field-identifier parsing, configuration and
/// bootstrap.
///
/// Rule evaluation itself never fails; unknown actions are reported through
/// [`DispatchReport`](crate::DispatchReport) instead.
#[derive(Debug, Error)]
pub enum FormLogicError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldSpec;

    fn parse(input: &str) -> Result<FieldSpec, FormLogicError> {
        Ok(FieldSpec::parse(input)?)
    }

    #[test]
    fn parse_errors_convert() {
        assert!(matches!(parse("a,,b"), Err(FormLogicError::Parse(_))));
        assert!(parse("a, b:x").is_ok());
    }

    #[test]
    fn config_errors_convert_transparently() {
        let err: FormLogicError = ConfigError::UnknownForm { id: "f".into() }.into();
        assert_eq!(err.to_string(), "no form with id 'f' to run its script against");
    }
}
