use std::fmt;
use std::str::FromStr;

use crate::parse::{parse_field_spec, ParseError};

/// Field name that targets the whole form.
pub const FORM_ALIAS: &str = "<form>";

/// One identifier of a field spec: a field (or field group) name plus optional
/// value selectors restricting a multi-valued group to matching members.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldSelector {
    name: String,
    values: Vec<String>,
}

impl FieldSelector {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values.extend(values.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Whether this selector names the whole form.
    #[must_use]
    pub fn is_form(&self) -> bool {
        self.name == FORM_ALIAS
    }
}

impl fmt::Display for FieldSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for value in &self.values {
            write!(f, ":{value}")?;
        }
        Ok(())
    }
}

/// A parsed field identifier.
///
/// `All` is the empty identifier: every field of the form, with no change
/// subscription attached. `Fields` is a comma-separated selector list; an
/// empty list matches nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldSpec {
    All,
    Fields(Vec<FieldSelector>),
}

impl FieldSpec {
    /// Parse a field identifier. Blank input yields [`FieldSpec::All`].
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] on malformed identifiers such as `"a,,b"`.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        if input.trim().is_empty() {
            return Ok(FieldSpec::All);
        }
        parse_field_spec(input).map(FieldSpec::Fields)
    }

    /// Parse without failing: malformed identifiers are logged and match no field.
    #[must_use]
    pub fn lenient(input: &str) -> Self {
        Self::parse(input).unwrap_or_else(|err| {
            tracing::warn!(%err, "ignoring malformed field identifier");
            FieldSpec::Fields(Vec::new())
        })
    }

    /// The whole-form identifier used when a condition names no field.
    #[must_use]
    pub fn form() -> Self {
        FieldSpec::Fields(vec![FieldSelector::new(FORM_ALIAS)])
    }

    #[must_use]
    pub fn selectors(&self) -> &[FieldSelector] {
        match self {
            FieldSpec::All => &[],
            FieldSpec::Fields(selectors) => selectors,
        }
    }

    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, FieldSpec::All)
    }

    /// Names of the fields whose changes should re-trigger a condition on this
    /// spec. Value selectors are dropped so `radio-1:x` listens to the whole
    /// `radio-1` group.
    #[must_use]
    pub fn trigger_spec(&self) -> FieldSpec {
        match self {
            FieldSpec::All => FieldSpec::All,
            FieldSpec::Fields(selectors) => FieldSpec::Fields(
                selectors
                    .iter()
                    .map(|s| FieldSelector::new(s.name()))
                    .collect(),
            ),
        }
    }
}

impl FromStr for FieldSpec {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldSpec::All => Ok(()),
            FieldSpec::Fields(selectors) => {
                for (i, selector) in selectors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{selector}")?;
                }
                Ok(())
            }
        }
    }
}
