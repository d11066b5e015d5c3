use std::fmt;
use std::rc::Rc;

use regex::Regex;

use super::error::ConfigError;
use super::Value;
use crate::form::FieldState;

/// Predicate of a declarative condition: `(condition, field, field value)`.
pub type EvaluationFn = Rc<dyn Fn(&Value, &FieldState, Option<&Value>) -> bool>;

/// One entry of the evaluation table.
///
/// `default` is the result reported when the field identifier matches no
/// field at all.
#[derive(Clone)]
pub struct Evaluation {
    pattern: String,
    matcher: Option<Regex>,
    default: bool,
    predicate: EvaluationFn,
}

impl Evaluation {
    /// Compile an entry whose pattern must match the whole condition text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] if `pattern` is not a valid regex.
    pub fn compile(
        pattern: &str,
        default: bool,
        predicate: EvaluationFn,
    ) -> Result<Self, ConfigError> {
        let matcher =
            Regex::new(&format!("^(?:{pattern})$")).map_err(|source| ConfigError::InvalidPattern {
                pattern: pattern.to_owned(),
                source,
            })?;
        Ok(Self {
            pattern: pattern.to_owned(),
            matcher: Some(matcher),
            default,
            predicate,
        })
    }

    /// Terminal entry: strict equality between condition and field value.
    pub(crate) fn strict_equality() -> Self {
        Self {
            pattern: String::new(),
            matcher: None,
            default: false,
            predicate: Rc::new(|condition: &Value, _: &FieldState, value: Option<&Value>| {
                value.is_some_and(|v| condition.strict_eq(v))
            }),
        }
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn default_result(&self) -> bool {
        self.default
    }

    #[must_use]
    pub fn matches(&self, condition: &str) -> bool {
        self.matcher.as_ref().map_or(true, |m| m.is_match(condition))
    }

    #[must_use]
    pub fn check(&self, condition: &Value, field: &FieldState, value: Option<&Value>) -> bool {
        (self.predicate)(condition, field, value)
    }
}

impl fmt::Debug for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluation")
            .field("pattern", &self.pattern)
            .field("default", &self.default)
            .finish()
    }
}

/// Ordered, first-match-wins table of evaluations with a strict-equality
/// terminal entry.
#[derive(Debug, Clone)]
pub struct EvaluationTable {
    entries: Vec<Evaluation>,
    fallback: Evaluation,
}

impl Default for EvaluationTable {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            fallback: Evaluation::strict_equality(),
        }
    }
}

impl EvaluationTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, or replace an existing entry with the same pattern in place.
    pub fn insert(&mut self, evaluation: Evaluation) {
        match self
            .entries
            .iter_mut()
            .find(|e| e.pattern == evaluation.pattern)
        {
            Some(existing) => *existing = evaluation,
            None => self.entries.push(evaluation),
        }
    }

    /// The entry governing `condition`: the first whose pattern fully matches
    /// the condition text, else the strict-equality terminal.
    #[must_use]
    pub fn lookup(&self, condition: &Value) -> &Evaluation {
        let text = condition.as_text();
        self.entries
            .iter()
            .find(|e| e.matches(&text))
            .unwrap_or(&self.fallback)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(Evaluation::pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FieldKind;

    fn always(result: bool) -> EvaluationFn {
        Rc::new(move |_, _, _| result)
    }

    fn field() -> FieldState {
        FieldState::new("f", FieldKind::Text, "abc")
    }

    #[test]
    fn patterns_match_whole_condition() {
        let eval = Evaluation::compile("value:.+", false, always(true)).unwrap();
        assert!(eval.matches("value:x"));
        assert!(!eval.matches("value:"));
        assert!(!eval.matches("not-value:x"));
    }

    #[test]
    fn alternation_is_anchored_as_a_group() {
        let eval = Evaluation::compile("a|b", false, always(true)).unwrap();
        assert!(eval.matches("a"));
        assert!(!eval.matches("ab"));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let err = Evaluation::compile("(", false, always(true)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { pattern, .. } if pattern == "("));
    }

    #[test]
    fn lookup_first_match_wins() {
        let mut table = EvaluationTable::new();
        table.insert(Evaluation::compile("x.*", true, always(true)).unwrap());
        table.insert(Evaluation::compile("xy", false, always(false)).unwrap());
        assert_eq!(table.lookup(&Value::from("xy")).pattern(), "x.*");
    }

    #[test]
    fn lookup_falls_back_to_strict_equality() {
        let table = EvaluationTable::new();
        let entry = table.lookup(&Value::from("abc"));
        assert_eq!(entry.pattern(), "");
        assert!(!entry.default_result());
        assert!(entry.check(&Value::from("abc"), &field(), Some(&Value::from("abc"))));
        assert!(!entry.check(&Value::from("abc"), &field(), Some(&Value::from("abd"))));
        assert!(!entry.check(&Value::from("abc"), &field(), None));
    }

    #[test]
    fn lookup_uses_condition_text() {
        let mut table = EvaluationTable::new();
        table.insert(Evaluation::compile("true", false, always(true)).unwrap());
        assert_eq!(table.lookup(&Value::Bool(true)).pattern(), "true");
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut table = EvaluationTable::new();
        table.insert(Evaluation::compile("a", false, always(false)).unwrap());
        table.insert(Evaluation::compile("b", false, always(false)).unwrap());
        table.insert(Evaluation::compile("a", true, always(true)).unwrap());
        assert_eq!(table.patterns().collect::<Vec<_>>(), ["a", "b"]);
        assert!(table.lookup(&Value::from("a")).default_result());
        assert_eq!(table.len(), 2);
    }
}
