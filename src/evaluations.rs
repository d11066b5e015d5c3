//! Built-in declarative evaluations.
//!
//! Each entry is `(pattern, default, predicate)`; the default is reported when
//! the targeted field does not exist.

use std::rc::Rc;

use crate::form::FieldState;
use crate::types::{truthy, EvaluationFn, Value};

pub(crate) fn defaults() -> Vec<(&'static str, bool, EvaluationFn)> {
    vec![
        ("required", false, predicate(|_, field, _| field.required)),
        ("not-required", true, predicate(|_, field, _| !field.required)),
        ("readonly", false, predicate(|_, field, _| field.readonly)),
        ("not-readonly", true, predicate(|_, field, _| !field.readonly)),
        ("empty", true, predicate(|_, _, value| !truthy(value))),
        ("false", true, predicate(|_, _, value| !truthy(value))),
        ("not-empty", false, predicate(|_, _, value| truthy(value))),
        ("true", false, predicate(|_, _, value| truthy(value))),
        ("valid", false, predicate(|_, field, _| field.valid)),
        ("not-valid", true, predicate(|_, field, _| !field.valid)),
        (
            "value:.+",
            false,
            predicate(|condition, _, value| equals_argument(condition, "value:", value)),
        ),
        (
            "not:.+",
            true,
            predicate(|condition, _, value| !equals_argument(condition, "not:", value)),
        ),
        (
            "file-extension:.+",
            false,
            predicate(|condition, _, value| {
                let extension = extension(value);
                !extension.is_empty()
                    && extension_list(condition, "file-extension:").any(|e| e == extension)
            }),
        ),
        (
            "not-file-extension:.+",
            true,
            predicate(|condition, _, value| {
                let extension = extension(value);
                extension.is_empty()
                    || !extension_list(condition, "not-file-extension:").any(|e| e == extension)
            }),
        ),
    ]
}

fn predicate(
    f: impl Fn(&Value, &FieldState, Option<&Value>) -> bool + 'static,
) -> EvaluationFn {
    Rc::new(f)
}

/// Text following `prefix` in the condition.
fn argument(condition: &Value, prefix: &str) -> String {
    let text = condition.as_text();
    text.strip_prefix(prefix).unwrap_or_default().to_owned()
}

/// Strict equality between the field value and the condition's argument: an
/// unchecked field reading `0` never equals a string.
fn equals_argument(condition: &Value, prefix: &str, value: Option<&Value>) -> bool {
    matches!(value, Some(Value::String(v)) if *v == argument(condition, prefix))
}

/// Lowercased text after the last `.` of a string value, or empty.
fn extension(value: Option<&Value>) -> String {
    match value.and_then(Value::as_str) {
        Some(name) if name.contains('.') => name
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_lowercase(),
        _ => String::new(),
    }
}

fn extension_list(condition: &Value, prefix: &str) -> impl Iterator<Item = String> {
    argument(condition, prefix)
        .to_lowercase()
        .split(',')
        .map(str::to_owned)
        .collect::<Vec<_>>()
        .into_iter()
}
