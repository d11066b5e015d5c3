use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::Value;
use crate::RuleHost;

/// A registered action: receives the host it runs against, its own copy of
/// the arguments, and the skip-transition flag.
pub type ActionFn = Rc<dyn Fn(&RuleHost, ActionArgs, bool)>;

/// A custom action closure receiving only the skip-transition flag.
pub type CustomAction = Rc<dyn Fn(bool)>;

/// Positional arguments passed through to a named action.
///
/// The first argument is conventionally the target field identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionArgs(Vec<Value>);

impl ActionArgs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.0.push(value.into());
        self
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// Text of the argument at `index`, or an empty string when absent.
    #[must_use]
    pub fn text(&self, index: usize) -> String {
        self.0
            .get(index)
            .map(|v| v.as_text().into_owned())
            .unwrap_or_default()
    }

    /// The target field identifier (first argument).
    #[must_use]
    pub fn field(&self) -> String {
        self.text(0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }
}

impl From<()> for ActionArgs {
    fn from((): ()) -> Self {
        Self::default()
    }
}

impl From<&str> for ActionArgs {
    fn from(field: &str) -> Self {
        Self(vec![Value::from(field)])
    }
}

impl From<String> for ActionArgs {
    fn from(field: String) -> Self {
        Self(vec![Value::String(field)])
    }
}

impl From<Value> for ActionArgs {
    fn from(value: Value) -> Self {
        Self(vec![value])
    }
}

impl From<Vec<Value>> for ActionArgs {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl<const N: usize> From<[&str; N]> for ActionArgs {
    fn from(values: [&str; N]) -> Self {
        Self(values.iter().map(|v| Value::from(*v)).collect())
    }
}

/// One element of an action list: a registered action name or a closure.
#[derive(Clone)]
pub enum ActionToken {
    Named(String),
    Custom(CustomAction),
}

impl fmt::Debug for ActionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionToken::Named(name) => write!(f, "Named({name:?})"),
            ActionToken::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// An ordered list of actions to apply.
///
/// Built from a comma-separated string of names, a list of tokens, or a
/// single closure.
#[derive(Debug, Clone, Default)]
pub struct Actions(Vec<ActionToken>);

impl Actions {
    pub fn custom(f: impl Fn(bool) + 'static) -> Self {
        Self(vec![ActionToken::Custom(Rc::new(f))])
    }

    #[must_use]
    pub fn tokens(&self) -> &[ActionToken] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Actions {
    fn from(names: &str) -> Self {
        Self(
            names
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(|name| ActionToken::Named(name.to_owned()))
                .collect(),
        )
    }
}

impl From<String> for Actions {
    fn from(names: String) -> Self {
        Actions::from(names.as_str())
    }
}

impl From<ActionToken> for Actions {
    fn from(token: ActionToken) -> Self {
        Self(vec![token])
    }
}

impl From<Vec<ActionToken>> for Actions {
    fn from(tokens: Vec<ActionToken>) -> Self {
        Self(tokens)
    }
}

impl From<Vec<&str>> for Actions {
    fn from(names: Vec<&str>) -> Self {
        Self(
            names
                .into_iter()
                .map(|name| ActionToken::Named(name.to_owned()))
                .collect(),
        )
    }
}

/// Maps action names to their functions, preserving registration order.
#[derive(Clone, Default)]
pub struct ActionRegistry {
    names: Vec<String>,
    functions: Vec<ActionFn>,
    index: HashMap<String, usize>,
}

impl ActionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action. Re-registering a name replaces its function and
    /// keeps its original position. Returns whether the name was new.
    pub fn register(&mut self, name: &str, f: ActionFn) -> bool {
        if let Some(&idx) = self.index.get(name) {
            self.functions[idx] = f;
            return false;
        }
        self.index.insert(name.to_owned(), self.names.len());
        self.names.push(name.to_owned());
        self.functions.push(f);
        true
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<ActionFn> {
        self.index.get(name).map(|&idx| Rc::clone(&self.functions[idx]))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Registered names in registration order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("names", &self.names)
            .finish()
    }
}
