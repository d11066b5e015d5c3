use std::fmt;
use std::rc::Rc;

use super::Value;

/// Listener invoked when a condition's internal state may have changed.
pub type ChangeListener = Rc<dyn Fn()>;

/// Custom predicate receiving the field identifier and the field's current value.
pub type CustomPredicate = Rc<dyn Fn(&str, Option<&Value>) -> bool>;

/// Anything that can be evaluated to a boolean as a leaf of a query.
pub trait Evaluate {
    fn evaluate(&self) -> bool;

    /// Accept a listener to call whenever the result may have changed.
    /// Returns `false` when the condition has no internal state to observe.
    fn on_change(&self, _listener: ChangeListener) -> bool {
        false
    }
}

struct FnCondition<F>(F);

impl<F: Fn() -> bool> Evaluate for FnCondition<F> {
    fn evaluate(&self) -> bool {
        (self.0)()
    }
}

/// A lazily re-evaluated leaf of a query's DNF expression.
#[derive(Clone)]
pub struct ConditionNode(Rc<dyn Evaluate>);

impl ConditionNode {
    pub fn new(condition: impl Evaluate + 'static) -> Self {
        Self(Rc::new(condition))
    }

    pub fn from_fn(f: impl Fn() -> bool + 'static) -> Self {
        Self::new(FnCondition(f))
    }

    #[must_use]
    pub fn evaluate(&self) -> bool {
        self.0.evaluate()
    }

    pub fn on_change(&self, listener: ChangeListener) -> bool {
        self.0.on_change(listener)
    }
}

impl fmt::Debug for ConditionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConditionNode(..)")
    }
}

/// The three ways a condition can be handed to [`when`](crate::RuleHost::when).
#[derive(Clone)]
pub enum Condition {
    /// Called with the field identifier and the field's current value.
    Custom(CustomPredicate),
    /// A pre-built evaluable object.
    Node(ConditionNode),
    /// A declarative condition resolved through the evaluation table.
    Value(Value),
}

impl Condition {
    pub fn custom(f: impl Fn(&str, Option<&Value>) -> bool + 'static) -> Self {
        Condition::Custom(Rc::new(f))
    }

    pub fn node(condition: impl Evaluate + 'static) -> Self {
        Condition::Node(ConditionNode::new(condition))
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Custom(_) => write!(f, "Custom(..)"),
            Condition::Node(node) => write!(f, "{node:?}"),
            Condition::Value(v) => write!(f, "Value({v:?})"),
        }
    }
}

impl From<Value> for Condition {
    fn from(v: Value) -> Self {
        Condition::Value(v)
    }
}

impl From<bool> for Condition {
    fn from(v: bool) -> Self {
        Condition::Value(Value::Bool(v))
    }
}

impl From<&str> for Condition {
    fn from(v: &str) -> Self {
        Condition::Value(Value::from(v))
    }
}

impl From<String> for Condition {
    fn from(v: String) -> Self {
        Condition::Value(Value::String(v))
    }
}

impl From<i64> for Condition {
    fn from(v: i64) -> Self {
        Condition::Value(Value::Int(v))
    }
}

impl From<f64> for Condition {
    fn from(v: f64) -> Self {
        Condition::Value(Value::Float(v))
    }
}

impl From<ConditionNode> for Condition {
    fn from(node: ConditionNode) -> Self {
        Condition::Node(node)
    }
}
