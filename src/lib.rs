//! Declarative show/hide/enable/require logic for form documents.
//!
//! Rules are written per form against a [`RuleHost`]: a condition on one or
//! more fields, combined with `and`/`or` and brackets, followed by the
//! actions to run when the combined result flips. Each rule is a [`Query`]
//! kept in disjunctive normal form; it re-evaluates whenever a field it
//! depends on changes and fires only on edges. Actions run with their
//! negative (inferred from affix rules such as `show`/`hide` or
//! `addClass`/`removeClass`) when a rule turns false.
//!
//! The form itself sits behind [`FormModel`]; [`MemoryForm`] is a complete
//! in-memory implementation.

mod actions;
mod bootstrap;
mod builder;
mod compile;
mod dispatch;
mod error;
mod evaluations;
mod form;
mod host;
mod negation;
pub mod parse;
mod query;
mod types;

pub use bootstrap::{Bootstrap, FormScript, LifecycleEvent};
pub use builder::{ConditionBuilder, JunctionBuilder};
pub use dispatch::apply_actions;
pub use error::FormLogicError;
pub use form::{Effect, FieldHandle, FieldKind, FieldState, FormModel, MemoryForm, Switch};
pub use host::{FieldListener, RuleHost, WeakHost};
pub use negation::NegationResolver;
pub use parse::ParseError;
pub use query::{Callback, Query};
pub use types::{
    truthy, ActionArgs, ActionFn, ActionRegistry, ActionToken, Actions, AffixRule, AffixRules,
    ChangeListener, ClassNames, Condition, ConditionNode, ConfigError, CustomAction,
    CustomPredicate, DispatchError, DispatchReport, EngineConfig, EngineConfigBuilder, Evaluate,
    Evaluation, EvaluationFn, EvaluationTable, FieldSelector, FieldSpec, Value, CUSTOM_ACTION,
    FORM_ALIAS,
};
