mod action;
mod condition;
mod config;
mod dispatch_report;
mod error;
mod evaluation;
mod field_spec;
mod value;

pub use action::{ActionArgs, ActionFn, ActionRegistry, ActionToken, Actions, CustomAction};
pub use condition::{ChangeListener, Condition, ConditionNode, CustomPredicate, Evaluate};
pub(crate) use config::{ActionDef, EvaluationDef};
pub use config::{AffixRule, AffixRules, ClassNames, EngineConfig, EngineConfigBuilder};
pub use dispatch_report::{DispatchReport, CUSTOM_ACTION};
pub use error::{ConfigError, DispatchError};
pub use evaluation::{Evaluation, EvaluationFn, EvaluationTable};
pub use field_spec::{FieldSelector, FieldSpec, FORM_ALIAS};
pub use value::{truthy, Value};
