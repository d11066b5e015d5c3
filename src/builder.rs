//! Fluent rule construction.
//!
//! A rule alternates between two facets: [`ConditionBuilder`] accepts the
//! next condition, [`JunctionBuilder`] accepts combinators, brackets and the
//! actions to run when the rule's result changes.
//!
//! ```
//! use std::rc::Rc;
//! use formlogic::{EngineConfigBuilder, MemoryForm, RuleHost};
//!
//! let form = MemoryForm::new("contact")
//!     .checkbox("newsletter", "yes", false)
//!     .text("email", "")
//!     .text("phone", "");
//! let config = Rc::new(EngineConfigBuilder::with_defaults().build().unwrap());
//! let host = RuleHost::new(form, config);
//!
//! host.when(true, "newsletter")
//!     .then("show, setRequired", "email")
//!     .otherwise_direct()
//!     .show("phone");
//!
//! assert!(!host.state("email")[0].visible);
//! host.input("newsletter", true);
//! assert!(host.state("email")[0].required);
//! assert!(!host.state("phone")[0].visible);
//! ```

use std::cell::Cell;
use std::rc::Rc;

use crate::dispatch;
use crate::host::FieldListener;
use crate::query::Query;
use crate::types::{
    ActionArgs, Actions, Condition, ConditionNode, FieldSpec, Value, FORM_ALIAS,
};
use crate::RuleHost;

/// Facet that accepts the next condition of a rule.
#[derive(Debug, Clone)]
pub struct ConditionBuilder {
    host: RuleHost,
    query: Query,
}

impl ConditionBuilder {
    pub(crate) fn new(host: RuleHost, query: Query) -> Self {
        Self { host, query }
    }

    #[must_use]
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Add a condition on `field` (the whole form when `None`) and subscribe
    /// the rule to that field's changes. An empty `field` adds the condition
    /// without a subscription.
    pub fn when<'a>(
        self,
        condition: impl Into<Condition>,
        field: impl Into<Option<&'a str>>,
    ) -> JunctionBuilder {
        let field = field.into().unwrap_or(FORM_ALIAS);
        let spec = FieldSpec::lenient(field);
        let node = self.condition_node(condition.into(), field, &spec);
        self.query.add_condition(node);
        if !spec.is_all() {
            self.subscribe(&spec);
        }
        self.junction()
    }

    /// Subscribe the rule to changes of `field` without adding a condition.
    pub fn on(self, field: &str) -> JunctionBuilder {
        let spec = FieldSpec::lenient(field);
        if !spec.is_all() {
            self.subscribe(&spec);
        }
        self.junction()
    }

    /// Open a bracketed sub-expression. Its result joins the current clause
    /// and the rule re-triggers on every change of the form.
    #[must_use]
    pub fn open_bracket(self) -> ConditionBuilder {
        let child = Query::child_of(&self.query);
        self.query.add_condition(ConditionNode::new(child.clone()));
        self.subscribe(&FieldSpec::form());
        ConditionBuilder::new(self.host, child)
    }

    #[must_use]
    pub fn trigger(self) -> Self {
        self.query.trigger();
        self
    }

    #[must_use]
    pub fn pause(self) -> Self {
        self.query.pause();
        self
    }

    #[must_use]
    pub fn resume(self) -> Self {
        self.query.resume();
        self
    }

    fn condition_node(&self, condition: Condition, field: &str, spec: &FieldSpec) -> ConditionNode {
        let host = self.host.downgrade();
        match condition {
            Condition::Node(node) => node,
            Condition::Custom(predicate) => {
                if spec.is_all() {
                    return ConditionNode::from_fn(move || predicate("", None));
                }
                let field = field.to_owned();
                let spec = spec.clone();
                ConditionNode::from_fn(move || {
                    let value = host.upgrade().and_then(|h| h.value_of(&spec));
                    predicate(&field, value.as_ref())
                })
            }
            Condition::Value(value) => {
                let spec = spec.clone();
                ConditionNode::from_fn(move || {
                    host.upgrade().is_some_and(|h| h.eval_spec(&spec, &value))
                })
            }
        }
    }

    /// Value selectors are dropped so `group:x` re-triggers on any member.
    fn subscribe(&self, spec: &FieldSpec) {
        let query = self.query.clone();
        let listener: FieldListener =
            Rc::new(move |_: &str, _: Option<&Value>, _: bool| query.trigger());
        self.host.subscribe(&spec.trigger_spec(), listener);
    }

    fn junction(self) -> JunctionBuilder {
        JunctionBuilder {
            host: self.host,
            query: self.query,
        }
    }
}

/// Facet that accepts combinators, brackets and actions.
#[derive(Debug, Clone)]
pub struct JunctionBuilder {
    host: RuleHost,
    query: Query,
}

impl JunctionBuilder {
    #[must_use]
    pub fn query(&self) -> &Query {
        &self.query
    }

    #[must_use]
    pub fn evaluate(&self) -> bool {
        self.query.evaluate()
    }

    #[must_use]
    pub fn trigger(self) -> Self {
        self.query.trigger();
        self
    }

    #[must_use]
    pub fn pause(self) -> Self {
        self.query.pause();
        self
    }

    #[must_use]
    pub fn resume(self) -> Self {
        self.query.resume();
        self
    }

    // --- combinators ---

    /// Stay in the current clause.
    #[must_use]
    pub fn and(self) -> ConditionBuilder {
        self.query.and();
        self.conditions()
    }

    pub fn and_when<'a>(
        self,
        condition: impl Into<Condition>,
        field: impl Into<Option<&'a str>>,
    ) -> JunctionBuilder {
        self.and().when(condition, field)
    }

    /// Start a new clause.
    #[must_use]
    pub fn or(self) -> ConditionBuilder {
        self.query.or();
        self.conditions()
    }

    pub fn or_when<'a>(
        self,
        condition: impl Into<Condition>,
        field: impl Into<Option<&'a str>>,
    ) -> JunctionBuilder {
        self.or().when(condition, field)
    }

    #[must_use]
    pub fn and_open_bracket(self) -> ConditionBuilder {
        self.and().open_bracket()
    }

    #[must_use]
    pub fn or_open_bracket(self) -> ConditionBuilder {
        self.or().open_bracket()
    }

    /// Return to the enclosing expression. At the root this is the identity.
    #[must_use]
    pub fn close_bracket(self) -> JunctionBuilder {
        match self.query.parent() {
            Some(parent) => JunctionBuilder {
                host: self.host,
                query: parent,
            },
            None => self,
        }
    }

    /// Close the bracket and attach `actions` as with [`then`](Self::then).
    pub fn close_bracket_then(
        self,
        actions: impl Into<Actions>,
        args: impl Into<ActionArgs>,
    ) -> JunctionBuilder {
        self.close_bracket().then(actions, args)
    }

    // --- callbacks ---

    /// Register a raw `(state, skip_transition)` callback at the root. Returns
    /// the root's junction, closing any open brackets.
    pub fn call(self, callback: impl Fn(bool, bool) + 'static) -> JunctionBuilder {
        let root = JunctionBuilder {
            query: self.query.root(),
            host: self.host,
        };
        root.query.add_callback(Rc::new(callback));
        root
    }

    /// Run `actions` while the rule holds and their negatives while it does not.
    pub fn then(self, actions: impl Into<Actions>, args: impl Into<ActionArgs>) -> JunctionBuilder {
        self.query.set_negate_direct_action(false);
        self.dispatch_on(actions.into(), args.into(), |state| Some(!state))
    }

    /// Switch direct actions to the positive branch.
    #[must_use]
    pub fn then_direct(self) -> JunctionBuilder {
        self.query.set_negate_direct_action(false);
        self
    }

    /// Run `actions` while the rule does not hold and their negatives while it does.
    pub fn otherwise(
        self,
        actions: impl Into<Actions>,
        args: impl Into<ActionArgs>,
    ) -> JunctionBuilder {
        self.query.set_negate_direct_action(true);
        self.dispatch_on(actions.into(), args.into(), Some)
    }

    /// Switch direct actions to the negative branch.
    #[must_use]
    pub fn otherwise_direct(self) -> JunctionBuilder {
        self.query.set_negate_direct_action(true);
        self
    }

    /// Run `actions` whenever the rule becomes true; never their negatives.
    pub fn only_then(
        self,
        actions: impl Into<Actions>,
        args: impl Into<ActionArgs>,
    ) -> JunctionBuilder {
        self.dispatch_on(actions.into(), args.into(), |state| state.then_some(false))
    }

    /// Run `actions` whenever the rule becomes false; never their negatives.
    pub fn only_otherwise(
        self,
        actions: impl Into<Actions>,
        args: impl Into<ActionArgs>,
    ) -> JunctionBuilder {
        self.dispatch_on(actions.into(), args.into(), |state| (!state).then_some(false))
    }

    /// Like [`then`](Self::then) until the rule first holds, then never again.
    pub fn once(self, actions: impl Into<Actions>, args: impl Into<ActionArgs>) -> JunctionBuilder {
        let done = Cell::new(false);
        self.dispatch_on(actions.into(), args.into(), move |state| {
            if done.get() {
                return None;
            }
            done.set(state);
            Some(!state)
        })
    }

    /// Attach a registered action through the current direct-action branch:
    /// [`then`](Self::then) normally, [`otherwise`](Self::otherwise) after
    /// [`otherwise_direct`](Self::otherwise_direct).
    pub fn action(self, name: &str, args: impl Into<ActionArgs>) -> JunctionBuilder {
        if self.query.negate_direct_action() {
            self.otherwise(name, args)
        } else {
            self.then(name, args)
        }
    }

    pub fn show(self, field: &str) -> JunctionBuilder {
        self.action("show", field)
    }

    pub fn hide(self, field: &str) -> JunctionBuilder {
        self.action("hide", field)
    }

    pub fn enable(self, field: &str) -> JunctionBuilder {
        self.action("enable", field)
    }

    pub fn disable(self, field: &str) -> JunctionBuilder {
        self.action("disable", field)
    }

    pub fn set_required(self, field: &str) -> JunctionBuilder {
        self.action("setRequired", field)
    }

    pub fn unset_required(self, field: &str) -> JunctionBuilder {
        self.action("unsetRequired", field)
    }

    pub fn set_readonly(self, field: &str) -> JunctionBuilder {
        self.action("setReadonly", field)
    }

    pub fn unset_readonly(self, field: &str) -> JunctionBuilder {
        self.action("unsetReadonly", field)
    }

    pub fn set_checked(self, field: &str) -> JunctionBuilder {
        self.action("setChecked", field)
    }

    pub fn unset_checked(self, field: &str) -> JunctionBuilder {
        self.action("unsetChecked", field)
    }

    pub fn add_class(self, field: &str, class: &str) -> JunctionBuilder {
        self.action("addClass", [field, class])
    }

    pub fn remove_class(self, field: &str, class: &str) -> JunctionBuilder {
        self.action("removeClass", [field, class])
    }

    /// Register a callback dispatching `actions` with the negate flag chosen
    /// by `polarity`; `None` dispatches nothing.
    fn dispatch_on(
        self,
        actions: Actions,
        args: ActionArgs,
        polarity: impl Fn(bool) -> Option<bool> + 'static,
    ) -> JunctionBuilder {
        let host = self.host.downgrade();
        self.call(move |state, skip_transition| {
            let Some(negate) = polarity(state) else {
                return;
            };
            if let Some(host) = host.upgrade() {
                let _report =
                    dispatch::apply_actions(&host, &actions, &args, negate, skip_transition);
            }
        })
    }

    fn conditions(self) -> ConditionBuilder {
        ConditionBuilder::new(self.host, self.query)
    }
}
