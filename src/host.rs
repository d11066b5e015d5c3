//! The form-level facade rules are written against.
//!
//! A [`RuleHost`] owns one [`FormModel`], the per-form copies of the action
//! and evaluation tables, the negation resolver, the change subscriptions and
//! every query created through it. It is a cheap, clonable handle; closures
//! stored inside the host keep a [`WeakHost`] instead to avoid cycles.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::builder::{ConditionBuilder, JunctionBuilder};
use crate::dispatch;
use crate::form::{Effect, FieldHandle, FieldState, FormModel, Switch};
use crate::negation::NegationResolver;
use crate::query::Query;
use crate::types::{
    ActionArgs, ActionFn, ActionRegistry, Actions, Condition, ConfigError, DispatchReport,
    EngineConfig, Evaluation, EvaluationTable, FieldSpec, Value,
};

/// Listener for field changes: `(field_id, value, automatic)`.
pub type FieldListener = Rc<dyn Fn(&str, Option<&Value>, bool)>;

struct Subscription {
    /// `None` listens to every field.
    fields: Option<Vec<FieldHandle>>,
    listener: FieldListener,
}

struct HostShared {
    config: Rc<EngineConfig>,
    form: RefCell<Box<dyn FormModel>>,
    actions: RefCell<ActionRegistry>,
    resolver: RefCell<NegationResolver>,
    evaluations: RefCell<EvaluationTable>,
    subscriptions: RefCell<Vec<Subscription>>,
    queries: RefCell<Vec<Query>>,
    has_changed: Cell<bool>,
}

#[derive(Clone)]
pub struct RuleHost {
    shared: Rc<HostShared>,
}

/// Non-owning handle to a [`RuleHost`].
#[derive(Clone)]
pub struct WeakHost(Weak<HostShared>);

impl WeakHost {
    #[must_use]
    pub fn upgrade(&self) -> Option<RuleHost> {
        self.0.upgrade().map(|shared| RuleHost { shared })
    }
}

impl RuleHost {
    /// Bind `form` to a configuration. Actions, evaluations and negatives are
    /// copied so per-form registrations do not leak into other forms.
    pub fn new(form: impl FormModel + 'static, config: Rc<EngineConfig>) -> Self {
        let mut resolver = NegationResolver::new(config.affixes().clone());
        for (action, negative) in config.negatives() {
            resolver.register(action, negative);
        }
        let shared = HostShared {
            form: RefCell::new(Box::new(form)),
            actions: RefCell::new(config.actions().clone()),
            resolver: RefCell::new(resolver),
            evaluations: RefCell::new(config.evaluations().clone()),
            subscriptions: RefCell::new(Vec::new()),
            queries: RefCell::new(Vec::new()),
            has_changed: Cell::new(false),
            config,
        };
        Self {
            shared: Rc::new(shared),
        }
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakHost {
        WeakHost(Rc::downgrade(&self.shared))
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.shared.config
    }

    #[must_use]
    pub fn id(&self) -> String {
        self.shared.form.borrow().id().to_owned()
    }

    /// Whether any change not caused by the engine itself was notified.
    #[must_use]
    pub fn has_changed(&self) -> bool {
        self.shared.has_changed.get()
    }

    // --- rules ---

    /// Start a rule with its first condition. `field` defaults to the whole
    /// form; an empty `field` adds the condition without subscribing to changes.
    pub fn when<'a>(
        &self,
        condition: impl Into<Condition>,
        field: impl Into<Option<&'a str>>,
    ) -> JunctionBuilder {
        self.query().when(condition, field)
    }

    /// Start a rule without a condition.
    #[must_use]
    pub fn query(&self) -> ConditionBuilder {
        let query = Query::new();
        self.shared.queries.borrow_mut().push(query.clone());
        ConditionBuilder::new(self.clone(), query)
    }

    /// Re-trigger every query created through this host.
    pub fn trigger_all(&self) {
        let queries = self.shared.queries.borrow().clone();
        tracing::debug!(form = %self.id(), queries = queries.len(), "triggering all queries");
        for query in queries {
            query.trigger();
        }
    }

    // --- fields ---

    /// Fields matching a field identifier; misses are logged.
    #[must_use]
    pub fn fields(&self, spec: &str) -> Vec<FieldHandle> {
        self.resolve(&FieldSpec::lenient(spec), false)
    }

    /// Whether a field identifier matches anything. Never logs misses.
    #[must_use]
    pub fn exists(&self, spec: &str) -> bool {
        !self.resolve(&FieldSpec::lenient(spec), true).is_empty()
    }

    /// Snapshots of the fields matching a field identifier.
    #[must_use]
    pub fn state(&self, spec: &str) -> Vec<FieldState> {
        let handles = self.fields(spec);
        let form = self.shared.form.borrow();
        handles.into_iter().filter_map(|h| form.state(h)).collect()
    }

    /// Value of the first active field matching `spec`.
    #[must_use]
    pub fn value(&self, spec: &str) -> Option<Value> {
        self.value_of(&FieldSpec::lenient(spec))
    }

    pub(crate) fn value_of(&self, spec: &FieldSpec) -> Option<Value> {
        let handles = self.resolve(spec, false);
        self.shared.form.borrow().group_value(&handles)
    }

    /// Programmatic value change; subscribers see `automatic = true`.
    pub fn set_value(&self, spec: &str, value: impl Into<Value>) {
        self.write(spec, &value.into(), true);
    }

    /// Simulated user input; subscribers see `automatic = false`.
    pub fn input(&self, spec: &str, value: impl Into<Value>) {
        self.write(spec, &value.into(), false);
    }

    fn write(&self, spec: &str, value: &Value, automatic: bool) {
        let handles = self.fields(spec);
        let changed = self.shared.form.borrow_mut().write_value(&handles, value);
        self.notify(&changed, automatic);
    }

    /// Switch an effect on the fields matching `spec`. Fields whose checked
    /// state changed are notified as automatic changes.
    pub fn apply_effect(
        &self,
        spec: &str,
        effect: &Effect,
        switch: Switch,
        skip_transition: bool,
    ) -> Vec<FieldHandle> {
        let handles = self.fields(spec);
        let changed = self
            .shared
            .form
            .borrow_mut()
            .apply(&handles, effect, switch, skip_transition);
        self.notify(&changed, true);
        changed
    }

    /// Subscribe to changes of the fields matching `spec`; an empty `spec`
    /// listens to the whole form. Fields are resolved once, now.
    pub fn on(&self, spec: &str, listener: impl Fn(&str, Option<&Value>, bool) + 'static) {
        self.subscribe(&FieldSpec::lenient(spec), Rc::new(listener));
    }

    pub(crate) fn subscribe(&self, spec: &FieldSpec, listener: FieldListener) {
        let fields = match spec {
            FieldSpec::All => None,
            FieldSpec::Fields(_) => Some(self.resolve(spec, false)),
        };
        self.shared
            .subscriptions
            .borrow_mut()
            .push(Subscription { fields, listener });
    }

    /// Deliver change notifications for `changed`, field by field, to every
    /// matching subscription in registration order.
    pub fn notify(&self, changed: &[FieldHandle], automatic: bool) {
        if changed.is_empty() {
            return;
        }
        if !automatic {
            self.shared.has_changed.set(true);
        }
        for &field in changed {
            let listeners: Vec<FieldListener> = self
                .shared
                .subscriptions
                .borrow()
                .iter()
                .filter(|s| s.fields.as_ref().map_or(true, |f| f.contains(&field)))
                .map(|s| Rc::clone(&s.listener))
                .collect();
            let (id, value) = {
                let form = self.shared.form.borrow();
                let id = form.state(field).map(|s| s.id).unwrap_or_default();
                (id, form.read_value(field))
            };
            tracing::trace!(field = %id, automatic, listeners = listeners.len(), "field changed");
            for listener in listeners {
                listener(&id, value.as_ref(), automatic);
            }
        }
    }

    pub(crate) fn resolve(&self, spec: &FieldSpec, quiet: bool) -> Vec<FieldHandle> {
        let form = self.shared.form.borrow();
        let selectors = match spec {
            FieldSpec::All => return form.all_fields(),
            FieldSpec::Fields(selectors) => selectors,
        };
        let mut result = Vec::new();
        for selector in selectors {
            let found = form.resolve(selector);
            if found.is_empty() && !quiet {
                tracing::warn!(form = form.id(), field = %selector, "no fields found");
            }
            for handle in found {
                if !result.contains(&handle) {
                    result.push(handle);
                }
            }
        }
        result
    }

    // --- actions ---

    pub fn register_action(
        &self,
        name: &str,
        f: impl Fn(&RuleHost, ActionArgs, bool) + 'static,
    ) {
        self.shared.actions.borrow_mut().register(name, Rc::new(f));
    }

    pub fn register_action_negative(&self, action: &str, negative: &str) {
        self.shared.resolver.borrow_mut().register(action, negative);
    }

    /// Registered action names, in registration order.
    #[must_use]
    pub fn actions(&self) -> Vec<String> {
        self.shared.actions.borrow().names().to_vec()
    }

    #[must_use]
    pub fn action_exists(&self, name: &str) -> bool {
        self.shared.actions.borrow().contains(name)
    }

    pub(crate) fn action_fn(&self, name: &str) -> Option<ActionFn> {
        self.shared.actions.borrow().get(name)
    }

    /// The explicit or inferred negative of `name`, if one is registered.
    #[must_use]
    pub fn action_negative(&self, name: &str) -> Option<String> {
        let actions = self.shared.actions.borrow();
        self.shared
            .resolver
            .borrow_mut()
            .resolve(name, |candidate| actions.contains(candidate))
    }

    /// Number of negative lookups that searched the affix tables.
    #[must_use]
    pub fn negation_searches(&self) -> usize {
        self.shared.resolver.borrow().affix_searches()
    }

    /// Run actions now, outside of any rule.
    pub fn apply_actions(
        &self,
        actions: impl Into<Actions>,
        args: impl Into<ActionArgs>,
        negate: bool,
        skip_transition: bool,
    ) -> DispatchReport {
        dispatch::apply_actions(self, &actions.into(), &args.into(), negate, skip_transition)
    }

    // --- evaluations ---

    /// Register (or replace) an evaluation for this form only.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] if `pattern` is not a valid regex.
    pub fn register_evaluation(
        &self,
        pattern: &str,
        default: bool,
        predicate: impl Fn(&Value, &FieldState, Option<&Value>) -> bool + 'static,
    ) -> Result<(), ConfigError> {
        let evaluation = Evaluation::compile(pattern, default, Rc::new(predicate))?;
        self.shared.evaluations.borrow_mut().insert(evaluation);
        Ok(())
    }

    /// Evaluate a declarative condition against the fields matching `spec`.
    ///
    /// Returns the evaluation's default when nothing matches, otherwise the
    /// AND of the predicate over every matched field.
    #[must_use]
    pub fn eval(&self, spec: &str, condition: impl Into<Value>) -> bool {
        self.eval_spec(&FieldSpec::lenient(spec), &condition.into())
    }

    pub(crate) fn eval_spec(&self, spec: &FieldSpec, condition: &Value) -> bool {
        let evaluation = self.shared.evaluations.borrow().lookup(condition).clone();
        let handles = self.resolve(spec, false);
        if handles.is_empty() {
            return evaluation.default_result();
        }
        let snapshots: Vec<(FieldState, Option<Value>)> = {
            let form = self.shared.form.borrow();
            handles
                .into_iter()
                .filter_map(|h| form.state(h).map(|state| (state, form.read_value(h))))
                .collect()
        };
        snapshots
            .iter()
            .all(|(state, value)| evaluation.check(condition, state, value.as_ref()))
    }
}

impl fmt::Debug for RuleHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleHost")
            .field("form", &self.id())
            .field("queries", &self.shared.queries.borrow().len())
            .field("subscriptions", &self.shared.subscriptions.borrow().len())
            .finish()
    }
}
