use std::rc::Rc;

use super::action::{ActionArgs, ActionFn, ActionRegistry};
use super::error::ConfigError;
use super::evaluation::{EvaluationFn, EvaluationTable};
use super::Value;
use crate::form::FieldState;
use crate::RuleHost;

/// A pair of name affixes with opposite meaning, e.g. `show` / `hide`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AffixRule {
    pub affix: String,
    pub negative: String,
}

/// Prefix and postfix tables used to infer the negative of an action name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AffixRules {
    prefixes: Vec<AffixRule>,
    postfixes: Vec<AffixRule>,
}

impl AffixRules {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `add↔remove, show↔hide, en↔dis, un↔'', dis↔'', re↔''` as prefixes,
    /// `in↔out, up↔down` as postfixes.
    #[must_use]
    pub fn standard() -> Self {
        Self::new()
            .prefix("add", "remove")
            .prefix("show", "hide")
            .prefix("en", "dis")
            .prefix("un", "")
            .prefix("dis", "")
            .prefix("re", "")
            .postfix("in", "out")
            .postfix("up", "down")
    }

    /// Add a prefix rule. An existing rule for the same affix is replaced in place.
    #[must_use]
    pub fn prefix(mut self, affix: &str, negative: &str) -> Self {
        upsert(&mut self.prefixes, affix, negative);
        self
    }

    /// Add a postfix rule. An existing rule for the same affix is replaced in place.
    #[must_use]
    pub fn postfix(mut self, affix: &str, negative: &str) -> Self {
        upsert(&mut self.postfixes, affix, negative);
        self
    }

    #[must_use]
    pub fn prefixes(&self) -> &[AffixRule] {
        &self.prefixes
    }

    #[must_use]
    pub fn postfixes(&self) -> &[AffixRule] {
        &self.postfixes
    }
}

fn upsert(rules: &mut Vec<AffixRule>, affix: &str, negative: &str) {
    match rules.iter_mut().find(|r| r.affix == affix) {
        Some(rule) => rule.negative = negative.to_owned(),
        None => rules.push(AffixRule {
            affix: affix.to_owned(),
            negative: negative.to_owned(),
        }),
    }
}

/// Class names the built-in actions apply to fields.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassNames {
    /// Marks fields switched to required.
    pub required_indicator: String,
    /// Marks expanded collapsible targets.
    pub collapse_show: String,
}

impl Default for ClassNames {
    fn default() -> Self {
        Self {
            required_indicator: "required".to_owned(),
            collapse_show: "show".to_owned(),
        }
    }
}

pub(crate) struct ActionDef {
    pub(crate) name: String,
    pub(crate) function: ActionFn,
    pub(crate) replace: bool,
}

pub(crate) struct EvaluationDef {
    pub(crate) pattern: String,
    pub(crate) default: bool,
    pub(crate) predicate: EvaluationFn,
}

/// Builder for an [`EngineConfig`].
///
/// # Example
///
/// ```
/// use formlogic::{Effect, EngineConfigBuilder, Switch};
///
/// let config = EngineConfigBuilder::with_defaults()
///     .action("reveal", |host, args, skip| {
///         host.apply_effect(&args.field(), &Effect::Visible, Switch::Set, skip);
///     })
///     .action("conceal", |host, args, skip| {
///         host.apply_effect(&args.field(), &Effect::Visible, Switch::Unset, skip);
///     })
///     .negative("reveal", "conceal")
///     .evaluation("starts-with:.+", false, |condition, _, value| {
///         let prefix = &condition.as_text()["starts-with:".len()..];
///         value.is_some_and(|v| v.as_text().starts_with(prefix))
///     })
///     .build()
///     .unwrap();
/// assert!(config.actions().contains("reveal"));
/// ```
#[derive(Default)]
pub struct EngineConfigBuilder {
    actions: Vec<ActionDef>,
    negatives: Vec<(String, String)>,
    evaluations: Vec<EvaluationDef>,
    affixes: AffixRules,
    class_names: ClassNames,
}

impl EngineConfigBuilder {
    /// An empty builder: no actions, no evaluations, no affix rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder preloaded with the built-in actions, evaluations, affix
    /// rules and class names.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut builder = Self::new().affixes(AffixRules::standard());
        for (name, function) in crate::actions::defaults() {
            builder.actions.push(ActionDef {
                name: name.to_owned(),
                function,
                replace: false,
            });
        }
        for (pattern, default, predicate) in crate::evaluations::defaults() {
            builder.evaluations.push(EvaluationDef {
                pattern: pattern.to_owned(),
                default,
                predicate,
            });
        }
        builder
    }

    /// Register an action. Registering a name twice fails at build time.
    #[must_use]
    pub fn action(mut self, name: &str, f: impl Fn(&RuleHost, ActionArgs, bool) + 'static) -> Self {
        self.actions.push(ActionDef {
            name: name.to_owned(),
            function: Rc::new(f),
            replace: false,
        });
        self
    }

    /// Register an action, replacing any earlier registration of `name`.
    #[must_use]
    pub fn override_action(
        mut self,
        name: &str,
        f: impl Fn(&RuleHost, ActionArgs, bool) + 'static,
    ) -> Self {
        self.actions.push(ActionDef {
            name: name.to_owned(),
            function: Rc::new(f),
            replace: true,
        });
        self
    }

    /// Declare `negative` as the opposite of `action` (both directions).
    #[must_use]
    pub fn negative(mut self, action: &str, negative: &str) -> Self {
        self.negatives.push((action.to_owned(), negative.to_owned()));
        self
    }

    /// Register an evaluation for conditions fully matching `pattern`.
    /// `default` is reported when the targeted field does not exist.
    /// Re-using a pattern replaces the earlier entry in place.
    #[must_use]
    pub fn evaluation(
        mut self,
        pattern: &str,
        default: bool,
        predicate: impl Fn(&Value, &FieldState, Option<&Value>) -> bool + 'static,
    ) -> Self {
        self.evaluations.push(EvaluationDef {
            pattern: pattern.to_owned(),
            default,
            predicate: Rc::new(predicate),
        });
        self
    }

    #[must_use]
    pub fn prefix(mut self, affix: &str, negative: &str) -> Self {
        self.affixes = self.affixes.prefix(affix, negative);
        self
    }

    #[must_use]
    pub fn postfix(mut self, affix: &str, negative: &str) -> Self {
        self.affixes = self.affixes.postfix(affix, negative);
        self
    }

    #[must_use]
    pub fn affixes(mut self, affixes: AffixRules) -> Self {
        self.affixes = affixes;
        self
    }

    #[must_use]
    pub fn class_names(mut self, class_names: ClassNames) -> Self {
        self.class_names = class_names;
        self
    }

    /// Compile patterns and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on invalid patterns, duplicate action names or
    /// negatives naming unregistered actions.
    pub fn build(self) -> Result<EngineConfig, ConfigError> {
        crate::compile::compile(
            self.actions,
            self.negatives,
            self.evaluations,
            self.affixes,
            self.class_names,
        )
    }
}

/// Immutable engine configuration shared by every [`RuleHost`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub(crate) actions: ActionRegistry,
    pub(crate) negatives: Vec<(String, String)>,
    pub(crate) evaluations: EvaluationTable,
    pub(crate) affixes: AffixRules,
    pub(crate) class_names: ClassNames,
}

impl EngineConfig {
    #[must_use]
    pub fn actions(&self) -> &ActionRegistry {
        &self.actions
    }

    /// Explicitly declared action negatives, in declaration order.
    #[must_use]
    pub fn negatives(&self) -> &[(String, String)] {
        &self.negatives
    }

    #[must_use]
    pub fn evaluations(&self) -> &EvaluationTable {
        &self.evaluations
    }

    #[must_use]
    pub fn affixes(&self) -> &AffixRules {
        &self.affixes
    }

    #[must_use]
    pub fn class_names(&self) -> &ClassNames {
        &self.class_names
    }
}
