//! Built-in actions.
//!
//! Every action takes the target field identifier as its first argument.
//! The generic forms (`class`, `collapse`, `required`, `readonly`, `checked`)
//! take a `"set" | "unset" | "toggle"` switch as their second argument.

use std::rc::Rc;

use crate::form::{Effect, Switch};
use crate::types::{ActionArgs, ActionFn};
use crate::RuleHost;

pub(crate) fn defaults() -> Vec<(&'static str, ActionFn)> {
    vec![
        ("enable", effect(Effect::Disabled, Switch::Unset)),
        ("disable", effect(Effect::Disabled, Switch::Set)),
        ("showOption", effect(Effect::OptionVisible, Switch::Set)),
        ("hideOption", effect(Effect::OptionVisible, Switch::Unset)),
        ("show", effect(Effect::Visible, Switch::Set)),
        ("hide", effect(Effect::Visible, Switch::Unset)),
        ("toggle", effect(Effect::Visible, Switch::Toggle)),
        ("showElement", effect(Effect::Visible, Switch::Set)),
        ("hideElement", effect(Effect::Visible, Switch::Unset)),
        ("toggleElement", effect(Effect::Visible, Switch::Toggle)),
        ("fadeIn", effect(Effect::Visible, Switch::Set)),
        ("fadeOut", effect(Effect::Visible, Switch::Unset)),
        ("slideDown", effect(Effect::Visible, Switch::Set)),
        ("slideUp", effect(Effect::Visible, Switch::Unset)),
        ("class", action(|host, args, skip| class(host, &args, switch_arg(&args), 2, skip))),
        ("addClass", action(|host, args, skip| class(host, &args, Switch::Set, 1, skip))),
        ("removeClass", action(|host, args, skip| class(host, &args, Switch::Unset, 1, skip))),
        ("toggleClass", action(|host, args, skip| class(host, &args, Switch::Toggle, 1, skip))),
        ("collapse", action(|host, args, skip| collapse(host, &args, switch_arg(&args), skip))),
        ("showCollapse", action(|host, args, skip| collapse(host, &args, Switch::Set, skip))),
        ("hideCollapse", action(|host, args, skip| collapse(host, &args, Switch::Unset, skip))),
        ("toggleCollapse", action(|host, args, skip| collapse(host, &args, Switch::Toggle, skip))),
        ("required", action(|host, args, skip| required(host, &args, switch_arg(&args), skip))),
        ("setRequired", action(|host, args, skip| required(host, &args, Switch::Set, skip))),
        ("unsetRequired", action(|host, args, skip| required(host, &args, Switch::Unset, skip))),
        ("toggleRequired", action(|host, args, skip| required(host, &args, Switch::Toggle, skip))),
        ("readonly", switched(Effect::Readonly)),
        ("setReadonly", effect(Effect::Readonly, Switch::Set)),
        ("unsetReadonly", effect(Effect::Readonly, Switch::Unset)),
        ("toggleReadonly", effect(Effect::Readonly, Switch::Toggle)),
        ("checked", switched(Effect::Checked)),
        ("setChecked", effect(Effect::Checked, Switch::Set)),
        ("unsetChecked", effect(Effect::Checked, Switch::Unset)),
        ("toggleChecked", effect(Effect::Checked, Switch::Toggle)),
        ("val", action(val)),
    ]
}

fn action(f: impl Fn(&RuleHost, ActionArgs, bool) + 'static) -> ActionFn {
    Rc::new(f)
}

/// An action applying `effect` with a fixed switch.
fn effect(effect: Effect, switch: Switch) -> ActionFn {
    action(move |host, args, skip| {
        host.apply_effect(&args.field(), &effect, switch, skip);
    })
}

/// An action applying `effect` with the switch named by its second argument.
fn switched(effect: Effect) -> ActionFn {
    action(move |host, args, skip| {
        host.apply_effect(&args.field(), &effect, switch_arg(&args), skip);
    })
}

fn switch_arg(args: &ActionArgs) -> Switch {
    Switch::from_name(&args.text(1))
}

fn class(host: &RuleHost, args: &ActionArgs, switch: Switch, class_index: usize, skip: bool) {
    let class = args.text(class_index);
    if class.is_empty() {
        tracing::debug!(field = %args.field(), "class action without a class name");
        return;
    }
    host.apply_effect(&args.field(), &Effect::Class(class), switch, skip);
}

fn collapse(host: &RuleHost, args: &ActionArgs, switch: Switch, skip: bool) {
    let class = host.config().class_names().collapse_show.clone();
    if class.is_empty() {
        return;
    }
    host.apply_effect(&args.field(), &Effect::Class(class), switch, skip);
}

/// Switches the required flag together with the required-indicator class.
fn required(host: &RuleHost, args: &ActionArgs, switch: Switch, skip: bool) {
    let field = args.field();
    host.apply_effect(&field, &Effect::Required, switch, skip);
    let indicator = host.config().class_names().required_indicator.clone();
    if !indicator.is_empty() {
        host.apply_effect(&field, &Effect::Class(indicator), switch, skip);
    }
}

/// Writes its second argument as the field value, if given.
fn val(host: &RuleHost, args: ActionArgs, _skip: bool) {
    if let Some(value) = args.get(1) {
        host.set_value(&args.field(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::MemoryForm;
    use crate::types::{ClassNames, Value};
    use crate::EngineConfigBuilder;

    fn host() -> RuleHost {
        let form = MemoryForm::new("f")
            .text("name", "")
            .checkbox("agree", "yes", false)
            .options("size", &["s", "m", "l"], Some("m"));
        let config = EngineConfigBuilder::with_defaults()
            .class_names(ClassNames {
                required_indicator: "is-required".into(),
                collapse_show: "open".into(),
            })
            .build()
            .unwrap();
        RuleHost::new(form, Rc::new(config))
    }

    fn run(host: &RuleHost, action: &str, args: impl Into<ActionArgs>) {
        let report = host.apply_actions(action, args, false, false);
        assert!(report.is_clean(), "{report}");
    }

    #[test]
    fn default_names_are_unique() {
        let names: Vec<&str> = defaults().into_iter().map(|(name, _)| name).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), names.len());
    }

    #[test]
    fn visibility_family() {
        let host = host();
        run(&host, "hide", "name");
        assert!(!host.state("name")[0].visible);
        run(&host, "toggle", "name");
        assert!(host.state("name")[0].visible);
        run(&host, "fadeOut", "name");
        run(&host, "slideDown", "name");
        assert!(host.state("name")[0].visible);
    }

    #[test]
    fn class_family() {
        let host = host();
        run(&host, "addClass", ["name", "highlight"]);
        assert!(host.state("name")[0].has_class("highlight"));
        run(&host, "class", ["name", "toggle", "highlight"]);
        assert!(!host.state("name")[0].has_class("highlight"));
        run(&host, "showCollapse", "name");
        assert!(host.state("name")[0].has_class("open"));
        run(&host, "collapse", ["name", "unset"]);
        assert!(!host.state("name")[0].has_class("open"));
    }

    #[test]
    fn required_sets_indicator_class() {
        let host = host();
        run(&host, "setRequired", "name");
        let state = &host.state("name")[0];
        assert!(state.required);
        assert!(state.has_class("is-required"));
        assert!(!state.valid);
        run(&host, "required", ["name", "unset"]);
        let state = &host.state("name")[0];
        assert!(!state.required && !state.has_class("is-required"));
    }

    #[test]
    fn checked_family_and_readonly() {
        let host = host();
        run(&host, "setChecked", "agree");
        assert_eq!(host.value("agree"), Some(Value::from("yes")));
        run(&host, "checked", ["agree", "toggle"]);
        assert_eq!(host.value("agree"), Some(Value::Int(0)));
        run(&host, "readonly", ["name", "set"]);
        assert!(host.state("name")[0].readonly);
        run(&host, "unsetReadonly", "name");
        assert!(!host.state("name")[0].readonly);
    }

    #[test]
    fn enable_disable() {
        let host = host();
        run(&host, "disable", "name");
        assert!(host.state("name")[0].disabled);
        run(&host, "enable", "name");
        assert!(!host.state("name")[0].disabled);
    }

    #[test]
    fn hiding_selected_option_moves_selection() {
        let host = host();
        run(&host, "hideOption", "size:m");
        assert_eq!(host.value("size"), Some(Value::from("s")));
        run(&host, "showOption", "size:m");
        assert!(!host.state("size:m")[0].hidden);
    }

    #[test]
    fn val_writes_only_with_a_value() {
        let host = host();
        run(&host, "val", ActionArgs::from("name").arg("Ada"));
        assert_eq!(host.value("name"), Some(Value::from("Ada")));
        run(&host, "val", "name");
        assert_eq!(host.value("name"), Some(Value::from("Ada")));
    }
}
