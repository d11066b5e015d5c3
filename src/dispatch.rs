use crate::types::{
    ActionArgs, ActionToken, Actions, DispatchError, DispatchReport, CUSTOM_ACTION,
};
use crate::RuleHost;

/// Apply `actions` in order against `host`.
///
/// With `negate` set, every named action is replaced by its negative; tokens
/// without one (custom closures included) are skipped. Each named action gets
/// its own copy of `args`. Unknown names are logged and reported, and the
/// remaining tokens still run.
pub fn apply_actions(
    host: &RuleHost,
    actions: &Actions,
    args: &ActionArgs,
    negate: bool,
    skip_transition: bool,
) -> DispatchReport {
    let mut report = DispatchReport::default();

    for token in actions.tokens() {
        match token {
            ActionToken::Custom(f) => {
                if negate {
                    tracing::debug!("custom actions have no negative");
                    report.skipped_action(CUSTOM_ACTION);
                    continue;
                }
                f(skip_transition);
                report.applied_action(CUSTOM_ACTION);
            }
            ActionToken::Named(name) => {
                let name = if negate {
                    match host.action_negative(name) {
                        Some(negative) => negative,
                        None => {
                            report.skipped_action(name.as_str());
                            continue;
                        }
                    }
                } else {
                    name.clone()
                };

                match host.action_fn(&name) {
                    Some(f) => {
                        tracing::trace!(action = %name, skip_transition, "applying action");
                        f(host, args.clone(), skip_transition);
                        report.applied_action(name);
                    }
                    None => {
                        tracing::error!(action = %name, form = %host.id(), "unknown action");
                        report.error(DispatchError::UnknownAction { name });
                    }
                }
            }
        }
    }

    report
}
