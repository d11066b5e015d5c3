use std::fmt;

use super::error::DispatchError;

/// Label recorded for custom (closure) action tokens.
pub const CUSTOM_ACTION: &str = "<custom>";

/// Outcome of one [`apply_actions`](crate::dispatch::apply_actions) call.
///
/// Lists the actions that ran, the tokens skipped because no negative could be
/// resolved, and non-fatal errors such as unknown action names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use]
pub struct DispatchReport {
    applied: Vec<String>,
    skipped: Vec<String>,
    errors: Vec<DispatchError>,
}

impl DispatchReport {
    pub(crate) fn applied_action(&mut self, name: impl Into<String>) {
        self.applied.push(name.into());
    }

    pub(crate) fn skipped_action(&mut self, name: impl Into<String>) {
        self.skipped.push(name.into());
    }

    pub(crate) fn error(&mut self, error: DispatchError) {
        self.errors.push(error);
    }

    /// Actions that were invoked, in order, after negation.
    #[must_use]
    pub fn applied(&self) -> &[String] {
        &self.applied
    }

    /// Tokens whose negative could not be resolved.
    #[must_use]
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    #[must_use]
    pub fn errors(&self) -> &[DispatchError] {
        &self.errors
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for DispatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "applied: [{}]", self.applied.join(", "))?;
        if !self.skipped.is_empty() {
            write!(f, ", skipped: [{}]", self.skipped.join(", "))?;
        }
        if !self.errors.is_empty() {
            let errors: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
            write!(f, ", errors: [{}]", errors.join("; "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_accessors() {
        let mut report = DispatchReport::default();
        report.applied_action("show");
        report.skipped_action("toggle");
        report.error(DispatchError::UnknownAction {
            name: "nope".into(),
        });

        assert_eq!(report.applied(), &["show"]);
        assert_eq!(report.skipped(), &["toggle"]);
        assert_eq!(report.errors().len(), 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn report_display() {
        let mut report = DispatchReport::default();
        report.applied_action("show");
        report.applied_action(CUSTOM_ACTION);
        assert_eq!(report.to_string(), "applied: [show, <custom>]");

        report.error(DispatchError::UnknownAction {
            name: "nope".into(),
        });
        assert!(report.to_string().contains("errors: [unknown action 'nope']"));
    }
}
