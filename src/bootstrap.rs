//! Startup: bind each scripted form to a [`RuleHost`] and run its rule script.

use std::fmt;
use std::rc::Rc;

use crate::form::FormModel;
use crate::types::{ConfigError, EngineConfig};
use crate::RuleHost;

/// A per-form rule script.
pub type FormScript = Box<dyn FnOnce(&RuleHost)>;

/// Notifications emitted while the scripts run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The script of form `id` has run.
    FormReady { id: String },
    /// Every scripted form has been processed.
    AllReady,
}

/// Collects per-form scripts and runs them against their forms.
///
/// ```
/// use std::rc::Rc;
/// use formlogic::{Bootstrap, EngineConfigBuilder, MemoryForm};
///
/// let config = Rc::new(EngineConfigBuilder::with_defaults().build().unwrap());
/// let hosts = Bootstrap::new(config)
///     .script("signup", |host| {
///         host.when("not-empty", "email").then("show", "newsletter");
///     })
///     .run([MemoryForm::new("signup").text("email", "").checkbox("newsletter", "1", false)])
///     .unwrap();
/// assert!(!hosts[0].state("newsletter")[0].visible);
/// ```
pub struct Bootstrap {
    config: Rc<EngineConfig>,
    scripts: Vec<(String, FormScript)>,
    listeners: Vec<Rc<dyn Fn(&LifecycleEvent)>>,
}

impl Bootstrap {
    #[must_use]
    pub fn new(config: Rc<EngineConfig>) -> Self {
        Self {
            config,
            scripts: Vec::new(),
            listeners: Vec::new(),
        }
    }

    /// Register the script for form `id`. A second script for the same form
    /// replaces the first and keeps its position.
    #[must_use]
    pub fn script(mut self, id: impl Into<String>, script: impl FnOnce(&RuleHost) + 'static) -> Self {
        let id = id.into();
        let script: FormScript = Box::new(script);
        match self.scripts.iter_mut().find(|(existing, _)| *existing == id) {
            Some(slot) => slot.1 = script,
            None => self.scripts.push((id, script)),
        }
        self
    }

    #[must_use]
    pub fn on_event(mut self, listener: impl Fn(&LifecycleEvent) + 'static) -> Self {
        self.listeners.push(Rc::new(listener));
        self
    }

    /// Run every script, in registration order, against the form with the
    /// matching id. Forms without a script are left unmanaged.
    ///
    /// Returns one host per script.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownForm`] before any script runs if a script
    /// names a form that is not in `forms`.
    pub fn run<F>(self, forms: impl IntoIterator<Item = F>) -> Result<Vec<RuleHost>, ConfigError>
    where
        F: FormModel + 'static,
    {
        let mut forms: Vec<Option<F>> = forms.into_iter().map(Some).collect();

        let mut bound = Vec::with_capacity(self.scripts.len());
        for (id, script) in self.scripts {
            let position = forms
                .iter()
                .position(|form| form.as_ref().is_some_and(|f| f.id() == id));
            let Some(form) = position.and_then(|i| forms[i].take()) else {
                tracing::error!(form = %id, "script for unknown form");
                return Err(ConfigError::UnknownForm { id });
            };
            bound.push((id, form, script));
        }

        let mut hosts = Vec::with_capacity(bound.len());
        for (id, form, script) in bound {
            let host = RuleHost::new(form, Rc::clone(&self.config));
            script(&host);
            tracing::debug!(form = %id, "form ready");
            emit(&self.listeners, &LifecycleEvent::FormReady { id });
            hosts.push(host);
        }

        tracing::debug!(forms = hosts.len(), "all forms ready");
        emit(&self.listeners, &LifecycleEvent::AllReady);
        Ok(hosts)
    }
}

fn emit(listeners: &[Rc<dyn Fn(&LifecycleEvent)>], event: &LifecycleEvent) {
    for listener in listeners {
        listener(event);
    }
}

impl fmt::Debug for Bootstrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let forms: Vec<&str> = self.scripts.iter().map(|(id, _)| id.as_str()).collect();
        f.debug_struct("Bootstrap")
            .field("forms", &forms)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
