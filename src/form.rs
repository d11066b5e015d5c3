//! The boundary between the rule engine and the form document.
//!
//! [`FormModel`] is everything the engine needs from a form: field resolution,
//! field state, value reads, and idempotent effects. [`MemoryForm`] is an
//! in-memory implementation used by headless hosts and tests.

use crate::{FieldSelector, Value};

/// Opaque position of a field inside a [`FormModel`].
pub type FieldHandle = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Text-like input; always active, its value is its content.
    Text,
    /// Contributes its value only while checked, `0` otherwise.
    Checkbox,
    /// Member of a group sharing one id; only the checked member is active.
    Radio,
    /// Option of a select list; `checked` means selected.
    Option,
}

/// Snapshot of a single field as seen by evaluations and effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldState {
    pub id: String,
    pub kind: FieldKind,
    pub value: String,
    pub checked: bool,
    pub disabled: bool,
    pub required: bool,
    pub readonly: bool,
    pub visible: bool,
    pub hidden: bool,
    pub valid: bool,
    pub classes: Vec<String>,
}

impl FieldState {
    #[must_use]
    pub fn new(id: impl Into<String>, kind: FieldKind, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            value: value.into(),
            checked: false,
            disabled: false,
            required: false,
            readonly: false,
            visible: true,
            hidden: false,
            valid: true,
            classes: Vec::new(),
        }
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    fn is_checkable(&self) -> bool {
        matches!(
            self.kind,
            FieldKind::Checkbox | FieldKind::Radio | FieldKind::Option
        )
    }
}

/// A field property an action can switch on or off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Visible,
    Disabled,
    Required,
    Readonly,
    Checked,
    /// Hidden-and-disabled pair used for select options.
    OptionVisible,
    Class(String),
}

/// How an effect is applied: force on, force off, or flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
    Set,
    Unset,
    Toggle,
}

impl Switch {
    /// The state a field should end up in given its current state.
    #[must_use]
    pub fn next(self, current: bool) -> bool {
        match self {
            Switch::Set => true,
            Switch::Unset => false,
            Switch::Toggle => !current,
        }
    }

    /// Read `"set"`, `"unset"` or `"toggle"`; anything else switches off.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "set" => Switch::Set,
            "toggle" => Switch::Toggle,
            _ => Switch::Unset,
        }
    }
}

/// Contract between the engine and a form document.
///
/// None of these methods fail: unknown handles and unmatched selectors simply
/// produce empty results.
pub trait FormModel {
    /// Identifier of the form itself.
    fn id(&self) -> &str;

    /// Every field of the form, in document order.
    fn all_fields(&self) -> Vec<FieldHandle>;

    /// Fields matching one selector, without duplicates. Value selectors are
    /// honoured in the order they are written.
    fn resolve(&self, selector: &FieldSelector) -> Vec<FieldHandle>;

    fn state(&self, field: FieldHandle) -> Option<FieldState>;

    /// Apply an effect to each field whose state differs from the target.
    /// Returns the fields whose checked state or value changed.
    fn apply(
        &mut self,
        fields: &[FieldHandle],
        effect: &Effect,
        switch: Switch,
        skip_transition: bool,
    ) -> Vec<FieldHandle>;

    /// Write a value. Checkable fields are checked when their own value
    /// matches, or switched by a boolean. Returns the fields that changed.
    fn write_value(&mut self, fields: &[FieldHandle], value: &Value) -> Vec<FieldHandle>;

    /// Value of the first active field in `fields`.
    ///
    /// Radio buttons and select options are active only when checked; when
    /// none is checked the group reads as `0`. A checkbox reads as its value when checked and `0`
    /// otherwise.
    fn group_value(&self, fields: &[FieldHandle]) -> Option<Value> {
        let mut result = None;
        for &field in fields {
            let Some(state) = self.state(field) else {
                continue;
            };
            match state.kind {
                FieldKind::Radio | FieldKind::Option => {
                    if state.checked {
                        return Some(Value::String(state.value));
                    }
                    result = Some(Value::Int(0));
                }
                FieldKind::Checkbox => {
                    return Some(if state.checked {
                        Value::String(state.value)
                    } else {
                        Value::Int(0)
                    });
                }
                FieldKind::Text => return Some(Value::String(state.value)),
            }
        }
        result
    }

    fn read_value(&self, field: FieldHandle) -> Option<Value> {
        self.group_value(&[field])
    }
}

/// In-memory form document.
///
/// Fields sharing an id form a multi-valued group (radio buttons, checkbox
/// sets, select options); value selectors pick members by their value.
#[derive(Debug, Clone)]
pub struct MemoryForm {
    id: String,
    fields: Vec<FieldState>,
}

impl MemoryForm {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, state: FieldState) -> Self {
        self.fields.push(state);
        self.refresh_validity();
        self
    }

    #[must_use]
    pub fn text(self, id: &str, value: &str) -> Self {
        self.field(FieldState::new(id, FieldKind::Text, value))
    }

    #[must_use]
    pub fn checkbox(self, id: &str, value: &str, checked: bool) -> Self {
        let mut state = FieldState::new(id, FieldKind::Checkbox, value);
        state.checked = checked;
        self.field(state)
    }

    #[must_use]
    pub fn radio_group(mut self, id: &str, values: &[&str], checked: Option<&str>) -> Self {
        for value in values {
            let mut state = FieldState::new(id, FieldKind::Radio, *value);
            state.checked = checked == Some(*value);
            self = self.field(state);
        }
        self
    }

    #[must_use]
    pub fn options(mut self, id: &str, values: &[&str], selected: Option<&str>) -> Self {
        for value in values {
            let mut state = FieldState::new(id, FieldKind::Option, *value);
            state.checked = selected == Some(*value);
            self = self.field(state);
        }
        self
    }

    fn current(state: &FieldState, effect: &Effect) -> bool {
        match effect {
            Effect::Visible => state.visible,
            Effect::Disabled => state.disabled,
            Effect::Required => state.required,
            Effect::Readonly => state.readonly,
            Effect::Checked => state.is_checkable() && state.checked,
            Effect::OptionVisible => !state.hidden || !state.disabled,
            Effect::Class(class) => state.has_class(class),
        }
    }

    /// Sets `field` to `on`; returns whether its checked state changed.
    fn update(&mut self, field: FieldHandle, effect: &Effect, on: bool) -> bool {
        let Some(state) = self.fields.get_mut(field) else {
            return false;
        };
        match effect {
            Effect::Visible => state.visible = on,
            Effect::Disabled => state.disabled = on,
            Effect::Required => state.required = on,
            Effect::Readonly => state.readonly = on,
            Effect::OptionVisible => {
                state.hidden = !on;
                state.disabled = !on;
            }
            Effect::Class(class) => {
                if on {
                    state.classes.push(class.clone());
                } else {
                    state.classes.retain(|c| c != class);
                }
            }
            Effect::Checked => {
                if !state.is_checkable() {
                    return false;
                }
                state.checked = on;
                if on && state.kind == FieldKind::Radio {
                    let group = state.id.clone();
                    for (i, other) in self.fields.iter_mut().enumerate() {
                        if i != field && other.kind == FieldKind::Radio && other.id == group {
                            other.checked = false;
                        }
                    }
                }
                return true;
            }
        }
        false
    }

    /// Moves the selection off options that were just hidden.
    fn sanitize_options(&mut self, fields: &[FieldHandle]) {
        for &field in fields {
            let Some(option) = self.fields.get(field) else {
                continue;
            };
            if option.kind != FieldKind::Option || !(option.hidden && option.disabled) {
                continue;
            }
            if !option.checked {
                continue;
            }
            let group = option.id.clone();
            self.fields[field].checked = false;
            if let Some(fallback) = self
                .fields
                .iter_mut()
                .find(|f| f.id == group && f.kind == FieldKind::Option && (!f.hidden || !f.disabled))
            {
                fallback.checked = true;
            }
        }
    }

    fn refresh_validity(&mut self) {
        let snapshot = self.fields.clone();
        for field in &mut self.fields {
            field.valid = !field.required
                || match field.kind {
                    FieldKind::Text => !field.value.is_empty(),
                    FieldKind::Checkbox => field.checked,
                    FieldKind::Radio | FieldKind::Option => snapshot
                        .iter()
                        .any(|f| f.id == field.id && f.kind == field.kind && f.checked),
                };
        }
    }
}

impl FormModel for MemoryForm {
    fn id(&self) -> &str {
        &self.id
    }

    fn all_fields(&self) -> Vec<FieldHandle> {
        (0..self.fields.len()).collect()
    }

    fn resolve(&self, selector: &FieldSelector) -> Vec<FieldHandle> {
        let members: Vec<FieldHandle> = if selector.is_form() || selector.name() == self.id {
            self.all_fields()
        } else {
            self.fields
                .iter()
                .enumerate()
                .filter(|(_, f)| f.id == selector.name())
                .map(|(i, _)| i)
                .collect()
        };

        if selector.values().is_empty() {
            return members;
        }

        let mut result = Vec::new();
        for value in selector.values() {
            for &member in &members {
                if self.fields[member].value == *value && !result.contains(&member) {
                    result.push(member);
                }
            }
        }
        result
    }

    fn state(&self, field: FieldHandle) -> Option<FieldState> {
        self.fields.get(field).cloned()
    }

    fn apply(
        &mut self,
        fields: &[FieldHandle],
        effect: &Effect,
        switch: Switch,
        _skip_transition: bool,
    ) -> Vec<FieldHandle> {
        let mut changed = Vec::new();
        for &field in fields {
            let Some(state) = self.fields.get(field) else {
                continue;
            };
            let current = Self::current(state, effect);
            let next = switch.next(current);
            if current != next && self.update(field, effect, next) {
                changed.push(field);
            }
        }
        if *effect == Effect::OptionVisible {
            self.sanitize_options(fields);
        }
        self.refresh_validity();
        changed
    }

    fn write_value(&mut self, fields: &[FieldHandle], value: &Value) -> Vec<FieldHandle> {
        let mut changed = Vec::new();
        for &field in fields {
            let Some(state) = self.fields.get(field) else {
                continue;
            };
            if state.is_checkable() {
                let switch = match value {
                    Value::Bool(on) => Some(if *on { Switch::Set } else { Switch::Unset }),
                    other if state.value == other.as_text() => Some(Switch::Set),
                    _ => None,
                };
                if let Some(switch) = switch {
                    changed.extend(self.apply(&[field], &Effect::Checked, switch, false));
                }
            } else {
                let text = value.as_text();
                if state.value != text {
                    self.fields[field].value = text.into_owned();
                    changed.push(field);
                }
            }
        }
        self.refresh_validity();
        changed
    }
}
