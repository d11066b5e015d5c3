#![allow(dead_code)]

use std::rc::Rc;

use formlogic::{EngineConfigBuilder, JunctionBuilder, MemoryForm, RuleHost};
use proptest::prelude::*;

// --- Fixed form schema ---
// c0..c3 : checkboxes with value "1", all unchecked initially.
// A literal `(field, true)` is the condition "true" on that checkbox,
// `(field, false)` is the condition "false".

pub const FIELDS: &[&str] = &["c0", "c1", "c2", "c3"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Literal {
    pub field: usize,
    pub checked: bool,
}

/// Disjunction of conjunctions, never empty.
pub type Dnf = Vec<Vec<Literal>>;

/// A user input: set checkbox `field` to `checked`.
pub type Input = (usize, bool);

pub fn arb_literal() -> impl Strategy<Value = Literal> {
    (0..FIELDS.len(), any::<bool>()).prop_map(|(field, checked)| Literal { field, checked })
}

pub fn arb_dnf() -> impl Strategy<Value = Dnf> {
    prop::collection::vec(prop::collection::vec(arb_literal(), 1..4), 1..4)
}

pub fn arb_inputs() -> impl Strategy<Value = Vec<Input>> {
    prop::collection::vec((0..FIELDS.len(), any::<bool>()), 0..24)
}

/// Reference semantics of a DNF over checkbox states.
pub fn model(dnf: &Dnf, checked: &[bool]) -> bool {
    dnf.iter()
        .any(|clause| clause.iter().all(|lit| checked[lit.field] == lit.checked))
}

pub fn host() -> RuleHost {
    let form = FIELDS
        .iter()
        .fold(MemoryForm::new("props"), |form, id| form.checkbox(id, "1", false));
    let config = EngineConfigBuilder::with_defaults().build().unwrap();
    RuleHost::new(form, Rc::new(config))
}

fn condition(lit: Literal) -> &'static str {
    if lit.checked {
        "true"
    } else {
        "false"
    }
}

/// Build the rule for `dnf` through the fluent API.
pub fn build(host: &RuleHost, dnf: &Dnf) -> JunctionBuilder {
    let mut junction: Option<JunctionBuilder> = None;
    for clause in dnf {
        for (i, &lit) in clause.iter().enumerate() {
            let field = FIELDS[lit.field];
            junction = Some(match junction.take() {
                None => host.when(condition(lit), field),
                Some(open) if i == 0 => open.or_when(condition(lit), field),
                Some(open) => open.and_when(condition(lit), field),
            });
        }
    }
    junction.expect("strategies never produce an empty DNF")
}

/// Build the same expression with every clause wrapped in a bracket.
pub fn build_bracketed(host: &RuleHost, dnf: &Dnf) -> JunctionBuilder {
    let mut junction: Option<JunctionBuilder> = None;
    for clause in dnf {
        let conditions = match junction.take() {
            None => host.query().open_bracket(),
            Some(open) => open.or_open_bracket(),
        };
        let (first, rest) = clause.split_first().expect("clauses are never empty");
        let mut inner = conditions.when(condition(*first), FIELDS[first.field]);
        for &lit in rest {
            inner = inner.and_when(condition(lit), FIELDS[lit.field]);
        }
        junction = Some(inner.close_bracket());
    }
    junction.expect("strategies never produce an empty DNF")
}
