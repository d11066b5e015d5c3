//! The DNF query engine.
//!
//! A [`Query`] holds a disjunction of clauses, each a conjunction of
//! [`ConditionNode`]s. Bracketed sub-expressions are child queries added to
//! their parent as ordinary conditions. Only the root of such a tree keeps
//! state: the last observed result, the pause flag, the direct-action mode and
//! the callbacks. Children forward all of these to the root.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::types::{ConditionNode, Evaluate};

/// Invoked with `(state, skip_transition)` whenever the root's result changes.
pub type Callback = Rc<dyn Fn(bool, bool)>;

struct QueryInner {
    parent: Option<Weak<QueryInner>>,
    clauses: RefCell<Vec<Vec<ConditionNode>>>,
    last_state: Cell<Option<bool>>,
    paused: Cell<bool>,
    negate_direct_action: Cell<bool>,
    callbacks: RefCell<Vec<Callback>>,
}

impl QueryInner {
    fn new(parent: Option<Weak<QueryInner>>) -> Self {
        Self {
            parent,
            clauses: RefCell::new(vec![Vec::new()]),
            last_state: Cell::new(None),
            paused: Cell::new(false),
            negate_direct_action: Cell::new(false),
            callbacks: RefCell::new(Vec::new()),
        }
    }
}

/// Shared handle to one node of a query tree.
#[derive(Clone)]
pub struct Query {
    inner: Rc<QueryInner>,
}

impl Default for Query {
    fn default() -> Self {
        Self::new()
    }
}

impl Query {
    /// A root query with a single, empty (always true) clause.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(QueryInner::new(None)),
        }
    }

    /// A bracketed sub-query whose state lives in `parent`'s root.
    #[must_use]
    pub fn child_of(parent: &Query) -> Self {
        Self {
            inner: Rc::new(QueryInner::new(Some(Rc::downgrade(&parent.inner)))),
        }
    }

    #[must_use]
    pub fn parent(&self) -> Option<Query> {
        self.inner
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|inner| Query { inner })
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent().is_none()
    }

    /// The query holding this tree's state.
    #[must_use]
    pub fn root(&self) -> Query {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// OR over clauses of AND over conditions.
    #[must_use]
    pub fn evaluate(&self) -> bool {
        self.inner
            .clauses
            .borrow()
            .iter()
            .any(|clause| clause.iter().all(ConditionNode::evaluate))
    }

    /// Re-evaluate the tree and fire the callbacks if the result changed.
    ///
    /// The first evaluation always fires, with `skip_transition` set. The new
    /// state is recorded before any callback runs, so a nested trigger from
    /// inside a callback sees it.
    pub fn trigger(&self) {
        let root = self.root();
        if root.inner.paused.get() {
            tracing::trace!("trigger ignored while paused");
            return;
        }

        let state = root.evaluate();
        let last = root.inner.last_state.get();
        if last == Some(state) {
            return;
        }
        root.inner.last_state.set(Some(state));

        let skip_transition = last.is_none();
        tracing::debug!(state, skip_transition, "query state changed");

        let callbacks = root.inner.callbacks.borrow().clone();
        for callback in callbacks {
            callback(state, skip_transition);
        }
    }

    pub fn pause(&self) {
        self.root().inner.paused.set(true);
    }

    pub fn resume(&self) {
        self.root().inner.paused.set(false);
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.root().inner.paused.get()
    }

    /// The last observed result; `None` until the first trigger.
    #[must_use]
    pub fn last_state(&self) -> Option<bool> {
        self.root().inner.last_state.get()
    }

    /// Append a condition to the open clause. Conditions with observable
    /// internal state re-trigger this query when they change.
    pub fn add_condition(&self, node: ConditionNode) {
        if let Some(clause) = self.inner.clauses.borrow_mut().last_mut() {
            clause.push(node.clone());
        }
        let query = Rc::downgrade(&self.inner);
        node.on_change(Rc::new(move || {
            if let Some(inner) = query.upgrade() {
                Query { inner }.trigger();
            }
        }));
    }

    /// Open a new clause.
    pub fn or(&self) {
        self.inner.clauses.borrow_mut().push(Vec::new());
    }

    /// Conditions join the open clause anyway; kept for symmetry with [`or`](Self::or).
    pub fn and(&self) {}

    /// Register a callback at the root.
    ///
    /// If the root was never triggered this triggers it; otherwise the new
    /// callback alone is synchronised with the current result.
    pub fn add_callback(&self, callback: Callback) {
        let root = self.root();
        root.inner.callbacks.borrow_mut().push(Rc::clone(&callback));
        if root.inner.last_state.get().is_none() {
            root.trigger();
        } else {
            callback(root.evaluate(), true);
        }
    }

    /// Whether direct actions currently attach as negated callbacks.
    #[must_use]
    pub fn negate_direct_action(&self) -> bool {
        self.root().inner.negate_direct_action.get()
    }

    pub fn set_negate_direct_action(&self, negate: bool) {
        self.root().inner.negate_direct_action.set(negate);
    }

    #[must_use]
    pub fn clause_count(&self) -> usize {
        self.inner.clauses.borrow().len()
    }

    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.root().inner.callbacks.borrow().len()
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Query) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Evaluate for Query {
    fn evaluate(&self) -> bool {
        Query::evaluate(self)
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("clauses", &self.inner.clauses.borrow().len())
            .field("root", &self.inner.parent.is_none())
            .field("last_state", &self.inner.last_state.get())
            .field("paused", &self.inner.paused.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flag(initial: bool) -> (Rc<Cell<bool>>, ConditionNode) {
        let cell = Rc::new(Cell::new(initial));
        let seen = Rc::clone(&cell);
        (cell, ConditionNode::from_fn(move || seen.get()))
    }

    fn recorder(query: &Query) -> Rc<RefCell<Vec<(bool, bool)>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        query.add_callback(Rc::new(move |state: bool, skip: bool| {
            sink.borrow_mut().push((state, skip));
        }));
        log
    }

    #[test]
    fn empty_query_is_true() {
        let query = Query::new();
        assert!(query.evaluate());
        assert_eq!(query.clause_count(), 1);
    }

    #[test]
    fn and_within_clause_or_across() {
        let query = Query::new();
        let (a, node_a) = flag(true);
        let (_, node_b) = flag(false);
        let (c, node_c) = flag(false);
        query.add_condition(node_a);
        query.and();
        query.add_condition(node_b);
        assert!(!query.evaluate());
        query.or();
        query.add_condition(node_c);
        assert!(!query.evaluate());
        c.set(true);
        assert!(query.evaluate());
        a.set(false);
        c.set(false);
        assert!(!query.evaluate());
    }

    #[test]
    fn first_trigger_fires_with_skip() {
        let query = Query::new();
        let (_, node) = flag(false);
        query.add_condition(node);
        let log = recorder(&query);
        assert_eq!(*log.borrow(), [(false, true)]);
        assert_eq!(query.last_state(), Some(false));
    }

    #[test]
    fn fires_only_on_change() {
        let query = Query::new();
        let (cell, node) = flag(false);
        query.add_condition(node);
        let log = recorder(&query);
        query.trigger();
        cell.set(true);
        query.trigger();
        query.trigger();
        cell.set(false);
        query.trigger();
        assert_eq!(*log.borrow(), [(false, true), (true, false), (false, false)]);
    }

    #[test]
    fn late_callback_is_synchronised_alone() {
        let query = Query::new();
        let (cell, node) = flag(true);
        query.add_condition(node);
        let first = recorder(&query);
        cell.set(false);
        let second = recorder(&query);
        assert_eq!(*first.borrow(), [(true, true)]);
        assert_eq!(*second.borrow(), [(false, true)]);
        assert_eq!(query.last_state(), Some(true));
        query.trigger();
        assert_eq!(first.borrow().len(), 2);
        assert_eq!(second.borrow()[1], (false, false));
    }

    #[test]
    fn pause_swallows_triggers() {
        let query = Query::new();
        let (cell, node) = flag(false);
        query.add_condition(node);
        let log = recorder(&query);
        query.pause();
        cell.set(true);
        query.trigger();
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(query.last_state(), Some(false));
        query.resume();
        query.trigger();
        assert_eq!(log.borrow()[1], (true, false));
    }

    #[test]
    fn children_delegate_to_root() {
        let root = Query::new();
        let child = Query::child_of(&root);
        root.add_condition(ConditionNode::new(child.clone()));
        let (cell, node) = flag(false);
        child.add_condition(node);

        assert!(child.root().ptr_eq(&root));
        assert!(!child.is_root());

        let log = recorder(&child);
        assert_eq!(root.callback_count(), 1);
        child.pause();
        assert!(root.is_paused());
        child.resume();

        cell.set(true);
        child.trigger();
        assert_eq!(*log.borrow(), [(false, true), (true, false)]);
        assert_eq!(child.last_state(), Some(true));

        child.set_negate_direct_action(true);
        assert!(root.negate_direct_action());
    }

    #[test]
    fn nested_trigger_does_not_refire() {
        let query = Query::new();
        let (cell, node) = flag(false);
        query.add_condition(node);
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let inner = query.clone();
        query.add_callback(Rc::new(move |_: bool, _: bool| {
            counter.set(counter.get() + 1);
            inner.trigger();
        }));
        assert_eq!(count.get(), 1);
        cell.set(true);
        query.trigger();
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn observable_conditions_retrigger() {
        struct Observed {
            value: Rc<Cell<bool>>,
            listener: RefCell<Option<Rc<dyn Fn()>>>,
        }
        impl Evaluate for Rc<Observed> {
            fn evaluate(&self) -> bool {
                self.value.get()
            }
            fn on_change(&self, listener: Rc<dyn Fn()>) -> bool {
                *self.listener.borrow_mut() = Some(listener);
                true
            }
        }

        let observed = Rc::new(Observed {
            value: Rc::new(Cell::new(false)),
            listener: RefCell::new(None),
        });
        let query = Query::new();
        query.add_condition(ConditionNode::new(Rc::clone(&observed)));
        let log = recorder(&query);

        observed.value.set(true);
        let listener = observed.listener.borrow().clone().unwrap();
        listener();
        assert_eq!(*log.borrow(), [(false, true), (true, false)]);
    }
}
