mod strategies;

use std::cell::RefCell;
use std::rc::Rc;

use formlogic::JunctionBuilder;
use proptest::prelude::*;
use strategies::{arb_dnf, arb_inputs, build, build_bracketed, host, model, Dnf, Input, FIELDS};

type Log = Rc<RefCell<Vec<(bool, bool)>>>;

fn record(junction: JunctionBuilder) -> (JunctionBuilder, Log) {
    let log: Log = Rc::default();
    let sink = Rc::clone(&log);
    let junction = junction.call(move |state, skip| sink.borrow_mut().push((state, skip)));
    (junction, log)
}

/// Expected callback log: the initial state with skip set, then one entry
/// per input that flips the model's result.
fn expected_log(dnf: &Dnf, inputs: &[Input]) -> Vec<(bool, bool)> {
    let mut checked = vec![false; FIELDS.len()];
    let mut last = model(dnf, &checked);
    let mut log = vec![(last, true)];
    for &(field, value) in inputs {
        checked[field] = value;
        let now = model(dnf, &checked);
        if now != last {
            log.push((now, false));
            last = now;
        }
    }
    log
}

// ---------------------------------------------------------------------------
// Invariant 1: DNF correctness
//
// After every input the query evaluates to OR-of-ANDs over the field states.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn evaluate_matches_model(dnf in arb_dnf(), inputs in arb_inputs()) {
        let host = host();
        let junction = build(&host, &dnf);
        let mut checked = vec![false; FIELDS.len()];
        prop_assert_eq!(junction.evaluate(), model(&dnf, &checked));
        for (field, value) in inputs {
            host.input(FIELDS[field], value);
            checked[field] = value;
            prop_assert_eq!(junction.evaluate(), model(&dnf, &checked));
        }
    }

    #[test]
    fn brackets_do_not_change_the_result(dnf in arb_dnf(), inputs in arb_inputs()) {
        let host = host();
        let flat = build(&host, &dnf);
        let bracketed = build_bracketed(&host, &dnf);
        prop_assert_eq!(flat.evaluate(), bracketed.evaluate());
        for (field, value) in inputs {
            host.input(FIELDS[field], value);
            prop_assert_eq!(flat.evaluate(), bracketed.evaluate());
        }
    }
}

// ---------------------------------------------------------------------------
// Invariant 2: Edge triggering
//
// Callbacks fire once on registration (skip set) and then exactly once per
// change of the result, however many subscriptions a single input hits.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn callbacks_fire_on_edges_only(dnf in arb_dnf(), inputs in arb_inputs()) {
        let host = host();
        let (_junction, log) = record(build(&host, &dnf));
        for &(field, value) in &inputs {
            host.input(FIELDS[field], value);
        }
        prop_assert_eq!(log.borrow().clone(), expected_log(&dnf, &inputs));
    }

    #[test]
    fn bracketed_callbacks_fire_on_edges_only(dnf in arb_dnf(), inputs in arb_inputs()) {
        let host = host();
        let (_junction, log) = record(build_bracketed(&host, &dnf));
        for &(field, value) in &inputs {
            host.input(FIELDS[field], value);
        }
        prop_assert_eq!(log.borrow().clone(), expected_log(&dnf, &inputs));
    }

    #[test]
    fn last_state_tracks_result(dnf in arb_dnf(), inputs in arb_inputs()) {
        let host = host();
        let (junction, _log) = record(build(&host, &dnf));
        for (field, value) in inputs {
            host.input(FIELDS[field], value);
            prop_assert_eq!(junction.query().last_state(), Some(junction.evaluate()));
        }
    }
}

// ---------------------------------------------------------------------------
// Invariant 3: Pause semantics
//
// While paused no callback fires. A trigger after resuming fires at most once,
// and only if the result differs from the state seen before pausing.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn paused_queries_stay_silent(
        dnf in arb_dnf(),
        inputs in arb_inputs(),
    ) {
        let host = host();
        let (junction, log) = record(build(&host, &dnf));
        let before = junction.query().last_state();
        let junction = junction.pause();

        for &(field, value) in &inputs {
            host.input(FIELDS[field], value);
        }
        prop_assert_eq!(log.borrow().len(), 1);
        prop_assert_eq!(junction.query().last_state(), before);

        let junction = junction.resume().trigger();
        let now = junction.evaluate();
        if Some(now) == before {
            prop_assert_eq!(log.borrow().len(), 1);
        } else {
            prop_assert_eq!(log.borrow().last().copied(), Some((now, false)));
            prop_assert_eq!(log.borrow().len(), 2);
        }
    }
}
