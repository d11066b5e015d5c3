use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use formlogic::{EngineConfigBuilder, MemoryForm, RuleHost};

/// `rules` rules, each watching checkbox `c{i % fields}` and toggling the
/// visibility of its own target.
fn build_host(fields: usize, rules: usize) -> RuleHost {
    let mut form = MemoryForm::new("bench");
    for i in 0..fields {
        form = form.checkbox(&format!("c{i}"), "1", false);
    }
    for i in 0..rules {
        form = form.text(&format!("t{i}"), "");
    }
    let config = EngineConfigBuilder::with_defaults().build().unwrap();
    let host = RuleHost::new(form, Rc::new(config));

    for i in 0..rules {
        let watched = format!("c{}", i % fields);
        host.when(true, watched.as_str())
            .then("show", format!("t{i}"));
    }
    host
}

fn bench_input_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("input_throughput");

    for &rules in &[1, 10, 50] {
        let host = build_host(5, rules);
        let mut on = false;
        group.bench_function(&format!("{rules}_rules"), |b| {
            b.iter(|| {
                on = !on;
                host.input(black_box("c0"), on);
            });
        });
    }

    group.finish();
}

fn bench_negation(c: &mut Criterion) {
    let mut group = c.benchmark_group("negation");
    let config = Rc::new(EngineConfigBuilder::with_defaults().build().unwrap());

    group.bench_function("memoized", |b| {
        let host = RuleHost::new(MemoryForm::new("f"), Rc::clone(&config));
        let _ = host.action_negative("addClass");
        b.iter(|| black_box(host.action_negative(black_box("addClass"))));
    });

    // misses are never memoized and search the affix tables every time
    group.bench_function("miss", |b| {
        let host = RuleHost::new(MemoryForm::new("f"), Rc::clone(&config));
        b.iter(|| black_box(host.action_negative(black_box("val"))));
    });

    group.bench_function("first_resolution", |b| {
        b.iter(|| {
            let host = RuleHost::new(MemoryForm::new("f"), Rc::clone(&config));
            black_box(host.action_negative("fadeIn"))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_input_throughput, bench_negation);
criterion_main!(benches);
