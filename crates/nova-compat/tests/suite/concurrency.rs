use std::collections::HashMap;
use std::sync::Arc;

use nova_compat::{ClassResolver, CompatChecker, CompatOptions, Result, SymbolCache};
use nova_types::{ClassSymbol, TypeStore};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

use super::fixture::{self, *};

/// Counts resolver calls per class name.
struct CountingResolver {
    store: TypeStore,
    calls: Mutex<HashMap<String, usize>>,
}

impl CountingResolver {
    fn new(store: TypeStore) -> Self {
        Self {
            store,
            calls: Mutex::new(HashMap::new()),
        }
    }

    fn calls(&self) -> HashMap<String, usize> {
        self.calls.lock().clone()
    }
}

impl ClassResolver for CountingResolver {
    fn resolve_class(&self, name: &str) -> Result<Option<ClassSymbol>> {
        *self.calls.lock().entry(name.to_string()).or_default() += 1;
        // Widen the window in which concurrent lookups of the same name overlap.
        std::thread::yield_now();
        self.store.resolve_class(name)
    }
}

#[test]
fn concurrent_lookups_resolve_each_class_once() {
    let resolver = Arc::new(CountingResolver::new(fixture::store()));
    let cache = SymbolCache::new(resolver.clone());

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for root in ROOTS {
                    cache.resolve_closure(root).expect("fixture resolves");
                }
            });
        }
    });

    let calls = resolver.calls();
    assert!(calls.contains_key(COMPATIBLE_COMPAT));
    assert!(calls.contains_key(MOVABLE_COMPAT));
    for (name, count) in &calls {
        assert_eq!((name.as_str(), *count), (name.as_str(), 1));
    }
    assert_eq!(cache.resolution_count(), calls.len());
}

#[test]
fn parallel_verification_matches_sequential_and_keeps_input_order() {
    let classes = [MOVABLE_IMPL, SUB_COMPATIBLE, COMPATIBLE, ANOTHER_COMPATIBLE];

    let parallel = CompatChecker::new(
        fixture::store(),
        CompatOptions {
            threads: 4,
            ..CompatOptions::default()
        },
    );
    let parallel_reports: Vec<_> = parallel
        .verify_all(&classes)
        .unwrap()
        .into_iter()
        .map(|report| report.unwrap())
        .collect();

    let sequential = CompatChecker::new(
        fixture::store(),
        CompatOptions {
            threads: 1,
            ..CompatOptions::default()
        },
    );
    let session = sequential.resolve(ROOTS).unwrap();
    let sequential_reports: Vec<_> = classes
        .iter()
        .map(|class| session.verify(class).unwrap())
        .collect();

    let names: Vec<&str> = parallel_reports.iter().map(|r| r.class.as_str()).collect();
    assert_eq!(names, classes.to_vec());
    assert_eq!(parallel_reports, sequential_reports);

    // Same inputs, same answers.
    let again: Vec<_> = parallel
        .verify_all(&classes)
        .unwrap()
        .into_iter()
        .map(|report| report.unwrap())
        .collect();
    assert_eq!(again, parallel_reports);
}

#[test]
fn one_failing_class_does_not_poison_the_batch() {
    let mut store = fixture::store();
    store.upsert_class(ClassSymbol::class("broken.Orphan").extends("broken.Missing"));
    let checker = CompatChecker::new(store, CompatOptions::default());

    let session = checker.resolve(ROOTS).unwrap();
    let results = session.verify_all(&[COMPATIBLE, "broken.Orphan"]);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
}

#[test]
fn batch_keeps_going_past_an_unresolvable_root() {
    let mut store = fixture::store();
    store.upsert_class(ClassSymbol::class("broken.Orphan").extends("broken.Missing"));
    let checker = CompatChecker::new(store, CompatOptions::default());

    let results = checker
        .verify_all(&[COMPATIBLE, "broken.Orphan", MOVABLE_IMPL])
        .expect("bindings build");
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(matches!(
        &results[1],
        Err(nova_compat::CompatError::UnresolvedReference { name, .. }) if name == "broken.Missing"
    ));
    assert_eq!(
        results[2].as_ref().map(|report| report.is_clean()),
        Ok(true)
    );
}
