use std::sync::Arc;

use nova_compat::{CompatChecker, CompatOptions, Verdict};
use nova_config::{init_tracing, LoggingConfig};
use nova_types::{ClassSymbol, MemberSymbol, Type, TypeStore};

use super::fixture::{compat, target_api};

const OWNER: &str = "logged.Owner";
const OWNER_COMPAT: &str = "logged.OwnerCompat";

fn store() -> TypeStore {
    let mut store = TypeStore::with_minimal_jdk();
    store.upsert_class(
        ClassSymbol::class(OWNER)
            .extends("java.lang.Object")
            .annotated(compat(OWNER_COMPAT))
            .with_member(MemberSymbol::method("ping", Type::Void).annotated(target_api(100))),
    );
    store.upsert_class(
        ClassSymbol::class(OWNER_COMPAT)
            .extends("java.lang.Object")
            .with_member(
                MemberSymbol::method("ping", Type::Void)
                    .set_static()
                    .param(Type::class(OWNER)),
            ),
    );
    store
}

// The only test in this binary that installs the global subscriber.
#[test]
fn verdict_events_reach_the_log_buffer_and_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("compat.log");
    let logging = LoggingConfig {
        level: "warn,nova.compat=debug".to_owned(),
        json: false,
        stderr: false,
        file: Some(path.clone()),
        buffer_lines: 100_000,
    };

    let buffer = init_tracing(&logging);
    assert!(Arc::ptr_eq(&buffer, &init_tracing(&logging)));

    let checker = CompatChecker::new(store(), CompatOptions::default());
    let session = checker.resolve([OWNER]).unwrap();
    let report = session.verify(OWNER).unwrap();
    assert_eq!(report.verdict_for("ping"), Some(&Verdict::Compatible));

    let is_verdict_line =
        |line: &str| line.contains("nova.compat") && line.contains("receiver=logged.Owner");

    let lines = buffer.last_lines(100_000);
    let verdict_line = lines
        .iter()
        .find(|line| is_verdict_line(line.as_str()))
        .unwrap_or_else(|| panic!("no verdict event in {lines:#?}"));
    assert!(verdict_line.contains("COMPAT_OK"), "{verdict_line}");
    assert!(verdict_line.contains("required_api=100"), "{verdict_line}");

    let file = std::fs::read_to_string(&path).unwrap();
    assert!(file.lines().any(is_verdict_line), "{file}");
}
