use nova_compat::{CompatChecker, CompatOptions, Verdict};
use nova_config::CompatConfig;
use pretty_assertions::assert_eq;

use super::fixture::{self, COMPATIBLE};

#[test]
fn options_follow_the_loaded_config() {
    let (config, diagnostics) = CompatConfig::load_from_str_with_diagnostics(
        r#"
[annotations]
gates = ["android.annotation.TargetApi"]

[analysis]
min_api = 21
threads = 2
allow_value_vararg = true
"#,
    )
    .expect("config should parse");
    assert!(diagnostics.is_empty(), "{diagnostics:?}");

    let options = CompatOptions::from(&config);
    assert_eq!(options.shim_annotation, "kotlin.android.Compat");
    assert_eq!(
        options.gates.annotations,
        vec!["android.annotation.TargetApi".to_string()]
    );
    assert_eq!(options.gates.min_api, 21);
    assert_eq!(options.threads, 2);
    assert!(options.policy.allow_value_vararg);

    let checker = CompatChecker::new(fixture::store(), options);
    let session = checker.resolve([COMPATIBLE]).unwrap();
    let report = session.verify(COMPATIBLE).unwrap();
    assert_eq!(report.min_api, 21);
    assert_eq!(report.verdict_for("valueVararg"), Some(&Verdict::Compatible));
}

#[test]
fn zero_threads_still_verifies() {
    let mut config = CompatConfig::default();
    config.analysis.threads = Some(0);
    let options = CompatOptions::from(&config);
    assert_eq!(options.threads, 1);

    let checker = CompatChecker::new(fixture::store(), options);
    let reports = checker.verify_all(&[COMPATIBLE]).unwrap();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].is_ok());
}

#[test]
fn unrecognized_gate_annotation_gates_nothing() {
    let mut config = CompatConfig::default();
    config.annotations.gates = vec!["com.example.Since".to_string()];

    let checker = CompatChecker::new(fixture::store(), CompatOptions::from(&config));
    let session = checker.resolve([COMPATIBLE]).unwrap();
    assert!(session.verify(COMPATIBLE).unwrap().entries.is_empty());
}
