use std::collections::HashMap;

use nova_classfile::ClassStub;
use nova_compat::{
    ClassReport, CompatChecker, CompatError, CompatOptions, IncompatibleReason, Verdict,
};
use nova_types_bridge::{index_stubs, StubClassResolver};
use pretty_assertions::assert_eq;

use super::stubs::{self, COMPATIBLE, SUB_COMPATIBLE};

fn checker() -> CompatChecker<StubClassResolver<HashMap<String, ClassStub>>> {
    CompatChecker::new(
        StubClassResolver::with_minimal_jdk(index_stubs(stubs::all())),
        CompatOptions::default(),
    )
}

fn verdicts(report: &ClassReport) -> Vec<(String, u32, Verdict)> {
    report
        .entries
        .iter()
        .map(|(gated, verdict)| (gated.member.name.clone(), gated.required_api, verdict.clone()))
        .collect()
}

#[test]
fn stubs_verify_like_source_symbols() {
    let checker = checker();
    let session = checker.resolve([COMPATIBLE]).expect("stubs resolve");
    let report = session.verify(COMPATIBLE).expect("stubs verify");

    assert_eq!(
        verdicts(&report),
        vec![
            ("noArgs".to_string(), 100, Verdict::Compatible),
            (
                "notStaticImCompat".to_string(),
                100,
                Verdict::Incompatible(IncompatibleReason::ShimMemberNotStatic)
            ),
            ("boxing".to_string(), 100, Verdict::Compatible),
            ("vararg".to_string(), 100, Verdict::Compatible),
            ("generic".to_string(), 100, Verdict::Compatible),
            (
                "differentReturnType".to_string(),
                100,
                Verdict::Incompatible(IncompatibleReason::ReturnTypeMismatch)
            ),
            ("viaRequiresApi".to_string(), 26, Verdict::NoCandidate),
        ]
    );
}

#[test]
fn subclass_inherits_the_owner_binding() {
    let checker = checker();
    let session = checker.resolve([SUB_COMPATIBLE]).expect("stubs resolve");
    let report = session.verify(SUB_COMPATIBLE).expect("stubs verify");

    assert_eq!(report.verdict_for("noArgs"), Some(&Verdict::Compatible));
    assert!(report
        .entries
        .iter()
        .all(|(gated, _)| gated.receiver == SUB_COMPATIBLE && gated.is_inherited()));
}

#[test]
fn missing_shim_stub_is_an_unresolved_reference() {
    let checker = checker();
    let err = checker.resolve(["compatible.Orphan"]).err().expect("shim stub is missing");
    assert!(matches!(
        err,
        CompatError::UnresolvedReference { ref name, .. } if name == "compatible.MissingCompat"
    ));
}
