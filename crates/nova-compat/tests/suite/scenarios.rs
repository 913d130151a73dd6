use nova_compat::{
    ClassReport, CompatChecker, CompatError, CompatOptions, IncompatibleReason, MatchPolicy,
    Verdict,
};
use nova_types::{ClassSymbol, TypeStore};
use pretty_assertions::assert_eq;

use super::fixture::{self, *};

fn report_for(class: &str) -> ClassReport {
    let checker = CompatChecker::new(fixture::store(), CompatOptions::default());
    let session = checker.resolve(ROOTS).expect("fixture resolves");
    session.verify(class).expect("fixture verifies")
}

fn verdicts(report: &ClassReport) -> Vec<(String, Verdict)> {
    report
        .entries
        .iter()
        .map(|(gated, verdict)| (gated.member.name.clone(), verdict.clone()))
        .collect()
}

fn param_mismatch(position: usize) -> Verdict {
    Verdict::Incompatible(IncompatibleReason::ParameterTypeMismatch { position })
}

#[test]
fn compatible_members_match_their_shims() {
    let report = report_for(COMPATIBLE);

    assert_eq!(
        verdicts(&report),
        vec![
            ("noArgs".to_string(), Verdict::Compatible),
            (
                "notStaticImCompat".to_string(),
                Verdict::Incompatible(IncompatibleReason::ShimMemberNotStatic)
            ),
            ("subtype".to_string(), Verdict::Compatible),
            ("subtypeOverride".to_string(), Verdict::Compatible),
            ("boxing".to_string(), Verdict::Compatible),
            ("boxingResult".to_string(), Verdict::Compatible),
            ("vararg".to_string(), Verdict::Compatible),
            ("varargBoxing".to_string(), param_mismatch(1)),
            ("valueVararg".to_string(), param_mismatch(1)),
            ("generic".to_string(), Verdict::Compatible),
            ("samAdapter".to_string(), Verdict::Compatible),
            ("differentParamType".to_string(), param_mismatch(1)),
            (
                "differentReturnType".to_string(),
                Verdict::Incompatible(IncompatibleReason::ReturnTypeMismatch)
            ),
            ("subtypeParam".to_string(), param_mismatch(1)),
            ("multipleParams".to_string(), Verdict::Compatible),
            ("implicitThisInSubtype".to_string(), Verdict::Compatible),
        ]
    );
}

#[test]
fn subclass_uses_ancestor_shim_with_itself_as_receiver() {
    let report = report_for(SUB_COMPATIBLE);

    let (gated, verdict) = &report.entries[0];
    assert_eq!(gated.member.name, "subtypeOverride");
    assert_eq!(gated.owner, SUB_COMPATIBLE);
    assert_eq!(gated.receiver, SUB_COMPATIBLE);
    assert_eq!(verdict, &Verdict::Compatible);

    assert_eq!(report.verdict_for("superInCompat"), Some(&Verdict::NoCandidate));
    assert_eq!(
        report.verdict_for("implicitThisInSubtype"),
        Some(&Verdict::Compatible)
    );

    // Inherited members are verified through the subclass, overridden ones only once.
    assert!(report
        .entries
        .iter()
        .all(|(gated, _)| gated.receiver == SUB_COMPATIBLE));
    let overrides = report
        .entries
        .iter()
        .filter(|(gated, _)| gated.member.name == "subtypeOverride")
        .count();
    assert_eq!(overrides, 1);
}

#[test]
fn override_without_local_binding_walks_to_the_ancestor_shim() {
    let report = report_for(SUB_COMPATIBLE_2);

    let (gated, verdict) = &report.entries[0];
    assert_eq!(gated.member.name, "subtypeOverride");
    assert_eq!(gated.owner, SUB_COMPATIBLE_2);
    assert_eq!(gated.receiver, SUB_COMPATIBLE_2);
    assert!(!gated.is_inherited());
    assert_eq!(verdict, &Verdict::Compatible);
    assert_eq!(report.verdict_for("noArgs"), Some(&Verdict::Compatible));
}

#[test]
fn class_outside_the_session_roots_is_resolved_with_its_bindings() {
    let checker = CompatChecker::new(fixture::store(), CompatOptions::default());
    let session = checker.resolve([COMPATIBLE]).unwrap();
    assert_eq!(session.bindings().binding_for(MOVABLE), None);

    let report = session.verify(MOVABLE_IMPL).unwrap();
    assert_eq!(
        verdicts(&report),
        vec![("move".to_string(), Verdict::Compatible)]
    );

    // The session's own bindings stay as they were built.
    assert_eq!(session.bindings().binding_for(MOVABLE), None);
    assert!(session.bindings().binding_for(COMPATIBLE).is_some());
}

#[test]
fn shared_shim_serves_another_owner() {
    let report = report_for(ANOTHER_COMPATIBLE);
    assert_eq!(
        verdicts(&report),
        vec![("inAnotherCompatible".to_string(), Verdict::Compatible)]
    );
    assert!(report.is_clean());
}

#[test]
fn compat_annotation_on_interface_covers_implementations() {
    let report = report_for(MOVABLE_IMPL);
    assert_eq!(
        verdicts(&report),
        vec![("move".to_string(), Verdict::Compatible)]
    );
}

#[test]
fn value_vararg_is_accepted_when_enabled() {
    let options = CompatOptions {
        policy: MatchPolicy {
            allow_value_vararg: true,
        },
        ..CompatOptions::default()
    };
    let checker = CompatChecker::new(fixture::store(), options);
    let session = checker.resolve([COMPATIBLE]).unwrap();
    let report = session.verify(COMPATIBLE).unwrap();

    assert_eq!(report.verdict_for("valueVararg"), Some(&Verdict::Compatible));
    assert_eq!(report.verdict_for("varargBoxing"), Some(&param_mismatch(1)));
}

#[test]
fn raising_min_api_ungates_members() {
    let mut options = CompatOptions::default();
    options.gates.min_api = 100;
    let checker = CompatChecker::new(fixture::store(), options);
    let session = checker.resolve([COMPATIBLE]).unwrap();
    let report = session.verify(COMPATIBLE).unwrap();
    assert!(report.entries.is_empty());
    assert!(report.diagnostics().is_empty());
}

#[test]
fn diagnostics_name_the_receiver_and_required_level() {
    let report = report_for(SUB_COMPATIBLE);
    let messages: Vec<String> = report
        .diagnostics()
        .into_iter()
        .filter(|d| d.code == "COMPAT_NO_CANDIDATE")
        .map(|d| d.message)
        .collect();
    assert_eq!(
        messages,
        vec![
            "Call requires API level 100 (current min is 1): compatible.SubCompatible#superInCompat \
             (no shim member named `superInCompat`)"
                .to_string()
        ]
    );
}

#[test]
fn missing_superclass_is_an_unresolved_reference() {
    let mut store = TypeStore::with_minimal_jdk();
    store.upsert_class(ClassSymbol::class("broken.Orphan").extends("broken.Missing"));
    let checker = CompatChecker::new(store, CompatOptions::default());

    let err = checker.resolve(["broken.Orphan"]).err().expect("resolution fails");
    assert_eq!(
        err,
        CompatError::UnresolvedReference {
            name: "broken.Missing".to_string(),
            referenced_from: "broken.Orphan".to_string(),
        }
    );
}

#[test]
fn missing_shim_class_is_an_unresolved_reference() {
    let mut store = TypeStore::with_minimal_jdk();
    store.upsert_class(
        ClassSymbol::class("broken.Owner")
            .extends("java.lang.Object")
            .annotated(compat("broken.OwnerCompat")),
    );
    let checker = CompatChecker::new(store, CompatOptions::default());

    let err = checker.resolve(["broken.Owner"]).err().expect("resolution fails");
    assert_eq!(
        err,
        CompatError::unresolved("broken.OwnerCompat", "broken.Owner")
    );
}
