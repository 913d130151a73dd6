use nova_types::{find_member, ClassSymbol, MemberSymbol, Type, TypeEnv};

use crate::gated::GatedMember;
use crate::oracle::{is_assignable, Position};
use crate::verdict::{IncompatibleReason, Verdict};

/// Knobs for cases where the platform's own tooling disagrees with itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatchPolicy {
    /// Accept a shim whose trailing vararg parameter stands in for a single plain value of the
    /// element type (`valueVararg(int)` vs `valueVararg(Compatible, int...)`).
    pub allow_value_vararg: bool,
}

/// Find the counterpart of `gated` among `shim`'s members.
///
/// Candidates are same-named members in declaration order. The first compatible one wins; if
/// none is, the first candidate's failure is reported.
pub fn match_member(
    env: &dyn TypeEnv,
    gated: &GatedMember,
    shim: &ClassSymbol,
    policy: MatchPolicy,
) -> Verdict {
    let mut first_failure = None;
    for candidate in shim.members_named(&gated.member.name) {
        match check_candidate(env, gated, candidate, policy) {
            Ok(()) => return Verdict::Compatible,
            Err(reason) => {
                first_failure.get_or_insert(reason);
            }
        }
    }

    match first_failure {
        Some(reason) => Verdict::Incompatible(reason),
        None => Verdict::NoCandidate,
    }
}

/// Check one shim member against the gated member's signature, position by position.
pub fn check_candidate(
    env: &dyn TypeEnv,
    gated: &GatedMember,
    candidate: &MemberSymbol,
    policy: MatchPolicy,
) -> Result<(), IncompatibleReason> {
    if !candidate.is_static {
        return Err(IncompatibleReason::ShimMemberNotStatic);
    }

    let member = &gated.member;
    let offset = usize::from(!member.is_static);
    if member.params.len() + offset != candidate.params.len() {
        return Err(IncompatibleReason::ParameterArityMismatch);
    }
    if member.generic_arity() != candidate.generic_arity() {
        return Err(IncompatibleReason::TypeParameterArityMismatch);
    }

    if offset == 1 && !receiver_accepts(env, gated, &candidate.params[0]) {
        return Err(IncompatibleReason::ParameterTypeMismatch { position: 0 });
    }

    let last = member.params.len().saturating_sub(1);
    let value_vararg = policy.allow_value_vararg
        && !member.is_varargs
        && candidate.is_varargs
        && member
            .params
            .last()
            .is_some_and(|source| !matches!(source, Type::Array(_)));
    for (idx, (source, target)) in member.params.iter().zip(&candidate.params[offset..]).enumerate() {
        let position = idx + offset;
        let value_vararg = value_vararg && idx == last;
        let ok = match target {
            Type::Array(element) if value_vararg => {
                is_assignable(env, source, element, Position::Parameter(position))
            }
            _ => is_assignable(env, source, target, Position::Parameter(position)),
        };
        if !ok {
            return Err(IncompatibleReason::ParameterTypeMismatch { position });
        }
    }

    // A call site written against `m(int...)` only rewrites to a shim that is variable-arity too.
    if member.is_varargs != candidate.is_varargs && !value_vararg {
        return Err(IncompatibleReason::ParameterTypeMismatch {
            position: candidate.params.len().saturating_sub(1),
        });
    }

    if !is_assignable(env, &member.return_type, &candidate.return_type, Position::Return) {
        return Err(IncompatibleReason::ReturnTypeMismatch);
    }

    Ok(())
}

/// The shim's leading parameter must accept the receiver: either the receiver class itself or an
/// ancestor that declares or inherits the gated member.
fn receiver_accepts(env: &dyn TypeEnv, gated: &GatedMember, target: &Type) -> bool {
    let receiver = Type::class(gated.receiver.as_str());
    if !is_assignable(env, &receiver, target, Position::Receiver) {
        return false;
    }
    match target.class_name() {
        Some(name) if name != gated.receiver => find_member(env, name, &gated.member).is_some(),
        _ => true,
    }
}
