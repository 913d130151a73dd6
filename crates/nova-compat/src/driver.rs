use nova_types::{find_member, ClassSymbol, MemberSymbol, TypeEnv};

use crate::binding::ShimBindings;
use crate::error::{CompatError, Result};
use crate::gated::{gated_members, GateRules, GatedMember};
use crate::matcher::{match_member, MatchPolicy};
use crate::verdict::Verdict;

/// Verify every gated member visible on `class`.
///
/// Produces one verdict per member, in discovery order (declared members first). Incompatible
/// members never stop the walk; only a reference the environment cannot resolve does.
pub fn verify(
    env: &dyn TypeEnv,
    bindings: &ShimBindings,
    class: &ClassSymbol,
    rules: &GateRules,
    policy: MatchPolicy,
) -> Result<Vec<(GatedMember, Verdict)>> {
    let _span = tracing::debug_span!("verify_class", class = %class.name).entered();

    for supertype in class.super_class.iter().chain(&class.interfaces) {
        ensure_known(env, supertype, &class.name)?;
    }

    let mut out = Vec::new();
    for gated in gated_members(env, class, rules) {
        ensure_signature_known(env, &gated.member)?;
        let verdict = verify_member(env, bindings, &gated, policy);
        tracing::debug!(
            target: "nova.compat",
            receiver = %gated.receiver,
            member = %gated.member.name,
            required_api = gated.required_api,
            verdict = verdict.code(),
            "checked gated member"
        );
        out.push((gated, verdict));
    }
    Ok(out)
}

/// Match one gated member against the bindings reachable from its receiver.
///
/// A binding is only consulted when its owner declares or inherits the member. The first
/// compatible verdict wins; otherwise the nearest binding that had a same-named candidate
/// decides; otherwise there is no candidate.
pub fn verify_member(
    env: &dyn TypeEnv,
    bindings: &ShimBindings,
    gated: &GatedMember,
    policy: MatchPolicy,
) -> Verdict {
    let mut nearest_failure = None;
    for binding in bindings.chain(env, &gated.receiver) {
        if find_member(env, &binding.owner, &gated.member).is_none() {
            continue;
        }
        match match_member(env, gated, &binding.shim, policy) {
            Verdict::Compatible => return Verdict::Compatible,
            Verdict::NoCandidate => {}
            failure @ Verdict::Incompatible(_) => {
                nearest_failure.get_or_insert(failure);
            }
        }
    }
    nearest_failure.unwrap_or(Verdict::NoCandidate)
}

fn ensure_known(env: &dyn TypeEnv, name: &str, referenced_from: &str) -> Result<()> {
    if env.class(name).is_some() {
        return Ok(());
    }
    tracing::warn!(
        target: "nova.compat",
        name,
        referenced_from,
        "unresolved reference"
    );
    Err(CompatError::unresolved(name, referenced_from))
}

fn ensure_signature_known(env: &dyn TypeEnv, member: &MemberSymbol) -> Result<()> {
    let mut names = Vec::new();
    for param in &member.params {
        param.collect_class_names(&mut names);
    }
    member.return_type.collect_class_names(&mut names);

    let from = format!("{}#{}", member.declaring_class, member.name);
    names
        .iter()
        .try_for_each(|name| ensure_known(env, name, &from))
}
