use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use crate::{ClassSymbol, MemberSymbol, Type, TypeEnv};

/// Nominal subtyping over erased types (JLS 4.10 without generics).
///
/// Type variables are only subtypes of `Object`; primitives only of themselves. Missing class
/// metadata never panics, the relation simply does not hold.
pub fn is_subtype(env: &dyn TypeEnv, sub: &Type, sup: &Type) -> bool {
    if sub == sup {
        return true;
    }

    let wk = env.well_known();
    match (sub, sup) {
        (Type::Void, _) | (_, Type::Void) => false,
        (Type::Primitive(_), _) | (_, Type::Primitive(_)) => false,
        (Type::TypeVar(_), Type::Class(name)) => *name == wk.object,
        (Type::TypeVar(_), _) | (_, Type::TypeVar(_)) => false,
        // Arrays implement `Cloneable` and `Serializable` (JLS 4.10.3).
        (Type::Array(_), Type::Class(name)) => {
            *name == wk.object || *name == wk.cloneable || *name == wk.serializable
        }
        (Type::Array(a), Type::Array(b)) => {
            a.is_reference() && b.is_reference() && is_subtype(env, a, b)
        }
        (Type::Array(_), Type::Boxed(_)) => false,
        (Type::Class(_) | Type::Boxed(_), Type::Array(_)) => false,
        (Type::Class(_) | Type::Boxed(_), Type::Class(_) | Type::Boxed(_)) => {
            match (sub.class_name(), sup.class_name()) {
                (Some(sub), Some(sup)) => is_class_subtype(env, sub, sup),
                _ => false,
            }
        }
    }
}

/// Whether class `sub` is `sup` or has it among its (transitive) supertypes.
pub fn is_class_subtype(env: &dyn TypeEnv, sub: &str, sup: &str) -> bool {
    if sub == sup || sup == env.well_known().object {
        return true;
    }
    supertype_walk(env, sub)
        .iter()
        .any(|class| class.name == sup)
}

/// Breadth-first walk over `name` and its supertypes, nearest first.
///
/// For each class its superclass is queued before its interfaces, so the superclass chain of a
/// class is always visited before interfaces declared further down. The walk never takes more
/// steps than the environment has classes.
pub fn supertype_walk(env: &dyn TypeEnv, name: &str) -> Vec<Arc<ClassSymbol>> {
    let mut out = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<String> = VecDeque::new();
    queue.push_back(name.to_string());

    let limit = env.class_count().saturating_add(1);
    while let Some(current) = queue.pop_front() {
        if out.len() >= limit {
            break;
        }
        if !seen.insert(current.clone()) {
            continue;
        }
        let Some(class) = env.class(&current) else {
            continue;
        };

        if let Some(sc) = &class.super_class {
            queue.push_back(sc.clone());
        }
        for iface in &class.interfaces {
            queue.push_back(iface.clone());
        }
        out.push(class);
    }

    out
}

/// Find the nearest declaration of a method shaped like `member` (same name and parameters) on
/// `class` or any of its supertypes.
pub fn find_member(env: &dyn TypeEnv, class: &str, member: &MemberSymbol) -> Option<MemberSymbol> {
    supertype_walk(env, class).iter().find_map(|class| {
        class
            .members
            .iter()
            .find(|candidate| candidate.overrides_shape_of(member))
            .cloned()
    })
}
