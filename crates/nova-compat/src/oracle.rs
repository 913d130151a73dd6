//! Type compatibility between a gated member's signature and its shim counterpart.
//!
//! `source` is always the type on the gated side and `target` the type at the same position in
//! the shim. The shim must be callable wherever the gated member was, and must hand back
//! something usable as the declared result.

use nova_types::{is_subtype, Type, TypeEnv};

/// Where in the aligned signature a pair of types sits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Position {
    /// The synthesized leading `this` argument of an instance member.
    Receiver,
    /// A declared parameter; the index is its position in the shim's parameter list.
    Parameter(usize),
    Return,
}

/// Decide whether `target` (shim side) may stand in for `source` (gated side) at `position`.
///
/// Rules, in precedence order:
/// 1. identical types are compatible;
/// 2. type variables match anything but `void` (arity-only generics);
/// 3. `void` only matches `void`;
/// 4. a primitive and its wrapper match in either direction;
/// 5. distinct primitives never match (no widening), nor do primitives and other references;
/// 6. arrays compare their elements without boxing; return positions keep array covariance;
/// 7. other references: parameters are invariant, the receiver may widen to a supertype and
///    returns may narrow to a subtype.
///
/// Functional interfaces get no special treatment: they match by identity like any other class.
pub fn is_assignable(env: &dyn TypeEnv, source: &Type, target: &Type, position: Position) -> bool {
    if source == target {
        return true;
    }

    match (source, target) {
        (Type::TypeVar(_), other) | (other, Type::TypeVar(_)) => !matches!(other, Type::Void),
        (Type::Void, _) | (_, Type::Void) => false,
        (Type::Primitive(a), Type::Boxed(b)) | (Type::Boxed(a), Type::Primitive(b)) => a == b,
        (Type::Primitive(_), _) | (_, Type::Primitive(_)) => false,
        (Type::Array(a), Type::Array(b)) => match position {
            Position::Return => same_element_type(a, b) || is_subtype(env, target, source),
            Position::Receiver | Position::Parameter(_) => same_element_type(a, b),
        },
        _ => match position {
            Position::Parameter(_) => false,
            Position::Receiver => is_subtype(env, source, target),
            Position::Return => is_subtype(env, target, source),
        },
    }
}

/// Array element identity. Boxing does not apply inside arrays (`int[]` is not `Integer[]`), but
/// a reference element may still be a type variable.
fn same_element_type(a: &Type, b: &Type) -> bool {
    match (a, b) {
        (Type::TypeVar(_), Type::TypeVar(_)) => true,
        (Type::TypeVar(_), other) | (other, Type::TypeVar(_)) => {
            other.is_reference() && !matches!(other, Type::Void)
        }
        (Type::Array(a), Type::Array(b)) => same_element_type(a, b),
        _ => a == b,
    }
}
