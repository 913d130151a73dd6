use crate::{MemberSymbol, Type};

/// Render a type the way it would be written in Java source (erasure aside).
pub fn format_type(ty: &Type) -> String {
    match ty {
        Type::Void => "void".to_string(),
        Type::Primitive(prim) => prim.java_name().to_string(),
        Type::Boxed(prim) => prim.box_class_name().to_string(),
        Type::Class(name) => name.clone(),
        Type::Array(elem) => format!("{}[]", format_type(elem)),
        Type::TypeVar(name) => name.clone(),
    }
}

/// Render a method header, e.g. `static <K> boolean generic(compatible.Compatible, K)`.
pub fn format_member_signature(member: &MemberSymbol) -> String {
    let mut out = String::new();
    if member.is_static {
        out.push_str("static ");
    }
    if !member.type_params.is_empty() {
        out.push('<');
        out.push_str(&member.type_params.join(", "));
        out.push_str("> ");
    }
    out.push_str(&format_type(&member.return_type));
    out.push(' ');
    out.push_str(&member.name);
    out.push('(');

    let last = member.params.len().saturating_sub(1);
    for (idx, param) in member.params.iter().enumerate() {
        if idx > 0 {
            out.push_str(", ");
        }
        match param {
            Type::Array(elem) if member.is_varargs && idx == last => {
                out.push_str(&format_type(elem));
                out.push_str("...");
            }
            _ => out.push_str(&format_type(param)),
        }
    }
    out.push(')');
    out
}
