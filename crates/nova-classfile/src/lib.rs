//! Class-file level metadata consumed by the compat checker: JVM descriptors, generic
//! signatures, annotation element values, and the per-class stub model hosts hand to the
//! resolver.

#![forbid(unsafe_code)]

mod annotation;
mod cursor;
mod descriptor;
mod error;
mod signature;
mod stub;

pub use crate::annotation::{descriptor_to_internal_name, Annotation, ConstValue, ElementValue};
pub use crate::descriptor::{parse_field_descriptor, parse_method_descriptor};
pub use crate::descriptor::{BaseType, FieldType, MethodDescriptor, ReturnType};
pub use crate::error::{Error, Result};
pub use crate::signature::{
    parse_method_signature, ClassTypeSignature, MethodSignature, TypeArgument, TypeParameter,
    TypeSignature,
};
pub use crate::stub::{access, ClassStub, MethodStub};

/// `java/lang/String` -> `java.lang.String`. Nested class separators (`$`) are kept.
pub fn internal_to_binary_name(internal: &str) -> String {
    internal.replace('/', ".")
}

/// `java.lang.String` -> `java/lang/String`.
pub fn binary_to_internal_name(binary: &str) -> String {
    binary.replace('.', "/")
}
