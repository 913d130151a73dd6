//! Converts class-file stubs ([`nova_classfile::ClassStub`]) into the symbol model the compat
//! checker works on ([`nova_types::ClassSymbol`]) and exposes the result as a
//! [`nova_compat::ClassResolver`].

#![forbid(unsafe_code)]

use std::collections::HashMap;

use nova_classfile::{
    descriptor_to_internal_name, internal_to_binary_name, BaseType, ClassStub, ConstValue,
    ElementValue, FieldType, MethodStub, ReturnType, TypeSignature,
};
use nova_compat::{ClassResolver, CompatError};
use nova_types::{
    Annotation, AnnotationValue, ClassKind, ClassSymbol, MemberSymbol, PrimitiveType, Type,
    TypeStore,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    #[error("invalid descriptor on `{class}#{method}`: {source}")]
    InvalidDescriptor {
        class: String,
        method: String,
        #[source]
        source: nova_classfile::Error,
    },
}

impl From<BridgeError> for CompatError {
    fn from(err: BridgeError) -> Self {
        let class = match &err {
            BridgeError::InvalidDescriptor { class, .. } => class.clone(),
        };
        CompatError::MalformedClass {
            class,
            message: err.to_string(),
        }
    }
}

/// Source of class stubs, keyed by binary name (`compatible.Compatible`).
pub trait StubProvider: Send + Sync {
    fn lookup_stub(&self, binary_name: &str) -> Option<ClassStub>;
}

impl StubProvider for HashMap<String, ClassStub> {
    fn lookup_stub(&self, binary_name: &str) -> Option<ClassStub> {
        self.get(binary_name).cloned()
    }
}

/// Index stubs by the binary name derived from their internal name.
pub fn index_stubs(stubs: impl IntoIterator<Item = ClassStub>) -> HashMap<String, ClassStub> {
    stubs
        .into_iter()
        .map(|stub| (internal_to_binary_name(&stub.internal_name), stub))
        .collect()
}

/// Resolves classes by converting stubs from a [`StubProvider`].
///
/// When built with [`StubClassResolver::with_minimal_jdk`], the in-memory JDK model answers
/// first; stubs never replace it.
pub struct StubClassResolver<P> {
    provider: P,
    jdk: Option<TypeStore>,
}

impl<P: StubProvider> StubClassResolver<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            jdk: None,
        }
    }

    pub fn with_minimal_jdk(provider: P) -> Self {
        Self {
            provider,
            jdk: Some(TypeStore::with_minimal_jdk()),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P: StubProvider> ClassResolver for StubClassResolver<P> {
    fn resolve_class(&self, name: &str) -> nova_compat::Result<Option<ClassSymbol>> {
        if let Some(class) = self.jdk.as_ref().and_then(|jdk| jdk.lookup_class(name)) {
            return Ok(Some(class.as_ref().clone()));
        }

        let Some(stub) = self.provider.lookup_stub(name) else {
            tracing::trace!(target: "nova.compat.bridge", class = name, "no stub");
            return Ok(None);
        };
        Ok(Some(class_symbol(&stub)?))
    }
}

/// Convert one class stub.
///
/// Initializers and compiler-generated methods are dropped. A method's generic signature is
/// preferred over its erased descriptor whenever it parses and agrees on the parameter count.
pub fn class_symbol(stub: &ClassStub) -> Result<ClassSymbol, BridgeError> {
    let binary_name = internal_to_binary_name(&stub.internal_name);
    let mut class = if stub.is_interface() {
        ClassSymbol::interface(binary_name.clone())
    } else {
        ClassSymbol::class(binary_name.clone())
    };

    // Interfaces carry `java/lang/Object` as their class-file super class.
    if class.kind == ClassKind::Class {
        if let Some(super_class) = &stub.super_class {
            class = class.extends(internal_to_binary_name(super_class));
        }
    }
    for interface in &stub.interfaces {
        class = class.implements(internal_to_binary_name(interface));
    }
    for annotation in stub.annotations.iter().filter_map(annotation) {
        class = class.annotated(annotation);
    }

    for method in &stub.methods {
        if method.is_initializer() || method.is_synthetic() {
            continue;
        }
        class = class.with_member(member_symbol(&binary_name, method)?);
    }

    Ok(class)
}

fn member_symbol(class: &str, stub: &MethodStub) -> Result<MemberSymbol, BridgeError> {
    let descriptor = stub
        .parsed_descriptor()
        .map_err(|source| BridgeError::InvalidDescriptor {
            class: class.to_string(),
            method: stub.name.clone(),
            source,
        })?;

    let signature = match stub.parsed_signature() {
        Ok(Some(sig)) if sig.parameters.len() == descriptor.params.len() => Some(sig),
        Ok(_) => None,
        Err(err) => {
            tracing::debug!(
                target: "nova.compat.bridge",
                class,
                method = %stub.name,
                error = %err,
                "ignoring unparsable generic signature"
            );
            None
        }
    };

    let mut member = match signature {
        Some(sig) => {
            let return_type = sig
                .return_type
                .as_ref()
                .map(type_signature)
                .unwrap_or(Type::Void);
            let mut member = MemberSymbol::method(stub.name.clone(), return_type);
            for tp in &sig.type_parameters {
                member = member.type_param(tp.name.clone());
            }
            for param in &sig.parameters {
                member = member.param(type_signature(param));
            }
            member
        }
        None => {
            let return_type = match &descriptor.return_type {
                ReturnType::Void => Type::Void,
                ReturnType::Type(ty) => field_type(ty),
            };
            descriptor
                .params
                .iter()
                .fold(MemberSymbol::method(stub.name.clone(), return_type), |m, p| {
                    m.param(field_type(p))
                })
        }
    };

    if stub.is_static() {
        member = member.set_static();
    }
    if stub.is_varargs() {
        member = member.set_varargs();
    }
    for annotation in stub.annotations.iter().filter_map(annotation) {
        member = member.annotated(annotation);
    }
    Ok(member)
}

fn primitive(base: BaseType) -> PrimitiveType {
    match base {
        BaseType::Byte => PrimitiveType::Byte,
        BaseType::Char => PrimitiveType::Char,
        BaseType::Double => PrimitiveType::Double,
        BaseType::Float => PrimitiveType::Float,
        BaseType::Int => PrimitiveType::Int,
        BaseType::Long => PrimitiveType::Long,
        BaseType::Short => PrimitiveType::Short,
        BaseType::Boolean => PrimitiveType::Boolean,
    }
}

fn field_type(ty: &FieldType) -> Type {
    match ty {
        FieldType::Base(base) => Type::Primitive(primitive(*base)),
        FieldType::Object(internal) => Type::class(internal_to_binary_name(internal)),
        FieldType::Array(elem) => Type::array(field_type(elem)),
    }
}

fn type_signature(sig: &TypeSignature) -> Type {
    match sig {
        TypeSignature::Base(base) => Type::Primitive(primitive(*base)),
        // Type arguments are erased; the oracle compares raw types.
        TypeSignature::Class(cls) => Type::class(internal_to_binary_name(&cls.internal_name)),
        TypeSignature::TypeVariable(name) => Type::type_var(name.clone()),
        TypeSignature::Array(elem) => Type::array(type_signature(elem)),
    }
}

fn annotation(annotation: &nova_classfile::Annotation) -> Option<Annotation> {
    let name = internal_to_binary_name(&annotation.type_internal_name()?);
    let elements = annotation
        .elements
        .iter()
        .filter_map(|(element, value)| Some((element.clone(), element_value(value)?)))
        .collect();
    Some(Annotation { name, elements })
}

fn element_value(value: &ElementValue) -> Option<AnnotationValue> {
    match value {
        ElementValue::Const(constant) => match constant {
            ConstValue::Byte(v) => Some(AnnotationValue::Int(i64::from(*v))),
            ConstValue::Short(v) => Some(AnnotationValue::Int(i64::from(*v))),
            ConstValue::Int(v) => Some(AnnotationValue::Int(i64::from(*v))),
            ConstValue::Long(v) => Some(AnnotationValue::Int(*v)),
            ConstValue::Boolean(v) => Some(AnnotationValue::Bool(*v)),
            ConstValue::String(v) => Some(AnnotationValue::String(v.clone())),
            ConstValue::Char(_) | ConstValue::Float(_) | ConstValue::Double(_) => None,
        },
        // Primitive and array class literals never name a shim.
        ElementValue::Class(desc) => descriptor_to_internal_name(desc)
            .map(|internal| AnnotationValue::Class(internal_to_binary_name(&internal))),
        ElementValue::Array(values) => Some(AnnotationValue::Array(
            values.iter().filter_map(element_value).collect(),
        )),
        ElementValue::Enum { .. } | ElementValue::Annotation(_) => None,
    }
}
