//! Symbol model shared across the Nova compat crates.
//!
//! Symbols are immutable once built: a [`ClassSymbol`] is created by a resolver, wrapped in an
//! `Arc`, and shared read-only between the binding map, the matcher and any worker threads.
//! Classes refer to each other by binary name (`compatible.Compatible`); the owning symbol table
//! ([`TypeStore`] or a cache implementing [`TypeEnv`]) resolves those names.

#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub mod java;

pub use crate::java::env::WellKnownTypes;
pub use crate::java::format::{format_member_signature, format_type};
pub use crate::java::subtyping::{find_member, is_class_subtype, is_subtype, supertype_walk};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
}

impl Diagnostic {
    pub fn error(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    Boolean,
    Char,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 8] = [
        PrimitiveType::Boolean,
        PrimitiveType::Char,
        PrimitiveType::Byte,
        PrimitiveType::Short,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Float,
        PrimitiveType::Double,
    ];

    pub fn java_name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Char => "char",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }

    /// Binary name of the `java.lang` wrapper class for this primitive.
    pub fn box_class_name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "java.lang.Boolean",
            PrimitiveType::Char => "java.lang.Character",
            PrimitiveType::Byte => "java.lang.Byte",
            PrimitiveType::Short => "java.lang.Short",
            PrimitiveType::Int => "java.lang.Integer",
            PrimitiveType::Long => "java.lang.Long",
            PrimitiveType::Float => "java.lang.Float",
            PrimitiveType::Double => "java.lang.Double",
        }
    }

    pub fn from_box_class_name(name: &str) -> Option<Self> {
        PrimitiveType::ALL
            .into_iter()
            .find(|prim| prim.box_class_name() == name)
    }

    pub fn is_numeric(self) -> bool {
        !matches!(self, PrimitiveType::Boolean | PrimitiveType::Char)
    }
}

/// A (type-erased except for type variables) Java type as seen by the compat checker.
///
/// The variant set is closed on purpose: every consumer matches it exhaustively.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case", from = "TypeRepr")]
pub enum Type {
    /// Only valid as a return type.
    Void,
    Primitive(PrimitiveType),
    /// `java.lang.Integer` and friends.
    Boxed(PrimitiveType),
    /// Reference to a class or interface by binary name.
    Class(String),
    Array(Box<Type>),
    /// A method or class type parameter, by its declared name.
    TypeVar(String),
}

/// Wire form of [`Type`]. Deserialization goes through [`Type::class`] so wrapper classes come
/// back as [`Type::Boxed`].
#[derive(Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
enum TypeRepr {
    Void,
    Primitive(PrimitiveType),
    Boxed(PrimitiveType),
    Class(String),
    Array(Box<Type>),
    TypeVar(String),
}

impl From<TypeRepr> for Type {
    fn from(repr: TypeRepr) -> Self {
        match repr {
            TypeRepr::Void => Type::Void,
            TypeRepr::Primitive(prim) => Type::Primitive(prim),
            TypeRepr::Boxed(prim) => Type::Boxed(prim),
            TypeRepr::Class(name) => Type::class(name),
            TypeRepr::Array(element) => Type::Array(element),
            TypeRepr::TypeVar(name) => Type::TypeVar(name),
        }
    }
}

impl Type {
    pub fn boolean() -> Self {
        Type::Primitive(PrimitiveType::Boolean)
    }

    pub fn int() -> Self {
        Type::Primitive(PrimitiveType::Int)
    }

    pub fn long() -> Self {
        Type::Primitive(PrimitiveType::Long)
    }

    pub fn boxed(prim: PrimitiveType) -> Self {
        Type::Boxed(prim)
    }

    /// A reference type by binary name. Wrapper classes are normalized to [`Type::Boxed`] so the
    /// same Java type never has two representations.
    pub fn class(name: impl Into<String>) -> Self {
        let name = name.into();
        match PrimitiveType::from_box_class_name(&name) {
            Some(prim) => Type::Boxed(prim),
            None => Type::Class(name),
        }
    }

    pub fn array(element: Type) -> Self {
        Type::Array(Box::new(element))
    }

    pub fn type_var(name: impl Into<String>) -> Self {
        Type::TypeVar(name.into())
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Type::Boxed(_) | Type::Class(_) | Type::Array(_) | Type::TypeVar(_)
        )
    }

    pub fn array_element(&self) -> Option<&Type> {
        match self {
            Type::Array(elem) => Some(elem),
            _ => None,
        }
    }

    /// The binary class name this type names, with wrapper types resolved to their class.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Type::Class(name) => Some(name),
            Type::Boxed(prim) => Some(prim.box_class_name()),
            _ => None,
        }
    }

    /// Collect every class name this type mentions (array elements included).
    pub fn collect_class_names(&self, out: &mut Vec<String>) {
        match self {
            Type::Void | Type::Primitive(_) | Type::TypeVar(_) => {}
            Type::Boxed(prim) => out.push(prim.box_class_name().to_string()),
            Type::Class(name) => out.push(name.clone()),
            Type::Array(elem) => elem.collect_class_names(out),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_type(self))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    Class,
    Interface,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AnnotationValue {
    Bool(bool),
    Int(i64),
    String(String),
    /// A class literal (`Foo.class`), by binary name.
    Class(String),
    Array(Vec<AnnotationValue>),
}

impl AnnotationValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AnnotationValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&str> {
        match self {
            AnnotationValue::Class(name) => Some(name),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Binary name of the annotation type, e.g. `kotlin.android.Compat`.
    pub name: String,
    pub elements: Vec<(String, AnnotationValue)>,
}

impl Annotation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elements: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: AnnotationValue) -> Self {
        self.elements.push(("value".to_string(), value));
        self
    }

    pub fn element(&self, name: &str) -> Option<&AnnotationValue> {
        self.elements
            .iter()
            .find(|(element, _)| element == name)
            .map(|(_, value)| value)
    }

    /// The `value` element, which both `@Compat` and `@TargetApi` use.
    pub fn value(&self) -> Option<&AnnotationValue> {
        self.element("value")
    }
}

/// A declared method of a class.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSymbol {
    pub name: String,
    /// Binary name of the declaring class. Filled in by [`ClassSymbol::with_member`].
    pub declaring_class: String,
    pub is_static: bool,
    pub params: Vec<Type>,
    pub return_type: Type,
    /// Declared method type parameters, in order.
    pub type_params: Vec<String>,
    /// The last parameter is an array declared as `T...`.
    pub is_varargs: bool,
    pub annotations: Vec<Annotation>,
}

impl MemberSymbol {
    pub fn method(name: impl Into<String>, return_type: Type) -> Self {
        Self {
            name: name.into(),
            declaring_class: String::new(),
            is_static: false,
            params: Vec::new(),
            return_type,
            type_params: Vec::new(),
            is_varargs: false,
            annotations: Vec::new(),
        }
    }

    pub fn param(mut self, ty: Type) -> Self {
        self.params.push(ty);
        self
    }

    pub fn set_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Mark the method as variable-arity. The last parameter must already be an array.
    pub fn set_varargs(mut self) -> Self {
        self.is_varargs = true;
        self
    }

    pub fn type_param(mut self, name: impl Into<String>) -> Self {
        self.type_params.push(name.into());
        self
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn generic_arity(&self) -> usize {
        self.type_params.len()
    }

    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.name == name)
    }

    /// Whether `other` has the same name and parameter list (type variables compare by position
    /// only, so `<T> m(T)` and `<K> m(K)` overlap).
    pub fn overrides_shape_of(&self, other: &MemberSymbol) -> bool {
        self.name == other.name
            && self.params.len() == other.params.len()
            && self
                .params
                .iter()
                .zip(&other.params)
                .all(|(a, b)| same_erased_shape(a, b))
    }
}

fn same_erased_shape(a: &Type, b: &Type) -> bool {
    match (a, b) {
        (Type::TypeVar(_), Type::TypeVar(_)) => true,
        (Type::Array(a), Type::Array(b)) => same_erased_shape(a, b),
        _ => a == b,
    }
}

/// An immutable description of a class and its declared members.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSymbol {
    pub name: String,
    pub kind: ClassKind,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub members: Vec<MemberSymbol>,
    pub annotations: Vec<Annotation>,
}

impl ClassSymbol {
    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, ClassKind::Class)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, ClassKind::Interface)
    }

    fn new(name: impl Into<String>, kind: ClassKind) -> Self {
        Self {
            name: name.into(),
            kind,
            super_class: None,
            interfaces: Vec::new(),
            members: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn extends(mut self, super_class: impl Into<String>) -> Self {
        self.super_class = Some(super_class.into());
        self
    }

    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn with_member(mut self, mut member: MemberSymbol) -> Self {
        member.declaring_class = self.name.clone();
        self.members.push(member);
        self
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Unqualified name (`Compatible` for `compatible.Compatible`).
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.name == name)
    }

    /// Declared members with the given name, in declaration order.
    pub fn members_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MemberSymbol> {
        self.members.iter().filter(move |m| m.name == name)
    }

    /// Every class name this symbol references: supertypes, member signatures and class-valued
    /// annotation elements. Order is deterministic and duplicates are removed.
    pub fn referenced_classes(&self) -> Vec<String> {
        let mut out = Vec::new();
        out.extend(self.super_class.iter().cloned());
        out.extend(self.interfaces.iter().cloned());
        for member in &self.members {
            for param in &member.params {
                param.collect_class_names(&mut out);
            }
            member.return_type.collect_class_names(&mut out);
            collect_annotation_classes(&member.annotations, &mut out);
        }
        collect_annotation_classes(&self.annotations, &mut out);

        let mut seen = std::collections::HashSet::new();
        out.retain(|name| name != &self.name && seen.insert(name.clone()));
        out
    }
}

fn collect_annotation_classes(annotations: &[Annotation], out: &mut Vec<String>) {
    fn visit(value: &AnnotationValue, out: &mut Vec<String>) {
        match value {
            AnnotationValue::Class(name) => out.push(name.clone()),
            AnnotationValue::Array(values) => values.iter().for_each(|v| visit(v, out)),
            AnnotationValue::Bool(_) | AnnotationValue::Int(_) | AnnotationValue::String(_) => {}
        }
    }

    for annotation in annotations {
        for (_, value) in &annotation.elements {
            visit(value, out);
        }
    }
}

/// Read-only view over resolved class symbols.
pub trait TypeEnv {
    fn class(&self, name: &str) -> Option<Arc<ClassSymbol>>;

    /// Number of classes known to the environment. Hierarchy walks never take more steps than
    /// this, which keeps malformed (cyclic) input from looping.
    fn class_count(&self) -> usize;

    fn well_known(&self) -> &WellKnownTypes;
}

/// In-memory symbol table.
#[derive(Clone, Debug, Default)]
pub struct TypeStore {
    classes: HashMap<String, Arc<ClassSymbol>>,
    well_known: WellKnownTypes,
}

impl TypeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with the handful of `java.lang` / `java.io` types the checker needs
    /// for nominal subtyping (wrappers, `Object`, `String`, `Runnable`, ...).
    pub fn with_minimal_jdk() -> Self {
        let mut store = Self::new();
        for class in java::env::minimal_jdk_classes() {
            store.upsert_class(class);
        }
        store
    }

    /// Insert or replace a class definition.
    pub fn upsert_class(&mut self, class: ClassSymbol) -> Arc<ClassSymbol> {
        let class = Arc::new(class);
        self.classes.insert(class.name.clone(), class.clone());
        class
    }

    /// Look up a class by binary name, falling back to implicit `java.lang.*` lookup for simple
    /// names.
    pub fn lookup_class(&self, name: &str) -> Option<Arc<ClassSymbol>> {
        if let Some(class) = self.classes.get(name) {
            return Some(class.clone());
        }
        if name.contains('.') {
            return None;
        }
        self.classes.get(&format!("java.lang.{name}")).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Every stored class, in no particular order.
    pub fn classes(&self) -> impl Iterator<Item = &Arc<ClassSymbol>> {
        self.classes.values()
    }

    /// All class names, sorted.
    pub fn class_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.classes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl TypeEnv for TypeStore {
    fn class(&self, name: &str) -> Option<Arc<ClassSymbol>> {
        self.classes.get(name).cloned()
    }

    fn class_count(&self) -> usize {
        self.classes.len()
    }

    fn well_known(&self) -> &WellKnownTypes {
        &self.well_known
    }
}
