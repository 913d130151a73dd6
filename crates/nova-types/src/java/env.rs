use crate::{ClassSymbol, MemberSymbol, PrimitiveType, Type};

/// Binary names of the JDK types the subtyping rules special-case.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WellKnownTypes {
    pub object: String,
    pub string: String,
    pub number: String,
    pub cloneable: String,
    pub serializable: String,
}

impl Default for WellKnownTypes {
    fn default() -> Self {
        Self {
            object: "java.lang.Object".to_string(),
            string: "java.lang.String".to_string(),
            number: "java.lang.Number".to_string(),
            cloneable: "java.lang.Cloneable".to_string(),
            serializable: "java.io.Serializable".to_string(),
        }
    }
}

/// The minimal JDK model loaded by [`crate::TypeStore::with_minimal_jdk`].
pub(crate) fn minimal_jdk_classes() -> Vec<ClassSymbol> {
    let wk = WellKnownTypes::default();
    let mut classes = vec![
        ClassSymbol::class(wk.object.clone()),
        ClassSymbol::interface(wk.serializable.clone()),
        ClassSymbol::interface(wk.cloneable.clone()),
        ClassSymbol::interface("java.lang.Comparable"),
        ClassSymbol::interface("java.lang.CharSequence"),
        ClassSymbol::interface("java.lang.Runnable")
            .with_member(MemberSymbol::method("run", Type::Void)),
        ClassSymbol::class(wk.string.clone())
            .extends(wk.object.clone())
            .implements(wk.serializable.clone())
            .implements("java.lang.Comparable")
            .implements("java.lang.CharSequence"),
        ClassSymbol::class(wk.number.clone())
            .extends(wk.object.clone())
            .implements(wk.serializable.clone()),
    ];

    for prim in PrimitiveType::ALL {
        let super_class = if prim.is_numeric() {
            wk.number.clone()
        } else {
            wk.object.clone()
        };
        classes.push(
            ClassSymbol::class(prim.box_class_name())
                .extends(super_class)
                .implements(wk.serializable.clone())
                .implements("java.lang.Comparable"),
        );
    }

    classes
}
