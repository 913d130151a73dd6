pub type Result<T> = std::result::Result<T, CompatError>;

/// Failures that mean the checker could not analyze a class at all.
///
/// Compatibility problems are never reported through this type; they become a
/// [`crate::Verdict`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompatError {
    #[error("unresolved reference to `{name}` from `{referenced_from}`")]
    UnresolvedReference {
        name: String,
        referenced_from: String,
    },

    #[error("resolver returned malformed symbol for `{class}`: {message}")]
    MalformedClass { class: String, message: String },
}

impl CompatError {
    pub fn unresolved(name: impl Into<String>, referenced_from: impl Into<String>) -> Self {
        CompatError::UnresolvedReference {
            name: name.into(),
            referenced_from: referenced_from.into(),
        }
    }
}
