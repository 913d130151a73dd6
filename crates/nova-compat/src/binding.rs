use std::collections::HashMap;
use std::sync::Arc;

use nova_types::{supertype_walk, AnnotationValue, ClassSymbol, TypeEnv};

use crate::error::{CompatError, Result};

pub const COMPAT_ANNOTATION: &str = "kotlin.android.Compat";

/// An owner class and the shim class its compat annotation names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShimBinding {
    pub owner: String,
    pub shim: Arc<ClassSymbol>,
}

/// Explicit `owner -> shim` map, built once per session and then only read.
#[derive(Clone, Debug, Default)]
pub struct ShimBindings {
    by_owner: HashMap<String, ShimBinding>,
}

impl ShimBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect a binding for every class in `classes` annotated with `annotation`.
    ///
    /// The shim must already be known to `env`; an annotation without a class-valued `value`
    /// element is reported as malformed.
    pub fn build<I>(env: &dyn TypeEnv, annotation: &str, classes: I) -> Result<Self>
    where
        I: IntoIterator<Item = Arc<ClassSymbol>>,
    {
        let mut bindings = Self::new();
        for class in classes {
            let Some(compat) = class.annotation(annotation) else {
                continue;
            };
            let Some(shim_name) = compat.value().and_then(AnnotationValue::as_class) else {
                return Err(CompatError::MalformedClass {
                    class: class.name.clone(),
                    message: format!("`@{annotation}` does not name a shim class"),
                });
            };
            let shim = env
                .class(shim_name)
                .ok_or_else(|| CompatError::unresolved(shim_name, class.name.as_str()))?;

            tracing::debug!(
                target: "nova.compat",
                owner = %class.name,
                shim = %shim.name,
                "registered shim binding"
            );
            bindings.insert(ShimBinding {
                owner: class.name.clone(),
                shim,
            });
        }
        Ok(bindings)
    }

    pub fn insert(&mut self, binding: ShimBinding) {
        self.by_owner.insert(binding.owner.clone(), binding);
    }

    /// Add `other`'s bindings; an owner already present keeps its existing binding.
    pub fn extend(&mut self, other: ShimBindings) {
        for (owner, binding) in other.by_owner {
            self.by_owner.entry(owner).or_insert(binding);
        }
    }

    pub fn binding_for(&self, owner: &str) -> Option<&ShimBinding> {
        self.by_owner.get(owner)
    }

    /// Bindings reachable from `class`: its own first, then those of its supertypes, nearest
    /// first.
    pub fn chain(&self, env: &dyn TypeEnv, class: &str) -> Vec<&ShimBinding> {
        supertype_walk(env, class)
            .iter()
            .filter_map(|ancestor| self.binding_for(&ancestor.name))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_owner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_owner.is_empty()
    }

    /// Owner names, sorted.
    pub fn owners(&self) -> Vec<&str> {
        let mut owners: Vec<&str> = self.by_owner.keys().map(String::as_str).collect();
        owners.sort_unstable();
        owners
    }
}
