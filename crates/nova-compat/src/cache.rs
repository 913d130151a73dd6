use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use nova_types::{ClassSymbol, TypeEnv, TypeStore, WellKnownTypes};
use parking_lot::Mutex;

use crate::error::{CompatError, Result};

/// Supplies class symbols by binary name.
///
/// `Ok(None)` means the class is unknown; the cache turns that into
/// [`CompatError::UnresolvedReference`] with the name of the class that referenced it.
pub trait ClassResolver: Send + Sync {
    fn resolve_class(&self, name: &str) -> Result<Option<ClassSymbol>>;
}

impl ClassResolver for TypeStore {
    fn resolve_class(&self, name: &str) -> Result<Option<ClassSymbol>> {
        Ok(self.class(name).map(|class| class.as_ref().clone()))
    }
}

impl<R: ClassResolver + ?Sized> ClassResolver for Arc<R> {
    fn resolve_class(&self, name: &str) -> Result<Option<ClassSymbol>> {
        (**self).resolve_class(name)
    }
}

type Slot = Arc<OnceLock<Result<Option<Arc<ClassSymbol>>>>>;

/// Concurrent memoizing front for a [`ClassResolver`].
///
/// Each class name is handed to the resolver at most once, even when many threads ask for it at
/// the same time: the index lock is only held to find or create the name's slot, and the slot
/// itself makes late arrivals wait for the first resolution.
pub struct SymbolCache<R> {
    resolver: R,
    slots: Mutex<HashMap<String, Slot>>,
    resolutions: AtomicUsize,
    well_known: WellKnownTypes,
}

impl<R: ClassResolver> SymbolCache<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            slots: Mutex::new(HashMap::new()),
            resolutions: AtomicUsize::new(0),
            well_known: WellKnownTypes::default(),
        }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Resolve `name`, or return the memoized outcome of an earlier resolution.
    pub fn lookup(&self, name: &str) -> Result<Option<Arc<ClassSymbol>>> {
        let slot = self.slots.lock().entry(name.to_string()).or_default().clone();
        slot.get_or_init(|| self.resolve_uncached(name)).clone()
    }

    /// Like [`Self::lookup`], but an unknown class is an error.
    pub fn resolve(&self, name: &str, referenced_from: &str) -> Result<Arc<ClassSymbol>> {
        self.lookup(name)?
            .ok_or_else(|| CompatError::unresolved(name, referenced_from))
    }

    /// Resolve `root` and everything it transitively references (supertypes, member types,
    /// class-valued annotation elements).
    ///
    /// Uses an explicit worklist, so reference cycles terminate. Classes are returned in
    /// breadth-first discovery order starting with `root`.
    pub fn resolve_closure(&self, root: &str) -> Result<Vec<Arc<ClassSymbol>>> {
        let mut out = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<(String, String)> = VecDeque::new();
        seen.insert(root.to_string());
        queue.push_back((root.to_string(), root.to_string()));

        while let Some((name, referenced_from)) = queue.pop_front() {
            let class = match self.resolve(&name, &referenced_from) {
                Ok(class) => class,
                Err(err) => {
                    tracing::warn!(
                        target: "nova.compat",
                        root,
                        error = %err,
                        "failed to resolve class closure"
                    );
                    return Err(err);
                }
            };
            for referenced in class.referenced_classes() {
                if seen.insert(referenced.clone()) {
                    queue.push_back((referenced, class.name.clone()));
                }
            }
            out.push(class);
        }

        Ok(out)
    }

    /// How many times the underlying resolver has been called.
    pub fn resolution_count(&self) -> usize {
        self.resolutions.load(Ordering::Relaxed)
    }

    /// Every successfully resolved class, sorted by name.
    pub fn resolved_classes(&self) -> Vec<Arc<ClassSymbol>> {
        let slots: Vec<Slot> = self.slots.lock().values().cloned().collect();
        let mut classes: Vec<Arc<ClassSymbol>> = slots
            .iter()
            .filter_map(|slot| match slot.get() {
                Some(Ok(Some(class))) => Some(class.clone()),
                _ => None,
            })
            .collect();
        classes.sort_by(|a, b| a.name.cmp(&b.name));
        classes
    }

    fn resolve_uncached(&self, name: &str) -> Result<Option<Arc<ClassSymbol>>> {
        self.resolutions.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(target: "nova.compat", name, "resolving class");

        match self.resolver.resolve_class(name)? {
            Some(class) if class.name != name => Err(CompatError::MalformedClass {
                class: name.to_string(),
                message: format!("resolver returned `{}`", class.name),
            }),
            Some(class) => Ok(Some(Arc::new(class))),
            None => Ok(None),
        }
    }
}

impl<R: ClassResolver> TypeEnv for SymbolCache<R> {
    /// Only sees classes that were already resolved; never calls the resolver.
    fn class(&self, name: &str) -> Option<Arc<ClassSymbol>> {
        let slot = self.slots.lock().get(name).cloned()?;
        match slot.get() {
            Some(Ok(Some(class))) => Some(class.clone()),
            _ => None,
        }
    }

    fn class_count(&self) -> usize {
        self.slots.lock().len()
    }

    fn well_known(&self) -> &WellKnownTypes {
        &self.well_known
    }
}
