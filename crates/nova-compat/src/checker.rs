use std::borrow::Cow;
use std::sync::Arc;

use nova_config::CompatConfig;
use nova_types::ClassSymbol;
use rayon::prelude::*;
use rayon::ThreadPool;

use crate::binding::{ShimBindings, COMPAT_ANNOTATION};
use crate::cache::{ClassResolver, SymbolCache};
use crate::driver;
use crate::error::Result;
use crate::gated::GateRules;
use crate::matcher::MatchPolicy;
use crate::report::ClassReport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatOptions {
    /// Annotation that binds an owner class to its shim class.
    pub shim_annotation: String,
    pub gates: GateRules,
    pub policy: MatchPolicy,
    /// Worker threads for [`CompatSession::verify_all`].
    pub threads: usize,
}

impl Default for CompatOptions {
    fn default() -> Self {
        let available = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            shim_annotation: COMPAT_ANNOTATION.to_string(),
            gates: GateRules::default(),
            policy: MatchPolicy::default(),
            threads: available.clamp(1, 8),
        }
    }
}

impl From<&CompatConfig> for CompatOptions {
    fn from(config: &CompatConfig) -> Self {
        let defaults = Self::default();
        Self {
            shim_annotation: config.annotations.compat.clone(),
            gates: GateRules {
                annotations: config.annotations.gates.clone(),
                min_api: config.analysis.min_api,
            },
            policy: MatchPolicy {
                allow_value_vararg: config.analysis.allow_value_vararg,
            },
            threads: config.analysis.threads.unwrap_or(defaults.threads).max(1),
        }
    }
}

enum ComputePool {
    Rayon(ThreadPool),
    Inline,
}

fn build_rayon_pool(threads: usize) -> ComputePool {
    // Thread creation can fail under tight process limits; shrink the pool and finally run
    // inline instead of failing.
    let mut threads = threads.max(1);
    loop {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|idx| format!("nova-compat-{idx}"))
            .build()
        {
            Ok(pool) => return ComputePool::Rayon(pool),
            Err(_) if threads > 1 => {
                threads = (threads / 2).max(1);
            }
            Err(err) => {
                tracing::warn!(
                    target: "nova.compat",
                    error = %err,
                    "failed to start verification workers; verifying inline"
                );
                return ComputePool::Inline;
            }
        }
    }
}

/// Entry point: owns the symbol cache and the worker pool.
///
/// Usage is two-phase. [`CompatChecker::resolve`] loads the class closure of the roots and
/// builds the shim bindings once; the returned [`CompatSession`] then verifies classes against
/// that fixed view.
pub struct CompatChecker<R> {
    cache: SymbolCache<R>,
    options: CompatOptions,
    pool: ComputePool,
}

impl<R: ClassResolver> CompatChecker<R> {
    pub fn new(resolver: R, options: CompatOptions) -> Self {
        let pool = build_rayon_pool(options.threads);
        Self {
            cache: SymbolCache::new(resolver),
            options,
            pool,
        }
    }

    pub fn options(&self) -> &CompatOptions {
        &self.options
    }

    pub fn cache(&self) -> &SymbolCache<R> {
        &self.cache
    }

    /// Resolve every root and what it references, then bind shims.
    pub fn resolve<I, S>(&self, roots: I) -> Result<CompatSession<'_, R>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut root_names = Vec::new();
        for root in roots {
            let root = root.as_ref();
            self.cache.resolve_closure(root)?;
            root_names.push(root.to_string());
        }

        let bindings = ShimBindings::build(
            &self.cache,
            &self.options.shim_annotation,
            self.cache.resolved_classes(),
        )?;
        tracing::debug!(
            target: "nova.compat",
            roots = root_names.len(),
            classes = self.cache.resolved_classes().len(),
            bindings = bindings.len(),
            "resolved compat session"
        );

        Ok(CompatSession {
            checker: self,
            bindings,
        })
    }

    /// Resolve `classes` and verify each of them. Results keep the input order.
    ///
    /// Roots are resolved one by one, so a class whose closure cannot be resolved only fails its
    /// own entry. The outer error is reserved for shim bindings that cannot be built at all.
    pub fn verify_all<S: AsRef<str> + Sync>(&self, classes: &[S]) -> Result<Vec<Result<ClassReport>>> {
        let resolvable: Vec<&str> = classes
            .iter()
            .map(|name| name.as_ref())
            .filter(|name| match self.cache.resolve_closure(name) {
                Ok(_) => true,
                Err(err) => {
                    tracing::debug!(target: "nova.compat", class = *name, error = %err, "skipping root");
                    false
                }
            })
            .collect();
        let session = self.resolve(resolvable)?;
        Ok(session.verify_all(classes))
    }
}

/// A resolved view of the class graph with its shim bindings.
pub struct CompatSession<'a, R> {
    checker: &'a CompatChecker<R>,
    bindings: ShimBindings,
}

impl<R: ClassResolver> CompatSession<'_, R> {
    pub fn bindings(&self) -> &ShimBindings {
        &self.bindings
    }

    /// Verify one class.
    ///
    /// A class outside the session's roots has its closure resolved first, and any compat
    /// bindings it brings along apply to this verification only.
    pub fn verify(&self, class: &str) -> Result<ClassReport> {
        let checker = self.checker;
        let options = &checker.options;
        let closure = checker.cache.resolve_closure(class)?;
        let symbol = checker.cache.resolve(class, class)?;

        let unbound: Vec<Arc<ClassSymbol>> = closure
            .into_iter()
            .filter(|c| {
                c.annotation(&options.shim_annotation).is_some()
                    && self.bindings.binding_for(&c.name).is_none()
            })
            .collect();
        let bindings = if unbound.is_empty() {
            Cow::Borrowed(&self.bindings)
        } else {
            tracing::debug!(
                target: "nova.compat",
                class,
                owners = unbound.len(),
                "binding owners outside the session roots"
            );
            let mut extended = self.bindings.clone();
            extended.extend(ShimBindings::build(
                &checker.cache,
                &options.shim_annotation,
                unbound,
            )?);
            Cow::Owned(extended)
        };

        let entries = driver::verify(
            &checker.cache,
            &bindings,
            &symbol,
            &options.gates,
            options.policy,
        )?;
        Ok(ClassReport {
            class: symbol.name.clone(),
            min_api: options.gates.min_api,
            entries,
        })
    }

    /// Verify classes on the worker pool. Each class gets its own result, in input order.
    pub fn verify_all<S: AsRef<str> + Sync>(&self, classes: &[S]) -> Vec<Result<ClassReport>> {
        let run = || {
            classes
                .par_iter()
                .map(|class| self.verify(class.as_ref()))
                .collect::<Vec<_>>()
        };
        match &self.checker.pool {
            ComputePool::Rayon(pool) => pool.install(run),
            ComputePool::Inline => classes.iter().map(|class| self.verify(class.as_ref())).collect(),
        }
    }
}
