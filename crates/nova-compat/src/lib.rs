//! Compatibility checking between API-level gated members and their shim implementations.
//!
//! A class annotated with `@kotlin.android.Compat(Shim.class)` promises that `Shim` provides a
//! static fallback for each of its members gated by `@TargetApi` / `@RequiresApi`. For every
//! such member this crate finds the same-named shim member and decides whether it can stand in
//! for the gated call:
//!
//! - [`oracle`] compares two types at one signature position,
//! - [`matcher`] aligns a gated member with a shim candidate,
//! - [`driver`] walks the gated members of a class and the shim bindings reachable from it,
//! - [`cache`] resolves class symbols at most once, from any number of threads,
//! - [`CompatChecker`] ties it together and verifies classes in parallel.

#![forbid(unsafe_code)]

pub mod binding;
pub mod cache;
pub mod checker;
pub mod driver;
pub mod error;
pub mod gated;
pub mod matcher;
pub mod oracle;
pub mod report;
pub mod verdict;

pub use crate::binding::{ShimBinding, ShimBindings, COMPAT_ANNOTATION};
pub use crate::cache::{ClassResolver, SymbolCache};
pub use crate::checker::{CompatChecker, CompatOptions, CompatSession};
pub use crate::driver::{verify, verify_member};
pub use crate::error::{CompatError, Result};
pub use crate::gated::{gated_members, GateRules, GatedMember, REQUIRES_API, TARGET_API};
pub use crate::matcher::{check_candidate, match_member, MatchPolicy};
pub use crate::oracle::{is_assignable, Position};
pub use crate::report::{ClassReport, CompatRecord};
pub use crate::verdict::{IncompatibleReason, Verdict};
