//! Java-specific helpers for the compat symbol model.
//!
//! The formatters here are "Java-like" and stable, intended for diagnostics.

pub mod env;
pub mod format;
pub mod subtyping;
