use std::collections::HashSet;

use crate::diagnostics::{ConfigValidationError, ConfigWarning, ValidationDiagnostics};
use crate::{CompatConfig, LoggingConfig};

impl CompatConfig {
    /// Validate semantic invariants for a configuration.
    ///
    /// Validation is best-effort: it attempts to report as many problems as possible in one pass.
    #[must_use]
    pub fn validate(&self) -> ValidationDiagnostics {
        let mut out = ValidationDiagnostics::default();

        validate_annotations(self, &mut out);
        validate_analysis(self, &mut out);
        validate_logging(self, &mut out);

        out
    }
}

fn validate_annotations(config: &CompatConfig, out: &mut ValidationDiagnostics) {
    let annotations = &config.annotations;
    if annotations.compat.trim().is_empty() {
        out.errors.push(ConfigValidationError::InvalidValue {
            toml_path: "annotations.compat".to_string(),
            message: "must name an annotation type".to_string(),
        });
    }

    if annotations.gates.is_empty() {
        out.errors.push(ConfigValidationError::NoGateAnnotations);
    }

    let mut seen = HashSet::new();
    for (idx, gate) in annotations.gates.iter().enumerate() {
        if gate.trim().is_empty() {
            out.errors.push(ConfigValidationError::InvalidValue {
                toml_path: format!("annotations.gates[{idx}]"),
                message: "must name an annotation type".to_string(),
            });
        } else if !seen.insert(gate.as_str()) {
            out.warnings
                .push(ConfigWarning::DuplicateGateAnnotation { name: gate.clone() });
        }
    }
}

fn validate_analysis(config: &CompatConfig, out: &mut ValidationDiagnostics) {
    if config.analysis.min_api == 0 {
        out.errors.push(ConfigValidationError::InvalidValue {
            toml_path: "analysis.min_api".to_string(),
            message: "must be >= 1".to_string(),
        });
    }

    if matches!(config.analysis.threads, Some(0)) {
        out.warnings.push(ConfigWarning::InvalidValue {
            toml_path: "analysis.threads".to_string(),
            message: "must be >= 1; using a single thread".to_string(),
        });
    }
}

fn validate_logging(config: &CompatConfig, out: &mut ValidationDiagnostics) {
    let normalized = LoggingConfig::normalize_level_directives(&config.logging.level);
    if !config.logging.level.trim().is_empty()
        && tracing_subscriber::EnvFilter::try_new(normalized.clone()).is_err()
    {
        out.warnings.push(ConfigWarning::LoggingLevelInvalid {
            value: config.logging.level.clone(),
            normalized,
        });
    }

    if config.logging.buffer_lines == 0 {
        out.warnings.push(ConfigWarning::InvalidValue {
            toml_path: "logging.buffer_lines".to_string(),
            message: "must be >= 1".to_string(),
        });
    }
}
