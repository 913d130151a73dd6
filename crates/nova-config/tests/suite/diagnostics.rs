use nova_config::{CompatConfig, ConfigValidationError, ConfigWarning};
use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;

#[test]
fn reports_unknown_keys_with_full_paths() {
    let text = r#"
typo = 1

[annotations]
compatt = "kotlin.android.Compat"

[analysis]
min_apii = 21
"#;

    let (_config, diagnostics) =
        CompatConfig::load_from_str_with_diagnostics(text).expect("config should parse");

    assert_eq!(
        diagnostics.unknown_keys,
        vec!["analysis.min_apii", "annotations.compatt", "typo"]
    );
    assert!(diagnostics.is_ok());
}

#[test]
fn parses_every_section() {
    let text = r#"
[annotations]
compat = "com.example.Shim"
gates = ["com.example.Since"]

[analysis]
min_api = 21
threads = 2
allow_value_vararg = true

[logging]
level = "nova.compat=debug"
json = true
"#;

    let (config, diagnostics) =
        CompatConfig::load_from_str_with_diagnostics(text).expect("config should parse");

    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    assert_eq!(config.annotations.compat, "com.example.Shim");
    assert_eq!(config.annotations.gates, vec!["com.example.Since".to_string()]);
    assert_eq!(config.analysis.min_api, 21);
    assert_eq!(config.analysis.threads, Some(2));
    assert!(config.analysis.allow_value_vararg);
    assert!(config.logging.json);
}

#[test]
fn semantic_errors_are_collected_in_one_pass() {
    let text = r#"
[annotations]
compat = " "
gates = []

[analysis]
min_api = 0
threads = 0
"#;

    let (_config, diagnostics) =
        CompatConfig::load_from_str_with_diagnostics(text).expect("config should parse");

    assert_eq!(
        diagnostics.errors,
        vec![
            ConfigValidationError::InvalidValue {
                toml_path: "annotations.compat".to_string(),
                message: "must name an annotation type".to_string(),
            },
            ConfigValidationError::NoGateAnnotations,
            ConfigValidationError::InvalidValue {
                toml_path: "analysis.min_api".to_string(),
                message: "must be >= 1".to_string(),
            },
        ]
    );
    assert_eq!(
        diagnostics.warnings,
        vec![ConfigWarning::InvalidValue {
            toml_path: "analysis.threads".to_string(),
            message: "must be >= 1; using a single thread".to_string(),
        }]
    );
}

#[test]
fn duplicate_gates_and_bad_log_levels_are_warnings() {
    let text = r#"
[annotations]
gates = ["android.annotation.TargetApi", "android.annotation.TargetApi"]

[logging]
level = "nova.compat=notalevel"
"#;

    let (_config, diagnostics) =
        CompatConfig::load_from_str_with_diagnostics(text).expect("config should parse");

    assert!(diagnostics.is_ok());
    assert_eq!(
        diagnostics.warnings,
        vec![
            ConfigWarning::DuplicateGateAnnotation {
                name: "android.annotation.TargetApi".to_string(),
            },
            ConfigWarning::LoggingLevelInvalid {
                value: "nova.compat=notalevel".to_string(),
                normalized: "nova.compat=notalevel".to_string(),
            },
        ]
    );
}

#[test]
fn load_from_path_reads_toml_files() {
    let file = NamedTempFile::new().expect("tempfile");
    std::fs::write(file.path(), "[analysis]\nmin_api = 26\n").expect("write config");

    let config = CompatConfig::load_from_path(file.path()).expect("config loads");
    assert_eq!(config.analysis.min_api, 26);

    let (config, diagnostics) =
        CompatConfig::load_from_path_with_diagnostics(file.path()).expect("config loads");
    assert_eq!(config.analysis.min_api, 26);
    assert!(diagnostics.is_empty());
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = CompatConfig::load_from_path(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, nova_config::ConfigError::Io { .. }), "{err}");
}
