use std::ffi::OsString;

use nova_config::{
    discover_config_path, load_for_root, load_for_root_with_diagnostics, with_config_env_lock,
    CompatConfig, CONFIG_ENV_VAR,
};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

struct EnvVarGuard {
    key: &'static str,
    prev: Option<OsString>,
}

impl EnvVarGuard {
    fn set(key: &'static str, value: &std::path::Path) -> Self {
        let prev = std::env::var_os(key);
        std::env::set_var(key, value);
        Self { key, prev }
    }

    fn unset(key: &'static str) -> Self {
        let prev = std::env::var_os(key);
        std::env::remove_var(key);
        Self { key, prev }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        match &self.prev {
            Some(v) => std::env::set_var(self.key, v),
            None => std::env::remove_var(self.key),
        }
    }
}

#[test]
fn discovers_config_in_root() {
    with_config_env_lock(|| {
        let _env = EnvVarGuard::unset(CONFIG_ENV_VAR);
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nova-compat.toml");
        std::fs::write(&path, "[analysis]\nmin_api = 21\n").expect("write config");

        let discovered = discover_config_path(dir.path()).expect("config discovered");
        assert_eq!(discovered, path.canonicalize().expect("canonical path"));

        let (config, found) = load_for_root(dir.path()).expect("config loads");
        assert_eq!(found, Some(discovered));
        assert_eq!(config.analysis.min_api, 21);
    });
}

#[test]
fn dotfile_is_a_fallback() {
    with_config_env_lock(|| {
        let _env = EnvVarGuard::unset(CONFIG_ENV_VAR);
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join(".nova-compat.toml");
        std::fs::write(&path, "").expect("write config");

        assert_eq!(
            discover_config_path(dir.path()),
            Some(path.canonicalize().expect("canonical path"))
        );
    });
}

#[test]
fn env_var_overrides_discovery() {
    with_config_env_lock(|| {
        let dir = tempdir().expect("tempdir");
        std::fs::write(dir.path().join("nova-compat.toml"), "").expect("write config");
        let custom = dir.path().join("custom.toml");
        std::fs::write(&custom, "[analysis]\nallow_value_vararg = true\ntypo = 1\n")
            .expect("write config");
        let _env = EnvVarGuard::set(CONFIG_ENV_VAR, &custom);

        let (config, found, diagnostics) =
            load_for_root_with_diagnostics(dir.path()).expect("config loads");
        assert_eq!(found, Some(custom.canonicalize().expect("canonical path")));
        assert!(config.analysis.allow_value_vararg);
        assert_eq!(diagnostics.unknown_keys, vec!["analysis.typo"]);
    });
}

#[test]
fn missing_config_uses_defaults() {
    with_config_env_lock(|| {
        let _env = EnvVarGuard::unset(CONFIG_ENV_VAR);
        let dir = tempdir().expect("tempdir");

        let (config, found) = load_for_root(dir.path()).expect("defaults");
        assert_eq!(found, None);
        assert_eq!(config, CompatConfig::default());
    });
}
