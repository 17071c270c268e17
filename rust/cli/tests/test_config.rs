use std::io::Write;

use banker_cli::config::{self, ValueSource};
use banker_cli::run;
use serial_test::serial;

const VARS: [&str; 4] = [
    config::CONFIG_ENV,
    config::SEED_ENV,
    config::AGGRESSIVENESS_ENV,
    config::ACCEPT_RATIO_ENV,
];

/// Sets the given vars, clears the other `BANKER_*` vars, restores on drop.
struct EnvGuard {
    restores: Vec<(&'static str, Option<String>)>,
}

impl EnvGuard {
    fn apply(pairs: &[(&'static str, &str)]) -> Self {
        let restores = VARS.iter().map(|k| (*k, std::env::var(k).ok())).collect();
        for key in VARS {
            // SAFETY: env-mutating tests are serialized with #[serial]
            unsafe { std::env::remove_var(key) };
        }
        for (key, value) in pairs {
            unsafe { std::env::set_var(key, value) };
        }
        EnvGuard { restores }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, previous) in &self.restores {
            match previous {
                Some(val) => unsafe { std::env::set_var(key, val) },
                None => unsafe { std::env::remove_var(key) },
            }
        }
    }
}

#[test]
#[serial]
fn defaults_without_overrides() {
    let _env = EnvGuard::apply(&[]);
    let resolved = config::load_with_sources().unwrap();
    assert_eq!(resolved.config, config::Config::default());
    assert_eq!(resolved.sources.seed, ValueSource::Default);
    assert_eq!(resolved.sources.aggressiveness, ValueSource::Default);
}

#[test]
#[serial]
fn env_overrides_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "seed = 7\naggressiveness = 1.2\naccept_ratio = 0.5").unwrap();
    let path = file.path().to_str().unwrap().to_string();
    let _env = EnvGuard::apply(&[
        (config::CONFIG_ENV, path.as_str()),
        (config::SEED_ENV, "42"),
    ]);

    let resolved = config::load_with_sources().unwrap();
    assert_eq!(resolved.config.seed, Some(42));
    assert_eq!(resolved.sources.seed, ValueSource::Env);
    assert_eq!(resolved.config.aggressiveness, 1.2);
    assert_eq!(resolved.sources.aggressiveness, ValueSource::File);
    assert_eq!(resolved.config.accept_ratio, 0.5);
    assert_eq!(resolved.sources.accept_ratio, ValueSource::File);
}

#[test]
#[serial]
fn invalid_env_values_are_errors() {
    let _env = EnvGuard::apply(&[(config::AGGRESSIVENESS_ENV, "3.0")]);
    assert!(config::load().is_err());
    drop(_env);

    let _env = EnvGuard::apply(&[(config::SEED_ENV, "not-a-number")]);
    assert!(config::load().is_err());
}

#[test]
#[serial]
fn cfg_command_reports_sources() {
    let _env = EnvGuard::apply(&[(config::ACCEPT_RATIO_ENV, "0.65")]);
    let mut out = Vec::new();
    let mut err = Vec::new();
    assert_eq!(run(["banker", "cfg"], &mut out, &mut err), 0);
    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(json["accept_ratio"]["value"], 0.65);
    assert_eq!(json["accept_ratio"]["source"], "env");
    assert_eq!(json["aggressiveness"]["source"], "default");
    assert!(json["seed"]["value"].is_null());
    assert!(err.is_empty());
}

#[test]
#[serial]
fn broken_config_file_fails_commands() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "aggressiveness = \"very\"").unwrap();
    let path = file.path().to_str().unwrap().to_string();
    let _env = EnvGuard::apply(&[(config::CONFIG_ENV, path.as_str())]);

    let mut out = Vec::new();
    let mut err = Vec::new();
    assert_eq!(run(["banker", "cfg"], &mut out, &mut err), 2);
    let msg = String::from_utf8(err).unwrap();
    assert!(msg.contains("Invalid configuration"), "{}", msg);

    let mut err = Vec::new();
    assert_eq!(
        run(["banker", "sim", "--sessions", "1"], &mut out, &mut err),
        2
    );
}

#[test]
#[serial]
fn configured_seed_drives_the_simulation() {
    let _env = EnvGuard::apply(&[(config::SEED_ENV, "1234")]);
    let mut out = Vec::new();
    let mut err = Vec::new();
    assert_eq!(run(["banker", "sim", "--sessions", "2"], &mut out, &mut err), 0);
    assert!(String::from_utf8(out).unwrap().contains("seed=1234"));
}
