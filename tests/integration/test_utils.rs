//! Shared test utilities for integration tests
//!
//! Serializes access to process-wide environment variables so config tests
//! can point HOME and XDG_CONFIG_HOME at temporary directories.

use std::sync::Mutex;
use tempfile::TempDir;

/// Global mutex to serialize environment variable access across all tests
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const ISOLATED_VARS: &[&str] = &[
    "HOME",
    "XDG_CONFIG_HOME",
    "PATHFINDER_ENV",
    "PATHFINDER__STORAGE__ROOT",
    "PATHFINDER__STORAGE__QUARANTINE_CORRUPT",
    "PATHFINDER__REPLAY__STEP_INTERVAL_MS",
    "PATHFINDER__IMPORT__DEFAULT_LIMIT",
];

/// Environment variable state to restore after test
struct EnvState(Vec<(&'static str, Option<String>)>);

impl EnvState {
    fn capture() -> Self {
        Self(
            ISOLATED_VARS
                .iter()
                .map(|key| (*key, std::env::var(key).ok()))
                .collect(),
        )
    }

    fn restore(self) {
        for (key, value) in self.0 {
            match value {
                Some(orig) => std::env::set_var(key, orig),
                None => std::env::remove_var(key),
            }
        }
    }
}

/// Run `f` with HOME and XDG_CONFIG_HOME inside `test_dir` and every
/// PATHFINDER_* override cleared; `vars` are then applied on top.
///
/// The user config file lives at `<test_dir>/pathfinder/config.toml`.
pub fn with_isolated_env<F, R>(test_dir: &TempDir, vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let env_state = EnvState::capture();

    let test_home = test_dir.path().join("home");
    std::fs::create_dir_all(&test_home).unwrap();
    for key in ISOLATED_VARS {
        std::env::remove_var(key);
    }
    std::env::set_var("HOME", &test_home);
    std::env::set_var("XDG_CONFIG_HOME", test_dir.path());
    for (key, value) in vars {
        std::env::set_var(key, value);
    }

    let result = f();

    env_state.restore();

    result
}
