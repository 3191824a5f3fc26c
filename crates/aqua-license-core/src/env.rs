pub use std::env::*;
use std::{path::PathBuf, sync::LazyLock, time::Duration};

use indexmap::IndexMap;

// Credential variables, in the order they are reported
pub const AQUA_USER: &str = "AQUA_USER";
pub const AQUA_PASSWORD: &str = "AQUA_PASSWORD";
pub const AQUA_KEY: &str = "AQUA_KEY";
pub const AQUA_SECRET: &str = "AQUA_SECRET";
pub const AQUA_ROLE: &str = "AQUA_ROLE";
pub const AQUA_METHODS: &str = "AQUA_METHODS";
pub const CSP_ENDPOINT: &str = "CSP_ENDPOINT";
pub const AQUA_ENDPOINT: &str = "AQUA_ENDPOINT";

pub const CREDENTIAL_VARS: [&str; 8] = [
    AQUA_USER,
    AQUA_PASSWORD,
    AQUA_KEY,
    AQUA_SECRET,
    AQUA_ROLE,
    AQUA_METHODS,
    CSP_ENDPOINT,
    AQUA_ENDPOINT,
];

// Store location and locking
pub const AQUA_CONFIG_DIR: &str = "AQUA_CONFIG_DIR";
pub const AQUA_LOCK_TIMEOUT_MS: &str = "AQUA_LOCK_TIMEOUT_MS";

pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

pub static HOME_DIR: LazyLock<PathBuf> = LazyLock::new(|| dirs::home_dir().unwrap_or_default());

/// Directory holding `profiles.toml` when neither `--config-dir` nor
/// `AQUA_CONFIG_DIR` is given.
pub fn default_config_dir() -> PathBuf {
    var_path(AQUA_CONFIG_DIR).unwrap_or_else(|| HOME_DIR.join(".aqua"))
}

/// Bounded wait for the store lock, overridable through `AQUA_LOCK_TIMEOUT_MS`.
pub fn lock_timeout() -> Duration {
    var(AQUA_LOCK_TIMEOUT_MS)
        .ok()
        .and_then(|ms| ms.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_LOCK_TIMEOUT)
}

fn var_path(name: &str) -> Option<PathBuf> {
    var_os(name).filter(|v| !v.is_empty()).map(PathBuf::from)
}

/// Snapshot of the recognised credential variables.
///
/// Taken once per invocation so resolution never reads the live process
/// environment. Empty values are treated as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvVars {
    values: IndexMap<&'static str, String>,
}

impl EnvVars {
    pub fn from_process() -> Self {
        Self::from_pairs(
            CREDENTIAL_VARS
                .iter()
                .filter_map(|name| var(name).ok().map(|value| (*name, value))),
        )
    }

    /// Build a snapshot from explicit pairs; unrecognised names are dropped.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut values = IndexMap::new();
        for (name, value) in pairs {
            let Some(known) = CREDENTIAL_VARS.iter().find(|v| **v == name.as_ref()) else {
                continue;
            };
            let value = value.into();
            if !value.trim().is_empty() {
                values.insert(*known, value);
            }
        }
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Names of the variables that are set, in canonical order.
    pub fn names(&self) -> Vec<&'static str> {
        CREDENTIAL_VARS
            .iter()
            .copied()
            .filter(|name| self.contains(name))
            .collect()
    }
}
