//! Environment sources.

use std::collections::{BTreeMap, HashMap};

/// Read access to environment-style key/value configuration.
///
/// The process environment is the production source; tests hand in maps.
pub trait EnvSource: Send + Sync {
    /// Raw value for `key`, if set.
    fn var(&self, key: &str) -> Option<String>;

    /// Value for `key` trimmed, treating blank values as unset.
    fn non_empty(&self, key: &str) -> Option<String> {
        self.var(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}
