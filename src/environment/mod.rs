//! Owned snapshot of the process environment.
//!
//! The injectors never call `std::env::set_var`. They write into an
//! [`Environment`], which remembers every key it changed so the launcher can
//! hand exactly those overrides to the wrapped command while the rest of the
//! parent environment (including variables that are not valid UTF-8) is
//! inherited untouched.

use crate::error::InjectorError;
use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
    /// Names that are set to a value that is not valid UTF-8. They count as
    /// present but are never read or rewritten.
    opaque: BTreeSet<String>,
    overrides: BTreeSet<String>,
}

impl Environment {
    /// Snapshot the current process environment.
    pub fn capture() -> Self {
        Self::from_os_pairs(std::env::vars_os())
    }

    /// Build a snapshot from raw OS pairs. A variable with a UTF-8 name and a
    /// non-UTF-8 value is recorded as present. A non-UTF-8 name cannot match
    /// any injected key, so it is left to plain inheritance.
    pub fn from_os_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let mut env = Self::default();
        for (key, value) in pairs {
            let Ok(key) = key.into_string() else {
                continue;
            };
            match value.into_string() {
                Ok(value) => {
                    env.vars.insert(key, value);
                }
                Err(_) => {
                    env.opaque.insert(key);
                }
            }
        }
        env
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            opaque: BTreeSet::new(),
            overrides: BTreeSet::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Whether `key` is set at all, including to a non-UTF-8 value.
    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key) || self.opaque.contains(key)
    }

    /// Unset and set-to-empty both count as absent.
    pub fn is_absent(&self, key: &str) -> bool {
        if self.opaque.contains(key) {
            return false;
        }
        self.get(key).map_or(true, str::is_empty)
    }

    /// Set `key` unconditionally.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.opaque.remove(&key);
        self.overrides.insert(key.clone());
        self.vars.insert(key, value.into());
    }

    /// Set `key` only if it is absent. Returns whether the value was written.
    pub fn set_if_absent(&mut self, key: &str, value: &str) -> bool {
        if !self.is_absent(key) {
            return false;
        }
        self.set(key, value);
        true
    }

    /// Names of variables that are set to the empty string.
    ///
    /// Unset variables are not included: only an explicit empty value marks
    /// a variable as waiting for prefix injection.
    pub fn pending_injection(&self) -> PendingNames {
        PendingNames(
            self.vars
                .iter()
                .filter(|(_, v)| v.is_empty())
                .map(|(k, _)| k.clone())
                .collect(),
        )
    }

    /// Keys written since the snapshot was taken, with their current values.
    pub fn overrides(&self) -> impl Iterator<Item = (&str, &str)> {
        self.overrides
            .iter()
            .filter_map(|k| self.vars.get_key_value(k))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Merge a dotenv file into the snapshot. Variables already present win,
    /// matching `dotenvy`'s own non-overriding behavior.
    pub fn load_env_file(&mut self, path: &Path) -> Result<usize, InjectorError> {
        let to_err = |source| InjectorError::EnvFile {
            path: path.to_path_buf(),
            source,
        };

        let mut loaded = 0;
        for item in dotenvy::from_path_iter(path).map_err(to_err)? {
            let (key, value) = item.map_err(to_err)?;
            if self.contains(&key) {
                debug!("env file: {key} already set, keeping existing value");
                continue;
            }
            self.set(key, value);
            loaded += 1;
        }
        debug!("loaded {loaded} variable(s) from {}", path.display());
        Ok(loaded)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Variable names explicitly marked (by an empty value) for prefix injection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingNames(Vec<String>);

impl PendingNames {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Whether `key` can be passed to a child process as a variable name.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty() && !key.contains('=') && !key.contains('\0')
}
