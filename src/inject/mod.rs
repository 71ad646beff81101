//! Injection strategies.
//!
//! 1. **Path**: list everything under a hierarchical path and fill in
//!    variables that are absent (never overwrites).
//! 2. **Prefix**: look up `prefix + NAME` for every variable set to the
//!    empty string and overwrite it.
//!
//! Both write into an [`crate::environment::Environment`] and return an
//! [`InjectionReport`] describing what happened.

pub mod path;
pub mod prefix;

pub use path::inject_by_path;
pub use prefix::inject_by_prefix;

use serde::Serialize;

/// Which strategy injected a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InjectionSource {
    Path,
    Prefix,
}

/// A variable written into the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectedVar {
    pub key: String,
    /// Fully-qualified parameter name the value came from.
    pub parameter: String,
    pub source: InjectionSource,
    pub redacted_value: String,
}

/// Why a parameter or pending variable was not injected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Parameter name does not fall under the requested path.
    NotUnderPath,
    /// Derived key cannot be used as an environment variable name.
    InvalidKey,
    /// Variable already had a non-empty value.
    AlreadySet,
    /// Store reported the name as invalid or missing.
    InvalidParameter,
    /// The lookup request failed.
    FetchFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    pub name: String,
    pub reason: SkipReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InjectionReport {
    pub injected: Vec<InjectedVar>,
    pub skipped: Vec<Skipped>,
}

impl InjectionReport {
    pub(crate) fn record_injected(
        &mut self,
        key: &str,
        parameter: &str,
        value: &str,
        source: InjectionSource,
    ) {
        self.injected.push(InjectedVar {
            key: key.to_string(),
            parameter: parameter.to_string(),
            source,
            redacted_value: redact_secret(value),
        });
    }

    pub(crate) fn record_skipped(&mut self, name: &str, reason: SkipReason) {
        self.skipped.push(Skipped {
            name: name.to_string(),
            reason,
            detail: None,
        });
    }

    pub(crate) fn record_failed(&mut self, name: &str, detail: String) {
        self.skipped.push(Skipped {
            name: name.to_string(),
            reason: SkipReason::FetchFailed,
            detail: Some(detail),
        });
    }

    pub fn merge(&mut self, other: InjectionReport) {
        self.injected.extend(other.injected);
        self.skipped.extend(other.skipped);
    }

    pub fn injected_keys(&self) -> impl Iterator<Item = &str> {
        self.injected.iter().map(|v| v.key.as_str())
    }
}

/// Redact a secret value for display (first 2 and last 2 chars).
pub fn redact_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 6 {
        return "***".to_string();
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{head}…{tail}")
}
