use crate::environment::Environment;
use serde::Serialize;

/// Hierarchical path for injection by path.
pub const PATH_VAR: &str = "ENV_INJECTOR_PATH";
/// Flat prefix for injection by prefix.
pub const PREFIX_VAR: &str = "ENV_INJECTOR_PREFIX";
/// Role to assume before talking to the parameter store.
pub const ASSUME_ROLE_ARN_VAR: &str = "ENV_INJECTOR_ASSUME_ROLE_ARN";
/// Enables debug diagnostics.
pub const VERBOSE_VAR: &str = "ENV_INJECTOR_VERBOSE";

/// Settings read from `ENV_INJECTOR_*` variables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectorConfig {
    /// Empty disables injection by path.
    pub path: String,
    /// Empty disables injection by prefix.
    pub prefix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assume_role_arn: Option<String>,
    pub verbose: bool,
}

impl InjectorConfig {
    /// Load configuration from an environment snapshot, after any env file
    /// has been merged into it.
    pub fn from_environment(env: &Environment) -> Self {
        Self::from_lookup(|key| env.get(key).map(str::to_owned))
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            path: lookup(PATH_VAR).unwrap_or_default(),
            prefix: lookup(PREFIX_VAR).unwrap_or_default(),
            assume_role_arn: lookup(ASSUME_ROLE_ARN_VAR).filter(|arn| !arn.is_empty()),
            verbose: lookup(VERBOSE_VAR).is_some_and(|v| is_truthy(&v)),
        }
    }

    /// Whether either injection strategy is configured.
    pub fn is_enabled(&self) -> bool {
        !self.path.is_empty() || !self.prefix.is_empty()
    }
}

fn is_truthy(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn unset_variables_disable_everything() {
        let config = InjectorConfig::from_lookup(lookup(&[]));
        assert_eq!(config, InjectorConfig::default());
        assert!(!config.is_enabled());
    }

    #[test]
    fn reads_all_variables() {
        let config = InjectorConfig::from_lookup(lookup(&[
            (PATH_VAR, "/app/prod"),
            (PREFIX_VAR, "secrets"),
            (ASSUME_ROLE_ARN_VAR, "arn:aws:iam::123456789012:role/app"),
            (VERBOSE_VAR, "1"),
        ]));
        assert_eq!(config.path, "/app/prod");
        assert_eq!(config.prefix, "secrets");
        assert_eq!(
            config.assume_role_arn.as_deref(),
            Some("arn:aws:iam::123456789012:role/app")
        );
        assert!(config.verbose);
        assert!(config.is_enabled());
    }

    #[test]
    fn empty_role_arn_means_ambient_credentials() {
        let config = InjectorConfig::from_lookup(lookup(&[(ASSUME_ROLE_ARN_VAR, "")]));
        assert_eq!(config.assume_role_arn, None);
    }

    #[test]
    fn verbose_accepts_falsey_values() {
        for value in ["0", "false", "FALSE", "off", ""] {
            let config = InjectorConfig::from_lookup(lookup(&[(VERBOSE_VAR, value)]));
            assert!(!config.verbose, "{value} should not enable verbose");
        }
        let config = InjectorConfig::from_lookup(lookup(&[(VERBOSE_VAR, "yes")]));
        assert!(config.verbose);
    }

    #[test]
    fn env_file_can_carry_settings() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{VERBOSE_VAR}=1").unwrap();
        writeln!(file, "{PATH_VAR}=/app/prod").unwrap();

        let mut env = Environment::from_pairs([(PREFIX_VAR, "secrets")]);
        env.load_env_file(file.path()).unwrap();
        let config = InjectorConfig::from_environment(&env);

        assert!(config.verbose);
        assert_eq!(config.path, "/app/prod");
        assert_eq!(config.prefix, "secrets");
    }
}
