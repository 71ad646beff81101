//! Injection of individually named parameters for variables marked empty.

use super::{InjectionReport, InjectionSource, SkipReason};
use crate::environment::{is_valid_key, Environment};
use crate::error::InjectorError;
use crate::store::ParameterStore;
use tracing::{debug, info, warn};

/// Separator appended to the prefix when it is missing.
const PREFIX_SEPARATOR: char = '.';

/// Fetch `prefix + NAME` for every variable currently set to the empty
/// string and overwrite the variable with the result.
///
/// Names are fetched one request at a time: `GetParameters` rejects the
/// whole batch when a single name is not permitted. A failed lookup is
/// logged and skipped; only a session failure aborts.
pub async fn inject_by_prefix(
    store: &dyn ParameterStore,
    env: &mut Environment,
    prefix: &str,
) -> Result<InjectionReport, InjectorError> {
    let mut report = InjectionReport::default();
    if prefix.is_empty() {
        debug!("no parameter prefix specified, skipping injection by prefix");
        return Ok(report);
    }
    debug!("parameter prefix: {prefix}");
    let prefix = normalize_prefix(prefix);

    let pending = env.pending_injection();
    if pending.is_empty() {
        debug!("nothing to be injected by prefix");
        return Ok(report);
    }
    debug!("{} variable(s) pending injection by prefix", pending.len());

    for name in pending.iter() {
        let parameter = format!("{prefix}{name}");
        let batch = match store.get_parameters(std::slice::from_ref(&parameter)).await {
            Ok(batch) => batch,
            Err(err) if err.is_fatal() => return Err(InjectorError::Session(err)),
            Err(err) => {
                warn!("failed to get: {parameter}: {err}");
                report.record_failed(&parameter, err.to_string());
                continue;
            }
        };

        for invalid in &batch.invalid_names {
            debug!("invalid parameter: {invalid}");
            report.record_skipped(invalid, SkipReason::InvalidParameter);
        }
        for param in &batch.parameters {
            let key = param.name.strip_prefix(prefix.as_str()).unwrap_or(&param.name);
            if !is_valid_key(key) {
                warn!(
                    "parameter {} does not map to a valid variable name, skipping",
                    param.name
                );
                report.record_skipped(&param.name, SkipReason::InvalidKey);
                continue;
            }
            env.set(key, param.value.as_str());
            debug!("env injected: {key}");
            report.record_injected(key, &param.name, &param.value, InjectionSource::Prefix);
        }
    }

    info!(
        "injected {} of {} pending variable(s) by prefix {prefix}",
        report.injected.len(),
        pending.len()
    );
    Ok(report)
}

/// Ensure the prefix ends with the `.` separator.
pub fn normalize_prefix(prefix: &str) -> String {
    if prefix.ends_with(PREFIX_SEPARATOR) {
        prefix.to_string()
    } else {
        format!("{prefix}{PREFIX_SEPARATOR}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::{MemoryParameterStore, StoreCall};
    use pretty_assertions::assert_eq;

    #[test]
    fn prefix_gets_separator() {
        assert_eq!(normalize_prefix("secrets"), "secrets.");
        assert_eq!(normalize_prefix("secrets."), "secrets.");
        assert_eq!(normalize_prefix("app.prod"), "app.prod.");
    }

    #[tokio::test]
    async fn empty_prefix_is_a_noop() {
        let store = MemoryParameterStore::new().with_parameter("secrets.API_KEY", "xyz");
        let mut env = Environment::from_pairs([("API_KEY", "")]);

        inject_by_prefix(&store, &mut env, "").await.unwrap();

        assert_eq!(env.get("API_KEY"), Some(""));
        assert!(store.calls().await.is_empty());
    }

    #[tokio::test]
    async fn nothing_pending_makes_no_calls() {
        let store = MemoryParameterStore::new().without_session();
        let mut env = Environment::from_pairs([("API_KEY", "set")]);

        let report = inject_by_prefix(&store, &mut env, "secrets").await.unwrap();

        assert!(report.injected.is_empty());
        assert!(store.calls().await.is_empty());
    }

    #[tokio::test]
    async fn overwrites_marked_variables() {
        let store = MemoryParameterStore::new().with_parameter("secrets.API_KEY", "xyz");
        let mut env = Environment::from_pairs([("API_KEY", ""), ("OTHER", "keep")]);

        let report = inject_by_prefix(&store, &mut env, "secrets").await.unwrap();

        assert_eq!(env.get("API_KEY"), Some("xyz"));
        assert_eq!(env.get("OTHER"), Some("keep"));
        assert_eq!(report.injected[0].source, InjectionSource::Prefix);
        assert_eq!(
            store.calls().await,
            vec![StoreCall::Named(vec!["secrets.API_KEY".to_string()])]
        );
    }

    #[tokio::test]
    async fn one_request_per_name() {
        let store = MemoryParameterStore::new()
            .with_parameter("p.A", "1")
            .with_parameter("p.B", "2");
        let mut env = Environment::from_pairs([("A", ""), ("B", "")]);

        inject_by_prefix(&store, &mut env, "p.").await.unwrap();

        let calls = store.calls().await;
        assert_eq!(calls.len(), 2);
        assert!(calls
            .iter()
            .all(|call| matches!(call, StoreCall::Named(names) if names.len() == 1)));
    }

    #[tokio::test]
    async fn failed_fetch_does_not_stop_the_rest() {
        let store = MemoryParameterStore::new()
            .failing_on("secrets.A")
            .with_parameter("secrets.B", "b-value");
        let mut env = Environment::from_pairs([("A", ""), ("B", "")]);

        let report = inject_by_prefix(&store, &mut env, "secrets").await.unwrap();

        assert_eq!(env.get("A"), Some(""));
        assert_eq!(env.get("B"), Some("b-value"));
        assert_eq!(report.skipped[0].reason, SkipReason::FetchFailed);
        assert_eq!(report.skipped[0].name, "secrets.A");
    }

    #[tokio::test]
    async fn invalid_names_are_reported() {
        let store = MemoryParameterStore::new();
        let mut env = Environment::from_pairs([("MISSING", "")]);

        let report = inject_by_prefix(&store, &mut env, "secrets").await.unwrap();

        assert_eq!(env.get("MISSING"), Some(""));
        assert_eq!(report.skipped[0].name, "secrets.MISSING");
        assert_eq!(report.skipped[0].reason, SkipReason::InvalidParameter);
    }

    #[tokio::test]
    async fn invalid_keys_are_skipped() {
        let store = MemoryParameterStore::new().with_parameter("secrets.A=B", "v");
        let mut env = Environment::from_pairs([("A=B", "")]);

        let report = inject_by_prefix(&store, &mut env, "secrets").await.unwrap();

        assert!(report.injected.is_empty());
        assert_eq!(report.skipped[0].name, "secrets.A=B");
        assert_eq!(report.skipped[0].reason, SkipReason::InvalidKey);
        assert_eq!(env.overrides().count(), 0);
    }

    #[tokio::test]
    async fn session_failure_aborts() {
        let store = MemoryParameterStore::new().without_session();
        let mut env = Environment::from_pairs([("A", "")]);

        let err = inject_by_prefix(&store, &mut env, "secrets").await.unwrap_err();
        assert!(matches!(err, InjectorError::Session(_)));
    }
}
