//! Injection of every parameter under a hierarchical path.

use super::{InjectionReport, InjectionSource, SkipReason};
use crate::environment::{is_valid_key, Environment};
use crate::error::InjectorError;
use crate::store::ParameterStore;
use tracing::{debug, info, warn};

/// Inject all parameters under `path`, keyed by their name relative to it.
///
/// Existing non-empty variables are never overwritten. Any listing error
/// aborts, since a partially read listing cannot be trusted.
pub async fn inject_by_path(
    store: &dyn ParameterStore,
    env: &mut Environment,
    path: &str,
) -> Result<InjectionReport, InjectorError> {
    let mut report = InjectionReport::default();
    if path.is_empty() {
        debug!("no parameter path specified, skipping injection by path");
        return Ok(report);
    }
    debug!("parameter path: {path}");

    let mut next_token: Option<String> = None;
    let mut pages = 0usize;
    loop {
        let page = store
            .get_parameters_by_path(path, next_token.take())
            .await
            .map_err(|source| {
                if source.is_fatal() {
                    InjectorError::Session(source)
                } else {
                    InjectorError::PathListing {
                        path: path.to_string(),
                        source,
                    }
                }
            })?;
        pages += 1;

        for param in &page.parameters {
            let Some(key) = relative_key(path, &param.name) else {
                warn!("parameter {} is not under {path}, skipping", param.name);
                report.record_skipped(&param.name, SkipReason::NotUnderPath);
                continue;
            };
            if !is_valid_key(key) {
                warn!(
                    "parameter {} does not map to a valid variable name, skipping",
                    param.name
                );
                report.record_skipped(&param.name, SkipReason::InvalidKey);
                continue;
            }

            if env.set_if_absent(key, &param.value) {
                debug!("env injected: {key}");
                report.record_injected(key, &param.name, &param.value, InjectionSource::Path);
            } else {
                debug!("{key} already set, not overwriting");
                report.record_skipped(&param.name, SkipReason::AlreadySet);
            }
        }

        match page.next_token {
            Some(token) if !token.is_empty() => next_token = Some(token),
            _ => break,
        }
    }

    info!(
        "injected {} variable(s) from {path} ({pages} page(s))",
        report.injected.len()
    );
    Ok(report)
}

/// Name of `name` relative to `path`, or `None` if it is not under it.
///
/// A trailing `/` on `path` is ignored, so `/app/prod` and `/app/prod/` are
/// equivalent.
pub fn relative_key<'a>(path: &str, name: &'a str) -> Option<&'a str> {
    let base = path.trim_end_matches('/');
    name.strip_prefix(base)?.strip_prefix('/')
}
