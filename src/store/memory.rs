//! In-memory parameter store.
//!
//! Serves a fixed sequence of listing pages and a table of named parameters,
//! with optional injected failures. Every call is recorded so callers can
//! assert on request order and count.

use super::{Parameter, ParameterBatch, ParameterPage, ParameterStore};
use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::Mutex;

/// A request received by [`MemoryParameterStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    ByPath {
        path: String,
        next_token: Option<String>,
    },
    Named(Vec<String>),
}

#[derive(Default)]
pub struct MemoryParameterStore {
    pages: Vec<Vec<Parameter>>,
    named: BTreeMap<String, String>,
    failing_names: BTreeSet<String>,
    listing_failure: Option<String>,
    session_failure: bool,
    calls: Mutex<Vec<StoreCall>>,
}

impl MemoryParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listing page. Every page but the last carries a continuation
    /// token; the last carries an empty one.
    pub fn with_page<I>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, &'static str)>,
    {
        self.pages.push(
            parameters
                .into_iter()
                .map(|(name, value)| Parameter::new(name, value))
                .collect(),
        );
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.named.insert(name.into(), value.into());
        self
    }

    /// Make any named lookup that includes `name` fail as a transport error.
    pub fn failing_on(mut self, name: impl Into<String>) -> Self {
        self.failing_names.insert(name.into());
        self
    }

    pub fn failing_listing(mut self, message: impl Into<String>) -> Self {
        self.listing_failure = Some(message.into());
        self
    }

    /// Fail every call as if no session could be established.
    pub fn without_session(mut self) -> Self {
        self.session_failure = true;
        self
    }

    pub async fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().await.clone()
    }

    fn page_token(index: usize) -> String {
        format!("token-{index}")
    }

    fn session_error() -> StoreError {
        StoreError::Session("no credentials provider configured".to_string())
    }
}

#[async_trait]
impl ParameterStore for MemoryParameterStore {
    async fn get_parameters_by_path(
        &self,
        path: &str,
        next_token: Option<String>,
    ) -> Result<ParameterPage, StoreError> {
        self.calls.lock().await.push(StoreCall::ByPath {
            path: path.to_string(),
            next_token: next_token.clone(),
        });

        if self.session_failure {
            return Err(Self::session_error());
        }
        if let Some(message) = &self.listing_failure {
            return Err(StoreError::Request {
                operation: "GetParametersByPath",
                message: message.clone(),
            });
        }

        let index = match next_token {
            None => 0,
            Some(token) => (1..self.pages.len())
                .find(|i| Self::page_token(*i) == token)
                .ok_or_else(|| StoreError::Request {
                    operation: "GetParametersByPath",
                    message: format!("invalid next token '{token}'"),
                })?,
        };

        let Some(parameters) = self.pages.get(index) else {
            return Ok(ParameterPage::default());
        };
        let next_token = if index + 1 < self.pages.len() {
            Self::page_token(index + 1)
        } else {
            String::new()
        };

        Ok(ParameterPage {
            parameters: parameters.clone(),
            next_token: Some(next_token),
        })
    }

    async fn get_parameters(&self, names: &[String]) -> Result<ParameterBatch, StoreError> {
        self.calls.lock().await.push(StoreCall::Named(names.to_vec()));

        if self.session_failure {
            return Err(Self::session_error());
        }
        if let Some(name) = names.iter().find(|n| self.failing_names.contains(*n)) {
            return Err(StoreError::Request {
                operation: "GetParameters",
                message: format!("connection reset while fetching {name}"),
            });
        }

        let mut batch = ParameterBatch::default();
        for name in names {
            match self.named.get(name) {
                Some(value) => batch.parameters.push(Parameter::new(name, value)),
                None => batch.invalid_names.push(name.clone()),
            }
        }
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn pages_are_chained_by_token() {
        let store = MemoryParameterStore::new()
            .with_page([("/a/X", "1")])
            .with_page([("/a/Y", "2")]);

        let first = store.get_parameters_by_path("/a", None).await.unwrap();
        assert_eq!(first.next_token.as_deref(), Some("token-1"));

        let second = store
            .get_parameters_by_path("/a", first.next_token)
            .await
            .unwrap();
        assert_eq!(second.parameters, vec![Parameter::new("/a/Y", "2")]);
        assert_eq!(second.next_token.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn unknown_names_are_invalid() {
        let store = MemoryParameterStore::new().with_parameter("p.A", "a");
        let batch = store
            .get_parameters(&["p.A".to_string(), "p.B".to_string()])
            .await
            .unwrap();
        assert_eq!(batch.parameters, vec![Parameter::new("p.A", "a")]);
        assert_eq!(batch.invalid_names, vec!["p.B".to_string()]);
    }

    #[tokio::test]
    async fn records_calls() {
        let store = MemoryParameterStore::new().failing_on("p.A");
        assert!(store.get_parameters(&["p.A".to_string()]).await.is_err());
        assert_eq!(
            store.calls().await,
            vec![StoreCall::Named(vec!["p.A".to_string()])]
        );
    }
}
