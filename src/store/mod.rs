//! Parameter store abstraction.
//!
//! Two remote operations are consumed: a paginated listing under a
//! hierarchical path, and a lookup of explicitly named parameters. Values are
//! always requested decrypted.

pub mod memory;
pub mod ssm;

pub use memory::MemoryParameterStore;
pub use ssm::{ServiceAccessor, SsmParameterStore};

use crate::error::StoreError;
use async_trait::async_trait;
use serde::Serialize;

/// A parameter as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    /// Fully-qualified, `/`-delimited name.
    pub name: String,
    pub value: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One page of a path listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterPage {
    pub parameters: Vec<Parameter>,
    /// Cursor for the next page. `None` or an empty string ends pagination.
    pub next_token: Option<String>,
}

/// Result of a named lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterBatch {
    pub parameters: Vec<Parameter>,
    /// Requested names the store reported as invalid or missing.
    pub invalid_names: Vec<String>,
}

#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Fetch one page of parameters directly under `path`.
    async fn get_parameters_by_path(
        &self,
        path: &str,
        next_token: Option<String>,
    ) -> Result<ParameterPage, StoreError>;

    /// Fetch the named parameters.
    async fn get_parameters(&self, names: &[String]) -> Result<ParameterBatch, StoreError>;
}
