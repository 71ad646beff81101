//! Runs both injection strategies in order, then launches the wrapped
//! command.
//!
//! Path injection runs first and never overwrites; prefix injection runs
//! second and overwrites the variables it targets. A variable marked empty
//! that path injection fills in is therefore no longer pending by the time
//! prefix injection scans the environment.

pub mod launch;

use crate::config::InjectorConfig;
use crate::environment::Environment;
use crate::error::InjectorError;
use crate::inject::{inject_by_path, inject_by_prefix, InjectionReport};
use crate::store::ParameterStore;
use std::convert::Infallible;
use std::ffi::OsString;
use tracing::info;

pub struct Orchestrator<'a> {
    store: &'a dyn ParameterStore,
    config: &'a InjectorConfig,
}

impl<'a> Orchestrator<'a> {
    pub fn new(store: &'a dyn ParameterStore, config: &'a InjectorConfig) -> Self {
        Self { store, config }
    }

    /// Run path injection, then prefix injection.
    pub async fn inject(&self, env: &mut Environment) -> Result<InjectionReport, InjectorError> {
        let mut report = inject_by_path(self.store, env, &self.config.path).await?;
        report.merge(inject_by_prefix(self.store, env, &self.config.prefix).await?);
        info!("{} variable(s) injected", report.injected.len());
        Ok(report)
    }

    /// Inject, then replace the current process with `command`.
    ///
    /// An empty command is rejected before anything is fetched.
    pub async fn run(
        &self,
        command: &[OsString],
        env: &mut Environment,
    ) -> Result<Infallible, InjectorError> {
        if command.is_empty() {
            return Err(InjectorError::MissingCommand);
        }
        self.inject(env).await?;
        launch::exec(command, env)
    }
}
