pub mod cli;
pub mod config;
pub mod environment;
pub mod error;
pub mod inject;
pub mod logging;
pub mod orchestrator;
pub mod store;

pub use error::{InjectorError, StoreError};
