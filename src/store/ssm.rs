//! AWS Systems Manager Parameter Store backend.

use super::{Parameter, ParameterBatch, ParameterPage, ParameterStore};
use crate::error::StoreError;
use async_trait::async_trait;
use aws_config::environment::EnvironmentVariableRegionProvider;
use aws_config::imds::region::ImdsRegionProvider;
use aws_config::meta::region::RegionProviderChain;
use aws_config::profile::ProfileFileRegionProvider;
use aws_config::sts::AssumeRoleProvider;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_sdk_ssm::error::DisplayErrorContext;
use aws_sdk_ssm::Client;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Session name used when assuming a role.
const ASSUME_ROLE_SESSION_NAME: &str = "env-injector";

/// Parameter store backed by an SSM client.
pub struct SsmParameterStore {
    client: Client,
}

impl SsmParameterStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from ambient AWS configuration.
    ///
    /// The region comes from the environment or shared config, falling back
    /// to EC2 instance metadata. When `assume_role_arn` is set, every call is
    /// made with credentials for that role.
    pub async fn connect(assume_role_arn: Option<&str>) -> Result<Self, StoreError> {
        let region = resolve_region().await?;
        info!("connecting to parameter store in {region}");

        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(region)
            .load()
            .await;

        let credentials = match assume_role_arn {
            Some(arn) => {
                info!("assuming role {arn}");
                let provider = AssumeRoleProvider::builder(arn)
                    .session_name(ASSUME_ROLE_SESSION_NAME)
                    .configure(&shared)
                    .build()
                    .await;
                SharedCredentialsProvider::new(provider)
            }
            None => shared.credentials_provider().ok_or_else(|| {
                StoreError::Session("no credentials provider configured".to_string())
            })?,
        };
        // The session only counts as established once credentials resolve.
        credentials
            .provide_credentials()
            .await
            .map_err(session_error)?;

        let builder =
            aws_sdk_ssm::config::Builder::from(&shared).credentials_provider(credentials);
        Ok(Self::new(Client::from_conf(builder.build())))
    }
}

async fn resolve_region() -> Result<Region, StoreError> {
    let explicit = RegionProviderChain::first_try(EnvironmentVariableRegionProvider::new())
        .or_else(ProfileFileRegionProvider::new());
    if let Some(region) = explicit.region().await {
        return Ok(region);
    }

    debug!("no explicit region configurations, retrieving instance metadata");
    RegionProviderChain::first_try(ImdsRegionProvider::builder().build())
        .region()
        .await
        .ok_or(StoreError::RegionNotFound)
}

fn session_error<E>(err: E) -> StoreError
where
    E: std::error::Error,
{
    StoreError::Session(DisplayErrorContext(err).to_string())
}

fn request_error<E>(operation: &'static str, err: E) -> StoreError
where
    E: std::error::Error,
{
    StoreError::Request {
        operation,
        message: DisplayErrorContext(err).to_string(),
    }
}

fn convert(param: &aws_sdk_ssm::types::Parameter) -> Option<Parameter> {
    let name = param.name()?;
    Some(Parameter::new(name, param.value().unwrap_or_default()))
}

#[async_trait]
impl ParameterStore for SsmParameterStore {
    async fn get_parameters_by_path(
        &self,
        path: &str,
        next_token: Option<String>,
    ) -> Result<ParameterPage, StoreError> {
        let output = self
            .client
            .get_parameters_by_path()
            .path(path)
            .with_decryption(true)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|err| request_error("GetParametersByPath", err))?;

        Ok(ParameterPage {
            parameters: output.parameters().iter().filter_map(convert).collect(),
            next_token: output.next_token().map(str::to_owned),
        })
    }

    async fn get_parameters(&self, names: &[String]) -> Result<ParameterBatch, StoreError> {
        let output = self
            .client
            .get_parameters()
            .set_names(Some(names.to_vec()))
            .with_decryption(true)
            .send()
            .await
            .map_err(|err| request_error("GetParameters", err))?;

        Ok(ParameterBatch {
            parameters: output.parameters().iter().filter_map(convert).collect(),
            invalid_names: output.invalid_parameters().to_vec(),
        })
    }
}

/// Lazily connected [`SsmParameterStore`].
///
/// The session is created on the first remote call and reused afterwards, so
/// a run with nothing to inject never touches AWS configuration at all.
pub struct ServiceAccessor {
    assume_role_arn: Option<String>,
    store: OnceCell<SsmParameterStore>,
}

impl ServiceAccessor {
    pub fn new(assume_role_arn: Option<String>) -> Self {
        Self {
            assume_role_arn,
            store: OnceCell::new(),
        }
    }

    pub async fn store(&self) -> Result<&SsmParameterStore, StoreError> {
        self.store
            .get_or_try_init(|| SsmParameterStore::connect(self.assume_role_arn.as_deref()))
            .await
    }
}

#[async_trait]
impl ParameterStore for ServiceAccessor {
    async fn get_parameters_by_path(
        &self,
        path: &str,
        next_token: Option<String>,
    ) -> Result<ParameterPage, StoreError> {
        self.store()
            .await?
            .get_parameters_by_path(path, next_token)
            .await
    }

    async fn get_parameters(&self, names: &[String]) -> Result<ParameterBatch, StoreError> {
        self.store().await?.get_parameters(names).await
    }
}
