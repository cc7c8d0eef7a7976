use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_ecr::Client as EcrClient;
use aws_sdk_sts::Client as StsClient;
use log::debug;

use crate::aws::{
    ecr_client::AwsEcrClient,
    sts::{caller_identity, CallerIdentity},
    AwsError, AwsResult,
};
use crate::registry::{RegistryBackend, Repository};

/// Main service struct that holds AWS clients for one region
pub struct AwsRegistryBackend {
    pub(crate) sts_client: StsClient,
    pub(crate) ecr_client: AwsEcrClient,
}

impl AwsRegistryBackend {
    /// Build clients for `region` from the standard credential provider chain.
    pub async fn new(region: impl Into<String>) -> AwsResult<Self> {
        let region = region.into();
        if region.trim().is_empty() {
            return Err(AwsError::ConfigError("region must not be empty".to_string()));
        }
        let region = Region::new(region);
        debug!("Loading AWS configuration for region {region}");

        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(region)
            .load()
            .await;

        Ok(Self {
            ecr_client: AwsEcrClient::new(EcrClient::new(&config)),
            sts_client: StsClient::new(&config),
        })
    }
}

#[async_trait]
impl RegistryBackend for AwsRegistryBackend {
    async fn caller_identity(&self) -> AwsResult<CallerIdentity> {
        caller_identity(&self.sts_client).await
    }

    async fn list_repositories(&self) -> AwsResult<Vec<Repository>> {
        self.ecr_client.list_repositories().await
    }

    async fn get_repository_policy(&self, repository: &Repository) -> AwsResult<Option<String>> {
        self.ecr_client.get_repository_policy(repository).await
    }

    async fn set_repository_policy(
        &self,
        repository: &Repository,
        policy_text: &str,
    ) -> AwsResult<()> {
        self.ecr_client
            .set_repository_policy(repository, policy_text)
            .await
    }

    async fn delete_repository_policy(&self, repository: &Repository) -> AwsResult<()> {
        self.ecr_client.delete_repository_policy(repository).await
    }
}
