//! Registry backend seam: caller identity and repository policy CRUD.

use async_trait::async_trait;

use crate::aws::sts::CallerIdentity;
use crate::aws::AwsResult;

/// wraps around ecr and sts
pub mod service;

/// Repository reference passed through unchanged from fetch to write-back
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Repository {
    /// Repository name, e.g. `team/app`
    pub name: String,
    /// Registry (account) that owns the repository
    pub registry_id: String,
}

impl Repository {
    /// new repository reference
    pub fn new(name: impl Into<String>, registry_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registry_id: registry_id.into(),
        }
    }
}

/// Operations the grant pipeline needs from the registry.
///
/// Calls may run concurrently; implementations must not rely on ordering
/// between repositories.
#[async_trait]
pub trait RegistryBackend: Send + Sync {
    /// Identity of the credentials in use
    async fn caller_identity(&self) -> AwsResult<CallerIdentity>;

    /// Every repository of the caller's registry
    async fn list_repositories(&self) -> AwsResult<Vec<Repository>>;

    /// Policy text of a repository, `None` when no policy is attached
    async fn get_repository_policy(&self, repository: &Repository) -> AwsResult<Option<String>>;

    /// Replace the policy of a repository
    async fn set_repository_policy(
        &self,
        repository: &Repository,
        policy_text: &str,
    ) -> AwsResult<()>;

    /// Remove the policy of a repository
    async fn delete_repository_policy(&self, repository: &Repository) -> AwsResult<()>;
}
