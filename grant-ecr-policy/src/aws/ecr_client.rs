use aws_sdk_ecr::error::DisplayErrorContext;
use aws_sdk_ecr::Client as EcrClient;
use log::{debug, trace};

use crate::aws::{AwsError, AwsResult};
use crate::registry::Repository;

/// Upper bound accepted by DescribeRepositories for a single page
const DESCRIBE_PAGE_SIZE: i32 = 1000;

/// Client to call Amazon ECR
pub struct AwsEcrClient {
    pub(crate) client: EcrClient,
}

/// Impl for Amazon ECR client wrapper
impl AwsEcrClient {
    /// New construct
    #[must_use]
    pub const fn new(client: EcrClient) -> Self {
        Self { client }
    }

    /// List all repositories of the caller's registry, following pagination
    pub async fn list_repositories(&self) -> AwsResult<Vec<Repository>> {
        let mut repositories = Vec::<Repository>::new();
        let mut next_token: Option<String> = None;

        loop {
            let out = self
                .client
                .describe_repositories()
                .max_results(DESCRIBE_PAGE_SIZE)
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| {
                    AwsError::EcrError(format!(
                        "Failed to call DescribeRepositories: {}",
                        DisplayErrorContext(&e)
                    ))
                })?;

            for repository in out.repositories() {
                let (Some(name), Some(registry_id)) =
                    (repository.repository_name(), repository.registry_id())
                else {
                    debug!("Skipping repository without name or registry id: {repository:?}");
                    continue;
                };
                repositories.push(Repository::new(name, registry_id));
            }

            match out.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        trace!("DescribeRepositories returned {} repositories", repositories.len());
        Ok(repositories)
    }

    /// Fetch the policy text of a repository.
    ///
    /// Returns `Ok(None)` when the repository has no policy attached.
    pub async fn get_repository_policy(
        &self,
        repository: &Repository,
    ) -> AwsResult<Option<String>> {
        let result = self
            .client
            .get_repository_policy()
            .repository_name(&repository.name)
            .registry_id(&repository.registry_id)
            .send()
            .await;

        match result {
            Ok(out) => Ok(out.policy_text().map(std::string::ToString::to_string)),
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_repository_policy_not_found_exception()) =>
            {
                debug!("Repository '{}' has no policy attached", repository.name);
                Ok(None)
            }
            Err(e) => Err(AwsError::EcrError(format!(
                "Failed to call GetRepositoryPolicy for '{}': {}",
                repository.name,
                DisplayErrorContext(&e)
            ))),
        }
    }

    /// Replace the policy of a repository
    pub async fn set_repository_policy(
        &self,
        repository: &Repository,
        policy_text: &str,
    ) -> AwsResult<()> {
        self.client
            .set_repository_policy()
            .repository_name(&repository.name)
            .registry_id(&repository.registry_id)
            .policy_text(policy_text)
            .send()
            .await
            .map_err(|e| {
                AwsError::EcrError(format!(
                    "Failed to call SetRepositoryPolicy for '{}': {}",
                    repository.name,
                    DisplayErrorContext(&e)
                ))
            })?;
        Ok(())
    }

    /// Delete the policy of a repository
    pub async fn delete_repository_policy(&self, repository: &Repository) -> AwsResult<()> {
        self.client
            .delete_repository_policy()
            .repository_name(&repository.name)
            .registry_id(&repository.registry_id)
            .send()
            .await
            .map_err(|e| {
                AwsError::EcrError(format!(
                    "Failed to call DeleteRepositoryPolicy for '{}': {}",
                    repository.name,
                    DisplayErrorContext(&e)
                ))
            })?;
        Ok(())
    }
}
