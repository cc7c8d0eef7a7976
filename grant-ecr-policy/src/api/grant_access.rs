use std::future::Future;
use std::time::Instant;

use futures::future::join_all;
use log::{debug, info, trace, warn};
use tokio::sync::Semaphore;

use crate::{
    api::model::{
        ConfirmationRequest, GrantConfig, GrantOutcome, GrantReport, Operator, PolicyChange,
        Progress, RepositoryOutcome,
    },
    errors::{GrantError, Result},
    policy::PolicyDocument,
    registry::{RegistryBackend, Repository},
};

/// Write-back decided for one repository
enum WriteBack {
    Set { policy_text: String, statements: usize },
    Delete,
    Skip,
}

/// Run `task` over every item with at most `limit` futures past the gate at
/// once. Results come back in input order.
async fn fan_out<T, O, F, Fut>(items: Vec<T>, limit: usize, task: F) -> Vec<O>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = O>,
{
    let semaphore = Semaphore::new(limit.max(1));
    let semaphore = &semaphore;
    join_all(items.into_iter().map(|item| {
        let fut = task(item);
        async move {
            // Never closed, so acquire cannot fail here.
            let _permit = semaphore.acquire().await;
            fut.await
        }
    }))
    .await
}

/// Decide the write-back for a fetched policy
fn plan_write_back(
    repository: &Repository,
    policy_text: Option<&str>,
    config: &GrantConfig,
) -> Result<WriteBack> {
    let had_policy = policy_text.is_some();
    let document = PolicyDocument::parse_or_empty(policy_text)
        .map_err(|e| GrantError::policy_parse(&repository.name, e))?
        .apply(config.namespace(), config.mode);

    if document.is_empty() {
        if had_policy {
            return Ok(WriteBack::Delete);
        }
        return Ok(WriteBack::Skip);
    }

    Ok(WriteBack::Set {
        policy_text: document.to_json()?,
        statements: document.statements.len(),
    })
}

async fn write_back<B: RegistryBackend + ?Sized>(
    backend: &B,
    repository: &Repository,
    planned: Result<WriteBack>,
) -> Result<PolicyChange> {
    match planned? {
        WriteBack::Set {
            policy_text,
            statements,
        } => {
            trace!("Setting policy of '{}': {policy_text}", repository.name);
            backend
                .set_repository_policy(repository, &policy_text)
                .await?;
            Ok(PolicyChange::Updated { statements })
        }
        WriteBack::Delete => {
            debug!("Deleting now-empty policy of '{}'", repository.name);
            backend.delete_repository_policy(repository).await?;
            Ok(PolicyChange::Deleted)
        }
        WriteBack::Skip => Ok(PolicyChange::Unchanged),
    }
}

/// Grant or revoke pull access for the configured principal on every
/// repository of the caller's registry.
///
/// Identity lookup and repository listing failures abort the run. Failures
/// on individual repositories are recorded in the returned report and do not
/// stop the others.
pub async fn grant_access<B: RegistryBackend + ?Sized>(
    backend: &B,
    config: &GrantConfig,
    operator: &dyn Operator,
) -> Result<GrantOutcome> {
    config.validate()?;
    let pipeline_start = Instant::now();

    if let Some(description) = &config.description {
        debug!("Description (not written into the policy): {description}");
    }

    let caller = backend.caller_identity().await?;
    debug!(
        "Caller {} (account {}), target namespace {}",
        caller.arn,
        caller.account,
        config.namespace()
    );

    let request = ConfirmationRequest {
        principal_arn: config.principal.to_string(),
        target_root_arn: config.target_root_arn(),
        caller_arn: caller.arn.clone(),
        region: config.region.clone(),
        mode: config.mode,
    };
    if !operator.confirm(&request) {
        info!("Operator declined, no repository was touched");
        return Ok(GrantOutcome::Aborted);
    }

    let repositories = backend.list_repositories().await?;
    info!("Found {} repositories", repositories.len());

    operator.progress(Progress::FetchingPolicies {
        repositories: repositories.len(),
    });
    let fetched = fan_out(repositories, config.max_concurrency, |repository| async move {
        let policy = backend.get_repository_policy(&repository).await;
        (repository, policy)
    })
    .await;
    operator.progress(Progress::PoliciesFetched);
    trace!("Fetch phase completed in {:?}", pipeline_start.elapsed());

    let planned: Vec<(Repository, Result<WriteBack>)> = fetched
        .into_iter()
        .map(|(repository, policy)| {
            let planned = policy
                .map_err(GrantError::from)
                .and_then(|text| plan_write_back(&repository, text.as_deref(), config));
            (repository, planned)
        })
        .collect();

    operator.progress(Progress::UpdatingPolicies);
    let outcomes = fan_out(planned, config.max_concurrency, |(repository, planned)| async move {
        let result = write_back(backend, &repository, planned).await;
        if let Err(e) = &result {
            warn!("Repository '{}' failed: {e}", repository.name);
        }
        RepositoryOutcome { repository, result }
    })
    .await;
    operator.progress(Progress::PoliciesUpdated);

    debug!(
        "Run completed in {:?}: {} repositories processed",
        pipeline_start.elapsed(),
        outcomes.len()
    );

    Ok(GrantOutcome::Completed(GrantReport { caller, outcomes }))
}
