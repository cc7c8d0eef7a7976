//! Inputs and results of the grant/revoke pipeline.

use crate::arn::{account_root_arn, Arn};
use crate::aws::sts::CallerIdentity;
use crate::errors::{GrantError, Result};
use crate::policy::GrantMode;
use crate::registry::Repository;

/// Region used when the operator does not pick one
pub const DEFAULT_REGION: &str = "eu-west-1";

/// Default cap on in-flight repository calls
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Configuration for one grant or revoke run
#[derive(Debug, Clone)]
pub struct GrantConfig {
    /// Principal whose account gains or loses pull access
    pub principal: Arn,
    /// Grant or revoke
    pub mode: GrantMode,
    /// Operator label; required when granting, never written into the policy
    pub description: Option<String>,
    /// Region whose ECR endpoint is used
    pub region: String,
    /// Cap on in-flight repository calls per phase
    pub max_concurrency: usize,
}

impl GrantConfig {
    /// Config with the default region and concurrency
    #[must_use]
    pub fn new(principal: Arn, mode: GrantMode) -> Self {
        Self {
            principal,
            mode,
            description: None,
            region: DEFAULT_REGION.to_string(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Check the combination of options before anything is called
    pub fn validate(&self) -> Result<()> {
        if self.mode == GrantMode::Grant && self.description.as_deref().is_none_or(str::is_empty) {
            return Err(GrantError::validation_field(
                "a description is required when granting access",
                "description",
            ));
        }
        if self.max_concurrency == 0 {
            return Err(GrantError::validation_field(
                "concurrency must be at least 1",
                "max_concurrency",
            ));
        }
        Ok(())
    }

    /// Account identifier taken from the principal ARN
    #[must_use]
    pub fn namespace(&self) -> &str {
        self.principal.namespace()
    }

    /// `arn:aws:iam::<namespace>:root`
    #[must_use]
    pub fn target_root_arn(&self) -> String {
        account_root_arn(self.namespace())
    }
}

/// What the operator is asked to acknowledge before any mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationRequest {
    /// ARN given on the command line
    pub principal_arn: String,
    /// Root principal actually written into the policies
    pub target_root_arn: String,
    /// Identity of the credentials in use
    pub caller_arn: String,
    /// Region whose repositories are edited
    pub region: String,
    /// Grant or revoke
    pub mode: GrantMode,
}

/// Pipeline milestones reported to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Policy fetch started for this many repositories
    FetchingPolicies {
        /// number of repositories listed
        repositories: usize,
    },
    /// All fetches have settled
    PoliciesFetched,
    /// Write-back started
    UpdatingPolicies,
    /// All write-backs have settled
    PoliciesUpdated,
}

/// Operator interaction injected into the pipeline.
pub trait Operator: Send + Sync {
    /// Return `false` to abort before anything is listed or written
    fn confirm(&self, request: &ConfirmationRequest) -> bool;

    /// Called at each pipeline milestone
    fn progress(&self, _progress: Progress) {}
}

/// What was done to one repository policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyChange {
    /// SetRepositoryPolicy was issued; the document now holds `statements`
    Updated {
        /// statement count after the change
        statements: usize,
    },
    /// DeleteRepositoryPolicy was issued because no statement was left
    Deleted,
    /// No policy before and none needed after; nothing was called
    Unchanged,
}

/// Result of processing one repository
#[derive(Debug)]
pub struct RepositoryOutcome {
    /// The repository
    pub repository: Repository,
    /// The change applied, or why it failed
    pub result: Result<PolicyChange>,
}

impl RepositoryOutcome {
    /// Whether the repository was processed without error
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Summary of a completed run, in repository listing order
#[derive(Debug)]
pub struct GrantReport {
    /// Identity the run was performed with
    pub caller: CallerIdentity,
    /// One outcome per listed repository
    pub outcomes: Vec<RepositoryOutcome>,
}

impl GrantReport {
    /// Outcomes that succeeded
    pub fn succeeded(&self) -> impl Iterator<Item = &RepositoryOutcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }

    /// Outcomes that failed
    pub fn failed(&self) -> impl Iterator<Item = &RepositoryOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// Whether every repository succeeded
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(RepositoryOutcome::is_success)
    }
}

/// How a run ended
#[derive(Debug)]
pub enum GrantOutcome {
    /// The operator declined at the confirmation gate
    Aborted,
    /// Every repository was attempted
    Completed(GrantReport),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal() -> Arn {
        Arn::parse("arn:aws:iam::9999999999999:role/admin-role").unwrap()
    }

    #[test]
    fn test_grant_requires_description() {
        let config = GrantConfig::new(principal(), GrantMode::Grant);
        let err = config.validate().unwrap_err();

        assert!(matches!(
            err,
            GrantError::Validation { field: Some(ref f), .. } if f == "description"
        ));
    }

    #[test]
    fn test_whitespace_description_counts_as_given() {
        let mut config = GrantConfig::new(principal(), GrantMode::Grant);
        config.description = Some(" ".to_string());
        assert!(config.validate().is_ok());

        config.description = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_revoke_does_not_require_description() {
        let config = GrantConfig::new(principal(), GrantMode::Revoke);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let mut config = GrantConfig::new(principal(), GrantMode::Revoke);
        config.max_concurrency = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_target_root_arn() {
        let config = GrantConfig::new(principal(), GrantMode::Grant);
        assert_eq!(config.namespace(), "9999999999999");
        assert_eq!(config.target_root_arn(), "arn:aws:iam::9999999999999:root");
        assert_eq!(config.region, DEFAULT_REGION);
    }
}
