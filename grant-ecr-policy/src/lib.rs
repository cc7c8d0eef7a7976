//! This crate provides the core logic of `grant-ecr`:
//! - principal ARN parsing and account ("namespace") extraction
//! - the repository policy document model and its grant/revoke patch
//! - ECR and STS client wrappers behind the [`RegistryBackend`] trait
//! - the confirm, list, fetch, patch and write-back pipeline
//!

pub mod api;
pub mod arn;
pub mod aws;
mod errors;
pub mod policy;
pub mod registry;

// Re-exports for a small, focused public API
pub use api::grant_access;
pub use api::model::{
    ConfirmationRequest, GrantConfig, GrantOutcome, GrantReport, Operator, PolicyChange,
    Progress, RepositoryOutcome, DEFAULT_MAX_CONCURRENCY, DEFAULT_REGION,
};
pub use arn::{account_root_arn, Arn};
pub use aws::sts::CallerIdentity;
pub use aws::AwsError;
pub use errors::{GrantError, Result};
pub use policy::{transform, GrantMode, PolicyDocument, Statement};
pub use registry::{service::AwsRegistryBackend, RegistryBackend, Repository};
