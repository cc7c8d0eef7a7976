//! AWS SDK integration: ECR client wrapper and caller identity lookup.

/// ecr clients
pub mod ecr_client;

/// sts calls
pub mod sts;

use thiserror::Error;

#[derive(Error, Debug)]
/// AWS Errors from AWS SDK calls
pub enum AwsError {
    #[error("AWS configuration error: {0}")]
    /// config error
    ConfigError(String),
    #[error("ECR client error: {0}")]
    /// errors from calls to Amazon ECR
    EcrError(String),
    #[error("STS client error: {0}")]
    /// errors from calls to AWS STS
    StsError(String),
}

/// Type of AWS Result extending Result
pub type AwsResult<T> = Result<T, AwsError>;
