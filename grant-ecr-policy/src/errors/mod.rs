//! Error handling module

use crate::aws::AwsError;
use thiserror::Error;

/// Result type alias for operations that can fail with `GrantError`
pub type Result<T> = std::result::Result<T, GrantError>;

/// Error type for the grant/revoke pipeline.
///
/// Only the absence of a repository policy is recovered locally; everything
/// here is either fatal for the run or recorded against a single repository.
#[derive(Error, Debug)]
pub enum GrantError {
    /// The principal ARN given by the operator is not a well-formed ARN
    #[error("Invalid ARN '{arn}': {message}")]
    InvalidArn {
        /// The rejected input
        arn: String,
        /// What is wrong with it
        message: String,
    },

    /// A repository policy could not be parsed as a policy document
    #[error("Failed to parse policy of repository '{repository}': {source}")]
    PolicyParse {
        /// Repository whose policy text is malformed
        repository: String,
        /// The underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// A transformed policy could not be serialized back to text
    #[error("Failed to serialize policy: {source}")]
    PolicySerialize {
        /// The underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Input validation errors for user-provided data
    #[error("Validation error: {message}")]
    Validation {
        /// Detailed validation error message
        message: String,
        /// Optional field name that failed validation
        field: Option<String>,
    },

    /// Errors surfaced by AWS SDK calls
    #[error(transparent)]
    Aws(#[from] AwsError),
}

impl GrantError {
    /// Create an invalid ARN error
    pub(crate) fn invalid_arn(arn: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArn {
            arn: arn.into(),
            message: message.into(),
        }
    }

    /// Create a policy parse error for a repository
    pub(crate) fn policy_parse(repository: impl Into<String>, source: serde_json::Error) -> Self {
        Self::PolicyParse {
            repository: repository.into(),
            source,
        }
    }

    /// Create a validation error bound to a field
    pub(crate) fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

impl From<serde_json::Error> for GrantError {
    fn from(error: serde_json::Error) -> Self {
        Self::PolicySerialize { source: error }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_arn_error_creation() {
        let error = GrantError::invalid_arn("not-an-arn", "missing 'arn' prefix");

        assert!(matches!(error, GrantError::InvalidArn { .. }));
        assert!(error.to_string().contains("not-an-arn"));
        assert!(error.to_string().contains("missing 'arn' prefix"));
    }

    #[test]
    fn test_policy_parse_error_names_repository() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = GrantError::policy_parse("team/app", source);

        assert!(error.to_string().contains("team/app"));
    }

    #[test]
    fn test_aws_error_is_transparent() {
        let error: GrantError = AwsError::EcrError("boom".to_string()).into();
        assert_eq!(error.to_string(), "ECR client error: boom");
    }
}
