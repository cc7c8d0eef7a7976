use aws_sdk_sts::Client as StsClient;

use crate::aws::{AwsError, AwsResult};

/// Identity of the credentials the tool runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    /// ARN of the calling principal
    pub arn: String,
    /// Account that owns the calling principal
    pub account: String,
}

/// Return the current caller identity using STS GetCallerIdentity.
///
/// The ARN is shown to the operator before any repository policy is touched.
///
/// # Arguments
///
/// * `client` - STS client to use for the API call
pub async fn caller_identity(client: &StsClient) -> AwsResult<CallerIdentity> {
    let out = client
        .get_caller_identity()
        .send()
        .await
        .map_err(|e| AwsError::StsError(format!("GetCallerIdentity failed: {e}")))?;
    let arn = out
        .arn()
        .map(std::string::ToString::to_string)
        .ok_or_else(|| AwsError::StsError("GetCallerIdentity missing Arn".to_string()))?;
    let account = out
        .account()
        .map(std::string::ToString::to_string)
        .ok_or_else(|| AwsError::StsError("GetCallerIdentity missing Account".to_string()))?;
    Ok(CallerIdentity { arn, account })
}
