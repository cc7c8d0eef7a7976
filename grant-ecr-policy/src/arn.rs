//! ARN parsing and account ("namespace") extraction.

use std::fmt;
use std::str::FromStr;

use crate::errors::{GrantError, Result};

/// A parsed Amazon Resource Name.
///
/// `arn:<partition>:<service>:<region>:<account>:<resource>`; the resource part
/// may itself contain colons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arn {
    partition: String,
    service: String,
    region: String,
    account: String,
    resource: String,
}

impl Arn {
    /// Parse an ARN string
    pub fn parse(input: &str) -> Result<Self> {
        let mut parts = input.splitn(6, ':');
        let prefix = parts.next().unwrap_or_default();
        if prefix != "arn" {
            return Err(GrantError::invalid_arn(input, "missing 'arn' prefix"));
        }

        let (Some(partition), Some(service), Some(region), Some(account), Some(resource)) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return Err(GrantError::invalid_arn(
                input,
                "expected arn:<partition>:<service>:<region>:<account>:<resource>",
            ));
        };

        if partition.is_empty() {
            return Err(GrantError::invalid_arn(input, "partition is empty"));
        }
        if service.is_empty() {
            return Err(GrantError::invalid_arn(input, "service is empty"));
        }
        if account.is_empty() {
            return Err(GrantError::invalid_arn(input, "account is empty"));
        }
        if !account.bytes().all(|b| b.is_ascii_digit()) {
            return Err(GrantError::invalid_arn(
                input,
                format!("account '{account}' is not numeric"),
            ));
        }
        if resource.is_empty() {
            return Err(GrantError::invalid_arn(input, "resource is empty"));
        }

        Ok(Self {
            partition: partition.to_string(),
            service: service.to_string(),
            region: region.to_string(),
            account: account.to_string(),
            resource: resource.to_string(),
        })
    }

    /// Partition, e.g. `aws` or `aws-cn`
    #[must_use]
    pub fn partition(&self) -> &str {
        &self.partition
    }

    /// Service namespace, e.g. `iam`
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Region; empty for global services such as IAM
    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Account identifier embedded in the ARN
    #[must_use]
    pub fn account(&self) -> &str {
        &self.account
    }

    /// Resource part, e.g. `role/admin-role`
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// The account identifier that is granted or revoked access.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.account
    }
}

impl FromStr for Arn {
    type Err = GrantError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Arn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arn:{}:{}:{}:{}:{}",
            self.partition, self.service, self.region, self.account, self.resource
        )
    }
}

/// Root principal ARN of an account, as matched against `Principal.AWS`
#[must_use]
pub fn account_root_arn(namespace: &str) -> String {
    format!("arn:aws:iam::{namespace}:root")
}
