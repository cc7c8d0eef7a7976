//! Repository policy document model and the grant/revoke patch.
//!
//! Only the statement keyed by the target account's root principal is ever
//! touched. Every other statement, and any top-level key this module does not
//! model, round-trips unchanged.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::arn::account_root_arn;

#[cfg(test)]
mod properties;

/// Version written into documents created from scratch
pub const DEFAULT_POLICY_VERSION: &str = "2008-10-17";

/// Sid of the statement this tool manages
pub const SANDBOX_STATEMENT_SID: &str = "Sandbox account";

/// Actions needed to pull an image from a repository
pub const PULL_ACTIONS: [&str; 3] = [
    "ecr:GetDownloadUrlForLayer",
    "ecr:BatchGetImage",
    "ecr:BatchCheckLayerAvailability",
];

/// Whether the target account gains or loses pull access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantMode {
    /// Add (or refresh) the pull statement
    Grant,
    /// Drop the pull statement
    Revoke,
}

impl GrantMode {
    /// Map the CLI `--remove` flag onto a mode
    #[must_use]
    pub const fn from_remove_flag(remove: bool) -> Self {
        if remove {
            Self::Revoke
        } else {
            Self::Grant
        }
    }
}

/// A JSON value that may be written either as a single item or as a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// `"ecr:BatchGetImage"`
    One(T),
    /// `["ecr:BatchGetImage", ...]`
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }
}

/// Allow or Deny
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Allow
    Allow,
    /// Deny
    Deny,
}

/// `Principal` element of a statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Principal {
    /// `"Principal": "*"`
    Wildcard(String),
    /// `"Principal": {"AWS": ..., "Service": ...}`
    Typed(BTreeMap<String, OneOrMany<String>>),
}

impl Principal {
    /// The `AWS` entry when it is a single string.
    ///
    /// A list-valued `AWS` entry yields `None`: matching is an exact string
    /// comparison, so such statements are never treated as the managed one.
    #[must_use]
    pub fn aws(&self) -> Option<&str> {
        match self {
            Self::Typed(entries) => match entries.get("AWS") {
                Some(OneOrMany::One(arn)) => Some(arn.as_str()),
                _ => None,
            },
            Self::Wildcard(_) => None,
        }
    }
}

/// One access-control rule of a repository policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    /// Statement identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    /// Allow or Deny
    pub effect: Effect,
    /// Who the statement applies to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,
    /// Actions covered by the statement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<OneOrMany<String>>,
    /// Everything else (`Condition`, `NotAction`, `NotPrincipal`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Statement {
    /// The pull statement granted to `namespace`
    #[must_use]
    pub fn sandbox(namespace: &str) -> Self {
        let mut principal = BTreeMap::new();
        principal.insert(
            "AWS".to_string(),
            OneOrMany::One(account_root_arn(namespace)),
        );

        Self {
            sid: Some(SANDBOX_STATEMENT_SID.to_string()),
            effect: Effect::Allow,
            principal: Some(Principal::Typed(principal)),
            action: Some(OneOrMany::Many(
                PULL_ACTIONS.iter().map(ToString::to_string).collect(),
            )),
            extra: Map::new(),
        }
    }

    /// Whether `Principal.AWS` is exactly `principal_arn`
    #[must_use]
    pub fn has_aws_principal(&self, principal_arn: &str) -> bool {
        self.principal
            .as_ref()
            .and_then(Principal::aws)
            .is_some_and(|arn| arn == principal_arn)
    }
}

fn default_version() -> String {
    DEFAULT_POLICY_VERSION.to_string()
}

fn one_or_many_statements<'de, D>(deserializer: D) -> Result<Vec<Statement>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<OneOrMany<Statement>>::deserialize(deserializer)?
        .map(OneOrMany::into_vec)
        .unwrap_or_default())
}

/// A repository policy document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDocument {
    /// Policy language version
    #[serde(rename = "Version", default = "default_version")]
    pub version: String,
    /// Statements in document order
    #[serde(
        rename = "Statement",
        default,
        deserialize_with = "one_or_many_statements"
    )]
    pub statements: Vec<Statement>,
    /// Top-level keys other than `Version` and `Statement`
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for PolicyDocument {
    fn default() -> Self {
        Self {
            version: default_version(),
            statements: Vec::new(),
            extra: Map::new(),
        }
    }
}

impl PolicyDocument {
    /// Parse policy text as returned by GetRepositoryPolicy
    pub fn parse(policy_text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(policy_text)
    }

    /// Parse policy text, treating an absent policy as an empty document
    pub fn parse_or_empty(policy_text: Option<&str>) -> serde_json::Result<Self> {
        policy_text.map_or_else(|| Ok(Self::default()), Self::parse)
    }

    /// Serialize to the text form accepted by SetRepositoryPolicy
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Whether the document has no statements left
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Statements whose `Principal.AWS` is the root of `namespace`
    pub fn statements_for<'a>(&'a self, namespace: &str) -> impl Iterator<Item = &'a Statement> {
        let root = account_root_arn(namespace);
        self.statements
            .iter()
            .filter(move |s| s.has_aws_principal(&root))
    }

    /// Drop every statement for `namespace` and, when granting, append the
    /// pull statement. Untouched statements keep their relative order.
    #[must_use]
    pub fn apply(mut self, namespace: &str, mode: GrantMode) -> Self {
        let root = account_root_arn(namespace);
        self.statements.retain(|s| !s.has_aws_principal(&root));
        if mode == GrantMode::Grant {
            self.statements.push(Statement::sandbox(namespace));
        }
        self
    }
}

/// Text-level grant/revoke patch.
///
/// `policy_text` is `None` when the repository has no policy attached.
pub fn transform(
    policy_text: Option<&str>,
    namespace: &str,
    remove: bool,
) -> serde_json::Result<String> {
    PolicyDocument::parse_or_empty(policy_text)?
        .apply(namespace, GrantMode::from_remove_flag(remove))
        .to_json()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NAMESPACE: &str = "9999999999999";

    fn other_account_policy() -> String {
        json!({
            "Version": "2012-10-17",
            "Statement": [
                {
                    "Sid": "CI",
                    "Effect": "Allow",
                    "Principal": {"AWS": "arn:aws:iam::111111111111:root"},
                    "Action": ["ecr:*"]
                }
            ]
        })
        .to_string()
    }

    #[test]
    fn test_grant_on_absent_policy() {
        let text = transform(None, NAMESPACE, false).unwrap();
        let doc: Value = serde_json::from_str(&text).unwrap();

        assert_eq!(
            doc,
            json!({
                "Version": "2008-10-17",
                "Statement": [{
                    "Sid": "Sandbox account",
                    "Effect": "Allow",
                    "Principal": {"AWS": "arn:aws:iam::9999999999999:root"},
                    "Action": [
                        "ecr:GetDownloadUrlForLayer",
                        "ecr:BatchGetImage",
                        "ecr:BatchCheckLayerAvailability"
                    ]
                }]
            })
        );
    }

    #[test]
    fn test_grant_appends_after_existing_statements() {
        let doc = PolicyDocument::parse(&other_account_policy())
            .unwrap()
            .apply(NAMESPACE, GrantMode::Grant);

        assert_eq!(doc.version, "2012-10-17");
        assert_eq!(doc.statements.len(), 2);
        assert_eq!(doc.statements[0].sid.as_deref(), Some("CI"));
        assert_eq!(doc.statements[1], Statement::sandbox(NAMESPACE));
    }

    #[test]
    fn test_grant_twice_keeps_single_statement() {
        let once = transform(Some(&other_account_policy()), NAMESPACE, false).unwrap();
        let twice = transform(Some(&once), NAMESPACE, false).unwrap();

        assert_eq!(once, twice);
        let doc = PolicyDocument::parse(&twice).unwrap();
        assert_eq!(doc.statements_for(NAMESPACE).count(), 1);
    }

    #[test]
    fn test_revoke_only_statement_empties_document() {
        let granted = transform(None, NAMESPACE, false).unwrap();
        let doc = PolicyDocument::parse(&granted)
            .unwrap()
            .apply(NAMESPACE, GrantMode::Revoke);

        assert!(doc.is_empty());
    }

    #[test]
    fn test_revoke_on_clean_policy_is_noop() {
        let original = PolicyDocument::parse(&other_account_policy()).unwrap();
        let revoked = original.clone().apply(NAMESPACE, GrantMode::Revoke);

        assert_eq!(original, revoked);
    }

    #[test]
    fn test_existing_target_statement_with_custom_sid_is_replaced() {
        let text = json!({
            "Version": "2008-10-17",
            "Statement": [{
                "Sid": "old grant",
                "Effect": "Allow",
                "Principal": {"AWS": "arn:aws:iam::9999999999999:root"},
                "Action": "ecr:*"
            }]
        })
        .to_string();

        let doc = PolicyDocument::parse(&text)
            .unwrap()
            .apply(NAMESPACE, GrantMode::Grant);

        assert_eq!(doc.statements, vec![Statement::sandbox(NAMESPACE)]);
    }

    #[test]
    fn test_unmodelled_shapes_are_preserved() {
        let original = json!({
            "Version": "2012-10-17",
            "Id": "keep-me",
            "Statement": [
                {
                    "Sid": "Public",
                    "Effect": "Allow",
                    "Principal": "*",
                    "Action": "ecr:BatchGetImage",
                    "Condition": {"StringEquals": {"aws:PrincipalOrgID": "o-123"}}
                },
                {
                    "Effect": "Deny",
                    "Principal": {"AWS": ["arn:aws:iam::9999999999999:root"]},
                    "NotAction": ["ecr:BatchGetImage"]
                },
                {
                    "Sid": "Lambda",
                    "Effect": "Allow",
                    "Principal": {"Service": "lambda.amazonaws.com"},
                    "Action": ["ecr:BatchGetImage"]
                }
            ]
        });

        let revoked = transform(Some(&original.to_string()), NAMESPACE, true).unwrap();
        let revoked: Value = serde_json::from_str(&revoked).unwrap();

        // The list-valued AWS principal is not an exact match, so it survives.
        assert_eq!(revoked, original);
    }

    #[test]
    fn test_single_object_statement_is_accepted() {
        let text = json!({
            "Version": "2008-10-17",
            "Statement": {
                "Sid": "Sandbox account",
                "Effect": "Allow",
                "Principal": {"AWS": "arn:aws:iam::9999999999999:root"},
                "Action": ["ecr:BatchGetImage"]
            }
        })
        .to_string();

        let doc = PolicyDocument::parse(&text)
            .unwrap()
            .apply(NAMESPACE, GrantMode::Revoke);
        assert!(doc.is_empty());
    }

    #[test]
    fn test_missing_version_and_statement_default() {
        let doc = PolicyDocument::parse("{}").unwrap();
        assert_eq!(doc.version, DEFAULT_POLICY_VERSION);
        assert!(doc.is_empty());
    }

    #[test]
    fn test_malformed_policy_text_is_an_error() {
        assert!(transform(Some("{\"Statement\": 3"), NAMESPACE, false).is_err());
    }
}
