//! Property tests for the grant/revoke patch.

use super::*;
use proptest::prelude::*;

const ACCOUNTS: [&str; 4] = ["111111111111", "222222222222", "333333333333", "9999999999999"];

fn statement_strategy() -> impl Strategy<Value = Statement> {
    (
        prop::sample::select(ACCOUNTS.to_vec()),
        prop::option::of("[A-Za-z ]{1,12}"),
        prop::bool::ANY,
        prop::bool::ANY,
    )
        .prop_map(|(account, sid, deny, wildcard)| {
            let mut statement = Statement::sandbox(account);
            statement.sid = sid;
            if deny {
                statement.effect = Effect::Deny;
            }
            if wildcard {
                statement.principal = Some(Principal::Wildcard("*".to_string()));
            }
            statement
        })
}

fn document_strategy() -> impl Strategy<Value = PolicyDocument> {
    prop::collection::vec(statement_strategy(), 0..8).prop_map(|statements| PolicyDocument {
        version: "2012-10-17".to_string(),
        statements,
        extra: Map::new(),
    })
}

fn target_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(ACCOUNTS.to_vec())
}

proptest! {
    #[test]
    fn grant_twice_leaves_exactly_one_target_statement(
        doc in document_strategy(),
        namespace in target_strategy(),
    ) {
        let text = doc.to_json().unwrap();
        let once = transform(Some(&text), namespace, false).unwrap();
        let twice = transform(Some(&once), namespace, false).unwrap();

        let result = PolicyDocument::parse(&twice).unwrap();
        prop_assert_eq!(result.statements_for(namespace).count(), 1);
    }

    #[test]
    fn grant_then_revoke_restores_other_statements_in_order(
        doc in document_strategy(),
        namespace in target_strategy(),
    ) {
        let root = account_root_arn(namespace);
        let expected: Vec<Statement> = doc
            .statements
            .iter()
            .filter(|s| !s.has_aws_principal(&root))
            .cloned()
            .collect();

        let result = doc
            .apply(namespace, GrantMode::Grant)
            .apply(namespace, GrantMode::Revoke);

        prop_assert_eq!(result.statements_for(namespace).count(), 0);
        prop_assert_eq!(result.statements, expected);
    }

    #[test]
    fn revoke_without_target_statement_is_identity(
        doc in document_strategy(),
        namespace in target_strategy(),
    ) {
        let root = account_root_arn(namespace);
        let mut clean = doc;
        clean.statements.retain(|s| !s.has_aws_principal(&root));

        let result = clean.clone().apply(namespace, GrantMode::Revoke);
        prop_assert_eq!(result, clean);
    }
}
