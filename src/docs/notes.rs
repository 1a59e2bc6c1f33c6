use std::sync::Arc;

use axum::http::Method;

use super::operation::{OperationContext, OperationPlugin};
use crate::security::AccessRules;

pub const ROLE_NOTES_PREFIX: &str = "Accessible by users having one of the following roles: ";

/// Adds "which roles may call this" notes to operations carrying the
/// role-notes marker, based on the registered access rules.
pub struct OperationNotesReader {
    rules: Arc<AccessRules>,
}

impl OperationNotesReader {
    pub fn new(rules: Arc<AccessRules>) -> Self {
        Self { rules }
    }

    /// Linear scan over all rules. Roles of every matching rule are appended
    /// in rule order; duplicates are kept. A method no rule mentions yields
    /// the bare prefix.
    pub fn notes_for(&self, method: &Method, path: &str) -> String {
        let roles: Vec<&str> = if path.is_empty() {
            Vec::new()
        } else {
            self.rules
                .matching(method, path)
                .flat_map(|rule| rule.roles().iter().map(String::as_str))
                .collect()
        };

        format!("{}{}", ROLE_NOTES_PREFIX, roles.join(", "))
    }
}

impl OperationPlugin for OperationNotesReader {
    fn name(&self) -> &'static str {
        "role-access-notes"
    }

    fn apply(&self, context: &mut OperationContext) {
        let operation = context.operation();
        if !operation.role_access_notes {
            return;
        }

        let notes = self.notes_for(&operation.method, &operation.path);
        tracing::debug!("Role notes for {} {}: {}", operation.method, operation.path, notes);
        context.set_notes(notes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::operation::ApiOperation;
    use crate::security::default_access_rules;

    fn reader() -> OperationNotesReader {
        OperationNotesReader::new(Arc::new(default_access_rules().unwrap()))
    }

    fn apply(reader: &OperationNotesReader, operation: ApiOperation) -> Option<String> {
        let mut context = OperationContext::new(operation);
        reader.apply(&mut context);
        context.into_operation().notes
    }

    #[test]
    fn notes_list_roles_of_matching_rule() {
        let reader = reader();
        let get = ApiOperation::new(Method::GET, "/user/{username}", "getUser").with_role_access_notes();
        let post = ApiOperation::new(Method::POST, "/user", "createUser").with_role_access_notes();

        assert_eq!(
            apply(&reader, get).as_deref(),
            Some("Accessible by users having one of the following roles: admin, user")
        );
        assert_eq!(
            apply(&reader, post).as_deref(),
            Some("Accessible by users having one of the following roles: admin")
        );
    }

    #[test]
    fn unmarked_operations_are_left_alone() {
        let op = ApiOperation::new(Method::GET, "/user/{username}", "getUser");
        assert_eq!(apply(&reader(), op), None);
    }

    #[test]
    fn multiple_matches_concatenate_in_rule_order() {
        let rules = AccessRules::builder()
            .ant_matchers(Method::GET, "/user/**")
            .has_role("auditor")
            .ant_matchers(Method::POST, "/user/*")
            .has_role("writer")
            .ant_matchers(Method::GET, "/user/*")
            .has_any_role(["admin", "user"])
            .build()
            .unwrap();
        let reader = OperationNotesReader::new(Arc::new(rules));

        assert_eq!(
            reader.notes_for(&Method::GET, "/user/{username}"),
            "Accessible by users having one of the following roles: auditor, admin, user"
        );
    }

    #[test]
    fn no_matching_rule_leaves_the_role_list_empty() {
        assert_eq!(reader().notes_for(&Method::DELETE, "/user/{username}"), ROLE_NOTES_PREFIX);
    }

    #[test]
    fn empty_path_skips_rule_matching() {
        assert_eq!(reader().notes_for(&Method::GET, ""), ROLE_NOTES_PREFIX);
    }

    #[test]
    fn methods_without_rules_get_prefix_only_notes() {
        for method in [Method::HEAD, Method::TRACE, Method::OPTIONS] {
            let op = ApiOperation::new(method, "/user/{username}", "userInfo").with_role_access_notes();
            assert_eq!(apply(&reader(), op).as_deref(), Some(ROLE_NOTES_PREFIX));
        }
    }
}
