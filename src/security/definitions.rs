use std::path::Path;

use axum::http::Method;
use serde::Deserialize;

use super::matchers::{default_access_rules, AccessRules};
use super::users::{default_user_store, InMemoryUserStore};
use super::SecurityError;

/// Accounts and rules read from a YAML file.
///
/// ```yaml
/// users:
///   - username: admin
///     password: adminpw
///     roles: [user, admin]
/// rules:
///   - method: GET
///     pattern: /user/*
///     roles: [admin, user]
/// ```
///
/// A section left out of the file keeps the built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityDefinitions {
    pub users: Option<Vec<UserDefinition>>,
    pub rules: Option<Vec<RuleDefinition>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserDefinition {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuleDefinition {
    pub method: String,
    pub pattern: String,
    pub roles: Vec<String>,
}

impl SecurityDefinitions {
    pub fn load(path: &Path) -> Result<Self, SecurityError> {
        tracing::info!("Loading security definitions from {}", path.display());
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, SecurityError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn user_store(&self) -> Result<InMemoryUserStore, SecurityError> {
        let Some(users) = &self.users else {
            return Ok(default_user_store());
        };

        let mut store = InMemoryUserStore::new();
        for user in users {
            if store.contains(&user.username) {
                return Err(SecurityError::DuplicateUser(user.username.clone()));
            }
            store = store.with_user(&user.username, &user.password, user.roles.iter().cloned());
        }
        Ok(store)
    }

    pub fn access_rules(&self) -> Result<AccessRules, SecurityError> {
        let Some(rules) = &self.rules else {
            return default_access_rules();
        };

        let mut builder = AccessRules::builder();
        for rule in rules {
            let method = parse_method(&rule.method)?;
            builder = builder
                .ant_matchers(method, rule.pattern.clone())
                .has_any_role(rule.roles.iter().cloned());
        }
        builder.build()
    }
}

fn parse_method(raw: &str) -> Result<Method, SecurityError> {
    Method::from_bytes(raw.trim().to_ascii_uppercase().as_bytes()).map_err(|e| {
        tracing::error!("Invalid HTTP method '{}' in security definitions: {}", raw, e);
        SecurityError::InvalidMethod(raw.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_keeps_defaults() {
        let defs = SecurityDefinitions::from_yaml("{}").unwrap();
        assert_eq!(defs.user_store().unwrap().len(), 2);
        assert_eq!(defs.access_rules().unwrap().len(), 2);
    }

    #[test]
    fn rules_and_users_are_read_in_order() {
        let defs = SecurityDefinitions::from_yaml(
            r#"
users:
  - username: ops
    password: opspw
    roles: [operator]
rules:
  - method: delete
    pattern: /user/*
    roles: [operator]
  - method: GET
    pattern: /user/**
    roles: [operator, user]
"#,
        )
        .unwrap();

        let store = defs.user_store().unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.authenticate("ops", "opspw").unwrap().has_role("operator"));
        assert!(store.authenticate("admin", "adminpw").is_err());

        let rules = defs.access_rules().unwrap();
        let views = rules.views();
        assert_eq!(views[0].method, "DELETE");
        assert_eq!(views[1].pattern, "/user/**");
        assert_eq!(views[1].roles, vec!["operator", "user"]);
    }

    #[test]
    fn methods_are_parsed_case_insensitively() {
        assert_eq!(parse_method(" patch ").unwrap(), Method::PATCH);
        assert_eq!(parse_method("purge").unwrap().as_str(), "PURGE");
        assert!(matches!(parse_method(""), Err(SecurityError::InvalidMethod(_))));
    }

    #[test]
    fn bad_definitions_are_errors() {
        let defs = SecurityDefinitions::from_yaml(
            "rules:\n  - method: \"GET /\"\n    pattern: /user\n    roles: [admin]\n",
        )
        .unwrap();
        assert!(matches!(defs.access_rules(), Err(SecurityError::InvalidMethod(_))));

        let defs = SecurityDefinitions::from_yaml(
            "users:\n  - {username: a, password: x}\n  - {username: a, password: y}\n",
        )
        .unwrap();
        assert!(matches!(defs.user_store(), Err(SecurityError::DuplicateUser(_))));

        assert!(matches!(
            SecurityDefinitions::from_yaml("groups: []"),
            Err(SecurityError::Yaml(_))
        ));
    }
}
