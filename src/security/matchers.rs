use std::fmt;

use axum::http::Method;
use serde::Serialize;

use super::ant::AntPattern;
use super::users::Principal;
use super::SecurityError;

/// Outcome of an authorization check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Granted,
    /// No authenticated principal on a protected resource (401)
    Unauthenticated,
    /// Authenticated, but lacking a required role (403)
    Forbidden { required: Vec<String> },
}

/// One (method, ant pattern, roles) rule
#[derive(Debug, Clone)]
pub struct AccessRule {
    method: Method,
    pattern: AntPattern,
    roles: Vec<String>,
}

impl AccessRule {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    pub fn matches(&self, method: &Method, path: &str) -> bool {
        &self.method == method && self.pattern.matches(path)
    }
}

impl fmt::Display for AccessRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> [{}]", self.method, self.pattern, self.roles.join(", "))
    }
}

/// Serializable view of a rule, used by the `rules` CLI command
#[derive(Debug, Clone, Serialize)]
pub struct AccessRuleView {
    pub method: String,
    pub pattern: String,
    pub roles: Vec<String>,
}

impl From<&AccessRule> for AccessRuleView {
    fn from(rule: &AccessRule) -> Self {
        Self {
            method: rule.method.to_string(),
            pattern: rule.pattern().to_string(),
            roles: rule.roles.clone(),
        }
    }
}

/// Ordered, read-only list of access rules.
///
/// Only obtainable through [`AccessRulesBuilder::build`]; there is no way to
/// add or remove rules afterwards.
#[derive(Debug, Clone, Default)]
pub struct AccessRules {
    rules: Vec<AccessRule>,
}

impl AccessRules {
    pub fn builder() -> AccessRulesBuilder {
        AccessRulesBuilder::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AccessRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules whose method and pattern match the request, in registration order
    pub fn matching<'a>(&'a self, method: &'a Method, path: &'a str) -> impl Iterator<Item = &'a AccessRule> + 'a {
        self.rules.iter().filter(move |rule| rule.matches(method, path))
    }

    /// Check a request against every matching rule.
    ///
    /// Returns `None` when no rule covers the request. Otherwise the principal
    /// must hold at least one role of each matching rule.
    pub fn authorize(&self, method: &Method, path: &str, principal: Option<&Principal>) -> Option<AccessDecision> {
        let mut matched = self.matching(method, path).peekable();
        matched.peek()?;

        let Some(principal) = principal else {
            return Some(AccessDecision::Unauthenticated);
        };

        for rule in matched {
            if !principal.has_any_role(rule.roles.as_slice()) {
                tracing::debug!(
                    "Access denied for '{}' on {} {}: rule {} not satisfied",
                    principal.username,
                    method,
                    path,
                    rule
                );
                return Some(AccessDecision::Forbidden {
                    required: rule.roles.clone(),
                });
            }
        }

        Some(AccessDecision::Granted)
    }

    pub fn views(&self) -> Vec<AccessRuleView> {
        self.rules.iter().map(AccessRuleView::from).collect()
    }
}

#[derive(Debug, Clone)]
struct PendingRule {
    method: Method,
    pattern: String,
    roles: Vec<String>,
}

impl fmt::Display for PendingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> [{}]", self.method, self.pattern, self.roles.join(", "))
    }
}

/// Fluent builder:
///
/// ```
/// use axum::http::Method;
/// use user_access_api::security::AccessRules;
///
/// let rules = AccessRules::builder()
///     .ant_matchers(Method::POST, "/user").has_role("admin")
///     .ant_matchers(Method::GET, "/user/*").has_any_role(["admin", "user"])
///     .build()
///     .unwrap();
/// assert_eq!(rules.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct AccessRulesBuilder {
    pending: Vec<PendingRule>,
}

impl AccessRulesBuilder {
    /// Start a rule; the returned binding must be given its roles before
    /// another rule can be added
    pub fn ant_matchers(self, method: Method, pattern: impl Into<String>) -> RoleBinding {
        RoleBinding {
            builder: self,
            method,
            pattern: pattern.into(),
        }
    }

    /// Compile every pattern and validate roles. The first failing rule is
    /// logged and its error returned.
    pub fn build(self) -> Result<AccessRules, SecurityError> {
        let mut rules = Vec::with_capacity(self.pending.len());

        for pending in self.pending {
            match compile_rule(&pending) {
                Ok(rule) => rules.push(rule),
                Err(e) => {
                    tracing::error!("Could not register access rule {}: {}", pending, e);
                    return Err(e);
                }
            }
        }

        tracing::debug!("Registered {} access rules", rules.len());
        Ok(AccessRules { rules })
    }
}

fn compile_rule(pending: &PendingRule) -> Result<AccessRule, SecurityError> {
    if pending.roles.is_empty() {
        return Err(SecurityError::MissingRoles(pending.to_string()));
    }

    for role in &pending.roles {
        if role.trim().is_empty() {
            return Err(SecurityError::InvalidRole {
                role: role.clone(),
                reason: "role must not be blank".to_string(),
            });
        }
        if role.starts_with("ROLE_") {
            return Err(SecurityError::InvalidRole {
                role: role.clone(),
                reason: "role must not start with 'ROLE_'".to_string(),
            });
        }
    }

    let pattern = AntPattern::compile(&pending.pattern).map_err(|source| SecurityError::InvalidPattern {
        pattern: pending.pattern.clone(),
        source,
    })?;

    Ok(AccessRule {
        method: pending.method.clone(),
        pattern,
        roles: pending.roles.clone(),
    })
}

/// A rule waiting for its roles
#[must_use = "a matcher without roles is never registered"]
#[derive(Debug)]
pub struct RoleBinding {
    builder: AccessRulesBuilder,
    method: Method,
    pattern: String,
}

impl RoleBinding {
    pub fn has_role(self, role: impl Into<String>) -> AccessRulesBuilder {
        let role: String = role.into();
        self.has_any_role([role])
    }

    pub fn has_any_role<I, S>(self, roles: I) -> AccessRulesBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let RoleBinding {
            mut builder,
            method,
            pattern,
        } = self;

        builder.pending.push(PendingRule {
            method,
            pattern,
            roles: roles.into_iter().map(Into::into).collect(),
        });
        builder
    }
}

/// Rules protecting the user endpoints
pub fn default_access_rules() -> Result<AccessRules, SecurityError> {
    AccessRules::builder()
        .ant_matchers(Method::POST, "/user")
        .has_role("admin")
        .ant_matchers(Method::GET, "/user/*")
        .has_any_role(["admin", "user"])
        .build()
}
