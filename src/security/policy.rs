use std::sync::Arc;

use axum::http::Method;

use super::ant::AntPattern;
use super::matchers::{AccessDecision, AccessRules};
use super::users::Principal;
use super::SecurityError;

/// Paths served by the documentation layer
pub const DOCS_WHITELIST: [&str; 4] = [
    "/swagger-resources/**",
    "/swagger-ui.html",
    "/v2/api-docs",
    "/webjars/**",
];

/// Request authorization: documentation whitelist first, then the access
/// rules, then "any other request must be authenticated".
#[derive(Debug, Clone)]
pub struct SecurityPolicy {
    whitelist: Vec<AntPattern>,
    /// `None` lets whitelisted paths through without any check
    whitelist_roles: Option<Vec<String>>,
    rules: Arc<AccessRules>,
}

impl SecurityPolicy {
    pub fn new(rules: Arc<AccessRules>) -> Result<Self, SecurityError> {
        let whitelist = DOCS_WHITELIST
            .iter()
            .map(|p| {
                AntPattern::compile(p).map_err(|source| SecurityError::InvalidPattern {
                    pattern: p.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            whitelist,
            whitelist_roles: None,
            rules,
        })
    }

    /// Require one of `roles` on whitelisted paths instead of skipping checks
    pub fn with_whitelist_roles(mut self, roles: Vec<String>) -> Self {
        self.whitelist_roles = Some(roles);
        self
    }

    pub fn is_whitelisted(&self, path: &str) -> bool {
        self.whitelist.iter().any(|p| p.matches(path))
    }

    pub fn decide(&self, method: &Method, path: &str, principal: Option<&Principal>) -> AccessDecision {
        if self.is_whitelisted(path) {
            return match (&self.whitelist_roles, principal) {
                (None, _) => AccessDecision::Granted,
                (Some(_), None) => AccessDecision::Unauthenticated,
                (Some(roles), Some(p)) if p.has_any_role(roles.as_slice()) => AccessDecision::Granted,
                (Some(roles), Some(_)) => AccessDecision::Forbidden {
                    required: roles.clone(),
                },
            };
        }

        if let Some(decision) = self.rules.authorize(method, path, principal) {
            return decision;
        }

        match principal {
            Some(_) => AccessDecision::Granted,
            None => AccessDecision::Unauthenticated,
        }
    }
}
