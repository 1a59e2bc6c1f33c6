use std::sync::Arc;

use crate::config::AppConfig;
use crate::docs::{self, SwaggerDocument};
use crate::security::{
    default_access_rules, default_user_store, AccessRules, InMemoryUserStore, SecurityDefinitions, SecurityError,
    SecurityPolicy,
};

/// Shared, read-only state handed to middleware and handlers
#[derive(Clone)]
pub struct AppState {
    pub policy: Arc<SecurityPolicy>,
    pub users: Arc<InMemoryUserStore>,
    pub docs: Arc<SwaggerDocument>,
    pub realm: Arc<str>,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Result<Self, SecurityError> {
        let (users, rules) = match &config.security.definitions_file {
            Some(path) => {
                let definitions = SecurityDefinitions::load(path)?;
                (definitions.user_store()?, definitions.access_rules()?)
            }
            None => (default_user_store(), default_access_rules()?),
        };

        Self::new(config, users, rules)
    }

    pub fn new(config: &AppConfig, users: InMemoryUserStore, rules: AccessRules) -> Result<Self, SecurityError> {
        let rules = Arc::new(rules);

        let mut policy = SecurityPolicy::new(rules.clone())?;
        if config.security.docs_require_auth {
            policy = policy.with_whitelist_roles(config.security.docs_roles.clone());
        }

        let docs = docs::document_api(&config.docs, rules.clone());

        tracing::info!(
            "Security initialized: {} accounts, {} access rules",
            users.len(),
            rules.len()
        );
        for rule in rules.iter() {
            tracing::debug!("Access rule: {}", rule);
        }

        Ok(Self {
            policy: Arc::new(policy),
            users: Arc::new(users),
            docs: Arc::new(docs),
            realm: Arc::from(config.security.realm.as_str()),
        })
    }
}
