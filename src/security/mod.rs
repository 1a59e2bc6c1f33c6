pub mod ant;
pub mod definitions;
pub mod matchers;
pub mod policy;
pub mod users;

use thiserror::Error;

pub use ant::{AntPattern, PatternError};
pub use definitions::SecurityDefinitions;
pub use matchers::{default_access_rules, AccessDecision, AccessRule, AccessRules, AccessRulesBuilder, RoleBinding};
pub use policy::{SecurityPolicy, DOCS_WHITELIST};
pub use users::{default_user_store, parse_basic_credentials, AuthError, Credentials, InMemoryUserStore, Principal};

#[derive(Error, Debug)]
pub enum SecurityError {
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: PatternError,
    },

    #[error("Invalid role '{role}': {reason}")]
    InvalidRole { role: String, reason: String },

    #[error("Access rule has no roles: {0}")]
    MissingRoles(String),

    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("Duplicate user: {0}")]
    DuplicateUser(String),

    #[error("Failed to read security definitions: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse security definitions: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
