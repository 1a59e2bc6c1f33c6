use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub docs: DocsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    /// Realm announced in `WWW-Authenticate` on 401 responses
    pub realm: String,
    /// When false the documentation paths skip authorization entirely
    pub docs_require_auth: bool,
    pub docs_roles: Vec<String>,
    /// Optional YAML file overriding the built-in accounts and access rules
    pub definitions_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocsConfig {
    pub enabled: bool,
    pub title: String,
    pub description: String,
    pub version: String,
    pub base_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(port) = env::var("SERVER_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = split_list(&v);
        }
        if let Ok(v) = env::var("SECURITY_REALM") {
            self.security.realm = v;
        }
        if let Ok(v) = env::var("SECURITY_DOCS_REQUIRE_AUTH") {
            self.security.docs_require_auth = v.parse().unwrap_or(self.security.docs_require_auth);
        }
        if let Ok(v) = env::var("SECURITY_DOCS_ROLES") {
            self.security.docs_roles = split_list(&v);
        }
        if let Ok(v) = env::var("SECURITY_DEFINITIONS_FILE") {
            self.security.definitions_file = Some(PathBuf::from(v));
        }

        // Docs overrides
        if let Ok(v) = env::var("DOCS_ENABLED") {
            self.docs.enabled = v.parse().unwrap_or(self.docs.enabled);
        }
        if let Ok(v) = env::var("DOCS_TITLE") {
            self.docs.title = v;
        }
        if let Ok(v) = env::var("DOCS_BASE_PATH") {
            self.docs.base_path = v;
        }

        if let Ok(v) = env::var("LOG_LEVEL") {
            self.logging.level = v;
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:8080".to_string()],
                realm: "Realm".to_string(),
                docs_require_auth: false,
                docs_roles: default_docs_roles(),
                definitions_file: None,
            },
            docs: DocsConfig::default(),
            logging: LoggingConfig {
                level: "debug".to_string(),
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                realm: "Realm".to_string(),
                docs_require_auth: true,
                docs_roles: default_docs_roles(),
                definitions_file: None,
            },
            docs: DocsConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            security: SecurityConfig {
                enable_cors: false,
                cors_origins: Vec::new(),
                realm: "Realm".to_string(),
                docs_require_auth: true,
                docs_roles: default_docs_roles(),
                definitions_file: None,
            },
            docs: DocsConfig::default(),
            logging: LoggingConfig {
                level: "warn".to_string(),
            },
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self.environment, Environment::Production)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            title: "Api Documentation".to_string(),
            description: "User API with role-based access".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            base_path: "/".to_string(),
        }
    }
}

fn default_docs_roles() -> Vec<String> {
    vec!["user".to_string(), "admin".to_string()]
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(!config.security.docs_require_auth);
        assert!(config.docs.enabled);
        assert_eq!(config.security.realm, "Realm");
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.security.docs_require_auth);
        assert_eq!(config.security.docs_roles, vec!["user", "admin"]);
        assert!(!config.security.enable_cors);
    }

    #[test]
    fn test_only_development_leaves_docs_open() {
        assert!(!AppConfig::development().security.docs_require_auth);
        assert!(AppConfig::staging().security.docs_require_auth);
        assert!(AppConfig::production().security.docs_require_auth);
    }

    #[test]
    fn test_split_list_drops_blanks() {
        assert_eq!(split_list("a, b,,c "), vec!["a", "b", "c"]);
    }
}
