use std::collections::{BTreeSet, HashMap};

use axum::http::{header::AUTHORIZATION, HeaderMap};
use base64::{engine::general_purpose, Engine as _};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid basic authentication header: {0}")]
    InvalidHeader(String),

    #[error("Bad credentials")]
    BadCredentials,
}

/// Authenticated caller, inserted into request extensions by the auth middleware
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub username: String,
    pub roles: BTreeSet<String>,
}

impl Principal {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn has_any_role<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        roles.iter().any(|r| self.has_role(r.as_ref()))
    }
}

/// Username/password pair taken from an `Authorization: Basic` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
struct UserAccount {
    password: String,
    roles: BTreeSet<String>,
}

/// Fixed set of accounts held in memory. Passwords are compared as plaintext.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserStore {
    accounts: HashMap<String, UserAccount>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user<I, S>(mut self, username: &str, password: &str, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accounts.insert(
            username.to_string(),
            UserAccount {
                password: password.to_string(),
                roles: roles.into_iter().map(Into::into).collect(),
            },
        );
        self
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn contains(&self, username: &str) -> bool {
        self.accounts.contains_key(username)
    }

    pub fn authenticate(&self, username: &str, password: &str) -> Result<Principal, AuthError> {
        let account = self.accounts.get(username).ok_or_else(|| {
            tracing::debug!("Authentication failed: unknown user '{}'", username);
            AuthError::BadCredentials
        })?;

        if account.password != password {
            tracing::debug!("Authentication failed: wrong password for user '{}'", username);
            return Err(AuthError::BadCredentials);
        }

        Ok(Principal {
            username: username.to_string(),
            roles: account.roles.clone(),
        })
    }
}

/// The two demo accounts: `user`/`userpw` and `admin`/`adminpw`
pub fn default_user_store() -> InMemoryUserStore {
    InMemoryUserStore::new()
        .with_user("user", "userpw", ["user"])
        .with_user("admin", "adminpw", ["user", "admin"])
}

/// Extract basic credentials from the request headers.
///
/// Returns `Ok(None)` when there is no `Authorization` header or it uses a
/// different scheme; such requests are treated as anonymous.
pub fn parse_basic_credentials(headers: &HeaderMap) -> Result<Option<Credentials>, AuthError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|_| AuthError::InvalidHeader("header is not visible ASCII".to_string()))?
        .trim();

    let Some((scheme, encoded)) = value.split_once(' ') else {
        return Ok(None);
    };
    if !scheme.eq_ignore_ascii_case("basic") {
        return Ok(None);
    }

    let decoded = general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| AuthError::InvalidHeader(format!("failed to decode token: {}", e)))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|_| AuthError::InvalidHeader("token is not valid UTF-8".to_string()))?;

    let (username, password) = decoded
        .split_once(':')
        .ok_or_else(|| AuthError::InvalidHeader("token does not contain ':'".to_string()))?;

    Ok(Some(Credentials {
        username: username.to_string(),
        password: password.to_string(),
    }))
}
