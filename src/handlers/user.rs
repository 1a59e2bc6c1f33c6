// handlers/user.rs - GET /user/:username and POST /user

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::{Method, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::docs::{ApiOperation, ApiParameter, ApiResponseMessage, BASIC_AUTH_SCHEME};
use crate::error::ApiError;
use crate::security::Principal;

pub const USER_RECORD_DEFINITION: &str = "UserRecord";
const TAG: &str = "user-controller";
const JSON: &str = "application/json";

/// User record as exchanged over the wire.
///
/// `name` holds the first name and `mail` the email address. Every field is
/// optional; missing fields serialize as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub mail: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl UserRecord {
    /// Demo record derived from the username alone
    pub fn demo(username: &str) -> Self {
        Self {
            username: Some(username.to_string()),
            mail: Some(format!("{}@test.com", username)),
            password: Some("****".to_string()),
            last_name: Some("Test".to_string()),
            name: Some("user".to_string()),
            address: Some("My Adress".to_string()),
        }
    }
}

/// GET /user/:username - details of the user with the given username
pub async fn get_user(
    Extension(principal): Extension<Principal>,
    Path(username): Path<String>,
) -> Json<UserRecord> {
    tracing::debug!("Getting user with username '{}' for '{}'", username, principal.username);
    Json(UserRecord::demo(&username))
}

/// POST /user - create a new user or update an existing one (by username)
pub async fn create_user(
    Extension(principal): Extension<Principal>,
    payload: Result<Json<UserRecord>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(record) = payload?;
    tracing::debug!(
        "Creating user with username '{}' for '{}'",
        record.username.as_deref().unwrap_or("<none>"),
        principal.username
    );
    Ok(StatusCode::CREATED)
}

/// Documentation for the routes above
pub fn operations() -> Vec<ApiOperation> {
    vec![
        ApiOperation::new(Method::GET, "/user/{username}", "getUserUsingGET")
            .tag(TAG)
            .summary("Get details of a user with the given username")
            .produces(JSON)
            .parameter(ApiParameter::path("username", "Non-empty username"))
            .response(ApiResponseMessage::new(200, "Details about the given user").with_schema(USER_RECORD_DEFINITION))
            .response(ApiResponseMessage::new(401, "Cannot authenticate"))
            .response(ApiResponseMessage::new(403, "Not authorized to get details about the given user"))
            .secured_by(BASIC_AUTH_SCHEME)
            .with_role_access_notes(),
        ApiOperation::new(Method::POST, "/user", "createUserUsingPOST")
            .tag(TAG)
            .summary("Create a new user or update an existing user (based on username)")
            .consumes(JSON)
            .produces(JSON)
            .parameter(ApiParameter::body("userRecord", USER_RECORD_DEFINITION))
            .response(ApiResponseMessage::new(200, "User was successfully updated"))
            .response(ApiResponseMessage::new(201, "User was successfully created"))
            .response(ApiResponseMessage::new(401, "Cannot authenticate"))
            .response(ApiResponseMessage::new(403, "Not authorized to create or update users"))
            .secured_by(BASIC_AUTH_SCHEME)
            .with_role_access_notes(),
    ]
}

pub fn user_record_schema() -> Value {
    let string = json!({ "type": "string" });
    json!({
        "type": "object",
        "title": USER_RECORD_DEFINITION,
        "properties": {
            "username": string,
            "mail": string,
            "password": string,
            "lastName": string,
            "name": string,
            "address": string,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_record_is_derived_from_username() {
        let record = UserRecord::demo("alice");
        assert_eq!(record.mail.as_deref(), Some("alice@test.com"));
        assert_eq!(record.password.as_deref(), Some("****"));
        assert_eq!(record.last_name.as_deref(), Some("Test"));
    }

    #[test]
    fn wire_format_uses_camel_case_and_nulls() {
        let value = serde_json::to_value(UserRecord::demo("bob")).unwrap();
        assert_eq!(value["lastName"], "Test");
        assert_eq!(value["username"], "bob");

        let sparse = serde_json::to_value(UserRecord::default()).unwrap();
        assert!(sparse["address"].is_null());
    }

    #[test]
    fn unknown_and_missing_fields_are_tolerated() {
        let record: UserRecord = serde_json::from_str(r#"{"username":"carol","nickname":"c"}"#).unwrap();
        assert_eq!(record.username.as_deref(), Some("carol"));
        assert_eq!(record.mail, None);
    }

    #[test]
    fn every_operation_asks_for_role_notes() {
        let ops = operations();
        assert_eq!(ops.len(), 2);
        assert!(ops.iter().all(|op| op.role_access_notes));
        assert!(ops.iter().all(|op| op.security == vec![BASIC_AUTH_SCHEME.to_string()]));
    }
}
