use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Value};

use super::operation::{ApiOperation, ApiParameter, OperationContext, OperationPlugin, ParameterLocation};
use crate::config::DocsConfig;

pub const BASIC_AUTH_SCHEME: &str = "BasicAuth";

/// Swagger 2.0 document served at `/v2/api-docs`
#[derive(Debug, Clone, Serialize)]
pub struct SwaggerDocument {
    pub swagger: &'static str,
    pub info: Info,
    #[serde(rename = "basePath")]
    pub base_path: String,
    pub tags: Vec<Tag>,
    pub paths: BTreeMap<String, BTreeMap<String, OperationObject>>,
    #[serde(rename = "securityDefinitions")]
    pub security_definitions: BTreeMap<String, SecurityScheme>,
    pub definitions: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Info {
    pub title: String,
    pub description: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Tag {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SecurityScheme {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationObject {
    pub tags: Vec<String>,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub operation_id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub produces: Vec<String>,
    pub parameters: Vec<Value>,
    pub responses: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<BTreeMap<String, Vec<String>>>,
}

/// Entry of the `/swagger-resources` listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwaggerResource {
    pub name: String,
    pub url: String,
    pub swagger_version: String,
    pub location: String,
}

impl SwaggerResource {
    pub fn default_group() -> Self {
        Self {
            name: "default".to_string(),
            url: "/v2/api-docs".to_string(),
            swagger_version: "2.0".to_string(),
            location: "/v2/api-docs".to_string(),
        }
    }
}

/// Collects operations, runs the plugins over them and assembles the
/// Swagger document.
pub struct Docket {
    info: Info,
    base_path: String,
    plugins: Vec<Box<dyn OperationPlugin>>,
    definitions: BTreeMap<String, Value>,
}

impl Docket {
    pub fn new(config: &DocsConfig) -> Self {
        Self {
            info: Info {
                title: config.title.clone(),
                description: config.description.clone(),
                version: config.version.clone(),
            },
            base_path: config.base_path.clone(),
            plugins: Vec::new(),
            definitions: BTreeMap::new(),
        }
    }

    pub fn plugin(mut self, plugin: impl OperationPlugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    pub fn definition(mut self, name: &str, schema: Value) -> Self {
        self.definitions.insert(name.to_string(), schema);
        self
    }

    pub fn document(&self, operations: Vec<ApiOperation>) -> SwaggerDocument {
        let mut paths: BTreeMap<String, BTreeMap<String, OperationObject>> = BTreeMap::new();
        let mut tags: Vec<Tag> = Vec::new();
        let mut uses_basic_auth = false;

        for operation in operations {
            let mut context = OperationContext::new(operation);
            for plugin in &self.plugins {
                tracing::trace!("Applying documentation plugin '{}'", plugin.name());
                plugin.apply(&mut context);
            }
            let operation = context.into_operation();

            if !operation.tag.is_empty() && !tags.iter().any(|t| t.name == operation.tag) {
                tags.push(Tag {
                    name: operation.tag.clone(),
                });
            }
            uses_basic_auth |= operation.security.iter().any(|s| s == BASIC_AUTH_SCHEME);

            let method = operation.method.as_str().to_ascii_lowercase();
            paths
                .entry(operation.path.clone())
                .or_default()
                .insert(method, operation_object(operation));
        }

        let mut security_definitions = BTreeMap::new();
        if uses_basic_auth {
            security_definitions.insert(
                BASIC_AUTH_SCHEME.to_string(),
                SecurityScheme {
                    kind: "basic".to_string(),
                },
            );
        }

        tracing::debug!("Generated API documentation for {} paths", paths.len());

        SwaggerDocument {
            swagger: "2.0",
            info: self.info.clone(),
            base_path: self.base_path.clone(),
            tags,
            paths,
            security_definitions,
            definitions: self.definitions.clone(),
        }
    }
}

fn operation_object(operation: ApiOperation) -> OperationObject {
    let responses = operation
        .responses
        .iter()
        .map(|r| {
            let mut body = json!({ "description": r.message });
            if let Some(schema) = &r.schema {
                body["schema"] = json!({ "$ref": format!("#/definitions/{}", schema) });
            }
            (r.code.to_string(), body)
        })
        .collect();

    let security = operation
        .security
        .iter()
        .map(|scheme| BTreeMap::from([(scheme.clone(), Vec::new())]))
        .collect();

    OperationObject {
        tags: if operation.tag.is_empty() {
            Vec::new()
        } else {
            vec![operation.tag.clone()]
        },
        summary: operation.summary,
        description: operation.notes,
        operation_id: operation.operation_id,
        consumes: operation.consumes,
        produces: operation.produces,
        parameters: operation.parameters.iter().map(parameter_object).collect(),
        responses,
        security,
    }
}

fn parameter_object(parameter: &ApiParameter) -> Value {
    let mut value = json!({
        "name": parameter.name,
        "in": parameter.location.as_str(),
        "description": parameter.description,
        "required": parameter.required,
    });

    match parameter.location {
        ParameterLocation::Body => {
            value["schema"] = json!({ "$ref": format!("#/definitions/{}", parameter.schema) });
        }
        ParameterLocation::Path => {
            value["type"] = json!(parameter.schema);
        }
    }

    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::operation::ApiResponseMessage;
    use axum::http::Method;

    struct SummaryUpper;

    impl OperationPlugin for SummaryUpper {
        fn name(&self) -> &'static str {
            "summary-upper"
        }

        fn apply(&self, context: &mut OperationContext) {
            let upper = context.operation().summary.to_uppercase();
            context.set_notes(upper);
        }
    }

    fn sample() -> Vec<ApiOperation> {
        vec![
            ApiOperation::new(Method::GET, "/user/{username}", "getUser")
                .tag("user")
                .summary("get a user")
                .produces("application/json")
                .parameter(ApiParameter::path("username", "Non-empty username"))
                .response(ApiResponseMessage::new(200, "ok").with_schema("UserRecord"))
                .secured_by(BASIC_AUTH_SCHEME),
            ApiOperation::new(Method::POST, "/user", "createUser")
                .tag("user")
                .summary("create a user")
                .consumes("application/json")
                .parameter(ApiParameter::body("user", "UserRecord"))
                .response(ApiResponseMessage::new(201, "created")),
        ]
    }

    #[test]
    fn document_layout() {
        let docket = Docket::new(&DocsConfig::default()).definition("UserRecord", json!({ "type": "object" }));
        let doc = serde_json::to_value(docket.document(sample())).unwrap();

        assert_eq!(doc["swagger"], "2.0");
        assert_eq!(doc["basePath"], "/");
        assert_eq!(doc["tags"].as_array().unwrap().len(), 1);
        assert_eq!(doc["securityDefinitions"]["BasicAuth"]["type"], "basic");
        assert_eq!(doc["definitions"]["UserRecord"]["type"], "object");

        let get = &doc["paths"]["/user/{username}"]["get"];
        assert_eq!(get["operationId"], "getUser");
        assert_eq!(get["parameters"][0]["in"], "path");
        assert_eq!(get["parameters"][0]["type"], "string");
        assert_eq!(get["responses"]["200"]["schema"]["$ref"], "#/definitions/UserRecord");
        assert_eq!(get["security"][0]["BasicAuth"], json!([]));
        assert!(get.get("description").is_none());

        let post = &doc["paths"]["/user"]["post"];
        assert_eq!(post["parameters"][0]["in"], "body");
        assert!(post["parameters"][0].get("type").is_none());
        assert_eq!(post["parameters"][0]["schema"]["$ref"], "#/definitions/UserRecord");
        assert_eq!(post["consumes"], json!(["application/json"]));
        assert!(post.get("security").is_none());
    }

    #[test]
    fn plugins_run_for_every_operation() {
        let docket = Docket::new(&DocsConfig::default()).plugin(SummaryUpper);
        let doc = docket.document(sample());

        assert_eq!(
            doc.paths["/user/{username}"]["get"].description.as_deref(),
            Some("GET A USER")
        );
        assert_eq!(doc.paths["/user"]["post"].description.as_deref(), Some("CREATE A USER"));
    }

    #[test]
    fn no_basic_auth_definition_without_secured_operations() {
        let docket = Docket::new(&DocsConfig::default());
        let ops = vec![ApiOperation::new(Method::GET, "/open", "open")];
        assert!(docket.document(ops).security_definitions.is_empty());
    }
}
