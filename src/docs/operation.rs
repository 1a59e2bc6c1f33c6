use axum::http::Method;

/// Where an operation parameter comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterLocation {
    Path,
    Body,
}

impl ParameterLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Body => "body",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiParameter {
    pub name: String,
    pub location: ParameterLocation,
    pub description: String,
    pub required: bool,
    /// Definition name for body parameters, primitive type otherwise
    pub schema: String,
}

impl ApiParameter {
    pub fn path(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            location: ParameterLocation::Path,
            description: description.to_string(),
            required: true,
            schema: "string".to_string(),
        }
    }

    pub fn body(name: &str, definition: &str) -> Self {
        Self {
            name: name.to_string(),
            location: ParameterLocation::Body,
            description: name.to_string(),
            required: true,
            schema: definition.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponseMessage {
    pub code: u16,
    pub message: String,
    /// Definition name of the response body, if any
    pub schema: Option<String>,
}

impl ApiResponseMessage {
    pub fn new(code: u16, message: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
            schema: None,
        }
    }

    pub fn with_schema(mut self, definition: &str) -> Self {
        self.schema = Some(definition.to_string());
        self
    }
}

/// Documentation-side description of one route
#[derive(Debug, Clone)]
pub struct ApiOperation {
    pub method: Method,
    /// Route template as documented, e.g. `/user/{username}`
    pub path: String,
    pub operation_id: String,
    pub tag: String,
    pub summary: String,
    pub notes: Option<String>,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    pub parameters: Vec<ApiParameter>,
    pub responses: Vec<ApiResponseMessage>,
    /// Names of security schemes protecting the operation
    pub security: Vec<String>,
    /// Ask the notes reader to document which roles may call this operation
    pub role_access_notes: bool,
}

impl ApiOperation {
    pub fn new(method: Method, path: &str, operation_id: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            operation_id: operation_id.to_string(),
            tag: String::new(),
            summary: String::new(),
            notes: None,
            consumes: Vec::new(),
            produces: Vec::new(),
            parameters: Vec::new(),
            responses: Vec::new(),
            security: Vec::new(),
            role_access_notes: false,
        }
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.tag = tag.to_string();
        self
    }

    pub fn summary(mut self, summary: &str) -> Self {
        self.summary = summary.to_string();
        self
    }

    pub fn consumes(mut self, media_type: &str) -> Self {
        self.consumes.push(media_type.to_string());
        self
    }

    pub fn produces(mut self, media_type: &str) -> Self {
        self.produces.push(media_type.to_string());
        self
    }

    pub fn parameter(mut self, parameter: ApiParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn response(mut self, response: ApiResponseMessage) -> Self {
        self.responses.push(response);
        self
    }

    pub fn secured_by(mut self, scheme: &str) -> Self {
        self.security.push(scheme.to_string());
        self
    }

    pub fn with_role_access_notes(mut self) -> Self {
        self.role_access_notes = true;
        self
    }
}

/// Mutable view handed to each [`OperationPlugin`]
#[derive(Debug)]
pub struct OperationContext {
    operation: ApiOperation,
}

impl OperationContext {
    pub fn new(operation: ApiOperation) -> Self {
        Self { operation }
    }

    pub fn operation(&self) -> &ApiOperation {
        &self.operation
    }

    pub fn set_notes(&mut self, notes: String) {
        self.operation.notes = Some(notes);
    }

    pub fn into_operation(self) -> ApiOperation {
        self.operation
    }
}

/// Hook run over every documented operation before the document is
/// assembled. Plugins handle their own failures; `apply` cannot fail.
pub trait OperationPlugin: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, context: &mut OperationContext);
}
