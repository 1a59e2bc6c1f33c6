//! API documentation: operation descriptions, plugins that enrich them, and
//! the Swagger 2.0 document assembled from both.

pub mod notes;
pub mod operation;
pub mod swagger;

use std::sync::Arc;

pub use notes::{OperationNotesReader, ROLE_NOTES_PREFIX};
pub use operation::{ApiOperation, ApiParameter, ApiResponseMessage, OperationContext, OperationPlugin};
pub use swagger::{Docket, SwaggerDocument, SwaggerResource, BASIC_AUTH_SCHEME};

use crate::config::DocsConfig;
use crate::handlers::user;
use crate::security::AccessRules;

/// Build the documentation for every route of the service
pub fn document_api(config: &DocsConfig, rules: Arc<AccessRules>) -> SwaggerDocument {
    Docket::new(config)
        .plugin(OperationNotesReader::new(rules))
        .definition(user::USER_RECORD_DEFINITION, user::user_record_schema())
        .document(user::operations())
}
