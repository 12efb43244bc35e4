//! Model definitions referenced by documented calls.
//!
//! The emitters only need three things from the model layer: the shared definitions every
//! document carries, a short name for a model reference, and the success response wrappers
//! synthesized around a model. [`ModelDefinitions`] is that seam; [`SchemaCatalog`] is the
//! implementation used by the command-line tool.

use indexmap::IndexMap;
use serde_json::{json, Value};

/// Definition names the fixed response table points at
pub const API_ERROR: &str = "ApiError";
pub const API_ERROR_UNAUTHORIZED: &str = "ApiErrorUnauthorized";
pub const API_ERROR_ACCESS_DENIED: &str = "ApiErrorAccessDenied";
pub const SUCCESS_RESPONSE: &str = "SuccessResponse";
pub const PAGINATOR: &str = "Paginator";

/// Resolves model references into Swagger definitions.
pub trait ModelDefinitions {
    /// Definitions present in every generated document
    fn all_definitions(&self) -> IndexMap<String, Value>;

    /// Wraps `model` into a flat success response definition named `name`
    fn success_response_definition(&self, name: &str, model: &str) -> IndexMap<String, Value>;

    /// Wraps `model` into a paginated success response definition named `name`
    fn success_response_paginated_definition(
        &self,
        name: &str,
        model: &str,
    ) -> IndexMap<String, Value>;

    /// `App\Models\User`, `crate::models::User` and `models.User` all shorten to `User`
    fn model_short_name(&self, model: &str) -> String {
        model
            .rsplit(|c: char| c == '\\' || c == ':' || c == '/' || c == '.')
            .find(|segment| !segment.is_empty())
            .unwrap_or(model)
            .to_string()
    }
}

/// Built-in error and success envelopes plus the application's own model schemas.
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    models: IndexMap<String, Value>,
}

impl SchemaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a model schema
    pub fn with_definition(mut self, name: impl Into<String>, schema: Value) -> Self {
        self.models.insert(name.into(), schema);
        self
    }

    pub fn extend(&mut self, models: impl IntoIterator<Item = (String, Value)>) {
        self.models.extend(models);
    }

    fn reference(&self, model: &str) -> Value {
        json!({ "$ref": format!("#/definitions/{}", self.model_short_name(model)) })
    }
}

fn error_definition(description: &str) -> Value {
    json!({
        "type": "object",
        "description": description,
        "properties": {
            "message": { "type": "string" },
            "result": { "type": "boolean", "default": false },
            "payload": { "type": "object" },
        },
    })
}

impl ModelDefinitions for SchemaCatalog {
    fn all_definitions(&self) -> IndexMap<String, Value> {
        let mut definitions = IndexMap::new();
        definitions.insert(
            API_ERROR.to_string(),
            error_definition("Generic API error. Check `message` for more information."),
        );
        definitions.insert(
            API_ERROR_UNAUTHORIZED.to_string(),
            error_definition("Authentication failed"),
        );
        definitions.insert(
            API_ERROR_ACCESS_DENIED.to_string(),
            error_definition("Access denied"),
        );
        definitions.insert(
            SUCCESS_RESPONSE.to_string(),
            json!({
                "type": "object",
                "properties": {
                    "message": { "type": "string" },
                    "result": { "type": "boolean", "default": true },
                    "payload": { "type": "object" },
                },
            }),
        );
        definitions.insert(
            PAGINATOR.to_string(),
            json!({
                "type": "object",
                "properties": {
                    "current_page": { "type": "integer" },
                    "per_page": { "type": "integer" },
                    "total": { "type": "integer" },
                    "last_page": { "type": "integer" },
                    "next_page_url": { "type": "string" },
                    "prev_page_url": { "type": "string" },
                },
            }),
        );

        for (name, schema) in &self.models {
            definitions.insert(name.clone(), schema.clone());
        }
        definitions
    }

    fn success_response_definition(&self, name: &str, model: &str) -> IndexMap<String, Value> {
        let mut definition = IndexMap::new();
        definition.insert(
            name.to_string(),
            json!({
                "type": "object",
                "properties": {
                    "payload": self.reference(model),
                    "message": { "type": "string" },
                    "result": { "type": "boolean", "default": true },
                },
            }),
        );
        definition
    }

    fn success_response_paginated_definition(
        &self,
        name: &str,
        model: &str,
    ) -> IndexMap<String, Value> {
        let mut definition = IndexMap::new();
        definition.insert(
            name.to_string(),
            json!({
                "type": "object",
                "properties": {
                    "payload": {
                        "type": "array",
                        "items": self.reference(model),
                    },
                    "paginator": { "$ref": format!("#/definitions/{}", PAGINATOR) },
                    "message": { "type": "string" },
                    "result": { "type": "boolean", "default": true },
                },
            }),
        );
        definition
    }
}
