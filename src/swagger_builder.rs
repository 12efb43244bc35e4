//! Swagger 2.0 emission.
//!
//! [`SwaggerBuilder`] translates every registered [`ApiCall`] into an operation of a Swagger 2.0
//! document. The same pipeline serves two flavors: `api` produces `swagger.json`, `postman`
//! produces a document meant for import into Postman, where the host is the `{{domain}}`
//! environment variable and the security headers stay visible as ordinary parameters. While
//! translating, the builder also collects the Postman environment variables.

use crate::docs::api_call::{ApiCall, ParamEntry, CONSUME_FORM_URLENCODED, CONSUME_JSON};
use crate::docs::param::{DataType, Param, ParamLocation};
use crate::docs::{title_case, HttpMethod};
use crate::error::{Error, Result};
use crate::model_definition::{
    ModelDefinitions, API_ERROR, API_ERROR_ACCESS_DENIED, API_ERROR_UNAUTHORIZED, SUCCESS_RESPONSE,
};
use crate::postman::PostmanEnvironment;
use crate::registry::DocRegistry;
use indexmap::IndexMap;
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

const API_KEY_HEADER: &str = "x-api-key";
const ACCESS_TOKEN_HEADER: &str = "x-access-token";
const API_KEY_SCHEME: &str = "apiKey";
const ACCESS_TOKEN_SCHEME: &str = "accessToken";

/// Host used by the Postman flavor, resolved from the environment at request time
pub const POSTMAN_HOST: &str = "{{domain}}";

/// Output target sharing the translation pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flavor {
    /// `swagger.json`
    Api,
    /// `postman_collection.json`
    Postman,
}

impl Flavor {
    /// File the flavor is written to
    pub fn file_name(&self) -> &'static str {
        match self {
            Flavor::Api => "swagger.json",
            Flavor::Postman => "postman_collection.json",
        }
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flavor::Api => f.write_str("api"),
            Flavor::Postman => f.write_str("postman"),
        }
    }
}

impl FromStr for Flavor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "api" => Ok(Flavor::Api),
            "postman" => Ok(Flavor::Postman),
            other => Err(Error::InvalidArgument(format!(
                "The given type {} is an invalid argument",
                other
            ))),
        }
    }
}

/// What to do when two calls document the same path and method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateRoutePolicy {
    /// Keep the last call and log a warning
    #[default]
    Overwrite,
    /// Fail emission
    Reject,
}

/// Document-level settings shared by both flavors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitterSettings {
    pub app_name: String,
    /// Resolved host name of the application
    pub host: String,
    /// Prefix stripped from routes, e.g. `/api/v1`
    pub base_path: String,
    pub duplicate_routes: DuplicateRoutePolicy,
}

/// Swagger Info object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Swagger security scheme object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityScheme {
    #[serde(rename = "type")]
    pub scheme_type: String,
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// `{"$ref": "#/definitions/..."}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaRef {
    #[serde(rename = "$ref")]
    pub reference: String,
}

impl SchemaRef {
    pub fn definition(name: &str) -> Self {
        Self {
            reference: format!("#/definitions/{}", name),
        }
    }
}

/// Swagger parameter object; body parameters carry a schema instead of a type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    pub required: bool,
    pub description: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaRef>,
}

/// Swagger response object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub schema: SchemaRef,
    pub description: String,
}

/// Swagger operation object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub tags: Vec<String>,
    pub summary: String,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    pub description: String,
    pub parameters: Vec<Parameter>,
    pub security: Vec<IndexMap<String, Vec<String>>>,
    pub responses: IndexMap<String, Response>,
}

/// Operations of one path, keyed by lower-case method
pub type PathItem = IndexMap<String, Operation>;

/// Complete Swagger 2.0 document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwaggerDocument {
    pub swagger: String,
    pub info: Info,
    pub host: String,
    pub schemes: Vec<String>,
    #[serde(rename = "basePath")]
    pub base_path: String,
    pub paths: IndexMap<String, PathItem>,
    #[serde(rename = "securityDefinitions")]
    pub security_definitions: IndexMap<String, SecurityScheme>,
    pub definitions: IndexMap<String, Value>,
}

/// Rewrites a dotted field name into its form-encoded array notation.
///
/// `clinics.staff.name` becomes `clinics[0][staff][0][name]`. Names without dots are unchanged.
pub fn wire_field_name(name: &str) -> String {
    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() <= 1 {
        return name.to_string();
    }

    let last = parts.len() - 1;
    let mut wire = String::with_capacity(name.len() + parts.len() * 5);
    for (i, part) in parts.iter().enumerate() {
        if i == 0 {
            wire.push_str(part);
            wire.push_str("[0]");
        } else if i == last {
            wire.push_str(&format!("[{}]", part));
        } else {
            wire.push_str(&format!("[{}][0]", part));
        }
    }
    wire
}

/// Swagger document builder
pub struct SwaggerBuilder<'a> {
    flavor: Flavor,
    settings: EmitterSettings,
    models: &'a dyn ModelDefinitions,
    paths: IndexMap<String, PathItem>,
    definitions: IndexMap<String, Value>,
    environment: PostmanEnvironment,
}

impl<'a> SwaggerBuilder<'a> {
    /// Create a builder seeded with the model layer's shared definitions
    pub fn new(
        flavor: Flavor,
        settings: EmitterSettings,
        models: &'a dyn ModelDefinitions,
    ) -> Self {
        debug!("Initializing SwaggerBuilder for flavor {}", flavor);
        let environment = PostmanEnvironment::new(&settings.app_name, &settings.host);
        Self {
            flavor,
            definitions: models.all_definitions(),
            settings,
            models,
            paths: IndexMap::new(),
            environment,
        }
    }

    /// Add a documented call to the document.
    ///
    /// `registry` resolves the definition blocks named in the call's `use` list.
    ///
    /// # Errors
    ///
    /// - [`Error::DefinitionCollision`] when the synthesized success response name is taken
    /// - [`Error::DuplicateRoute`] when the path and method exist and duplicates are rejected
    pub fn add_call(&mut self, call: &ApiCall, registry: &DocRegistry) -> Result<()> {
        if call.route().is_empty() {
            return Ok(());
        }
        let Some(method) = call.method().map(|m| m.as_lowercase()) else {
            warn!("Skipping {} because it has no HTTP method", call.route());
            return Ok(());
        };
        debug!("Adding call: {} {}", method, call.route());

        let (params, security) = self.split_security(self.collect_params(call, registry));
        let parameters = self.build_parameters(&params, call.method());

        let path = self.path_key(call.route());

        let mut consumes = call.consumes().to_vec();
        if consumes.is_empty() {
            consumes.push(CONSUME_FORM_URLENCODED.to_string());
        }

        let response_name = self.success_response_name(call)?;

        let operation = Operation {
            tags: vec![call.group().to_string()],
            summary: call.name().to_string(),
            consumes,
            produces: vec![CONSUME_JSON.to_string()],
            description: call.description().unwrap_or_default().to_string(),
            parameters,
            security,
            responses: Self::responses(&response_name),
        };

        let path_item = self.paths.entry(path.clone()).or_default();
        if path_item.contains_key(&method) {
            match self.settings.duplicate_routes {
                DuplicateRoutePolicy::Overwrite => {
                    warn!("{} {} is documented more than once, keeping the last one", method, path);
                }
                DuplicateRoutePolicy::Reject => {
                    return Err(Error::DuplicateRoute { path, method });
                }
            }
        }
        path_item.insert(method, operation);

        Ok(())
    }

    /// Headers first, then params, then the params and headers of every used definition
    fn collect_params<'c>(
        &self,
        call: &'c ApiCall,
        registry: &'c DocRegistry,
    ) -> Vec<&'c ParamEntry> {
        let mut all: Vec<&ParamEntry> = call.headers().iter().chain(call.params()).collect();

        for name in call.uses() {
            match registry.find_by_definition(name) {
                Some(used) => all.extend(used.params().iter().chain(used.headers())),
                None => warn!("{} uses `{}`, which is not defined", call.label(), name),
            }
        }
        all
    }

    /// Pulls the API key and access token headers out into security requirements
    fn split_security<'c>(
        &self,
        entries: Vec<&'c ParamEntry>,
    ) -> (Vec<&'c Param>, Vec<IndexMap<String, Vec<String>>>) {
        let mut params = Vec::new();
        let mut security = Vec::new();

        for entry in entries {
            let ParamEntry::Param(param) = entry else {
                debug!("Raw directive is not emitted: {:?}", entry);
                continue;
            };

            if param.get_location() == Some(ParamLocation::Header) {
                let scheme = match param.name().to_lowercase().as_str() {
                    API_KEY_HEADER => Some(API_KEY_SCHEME),
                    ACCESS_TOKEN_HEADER => Some(ACCESS_TOKEN_SCHEME),
                    _ => None,
                };
                if let Some(scheme) = scheme {
                    let mut requirement = IndexMap::new();
                    requirement.insert(scheme.to_string(), Vec::new());
                    security.push(requirement);
                    if self.flavor == Flavor::Api {
                        continue;
                    }
                }
            }

            params.push(param);
        }

        (params, security)
    }

    fn build_parameters(
        &mut self,
        params: &[&Param],
        method: Option<HttpMethod>,
    ) -> Vec<Parameter> {
        let mut parameters = Vec::new();

        for param in params {
            let data_type = param.get_data_type();

            // array containers are described by their own child fields
            if *data_type == DataType::Array {
                continue;
            }

            let name = wire_field_name(param.name());

            // already implied by `produces`
            if name == "Accept"
                && param.get_default_value().and_then(Value::as_str) == Some(CONSUME_JSON)
            {
                continue;
            }

            let location = param.get_location().unwrap_or(match method {
                Some(HttpMethod::Get) => ParamLocation::Query,
                _ => ParamLocation::FormData,
            });

            let parameter = match (data_type, param.get_model()) {
                (DataType::Model, Some(model)) => Parameter {
                    name: "body".to_string(),
                    location: ParamLocation::Body.as_str().to_string(),
                    required: param.is_required(),
                    description: param.get_description(),
                    param_type: None,
                    schema: Some(SchemaRef::definition(&self.models.model_short_name(model))),
                },
                _ => Parameter {
                    name: name.clone(),
                    location: location.as_str().to_string(),
                    required: param.is_required(),
                    description: param.get_description(),
                    param_type: Some(data_type.to_string().to_lowercase()),
                    schema: None,
                },
            };
            parameters.push(parameter);

            self.environment.add_variable(
                &name,
                param.get_default_value().cloned().unwrap_or(Value::Null),
                &param.get_description(),
                &data_type.to_string(),
            );
        }

        parameters
    }

    /// Strips the base path from a route, keeping a leading slash
    fn path_key(&self, route: &str) -> String {
        let base = self.settings.base_path.trim_matches('/');
        let route = route.trim_start_matches('/');

        let suffix = match route.strip_prefix(base) {
            Some(rest) if !base.is_empty() && (rest.is_empty() || rest.starts_with('/')) => rest,
            _ => route,
        };

        if suffix.starts_with('/') {
            suffix.to_string()
        } else {
            format!("/{}", suffix)
        }
    }

    /// Resolves the 200 response definition, synthesizing one for declared success objects
    fn success_response_name(&mut self, call: &ApiCall) -> Result<String> {
        let name = format!(
            "{}{}Response",
            title_case(call.group()),
            title_case(call.name())
        )
        .replace(['/', ' '], "");

        let synthesized = match (call.success_object(), call.success_paginated_object()) {
            (_, Some(model)) => self.models.success_response_paginated_definition(&name, model),
            (Some(model), None) => self.models.success_response_definition(&name, model),
            (None, None) => return Ok(SUCCESS_RESPONSE.to_string()),
        };

        if self.definitions.contains_key(&name) {
            let err = Error::DefinitionCollision(name);
            error!("{}", err);
            return Err(err);
        }

        self.definitions.extend(synthesized);
        Ok(name)
    }

    fn responses(success: &str) -> IndexMap<String, Response> {
        let mut responses = IndexMap::new();
        responses.insert(
            "200".to_string(),
            Response {
                schema: SchemaRef::definition(success),
                description: "Success response".to_string(),
            },
        );
        responses.insert(
            "401".to_string(),
            Response {
                schema: SchemaRef::definition(API_ERROR_UNAUTHORIZED),
                description: "Authentication failed".to_string(),
            },
        );
        responses.insert(
            "403".to_string(),
            Response {
                schema: SchemaRef::definition(API_ERROR_ACCESS_DENIED),
                description: "Access denied".to_string(),
            },
        );
        responses.insert(
            "422".to_string(),
            Response {
                schema: SchemaRef::definition(API_ERROR),
                description: "Generic API error. Check `message` for more information.".to_string(),
            },
        );
        responses
    }

    /// Build the final document and the Postman environment collected along the way
    pub fn build(self) -> (SwaggerDocument, PostmanEnvironment) {
        debug!("Building final Swagger document");

        let host = match self.flavor {
            Flavor::Api => self.settings.host.clone(),
            Flavor::Postman => POSTMAN_HOST.to_string(),
        };

        let mut security_definitions = IndexMap::new();
        security_definitions.insert(
            API_KEY_SCHEME.to_string(),
            SecurityScheme {
                scheme_type: "apiKey".to_string(),
                name: API_KEY_HEADER.to_string(),
                location: "header".to_string(),
                description: None,
            },
        );
        security_definitions.insert(
            ACCESS_TOKEN_SCHEME.to_string(),
            SecurityScheme {
                scheme_type: "apiKey".to_string(),
                name: ACCESS_TOKEN_HEADER.to_string(),
                location: "header".to_string(),
                description: Some("Unique user authentication token".to_string()),
            },
        );

        let document = SwaggerDocument {
            swagger: "2.0".to_string(),
            info: Info {
                title: format!("{} Backend API", self.settings.app_name),
                version: "1.0.0".to_string(),
                description: None,
            },
            host,
            schemes: vec!["https".to_string(), "http".to_string()],
            base_path: self.settings.base_path,
            paths: self.paths,
            security_definitions,
            definitions: self.definitions,
        };

        (document, self.environment)
    }
}

/// Translates every call of the registry into one document of the given flavor
pub fn emit(
    registry: &DocRegistry,
    models: &dyn ModelDefinitions,
    settings: EmitterSettings,
    flavor: Flavor,
) -> Result<(SwaggerDocument, PostmanEnvironment)> {
    let mut builder = SwaggerBuilder::new(flavor, settings, models);
    for call in registry.calls() {
        builder.add_call(call, registry)?;
    }
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model_definition::SchemaCatalog;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn settings() -> EmitterSettings {
        EmitterSettings {
            app_name: "Clinic".to_string(),
            host: "clinic.test".to_string(),
            base_path: "/api/v1".to_string(),
            duplicate_routes: DuplicateRoutePolicy::Overwrite,
        }
    }

    fn registry_with(calls: Vec<ApiCall>) -> DocRegistry {
        let mut registry = DocRegistry::with_default_headers();
        for call in calls {
            registry.register(call).unwrap();
        }
        registry
    }

    fn users_list() -> ApiCall {
        ApiCall::builder()
            .method(HttpMethod::Get)
            .route("api/v1/users")
            .group("Users")
            .name("List")
            .param(Param::new("page").data_type("integer").optional().default_value(1))
            .build()
    }

    #[test]
    fn test_wire_field_name() {
        assert_eq!(wire_field_name("a"), "a");
        assert_eq!(wire_field_name("a.b"), "a[0][b]");
        assert_eq!(wire_field_name("a.b.c"), "a[0][b][0][c]");
        assert_eq!(wire_field_name("a.b.c.d"), "a[0][b][0][c][0][d]");
        assert_eq!(
            wire_field_name("clinics.staff.dogs.name"),
            "clinics[0][staff][0][dogs][0][name]"
        );
    }

    #[test]
    fn test_flavor_parse() {
        assert_eq!("api".parse::<Flavor>().unwrap(), Flavor::Api);
        assert_eq!("postman".parse::<Flavor>().unwrap(), Flavor::Postman);
        assert!(matches!("yaml".parse::<Flavor>(), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_document_skeleton() {
        let registry = registry_with(vec![users_list()]);
        let catalog = SchemaCatalog::new();
        let (document, _) = emit(&registry, &catalog, settings(), Flavor::Api).unwrap();

        assert_eq!(document.swagger, "2.0");
        assert_eq!(document.info.title, "Clinic Backend API");
        assert_eq!(document.host, "clinic.test");
        assert_eq!(document.base_path, "/api/v1");
        assert_eq!(document.schemes, vec!["https", "http"]);
        assert_eq!(document.security_definitions.len(), 2);
        // the default headers block has no route and is not a path
        assert_eq!(document.paths.len(), 1);
        assert!(document.paths["/users"].contains_key("get"));
    }

    #[test]
    fn test_security_headers_hidden_in_api_flavor() {
        let registry = registry_with(vec![users_list()]);
        let catalog = SchemaCatalog::new();
        let (document, _) = emit(&registry, &catalog, settings(), Flavor::Api).unwrap();

        let operation = &document.paths["/users"]["get"];
        let names: Vec<&str> = operation.parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["page"]);

        let security = serde_json::to_value(&operation.security).unwrap();
        assert_eq!(security, json!([{"apiKey": []}, {"accessToken": []}]));
    }

    #[test]
    fn test_security_headers_visible_in_postman_flavor() {
        let registry = registry_with(vec![users_list()]);
        let catalog = SchemaCatalog::new();
        let (document, _) = emit(&registry, &catalog, settings(), Flavor::Postman).unwrap();

        assert_eq!(document.host, "{{domain}}");
        let operation = &document.paths["/users"]["get"];
        let headers: Vec<(&str, &str)> = operation
            .parameters
            .iter()
            .map(|p| (p.name.as_str(), p.location.as_str()))
            .collect();
        assert_eq!(
            headers,
            vec![("page", "query"), ("x-api-key", "header"), ("x-access-token", "header")]
        );
        assert_eq!(operation.security.len(), 2);
    }

    #[test]
    fn test_explicit_api_key_header() {
        let call = ApiCall::builder()
            .method(HttpMethod::Post)
            .route("api/v1/devices")
            .group("Devices")
            .name("Register")
            .no_default_headers()
            .headers(vec![Param::new("X-API-KEY")])
            .build();
        let registry = registry_with(vec![call]);
        let catalog = SchemaCatalog::new();

        let (api, _) = emit(&registry, &catalog, settings(), Flavor::Api).unwrap();
        let operation = &api.paths["/devices"]["post"];
        assert!(operation.parameters.is_empty());
        assert_eq!(operation.security.len(), 1);
        assert!(operation.security[0].contains_key("apiKey"));

        let (postman, _) = emit(&registry, &catalog, settings(), Flavor::Postman).unwrap();
        let operation = &postman.paths["/devices"]["post"];
        assert_eq!(operation.parameters.len(), 1);
        assert_eq!(operation.parameters[0].location, "header");
        assert_eq!(operation.security.len(), 1);
    }

    #[test]
    fn test_parameter_translation() {
        let call = ApiCall::builder()
            .method(HttpMethod::Post)
            .route("api/v1/clinics")
            .group("Clinics")
            .name("Create")
            .no_default_headers()
            .params(vec![
                Param::new("name"),
                Param::new("staff").data_type("array"),
                Param::new("staff.email").data_type("String").optional(),
                Param::new("opened_at").data_type("datetime"),
                Param::new("rating").data_type("float").location(ParamLocation::Query),
                Param::new("owner").data_type("model").model("App\\Models\\User"),
            ])
            .build();
        let registry = registry_with(vec![call]);
        let catalog = SchemaCatalog::new();
        let (document, _) = emit(&registry, &catalog, settings(), Flavor::Api).unwrap();

        let parameters =
            serde_json::to_value(&document.paths["/clinics"]["post"].parameters).unwrap();
        assert_eq!(
            parameters,
            json!([
                {"name": "name", "in": "formData", "required": true, "description": "Name", "type": "string"},
                {"name": "staff[0][email]", "in": "formData", "required": false, "description": "Staff.email", "type": "string"},
                {"name": "opened_at", "in": "formData", "required": true, "description": "Opened at", "type": "datetime"},
                {"name": "rating", "in": "query", "required": true, "description": "Rating", "type": "float"},
                {"name": "body", "in": "body", "required": true, "description": "Owner", "schema": {"$ref": "#/definitions/User"}},
            ])
        );
    }

    #[test]
    fn test_accept_header_with_json_default_is_skipped() {
        let registry = registry_with(vec![users_list()]);
        let catalog = SchemaCatalog::new();
        let (document, environment) =
            emit(&registry, &catalog, settings(), Flavor::Postman).unwrap();

        let operation = &document.paths["/users"]["get"];
        assert!(operation.parameters.iter().all(|p| p.name != "Accept"));
        assert!(!environment.contains("Accept"));
    }

    #[test]
    fn test_accept_header_with_other_default_is_kept() {
        let call = ApiCall::builder()
            .method(HttpMethod::Get)
            .route("api/v1/export")
            .no_default_headers()
            .headers(vec![Param::new("Accept").default_value("text/csv")])
            .build();
        let registry = registry_with(vec![call]);
        let catalog = SchemaCatalog::new();
        let (document, _) = emit(&registry, &catalog, settings(), Flavor::Api).unwrap();

        assert_eq!(document.paths["/export"]["get"].parameters[0].name, "Accept");
    }

    #[test]
    fn test_use_merges_definition_params() {
        let pagination = ApiCall::builder()
            .define("pagination", "Pagination fields")
            .params(vec![Param::new("per_page").data_type("integer").optional()])
            .build();
        let call = ApiCall::builder()
            .method(HttpMethod::Get)
            .route("api/v1/posts")
            .use_definition("pagination")
            .use_definition("missing_block")
            .no_default_headers()
            .build();
        let registry = registry_with(vec![pagination, call]);
        let catalog = SchemaCatalog::new();
        let (document, _) = emit(&registry, &catalog, settings(), Flavor::Api).unwrap();

        let operation = &document.paths["/posts"]["get"];
        assert_eq!(operation.parameters.len(), 1);
        assert_eq!(operation.parameters[0].name, "per_page");
        assert!(operation.security.is_empty());
    }

    #[test]
    fn test_consumes_default() {
        let registry = registry_with(vec![users_list()]);
        let catalog = SchemaCatalog::new();
        let (document, _) = emit(&registry, &catalog, settings(), Flavor::Api).unwrap();

        let operation = &document.paths["/users"]["get"];
        assert_eq!(operation.consumes, vec![CONSUME_FORM_URLENCODED]);
        assert_eq!(operation.produces, vec![CONSUME_JSON]);
    }

    #[test]
    fn test_generic_success_response() {
        let registry = registry_with(vec![users_list()]);
        let catalog = SchemaCatalog::new();
        let before = catalog.all_definitions().len();
        let (document, _) = emit(&registry, &catalog, settings(), Flavor::Api).unwrap();

        let responses = &document.paths["/users"]["get"].responses;
        assert_eq!(responses["200"].schema.reference, "#/definitions/SuccessResponse");
        assert_eq!(responses["401"].schema.reference, "#/definitions/ApiErrorUnauthorized");
        assert_eq!(responses["403"].schema.reference, "#/definitions/ApiErrorAccessDenied");
        assert_eq!(responses["422"].schema.reference, "#/definitions/ApiError");
        assert_eq!(document.definitions.len(), before);
    }

    #[test]
    fn test_synthesized_success_response() {
        let call = ApiCall::builder()
            .method(HttpMethod::Get)
            .route("api/v1/users/{id}")
            .group("user profile")
            .name("get by id")
            .success_object("App\\Models\\User")
            .build();
        let paginated = ApiCall::builder()
            .method(HttpMethod::Get)
            .route("api/v1/users")
            .group("Users")
            .name("Search/All")
            .success_paginated_object("App\\Models\\User")
            .build();
        let registry = registry_with(vec![call, paginated]);
        let catalog = SchemaCatalog::new();
        let (document, _) = emit(&registry, &catalog, settings(), Flavor::Api).unwrap();

        assert_eq!(
            document.paths["/users/{id}"]["get"].responses["200"].schema.reference,
            "#/definitions/UserProfileGetByIdResponse"
        );
        assert!(document.definitions.contains_key("UserProfileGetByIdResponse"));
        assert_eq!(
            document.definitions["UsersSearchAllResponse"]["properties"]["payload"]["type"],
            "array"
        );
    }

    #[test]
    fn test_definition_collision_fails() {
        let first = ApiCall::builder()
            .method(HttpMethod::Get)
            .route("api/v1/users")
            .group("Users")
            .name("Get")
            .success_object("User")
            .build();
        let second = ApiCall::builder()
            .method(HttpMethod::Post)
            .route("api/v1/users")
            .group("Users")
            .name("Get")
            .success_object("User")
            .build();
        let registry = registry_with(vec![first, second]);
        let catalog = SchemaCatalog::new();

        let err = emit(&registry, &catalog, settings(), Flavor::Api).unwrap_err();
        assert!(matches!(err, Error::DefinitionCollision(ref name) if name == "UsersGetResponse"));
    }

    #[test]
    fn test_duplicate_route_policies() {
        let registry = registry_with(vec![users_list(), users_list()]);
        let catalog = SchemaCatalog::new();

        let (document, _) = emit(&registry, &catalog, settings(), Flavor::Api).unwrap();
        assert_eq!(document.paths["/users"].len(), 1);

        let strict = EmitterSettings {
            duplicate_routes: DuplicateRoutePolicy::Reject,
            ..settings()
        };
        let err = emit(&registry, &catalog, strict, Flavor::Api).unwrap_err();
        assert!(matches!(err, Error::DuplicateRoute { .. }));
    }

    #[test]
    fn test_path_key() {
        let catalog = SchemaCatalog::new();
        let builder = SwaggerBuilder::new(Flavor::Api, settings(), &catalog);

        assert_eq!(builder.path_key("api/v1/users"), "/users");
        assert_eq!(builder.path_key("/api/v1/users/{id}"), "/users/{id}");
        assert_eq!(builder.path_key("api/v1"), "/");
        assert_eq!(builder.path_key("api/v10/users"), "/api/v10/users");
        assert_eq!(builder.path_key("api/v2/users"), "/api/v2/users");
    }

    #[test]
    fn test_environment_first_value_wins() {
        let first = ApiCall::builder()
            .method(HttpMethod::Get)
            .route("api/v1/users")
            .param(Param::new("page").default_value(1))
            .build();
        let second = ApiCall::builder()
            .method(HttpMethod::Get)
            .route("api/v1/posts")
            .param(Param::new("page").default_value(7))
            .build();
        let registry = registry_with(vec![first, second]);
        let catalog = SchemaCatalog::new();
        let (_, environment) = emit(&registry, &catalog, settings(), Flavor::Postman).unwrap();

        let pages: Vec<_> = environment.values.iter().filter(|v| v.key == "page").collect();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].value, json!(1));
        assert_eq!(environment.values[0].key, "domain");
        assert_eq!(environment.values[0].value, json!("clinic.test"));
    }

    #[test]
    fn test_emission_is_deterministic() {
        let registry = registry_with(vec![
            users_list(),
            ApiCall::builder()
                .method(HttpMethod::Post)
                .route("api/v1/users")
                .group("Users")
                .name("Create")
                .success_object("User")
                .params(vec![Param::new("email"), Param::new("profile.bio").optional()])
                .build(),
        ]);
        let catalog = SchemaCatalog::new();

        let render = |flavor| {
            let (document, _) = emit(&registry, &catalog, settings(), flavor).unwrap();
            serde_json::to_string_pretty(&document).unwrap()
        };

        assert_eq!(render(Flavor::Api), render(Flavor::Api));
        assert_eq!(render(Flavor::Postman), render(Flavor::Postman));
    }
}
