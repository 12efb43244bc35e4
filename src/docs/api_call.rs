use super::param::{Param, ParamLocation};
use super::status::status_text_by_code;
use super::{title_case, HttpMethod};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const CONSUME_JSON: &str = "application/json";
pub const CONSUME_MULTIPART_FORM: &str = "multipart/form-data";
pub const CONSUME_FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Line separator of rendered apidoc blocks
pub const DOC_LINE_BREAK: &str = "\r\n";

const DEFAULT_VERSION: &str = "1.0.0";

/// A documented field, or a raw apidoc directive written by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamEntry {
    /// Raw text placed after the directive tag, e.g. `{String} email Login email`
    Raw(String),
    Param(Param),
}

impl ParamEntry {
    pub fn as_param(&self) -> Option<&Param> {
        match self {
            ParamEntry::Param(param) => Some(param),
            ParamEntry::Raw(_) => None,
        }
    }
}

impl From<Param> for ParamEntry {
    fn from(param: Param) -> Self {
        ParamEntry::Param(param)
    }
}

/// Title and description of a reusable documentation block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Define {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// A response example with its resolved status label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    pub text: String,
    pub status_code: u16,
    pub message: String,
}

/// Example as written by an author; status and label fall back to defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExampleSpec {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ExampleSpec {
    fn resolve(&self, default_status: u16) -> Example {
        let status_code = self.status_code.unwrap_or(default_status);
        Example {
            text: self.text.clone(),
            status_code,
            message: status_text_by_code(status_code, self.message.as_deref()),
        }
    }
}

/// One documented endpoint, or a definition block other calls can `use`.
///
/// Values are assembled with [`ApiCallBuilder`] and are read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiCall {
    version: String,
    method: Option<HttpMethod>,
    name: String,
    route: String,
    group: String,
    params: Vec<ParamEntry>,
    description: Option<String>,
    success_params: Vec<ParamEntry>,
    request_example: Option<Value>,
    headers: Vec<ParamEntry>,
    define: Option<Define>,
    uses: Vec<String>,
    add_default_headers: bool,
    success_examples: Vec<Example>,
    error_examples: Vec<Example>,
    success_object: Option<String>,
    success_paginated_object: Option<String>,
    consumes: Vec<String>,
}

impl ApiCall {
    pub fn builder() -> ApiCallBuilder {
        ApiCallBuilder::default()
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn method(&self) -> Option<HttpMethod> {
        self.method
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn params(&self) -> &[ParamEntry] {
        &self.params
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn success_params(&self) -> &[ParamEntry] {
        &self.success_params
    }

    pub fn request_example(&self) -> Option<&Value> {
        self.request_example.as_ref()
    }

    /// Header entries; every [`Param`] among them is located in the header
    pub fn headers(&self) -> &[ParamEntry] {
        &self.headers
    }

    pub fn define(&self) -> Option<&Define> {
        self.define.as_ref()
    }

    /// Name this call is registered under when it is a definition block
    pub fn definition_name(&self) -> Option<&str> {
        self.define.as_ref().map(|d| d.title.as_str())
    }

    pub fn uses(&self) -> &[String] {
        &self.uses
    }

    pub fn adds_default_headers(&self) -> bool {
        self.add_default_headers
    }

    pub fn success_examples(&self) -> &[Example] {
        &self.success_examples
    }

    pub fn error_examples(&self) -> &[Example] {
        &self.error_examples
    }

    pub fn success_object(&self) -> Option<&str> {
        self.success_object.as_deref()
    }

    pub fn success_paginated_object(&self) -> Option<&str> {
        self.success_paginated_object.as_deref()
    }

    pub fn consumes(&self) -> &[String] {
        &self.consumes
    }

    pub(crate) fn push_use(&mut self, definition_name: &str) {
        if !self.uses.iter().any(|u| u == definition_name) {
            self.uses.push(definition_name.to_string());
        }
    }

    /// Short label used in log lines and error messages
    pub fn label(&self) -> String {
        if let Some(title) = self.definition_name() {
            return title.to_string();
        }
        match self.method {
            Some(method) => format!("{} {}", method, self.route),
            None => self.route.clone(),
        }
    }

    /// Returns the composed apidoc block.
    ///
    /// # Errors
    ///
    /// Fails when any parameter, success field or header has an empty field name.
    pub fn api_doc(&self) -> Result<String> {
        let mut lines = vec!["###".to_string()];

        if let Some(define) = &self.define {
            lines.push(format!("@apiDefine {} {}", define.title, define.description));
        }

        if let Some(description) = self.description.as_deref().filter(|d| !d.is_empty()) {
            lines.push(format!("@apiDescription {}", description));
        }

        let method = self.method.map(|m| m.as_str()).unwrap_or_default();
        lines.push(format!("@apiVersion {}", self.version));
        lines.push(format!("@api {{{}}} {} {}", method, self.route, self.name));
        lines.push(format!("@apiGroup {}", title_case(&self.group)));

        self.render_entries("@apiParam", &self.params, &mut lines)?;
        self.render_entries("@apiSuccess", &self.success_params, &mut lines)?;
        self.render_entries("@apiHeader", &self.headers, &mut lines)?;

        for definition in &self.uses {
            lines.push(format!("@apiUse {}", definition));
        }

        if let Some(example) = self.request_example.as_ref().filter(|v| !is_empty_value(v)) {
            lines.push("@apiParamExample {json} Request Example ".to_string());
            lines.push(serde_json::to_string(example)?);
        }

        for example in &self.success_examples {
            lines.push(format!(
                "@apiSuccessExample {{json}} Success-Response / HTTP {} {}",
                example.status_code, example.message
            ));
            lines.push(example.text.clone());
        }

        for example in &self.error_examples {
            lines.push(format!(
                "@apiErrorExample {{json}} Error-Response / HTTP {} {}",
                example.status_code, example.message
            ));
            lines.push(example.text.clone());
        }

        lines.push("###".to_string());

        Ok(lines.join(DOC_LINE_BREAK))
    }

    fn render_entries(
        &self,
        tag: &str,
        entries: &[ParamEntry],
        lines: &mut Vec<String>,
    ) -> Result<()> {
        for entry in entries {
            match entry {
                ParamEntry::Param(param) => {
                    if param.name().is_empty() {
                        return Err(Error::MissingFieldName { call: self.label() });
                    }
                    let field_name = if param.is_required() {
                        param.name().to_string()
                    } else {
                        format!("[{}]", param.name())
                    };
                    lines.push(format!(
                        "{} {{{}}} {} {}",
                        tag,
                        param.get_data_type(),
                        field_name,
                        param.get_description()
                    ));
                }
                ParamEntry::Raw(raw) => {
                    if raw.trim().is_empty() {
                        return Err(Error::MissingFieldName { call: self.label() });
                    }
                    lines.push(format!("{} {}", tag, raw));
                }
            }
        }
        Ok(())
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Staged construction of an [`ApiCall`].
///
/// Route manifests deserialize straight into a builder, so every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiCallBuilder {
    version: String,
    method: Option<HttpMethod>,
    name: String,
    route: String,
    group: String,
    params: Vec<ParamEntry>,
    description: Option<String>,
    success_params: Vec<ParamEntry>,
    request_example: Option<Value>,
    headers: Vec<ParamEntry>,
    define: Option<Define>,
    #[serde(rename = "use")]
    uses: Vec<String>,
    add_default_headers: bool,
    success_examples: Vec<ExampleSpec>,
    error_examples: Vec<ExampleSpec>,
    success_object: Option<String>,
    success_paginated_object: Option<String>,
    consumes: Vec<String>,
}

impl Default for ApiCallBuilder {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            method: None,
            name: String::new(),
            route: String::new(),
            group: String::new(),
            params: Vec::new(),
            description: None,
            success_params: Vec::new(),
            request_example: None,
            headers: Vec::new(),
            define: None,
            uses: Vec::new(),
            add_default_headers: true,
            success_examples: Vec::new(),
            error_examples: Vec::new(),
            success_object: None,
            success_paginated_object: None,
            consumes: Vec::new(),
        }
    }
}

impl ApiCallBuilder {
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn route(mut self, route: impl Into<String>) -> Self {
        self.route = route.into();
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replaces the parameter list
    pub fn params<I, P>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<ParamEntry>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn param(mut self, param: impl Into<ParamEntry>) -> Self {
        self.params.push(param.into());
        self
    }

    /// Appends a hand-written `@apiParam` directive
    pub fn raw_param(mut self, directive: impl Into<String>) -> Self {
        self.params.push(ParamEntry::Raw(directive.into()));
        self
    }

    pub fn success_params<I, P>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<ParamEntry>,
    {
        self.success_params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn request_example(mut self, example: Value) -> Self {
        self.request_example = Some(example);
        self
    }

    /// Replaces the header list, moving every param into the header location
    pub fn headers<I>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = Param>,
    {
        self.headers = headers
            .into_iter()
            .map(|header| ParamEntry::Param(header.location(ParamLocation::Header)))
            .collect();
        self
    }

    pub fn define(mut self, title: impl Into<String>, description: impl Into<String>) -> Self {
        self.define = Some(Define {
            title: title.into(),
            description: description.into(),
        });
        self
    }

    /// Merges the named definition block into this call
    pub fn use_definition(mut self, definition_name: impl Into<String>) -> Self {
        self.uses.push(definition_name.into());
        self
    }

    pub fn no_default_headers(mut self) -> Self {
        self.add_default_headers = false;
        self
    }

    /// Adds a success example; `status_code` is usually 200
    pub fn success_example(
        mut self,
        text: impl Into<String>,
        status_code: u16,
        message: Option<&str>,
    ) -> Self {
        self.success_examples.push(ExampleSpec {
            text: text.into(),
            status_code: Some(status_code),
            message: message.map(str::to_string),
        });
        self
    }

    /// Adds an error example; `status_code` is usually 404
    pub fn error_example(
        mut self,
        text: impl Into<String>,
        status_code: u16,
        message: Option<&str>,
    ) -> Self {
        self.error_examples.push(ExampleSpec {
            text: text.into(),
            status_code: Some(status_code),
            message: message.map(str::to_string),
        });
        self
    }

    pub fn consumes<I, S>(mut self, consumes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.consumes = consumes.into_iter().map(Into::into).collect();
        self
    }

    pub fn success_object(mut self, model: impl Into<String>) -> Self {
        self.success_object = Some(model.into());
        self
    }

    pub fn success_paginated_object(mut self, model: impl Into<String>) -> Self {
        self.success_paginated_object = Some(model.into());
        self
    }

    pub(crate) fn has_method(&self) -> bool {
        self.method.is_some()
    }

    pub(crate) fn has_route(&self) -> bool {
        !self.route.is_empty()
    }

    /// Finalizes the call
    pub fn build(self) -> ApiCall {
        let headers = self
            .headers
            .into_iter()
            .map(|entry| match entry {
                ParamEntry::Param(mut header) => {
                    header.force_location(ParamLocation::Header);
                    ParamEntry::Param(header)
                }
                raw => raw,
            })
            .collect();

        ApiCall {
            version: self.version,
            method: self.method,
            name: self.name,
            route: self.route,
            group: self.group,
            params: self.params,
            description: self.description,
            success_params: self.success_params,
            request_example: self.request_example,
            headers,
            define: self.define,
            uses: self.uses,
            add_default_headers: self.add_default_headers,
            success_examples: self.success_examples.iter().map(|e| e.resolve(200)).collect(),
            error_examples: self.error_examples.iter().map(|e| e.resolve(404)).collect(),
            success_object: self.success_object,
            success_paginated_object: self.success_paginated_object,
            consumes: self.consumes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_call() -> ApiCall {
        ApiCall::builder()
            .method(HttpMethod::Post)
            .route("api/v1/users")
            .group("user profile")
            .name("Create user")
            .description("Registers a new account")
            .params(vec![
                Param::new("email"),
                Param::new("nickname").optional(),
            ])
            .success_params(vec![Param::new("id").data_type("integer")])
            .headers(vec![Param::new("x-device-id").description("Device ID")])
            .use_definition("default_headers")
            .request_example(json!({"email": "a@b.c"}))
            .success_example(r#"{"result": true}"#, 200, None)
            .error_example(r#"{"result": false}"#, 422, None)
            .build()
    }

    #[test]
    fn test_api_doc_line_order() {
        let doc = sample_call().api_doc().unwrap();
        let lines: Vec<&str> = doc.split(DOC_LINE_BREAK).collect();

        assert_eq!(
            lines,
            vec![
                "###",
                "@apiDescription Registers a new account",
                "@apiVersion 1.0.0",
                "@api {POST} api/v1/users Create user",
                "@apiGroup User Profile",
                "@apiParam {String} email Email",
                "@apiParam {String} [nickname] Nickname",
                "@apiSuccess {Integer} id Id",
                "@apiHeader {String} x-device-id Device ID",
                "@apiUse default_headers",
                "@apiParamExample {json} Request Example ",
                r#"{"email":"a@b.c"}"#,
                "@apiSuccessExample {json} Success-Response / HTTP 200 OK",
                r#"{"result": true}"#,
                "@apiErrorExample {json} Error-Response / HTTP 422 Unprocessable Entity",
                r#"{"result": false}"#,
                "###",
            ]
        );
    }

    #[test]
    fn test_define_block() {
        let doc = ApiCall::builder()
            .define("default_headers", "")
            .headers(vec![Param::new("Accept").default_value("application/json")])
            .build()
            .api_doc()
            .unwrap();

        assert!(doc.starts_with("###\r\n@apiDefine default_headers \r\n@apiVersion 1.0.0"));
        assert!(doc.contains("@api {}  \r\n"));
    }

    #[test]
    fn test_headers_are_forced_into_header_location() {
        let call = ApiCall::builder()
            .headers(vec![Param::new("x-api-key").location(ParamLocation::Query)])
            .build();

        let header = call.headers()[0].as_param().unwrap();
        assert_eq!(header.get_location(), Some(ParamLocation::Header));
    }

    #[test]
    fn test_empty_field_name_fails_rendering() {
        let call = ApiCall::builder()
            .route("api/v1/users")
            .param(Param::new(""))
            .build();

        let err = call.api_doc().unwrap_err();
        assert!(matches!(err, Error::MissingFieldName { .. }));
    }

    #[test]
    fn test_empty_header_name_fails_rendering() {
        let call = ApiCall::builder().headers(vec![Param::new("")]).build();
        assert!(call.api_doc().is_err());
    }

    #[test]
    fn test_raw_directive_rendering() {
        let doc = ApiCall::builder()
            .raw_param("{String} token Reset token")
            .build()
            .api_doc()
            .unwrap();
        assert!(doc.contains("@apiParam {String} token Reset token"));
    }

    #[test]
    fn test_example_status_defaults() {
        let call: ApiCall = serde_yaml::from_str::<ApiCallBuilder>(
            r#"
successExamples:
  - text: "{}"
errorExamples:
  - text: "{}"
  - text: "{}"
    statusCode: 599
  - text: "{}"
    statusCode: 599
    message: Gateway melted
"#,
        )
        .unwrap()
        .build();

        assert_eq!(call.success_examples()[0].status_code, 200);
        assert_eq!(call.success_examples()[0].message, "OK");
        assert_eq!(call.error_examples()[0].status_code, 404);
        assert_eq!(call.error_examples()[0].message, "Not Found");
        assert_eq!(call.error_examples()[1].message, "Unknown");
        assert_eq!(call.error_examples()[2].message, "Gateway melted");
    }

    #[test]
    fn test_builder_deserializes_manifest_entry() {
        let yaml = r#"
group: Users
name: Update
use: [default_headers]
consumes: [multipart/form-data]
successObject: App\Models\User
params:
  - field: avatar
    type: file
  - "{String} [bio] Short biography"
headers:
  - field: x-device-id
"#;
        let call = serde_yaml::from_str::<ApiCallBuilder>(yaml).unwrap().build();

        assert_eq!(call.version(), "1.0.0");
        assert!(call.adds_default_headers());
        assert_eq!(call.uses(), ["default_headers".to_string()]);
        assert_eq!(call.consumes(), [CONSUME_MULTIPART_FORM.to_string()]);
        assert_eq!(call.success_object(), Some("App\\Models\\User"));
        assert!(matches!(call.params()[1], ParamEntry::Raw(_)));
        assert_eq!(
            call.headers()[0].as_param().unwrap().get_location(),
            Some(ParamLocation::Header)
        );
    }

    #[test]
    fn test_empty_request_example_is_not_rendered() {
        let doc = ApiCall::builder()
            .request_example(json!({}))
            .build()
            .api_doc()
            .unwrap();
        assert!(!doc.contains("@apiParamExample"));
    }
}
