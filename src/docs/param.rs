use super::{humanize, upper_first};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Where a parameter travels in the HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamLocation {
    /// HTTP header
    #[serde(rename = "header")]
    Header,
    /// Form encoded body field
    #[serde(rename = "formData")]
    FormData,
    /// Cookie value
    #[serde(rename = "cookie")]
    Cookie,
    /// Segment of the URL path
    #[serde(rename = "path")]
    Path,
    /// Query string parameter
    #[serde(rename = "query")]
    Query,
    /// Whole request body
    #[serde(rename = "body")]
    Body,
}

impl ParamLocation {
    /// The `in` value of a Swagger parameter object
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamLocation::Header => "header",
            ParamLocation::FormData => "formData",
            ParamLocation::Cookie => "cookie",
            ParamLocation::Path => "path",
            ParamLocation::Query => "query",
            ParamLocation::Body => "body",
        }
    }
}

/// Declared type of a documented field.
///
/// Parsing is case-insensitive; the display form is always capitalized. Names outside the known
/// set are kept as written so they still render and map to `string` for Swagger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DataType {
    String,
    Integer,
    Float,
    Boolean,
    Array,
    Object,
    Model,
    DateTime,
    File,
    Date,
    Text,
    Other(String),
}

impl DataType {
    /// Swagger primitive this type is published as
    pub fn swagger_type(&self) -> &'static str {
        Param::swagger_data_type(&self.to_string())
    }
}

impl From<&str> for DataType {
    fn from(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "string" => DataType::String,
            "integer" => DataType::Integer,
            "float" => DataType::Float,
            "boolean" => DataType::Boolean,
            "array" => DataType::Array,
            "object" => DataType::Object,
            "model" => DataType::Model,
            "datetime" => DataType::DateTime,
            "file" => DataType::File,
            "date" => DataType::Date,
            "text" => DataType::Text,
            _ => DataType::Other(value.to_string()),
        }
    }
}

impl From<String> for DataType {
    fn from(value: String) -> Self {
        DataType::from(value.as_str())
    }
}

impl From<DataType> for String {
    fn from(value: DataType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::String => "String",
            DataType::Integer => "Integer",
            DataType::Float => "Float",
            DataType::Boolean => "Boolean",
            DataType::Array => "Array",
            DataType::Object => "Object",
            DataType::Model => "Model",
            DataType::DateTime => "DateTime",
            DataType::File => "File",
            DataType::Date => "Date",
            DataType::Text => "Text",
            DataType::Other(raw) => return f.write_str(&upper_first(raw)),
        };
        f.write_str(name)
    }
}

impl Default for DataType {
    fn default() -> Self {
        DataType::String
    }
}

/// One documented request or response field.
///
/// A dotted name such as `clinics.staff.name` describes a field nested inside arrays of objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    #[serde(rename = "field", alias = "name", default)]
    name: String,
    #[serde(rename = "type", default)]
    data_type: DataType,
    #[serde(default = "default_required")]
    required: bool,
    #[serde(rename = "default", default, skip_serializing_if = "Option::is_none")]
    default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    location: Option<ParamLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model: Option<String>,
}

fn default_required() -> bool {
    true
}

impl Param {
    /// Creates a required `String` field
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: DataType::String,
            required: true,
            default_value: None,
            description: None,
            location: None,
            model: None,
        }
    }

    pub fn data_type(mut self, data_type: impl Into<DataType>) -> Self {
        self.data_type = data_type.into();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn location(mut self, location: ParamLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Attaches a model reference, used when the type is `Model`
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get_data_type(&self) -> &DataType {
        &self.data_type
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn get_default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    /// Explicit description, or the humanized field name when none was given
    pub fn get_description(&self) -> String {
        match &self.description {
            Some(description) => description.clone(),
            None => humanize(&self.name),
        }
    }

    /// Stored location; `None` means the caller infers it from the HTTP method
    pub fn get_location(&self) -> Option<ParamLocation> {
        self.location
    }

    pub fn get_model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub(crate) fn force_location(&mut self, location: ParamLocation) {
        self.location = Some(location);
    }

    /// Maps a declared type name onto a Swagger primitive. Total and case-insensitive.
    pub fn swagger_data_type(data_type: &str) -> &'static str {
        match data_type.to_lowercase().as_str() {
            "integer" => "integer",
            "float" | "double" => "number",
            "boolean" => "boolean",
            "array" => "array",
            "object" | "model" => "object",
            _ => "string",
        }
    }
}
