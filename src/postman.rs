//! Postman environment document.
//!
//! The environment seeds Postman with a `domain` variable and one variable per unique parameter
//! name found across all documented calls.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Postman environment file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostmanEnvironment {
    pub name: String,
    #[serde(rename = "_postman_variable_scope")]
    pub variable_scope: String,
    pub values: Vec<EnvironmentVariable>,
}

/// A single environment variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentVariable {
    pub key: String,
    pub value: Value,
    pub description: String,
    #[serde(rename = "type")]
    pub variable_type: String,
    pub enabled: bool,
}

impl PostmanEnvironment {
    /// Creates an environment named after the application, seeded with the `domain` variable
    pub fn new(app_name: &str, domain: &str) -> Self {
        let mut environment = Self {
            name: format!("{} Environment", app_name),
            variable_scope: "environment".to_string(),
            values: Vec::new(),
        };
        environment.add_variable("domain", Value::from(domain), "Domain host", "string");
        environment
    }

    /// Adds a variable unless one with the same key exists; the first occurrence wins.
    ///
    /// Returns whether the variable was added.
    pub fn add_variable(
        &mut self,
        key: &str,
        value: Value,
        description: &str,
        variable_type: &str,
    ) -> bool {
        if self.contains(key) {
            return false;
        }
        self.values.push(EnvironmentVariable {
            key: key.to_string(),
            value,
            description: description.to_string(),
            variable_type: variable_type.to_string(),
            enabled: true,
        });
        true
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.iter().any(|v| v.key == key)
    }
}
