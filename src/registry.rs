//! In-memory registry of documented calls.
//!
//! The registry is filled during the route walk and read by the emitters. Calls are kept in
//! registration order; definition blocks are additionally indexed by their `define` title so
//! other calls can pull them in through `use`.

use crate::docs::api_call::{ApiCall, ApiCallBuilder};
use crate::docs::param::Param;
use crate::error::{Error, Result};
use crate::walker::RouteInfo;
use log::debug;
use std::collections::HashMap;

/// Name of the definition block holding the global default headers
pub const DEFAULT_HEADERS: &str = "default_headers";

/// Ordered collection of every documented [`ApiCall`].
#[derive(Debug, Default)]
pub struct DocRegistry {
    calls: Vec<ApiCall>,
    definitions: HashMap<String, usize>,
}

impl DocRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry seeded with the `default_headers` definition block
    pub fn with_default_headers() -> Self {
        let mut registry = Self::new();
        let call = ApiCall::builder()
            .define(DEFAULT_HEADERS, "")
            .headers(vec![
                Param::new("Accept")
                    .description("Set to `application/json`")
                    .default_value("application/json"),
                Param::new("x-api-key").description("API Key"),
                Param::new("x-access-token").description("Unique user authentication token"),
            ])
            .build();

        registry.calls.push(call);
        registry.definitions.insert(DEFAULT_HEADERS.to_string(), 0);
        registry
    }

    /// Registers a call.
    ///
    /// Calls that keep their default headers and are not definition blocks themselves get an
    /// `@apiUse default_headers` reference when the registry was seeded with that block.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateDefinition`] when a block with the same `define` title exists.
    pub fn register(&mut self, mut call: ApiCall) -> Result<()> {
        match call.definition_name() {
            Some(title) => {
                if self.definitions.contains_key(title) {
                    return Err(Error::DuplicateDefinition(title.to_string()));
                }
                self.definitions.insert(title.to_string(), self.calls.len());
            }
            None => {
                if call.adds_default_headers() && self.definitions.contains_key(DEFAULT_HEADERS) {
                    call.push_use(DEFAULT_HEADERS);
                }
            }
        }

        debug!("Registered documentation for {}", call.label());
        self.calls.push(call);
        Ok(())
    }

    /// Looks up a definition block by its `define` title
    pub fn find_by_definition(&self, name: &str) -> Option<&ApiCall> {
        self.definitions.get(name).map(|&index| &self.calls[index])
    }

    /// Every registered call, in registration order
    pub fn calls(&self) -> &[ApiCall] {
        &self.calls
    }

    /// Number of calls documenting an endpoint, excluding pure definition blocks
    pub fn documented_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| call.definition_name().is_none())
            .count()
    }
}

/// Execution context handed to route handlers while documentation mode is on.
///
/// A handler describes itself through [`DocContext::document`] and returns without doing any
/// real work. The walker then collects the described call.
#[derive(Debug)]
pub struct DocContext {
    route: RouteInfo,
    documented: Option<ApiCall>,
}

impl DocContext {
    /// Creates a context intercepting the given route
    pub fn new(route: RouteInfo) -> Self {
        Self {
            route,
            documented: None,
        }
    }

    /// The route currently being intercepted
    pub fn route(&self) -> &RouteInfo {
        &self.route
    }

    /// Documents the intercepted route.
    ///
    /// Method and route left unset on the builder are taken from the intercepted route. A second
    /// call replaces the first.
    pub fn document(&mut self, mut builder: ApiCallBuilder) {
        if !builder.has_method() {
            builder = builder.method(self.route.method);
        }
        if !builder.has_route() {
            builder = builder.route(self.route.uri.clone());
        }
        self.documented = Some(builder.build());
    }

    /// Hands over the documented call, if the handler produced one
    pub fn into_documented(self) -> Option<ApiCall> {
        self.documented
    }
}
