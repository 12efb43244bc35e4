//! API documentation generator.
//!
//! Route handlers describe themselves as [`docs::api_call::ApiCall`]s. Walking an application's
//! routes in documentation mode collects those descriptions into a [`registry::DocRegistry`],
//! from which three kinds of output are produced:
//!
//! - apidoc comment blocks grouped into `.coffee` source files
//! - a Swagger 2.0 document
//! - a Postman collection plus a Postman environment
//!
//! # Architecture
//!
//! 1. [`docs`] - the `Param`/`ApiCall` metadata model and apidoc rendering
//! 2. [`walker`] - the [`walker::Application`] seam and the route walker
//! 3. [`registry`] - ordered call storage and the documentation-mode context
//! 4. [`model_definition`] - model schemas and synthesized success envelopes
//! 5. [`swagger_builder`] - Swagger translation for the `api` and `postman` flavors
//! 6. [`postman`] - the Postman environment file
//! 7. [`doc_writer`] and [`serializer`] - file output
//! 8. [`manifest`] and [`generator`] - manifest-driven applications and the end-to-end run
//!
//! # Example Usage
//!
//! ```
//! use api_docs_generator::docs::api_call::ApiCall;
//! use api_docs_generator::docs::param::Param;
//! use api_docs_generator::docs::HttpMethod;
//! use api_docs_generator::model_definition::SchemaCatalog;
//! use api_docs_generator::registry::DocRegistry;
//! use api_docs_generator::swagger_builder::{emit, DuplicateRoutePolicy, EmitterSettings, Flavor};
//!
//! let mut registry = DocRegistry::with_default_headers();
//! registry
//!     .register(
//!         ApiCall::builder()
//!             .method(HttpMethod::Get)
//!             .route("api/v1/users")
//!             .group("Users")
//!             .name("List users")
//!             .param(Param::new("page").optional())
//!             .build(),
//!     )
//!     .unwrap();
//!
//! let settings = EmitterSettings {
//!     app_name: "Clinic".to_string(),
//!     host: "clinic.test".to_string(),
//!     base_path: "/api/v1".to_string(),
//!     duplicate_routes: DuplicateRoutePolicy::Overwrite,
//! };
//! let (document, _environment) =
//!     emit(&registry, &SchemaCatalog::new(), settings, Flavor::Api).unwrap();
//!
//! assert!(document.paths["/users"].contains_key("get"));
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides a complete CLI application.

pub mod cli;
pub mod doc_writer;
pub mod docs;
pub mod error;
pub mod generator;
pub mod manifest;
pub mod model_definition;
pub mod postman;
pub mod registry;
pub mod serializer;
pub mod swagger_builder;
pub mod walker;
