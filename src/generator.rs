//! Documentation generation run.
//!
//! A run has two phases, each fatal on its first error:
//!
//! 1. walk every API route of the application and collect the documented calls
//! 2. write the apidoc sources, the Swagger document, the Postman collection and its environment

use crate::doc_writer::create_doc_source_files;
use crate::error::Error;
use crate::model_definition::ModelDefinitions;
use crate::registry::DocRegistry;
use crate::serializer::{serialize_json, write_to_file};
use crate::swagger_builder::{emit, DuplicateRoutePolicy, EmitterSettings, Flavor};
use crate::walker::{Application, RouteWalker};
use anyhow::{Context, Result};
use log::{error, info};
use std::path::PathBuf;
use url::Url;

const PRODUCTION: &str = "production";
const POSTMAN_ENVIRONMENT_FILE: &str = "postman_environment.json";

/// Settings of a generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub app_name: String,
    pub app_url: String,
    /// Application environment; generation is refused in `production`
    pub environment: String,
    /// Identity whose access token is sent with every request
    pub user_id: String,
    /// Comma separated API keys, the first one is used
    pub api_key: Option<String>,
    pub base_path: String,
    pub route_prefix: String,
    /// Directory receiving the JSON artifacts
    pub public_dir: PathBuf,
    /// Directory receiving the apidoc sources
    pub source_dir: PathBuf,
    pub duplicate_routes: DuplicateRoutePolicy,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            app_name: "App".to_string(),
            app_url: "http://localhost".to_string(),
            environment: "local".to_string(),
            user_id: "3".to_string(),
            api_key: None,
            base_path: "/api/v1".to_string(),
            route_prefix: "api".to_string(),
            public_dir: PathBuf::from("public/docs"),
            source_dir: PathBuf::from("resources/docs/auto_generated"),
            duplicate_routes: DuplicateRoutePolicy::Overwrite,
        }
    }
}

impl GeneratorConfig {
    /// First non-empty entry of the comma separated key list
    pub fn primary_api_key(&self) -> Option<String> {
        self.api_key
            .as_deref()?
            .split(',')
            .map(str::trim)
            .find(|key| !key.is_empty())
            .map(str::to_string)
    }

    /// Host name of the application URL
    pub fn host(&self) -> crate::error::Result<String> {
        let url = Url::parse(&self.app_url).map_err(|e| {
            Error::InvalidArgument(format!("Invalid application URL {}: {}", self.app_url, e))
        })?;
        url.host_str().map(str::to_string).ok_or_else(|| {
            Error::InvalidArgument(format!("Application URL {} has no host", self.app_url))
        })
    }

    fn emitter_settings(&self, host: &str) -> EmitterSettings {
        EmitterSettings {
            app_name: self.app_name.clone(),
            host: host.to_string(),
            base_path: self.base_path.clone(),
            duplicate_routes: self.duplicate_routes,
        }
    }
}

/// Files written by a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    /// Number of documented endpoint calls
    pub documented: usize,
    pub doc_files: Vec<PathBuf>,
    pub swagger: PathBuf,
    pub postman_collection: PathBuf,
    pub postman_environment: PathBuf,
}

/// Runs both generation phases against an application
#[derive(Debug, Clone)]
pub struct DocsGenerator {
    config: GeneratorConfig,
}

impl DocsGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Walks the application and loads its documented calls into a fresh registry
    pub fn collect<A: Application + ?Sized>(&self, app: &A) -> Result<DocRegistry> {
        if self.config.environment == PRODUCTION {
            return Err(Error::ProductionEnvironment.into());
        }

        let user = app
            .find_user(&self.config.user_id)
            .ok_or_else(|| Error::UserNotFound(self.config.user_id.clone()))?;

        if app.routes().is_empty() {
            return Err(Error::NoRoutes.into());
        }

        let api_key = self.config.primary_api_key();
        if api_key.is_none() {
            error!("AN API_KEY not found. Requests will be sent without the x-api-key header.");
        }

        let access_token = app.access_token_for(&user);
        if access_token.is_none() {
            error!(
                "An access token not found for user ID {}. Requests will be sent without the x-access-token header.",
                user.id
            );
        }

        let mut registry = DocRegistry::with_default_headers();
        RouteWalker::new(app, self.config.app_url.as_str())
            .with_route_prefix(self.config.route_prefix.as_str())
            .with_api_key(api_key)
            .with_access_token(access_token)
            .walk(&mut registry)?;

        Ok(registry)
    }

    /// Writes every artifact for an already collected registry
    pub fn write(
        &self,
        registry: &DocRegistry,
        models: &dyn ModelDefinitions,
    ) -> Result<GenerationReport> {
        let doc_files = create_doc_source_files(registry.calls(), &self.config.source_dir)?;

        let settings = self.config.emitter_settings(&self.config.host()?);

        let (swagger_doc, _) = emit(registry, models, settings.clone(), Flavor::Api)?;
        let swagger = self.config.public_dir.join(Flavor::Api.file_name());
        write_to_file(&serialize_json(&swagger_doc)?, &swagger)?;
        info!("Generated File - {}", swagger.display());

        let (collection, environment) = emit(registry, models, settings, Flavor::Postman)?;
        let postman_collection = self.config.public_dir.join(Flavor::Postman.file_name());
        write_to_file(&serialize_json(&collection)?, &postman_collection)?;
        info!("Generated File - {}", postman_collection.display());

        let postman_environment = self.config.public_dir.join(POSTMAN_ENVIRONMENT_FILE);
        write_to_file(&serialize_json(&environment)?, &postman_environment)?;
        info!("Postman Environment File - {}", postman_environment.display());

        Ok(GenerationReport {
            documented: registry.documented_count(),
            doc_files,
            swagger,
            postman_collection,
            postman_environment,
        })
    }

    /// Collects and writes in one go
    pub fn run<A: Application + ?Sized>(
        &self,
        app: &A,
        models: &dyn ModelDefinitions,
    ) -> Result<GenerationReport> {
        let registry = self.collect(app).context("Failed to collect API documentation")?;
        let report = self.write(&registry, models)?;

        info!("");
        info!("To complete, run `apidoc -i resources/docs -o public_html/docs/api`");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{ManifestApplication, RouteManifest};
    use crate::model_definition::SchemaCatalog;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"
users:
  - id: 3
    access_token: token-3
routes:
  - methods: [GET]
    uri: api/v1/users
    doc:
      group: Users
      name: List
"#;

    fn app() -> ManifestApplication {
        ManifestApplication::new(serde_yaml::from_str::<RouteManifest>(MANIFEST).unwrap())
    }

    fn config(root: &TempDir) -> GeneratorConfig {
        GeneratorConfig {
            app_name: "Clinic".to_string(),
            app_url: "https://clinic.test".to_string(),
            api_key: Some(" ,key-1,key-2".to_string()),
            public_dir: root.path().join("public/docs"),
            source_dir: root.path().join("resources/docs/auto_generated"),
            ..GeneratorConfig::default()
        }
    }

    fn root_error(err: &anyhow::Error) -> Option<&Error> {
        err.chain().find_map(|cause| cause.downcast_ref::<Error>())
    }

    #[test]
    fn test_primary_api_key() {
        let mut config = GeneratorConfig::default();
        assert_eq!(config.primary_api_key(), None);

        config.api_key = Some("first,second".to_string());
        assert_eq!(config.primary_api_key().as_deref(), Some("first"));

        config.api_key = Some("".to_string());
        assert_eq!(config.primary_api_key(), None);
    }

    #[test]
    fn test_host() {
        let mut config = GeneratorConfig::default();
        assert_eq!(config.host().unwrap(), "localhost");

        config.app_url = "https://api.clinic.test:8443/base".to_string();
        assert_eq!(config.host().unwrap(), "api.clinic.test");

        config.app_url = "not a url".to_string();
        assert!(matches!(config.host(), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_refuses_production() {
        let temp_dir = TempDir::new().unwrap();
        let generator = DocsGenerator::new(GeneratorConfig {
            environment: "production".to_string(),
            ..config(&temp_dir)
        });

        let err = generator.collect(&app()).unwrap_err();
        assert!(matches!(root_error(&err), Some(Error::ProductionEnvironment)));
    }

    #[test]
    fn test_unknown_user() {
        let temp_dir = TempDir::new().unwrap();
        let generator = DocsGenerator::new(GeneratorConfig {
            user_id: "42".to_string(),
            ..config(&temp_dir)
        });

        let err = generator.collect(&app()).unwrap_err();
        assert!(matches!(root_error(&err), Some(Error::UserNotFound(id)) if id == "42"));
    }

    #[test]
    fn test_no_routes() {
        let temp_dir = TempDir::new().unwrap();
        let app = ManifestApplication::new(
            serde_yaml::from_str("users:\n  - id: 3\n").unwrap(),
        );

        let err = DocsGenerator::new(config(&temp_dir)).collect(&app).unwrap_err();
        assert!(matches!(root_error(&err), Some(Error::NoRoutes)));
    }

    #[test]
    fn test_run_writes_every_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let generator = DocsGenerator::new(config(&temp_dir));

        let report = generator.run(&app(), &SchemaCatalog::new()).unwrap();

        assert_eq!(report.documented, 1);
        assert_eq!(
            report.swagger,
            temp_dir.path().join("public/docs/swagger.json")
        );
        assert!(report.swagger.exists());
        assert!(report.postman_collection.exists());
        assert!(report.postman_environment.exists());
        assert_eq!(
            report.doc_files,
            vec![
                temp_dir.path().join("resources/docs/auto_generated/definitions.coffee"),
                temp_dir.path().join("resources/docs/auto_generated/users.coffee"),
            ]
        );

        let collection: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&report.postman_collection).unwrap())
                .unwrap();
        assert_eq!(collection["host"], "{{domain}}");

        let environment: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&report.postman_environment).unwrap())
                .unwrap();
        assert_eq!(environment["values"][0]["value"], "clinic.test");
    }
}
