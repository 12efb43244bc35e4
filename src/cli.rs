use crate::generator::{DocsGenerator, GeneratorConfig};
use crate::manifest::{ManifestApplication, RouteManifest};
use crate::model_definition::SchemaCatalog;
use crate::swagger_builder::DuplicateRoutePolicy;
use anyhow::Result;
use clap::Parser;
use log::{debug, info};
use std::path::PathBuf;

/// API documentation generator - apidoc sources, Swagger and Postman files from documented routes
#[derive(Parser, Debug)]
#[command(name = "generate-docs")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Route manifest file, or a directory of manifests
    #[arg(value_name = "MANIFEST")]
    pub manifest: PathBuf,

    /// ID of the user whose access token is sent with every request
    #[arg(long = "user-id", default_value = "3")]
    pub user_id: String,

    /// Application environment
    #[arg(long = "env", env = "APP_ENV", default_value = "local")]
    pub environment: String,

    #[arg(long = "app-name", env = "APP_NAME", default_value = "App")]
    pub app_name: String,

    /// Base URL the routes are resolved against
    #[arg(long = "app-url", env = "APP_URL", default_value = "http://localhost")]
    pub app_url: String,

    /// Comma separated API keys, the first one is used
    #[arg(long = "api-key", env = "API_KEY")]
    pub api_key: Option<String>,

    /// Prefix stripped from routes to form Swagger paths
    #[arg(long = "base-path", default_value = "/api/v1")]
    pub base_path: String,

    /// Only routes whose URI starts with this prefix are documented
    #[arg(long = "route-prefix", default_value = "api")]
    pub route_prefix: String,

    /// Output directory for swagger.json and the Postman files
    #[arg(long = "public-dir", value_name = "DIR", default_value = "public/docs")]
    pub public_dir: PathBuf,

    /// Output directory for the apidoc source files
    #[arg(
        long = "source-dir",
        value_name = "DIR",
        default_value = "resources/docs/auto_generated"
    )]
    pub source_dir: PathBuf,

    /// Fail when two calls document the same path and method
    #[arg(long = "strict-routes")]
    pub strict_routes: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl CliArgs {
    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            app_name: self.app_name.clone(),
            app_url: self.app_url.clone(),
            environment: self.environment.clone(),
            user_id: self.user_id.clone(),
            api_key: self.api_key.clone(),
            base_path: self.base_path.clone(),
            route_prefix: self.route_prefix.clone(),
            public_dir: self.public_dir.clone(),
            source_dir: self.source_dir.clone(),
            duplicate_routes: if self.strict_routes {
                DuplicateRoutePolicy::Reject
            } else {
                DuplicateRoutePolicy::Overwrite
            },
        }
    }
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.manifest.exists() {
        anyhow::bail!("Manifest path does not exist: {}", args.manifest.display());
    }

    info!("Manifest: {}", args.manifest.display());
    info!("Environment: {}", args.environment);
    info!("Application URL: {}", args.app_url);
    info!("Output: {} and {}", args.public_dir.display(), args.source_dir.display());

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Loading route manifest...");
    let manifest = RouteManifest::load(&args.manifest)?;
    info!(
        "Found {} routes and {} model definitions",
        manifest.routes.len(),
        manifest.definitions.len()
    );

    let mut models = SchemaCatalog::new();
    models.extend(manifest.definitions.clone());
    let app = ManifestApplication::new(manifest);

    let generator = DocsGenerator::new(args.generator_config());
    let report = generator.run(&app, &models)?;

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Documented calls: {}", report.documented);
    info!("  - apidoc files: {}", report.doc_files.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = CliArgs::try_parse_from(["generate-docs", "routes.yaml"]).unwrap();

        assert_eq!(args.user_id, "3");
        assert_eq!(args.base_path, "/api/v1");
        assert_eq!(args.route_prefix, "api");
        assert_eq!(args.public_dir, PathBuf::from("public/docs"));
        assert_eq!(args.source_dir, PathBuf::from("resources/docs/auto_generated"));
        assert!(!args.strict_routes);
        assert_eq!(
            args.generator_config().duplicate_routes,
            DuplicateRoutePolicy::Overwrite
        );
    }

    #[test]
    fn test_explicit_flags() {
        let args = CliArgs::try_parse_from([
            "generate-docs",
            "routes",
            "--user-id",
            "7",
            "--env",
            "staging",
            "--app-url",
            "https://clinic.test",
            "--api-key",
            "a,b",
            "--strict-routes",
            "-v",
        ])
        .unwrap();
        let config = args.generator_config();

        assert_eq!(config.user_id, "7");
        assert_eq!(config.environment, "staging");
        assert_eq!(config.primary_api_key().as_deref(), Some("a"));
        assert_eq!(config.duplicate_routes, DuplicateRoutePolicy::Reject);
        assert!(args.verbose);
    }

    #[test]
    fn test_missing_manifest_is_rejected() {
        let args = CliArgs::try_parse_from(["generate-docs", "/definitely/not/here.yaml"]).unwrap();
        assert!(parse_args_from_parsed(args).is_err());
    }
}
