//! API documentation generator - command-line tool.
//!
//! Walks every API route of an application described by a route manifest, collects the
//! documentation each route registers and writes:
//!
//! - apidoc source files, one `.coffee` file per group
//! - `swagger.json`
//! - `postman_collection.json` and `postman_environment.json`
//!
//! # Usage
//!
//! ```bash
//! generate-docs [OPTIONS] <MANIFEST>
//! ```
//!
//! # Examples
//!
//! Generate documentation for a local application:
//! ```bash
//! generate-docs routes.yaml --app-url http://clinic.test --api-key "$API_KEY"
//! ```
//!
//! Fail on duplicate routes and enable verbose logging:
//! ```bash
//! generate-docs manifests/ --strict-routes -v
//! ```

use anyhow::Result;
use api_docs_generator::cli;
use clap::Parser;
use log::info;

fn main() -> Result<()> {
    // Parse once for the verbose flag, then validate after the logger is up
    let args_for_verbose = cli::CliArgs::parse();

    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("API documentation generator starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;

    cli::run(args)?;

    Ok(())
}
