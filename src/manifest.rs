use crate::docs::api_call::ApiCallBuilder;
use crate::docs::HttpMethod;
use crate::error::Error;
use crate::registry::DocContext;
use crate::walker::{Application, InvocationError, Route, SyntheticRequest, User};
use anyhow::{Context, Result};
use indexmap::IndexMap;
use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Route table of an application, with each route's documentation.
///
/// Manifests are YAML or JSON files:
///
/// ```yaml
/// users:
///   - id: 3
///     access_token: 0f6c3b
/// definitions:
///   User: { type: object, properties: { id: { type: integer } } }
/// routes:
///   - methods: [GET, HEAD]
///     uri: api/v1/users
///     action: App\Http\Controllers\API\V1\UsersController@index
///     doc:
///       group: Users
///       name: List users
///       successPaginatedObject: App\Models\User
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteManifest {
    #[serde(default)]
    users: Vec<ManifestUser>,
    /// Model schemas keyed by short name
    #[serde(default)]
    pub definitions: IndexMap<String, Value>,
    #[serde(default)]
    pub routes: Vec<ManifestRoute>,
}

/// A route plus the documentation its handler registers
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestRoute {
    #[serde(flatten)]
    pub route: Route,
    /// Absent for routes that were never documented
    #[serde(default)]
    pub doc: Option<ApiCallBuilder>,
}

#[derive(Debug, Clone, Deserialize)]
struct ManifestUser {
    id: UserId,
    #[serde(default)]
    access_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum UserId {
    Number(u64),
    Text(String),
}

impl From<&ManifestUser> for User {
    fn from(user: &ManifestUser) -> Self {
        let id = match &user.id {
            UserId::Number(n) => n.to_string(),
            UserId::Text(s) => s.clone(),
        };
        User {
            id,
            access_token: user.access_token.clone(),
        }
    }
}

impl RouteManifest {
    /// Parses a single manifest file; `.json` files are read as JSON, everything else as YAML.
    pub fn parse_file(path: &Path) -> Result<Self> {
        debug!("Parsing manifest: {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;

        let parsed = if path.extension().and_then(|s| s.to_str()) == Some("json") {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str(&content).map_err(|e| e.to_string())
        };

        parsed.map_err(|message| {
            Error::ManifestError {
                file: path.to_path_buf(),
                message,
            }
            .into()
        })
    }

    /// Loads a manifest file, or every manifest below a directory merged in path order.
    ///
    /// Hidden directories are skipped.
    pub fn load(path: &Path) -> Result<Self> {
        if path.is_file() {
            return Self::parse_file(path);
        }
        if !path.is_dir() {
            anyhow::bail!("Manifest path does not exist: {}", path.display());
        }

        let mut merged = Self::default();
        for file in Self::scan(path) {
            merged.merge(Self::parse_file(&file)?);
        }
        Ok(merged)
    }

    fn scan(root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for entry in WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.path() == root || !e.file_name().to_string_lossy().starts_with('.'))
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    let is_manifest = matches!(
                        path.extension().and_then(|s| s.to_str()),
                        Some("yaml" | "yml" | "json")
                    );
                    if path.is_file() && is_manifest {
                        files.push(path.to_path_buf());
                    }
                }
                Err(e) => warn!("Failed to access path: {}", e),
            }
        }

        files
    }

    fn merge(&mut self, other: RouteManifest) {
        self.users.extend(other.users);
        self.definitions.extend(other.definitions);
        self.routes.extend(other.routes);
    }

    pub fn users(&self) -> Vec<User> {
        self.users.iter().map(User::from).collect()
    }
}

/// [`Application`] backed by a [`RouteManifest`].
///
/// Documented routes register their `doc` entry; undocumented routes complete without
/// registering. A request whose method the route does not declare is not allowed.
#[derive(Debug, Clone)]
pub struct ManifestApplication {
    manifest: RouteManifest,
}

impl ManifestApplication {
    pub fn new(manifest: RouteManifest) -> Self {
        Self { manifest }
    }

    /// Entries declared for `uri`, in manifest order
    fn routes_for<'m>(&'m self, uri: &str) -> impl Iterator<Item = &'m ManifestRoute> + 'm {
        let uri = uri.trim_start_matches('/').to_string();
        self.manifest
            .routes
            .iter()
            .filter(move |r| r.route.uri.trim_start_matches('/') == uri)
    }

    /// The entry declaring both `uri` and `method`
    fn find_route(&self, uri: &str, method: HttpMethod) -> Option<&ManifestRoute> {
        self.routes_for(uri).find(|r| r.route.methods.contains(&method))
    }
}

impl Application for ManifestApplication {
    fn routes(&self) -> Vec<Route> {
        self.manifest.routes.iter().map(|r| r.route.clone()).collect()
    }

    fn find_user(&self, id: &str) -> Option<User> {
        self.manifest.users().into_iter().find(|u| u.id == id)
    }

    fn access_token_for(&self, user: &User) -> Option<String> {
        user.access_token.clone().filter(|t| !t.is_empty())
    }

    fn handle(
        &self,
        request: &SyntheticRequest,
        ctx: &mut DocContext,
    ) -> std::result::Result<(), InvocationError> {
        let Some(entry) = self.find_route(&request.uri, request.method) else {
            if self.routes_for(&request.uri).next().is_none() {
                return Err(InvocationError::Other(format!("No route matches {}", request.url)));
            }
            return Err(InvocationError::MethodNotAllowed(format!(
                "The {} method is not supported for route {}",
                request.method, request.uri
            )));
        };

        if let Some(doc) = &entry.doc {
            debug!("Documenting {} {}", ctx.route().method, ctx.route().uri);
            ctx.document(doc.clone());
        }
        Ok(())
    }
}
