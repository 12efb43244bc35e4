//! Route walking.
//!
//! The walker issues one synthetic request per API route against an [`Application`] while the
//! application is in documentation mode. Each handler is expected to describe itself through the
//! [`DocContext`] it receives; the walker turns the outcome into an [`InvocationResult`] and
//! registers documented calls into the [`DocRegistry`].

use crate::docs::api_call::ApiCall;
use crate::docs::HttpMethod;
use crate::error::{Error, Result};
use crate::registry::{DocContext, DocRegistry};
use indexmap::IndexMap;
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A route as declared in the application's route table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// HTTP methods the route answers to
    pub methods: Vec<HttpMethod>,
    /// URI without the leading slash, e.g. `api/v1/users/{id}`
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default)]
    pub middleware: Vec<String>,
}

impl Route {
    /// Method used for the synthetic request: the only one, else `GET`, else the first
    pub fn primary_method(&self) -> Option<HttpMethod> {
        match self.methods.as_slice() {
            [] => None,
            [only] => Some(*only),
            methods if methods.contains(&HttpMethod::Get) => Some(HttpMethod::Get),
            methods => Some(methods[0]),
        }
    }
}

/// The route being intercepted, reduced to what documentation needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    pub method: HttpMethod,
    pub uri: String,
    /// Absolute URL the synthetic request is sent to
    pub url: String,
    pub action: Option<String>,
    /// Comma separated middleware chain
    pub middleware: String,
}

/// A request issued against the application kernel during the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticRequest {
    pub method: HttpMethod,
    pub uri: String,
    pub url: String,
    pub headers: IndexMap<String, String>,
}

/// An authenticated identity the walker impersonates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

/// Framework-level failures raised while a route handles a synthetic request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationError {
    /// The route's action does not exist on its controller
    BadMethodCall(String),
    /// The route rejected the request method, often because of middleware
    MethodNotAllowed(String),
    /// Request validation failed before the handler documented itself
    Validation(String),
    Other(String),
}

impl fmt::Display for InvocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvocationError::BadMethodCall(msg) => write!(f, "Bad method call: {}", msg),
            InvocationError::MethodNotAllowed(msg) => write!(f, "Method not allowed: {}", msg),
            InvocationError::Validation(msg) => write!(f, "Validation failed: {}", msg),
            InvocationError::Other(msg) => f.write_str(msg),
        }
    }
}

/// What happened when a route handled its synthetic request.
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationResult {
    Registered(ApiCall),
    CompletedWithoutRegistering,
    Failed(InvocationError),
}

/// The host application: its route table, users and HTTP kernel.
pub trait Application {
    /// Every registered route
    fn routes(&self) -> Vec<Route>;

    fn find_user(&self, id: &str) -> Option<User>;

    /// Issues or looks up an access token for the user
    fn access_token_for(&self, user: &User) -> Option<String>;

    /// Handles a request in documentation mode.
    ///
    /// A documented route calls [`DocContext::document`] and returns `Ok(())`.
    fn handle(
        &self,
        request: &SyntheticRequest,
        ctx: &mut DocContext,
    ) -> std::result::Result<(), InvocationError>;
}

/// Sends synthetic requests to every API route of an [`Application`].
pub struct RouteWalker<'a, A: Application + ?Sized> {
    app: &'a A,
    app_url: String,
    route_prefix: String,
    api_key: Option<String>,
    access_token: Option<String>,
}

impl<'a, A: Application + ?Sized> RouteWalker<'a, A> {
    /// Create a walker resolving route URLs against `app_url`
    pub fn new(app: &'a A, app_url: impl Into<String>) -> Self {
        Self {
            app,
            app_url: app_url.into(),
            route_prefix: "api".to_string(),
            api_key: None,
            access_token: None,
        }
    }

    /// Only routes whose URI starts with this prefix are walked
    pub fn with_route_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.route_prefix = prefix.into();
        self
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_access_token(mut self, access_token: Option<String>) -> Self {
        self.access_token = access_token;
        self
    }

    /// Routes that belong to the API
    pub fn api_routes(&self) -> Vec<Route> {
        self.app
            .routes()
            .into_iter()
            .filter(|route| route.uri.trim_start_matches('/').starts_with(&self.route_prefix))
            .collect()
    }

    /// Split route info from a route
    pub fn route_information(&self, route: &Route) -> Option<RouteInfo> {
        let method = route.primary_method()?;
        Some(RouteInfo {
            method,
            uri: route.uri.clone(),
            url: self.url(&route.uri),
            action: route
                .action
                .as_ref()
                .map(|a| a.trim_start_matches('\\').to_string()),
            middleware: route.middleware.join(","),
        })
    }

    fn url(&self, uri: &str) -> String {
        format!(
            "{}/{}",
            self.app_url.trim_end_matches('/'),
            uri.trim_start_matches('/')
        )
    }

    /// Builds the synthetic request carrying the API key and access token
    pub fn build_request(&self, info: &RouteInfo) -> SyntheticRequest {
        let mut headers = IndexMap::new();
        if let Some(api_key) = &self.api_key {
            headers.insert("x-api-key".to_string(), api_key.clone());
        }
        if let Some(token) = &self.access_token {
            headers.insert("x-access-token".to_string(), token.clone());
        }

        SyntheticRequest {
            method: info.method,
            uri: info.uri.clone(),
            url: info.url.clone(),
            headers,
        }
    }

    /// Hits a single route in documentation mode
    pub fn invoke(&self, info: &RouteInfo) -> InvocationResult {
        let request = self.build_request(info);
        let mut ctx = DocContext::new(info.clone());

        match self.app.handle(&request, &mut ctx) {
            Ok(()) => match ctx.into_documented() {
                Some(call) => InvocationResult::Registered(call),
                None => InvocationResult::CompletedWithoutRegistering,
            },
            Err(err) => InvocationResult::Failed(err),
        }
    }

    /// Hits every API route and loads the documented calls into `registry`.
    ///
    /// Stops at the first route that fails or does not document itself.
    ///
    /// # Returns
    ///
    /// The number of documented endpoint calls in the registry.
    pub fn walk(&self, registry: &mut DocRegistry) -> Result<usize> {
        for route in self.api_routes() {
            let Some(info) = self.route_information(&route) else {
                debug!("Skipping route {} without methods", route.uri);
                continue;
            };

            info!("Sending {} request to {}...", info.method, info.url);

            match self.invoke(&info) {
                InvocationResult::Registered(call) => registry.register(call)?,
                InvocationResult::CompletedWithoutRegistering => {
                    return Err(Error::UndocumentedRoute { url: info.url });
                }
                InvocationResult::Failed(err) => return Err(self.report_failure(&info, err)),
            }
        }

        let count = registry.documented_count();
        info!("");
        info!("API Doc Builder found {} defined APICalls.", count);

        if count == 0 {
            return Err(Error::NoApiCalls);
        }
        Ok(count)
    }

    fn report_failure(&self, info: &RouteInfo, err: InvocationError) -> Error {
        match err {
            InvocationError::BadMethodCall(message) => {
                error!("Route error on {}", info.url);
                error!("{}", message);
                Error::RouteInvocation {
                    url: info.url.clone(),
                    message,
                }
            }
            InvocationError::MethodNotAllowed(message) => {
                error!("Route error accessing {}", info.url);
                error!("Have you checked your middleware?");
                error!("{}", message);
                Error::RouteInvocation {
                    url: info.url.clone(),
                    message,
                }
            }
            InvocationError::Validation(message) => {
                error!("ValidationException detected. Have you documented this API?");
                error!("{}", message);
                Error::Validation {
                    url: info.url.clone(),
                    message,
                }
            }
            InvocationError::Other(message) => {
                error!("Route error on {}", info.url);
                Error::RouteInvocation {
                    url: info.url.clone(),
                    message,
                }
            }
        }
    }
}
