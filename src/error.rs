use std::path::PathBuf;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the library
#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),
    SerializationError(String),
    InvalidArgument(String),
    ManifestError { file: PathBuf, message: String },
    /// Generation refuses to run against a production application
    ProductionEnvironment,
    UserNotFound(String),
    NoRoutes,
    NoApiCalls,
    /// A route finished its synthetic request without documenting itself
    UndocumentedRoute { url: String },
    RouteInvocation { url: String, message: String },
    Validation { url: String, message: String },
    MissingFieldName { call: String },
    /// A synthesized success response definition clashes with an existing one
    DefinitionCollision(String),
    DuplicateDefinition(String),
    DuplicateRoute { path: String, method: String },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::IoError(e) => write!(f, "IO error: {}", e),
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::ManifestError { file, message } => {
                write!(f, "Invalid route manifest {}: {}", file.display(), message)
            }
            Error::ProductionEnvironment => write!(
                f,
                "Application in production environment. This command cannot be run in this environment. Aborting..."
            ),
            Error::UserNotFound(id) => write!(
                f,
                "A user with an ID of {} is not found. Ensure this user exists or provide another user with the `--user-id` option.",
                id
            ),
            Error::NoRoutes => write!(f, "Your application doesn't have any routes. Aborting..."),
            Error::NoApiCalls => write!(
                f,
                "No APICalls defined. Define the APICalls before trying to generate the documents again. Aborting..."
            ),
            Error::UndocumentedRoute { url } => {
                write!(f, "Route {} does not have an API documented", url)
            }
            Error::RouteInvocation { url, message } => {
                write!(f, "Route error on {}: {}", url, message)
            }
            Error::Validation { url, message } => {
                write!(f, "Validation failed on {}: {}", url, message)
            }
            Error::MissingFieldName { call } => {
                write!(f, "The parameters of `{}` require a field name", call)
            }
            Error::DefinitionCollision(name) => write!(
                f,
                "Definition {} already exists. Change the method group or name to be unique.",
                name
            ),
            Error::DuplicateDefinition(name) => {
                write!(f, "A documentation block named `{}` is already defined", name)
            }
            Error::DuplicateRoute { path, method } => {
                write!(f, "Operation {} {} is documented more than once", method, path)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(format!("JSON serialization error: {}", err))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::SerializationError(format!("YAML serialization error: {}", err))
    }
}
