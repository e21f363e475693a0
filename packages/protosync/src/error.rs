use std::sync::Arc;

use protosync_parsers::Position;
use protosync_utils::ToHumanString;

#[derive(thiserror::Error, Clone, Debug)]
pub enum Error {
    #[error(transparent)]
    IOError(#[from] Arc<std::io::Error>),

    #[error("Network error: {0}")]
    HttpError(#[from] Arc<reqwest::Error>),

    #[error(transparent)]
    FormatError(#[from] protosync_formats::Error),

    #[error(transparent)]
    GitUrlError(#[from] protosync_git::Error),

    #[error(transparent)]
    ParseError(#[from] protosync_parsers::Error),

    #[error("Failed to walk {}: {}", .0.to_print_string(), .1)]
    WalkError(std::path::PathBuf, String),

    #[error("Invalid glob pattern {0:?}: {1}")]
    InvalidGlob(String, String),

    #[error("Failed to parse the configuration: {0}")]
    ConfigurationError(Arc<serde_yaml::Error>),

    #[error("Variable ${0} is not defined")]
    UndefinedVariable(String),

    #[error("Invalid variable assignment {0:?}, expected KEY=VALUE")]
    InvalidVariableAssignment(String),

    #[error("Invalid log level {0:?}, expected one of trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Couldn't find the user cache folder")]
    MissingCacheFolder,

    #[error("Destination not provided on the command line (--dest) or in the configuration file")]
    MissingDestination,

    #[error("Sources not provided on the command line or in the configuration file")]
    MissingSources,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unsupported repository source {0:?}")]
    UnsupportedRepositorySource(String),

    #[error("`{command}` failed: {message}")]
    GitFailed {
        command: String,
        message: String,
    },

    #[error("Failed to read the metadata document at {0}: {1}")]
    MetadataError(String, String),

    #[error("Could not find the latest version in {0}")]
    MissingLatestVersion(String),

    #[error("Invalid import path {0:?}, imports must be relative and stay within their root")]
    InvalidImportPath(String),

    #[error("Could not resolve {0:?}, may need resolver config to be updated")]
    Unresolved(String),

    #[error("{import}: {source}")]
    ResolveFailed {
        import: String,
        source: Box<Error>,
    },

    #[error("{url}: {source}")]
    Repository {
        url: String,
        source: Box<Error>,
    },

    #[error("{file}:{position}: {source}")]
    AtPosition {
        file: String,
        position: Position,
        source: Box<Error>,
    },

    #[error("{clone}: {not_found}")]
    FallbackFailed {
        not_found: Box<Error>,
        clone: Box<Error>,
    },
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::from(Arc::new(value))
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Error::from(Arc::new(value))
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(value: serde_yaml::Error) -> Self {
        Error::ConfigurationError(Arc::new(value))
    }
}
