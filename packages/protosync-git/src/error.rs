#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid repository URL {0:?}: {1}")]
    InvalidUrl(String, String),

    #[error("Repository URL {0:?} doesn't have a host")]
    MissingHost(String),

    #[error("Expected GitHub URL path in the form /<user>/<repo>.git but got {0:?}")]
    InvalidGitHubPath(String),

    #[error("Expected Bitbucket URL path in the form /scm/<project>/<repo>.git but got {0:?}")]
    InvalidBitbucketPath(String),
}
