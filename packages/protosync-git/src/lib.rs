mod error;
mod source;
mod url;

pub use crate::{
    error::Error,
    source::{BitbucketRepository, GitHubRepository},
    url::RepositoryUrl,
};
