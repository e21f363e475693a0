use crate::{error::Error, url::RepositoryUrl};

#[cfg(test)]
#[path = "./source.test.rs"]
mod tests;

/// A repository hosted on github.com, addressed as `/<user>/<project>.git`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GitHubRepository {
    pub user: String,
    pub project: String,
}

impl GitHubRepository {
    pub fn from_url(url: &RepositoryUrl) -> Result<GitHubRepository, Error> {
        match url.path_segments().as_slice() {
            [user, project] if !user.is_empty() && !project.is_empty() => Ok(GitHubRepository {
                user: user.to_string(),
                project: project.to_string(),
            }),

            _ => Err(Error::InvalidGitHubPath(url.path.clone())),
        }
    }
}

/// A repository hosted on a Bitbucket Server instance, addressed as
/// `/scm/<project>/<repo>.git`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitbucketRepository {
    pub project: String,
    pub repo: String,
}

impl BitbucketRepository {
    pub fn from_url(url: &RepositoryUrl) -> Result<BitbucketRepository, Error> {
        match url.path_segments().as_slice() {
            ["scm", project, repo] if !project.is_empty() && !repo.is_empty() => Ok(BitbucketRepository {
                project: project.to_string(),
                repo: repo.to_string(),
            }),

            _ => Err(Error::InvalidBitbucketPath(url.path.clone())),
        }
    }
}
