use std::sync::Arc;

use futures::future::BoxFuture;
use protosync_git::{BitbucketRepository, GitHubRepository, RepositoryUrl};
use serde::Deserialize;

use crate::{error::Error, git::Cloner, http::HttpClient, report::Report, resolver::{NamedContent, Resolution, Resolver}};

#[cfg(test)]
#[path = "./remote.test.rs"]
mod tests;

pub const DEFAULT_REVISION: &str = "master";
pub const DEFAULT_GITHUB_RAW_URL: &str = "https://raw.githubusercontent.com";

fn default_github_raw_url() -> String {
    DEFAULT_GITHUB_RAW_URL.to_string()
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RemoteSettings {
    /// Hosts to treat as Bitbucket Server instances.
    #[serde(default)]
    pub bitbucket_servers: Vec<String>,

    #[serde(default = "default_github_raw_url")]
    pub github_raw_url: String,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        RemoteSettings {
            bitbucket_servers: Vec::new(),
            github_raw_url: default_github_raw_url(),
        }
    }
}

/// A source repository and the part of the import namespace it serves.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Repository {
    pub url: String,

    #[serde(default)]
    pub root: Option<String>,

    #[serde(default)]
    pub prefix: Option<String>,

    #[serde(default)]
    pub protos: Vec<String>,

    #[serde(default)]
    pub commit: Option<String>,
}

impl Repository {
    pub fn revision(&self) -> &str {
        self.commit.as_deref()
            .unwrap_or(DEFAULT_REVISION)
    }

    pub fn matches(&self, path: &str) -> bool {
        let prefix_match = self.prefix.as_deref()
            .is_some_and(|prefix| !prefix.is_empty() && path.starts_with(prefix));

        prefix_match || self.protos.iter().any(|proto| proto == path)
    }

    /// Location of `path` relative to the repository root.
    pub fn relative_path(&self, path: &str) -> String {
        match self.root.as_deref().map(|root| root.trim_matches('/')) {
            Some(root) if !root.is_empty() => format!("{}/{}", root, path),
            _ => path.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transport {
    GitHub,
    Bitbucket,
}

impl Transport {
    pub fn for_url(url: &RepositoryUrl, settings: &RemoteSettings) -> Option<Transport> {
        if url.host == "github.com" {
            return Some(Transport::GitHub);
        }

        let host_with_port = url.port
            .map(|port| format!("{}:{}", url.host, port));

        let is_bitbucket = settings.bitbucket_servers.iter()
            .any(|server| *server == url.host || Some(server) == host_with_port.as_ref());

        is_bitbucket.then_some(Transport::Bitbucket)
    }

    /// The url from which `path` can be downloaded without cloning.
    pub fn raw_url(&self, url: &RepositoryUrl, settings: &RemoteSettings, revision: &str, path: &str) -> Result<String, Error> {
        match self {
            Transport::GitHub => {
                let repository
                    = GitHubRepository::from_url(url)?;

                Ok(format!(
                    "{}/{}/{}/{}/{}",
                    settings.github_raw_url.trim_end_matches('/'),
                    repository.user,
                    repository.project,
                    revision,
                    path,
                ))
            },

            Transport::Bitbucket => {
                let repository
                    = BitbucketRepository::from_url(url)?;

                // A port on an ssh url belongs to the ssh daemon, not to the web server
                let port = match url.scheme.as_str() {
                    "http" | "https" => url.port,
                    _ => None,
                };

                let raw_url = RepositoryUrl {
                    port,
                    path: format!("/projects/{}/repos/{}/raw/{}", repository.project, repository.repo, path),
                    query: Some(format!("at={}", revision)),
                    ..url.without_credentials().with_scheme("https")
                };

                Ok(raw_url.to_string())
            },
        }
    }

    /// The url to clone when the raw download didn't work out. GitHub
    /// repositories are public, so they are cloned anonymously over https.
    pub fn clone_url(&self, url: &RepositoryUrl, original: &str) -> String {
        match self {
            Transport::GitHub => url.without_credentials().with_scheme("https").to_string(),
            Transport::Bitbucket => original.to_string(),
        }
    }
}

pub struct RemoteResolver {
    settings: RemoteSettings,
    repositories: Vec<Repository>,
    http_client: Arc<HttpClient>,
    cloner: Arc<Cloner>,
    report: Arc<Report>,
}

impl RemoteResolver {
    pub fn new(settings: RemoteSettings, repositories: Vec<Repository>, http_client: Arc<HttpClient>, cloner: Arc<Cloner>, report: Arc<Report>) -> Self {
        RemoteResolver {
            settings,
            repositories,
            http_client,
            cloner,
            report,
        }
    }

    pub fn repositories(&self) -> &[Repository] {
        &self.repositories
    }

    /// First repository in declaration order that claims `path`.
    pub fn find_repository(&self, path: &str) -> Option<&Repository> {
        self.repositories.iter()
            .find(|repository| repository.matches(path))
    }

    async fn fetch(&self, repository: &Repository, path: &str) -> Result<NamedContent, Error> {
        let url: RepositoryUrl
            = repository.url.parse()?;

        let transport = Transport::for_url(&url, &self.settings)
            .ok_or_else(|| Error::UnsupportedRepositorySource(repository.url.clone()))?;

        let revision
            = repository.revision();
        let relative_path
            = repository.relative_path(path);

        let raw_url
            = transport.raw_url(&url, &self.settings, revision, &relative_path)?;

        match self.http_client.get_content(&raw_url).await {
            Err(Error::NotFound(reason)) => {
                self.report.debug(format!("{} not available over http ({}), falling back to a clone", raw_url, reason));

                let clone_url
                    = transport.clone_url(&url, &repository.url);

                self.cloner.open(&clone_url, revision, &relative_path).await
                    .map_err(|clone| Error::FallbackFailed {
                        not_found: Box::new(Error::NotFound(reason)),
                        clone: Box::new(clone),
                    })
            },

            result => result,
        }
    }
}

impl Resolver for RemoteResolver {
    fn resolve<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<Resolution, Error>> {
        Box::pin(async move {
            let Some(repository) = self.find_repository(path) else {
                return Ok(Resolution::NotFound);
            };

            let content = self.fetch(repository, path).await
                .map_err(|source| Error::Repository {
                    url: repository.url.clone(),
                    source: Box::new(source),
                })?;

            Ok(Resolution::Found(content))
        })
    }
}
