use std::{fmt::{self, Display, Formatter}, str::FromStr, sync::LazyLock};

use regex::Regex;

use crate::error::Error;

#[cfg(test)]
#[path = "./url.test.rs"]
mod tests;

// git@github.com:org/repo.git
static SSH_SHORTHAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^@/:\s]+)@([^@/:\s]+):(.+)$").unwrap()
});

/// Parsed form of a clonable repository URL. Both the standard syntax
/// (`ssh://git@host/org/repo.git`, `https://host/scm/p/r.git`) and the scp-like
/// shorthand (`git@host:org/repo.git`) map onto this representation.
///
/// Values are never rewritten in place; transports derive their own copies
/// through `with_scheme` and `without_credentials`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RepositoryUrl {
    pub scheme: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub host: String,
    pub port: Option<u16>,
    pub path: String,
    pub query: Option<String>,
}

impl RepositoryUrl {
    pub fn with_scheme(&self, scheme: &str) -> RepositoryUrl {
        RepositoryUrl {
            scheme: scheme.to_string(),
            ..self.clone()
        }
    }

    pub fn without_credentials(&self) -> RepositoryUrl {
        RepositoryUrl {
            user: None,
            password: None,
            ..self.clone()
        }
    }

    /// Path segments without the leading slash and the `.git` suffix.
    pub fn path_segments(&self) -> Vec<&str> {
        let trimmed = self.path
            .strip_suffix(".git")
            .unwrap_or(&self.path);

        let trimmed = trimmed
            .strip_prefix('/')
            .unwrap_or(trimmed);

        trimmed.split('/').collect()
    }
}

impl FromStr for RepositoryUrl {
    type Err = Error;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        if !src.contains("://") {
            if let Some(captures) = SSH_SHORTHAND.captures(src) {
                return Ok(RepositoryUrl {
                    scheme: "ssh".to_string(),
                    user: Some(captures[1].to_string()),
                    password: None,
                    host: captures[2].to_string(),
                    port: None,
                    path: captures[3].to_string(),
                    query: None,
                });
            }
        }

        let url = ::url::Url::parse(src)
            .map_err(|err| Error::InvalidUrl(src.to_string(), err.to_string()))?;

        let host = url.host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| Error::MissingHost(src.to_string()))?
            .to_string();

        let user = Some(url.username())
            .filter(|user| !user.is_empty())
            .map(|user| user.to_string());

        Ok(RepositoryUrl {
            scheme: url.scheme().to_string(),
            user,
            password: url.password().map(|password| password.to_string()),
            host,
            port: url.port(),
            path: url.path().to_string(),
            query: url.query().map(|query| query.to_string()),
        })
    }
}

impl Display for RepositoryUrl {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}://", self.scheme)?;

        if let Some(user) = &self.user {
            write!(f, "{}", user)?;

            if let Some(password) = &self.password {
                write!(f, ":{}", password)?;
            }

            write!(f, "@")?;
        }

        write!(f, "{}", self.host)?;

        if let Some(port) = self.port {
            write!(f, ":{}", port)?;
        }

        if !self.path.is_empty() && !self.path.starts_with('/') {
            write!(f, "/")?;
        }

        write!(f, "{}", self.path)?;

        if let Some(query) = &self.query {
            write!(f, "?{}", query)?;
        }

        Ok(())
    }
}
