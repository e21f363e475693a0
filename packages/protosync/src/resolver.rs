use std::{fmt::{self, Debug, Formatter}, path::{Component, Path, PathBuf}, pin::Pin};

use futures::future::BoxFuture;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::Error;

#[cfg(test)]
#[path = "./resolver.test.rs"]
mod tests;

/**
 * A byte stream paired with where it came from. The name is only ever used
 * in diagnostics (a URL, a path within an archive, a path within a clone).
 */
pub struct NamedContent {
    pub name: String,
    pub content: Pin<Box<dyn AsyncRead + Send>>,
}

impl NamedContent {
    pub fn new(name: impl Into<String>, content: Pin<Box<dyn AsyncRead + Send>>) -> Self {
        NamedContent {
            name: name.into(),
            content,
        }
    }

    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>) -> Self {
        NamedContent::new(name, Box::pin(std::io::Cursor::new(data)))
    }

    pub async fn read_to_end(mut self) -> Result<Vec<u8>, Error> {
        let mut data
            = Vec::new();

        self.content.read_to_end(&mut data).await?;

        Ok(data)
    }
}

impl Debug for NamedContent {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("NamedContent")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub enum Resolution {
    Found(NamedContent),

    /// The resolver doesn't know about this path. Not an error; the next
    /// resolver in line gets a chance to serve it.
    NotFound,
}

impl Resolution {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }
}

/// Turns an import into a path to join under a root (a destination, an
/// include folder). Imports must stay below whatever they get joined to, so
/// absolute paths and `..` segments are rejected.
pub fn relative_import_path(import: &str) -> Result<PathBuf, Error> {
    let mut relative_path
        = PathBuf::new();

    for component in Path::new(import).components() {
        match component {
            Component::Normal(segment) => {
                relative_path.push(segment);
            },

            Component::CurDir => {},

            Component::RootDir | Component::Prefix(_) | Component::ParentDir => {
                return Err(Error::InvalidImportPath(import.to_string()));
            },
        }
    }

    if relative_path.as_os_str().is_empty() {
        return Err(Error::InvalidImportPath(import.to_string()));
    }

    Ok(relative_path)
}

pub trait Resolver: Send + Sync {
    fn resolve<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<Resolution, Error>>;
}

/// Tries each resolver in order. The first one to find the path wins, and
/// the first one to fail aborts the whole lookup.
#[derive(Default)]
pub struct ResolverChain {
    resolvers: Vec<Box<dyn Resolver>>,
}

impl ResolverChain {
    pub fn new(resolvers: Vec<Box<dyn Resolver>>) -> Self {
        ResolverChain {
            resolvers,
        }
    }
}

impl Resolver for ResolverChain {
    fn resolve<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<Resolution, Error>> {
        Box::pin(async move {
            for resolver in &self.resolvers {
                if let Resolution::Found(content) = resolver.resolve(path).await? {
                    return Ok(Resolution::Found(content));
                }
            }

            Ok(Resolution::NotFound)
        })
    }
}
