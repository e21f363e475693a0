use futures::future::BoxFuture;
use protosync_utils::OkMissing;

use crate::{error::Error, resolver::{relative_import_path, NamedContent, Resolution, Resolver}};

#[cfg(test)]
#[path = "./local.test.rs"]
mod tests;

/// Serves files found under a set of local include roots. Each entry is a
/// glob pattern, expanded again on every lookup.
#[derive(Clone, Debug, Default)]
pub struct LocalResolver {
    includes: Vec<String>,
}

impl LocalResolver {
    pub fn new(includes: Vec<String>) -> Self {
        LocalResolver {
            includes,
        }
    }
}

impl Resolver for LocalResolver {
    fn resolve<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<Resolution, Error>> {
        Box::pin(async move {
            let relative_path
                = relative_import_path(path)?;

            for include in &self.includes {
                let roots = glob::glob(include)
                    .map_err(|err| Error::InvalidGlob(include.clone(), err.to_string()))?;

                for root in roots {
                    let root
                        = root.map_err(|err| Error::from(err.into_error()))?;

                    let candidate
                        = root.join(&relative_path);

                    let Some(metadata) = tokio::fs::metadata(&candidate).await.ok_missing()? else {
                        continue;
                    };

                    if !metadata.is_file() {
                        continue;
                    }

                    let file
                        = tokio::fs::File::open(&candidate).await?;

                    return Ok(Resolution::Found(NamedContent::new(candidate.to_string_lossy(), Box::pin(file))));
                }
            }

            Ok(Resolution::NotFound)
        })
    }
}
