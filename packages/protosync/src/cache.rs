use std::path::{Path, PathBuf};

use protosync_utils::Sha256;

use crate::error::Error;

#[cfg(test)]
#[path = "./cache.test.rs"]
mod tests;

pub fn default_cache_dir() -> Result<PathBuf, Error> {
    dirs::cache_dir()
        .ok_or(Error::MissingCacheFolder)
}

/// Where a repository gets cloned. The name embeds both the url and the
/// revision, so two revisions of the same repository never share a checkout.
pub fn clone_path(cache_dir: &Path, url: &str, revision: &str) -> PathBuf {
    let key
        = Sha256::from_values(&[url, revision]);

    let basename = url
        .trim_end_matches('/')
        .rsplit(['/', ':'])
        .next()
        .unwrap_or_default();

    cache_dir
        .join("protosync")
        .join(format!("{}-{}", basename, key.to_hex()))
}

pub fn archive_path(cache_dir: &Path, artifact: &str, version: &str) -> PathBuf {
    cache_dir.join(archive_filename(artifact, version))
}

pub fn archive_filename(artifact: &str, version: &str) -> String {
    format!("{}-{}.jar", artifact, version)
}
