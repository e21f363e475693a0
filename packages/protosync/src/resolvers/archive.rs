use std::{path::{Path, PathBuf}, sync::Arc};

use futures::future::BoxFuture;
use protosync_formats::zip::ZipArchive;
use protosync_utils::{ToHumanString, Unit};
use serde::Deserialize;
use tokio::{io::AsyncWriteExt, sync::OnceCell};

use crate::{cache, error::Error, http::{into_reader, HttpClient}, report::Report, resolver::{NamedContent, Resolution, Resolver}};

use super::metadata;

#[cfg(test)]
#[path = "./archive.test.rs"]
mod tests;

/// An Artifactory-like repository manager, with its maven layout.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ArchiveSettings {
    pub url: String,

    /// Mirror to download the archives from; metadata are always read from
    /// `url`.
    #[serde(default)]
    pub download_url: Option<String>,

    #[serde(default)]
    pub repositories: Vec<ArchiveRepository>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ArchiveRepository {
    /// Path of the artifact within the repository manager, eg.
    /// `jar-releases/com/example/protos/all-protos`.
    pub name: String,

    #[serde(default)]
    pub version: Option<String>,
}

impl ArchiveRepository {
    pub fn artifact(&self) -> &str {
        self.name
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
    }
}

struct OpenArchive {
    path: PathBuf,
    archive: ZipArchive,
}

/**
 * Serves the files stored in one archive of a repository manager. The
 * archive is located, downloaded, and indexed on the first lookup only; later
 * lookups are served from memory.
 */
pub struct ArchiveResolver {
    url: String,
    download_url: String,
    repository: ArchiveRepository,
    cache_dir: PathBuf,
    http_client: Arc<HttpClient>,
    report: Arc<Report>,
    state: OnceCell<OpenArchive>,
}

impl ArchiveResolver {
    pub fn new(settings: &ArchiveSettings, repository: ArchiveRepository, cache_dir: impl Into<PathBuf>, http_client: Arc<HttpClient>, report: Arc<Report>) -> Self {
        let url
            = settings.url.trim_end_matches('/').to_string();

        let download_url = settings.download_url.as_deref()
            .map(|download_url| download_url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| url.clone());

        ArchiveResolver {
            url,
            download_url,
            repository,
            cache_dir: cache_dir.into(),
            http_client,
            report,
            state: OnceCell::new(),
        }
    }

    pub fn metadata_url(&self) -> String {
        format!("{}/{}/maven-metadata.xml", self.url, self.repository.name)
    }

    pub fn archive_url(&self, version: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.download_url,
            self.repository.name,
            version,
            cache::archive_filename(self.repository.artifact(), version),
        )
    }

    async fn open(&self) -> Result<&OpenArchive, Error> {
        self.state.get_or_try_init(|| self.load()).await
    }

    async fn load(&self) -> Result<OpenArchive, Error> {
        let version = match &self.repository.version {
            Some(version) => version.clone(),
            None => metadata::latest_version(&self.http_client, &self.metadata_url(), &self.report).await?,
        };

        let path
            = cache::archive_path(&self.cache_dir, self.repository.artifact(), &version);

        // Cached archives are trusted by name; versions are never republished
        if !tokio::fs::try_exists(&path).await? {
            self.download(&version, &path).await?;
        }

        let data
            = tokio::fs::read(&path).await?;

        let archive
            = ZipArchive::new(data)?;

        Ok(OpenArchive {
            path,
            archive,
        })
    }

    async fn download(&self, version: &str, path: &Path) -> Result<(), Error> {
        let url
            = self.archive_url(version);

        self.report.debug(format!("Syncing {} version {}", self.repository.name, version));

        let response = self.http_client.get(&url)
            .await?
            .error_for_status()?;

        self.report.debug(format!("<- {} ({})", url, Unit::maybe_bytes(response.content_length())));
        self.report.debug(format!("-> {}", path.to_print_string()));

        tokio::fs::create_dir_all(&self.cache_dir).await?;

        let temp_file = tempfile::Builder::new()
            .prefix(&format!("{}-", self.repository.artifact()))
            .suffix(".jar")
            .tempfile_in(&self.cache_dir)?;

        let mut writer
            = tokio::fs::File::from_std(temp_file.reopen()?);

        let mut reader
            = Box::pin(into_reader(response));

        tokio::io::copy(&mut reader, &mut writer).await?;

        writer.flush().await?;
        drop(writer);

        temp_file.persist(path)
            .map_err(|err| err.error)?;

        Ok(())
    }
}

impl Resolver for ArchiveResolver {
    fn resolve<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<Resolution, Error>> {
        Box::pin(async move {
            let open = self.open().await
                .map_err(|source| Error::Repository {
                    url: self.repository.name.clone(),
                    source: Box::new(source),
                })?;

            let Some(entry) = open.archive.read(path)? else {
                return Ok(Resolution::NotFound);
            };

            let name
                = format!("{}#{}", open.path.display(), path);

            Ok(Resolution::Found(NamedContent::from_bytes(name, entry.data.into_owned())))
        })
    }
}
