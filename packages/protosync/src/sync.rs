use std::{path::{Path, PathBuf}, sync::Arc};

use dashmap::DashSet;
use futures::future::{try_join_all, BoxFuture};
use itertools::Itertools;
use protosync_utils::write_atomic;

use crate::{error::Error, report::Report, resolver::{relative_import_path, Resolution, Resolver}};

const PROTO_SUFFIX: &str = ".proto";

struct SyncContext<'a> {
    resolver: &'a dyn Resolver,
    dest: PathBuf,
    roots: Vec<PathBuf>,
    resolved: DashSet<String>,
    report: Arc<Report>,
}

/// Syncs the transitive import closure of `sources` into `dest`.
///
/// Sources ending with `.proto` are imports to fetch through `resolver`; any
/// other source is a local root whose files are scanned for imports. Imports
/// that can be found in one of the local roots are left alone.
///
/// Returns the sorted list of the imports written into `dest`.
pub async fn sync(resolver: &dyn Resolver, dest: &Path, sources: &[String], report: Arc<Report>) -> Result<Vec<String>, Error> {
    let (imports, roots): (Vec<_>, Vec<_>) = sources.iter()
        .partition(|source| source.ends_with(PROTO_SUFFIX));

    let context = SyncContext {
        resolver,
        dest: dest.to_path_buf(),
        roots: roots.iter().map(|root| PathBuf::from(root.as_str())).collect(),
        resolved: DashSet::new(),
        report,
    };

    for import in imports {
        context.recursive_resolve(import.clone()).await?;
    }

    for root in &context.roots {
        context.resolve_local_root(root).await?;
    }

    let synced = context.resolved
        .into_iter()
        .sorted()
        .collect();

    Ok(synced)
}

impl<'a> SyncContext<'a> {
    fn recursive_resolve(&self, import: String) -> BoxFuture<'_, Result<(), Error>> {
        Box::pin(async move {
            // Claiming the import before fetching it makes concurrent
            // discoveries of the same file resolve it only once
            if !self.resolved.insert(import.clone()) {
                return Ok(());
            }

            let relative_path
                = relative_import_path(&import)?;

            let resolution = self.resolver.resolve(&import).await
                .map_err(|source| Error::ResolveFailed {
                    import: import.clone(),
                    source: Box::new(source),
                })?;

            let Resolution::Found(content) = resolution else {
                return Err(Error::Unresolved(import));
            };

            let dest_file
                = self.dest.join(&relative_path);

            if let Some(parent) = dest_file.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }

            self.report.info(format!("{} -> {}", content.name, dest_file.display()));

            let data = content.read_to_end().await
                .map_err(|source| Error::ResolveFailed {
                    import: import.clone(),
                    source: Box::new(source),
                })?;

            // Files are copied byte for byte; only the parser sees a lossy view
            let src
                = String::from_utf8_lossy(&data).into_owned();

            let target
                = dest_file.clone();

            tokio::task::spawn_blocking(move || write_atomic(&target, data))
                .await
                .map_err(std::io::Error::other)??;

            self.resolve_imports(&dest_file.to_string_lossy(), &src).await
        })
    }

    async fn resolve_imports(&self, file: &str, src: &str) -> Result<(), Error> {
        let proto = protosync_parsers::parse(src)
            .map_err(|err| Error::ResolveFailed {
                import: file.to_string(),
                source: Box::new(err.into()),
            })?;

        let package = proto.package()
            .unwrap_or_default();

        let mut pending
            = Vec::new();

        for (import, position) in proto.imports() {
            let at_position = move |source: Error| Error::AtPosition {
                file: file.to_string(),
                position,
                source: Box::new(source),
            };

            let relative_path
                = relative_import_path(import).map_err(at_position)?;

            if let Some(local) = self.find_local(&relative_path).await? {
                self.report.trace(format!("{} imports {} (local {})", package, import, local.display()));
                continue;
            }

            if self.resolved.contains(import) {
                self.report.trace(format!("{} imports {} (cached)", package, import));
            } else {
                self.report.trace(format!("{} imports {} (fetch)", package, import));
            }

            pending.push(async move {
                self.recursive_resolve(import.to_string()).await
                    .map_err(at_position)
            });
        }

        try_join_all(pending).await?;

        Ok(())
    }

    async fn find_local(&self, relative_path: &Path) -> Result<Option<PathBuf>, Error> {
        for root in &self.roots {
            let candidate
                = root.join(relative_path);

            if tokio::fs::try_exists(&candidate).await? {
                return Ok(Some(candidate));
            }
        }

        Ok(None)
    }

    async fn resolve_local_root(&self, root: &Path) -> Result<(), Error> {
        let files = walkdir::WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .map(|entry| entry.map_err(|err| Error::WalkError(root.to_path_buf(), err.to_string())))
            .filter_ok(|entry| entry.file_type().is_file() && entry.file_name().to_string_lossy().ends_with(PROTO_SUFFIX))
            .map_ok(|entry| entry.into_path())
            .collect::<Result<Vec<_>, _>>()?;

        for file in files {
            let data
                = tokio::fs::read(&file).await?;

            self.resolve_imports(&file.to_string_lossy(), &String::from_utf8_lossy(&data)).await?;
        }

        Ok(())
    }
}
