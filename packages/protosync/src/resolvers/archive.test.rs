use std::{path::Path, sync::Arc};

use httpmock::{Method::GET, MockServer};
use pretty_assertions::assert_eq;
use protosync_formats::{zip::craft_zip, CompressionAlgorithm, Entry};

use crate::{error::Error, http::HttpClient, report::{Level, Report}, resolver::{Resolution, Resolver}};

use super::{ArchiveRepository, ArchiveResolver, ArchiveSettings};

const REPOSITORY: &str = "releases/com/example/all-protos";

fn jar() -> Vec<u8> {
    craft_zip(&[
        Entry::new("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n".as_slice()),
        Entry::new("foo/bar.proto", b"syntax = \"proto3\";".as_slice()),
        Entry::new("foo/baz.proto", b"package foo;".as_slice()),
    ], CompressionAlgorithm::Deflate(6)).unwrap()
}

fn resolver(url: String, download_url: Option<String>, version: Option<&str>, cache: &Path) -> ArchiveResolver {
    let settings = ArchiveSettings {
        url,
        download_url,
        repositories: vec![],
    };

    let repository = ArchiveRepository {
        name: REPOSITORY.to_string(),
        version: version.map(|version| version.to_string()),
    };

    let (report, _) = Report::buffered(Level::Trace);

    ArchiveResolver::new(&settings, repository, cache, HttpClient::new().unwrap(), Arc::new(report))
}

#[test]
fn test_urls() {
    let cache = tempfile::tempdir().unwrap();

    let direct = resolver("https://artifactory.example.com/artifactory/".to_string(), None, None, cache.path());
    assert_eq!(direct.metadata_url(), "https://artifactory.example.com/artifactory/releases/com/example/all-protos/maven-metadata.xml");
    assert_eq!(direct.archive_url("1.0.0"), "https://artifactory.example.com/artifactory/releases/com/example/all-protos/1.0.0/all-protos-1.0.0.jar");

    let mirrored = resolver("https://artifactory.example.com/artifactory".to_string(), Some("https://mirror.example.com/artifactory".to_string()), None, cache.path());
    assert_eq!(mirrored.metadata_url(), "https://artifactory.example.com/artifactory/releases/com/example/all-protos/maven-metadata.xml");
    assert_eq!(mirrored.archive_url("1.0.0"), "https://mirror.example.com/artifactory/releases/com/example/all-protos/1.0.0/all-protos-1.0.0.jar");
}

#[tokio::test]
async fn test_download_latest_once() {
    let server = MockServer::start_async().await;
    let cache = tempfile::tempdir().unwrap();

    let metadata = server.mock_async(|when, then| {
        when.method(GET).path(format!("/{}/maven-metadata.xml", REPOSITORY));
        then.status(200).body("<metadata><versioning><latest>1.2.0</latest></versioning></metadata>");
    }).await;

    let archive = server.mock_async(|when, then| {
        when.method(GET).path(format!("/{}/1.2.0/all-protos-1.2.0.jar", REPOSITORY));
        then.status(200).body(jar());
    }).await;

    let resolver = resolver(server.base_url(), None, None, cache.path());

    let Resolution::Found(content) = resolver.resolve("foo/bar.proto").await.unwrap() else {
        panic!("Expected foo/bar.proto to be found");
    };

    let cached = cache.path().join("all-protos-1.2.0.jar");

    assert_eq!(content.name, format!("{}#foo/bar.proto", cached.display()));
    assert_eq!(content.read_to_end().await.unwrap(), b"syntax = \"proto3\";".to_vec());

    let Resolution::Found(content) = resolver.resolve("foo/baz.proto").await.unwrap() else {
        panic!("Expected foo/baz.proto to be found");
    };

    assert_eq!(content.read_to_end().await.unwrap(), b"package foo;".to_vec());

    assert!(matches!(resolver.resolve("foo/missing.proto").await, Ok(Resolution::NotFound)));
    assert!(matches!(resolver.resolve("Foo/Bar.proto").await, Ok(Resolution::NotFound)));
    assert!(matches!(resolver.resolve("foo").await, Ok(Resolution::NotFound)));

    metadata.assert_hits_async(1).await;
    archive.assert_hits_async(1).await;

    assert_eq!(std::fs::read(&cached).unwrap(), jar());

    // Only the final archive is left in the cache
    assert_eq!(std::fs::read_dir(cache.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn test_cached_archive_is_trusted() {
    let server = MockServer::start_async().await;
    let cache = tempfile::tempdir().unwrap();

    std::fs::write(cache.path().join("all-protos-0.9.0.jar"), jar()).unwrap();

    // No mocks; any request would fail
    let resolver = resolver(server.base_url(), None, Some("0.9.0"), cache.path());

    let Resolution::Found(content) = resolver.resolve("foo/bar.proto").await.unwrap() else {
        panic!("Expected foo/bar.proto to be found");
    };

    assert_eq!(content.read_to_end().await.unwrap(), b"syntax = \"proto3\";".to_vec());
}

#[tokio::test]
async fn test_download_from_mirror() {
    let server = MockServer::start_async().await;
    let mirror = MockServer::start_async().await;
    let cache = tempfile::tempdir().unwrap();

    let metadata = server.mock_async(|when, then| {
        when.method(GET).path(format!("/{}/maven-metadata.xml", REPOSITORY));
        then.status(200).body("<metadata><versioning><latest>1.3.0</latest></versioning></metadata>");
    }).await;

    let archive = mirror.mock_async(|when, then| {
        when.method(GET).path(format!("/{}/1.3.0/all-protos-1.3.0.jar", REPOSITORY));
        then.status(200).body(jar());
    }).await;

    let resolver = resolver(server.base_url(), Some(mirror.base_url()), None, cache.path());

    assert!(resolver.resolve("foo/bar.proto").await.unwrap().is_found());

    metadata.assert_hits_async(1).await;
    archive.assert_hits_async(1).await;
}

#[tokio::test]
async fn test_failed_download_leaves_no_archive() {
    let server = MockServer::start_async().await;
    let cache = tempfile::tempdir().unwrap();

    server.mock_async(|when, then| {
        when.method(GET).path(format!("/{}/2.0.0/all-protos-2.0.0.jar", REPOSITORY));
        then.status(404);
    }).await;

    let resolver = resolver(server.base_url(), None, Some("2.0.0"), cache.path());

    let result = resolver.resolve("foo/bar.proto").await;
    assert!(matches!(result, Err(Error::Repository {..})), "{:?}", result);

    assert!(!cache.path().join("all-protos-2.0.0.jar").exists());
}

#[tokio::test]
async fn test_corrupted_cached_archive() {
    let server = MockServer::start_async().await;
    let cache = tempfile::tempdir().unwrap();

    std::fs::write(cache.path().join("all-protos-0.9.0.jar"), b"definitely not a zip").unwrap();

    let resolver = resolver(server.base_url(), None, Some("0.9.0"), cache.path());

    let Err(Error::Repository {source, ..}) = resolver.resolve("foo/bar.proto").await else {
        panic!("Expected a repository error");
    };

    assert!(matches!(*source, Error::FormatError(_)));
}
