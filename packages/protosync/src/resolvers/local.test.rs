use pretty_assertions::assert_eq;

use crate::{error::Error, resolver::{Resolution, Resolver}};

use super::LocalResolver;

fn write(root: &std::path::Path, path: &str, content: &str) {
    let file = root.join(path);

    std::fs::create_dir_all(file.parent().unwrap()).unwrap();
    std::fs::write(file, content).unwrap();
}

#[tokio::test]
async fn test_first_root_wins() {
    let dir = tempfile::tempdir().unwrap();

    write(dir.path(), "apps/a/protos/foo/bar.proto", "from a");
    write(dir.path(), "apps/b/protos/foo/bar.proto", "from b");
    write(dir.path(), "apps/b/protos/foo/baz.proto", "baz");

    let resolver = LocalResolver::new(vec![
        format!("{}/apps/*/protos", dir.path().display()),
    ]);

    let Resolution::Found(content) = resolver.resolve("foo/bar.proto").await.unwrap() else {
        panic!("Expected foo/bar.proto to be found");
    };

    assert_eq!(content.name, dir.path().join("apps/a/protos/foo/bar.proto").to_string_lossy());
    assert_eq!(content.read_to_end().await.unwrap(), b"from a".to_vec());

    let Resolution::Found(content) = resolver.resolve("foo/baz.proto").await.unwrap() else {
        panic!("Expected foo/baz.proto to be found");
    };

    assert_eq!(content.read_to_end().await.unwrap(), b"baz".to_vec());
}

#[tokio::test]
async fn test_not_found() {
    let dir = tempfile::tempdir().unwrap();

    write(dir.path(), "protos/foo/bar.proto", "");

    let resolver = LocalResolver::new(vec![
        format!("{}/protos", dir.path().display()),
        format!("{}/missing/*", dir.path().display()),
    ]);

    assert!(matches!(resolver.resolve("foo/other.proto").await, Ok(Resolution::NotFound)));

    // Directories aren't files
    assert!(matches!(resolver.resolve("foo").await, Ok(Resolution::NotFound)));
}

#[tokio::test]
async fn test_no_includes() {
    let resolver = LocalResolver::default();

    assert!(matches!(resolver.resolve("foo/bar.proto").await, Ok(Resolution::NotFound)));
}

#[tokio::test]
async fn test_invalid_glob() {
    let resolver = LocalResolver::new(vec!["protos/***".to_string()]);

    assert!(matches!(resolver.resolve("foo/bar.proto").await, Err(Error::InvalidGlob(..))));
}

#[tokio::test]
async fn test_absolute_paths_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let outside = tempfile::tempdir().unwrap();

    write(dir.path(), "protos/foo/bar.proto", "inside");
    write(outside.path(), "secret.proto", "outside");

    let resolver = LocalResolver::new(vec![
        format!("{}/protos", dir.path().display()),
    ]);

    let absolute = outside.path().join("secret.proto").to_string_lossy().to_string();

    assert!(matches!(resolver.resolve(&absolute).await, Err(Error::InvalidImportPath(_))));
    assert!(matches!(resolver.resolve("../../secret.proto").await, Err(Error::InvalidImportPath(_))));
}
