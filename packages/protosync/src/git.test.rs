use std::{path::Path, process::Command, sync::Arc};

use pretty_assertions::assert_eq;

use crate::{error::Error, report::{Level, Report}};

use super::Cloner;

fn git(cwd: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(["-c", "user.name=protosync", "-c", "user.email=protosync@example.com", "-c", "commit.gpgsign=false"])
        .args(args)
        .current_dir(cwd)
        .status()
        .unwrap();

    assert!(status.success(), "git {:?} failed", args);
}

fn commit_file(repo: &Path, path: &str, content: &str) {
    let file = repo.join(path);

    std::fs::create_dir_all(file.parent().unwrap()).unwrap();
    std::fs::write(&file, content).unwrap();

    git(repo, &["add", "."]);
    git(repo, &["commit", "--quiet", "-m", path]);
}

fn upstream() -> (tempfile::TempDir, String) {
    let dir = tempfile::tempdir().unwrap();

    git(dir.path(), &["init", "--quiet"]);
    git(dir.path(), &["symbolic-ref", "HEAD", "refs/heads/master"]);

    commit_file(dir.path(), "protos/a.proto", "first");

    let url = format!("file://{}", dir.path().display());
    (dir, url)
}

fn cloner(cache: &Path) -> Cloner {
    let (report, _) = Report::buffered(Level::Trace);
    Cloner::new(cache, Arc::new(report))
}

#[tokio::test]
async fn test_clone_and_open() {
    let (_upstream, url) = upstream();
    let cache = tempfile::tempdir().unwrap();

    let content = cloner(cache.path()).open(&url, "master", "protos/a.proto").await.unwrap();

    assert_eq!(content.name, format!("{} + protos/a.proto", url));
    assert_eq!(content.read_to_end().await.unwrap(), b"first".to_vec());

    let clones = std::fs::read_dir(cache.path().join("protosync")).unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect::<Vec<_>>();

    // The temporary clone directory was renamed into place, not left behind
    assert_eq!(clones.len(), 1);
}

#[tokio::test]
async fn test_existing_clone_is_refreshed() {
    let (upstream, url) = upstream();
    let cache = tempfile::tempdir().unwrap();

    let first = cloner(cache.path()).open(&url, "master", "protos/a.proto").await.unwrap();
    assert_eq!(first.read_to_end().await.unwrap(), b"first".to_vec());

    commit_file(upstream.path(), "protos/a.proto", "second");

    let second = cloner(cache.path()).open(&url, "master", "protos/a.proto").await.unwrap();
    assert_eq!(second.read_to_end().await.unwrap(), b"second".to_vec());
}

#[tokio::test]
async fn test_checkout_is_prepared_once_per_run() {
    let (upstream, url) = upstream();
    let cache = tempfile::tempdir().unwrap();

    let cloner = cloner(cache.path());

    cloner.checkout(&url, "master").await.unwrap();

    commit_file(upstream.path(), "protos/a.proto", "second");

    let content = cloner.open(&url, "master", "protos/a.proto").await.unwrap();
    assert_eq!(content.read_to_end().await.unwrap(), b"first".to_vec());
}

#[tokio::test]
async fn test_tag_revision() {
    let (upstream, url) = upstream();
    let cache = tempfile::tempdir().unwrap();

    git(upstream.path(), &["tag", "v1.0.0"]);
    commit_file(upstream.path(), "protos/a.proto", "second");

    let content = cloner(cache.path()).open(&url, "v1.0.0", "protos/a.proto").await.unwrap();
    assert_eq!(content.read_to_end().await.unwrap(), b"first".to_vec());
}

#[tokio::test]
async fn test_missing_file_in_checkout() {
    let (_upstream, url) = upstream();
    let cache = tempfile::tempdir().unwrap();

    let result = cloner(cache.path()).open(&url, "master", "protos/missing.proto").await;
    assert!(matches!(result, Err(Error::IOError(_))));
}

#[tokio::test]
async fn test_failed_clone() {
    let cache = tempfile::tempdir().unwrap();

    let cloner = cloner(cache.path())
        .with_env("GIT_ALLOW_PROTOCOL", "file");

    let result = cloner.open("https://github.com/org/repo.git", "master", "a.proto").await;
    assert!(matches!(result, Err(Error::GitFailed {..})), "{:?}", result.err());

    // Nothing that looks like a valid clone was left in the cache
    let leftovers = std::fs::read_dir(cache.path().join("protosync")).unwrap().count();
    assert_eq!(leftovers, 0);
}
