use std::path::Path;

use pretty_assertions::assert_eq;
use rstest::rstest;

use super::{archive_path, clone_path};

#[rstest]
#[case("https://github.com/googleapis/googleapis.git", "googleapis.git-")]
#[case("git@github.com:org/repo.git", "repo.git-")]
#[case("git@host:repo", "repo-")]
#[case("file:///tmp/fixtures/repo/", "repo-")]
fn test_clone_path_name(#[case] url: &str, #[case] prefix: &str) {
    let path = clone_path(Path::new("/cache"), url, "master");

    assert_eq!(path.parent(), Some(Path::new("/cache/protosync")));

    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with(prefix), "{} should start with {}", name, prefix);
    assert_eq!(name.len(), prefix.len() + 64);
}

#[test]
fn test_clone_path_depends_on_revision() {
    let cache = Path::new("/cache");
    let url = "https://github.com/googleapis/googleapis.git";

    assert_eq!(clone_path(cache, url, "master"), clone_path(cache, url, "master"));
    assert_ne!(clone_path(cache, url, "master"), clone_path(cache, url, "v1.0.0"));
}

#[test]
fn test_archive_path() {
    assert_eq!(
        archive_path(Path::new("/cache"), "all-protos", "1.2.3"),
        Path::new("/cache/all-protos-1.2.3.jar"),
    );
}
