use std::{collections::BTreeMap, sync::{atomic::{AtomicUsize, Ordering}, Arc}};

use futures::future::BoxFuture;
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::error::Error;

use super::{relative_import_path, NamedContent, Resolution, Resolver, ResolverChain};

struct Stub {
    name: &'static str,
    files: BTreeMap<&'static str, &'static str>,
    fail: bool,
    calls: Arc<AtomicUsize>,
}

impl Stub {
    fn new(name: &'static str, files: &[(&'static str, &'static str)]) -> (Box<dyn Resolver>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));

        let stub = Stub {
            name,
            files: files.iter().copied().collect(),
            fail: false,
            calls: calls.clone(),
        };

        (Box::new(stub), calls)
    }

    fn failing() -> (Box<dyn Resolver>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));

        let stub = Stub {
            name: "failing",
            files: BTreeMap::new(),
            fail: true,
            calls: calls.clone(),
        };

        (Box::new(stub), calls)
    }
}

impl Resolver for Stub {
    fn resolve<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<Resolution, Error>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if self.fail {
                return Err(Error::UnsupportedRepositorySource(path.to_string()));
            }

            Ok(match self.files.get(path) {
                Some(content) => Resolution::Found(NamedContent::from_bytes(format!("{}:{}", self.name, path), content.as_bytes().to_vec())),
                None => Resolution::NotFound,
            })
        })
    }
}

#[tokio::test]
async fn test_first_match_wins() {
    let (first, first_calls) = Stub::new("first", &[("a.proto", "first")]);
    let (second, second_calls) = Stub::new("second", &[("a.proto", "second")]);

    let chain = ResolverChain::new(vec![first, second]);

    let Resolution::Found(content) = chain.resolve("a.proto").await.unwrap() else {
        panic!("Expected a.proto to be found");
    };

    assert_eq!(content.name, "first:a.proto");
    assert_eq!(content.read_to_end().await.unwrap(), b"first".to_vec());

    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
    assert_eq!(second_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_falls_through_not_found() {
    let (first, _) = Stub::new("first", &[]);
    let (second, _) = Stub::new("second", &[("a.proto", "second")]);

    let chain = ResolverChain::new(vec![first, second]);

    let Resolution::Found(content) = chain.resolve("a.proto").await.unwrap() else {
        panic!("Expected a.proto to be found");
    };

    assert_eq!(content.name, "second:a.proto");
}

#[tokio::test]
async fn test_error_aborts_the_chain() {
    let (failing, _) = Stub::failing();
    let (second, second_calls) = Stub::new("second", &[("a.proto", "second")]);

    let chain = ResolverChain::new(vec![failing, second]);

    assert!(matches!(chain.resolve("a.proto").await, Err(Error::UnsupportedRepositorySource(_))));
    assert_eq!(second_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_nothing_matches() {
    let (first, _) = Stub::new("first", &[("b.proto", "")]);

    let chain = ResolverChain::new(vec![first]);
    assert!(matches!(chain.resolve("a.proto").await, Ok(Resolution::NotFound)));

    let empty = ResolverChain::default();
    assert!(matches!(empty.resolve("a.proto").await, Ok(Resolution::NotFound)));
}

#[rstest]
#[case("foo/bar.proto", Some("foo/bar.proto"))]
#[case("./foo/./bar.proto", Some("foo/bar.proto"))]
#[case("foo//bar.proto", Some("foo/bar.proto"))]
#[case("/etc/foo.proto", None)]
#[case("../foo.proto", None)]
#[case("foo/../../bar.proto", None)]
#[case("", None)]
#[case(".", None)]
fn test_relative_import_path(#[case] import: &str, #[case] expected: Option<&str>) {
    let relative_path = relative_import_path(import);

    match expected {
        Some(expected) => assert_eq!(relative_path.unwrap(), std::path::PathBuf::from(expected)),
        None => assert!(matches!(relative_path, Err(Error::InvalidImportPath(_))), "{:?}", relative_path),
    }
}
