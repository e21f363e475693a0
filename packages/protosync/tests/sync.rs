use std::{collections::BTreeMap, path::Path, sync::{Arc, Mutex}};

use futures::future::BoxFuture;
use pretty_assertions::assert_eq;
use protosync::{error::Error, report::{Level, Report}, resolver::{NamedContent, Resolution, Resolver}};
use rstest::rstest;

/// Serves files from memory, counting how many times each path was asked for.
#[derive(Default)]
struct MemoryResolver {
    files: BTreeMap<String, Vec<u8>>,
    calls: Mutex<BTreeMap<String, usize>>,
}

impl MemoryResolver {
    fn new(files: &[(&str, &str)]) -> Self {
        MemoryResolver {
            files: files.iter().map(|(path, src)| (path.to_string(), src.as_bytes().to_vec())).collect(),
            calls: Mutex::new(BTreeMap::new()),
        }
    }

    fn with_bytes(mut self, path: &str, data: &[u8]) -> Self {
        self.files.insert(path.to_string(), data.to_vec());
        self
    }

    fn calls(&self, path: &str) -> usize {
        self.calls.lock().unwrap().get(path).copied().unwrap_or_default()
    }

    fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

impl Resolver for MemoryResolver {
    fn resolve<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<Resolution, Error>> {
        Box::pin(async move {
            *self.calls.lock().unwrap().entry(path.to_string()).or_default() += 1;

            Ok(match self.files.get(path) {
                Some(data) => Resolution::Found(NamedContent::from_bytes(format!("memory:{}", path), data.clone())),
                None => Resolution::NotFound,
            })
        })
    }
}

struct FailingResolver;

impl Resolver for FailingResolver {
    fn resolve<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<Resolution, Error>> {
        Box::pin(async move {
            Err(Error::UnsupportedRepositorySource(path.to_string()))
        })
    }
}

fn report() -> Arc<Report> {
    Arc::new(Report::buffered(Level::Trace).0)
}

fn sources(sources: &[&str]) -> Vec<String> {
    sources.iter().map(|source| source.to_string()).collect()
}

fn write(root: &Path, path: &str, src: &str) {
    let path = root.join(path);

    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, src).unwrap();
}

#[tokio::test]
async fn test_sync_writes_exact_copies() {
    let dest = tempfile::tempdir().unwrap();

    let src = "syntax = \"proto3\";\n\npackage acme.users;\n\nmessage User {\n  string id = 1;\n}\n";
    let resolver = MemoryResolver::new(&[("acme/users/user.proto", src)]);

    let synced = protosync::sync(&resolver, dest.path(), &sources(&["acme/users/user.proto"]), report()).await.unwrap();

    assert_eq!(synced, vec!["acme/users/user.proto".to_string()]);
    assert_eq!(std::fs::read_to_string(dest.path().join("acme/users/user.proto")).unwrap(), src);
}

#[tokio::test]
async fn test_sync_terminates_on_cycles() {
    let dest = tempfile::tempdir().unwrap();

    let resolver = MemoryResolver::new(&[
        ("a.proto", "syntax = \"proto3\";\nimport \"b.proto\";\n"),
        ("b.proto", "syntax = \"proto3\";\nimport \"a.proto\";\n"),
    ]);

    let synced = protosync::sync(&resolver, dest.path(), &sources(&["a.proto"]), report()).await.unwrap();

    assert_eq!(synced, vec!["a.proto".to_string(), "b.proto".to_string()]);
    assert_eq!(resolver.calls("a.proto"), 1);
    assert_eq!(resolver.calls("b.proto"), 1);
}

#[tokio::test]
async fn test_sync_fetches_each_import_once() {
    let dest = tempfile::tempdir().unwrap();

    let resolver = MemoryResolver::new(&[
        ("app.proto", "import \"left.proto\";\nimport \"right.proto\";\nimport public \"common/base.proto\";\n"),
        ("left.proto", "import \"common/base.proto\";\n"),
        ("right.proto", "import weak \"common/base.proto\";\n"),
        ("common/base.proto", "package common;\n"),
    ]);

    let synced = protosync::sync(&resolver, dest.path(), &sources(&["app.proto", "left.proto"]), report()).await.unwrap();

    assert_eq!(synced, vec![
        "app.proto".to_string(),
        "common/base.proto".to_string(),
        "left.proto".to_string(),
        "right.proto".to_string(),
    ]);

    assert_eq!(resolver.calls("common/base.proto"), 1);
    assert_eq!(resolver.total_calls(), synced.len());
}

#[tokio::test]
async fn test_sync_is_idempotent() {
    let dest = tempfile::tempdir().unwrap();

    let resolver = MemoryResolver::new(&[
        ("a.proto", "import \"b/c.proto\";\n"),
        ("b/c.proto", "package b;\n"),
    ]);

    let first = protosync::sync(&resolver, dest.path(), &sources(&["a.proto"]), report()).await.unwrap();
    let second = protosync::sync(&resolver, dest.path(), &sources(&["a.proto"]), report()).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(std::fs::read_to_string(dest.path().join("b/c.proto")).unwrap(), "package b;\n");
}

#[tokio::test]
async fn test_local_roots_shadow_imports() {
    let dest = tempfile::tempdir().unwrap();
    let local = tempfile::tempdir().unwrap();

    write(local.path(), "acme/money.proto", "package acme;\n");

    let resolver = MemoryResolver::new(&[
        ("order.proto", "import \"acme/money.proto\";\nimport \"google/type/date.proto\";\n"),
        ("google/type/date.proto", "package google.type;\n"),
        ("acme/money.proto", "package remote;\n"),
    ]);

    let root = local.path().to_string_lossy().to_string();
    let synced = protosync::sync(&resolver, dest.path(), &[root, "order.proto".to_string()], report()).await.unwrap();

    assert_eq!(synced, vec!["google/type/date.proto".to_string(), "order.proto".to_string()]);
    assert_eq!(resolver.calls("acme/money.proto"), 0);
    assert!(!dest.path().join("acme/money.proto").exists());
}

#[tokio::test]
async fn test_local_roots_are_scanned() {
    let dest = tempfile::tempdir().unwrap();
    let local = tempfile::tempdir().unwrap();

    write(local.path(), "svc/users.proto", "syntax = \"proto3\";\nimport \"google/api/annotations.proto\";\nimport \"svc/common.proto\";\n");
    write(local.path(), "svc/common.proto", "import \"google/protobuf/empty.proto\";\n");
    write(local.path(), "README.md", "import \"not/a/proto.proto\";\n");

    let resolver = MemoryResolver::new(&[
        ("google/api/annotations.proto", "import \"google/api/http.proto\";\n"),
        ("google/api/http.proto", "package google.api;\n"),
        ("google/protobuf/empty.proto", "package google.protobuf;\n"),
    ]);

    let root = local.path().to_string_lossy().to_string();
    let synced = protosync::sync(&resolver, dest.path(), &[root], report()).await.unwrap();

    assert_eq!(synced, vec![
        "google/api/annotations.proto".to_string(),
        "google/api/http.proto".to_string(),
        "google/protobuf/empty.proto".to_string(),
    ]);

    assert_eq!(resolver.calls("svc/common.proto"), 0);
    assert_eq!(resolver.calls("not/a/proto.proto"), 0);
}

#[tokio::test]
async fn test_unresolved_source() {
    let dest = tempfile::tempdir().unwrap();
    let resolver = MemoryResolver::default();

    let result = protosync::sync(&resolver, dest.path(), &sources(&["missing.proto"]), report()).await;

    assert!(matches!(&result, Err(Error::Unresolved(path)) if path == "missing.proto"), "{:?}", result);
}

#[tokio::test]
async fn test_unresolved_import_has_its_position() {
    let dest = tempfile::tempdir().unwrap();

    let resolver = MemoryResolver::new(&[
        ("a.proto", "syntax = \"proto3\";\n\n  import \"missing.proto\";\n"),
    ]);

    let Err(err) = protosync::sync(&resolver, dest.path(), &sources(&["a.proto"]), report()).await else {
        panic!("Expected the sync to fail");
    };

    let Error::AtPosition {file, position, source} = &err else {
        panic!("Expected a positioned error, got {:?}", err);
    };

    assert_eq!(file, &dest.path().join("a.proto").to_string_lossy().to_string());
    assert_eq!((position.line, position.column), (3, 3));
    assert!(matches!(source.as_ref(), Error::Unresolved(path) if path == "missing.proto"));

    assert_eq!(err.to_string(), format!(
        "{}:3:3: Could not resolve \"missing.proto\", may need resolver config to be updated",
        dest.path().join("a.proto").to_string_lossy(),
    ));
}

#[tokio::test]
async fn test_resolver_errors_are_fatal() {
    let dest = tempfile::tempdir().unwrap();

    let result = protosync::sync(&FailingResolver, dest.path(), &sources(&["a.proto"]), report()).await;

    let Err(Error::ResolveFailed {import, source}) = result else {
        panic!("Expected a resolve error");
    };

    assert_eq!(import, "a.proto");
    assert!(matches!(*source, Error::UnsupportedRepositorySource(_)));
}

#[tokio::test]
async fn test_unparsable_file() {
    let dest = tempfile::tempdir().unwrap();

    let resolver = MemoryResolver::new(&[
        ("a.proto", "import \"b.proto\"\n"),
    ]);

    let result = protosync::sync(&resolver, dest.path(), &sources(&["a.proto"]), report()).await;

    assert!(matches!(&result, Err(Error::ResolveFailed {source, ..}) if matches!(source.as_ref(), Error::ParseError(_))), "{:?}", result);
}

#[tokio::test]
async fn test_import_decisions_are_logged() {
    let dest = tempfile::tempdir().unwrap();
    let (report, lines) = Report::buffered(Level::Trace);

    let resolver = MemoryResolver::new(&[
        ("a.proto", "package a;\nimport \"b.proto\";\n"),
        ("b.proto", "package b;\nimport \"a.proto\";\n"),
    ]);

    protosync::sync(&resolver, dest.path(), &sources(&["a.proto"]), Arc::new(report)).await.unwrap();

    let lines = lines.lock().unwrap().clone();

    assert!(lines.contains(&"trace: a imports b.proto (fetch)".to_string()), "{:?}", lines);
    assert!(lines.contains(&"trace: b imports a.proto (cached)".to_string()), "{:?}", lines);
    assert!(lines.contains(&format!("info: memory:a.proto -> {}", dest.path().join("a.proto").display())), "{:?}", lines);
}

#[tokio::test]
async fn test_absolute_imports_stay_out_of_the_host() {
    let dest = tempfile::tempdir().unwrap();
    let outside = tempfile::tempdir().unwrap();

    let target = outside.path().join("evil.proto");
    let src = format!("import \"{}\";\n", target.display());

    let resolver = MemoryResolver::new(&[("a.proto", src.as_str())])
        .with_bytes(&target.to_string_lossy(), b"package evil;\n");

    let Err(err) = protosync::sync(&resolver, dest.path(), &sources(&["a.proto"]), report()).await else {
        panic!("Expected the sync to fail");
    };

    let Error::AtPosition {position, source, ..} = &err else {
        panic!("Expected a positioned error, got {:?}", err);
    };

    assert_eq!((position.line, position.column), (1, 1));
    assert!(matches!(source.as_ref(), Error::InvalidImportPath(_)), "{:?}", source);

    assert!(!target.exists());
    assert_eq!(resolver.calls(&target.to_string_lossy()), 0);
}

#[rstest]
#[case("../escape.proto")]
#[case("nested/../../escape.proto")]
#[tokio::test]
async fn test_parent_imports_are_rejected(#[case] import: &str) {
    let parent = tempfile::tempdir().unwrap();
    let dest = parent.path().join("dest");

    std::fs::create_dir(&dest).unwrap();

    let src = format!("import \"{}\";\n", import);
    let resolver = MemoryResolver::new(&[("a.proto", src.as_str()), (import, "package escape;\n")]);

    let result = protosync::sync(&resolver, &dest, &sources(&["a.proto"]), report()).await;

    assert!(matches!(&result, Err(Error::AtPosition {source, ..}) if matches!(source.as_ref(), Error::InvalidImportPath(_))), "{:?}", result);
    assert!(!parent.path().join("escape.proto").exists());
}

#[tokio::test]
async fn test_absolute_sources_are_rejected() {
    let dest = tempfile::tempdir().unwrap();
    let resolver = MemoryResolver::new(&[("/a.proto", "package a;\n")]);

    let result = protosync::sync(&resolver, dest.path(), &sources(&["/a.proto"]), report()).await;

    assert!(matches!(&result, Err(Error::InvalidImportPath(path)) if path == "/a.proto"), "{:?}", result);
    assert_eq!(resolver.total_calls(), 0);
}

#[tokio::test]
async fn test_non_utf8_files_are_copied_verbatim() {
    let dest = tempfile::tempdir().unwrap();

    let src = b"// caf\xe9\nsyntax = \"proto3\";\npackage x;\nimport \"y.proto\";\n";

    let resolver = MemoryResolver::new(&[("y.proto", "package y;\n")])
        .with_bytes("x.proto", src);

    let synced = protosync::sync(&resolver, dest.path(), &sources(&["x.proto"]), report()).await.unwrap();

    assert_eq!(synced, vec!["x.proto".to_string(), "y.proto".to_string()]);
    assert_eq!(std::fs::read(dest.path().join("x.proto")).unwrap(), src.to_vec());
}

#[tokio::test]
async fn test_non_utf8_local_roots_are_scanned() {
    let dest = tempfile::tempdir().unwrap();
    let local = tempfile::tempdir().unwrap();

    std::fs::write(local.path().join("svc.proto"), b"// \xff\xfe\nimport \"dep.proto\";\n").unwrap();

    let resolver = MemoryResolver::new(&[("dep.proto", "package dep;\n")]);

    let root = local.path().to_string_lossy().to_string();
    let synced = protosync::sync(&resolver, dest.path(), &[root], report()).await.unwrap();

    assert_eq!(synced, vec!["dep.proto".to_string()]);
}

#[tokio::test]
async fn test_missing_local_root() {
    let dest = tempfile::tempdir().unwrap();
    let missing = dest.path().join("does-not-exist");

    let result = protosync::sync(&MemoryResolver::default(), dest.path(), &[missing.to_string_lossy().to_string()], report()).await;

    let Err(err) = result else {
        panic!("Expected the sync to fail");
    };

    assert!(matches!(&err, Error::WalkError(path, _) if path == &missing), "{:?}", err);
    assert!(err.to_string().starts_with("Failed to walk "), "{}", err);
}
