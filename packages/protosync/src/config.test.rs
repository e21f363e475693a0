use std::{collections::BTreeMap, path::PathBuf, sync::Arc};

use indoc::indoc;
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::{error::Error, http::HttpClient, report::{Level, Report}, resolvers::{ArchiveRepository, Repository}};

use super::{expand_sources, parse_variable, Config, CONFIG_SCHEMA};

fn vars(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries.iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

#[test]
fn test_parse() {
    let config = Config::parse(indoc! {"
        dest: protos
        sources:
          - google/api/annotations.proto
        include:
          - apps/*/protos
        remote:
          bitbucketServers:
            - bitbucket.example.com
        repos:
          - url: https://github.com/googleapis/googleapis.git
            prefix: google/
          - url: git@bitbucket.example.com:scm/acme/protos.git
            root: src/main/proto
            protos:
              - common/money.proto
            commit: main
        artifactory:
          - url: https://artifactory.example.com/artifactory
            repositories:
              - name: releases/com/example/all-protos
    "}, &BTreeMap::new()).unwrap();

    assert_eq!(config.dest, Some(PathBuf::from("protos")));
    assert_eq!(config.sources, vec!["google/api/annotations.proto".to_string()]);
    assert_eq!(config.include, vec!["apps/*/protos".to_string()]);
    assert_eq!(config.cache_folder, None);
    assert_eq!(config.remote.bitbucket_servers, vec!["bitbucket.example.com".to_string()]);
    assert_eq!(config.remote.github_raw_url, "https://raw.githubusercontent.com");

    assert_eq!(config.repos, vec![
        Repository {
            url: "https://github.com/googleapis/googleapis.git".to_string(),
            prefix: Some("google/".to_string()),
            ..Repository::default()
        },
        Repository {
            url: "git@bitbucket.example.com:scm/acme/protos.git".to_string(),
            root: Some("src/main/proto".to_string()),
            protos: vec!["common/money.proto".to_string()],
            commit: Some("main".to_string()),
            ..Repository::default()
        },
    ]);

    assert_eq!(config.artifactory.len(), 1);
    assert_eq!(config.artifactory[0].download_url, None);
    assert_eq!(config.artifactory[0].repositories, vec![ArchiveRepository {
        name: "releases/com/example/all-protos".to_string(),
        version: None,
    }]);
}

#[test]
fn test_interpolation() {
    let config = Config::parse(indoc! {"
        dest: ${OUT}/protos
        repos:
          - url: https://$TOKEN@github.com/acme/protos.git
            commit: ${REV}
    "}, &vars(&[("OUT", "build"), ("TOKEN", "s3cr3t"), ("REV", "v1.0.0")])).unwrap();

    assert_eq!(config.dest, Some(PathBuf::from("build/protos")));
    assert_eq!(config.repos[0].url, "https://s3cr3t@github.com/acme/protos.git");
    assert_eq!(config.repos[0].commit.as_deref(), Some("v1.0.0"));
}

#[test]
fn test_undefined_variable() {
    let result = Config::parse("dest: ${NOPE}/protos", &vars(&[("OUT", "build")]));

    assert!(matches!(&result, Err(Error::UndefinedVariable(name)) if name == "NOPE"), "{:?}", result);
}

#[rstest]
#[case("")]
#[case("# nothing but a comment\n")]
#[case("~")]
fn test_empty_document(#[case] src: &str) {
    assert_eq!(Config::parse(src, &BTreeMap::new()).unwrap(), Config::default());
}

#[rstest]
#[case("destination: protos")]
#[case("repos:\n  - url: https://github.com/a/b.git\n    branch: main\n")]
#[case("sources: protos")]
fn test_invalid_document(#[case] src: &str) {
    let result = Config::parse(src, &BTreeMap::new());

    assert!(matches!(result, Err(Error::ConfigurationError(_))), "{:?}", result);
}

#[test]
fn test_builtin() {
    let config = Config::builtin(&BTreeMap::new()).unwrap();

    let prefixes = config.repos.iter()
        .map(|repository| repository.prefix.as_deref().unwrap_or_default())
        .collect::<Vec<_>>();

    assert_eq!(prefixes, vec!["google/protobuf/", "google/", "protoc-gen-swagger/"]);
    assert_eq!(config.repos[0].root.as_deref(), Some("src"));
    assert_eq!(config.repos[2].commit.as_deref(), Some("v1.15.2"));
    assert_eq!(config.dest, None);
}

#[test]
fn test_schema_is_a_valid_config() {
    let config = Config::parse(CONFIG_SCHEMA, &BTreeMap::new()).unwrap();

    assert_eq!(config.cache_folder, Some(PathBuf::from("/var/cache/protosync")));
    assert_eq!(config.artifactory[0].repositories[0].version.as_deref(), Some("1.2.3"));
}

#[test]
fn test_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("protosync.yml");

    std::fs::write(&path, "dest: $DEST\n").unwrap();

    let config = Config::load(&path, &vars(&[("DEST", "out")])).unwrap();
    assert_eq!(config.dest, Some(PathBuf::from("out")));

    let result = Config::load(&dir.path().join("missing.yml"), &BTreeMap::new());
    assert!(matches!(result, Err(Error::IOError(_))), "{:?}", result);
}

#[test]
fn test_expand_sources() {
    let dir = tempfile::tempdir().unwrap();

    std::fs::create_dir_all(dir.path().join("api/users/protos")).unwrap();
    std::fs::create_dir_all(dir.path().join("api/billing/protos")).unwrap();

    let pattern = format!("{}/api/*/protos", dir.path().display());

    let expanded = expand_sources(&[
        pattern,
        "google/api/annotations.proto".to_string(),
    ]).unwrap();

    assert_eq!(expanded, vec![
        format!("{}/api/billing/protos", dir.path().display()),
        format!("{}/api/users/protos", dir.path().display()),
        "google/api/annotations.proto".to_string(),
    ]);
}

#[test]
fn test_resolve() {
    let cache = tempfile::tempdir().unwrap();

    let config = Config {
        cache_folder: Some(cache.path().to_path_buf()),
        sources: vec!["foo/bar.proto".to_string()],
        artifactory: Config::parse(CONFIG_SCHEMA, &BTreeMap::new()).unwrap().artifactory,
        ..Config::default()
    };

    let (report, _) = Report::buffered(Level::Info);
    let (resolvers, sources) = config.resolve(HttpClient::new().unwrap(), Arc::new(report)).unwrap();

    // Local, remote, then one per archive
    assert_eq!(resolvers.len(), 3);
    assert_eq!(sources, vec!["foo/bar.proto".to_string()]);
}

#[rstest]
#[case("KEY=value", Some(("KEY", "value")))]
#[case("KEY=a=b", Some(("KEY", "a=b")))]
#[case("KEY=", Some(("KEY", "")))]
#[case("=value", None)]
#[case("KEY", None)]
fn test_parse_variable(#[case] src: &str, #[case] expected: Option<(&str, &str)>) {
    let expected = expected
        .map(|(key, value)| (key.to_string(), value.to_string()));

    assert_eq!(parse_variable(src).ok(), expected);
}
