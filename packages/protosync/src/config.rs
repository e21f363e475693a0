use std::{collections::BTreeMap, path::{Path, PathBuf}, sync::Arc};

use serde::Deserialize;
use serde_yaml::Value;

use crate::{
    cache,
    error::Error,
    git::Cloner,
    http::HttpClient,
    report::Report,
    resolver::Resolver,
    resolvers::{ArchiveResolver, ArchiveSettings, LocalResolver, RemoteResolver, RemoteSettings, Repository},
};

#[cfg(test)]
#[path = "./config.test.rs"]
mod tests;

pub const CONFIG_FILENAME: &str = "protosync.yml";

pub const BUILTIN_CONFIG: &str = "\
repos:
  - url: https://github.com/protocolbuffers/protobuf.git
    prefix: google/protobuf/
    root: src

  - url: https://github.com/googleapis/googleapis.git
    prefix: google/

  - url: https://github.com/grpc-ecosystem/grpc-gateway.git
    prefix: protoc-gen-swagger/
    commit: v1.15.2
";

pub const CONFIG_SCHEMA: &str = "\
# Destination where .proto files will be stored.
dest: protos

# Remote imports (.proto files) or local roots to resolve imports from.
# Entries are glob patterns; a pattern matching nothing is kept as is.
sources:
  - api/*/protos
  - google/api/annotations.proto

# Globbed local include roots to search for .proto files.
include:
  - apps/*/protos

# Where clones and downloaded archives are kept. Defaults to the user cache
# folder.
cacheFolder: /var/cache/protosync

remote:
  # Hostnames to treat as Bitbucket Server instances.
  bitbucketServers:
    - bitbucket.example.com

  # Where raw GitHub files are downloaded from.
  githubRawUrl: https://raw.githubusercontent.com

# Source repositories, matched in order against each import.
repos:
  - url: git@bitbucket.example.com:scm/acme/protos.git
    # Root path in the repository to search for protos.
    root: src/main/proto
    # Prefix of the imports served by this repository.
    prefix: acme/
    # Specific files served by this repository.
    protos:
      - common/money.proto
    # Revision to retrieve files from. Defaults to master.
    commit: main

# Archives (JAR files) published to an Artifactory-like repository manager.
artifactory:
  - url: https://artifactory.example.com/artifactory
    # Mirror to download archives from. Defaults to url.
    downloadUrl: https://mirror.example.com/artifactory
    repositories:
      - name: jar-releases/com/example/protos/all-protos
        # Defaults to the latest published version.
        version: 1.2.3
";

/// Contents of a `protosync.yml` file.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub dest: Option<PathBuf>,

    #[serde(default)]
    pub sources: Vec<String>,

    #[serde(default)]
    pub include: Vec<String>,

    #[serde(default)]
    pub cache_folder: Option<PathBuf>,

    #[serde(default)]
    pub remote: RemoteSettings,

    #[serde(default)]
    pub repos: Vec<Repository>,

    #[serde(default)]
    pub artifactory: Vec<ArchiveSettings>,
}

impl Config {
    /// Parses a configuration document. Variables (`$NAME` or `${NAME}`) found
    /// in any string are replaced by their value from `vars` beforehand.
    pub fn parse(src: &str, vars: &BTreeMap<String, String>) -> Result<Config, Error> {
        let mut value: Value
            = serde_yaml::from_str(src)?;

        if value.is_null() {
            return Ok(Config::default());
        }

        interpolate(&mut value, vars)?;

        Ok(serde_yaml::from_value(value)?)
    }

    pub fn load(path: &Path, vars: &BTreeMap<String, String>) -> Result<Config, Error> {
        let src
            = std::fs::read_to_string(path)?;

        Config::parse(&src, vars)
    }

    pub fn builtin(vars: &BTreeMap<String, String>) -> Result<Config, Error> {
        Config::parse(BUILTIN_CONFIG, vars)
    }

    pub fn cache_dir(&self) -> Result<PathBuf, Error> {
        match &self.cache_folder {
            Some(cache_folder) => Ok(cache_folder.clone()),
            None => cache::default_cache_dir(),
        }
    }

    /// Turns the configuration into the resolvers to query, in order, and the
    /// glob-expanded list of sources.
    pub fn resolve(&self, http_client: Arc<HttpClient>, report: Arc<Report>) -> Result<(Vec<Box<dyn Resolver>>, Vec<String>), Error> {
        let cache_dir
            = self.cache_dir()?;

        let cloner
            = Arc::new(Cloner::new(&cache_dir, report.sub("git")));

        let mut resolvers: Vec<Box<dyn Resolver>> = vec![
            Box::new(LocalResolver::new(self.include.clone())),
            Box::new(RemoteResolver::new(self.remote.clone(), self.repos.clone(), http_client.clone(), cloner, report.sub("remote"))),
        ];

        for artifactory in &self.artifactory {
            for repository in &artifactory.repositories {
                let report
                    = report.sub(repository.artifact());

                resolvers.push(Box::new(ArchiveResolver::new(artifactory, repository.clone(), &cache_dir, http_client.clone(), report)));
            }
        }

        let sources
            = expand_sources(&self.sources)?;

        Ok((resolvers, sources))
    }
}

pub fn expand_sources(sources: &[String]) -> Result<Vec<String>, Error> {
    let mut expanded
        = Vec::new();

    for source in sources {
        let matches = glob::glob(source)
            .map_err(|err| Error::InvalidGlob(source.clone(), err.to_string()))?
            .map(|entry| entry.map(|path| path.to_string_lossy().to_string()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| Error::from(err.into_error()))?;

        if matches.is_empty() {
            expanded.push(source.clone());
        } else {
            expanded.extend(matches);
        }
    }

    Ok(expanded)
}

fn interpolate(value: &mut Value, vars: &BTreeMap<String, String>) -> Result<(), Error> {
    match value {
        Value::String(string) => {
            let interpolated = shellexpand::env_with_context(string, |name| {
                vars.get(name)
                    .map(Some)
                    .ok_or(())
            }).map_err(|err| Error::UndefinedVariable(err.var_name))?;

            *string = interpolated.into_owned();
        },

        Value::Sequence(sequence) => {
            for value in sequence {
                interpolate(value, vars)?;
            }
        },

        Value::Mapping(mapping) => {
            for (_, value) in mapping.iter_mut() {
                interpolate(value, vars)?;
            }
        },

        Value::Tagged(tagged) => {
            interpolate(&mut tagged.value, vars)?;
        },

        Value::Null | Value::Bool(_) | Value::Number(_) => {},
    }

    Ok(())
}

/// Parses the `KEY=VALUE` syntax of `--set`.
pub fn parse_variable(src: &str) -> Result<(String, String), Error> {
    match src.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(Error::InvalidVariableAssignment(src.to_string())),
    }
}
