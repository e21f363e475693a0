use std::{collections::BTreeMap, path::PathBuf, sync::Arc};

use clap::Parser;

use crate::{
    config::{parse_variable, Config, CONFIG_FILENAME, CONFIG_SCHEMA},
    error::Error,
    http::HttpClient,
    report::{Level, Report},
    resolver::ResolverChain,
    resolvers::LocalResolver,
};

fn existing_dir(src: &str) -> Result<PathBuf, String> {
    let path
        = PathBuf::from(src);

    if !path.is_dir() {
        return Err(format!("{} is not an existing directory", src));
    }

    Ok(path)
}

/// Sync the transitive import closure of a set of .proto files to a local
/// directory
#[derive(Debug, Parser)]
#[command(name = "protosync", version)]
#[command(long_about = "\
Sync the transitive import closure of a set of .proto files to a local
directory.

A configuration file tells protosync where to look for .proto files. It then
retrieves and parses the .proto files given on the command line, recursively
retrieving all their imports. Run with --print-schema to see the configuration
format.")]
pub struct SyncCommand {
    /// Protosync configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Set a variable for interpolating into the configuration
    #[arg(long, value_name = "KEY=VALUE", value_parser = parse_variable)]
    set: Vec<(String, String)>,

    /// Destination root to sync files to
    #[arg(short, long, value_name = "DIR", value_parser = existing_dir)]
    dest: Option<PathBuf>,

    /// Additional local include roots to search, and scan for dependencies to
    /// resolve
    #[arg(short = 'I', long, value_name = "DIR")]
    includes: Vec<String>,

    /// Don't include the set of default repositories
    #[arg(long)]
    no_defaults: bool,

    /// Minimum level of the messages to print
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: Level,

    /// Print a commented example configuration and exit
    #[arg(long)]
    print_schema: bool,

    /// Additional proto files (or local roots) to sync
    sources: Vec<String>,
}

impl SyncCommand {
    pub fn report(&self) -> Arc<Report> {
        Arc::new(Report::new(self.log_level))
    }

    pub async fn execute(&self, report: Arc<Report>) -> Result<(), Error> {
        if self.print_schema {
            print!("{}", CONFIG_SCHEMA);
            return Ok(());
        }

        let vars: BTreeMap<String, String> = self.set.iter()
            .cloned()
            .collect();

        let config
            = self.load_config(&vars)?;

        let dest = self.dest.clone()
            .or_else(|| config.dest.clone())
            .ok_or(Error::MissingDestination)?;

        let http_client
            = HttpClient::new()?;

        let (mut resolvers, mut sources)
            = config.resolve(http_client, report.clone())?;

        resolvers.push(Box::new(LocalResolver::new(self.includes.clone())));

        sources.extend(self.sources.iter().cloned());
        sources.extend(self.includes.iter().cloned());

        if sources.is_empty() {
            return Err(Error::MissingSources);
        }

        tokio::fs::create_dir_all(&dest).await?;

        let chain
            = ResolverChain::new(resolvers);

        let synced
            = crate::sync(&chain, &dest, &sources, report.clone()).await?;

        report.debug(format!("Synced {} files", synced.len()));

        Ok(())
    }

    fn load_config(&self, vars: &BTreeMap<String, String>) -> Result<Config, Error> {
        if let Some(path) = &self.config {
            return Config::load(path, vars);
        }

        if self.no_defaults {
            return Ok(Config::default());
        }

        let local_config
            = PathBuf::from(CONFIG_FILENAME);

        if local_config.is_file() {
            Config::load(&local_config, vars)
        } else {
            Config::builtin(vars)
        }
    }
}
