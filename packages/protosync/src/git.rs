use std::{collections::BTreeMap, path::{Path, PathBuf}, process::Stdio, sync::Arc};

use dashmap::DashMap;
use tokio::sync::OnceCell;

use crate::{cache, error::Error, report::Report, resolver::NamedContent};

#[cfg(test)]
#[path = "./git.test.rs"]
mod tests;

fn make_git_env() -> BTreeMap<String, String> {
    let mut env = BTreeMap::new();

    env.insert("GIT_TERMINAL_PROMPT".to_string(), "0".to_string());

    if let Err(std::env::VarError::NotPresent) = std::env::var("GIT_SSH_COMMAND") {
        let ssh = std::env::var("GIT_SSH").unwrap_or("ssh".to_string());
        let ssh_command = format!("{} -o BatchMode=yes", ssh);

        env.insert("GIT_SSH_COMMAND".to_string(), ssh_command);
    }

    env
}

/**
 * Keeps checkouts of remote repositories under `<cache>/protosync`, one per
 * url and revision. Checkouts survive across runs; within a run each of them
 * is cloned (or refreshed) and checked out at most once, no matter how many
 * files get read from it.
 */
pub struct Cloner {
    cache_dir: PathBuf,
    env: BTreeMap<String, String>,
    report: Arc<Report>,
    prepared: DashMap<PathBuf, Arc<OnceCell<()>>>,
}

impl Cloner {
    pub fn new(cache_dir: impl Into<PathBuf>, report: Arc<Report>) -> Self {
        Cloner {
            cache_dir: cache_dir.into(),
            env: make_git_env(),
            report,
            prepared: DashMap::new(),
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub async fn open(&self, url: &str, revision: &str, path: &str) -> Result<NamedContent, Error> {
        let checkout
            = self.checkout(url, revision).await?;

        let file
            = tokio::fs::File::open(checkout.join(path)).await?;

        Ok(NamedContent::new(format!("{} + {}", url, path), Box::pin(file)))
    }

    pub async fn checkout(&self, url: &str, revision: &str) -> Result<PathBuf, Error> {
        let dest
            = cache::clone_path(&self.cache_dir, url, revision);

        let cell = self.prepared.entry(dest.clone())
            .or_default()
            .clone();

        cell.get_or_try_init(|| self.prepare(url, revision, &dest)).await?;

        Ok(dest)
    }

    async fn prepare(&self, url: &str, revision: &str, dest: &Path) -> Result<(), Error> {
        if tokio::fs::try_exists(dest.join(".git")).await? {
            self.run(dest, &["fetch", "--quiet", "--tags", "--prune", "origin"]).await?;
        } else {
            self.clone_into(url, dest).await?;
        }

        let remote_branch
            = format!("origin/{}", revision);

        let target = match self.run(dest, &["rev-parse", "--verify", "--quiet", &format!("{}^{{commit}}", remote_branch)]).await {
            Ok(_) => remote_branch,
            Err(_) => revision.to_string(),
        };

        self.run(dest, &["checkout", "--quiet", "--detach", &target]).await?;

        Ok(())
    }

    async fn clone_into(&self, url: &str, dest: &Path) -> Result<(), Error> {
        let parent = dest.parent()
            .unwrap_or(&self.cache_dir);

        tokio::fs::create_dir_all(parent).await?;

        let prefix = dest.file_name()
            .map(|name| format!("{}-", name.to_string_lossy()))
            .unwrap_or_default();

        // Dropping the guard cleans up after a failed clone
        let temp_dir = tempfile::Builder::new()
            .prefix(&prefix)
            .tempdir_in(parent)?;

        let temp_path
            = temp_dir.path().to_string_lossy().to_string();

        self.run(parent, &["clone", "--quiet", "-c", "core.autocrlf=false", url, &temp_path]).await?;

        if let Err(err) = tokio::fs::rename(temp_dir.path(), dest).await {
            // Someone else renamed their own clone into place first
            if !tokio::fs::try_exists(dest.join(".git")).await? {
                return Err(err.into());
            }
        }

        Ok(())
    }

    async fn run(&self, cwd: &Path, args: &[&str]) -> Result<String, Error> {
        let command
            = format!("git {}", args.join(" "));

        self.report.trace(&command);

        let output = tokio::process::Command::new("git")
            .args(args)
            .current_dir(cwd)
            .envs(&self.env)
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            return Err(Error::GitFailed {
                command,
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
