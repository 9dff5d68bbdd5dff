/*!

Mock implementations of [`Host`] and [`K8sClient`] so that a vendor plugin pipeline can be run
without a build machine or a cluster.

[`MockHost`] records every command it is asked to run and answers from a small script: commands
starting with a configured prefix fail, `cat` of a Dockerfile prints [`DOCKERFILE`], everything
else succeeds silently.

!*/

use async_trait::async_trait;
use dpu_plugins::{CommandOutput, Host, K8sClient, Result};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub(crate) const DOCKERFILE: &str = "FROM golang:1.21 AS builder\nRUN make\nFROM fedora:39\n";

#[derive(Debug, Default)]
pub(crate) struct MockHost {
    pub(crate) local: bool,
    pub(crate) dockerfile: Option<String>,
    /// Commands starting with one of these exit with code 2.
    pub(crate) failing: Vec<String>,
    pub(crate) commands: Mutex<Vec<String>>,
    pub(crate) envs: Mutex<Vec<Vec<(String, String)>>>,
    /// The working directory of the process when each command ran.
    pub(crate) working_dirs: Mutex<Vec<PathBuf>>,
    pub(crate) copies: Mutex<Vec<(PathBuf, PathBuf)>>,
}

impl MockHost {
    pub(crate) fn local() -> Self {
        Self {
            local: true,
            ..Self::default()
        }
    }

    pub(crate) fn remote() -> Self {
        Self::default()
    }

    pub(crate) fn failing(mut self, prefix: &str) -> Self {
        self.failing.push(prefix.to_string());
        self
    }

    pub(crate) fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl Host for MockHost {
    fn hostname(&self) -> &str {
        if self.local {
            "localhost"
        } else {
            "dpu-host"
        }
    }

    fn is_localhost(&self) -> bool {
        self.local
    }

    async fn run_with_env(&self, command: &str, env: &[(&str, &str)]) -> Result<CommandOutput> {
        self.commands.lock().unwrap().push(command.to_string());
        self.envs.lock().unwrap().push(
            env.iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        );
        self.working_dirs
            .lock()
            .unwrap()
            .push(std::env::current_dir().unwrap());
        if self
            .failing
            .iter()
            .any(|prefix| command.starts_with(prefix.as_str()))
        {
            return Ok(CommandOutput {
                stdout: String::new(),
                stderr: format!("{} failed", command),
                code: 2,
            });
        }
        let stdout = if command.starts_with("cat ") && command.ends_with("Dockerfile") {
            self.dockerfile
                .clone()
                .unwrap_or_else(|| DOCKERFILE.to_string())
        } else {
            String::new()
        };
        Ok(CommandOutput {
            stdout,
            stderr: String::new(),
            code: 0,
        })
    }

    async fn copy_to(&self, from: &Path, to: &Path) -> Result<()> {
        self.copies
            .lock()
            .unwrap()
            .push((from.to_path_buf(), to.to_path_buf()));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub(crate) struct MockK8sClient {
    pub(crate) fail_delete: bool,
    /// `delete` or `create` with the manifest content at the time of the call.
    pub(crate) calls: Mutex<Vec<(String, String)>>,
}

impl MockK8sClient {
    fn record(&self, method: &str, path: &Path) {
        let manifest = std::fs::read_to_string(path).unwrap();
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), manifest));
    }

    pub(crate) fn methods(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(method, _)| method.clone())
            .collect()
    }
}

#[async_trait]
impl K8sClient for MockK8sClient {
    async fn create_manifest(&self, path: &Path) -> Result<()> {
        self.record("create", path);
        Ok(())
    }

    async fn delete_manifest(&self, path: &Path) -> Result<()> {
        self.record("delete", path);
        if self.fail_delete {
            return Err(dpu_plugins::Error::ManifestField {
                path: path.to_path_buf(),
                field: "metadata.name".to_string(),
            });
        }
        Ok(())
    }
}
