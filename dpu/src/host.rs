use crate::error::{self, Result};
use async_trait::async_trait;
use log::{debug, trace};
use openssh::{KnownHosts, Session, SessionBuilder};
use snafu::{ensure, ResultExt};
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

const HOSTNAME_FILE: &str = "/proc/sys/kernel/hostname";
const SSH_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// What a finished command printed and how it exited.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// The exit code, `-1` when the command was killed by a signal.
    pub code: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            code: output.status.code().unwrap_or(-1),
        }
    }
}

/// A machine shell commands can be run on.
#[async_trait]
pub trait Host: Send + Sync {
    fn hostname(&self) -> &str;

    /// Whether commands run on the machine this process runs on.
    fn is_localhost(&self) -> bool;

    /// Run `command` through `sh -c` with `env` added to the environment.
    async fn run_with_env(&self, command: &str, env: &[(&str, &str)]) -> Result<CommandOutput>;

    /// Copy the local file `from` to `to` on the host.
    async fn copy_to(&self, from: &Path, to: &Path) -> Result<()>;

    async fn run(&self, command: &str) -> Result<CommandOutput> {
        self.run_with_env(command, &[]).await
    }

    /// Like [`Host::run`] but a non-zero exit is an error.
    async fn run_or_die(&self, command: &str) -> Result<CommandOutput> {
        let output = self.run(command).await?;
        ensure!(
            output.success(),
            error::CommandFailedSnafu {
                host: self.hostname(),
                command,
                code: output.code,
                stdout: &output.stdout,
                stderr: &output.stderr,
            }
        );
        Ok(output)
    }
}

/// The machine this process runs on.
#[derive(Clone, Debug)]
pub struct LocalHost {
    hostname: String,
}

impl LocalHost {
    pub fn new() -> Result<Self> {
        let hostname = std::fs::read_to_string(HOSTNAME_FILE).context(error::HostnameSnafu)?;
        Ok(Self {
            hostname: hostname.trim().to_string(),
        })
    }
}

#[async_trait]
impl Host for LocalHost {
    fn hostname(&self) -> &str {
        &self.hostname
    }

    fn is_localhost(&self) -> bool {
        true
    }

    async fn run_with_env(&self, command: &str, env: &[(&str, &str)]) -> Result<CommandOutput> {
        debug!("Running `{}` on '{}'", command, self.hostname);
        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .envs(env.iter().copied())
            .output()
            .await
            .context(error::CommandSpawnSnafu { command })?;
        let output = CommandOutput::from(output);
        trace!("`{}` exited with {}", command, output.code);
        Ok(output)
    }

    async fn copy_to(&self, from: &Path, to: &Path) -> Result<()> {
        if from == to {
            return Ok(());
        }
        tokio::fs::copy(from, to)
            .await
            .map_err(|e| error::Error::Copy {
                from: from.to_path_buf(),
                to: to.display().to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }
}

/// A machine reached over SSH.
pub struct RemoteHost {
    address: String,
    user: String,
    keyfile: Option<PathBuf>,
    session: Session,
}

impl RemoteHost {
    /// Open a multiplexed SSH session to `address` as `user`. Host keys are not checked, the
    /// machines are freshly installed and have no known key yet.
    pub async fn connect(address: &str, user: &str, keyfile: Option<&Path>) -> Result<Self> {
        let mut builder = SessionBuilder::default();
        builder
            .user(user.to_string())
            .known_hosts_check(KnownHosts::Accept)
            .user_known_hosts_file("/dev/null")
            .connect_timeout(SSH_CONNECT_TIMEOUT);
        if let Some(keyfile) = keyfile {
            builder.keyfile(keyfile);
        }
        debug!("Starting session for {}@{}", user, address);
        let session = builder
            .connect_mux(address)
            .await
            .context(error::ConnectSnafu { address })?;
        Ok(Self {
            address: address.to_string(),
            user: user.to_string(),
            keyfile: keyfile.map(Path::to_path_buf),
            session,
        })
    }

    pub async fn close(self) -> Result<()> {
        let address = self.address;
        self.session
            .close()
            .await
            .context(error::ConnectSnafu { address })
    }
}

/// Prefix `command` with `export` statements for `env`, the session cannot pass an environment.
fn with_exports(command: &str, env: &[(&str, &str)]) -> String {
    env.iter()
        .map(|(key, value)| format!("export {}='{}' && ", key, value.replace('\'', r"'\''")))
        .chain(std::iter::once(command.to_string()))
        .collect()
}

#[async_trait]
impl Host for RemoteHost {
    fn hostname(&self) -> &str {
        &self.address
    }

    fn is_localhost(&self) -> bool {
        false
    }

    async fn run_with_env(&self, command: &str, env: &[(&str, &str)]) -> Result<CommandOutput> {
        let command = with_exports(command, env);
        debug!("Running `{}` on '{}'", command, self.address);
        let output = self
            .session
            .command("sh")
            .arg("-c")
            .arg(&command)
            .output()
            .await
            .context(error::RemoteCommandSnafu {
                host: &self.address,
                command: &command,
            })?;
        Ok(CommandOutput::from(output))
    }

    async fn copy_to(&self, from: &Path, to: &Path) -> Result<()> {
        let mut scp = Command::new("scp");
        scp.args(["-o", "StrictHostKeyChecking=no"])
            .args(["-o", "UserKnownHostsFile=/dev/null"]);
        if let Some(keyfile) = &self.keyfile {
            scp.arg("-i").arg(keyfile);
        }
        let destination = format!("{}@{}:{}", self.user, self.address, to.display());
        debug!("Copying '{}' to '{}'", from.display(), destination);
        let output = scp
            .arg(from)
            .arg(&destination)
            .output()
            .await
            .context(error::CommandSpawnSnafu { command: "scp" })?;
        let output = CommandOutput::from(output);
        ensure!(
            output.success(),
            error::CopySnafu {
                from,
                to: destination,
                reason: output.stderr,
            }
        );
        Ok(())
    }
}

// =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn exports_are_prefixed() {
        assert_eq!(with_exports("make image", &[]), "make image");
        assert_eq!(
            with_exports("make image", &[("IMGTOOL", "podman"), ("NAME", "it's")]),
            r"export IMGTOOL='podman' && export NAME='it'\''s' && make image"
        );
    }

    #[tokio::test]
    async fn local_commands_report_exit_code() {
        let host = LocalHost {
            hostname: "localhost".to_string(),
        };
        let output = host
            .run_with_env("echo $GREETING; echo oops >&2; exit 3", &[("GREETING", "hi")])
            .await
            .unwrap();
        assert_eq!(output.stdout, "hi\n");
        assert_eq!(output.stderr, "oops\n");
        assert_eq!(output.code, 3);
        assert!(!output.success());
    }

    #[tokio::test]
    async fn run_or_die_fails_on_non_zero_exit() {
        let host = LocalHost {
            hostname: "localhost".to_string(),
        };
        assert_eq!(host.run_or_die("printf ok").await.unwrap().stdout, "ok");
        let error = host.run_or_die("echo broken >&2; false").await.unwrap_err();
        assert!(
            matches!(
                &error,
                crate::Error::CommandFailed { code: 1, stderr, .. } if stderr == "broken\n"
            ),
            "{}",
            error
        );
    }

    #[tokio::test]
    async fn local_copy() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("from.yaml");
        let to = dir.path().join("to.yaml");
        std::fs::write(&from, "kind: DaemonSet\n").unwrap();
        let host = LocalHost {
            hostname: "localhost".to_string(),
        };
        host.copy_to(&from, &to).await.unwrap();
        assert_eq!(std::fs::read_to_string(&to).unwrap(), "kind: DaemonSet\n");
        host.copy_to(&from, &from).await.unwrap();
    }
}
