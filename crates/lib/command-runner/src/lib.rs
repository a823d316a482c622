//! Shell command runner.

use std::process::Stdio;

use monitoring_core::{CommandOutput, CommandRequest};
use tokio::io::AsyncWriteExt as _;

/// Errors returned while running a command.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The shell could not be spawned.
    #[error("spawn {shell}: {source}")]
    Spawn {
        /// The shell that failed to start.
        shell: String,

        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Waiting for the command failed.
    #[error("wait: {0}")]
    Wait(#[source] std::io::Error),
}

/// Runs commands through a POSIX shell (`<shell> -c <command>`).
#[derive(Debug, Clone)]
pub struct ShellRunner {
    /// The shell binary.
    pub shell: String,
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self {
            shell: "sh".to_owned(),
        }
    }
}

impl monitoring_core::CommandRunner for ShellRunner {
    type Error = Error;

    async fn run(&self, request: CommandRequest) -> Result<CommandOutput, Error> {
        let CommandRequest {
            command,
            env,
            stdin,
        } = request;

        let mut child = tokio::process::Command::new(&self.shell)
            .arg("-c")
            .arg(&command)
            .envs(env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| Error::Spawn {
                shell: self.shell.clone(),
                source,
            })?;

        // Stdin is fed while the output is collected.
        let pipe = child.stdin.take();
        let write_stdin = async move {
            let Some(mut pipe) = pipe else {
                return;
            };
            if let Err(error) = pipe.write_all(&stdin).await {
                // The command may exit without reading its input.
                tracing::debug!(%error, "command stdin not fully consumed");
            }
        };

        let ((), output) = tokio::join!(write_stdin, child.wait_with_output());
        let output = output.map_err(Error::Wait)?;

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use monitoring_core::CommandRunner as _;

    use super::*;

    fn request(command: &str, env: &[(&str, &str)], stdin: &str) -> CommandRequest {
        CommandRequest {
            command: command.to_owned(),
            env: env
                .iter()
                .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
                .collect(),
            stdin: stdin.as_bytes().to_vec(),
        }
    }

    #[tokio::test]
    async fn passes_stdin_and_env() {
        let output = ShellRunner::default()
            .run(request(
                "printf '%s|' \"$MAIL_UID\"; cat",
                &[("MAIL_UID", "42")],
                "hello body",
            ))
            .await
            .unwrap();

        assert!(output.success());
        assert_eq!(output.stdout, b"42|hello body");
    }

    #[tokio::test]
    async fn reports_exit_code_and_stderr() {
        let output = ShellRunner::default()
            .run(request("echo oops >&2; exit 3", &[], ""))
            .await
            .unwrap();

        assert_eq!(output.exit_code, Some(3));
        assert!(!output.success());
        assert_eq!(output.stderr, b"oops\n");
    }

    #[tokio::test]
    async fn ignores_unread_stdin() {
        let body = "x".repeat(1 << 20);
        let output = ShellRunner::default()
            .run(request("true", &[], &body))
            .await
            .unwrap();
        assert!(output.success());
    }

    #[tokio::test]
    async fn missing_shell_is_a_spawn_error() {
        let runner = ShellRunner {
            shell: "/nonexistent/shell".to_owned(),
        };
        let err = runner.run(request("true", &[], "")).await.unwrap_err();
        assert!(matches!(err, Error::Spawn { .. }));
    }
}
