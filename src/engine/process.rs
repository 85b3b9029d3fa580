use async_trait::async_trait;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;

use super::{EngineCommand, EngineError, EngineOutput, EngineRunner};

/// Runs the engine as a child process and waits for it to finish
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioEngineRunner;

impl TokioEngineRunner {
    pub fn new() -> Self {
        Self
    }

    fn build(command: &EngineCommand) -> Command {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .envs(&command.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &command.working_dir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

#[async_trait]
impl EngineRunner for TokioEngineRunner {
    async fn run(&self, command: EngineCommand) -> Result<EngineOutput, EngineError> {
        tracing::debug!("Executing engine: {}", command.display());
        let start = Instant::now();

        let output = Self::build(&command).output().await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                EngineError::CommandNotFound(command.program.clone())
            } else {
                EngineError::Spawn {
                    command: command.display(),
                    source,
                }
            }
        })?;

        let duration = start.elapsed();
        tracing::debug!(
            exit_code = ?output.status.code(),
            elapsed = ?duration,
            "Engine finished"
        );

        Ok(EngineOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            duration,
        })
    }
}
