//! External batch engine invocation

mod mock;
mod process;

pub use mock::{EngineInvocation, MockEngineRunner};
pub use process::TokioEngineRunner;

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine command not found: {0}")]
    CommandNotFound(String),

    #[error("failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("mock expectation not met: {0}")]
    MockExpectationNotMet(String),
}

/// A single engine invocation for one job document
#[derive(Debug, Clone)]
pub struct EngineCommand {
    pub program: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub working_dir: Option<PathBuf>,
    /// Job document the engine is asked to execute
    pub job_path: PathBuf,
}

impl EngineCommand {
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineOutput {
    /// `None` when the engine was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

impl EngineOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[async_trait]
pub trait EngineRunner: Send + Sync {
    async fn run(&self, command: EngineCommand) -> Result<EngineOutput, EngineError>;
}
