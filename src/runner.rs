//! Writes job documents to disk and hands them to the engine

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::{EngineConfig, JOB_PLACEHOLDER, RunnerConfig};
use crate::engine::{EngineCommand, EngineError, EngineRunner};
use crate::job::JobDocument;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to write job document under {}: {source}", .dir.display())]
    Write {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("merge of '{directory}' failed with exit code {}: {stderr}", exit_label(.exit_code))]
    JobExecution {
        directory: String,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },
}

fn exit_label(code: &Option<i32>) -> String {
    code.map_or_else(|| "none (killed by signal)".to_string(), |code| code.to_string())
}

/// Outcome of one successful (or dry) run
#[derive(Debug, Clone, Serialize)]
pub struct JobResult {
    pub directory: String,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub dry_run: bool,
    /// Where the document lives; only still on disk after a dry run
    pub script_path: PathBuf,
    #[serde(skip)]
    pub duration: Duration,
}

#[derive(Debug)]
pub struct JobOutcome {
    pub directory: String,
    pub result: Result<JobResult, RunError>,
}

/// Per-directory outcomes of one invocation, in directory order
#[derive(Debug, Default)]
pub struct RunReport {
    outcomes: Vec<JobOutcome>,
}

impl RunReport {
    pub fn outcomes(&self) -> &[JobOutcome] {
        &self.outcomes
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &RunError)> {
        self.outcomes.iter().filter_map(|outcome| match &outcome.result {
            Ok(_) => None,
            Err(err) => Some((outcome.directory.as_str(), err)),
        })
    }
}

pub struct JobRunner {
    engine: Arc<dyn EngineRunner>,
    engine_config: EngineConfig,
    runner_config: RunnerConfig,
}

impl JobRunner {
    pub fn new(
        engine: Arc<dyn EngineRunner>,
        engine_config: EngineConfig,
        runner_config: RunnerConfig,
    ) -> Self {
        Self {
            engine,
            engine_config,
            runner_config,
        }
    }

    /// Persist `document` and, unless `dry_run`, execute it.
    ///
    /// A non-zero engine exit is returned as [`RunError::JobExecution`]. The
    /// document file is removed once the engine returns, whatever the
    /// outcome; a dry run keeps it.
    pub async fn run(&self, document: &JobDocument, dry_run: bool) -> Result<JobResult, RunError> {
        let file = self.write_document(document)?;
        info!(
            directory = document.directory(),
            path = %file.path().display(),
            "Wrote job document"
        );

        if dry_run {
            let dir = self.runner_config.scripts_dir.clone();
            let (_, script_path) = file.keep().map_err(|err| RunError::Write {
                dir,
                source: err.error,
            })?;
            info!(
                directory = document.directory(),
                "Dry run, engine not invoked"
            );
            return Ok(JobResult {
                directory: document.directory().to_string(),
                exit_code: 0,
                stdout: String::new(),
                stderr: String::new(),
                dry_run: true,
                script_path,
                duration: Duration::ZERO,
            });
        }

        let command = self.command_for(file.path());
        info!(
            directory = document.directory(),
            command = %command.display(),
            "Starting engine"
        );
        let output = self.engine.run(command).await?;
        let script_path = file.path().to_path_buf();
        drop(file);

        if !output.success() {
            error!(
                directory = document.directory(),
                exit_code = ?output.exit_code,
                stderr = %output.stderr.trim_end(),
                "Engine failed"
            );
            return Err(RunError::JobExecution {
                directory: document.directory().to_string(),
                exit_code: output.exit_code,
                stdout: output.stdout,
                stderr: output.stderr,
            });
        }

        info!(
            directory = document.directory(),
            elapsed = ?output.duration,
            "Engine finished"
        );
        Ok(JobResult {
            directory: document.directory().to_string(),
            exit_code: 0,
            stdout: output.stdout,
            stderr: output.stderr,
            dry_run: false,
            script_path,
            duration: output.duration,
        })
    }

    /// Run every document in order, continuing past failures
    pub async fn run_all(&self, documents: &[JobDocument], dry_run: bool) -> RunReport {
        let mut report = RunReport::default();

        for document in documents {
            let result = self.run(document, dry_run).await;
            if let Err(err) = &result {
                warn!(directory = document.directory(), error = %err, "Merge failed, continuing");
            }
            report.outcomes.push(JobOutcome {
                directory: document.directory().to_string(),
                result,
            });
        }

        info!(
            total = report.total(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            "Merge run complete"
        );
        report
    }

    fn write_document(&self, document: &JobDocument) -> Result<NamedTempFile, RunError> {
        let dir = &self.runner_config.scripts_dir;
        let write_err = |source: std::io::Error| RunError::Write {
            dir: dir.clone(),
            source,
        };

        std::fs::create_dir_all(dir).map_err(write_err)?;

        let prefix = format!("{}-", document.file_stem());
        let suffix = format!(".{}", self.runner_config.extension);
        let mut file = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(&suffix)
            .tempfile_in(dir)
            .map_err(write_err)?;

        file.write_all(document.content().as_bytes())
            .and_then(|()| file.flush())
            .map_err(write_err)?;
        Ok(file)
    }

    fn command_for(&self, job_path: &Path) -> EngineCommand {
        let job = job_path.to_string_lossy();
        EngineCommand {
            program: self.engine_config.program.clone(),
            args: self
                .engine_config
                .args
                .iter()
                .map(|arg| arg.replace(JOB_PLACEHOLDER, &job))
                .collect(),
            env: self.engine_config.env.clone(),
            working_dir: self.engine_config.working_dir.clone(),
            job_path: job_path.to_path_buf(),
        }
    }
}
