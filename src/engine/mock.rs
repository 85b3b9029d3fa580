use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{EngineCommand, EngineError, EngineOutput, EngineRunner};

/// What the mock saw for one call: the command and the job document it
/// pointed at, read while the document still existed
#[derive(Debug, Clone)]
pub struct EngineInvocation {
    pub command: EngineCommand,
    pub document: Option<String>,
}

struct Failure {
    needle: String,
    exit_code: i32,
}

/// Records every invocation and answers with configured exit codes
#[derive(Clone, Default)]
pub struct MockEngineRunner {
    failures: Arc<Mutex<Vec<Failure>>>,
    history: Arc<Mutex<Vec<EngineInvocation>>>,
    missing: Arc<AtomicBool>,
}

impl MockEngineRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail with `exit_code` whenever the job document contains `needle`
    pub fn fail_when_document_contains(&self, needle: &str, exit_code: i32) -> &Self {
        if let Ok(mut failures) = self.failures.lock() {
            failures.push(Failure {
                needle: needle.to_string(),
                exit_code,
            });
        }
        self
    }

    /// Behave as if the engine program is not installed
    pub fn program_missing(&self) -> &Self {
        self.missing.store(true, Ordering::SeqCst);
        self
    }

    pub fn invocations(&self) -> Vec<EngineInvocation> {
        self.history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.history.lock().map(|history| history.len()).unwrap_or(0)
    }

    fn lock_err<T>(_: T) -> EngineError {
        EngineError::MockExpectationNotMet("mock state poisoned".to_string())
    }
}

#[async_trait]
impl EngineRunner for MockEngineRunner {
    async fn run(&self, command: EngineCommand) -> Result<EngineOutput, EngineError> {
        if self.missing.load(Ordering::SeqCst) {
            return Err(EngineError::CommandNotFound(command.program));
        }

        let document = tokio::fs::read_to_string(&command.job_path).await.ok();
        let exit_code = {
            let failures = self.failures.lock().map_err(Self::lock_err)?;
            document
                .as_deref()
                .and_then(|content| {
                    failures
                        .iter()
                        .find(|failure| content.contains(&failure.needle))
                })
                .map(|failure| failure.exit_code)
                .unwrap_or(0)
        };

        let stderr = if exit_code == 0 {
            String::new()
        } else {
            format!("mock engine failed for {}", command.job_path.display())
        };

        self.history
            .lock()
            .map_err(Self::lock_err)?
            .push(EngineInvocation { command, document });

        Ok(EngineOutput {
            exit_code: Some(exit_code),
            stdout: String::new(),
            stderr,
            duration: Duration::from_millis(1),
        })
    }
}
