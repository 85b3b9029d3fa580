use bon::Builder;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum JobSpecError {
    #[error("topic must not be empty")]
    EmptyTopic,

    #[error("reducer count must be positive, got {0}")]
    InvalidReducerCount(i64),

    #[error("codec must not be empty when given")]
    EmptyCodec,

    #[error("queue must not be empty")]
    EmptyQueue,

    #[error("{0} must not be empty")]
    EmptyPrefix(&'static str),
}

/// Parameters shared by every document of one merge invocation
///
/// Built once through [`MergeJobSpec::builder`] and never mutated;
/// [`MergeJobSpec::validate`] runs when the spec is bound.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct MergeJobSpec {
    #[builder(into)]
    topic: String,
    #[builder(into)]
    input_prefix: String,
    #[builder(into)]
    output_prefix: String,
    /// Execution resource pool, passed through to the engine untouched
    #[builder(into)]
    queue: String,
    reducer_count: i64,
    #[builder(into)]
    codec: Option<String>,
    #[builder(default)]
    dry_run: bool,
}

impl MergeJobSpec {
    pub fn validate(&self) -> Result<(), JobSpecError> {
        if self.topic.trim().is_empty() {
            return Err(JobSpecError::EmptyTopic);
        }
        if self.reducer_count <= 0 {
            return Err(JobSpecError::InvalidReducerCount(self.reducer_count));
        }
        if self.codec.as_deref().is_some_and(|codec| codec.trim().is_empty()) {
            return Err(JobSpecError::EmptyCodec);
        }
        if self.queue.trim().is_empty() {
            return Err(JobSpecError::EmptyQueue);
        }
        if self.input_prefix.is_empty() {
            return Err(JobSpecError::EmptyPrefix("input prefix"));
        }
        if self.output_prefix.is_empty() {
            return Err(JobSpecError::EmptyPrefix("output prefix"));
        }
        Ok(())
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn input_prefix(&self) -> &str {
        &self.input_prefix
    }

    pub fn output_prefix(&self) -> &str {
        &self.output_prefix
    }

    pub fn queue(&self) -> &str {
        &self.queue
    }

    pub fn reducer_count(&self) -> i64 {
        self.reducer_count
    }

    pub fn codec(&self) -> Option<&str> {
        self.codec.as_deref()
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }
}

/// Join a hierarchical prefix and a relative path with exactly one separator
pub fn join_path(prefix: &str, relative: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let relative = relative.trim_start_matches('/');
    format!("{prefix}/{relative}")
}
