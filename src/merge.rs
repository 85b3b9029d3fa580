//! Resolve, bind and run one merge invocation

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::config::Config;
use crate::engine::EngineRunner;
use crate::job::{BindError, JobDocument, JobTemplateBinder, MergeJobSpec};
use crate::naming::{NamingConvention, NamingError};
use crate::runner::{JobRunner, RunReport};
use crate::selector::{self, DirectorySet, Selector, SelectorError};

#[derive(Debug, Error)]
pub enum MergeError {
    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error(transparent)]
    Naming(#[from] NamingError),

    #[error(transparent)]
    Bind(#[from] BindError),

    #[error("{failed} of {total} merge jobs failed")]
    JobsFailed { failed: usize, total: usize },
}

/// Resolve `selector`, optionally checking literal names against the
/// naming convention
pub fn resolve_checked(
    selector: &Selector,
    convention: &NamingConvention,
    validate_names: bool,
) -> Result<DirectorySet, MergeError> {
    let directories = selector::resolve(selector, convention)?;

    if validate_names && selector.is_literal() {
        for name in &directories {
            convention.from_directory_name(name)?;
        }
    }
    Ok(directories)
}

pub struct MergeService {
    convention: NamingConvention,
    binder: JobTemplateBinder,
    runner: JobRunner,
}

impl MergeService {
    pub fn new(convention: NamingConvention, binder: JobTemplateBinder, runner: JobRunner) -> Self {
        Self {
            convention,
            binder,
            runner,
        }
    }

    pub fn from_config(config: &Config, engine: Arc<dyn EngineRunner>) -> Result<Self, MergeError> {
        let convention = NamingConvention::from_config(&config.naming)?;
        let binder = JobTemplateBinder::from_config(config)?;
        let runner = JobRunner::new(engine, config.engine.clone(), config.runner.clone());
        Ok(Self::new(convention, binder, runner))
    }

    pub fn convention(&self) -> &NamingConvention {
        &self.convention
    }

    pub fn resolve(
        &self,
        selector: &Selector,
        validate_names: bool,
    ) -> Result<DirectorySet, MergeError> {
        resolve_checked(selector, &self.convention, validate_names)
    }

    /// Every document the invocation would run, bound before anything runs
    pub fn plan(
        &self,
        selector: &Selector,
        spec: &MergeJobSpec,
        validate_names: bool,
    ) -> Result<Vec<JobDocument>, MergeError> {
        let directories = self.resolve(selector, validate_names)?;
        let documents = self.binder.bind(spec, &directories)?;
        info!(
            topic = spec.topic(),
            kind = %directories.kind(),
            documents = documents.len(),
            "Merge planned"
        );
        Ok(documents)
    }

    /// Plan and run; fails with [`MergeError::JobsFailed`] if any document
    /// failed, after every document had its attempt.
    pub async fn execute(
        &self,
        selector: &Selector,
        spec: &MergeJobSpec,
        validate_names: bool,
    ) -> Result<RunReport, MergeError> {
        let documents = self.plan(selector, spec, validate_names)?;
        let report = self.runner.run_all(&documents, spec.dry_run()).await;

        if !report.is_success() {
            return Err(MergeError::JobsFailed {
                failed: report.failed(),
                total: report.total(),
            });
        }
        Ok(report)
    }

    /// Like [`MergeService::execute`], but hands back the report even when
    /// some documents failed
    pub async fn execute_report(
        &self,
        selector: &Selector,
        spec: &MergeJobSpec,
        validate_names: bool,
    ) -> Result<RunReport, MergeError> {
        let documents = self.plan(selector, spec, validate_names)?;
        Ok(self.runner.run_all(&documents, spec.dry_run()).await)
    }
}
