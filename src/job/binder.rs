use thiserror::Error;
use tracing::debug;

use super::codec::CodecTable;
use super::document::JobDocument;
use super::spec::{JobSpecError, MergeJobSpec, join_path};
use super::template::{Bindings, JobTemplate, TemplateError};
use crate::config::Config;
use crate::selector::{DirectorySet, SelectorKind};

const NAME_PLACEHOLDER: &str = "{name}";

#[derive(Debug, Error)]
pub enum BindError {
    #[error("invalid merge job: {0}")]
    Spec(#[from] JobSpecError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("no directories to merge")]
    EmptyDirectorySet,
}

/// Turns a job spec and a directory set into one document per directory
#[derive(Debug, Clone)]
pub struct JobTemplateBinder {
    template: JobTemplate,
    codecs: CodecTable,
    input_glob: String,
    directory_input_glob: String,
}

impl JobTemplateBinder {
    pub fn new(
        template: JobTemplate,
        codecs: CodecTable,
        input_glob: impl Into<String>,
        directory_input_glob: impl Into<String>,
    ) -> Self {
        Self {
            template,
            codecs,
            input_glob: input_glob.into(),
            directory_input_glob: directory_input_glob.into(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, BindError> {
        let template = JobTemplate::from_config(&config.template)?;
        Ok(Self::new(
            template,
            CodecTable::new(&config.job.codecs),
            config.template.input_glob.as_str(),
            config.template.directory_input_glob.as_str(),
        ))
    }

    pub fn template(&self) -> &JobTemplate {
        &self.template
    }

    /// Bind every directory of `directories`, in set order.
    ///
    /// The spec is validated before anything is rendered, so an invalid spec
    /// yields no documents at all.
    pub fn bind(
        &self,
        spec: &MergeJobSpec,
        directories: &DirectorySet,
    ) -> Result<Vec<JobDocument>, BindError> {
        spec.validate()?;
        if directories.is_empty() {
            return Err(BindError::EmptyDirectorySet);
        }

        let codec = spec.codec().map(|codec| self.codecs.resolve(codec));
        let glob = match directories.kind() {
            SelectorKind::Directory => &self.directory_input_glob,
            _ => &self.input_glob,
        };

        let documents: Vec<JobDocument> = directories
            .iter()
            .map(|name| {
                let input_path =
                    join_path(spec.input_prefix(), &glob.replace(NAME_PLACEHOLDER, name));
                let output_path = join_path(spec.output_prefix(), name);
                let content = self.template.render(&Bindings {
                    input_path: &input_path,
                    output_path: &output_path,
                    topic: spec.topic(),
                    directory: name,
                    reducers: spec.reducer_count(),
                    queue: spec.queue(),
                    codec,
                });
                JobDocument::new(spec.topic(), name.as_str(), input_path, output_path, content)
            })
            .collect();

        debug!(
            topic = spec.topic(),
            documents = documents.len(),
            "Bound merge job"
        );
        Ok(documents)
    }
}
