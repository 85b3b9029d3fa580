use super::models::{Config, JOB_PLACEHOLDER};
use crate::job::template::{self, TemplateError};
use crate::naming::{NamingConvention, NamingError};
use thiserror::Error;

const NAME_PLACEHOLDER: &str = "{name}";

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid naming convention: {0}")]
    Naming(#[from] NamingError),

    #[error("Invalid template tokens: {0}")]
    Tokens(#[from] TemplateError),

    #[error("Template glob '{field}' must contain {{name}}, got '{value}'")]
    GlobMissingName { field: &'static str, value: String },

    #[error("Engine program must not be empty")]
    EmptyEngineProgram,

    #[error("Engine args must reference the job document with {{job}}")]
    MissingJobPlaceholder,

    #[error("Default reducer count must be positive, got {0}")]
    InvalidDefaultReducers(i64),

    #[error("Runner {0} must not be empty")]
    EmptyRunnerField(&'static str),
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_naming(config)?;
    validate_template(config)?;
    validate_engine(config)?;
    validate_runner(config)?;
    validate_job(config)?;
    Ok(())
}

/// Patterns must be well-formed and round-trip their own granularity
fn validate_naming(config: &Config) -> Result<(), ValidationError> {
    NamingConvention::from_config(&config.naming)?;
    Ok(())
}

fn validate_template(config: &Config) -> Result<(), ValidationError> {
    template::validate_tokens(&config.template.tokens)?;

    for (field, value) in [
        ("input_glob", &config.template.input_glob),
        ("directory_input_glob", &config.template.directory_input_glob),
    ] {
        if !value.contains(NAME_PLACEHOLDER) {
            return Err(ValidationError::GlobMissingName {
                field,
                value: value.clone(),
            });
        }
    }

    Ok(())
}

fn validate_engine(config: &Config) -> Result<(), ValidationError> {
    if config.engine.program.trim().is_empty() {
        return Err(ValidationError::EmptyEngineProgram);
    }
    if !config
        .engine
        .args
        .iter()
        .any(|arg| arg.contains(JOB_PLACEHOLDER))
    {
        return Err(ValidationError::MissingJobPlaceholder);
    }
    Ok(())
}

fn validate_runner(config: &Config) -> Result<(), ValidationError> {
    if config.runner.scripts_dir.as_os_str().is_empty() {
        return Err(ValidationError::EmptyRunnerField("scripts_dir"));
    }
    if config.runner.extension.trim().is_empty() {
        return Err(ValidationError::EmptyRunnerField("extension"));
    }
    Ok(())
}

fn validate_job(config: &Config) -> Result<(), ValidationError> {
    if config.job.default_reducers <= 0 {
        return Err(ValidationError::InvalidDefaultReducers(
            config.job.default_reducers,
        ));
    }
    Ok(())
}
