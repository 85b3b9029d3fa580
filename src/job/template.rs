//! Job document skeleton and token substitution

use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::{TemplateConfig, TemplateTokens};

/// Built-in skeleton for Apache Pig
pub const DEFAULT_SKELETON: &str = include_str!("default_skeleton.pig");

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to read template {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("template token '{0}' must not be empty")]
    EmptyToken(&'static str),

    #[error("template tokens '{first}' and '{second}' are both '{token}'")]
    DuplicateToken {
        first: &'static str,
        second: &'static str,
        token: String,
    },

    #[error("template skeleton never uses the {name} token '{token}'")]
    MissingToken { name: &'static str, token: String },
}

/// Values for every substitution point of one document
#[derive(Debug, Clone)]
pub struct Bindings<'a> {
    pub input_path: &'a str,
    pub output_path: &'a str,
    pub topic: &'a str,
    pub directory: &'a str,
    pub reducers: i64,
    pub queue: &'a str,
    /// Resolved codec class, if compression is on
    pub codec: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct JobTemplate {
    skeleton: String,
    tokens: TemplateTokens,
    compression_enabled: String,
    compression_codec: String,
}

impl JobTemplate {
    pub fn new(
        skeleton: impl Into<String>,
        tokens: TemplateTokens,
        compression_enabled: impl Into<String>,
        compression_codec: impl Into<String>,
    ) -> Result<Self, TemplateError> {
        validate_tokens(&tokens)?;
        let skeleton = skeleton.into();

        // Without both paths every directory would render the same job
        for (name, token) in [
            ("input_path", &tokens.input_path),
            ("output_path", &tokens.output_path),
        ] {
            if !skeleton.contains(token.as_str()) {
                return Err(TemplateError::MissingToken {
                    name,
                    token: token.clone(),
                });
            }
        }

        Ok(Self {
            skeleton,
            tokens,
            compression_enabled: compression_enabled.into(),
            compression_codec: compression_codec.into(),
        })
    }

    pub fn from_config(config: &TemplateConfig) -> Result<Self, TemplateError> {
        let skeleton = match (&config.path, &config.skeleton) {
            (Some(path), _) => {
                tracing::info!("Loading job template from: {}", path.display());
                std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
                    path: path.clone(),
                    source,
                })?
            }
            (None, Some(inline)) => inline.clone(),
            (None, None) => DEFAULT_SKELETON.to_string(),
        };

        Self::new(
            skeleton,
            config.tokens.clone(),
            config.compression_enabled.as_str(),
            config.compression_codec.as_str(),
        )
    }

    pub fn skeleton(&self) -> &str {
        &self.skeleton
    }

    pub fn render(&self, bindings: &Bindings<'_>) -> String {
        let reducers = bindings.reducers.to_string();
        let (enabled, codec_line) = match bindings.codec {
            Some(codec) => (
                self.compression_enabled.replace("{enabled}", "true"),
                self.compression_codec.replace("{codec}", codec),
            ),
            None => (
                self.compression_enabled.replace("{enabled}", "false"),
                String::new(),
            ),
        };

        let tokens = &self.tokens;
        let mut pairs: Vec<(&str, &str)> = vec![
            (tokens.input_path.as_str(), bindings.input_path),
            (tokens.output_path.as_str(), bindings.output_path),
            (tokens.topic.as_str(), bindings.topic),
            (tokens.directory.as_str(), bindings.directory),
            (tokens.reducers.as_str(), reducers.as_str()),
            (tokens.queue.as_str(), bindings.queue),
            (tokens.codec.as_str(), bindings.codec.unwrap_or_default()),
            (tokens.compression_enabled.as_str(), enabled.as_str()),
            (tokens.compression_codec.as_str(), codec_line.as_str()),
        ];
        // Longest first, so a token that prefixes another cannot split it
        pairs.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        substitute(&self.skeleton, &pairs)
    }
}

/// Replace tokens in a single left-to-right pass; substituted values are
/// never rescanned.
fn substitute(skeleton: &str, pairs: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(skeleton.len());
    let mut rest = skeleton;

    'scan: while let Some(ch) = rest.chars().next() {
        for (token, value) in pairs {
            if let Some(after) = rest.strip_prefix(token) {
                out.push_str(value);
                rest = after;
                continue 'scan;
            }
        }
        out.push(ch);
        rest = &rest[ch.len_utf8()..];
    }

    out
}

pub(crate) fn validate_tokens(tokens: &TemplateTokens) -> Result<(), TemplateError> {
    let entries = tokens.entries();
    let mut seen = HashSet::new();

    for (name, token) in entries {
        if token.is_empty() {
            return Err(TemplateError::EmptyToken(name));
        }
        if !seen.insert(token) {
            let first = entries
                .iter()
                .find(|(_, other)| *other == token)
                .map(|(first, _)| *first)
                .unwrap_or(name);
            return Err(TemplateError::DuplicateToken {
                first,
                second: name,
                token: token.to_string(),
            });
        }
    }

    Ok(())
}
