use crate::job::codec;
use crate::naming::Granularity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub naming: NamingConfig,
    #[serde(default)]
    pub template: TemplateConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub job: JobConfig,
}

/// Directory naming convention
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NamingConfig {
    /// Granularity at which directories exist in storage
    #[serde(default)]
    pub granularity: Granularity,
    #[serde(default = "default_year_pattern")]
    pub year: String,
    #[serde(default = "default_month_pattern")]
    pub month: String,
    #[serde(default = "default_day_pattern")]
    pub day: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            granularity: Granularity::default(),
            year: default_year_pattern(),
            month: default_month_pattern(),
            day: default_day_pattern(),
        }
    }
}

fn default_year_pattern() -> String {
    "%Y".to_string()
}

fn default_month_pattern() -> String {
    "%Y-%m".to_string()
}

fn default_day_pattern() -> String {
    "%Y-%m-%d".to_string()
}

/// Job document skeleton and its substitution points
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TemplateConfig {
    /// Skeleton file; takes precedence over `skeleton`
    pub path: Option<PathBuf>,
    /// Inline skeleton; the built-in Pig skeleton is used when neither is set
    pub skeleton: Option<String>,
    /// Input location relative to the input prefix, `{name}` = directory name
    #[serde(default = "default_input_glob")]
    pub input_glob: String,
    /// Input location for an explicitly named directory
    #[serde(default = "default_directory_input_glob")]
    pub directory_input_glob: String,
    /// Directive toggling output compression, `{enabled}` = true/false
    #[serde(default = "default_compression_enabled")]
    pub compression_enabled: String,
    /// Directive naming the codec, `{codec}` = resolved codec class
    #[serde(default = "default_compression_codec")]
    pub compression_codec: String,
    #[serde(default)]
    pub tokens: TemplateTokens,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            path: None,
            skeleton: None,
            input_glob: default_input_glob(),
            directory_input_glob: default_directory_input_glob(),
            compression_enabled: default_compression_enabled(),
            compression_codec: default_compression_codec(),
            tokens: TemplateTokens::default(),
        }
    }
}

fn default_input_glob() -> String {
    "{name}*".to_string()
}

fn default_directory_input_glob() -> String {
    "{name}*/*".to_string()
}

fn default_compression_enabled() -> String {
    "set output.compression.enabled {enabled}".to_string()
}

fn default_compression_codec() -> String {
    "set output.compression.codec {codec}".to_string()
}

/// Placeholder text for each substitution point of the skeleton
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TemplateTokens {
    pub input_path: String,
    pub output_path: String,
    pub topic: String,
    pub directory: String,
    pub reducers: String,
    pub queue: String,
    pub codec: String,
    pub compression_enabled: String,
    pub compression_codec: String,
}

impl Default for TemplateTokens {
    fn default() -> Self {
        Self {
            input_path: "@INPUT_PATH".to_string(),
            output_path: "@OUTPUT_PATH".to_string(),
            topic: "@TOPIC".to_string(),
            directory: "@DIRECTORY".to_string(),
            reducers: "@NUM_REDUCERS".to_string(),
            queue: "@QUEUE".to_string(),
            codec: "@CODEC".to_string(),
            compression_enabled: "@SET_COMPRESSION_ENABLED".to_string(),
            compression_codec: "@SET_COMPRESSION_CODEC".to_string(),
        }
    }
}

impl TemplateTokens {
    /// Every token with its field name
    pub fn entries(&self) -> [(&'static str, &str); 9] {
        [
            ("input_path", self.input_path.as_str()),
            ("output_path", self.output_path.as_str()),
            ("topic", self.topic.as_str()),
            ("directory", self.directory.as_str()),
            ("reducers", self.reducers.as_str()),
            ("queue", self.queue.as_str()),
            ("codec", self.codec.as_str()),
            ("compression_enabled", self.compression_enabled.as_str()),
            ("compression_codec", self.compression_codec.as_str()),
        ]
    }
}

/// External batch engine invocation
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    #[serde(default = "default_engine_program")]
    pub program: String,
    /// Arguments; `{job}` is replaced by the job document path
    #[serde(default = "default_engine_args")]
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: default_engine_program(),
            args: default_engine_args(),
            working_dir: None,
            env: BTreeMap::new(),
        }
    }
}

pub const JOB_PLACEHOLDER: &str = "{job}";

fn default_engine_program() -> String {
    "pig".to_string()
}

fn default_engine_args() -> Vec<String> {
    vec!["-f".to_string(), JOB_PLACEHOLDER.to_string()]
}

/// Where job documents are written
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunnerConfig {
    #[serde(default = "default_scripts_dir")]
    pub scripts_dir: PathBuf,
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            scripts_dir: default_scripts_dir(),
            extension: default_extension(),
        }
    }
}

fn default_scripts_dir() -> PathBuf {
    PathBuf::from("scripts")
}

fn default_extension() -> String {
    "pig".to_string()
}

/// Job defaults
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JobConfig {
    /// Reducer count when the caller gives none
    #[serde(default = "default_reducers")]
    pub default_reducers: i64,
    /// Short codec names mapped to codec classes
    #[serde(default = "codec::default_aliases")]
    pub codecs: BTreeMap<String, String>,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            default_reducers: default_reducers(),
            codecs: codec::default_aliases(),
        }
    }
}

fn default_reducers() -> i64 {
    10
}
