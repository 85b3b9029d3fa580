use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "FILEMERGE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/filemerge.toml";
const ENV_PREFIX: &str = "FILEMERGE";
const ENV_SEPARATOR: &str = "__";
const LIST_SEPARATOR: &str = " ";
const LIST_KEYS: &[&str] = &["engine.args"];

/// Load configuration, lowest priority first: struct defaults, the TOML
/// file named by `FILEMERGE_CONFIG` (or `config/filemerge.toml`), then the
/// process environment, with `.env` read into it first.
pub fn load() -> Result<Config, ConfigError> {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    let config_path = env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    load_from_sources(config_path)
}

/// Layer `config_path` (when present) and the environment over the defaults
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::debug!(
            "No configuration file at {}, using defaults and environment",
            config_path.display()
        );
    }

    builder.add_source(environment()).build()?.try_deserialize()
}

/// `FILEMERGE__ENGINE__PROGRAM` maps to `engine.program`. Keys in
/// `LIST_KEYS` are split on spaces into string lists.
fn environment() -> Environment {
    LIST_KEYS.iter().fold(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .list_separator(LIST_SEPARATOR)
            .try_parsing(true),
        |source, key| source.with_list_parse_key(key),
    )
}
