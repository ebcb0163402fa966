use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

pub(crate) const DEFAULT_INTERPRETER: &str = "python3";
pub(crate) const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub(crate) const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub(crate) const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub(crate) const DEFAULT_ENV_FILE: &str = ".env";
pub(crate) const DEFAULT_MAX_ATTEMPTS: u64 = 5;
pub(crate) const DEFAULT_RETRY_DELAY_SECS: u64 = 2;
pub(crate) const DEFAULT_LOG_PATH: &str = "mender_log.txt";

#[derive(Debug, Deserialize)]
pub(crate) struct Config {
    #[serde(default = "default_interpreter")]
    pub(crate) interpreter: String,
    #[serde(default = "default_model")]
    pub(crate) model: String,
    #[serde(default = "default_api_url")]
    pub(crate) api_url: String,
    #[serde(default = "default_api_key_env")]
    pub(crate) api_key_env: String,
    #[serde(default = "default_env_file")]
    pub(crate) env_file: String,
    #[serde(default = "default_max_attempts")]
    pub(crate) max_attempts: u64,
    #[serde(default = "default_retry_delay_secs")]
    pub(crate) retry_delay_secs: u64,
    #[serde(default = "default_log_path")]
    pub(crate) log_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
            model: default_model(),
            api_url: default_api_url(),
            api_key_env: default_api_key_env(),
            env_file: default_env_file(),
            max_attempts: default_max_attempts(),
            retry_delay_secs: default_retry_delay_secs(),
            log_path: default_log_path(),
        }
    }
}

fn default_interpreter() -> String {
    DEFAULT_INTERPRETER.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

fn default_env_file() -> String {
    DEFAULT_ENV_FILE.to_string()
}

fn default_max_attempts() -> u64 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_retry_delay_secs() -> u64 {
    DEFAULT_RETRY_DELAY_SECS
}

fn default_log_path() -> String {
    DEFAULT_LOG_PATH.to_string()
}

#[derive(Debug)]
pub(crate) struct LoadedConfig {
    pub(crate) config: Config,
    pub(crate) warnings: Vec<String>,
}

pub(crate) fn load_config(path: &Path) -> Result<LoadedConfig, String> {
    let content = fs::read_to_string(path)
        .map_err(|err| format!("Failed to read config {}: {}", path.display(), err))?;
    let value: Value = serde_yaml::from_str(&content)
        .map_err(|err| format!("Failed to parse config {}: {}", path.display(), err))?;
    let mapping = match value {
        Value::Null => Mapping::new(),
        Value::Mapping(mapping) => mapping,
        _ => return Err(format!("Config {} must be a YAML mapping", path.display())),
    };

    let warnings = unknown_top_level_keys(&mapping);
    emit_unknown_key_warnings(&warnings);

    let config: Config = serde_yaml::from_value(Value::Mapping(mapping))
        .map_err(|err| format!("Failed to parse config {}: {}", path.display(), err))?;

    Ok(LoadedConfig { config, warnings })
}

pub(crate) fn validate_config(config: &Config) -> Result<(), String> {
    if config.interpreter.trim().is_empty() {
        return Err("interpreter must not be empty.".to_string());
    }
    if config.model.trim().is_empty() {
        return Err("model must not be empty.".to_string());
    }
    if config.api_url.trim().is_empty() {
        return Err("api_url must not be empty.".to_string());
    }
    if config.api_key_env.trim().is_empty() {
        return Err("api_key_env must not be empty.".to_string());
    }
    if config.max_attempts < 1 {
        return Err(format!(
            "max_attempts must be a positive integer (got {}).",
            config.max_attempts
        ));
    }
    if config.log_path.trim().is_empty() {
        return Err("log_path must not be empty.".to_string());
    }
    Ok(())
}

fn emit_unknown_key_warnings(keys: &[String]) {
    for key in keys {
        eprintln!("Warning: unknown config key: {}", key);
    }
}

fn unknown_top_level_keys(mapping: &Mapping) -> Vec<String> {
    let allowed = [
        "interpreter",
        "model",
        "api_url",
        "api_key_env",
        "env_file",
        "max_attempts",
        "retry_delay_secs",
        "log_path",
    ];

    mapping
        .keys()
        .filter_map(|key| key.as_str().map(|value| value.to_string()))
        .filter(|key| !allowed.contains(&key.as_str()))
        .collect()
}
