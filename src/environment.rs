use std::env;
use std::str::FromStr;
use tracing::warn;

use crate::llm::LocalModelConfig;
use crate::vector::VectorConfig;
use crate::DEFAULT_MAX_NEW_TOKENS;

/// Retrieves an environment variable and splits it into a vector of strings based on a delimiter.
/// Empty entries are dropped.
pub fn get_env_var_as_vec(var: &str, delimiter: char) -> Vec<String> {
    env::var(var)
        .unwrap_or_default()
        .split(delimiter)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parses an environment variable, falling back to `default` when it is unset
/// or unparsable.
pub fn get_env_var_or<T: FromStr>(var: &str, default: T) -> T {
    match env::var(var) {
        Ok(value) => match value.trim().parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!("Ignoring unparsable value {:?} for {}", value, var);
                default
            }
        },
        Err(_) => default,
    }
}

pub fn get_env_string_or(var: &str, default: &str) -> String {
    env::var(var)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Directory for the rolling log file. Read on its own so logging can be set
/// up before the rest of the settings, whose parse warnings it records.
pub fn log_dir_from_env() -> String {
    get_env_string_or("LOG_DIR", "logs")
}

/// Which generation capability the binary wires into the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Ollama,
    OpenAI,
    Local,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(Backend::Ollama),
            "openai" => Ok(Backend::OpenAI),
            "local" | "candle" => Ok(Backend::Local),
            other => Err(format!("unknown backend '{}'", other)),
        }
    }
}

/// Everything the binary reads from the environment at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub backend: Backend,
    pub ollama_host: String,
    pub ollama_port: u16,
    pub openai_api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_new_tokens: u32,
    pub generation_timeout_secs: u64,
    pub local_use_gpu: bool,
    pub local_model: LocalModelConfig,
    pub vector: VectorConfig,
}

impl Settings {
    pub fn from_env() -> Self {
        let temperature = get_env_var_or("LLM_TEMPERATURE", 0.0);
        let defaults = LocalModelConfig::default();
        let local_model = LocalModelConfig {
            model_path: get_env_string_or("LOCAL_MODEL_PATH", &defaults.model_path),
            tokenizer_path: get_env_string_or("LOCAL_TOKENIZER_PATH", &defaults.tokenizer_path),
            model_url: get_env_string_or("LOCAL_MODEL_URL", &defaults.model_url),
            tokenizer_url: get_env_string_or("LOCAL_TOKENIZER_URL", &defaults.tokenizer_url),
            temperature,
            seed: get_env_var_or("LOCAL_SEED", defaults.seed),
        };

        Self {
            backend: get_env_var_or("METAQUERY_BACKEND", Backend::Ollama),
            ollama_host: get_env_string_or("OLLAMA_HOST", "http://localhost"),
            ollama_port: get_env_var_or("OLLAMA_PORT", 11434),
            openai_api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            model: get_env_string_or("LLM_MODEL", "llama3"),
            temperature,
            max_new_tokens: get_env_var_or("MAX_NEW_TOKENS", DEFAULT_MAX_NEW_TOKENS),
            generation_timeout_secs: get_env_var_or("GENERATION_TIMEOUT_SECS", 120),
            local_use_gpu: get_env_var_or("LOCAL_USE_GPU", true),
            local_model,
            vector: VectorConfig::from_env(),
        }
    }
}
