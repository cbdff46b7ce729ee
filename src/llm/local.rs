use async_trait::async_trait;
use candle_core::quantized::gguf_file;
use candle_core::Tensor;
use candle_transformers::generation::LogitsProcessor;
use candle_transformers::models::quantized_llama::ModelWeights;
use futures::StreamExt;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokenizers::Tokenizer;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::GenerationError;
use crate::llm::{ComputeDevice, TextGenerator};
use crate::TARGET_LLM_REQUEST;

pub const MODEL_URL: &str = "https://huggingface.co/TheBloke/TinyLlama-1.1B-Chat-v1.0-GGUF/resolve/main/tinyllama-1.1b-chat-v1.0.Q4_K_M.gguf";
pub const TOKENIZER_URL: &str =
    "https://huggingface.co/TinyLlama/TinyLlama-1.1B-Chat-v1.0/resolve/main/tokenizer.json";

/// Files and sampling settings for the local GGUF model.
#[derive(Debug, Clone)]
pub struct LocalModelConfig {
    pub model_path: String,
    pub tokenizer_path: String,
    pub model_url: String,
    pub tokenizer_url: String,
    pub temperature: f32,
    pub seed: u64,
}

impl Default for LocalModelConfig {
    fn default() -> Self {
        Self {
            model_path: "models/tinyllama-1.1b-chat-v1.0.Q4_K_M.gguf".to_string(),
            tokenizer_path: "models/tinyllama-tokenizer.json".to_string(),
            model_url: MODEL_URL.to_string(),
            tokenizer_url: TOKENIZER_URL.to_string(),
            temperature: 0.0,
            seed: 42,
        }
    }
}

async fn download_if_missing(path: &str, url: &str) -> anyhow::Result<()> {
    if Path::new(path).exists() {
        return Ok(());
    }
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    info!(target: TARGET_LLM_REQUEST, "Downloading {} to {}", url, path);
    let response = reqwest::get(url).await?.error_for_status()?;

    // Model files run to hundreds of megabytes; stream them to a partial file
    // and only move it into place once complete.
    let partial = format!("{}.part", path);
    let mut file = fs::File::create(&partial).await?;
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    fs::rename(&partial, path).await?;
    info!(target: TARGET_LLM_REQUEST, "Downloaded {} ({} bytes)", path, written);
    Ok(())
}

impl LocalModelConfig {
    pub async fn ensure_models_exist(&self) -> anyhow::Result<()> {
        download_if_missing(&self.model_path, &self.model_url).await?;
        download_if_missing(&self.tokenizer_path, &self.tokenizer_url).await?;
        Ok(())
    }
}

fn map_candle_err(e: candle_core::Error) -> GenerationError {
    GenerationError::Inference(format!("candle: {}", e))
}

struct LocalModelState {
    model: ModelWeights,
    tokenizer: Tokenizer,
    eos_token_id: Option<u32>,
}

impl LocalModelState {
    fn load(config: &LocalModelConfig, device: &ComputeDevice) -> Result<Self, GenerationError> {
        info!(target: TARGET_LLM_REQUEST, "Loading GGUF model from {}", config.model_path);

        let tokenizer = Tokenizer::from_file(&config.tokenizer_path)
            .map_err(|e| GenerationError::ModelLoad(format!("tokenizer: {}", e)))?;

        let mut file = std::fs::File::open(&config.model_path)
            .map_err(|e| GenerationError::ModelLoad(format!("{}: {}", config.model_path, e)))?;
        let content = gguf_file::Content::read(&mut file)
            .map_err(|e| GenerationError::ModelLoad(format!("gguf: {}", e)))?;
        let model = ModelWeights::from_gguf(content, &mut file, device.device())
            .map_err(|e| GenerationError::ModelLoad(format!("weights: {}", e)))?;

        let eos_token_id = ["</s>", "<|endoftext|>", "<|im_end|>", "<|eot_id|>"]
            .iter()
            .find_map(|token| tokenizer.token_to_id(token));

        info!(target: TARGET_LLM_REQUEST, "Local model loaded (eos token: {:?})", eos_token_id);

        Ok(Self {
            model,
            tokenizer,
            eos_token_id,
        })
    }

    fn generate(
        &mut self,
        device: &ComputeDevice,
        processor: &mut LogitsProcessor,
        prompt: &str,
        max_new_tokens: u32,
    ) -> Result<String, GenerationError> {
        let encoding = self
            .tokenizer
            .encode(prompt, true)
            .map_err(|e| GenerationError::Inference(format!("tokenization: {}", e)))?;
        let prompt_tokens = encoding.get_ids();
        debug!(target: TARGET_LLM_REQUEST, "Prompt is {} tokens", prompt_tokens.len());

        let mut generated: Vec<u32> = Vec::new();
        let mut input: Vec<u32> = prompt_tokens.to_vec();
        let mut index_pos = 0;

        for _ in 0..max_new_tokens {
            let tensor = Tensor::new(input.as_slice(), device.device())
                .and_then(|t| t.unsqueeze(0))
                .map_err(map_candle_err)?;
            // Position 0 resets the key/value cache left over from the previous call.
            let logits = self
                .model
                .forward(&tensor, index_pos)
                .and_then(|l| l.squeeze(0))
                .map_err(map_candle_err)?;
            index_pos += input.len();

            let next = processor.sample(&logits).map_err(map_candle_err)?;
            if Some(next) == self.eos_token_id {
                break;
            }
            generated.push(next);
            input = vec![next];
        }

        self.tokenizer
            .decode(&generated, true)
            .map_err(|e| GenerationError::Inference(format!("detokenization: {}", e)))
    }
}

/// Runs a quantized llama-family model in process with candle.
///
/// The weights sit behind a mutex, so concurrent callers take turns.
pub struct CandleGenerator {
    state: Arc<Mutex<LocalModelState>>,
    device: ComputeDevice,
    temperature: f32,
    seed: u64,
    label: String,
}

impl CandleGenerator {
    /// Load model and tokenizer from the paths in `config` onto `device`.
    /// Call [`LocalModelConfig::ensure_models_exist`] first to fetch them.
    pub fn load(config: &LocalModelConfig, device: ComputeDevice) -> Result<Self, GenerationError> {
        let state = LocalModelState::load(config, &device)?;
        let label = Path::new(&config.model_path)
            .file_stem()
            .map(|stem| format!("local/{}", stem.to_string_lossy()))
            .unwrap_or_else(|| "local".to_string());
        Ok(Self {
            state: Arc::new(Mutex::new(state)),
            device,
            temperature: config.temperature,
            seed: config.seed,
            label,
        })
    }

    pub fn device(&self) -> &ComputeDevice {
        &self.device
    }
}

#[async_trait]
impl TextGenerator for CandleGenerator {
    fn name(&self) -> &str {
        &self.label
    }

    async fn generate(
        &self,
        prompt: &str,
        max_new_tokens: u32,
    ) -> Result<String, GenerationError> {
        let state = Arc::clone(&self.state);
        let device = self.device.clone();
        let prompt = prompt.to_string();
        let temperature = (self.temperature > 0.0).then_some(self.temperature as f64);
        let seed = self.seed;

        // Inference is CPU/GPU bound; keep it off the async workers.
        tokio::task::spawn_blocking(move || -> Result<String, GenerationError> {
            let start = Instant::now();
            let mut processor = LogitsProcessor::new(seed, temperature, None);
            let mut guard = state
                .lock()
                .map_err(|_| GenerationError::Unavailable("local model lock poisoned".to_string()))?;
            let output = guard.generate(&device, &mut processor, &prompt, max_new_tokens)?;
            debug!(target: TARGET_LLM_REQUEST, "Local generation took {:?}", start.elapsed());
            Ok(output)
        })
        .await
        .map_err(|e| GenerationError::Inference(format!("inference task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_points_at_models_dir() {
        let config = LocalModelConfig::default();
        assert!(config.model_path.starts_with("models/"));
        assert!(config.model_path.ends_with(".gguf"));
        assert_eq!(config.temperature, 0.0);
    }

    #[test]
    fn test_load_fails_cleanly_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = LocalModelConfig {
            model_path: dir.path().join("missing.gguf").display().to_string(),
            tokenizer_path: dir.path().join("missing.json").display().to_string(),
            ..Default::default()
        };
        assert!(matches!(
            CandleGenerator::load(&config, ComputeDevice::cpu()),
            Err(GenerationError::ModelLoad(_))
        ));
    }

    #[tokio::test]
    async fn test_existing_files_are_not_downloaded() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("model.gguf");
        let tokenizer = dir.path().join("tokenizer.json");
        std::fs::write(&model, b"weights").unwrap();
        std::fs::write(&tokenizer, b"{}").unwrap();
        let config = LocalModelConfig {
            model_path: model.display().to_string(),
            tokenizer_path: tokenizer.display().to_string(),
            // unroutable: any download attempt would fail
            model_url: "http://127.0.0.1:9/model".to_string(),
            tokenizer_url: "http://127.0.0.1:9/tokenizer".to_string(),
            ..Default::default()
        };
        config.ensure_models_exist().await.unwrap();
        assert_eq!(std::fs::read(&model).unwrap(), b"weights");
    }
}
