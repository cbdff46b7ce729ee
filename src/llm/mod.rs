pub mod device;
pub mod local;
pub mod remote;

pub use device::ComputeDevice;
pub use local::{CandleGenerator, LocalModelConfig};
pub use remote::{LLMClient, LLMParams};

use async_trait::async_trait;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, error};

use crate::error::GenerationError;
use crate::{DEFAULT_MAX_NEW_TOKENS, TARGET_LLM_REQUEST};

/// A capability that continues a prompt.
///
/// Implementations own their tokenizer and device and serialize access to
/// them; callers only see text in and text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;

    /// Generate at most `max_new_tokens` tokens continuing `prompt`.
    /// Returns only the continuation, not the prompt.
    async fn generate(&self, prompt: &str, max_new_tokens: u32)
        -> Result<String, GenerationError>;
}

/// Runs a [`TextGenerator`] with a fixed token budget and returns the raw
/// completion: the prompt followed by the model's continuation.
#[derive(Clone)]
pub struct CompletionGenerator {
    generator: Arc<dyn TextGenerator>,
    max_new_tokens: u32,
}

impl CompletionGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
        }
    }

    pub fn with_max_new_tokens(mut self, max_new_tokens: u32) -> Self {
        self.max_new_tokens = max_new_tokens;
        self
    }

    pub fn max_new_tokens(&self) -> u32 {
        self.max_new_tokens
    }

    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    pub async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        let start = Instant::now();
        debug!(target: TARGET_LLM_REQUEST, "Sending prompt to {} (max {} new tokens)", self.generator.name(), self.max_new_tokens);

        match self.generator.generate(prompt, self.max_new_tokens).await {
            Ok(continuation) => {
                debug!(target: TARGET_LLM_REQUEST, "{} responded in {:?}: {}", self.generator.name(), start.elapsed(), continuation);
                Ok(format!("{}{}", prompt, continuation))
            }
            Err(e) => {
                error!(target: TARGET_LLM_REQUEST, "{} failed after {:?}: {}", self.generator.name(), start.elapsed(), e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recording {
        budgets: Mutex<Vec<u32>>,
    }

    #[async_trait]
    impl TextGenerator for Recording {
        fn name(&self) -> &str {
            "recording"
        }

        async fn generate(
            &self,
            _prompt: &str,
            max_new_tokens: u32,
        ) -> Result<String, GenerationError> {
            self.budgets.lock().unwrap().push(max_new_tokens);
            Ok(" continuation".to_string())
        }
    }

    struct Broken;

    #[async_trait]
    impl TextGenerator for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        async fn generate(&self, _: &str, _: u32) -> Result<String, GenerationError> {
            Err(GenerationError::Unavailable("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_completion_echoes_prompt_and_uses_budget() {
        let recording = Arc::new(Recording {
            budgets: Mutex::new(Vec::new()),
        });
        let generator = CompletionGenerator::new(recording.clone());
        assert_eq!(generator.complete("prompt:").await.unwrap(), "prompt: continuation");

        let generator = generator.with_max_new_tokens(12);
        generator.complete("again").await.unwrap();
        assert_eq!(*recording.budgets.lock().unwrap(), vec![DEFAULT_MAX_NEW_TOKENS, 12]);
    }

    #[tokio::test]
    async fn test_failure_propagates() {
        let generator = CompletionGenerator::new(Arc::new(Broken));
        assert!(matches!(
            generator.complete("prompt").await,
            Err(GenerationError::Unavailable(_))
        ));
    }
}
