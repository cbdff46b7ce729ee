use async_openai::types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs};
use async_openai::{config::OpenAIConfig, Client as OpenAIClient};
use async_trait::async_trait;
use ollama_rs::generation::completion::request::GenerationRequest;
use ollama_rs::generation::options::GenerationOptions;
use ollama_rs::Ollama;
use tracing::{debug, warn};

use crate::error::GenerationError;
use crate::llm::TextGenerator;
use crate::TARGET_LLM_REQUEST;

#[derive(Clone, Debug)]
pub enum LLMClient {
    Ollama(Ollama),
    OpenAI(OpenAIClient<OpenAIConfig>),
}

impl LLMClient {
    pub fn ollama(host: &str, port: u16) -> Self {
        LLMClient::Ollama(Ollama::new(host.to_string(), port))
    }

    pub fn openai(api_key: &str) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        LLMClient::OpenAI(OpenAIClient::with_config(config))
    }
}

/// A hosted model: which client to talk to, which model, how to sample.
#[derive(Clone)]
pub struct LLMParams {
    pub llm_client: LLMClient,
    pub model: String,
    pub temperature: f32,
}

impl LLMParams {
    async fn generate_ollama(
        &self,
        ollama: &Ollama,
        prompt: &str,
        max_new_tokens: u32,
    ) -> Result<String, GenerationError> {
        let options = GenerationOptions::default()
            .temperature(self.temperature)
            .num_predict(max_new_tokens as i32);
        let request =
            GenerationRequest::new(self.model.clone(), prompt.to_string()).options(options);

        let response = ollama
            .generate(request)
            .await
            .map_err(|e| GenerationError::Unavailable(format!("ollama: {}", e)))?;
        Ok(response.response)
    }

    async fn generate_openai(
        &self,
        client: &OpenAIClient<OpenAIConfig>,
        prompt: &str,
        max_new_tokens: u32,
    ) -> Result<String, GenerationError> {
        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| GenerationError::Inference(format!("invalid request: {}", e)))?;
        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model.clone())
            .temperature(self.temperature)
            .max_completion_tokens(max_new_tokens)
            .messages(vec![message.into()])
            .build()
            .map_err(|e| GenerationError::Inference(format!("invalid request: {}", e)))?;

        let response = client
            .chat()
            .create(request)
            .await
            .map_err(|e| GenerationError::Unavailable(format!("openai: {}", e)))?;

        match response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
        {
            Some(content) => Ok(content),
            None => {
                warn!(target: TARGET_LLM_REQUEST, "OpenAI response contained no content");
                Err(GenerationError::EmptyResponse)
            }
        }
    }
}

#[async_trait]
impl TextGenerator for LLMParams {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        prompt: &str,
        max_new_tokens: u32,
    ) -> Result<String, GenerationError> {
        debug!(target: TARGET_LLM_REQUEST, "Generating with model {} at temperature {}", self.model, self.temperature);
        match &self.llm_client {
            LLMClient::Ollama(ollama) => self.generate_ollama(ollama, prompt, max_new_tokens).await,
            LLMClient::OpenAI(client) => self.generate_openai(client, prompt, max_new_tokens).await,
        }
    }
}
