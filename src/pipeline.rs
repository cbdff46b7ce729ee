use tracing::info;

use crate::error::GenerationError;
use crate::extract::filter_from_prompted_completion;
use crate::filter::FilterOutcome;
use crate::llm::CompletionGenerator;
use crate::prompt::filter_extraction_prompt;
use crate::TARGET_EXTRACT;

/// Turns a free-text query into a [`FilterOutcome`].
///
/// Prompt assembly, generation, answer isolation and validation run in that
/// order for every call. Only generation can fail; every problem with the
/// model's output ends up as [`FilterOutcome::Empty`].
#[derive(Clone)]
pub struct FilterExtractor {
    completion: CompletionGenerator,
}

impl FilterExtractor {
    pub fn new(completion: CompletionGenerator) -> Self {
        Self { completion }
    }

    pub async fn extract(&self, query: &str) -> Result<FilterOutcome, GenerationError> {
        info!(target: TARGET_EXTRACT, "Extracting filter with {} for query: {}", self.completion.generator_name(), query);
        let prompt = filter_extraction_prompt(query);
        let raw_completion = self.completion.complete(&prompt).await?;
        Ok(filter_from_prompted_completion(&raw_completion, prompt.len()))
    }
}
