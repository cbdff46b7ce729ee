pub mod environment;
pub mod error;
pub mod extract;
pub mod filter;
pub mod llm;
pub mod logging;
pub mod pipeline;
pub mod prompt;
pub mod vector;

pub use error::{GenerationError, MalformedOutput};
pub use filter::{DateRange, Filter, FilterOutcome};
pub use llm::{CompletionGenerator, LLMClient, LLMParams, TextGenerator};
pub use pipeline::FilterExtractor;

pub const TARGET_LLM_REQUEST: &str = "llm_request";
pub const TARGET_EXTRACT: &str = "filter_extract";
pub const TARGET_VECTOR: &str = "vector";

/// Token budget for a single completion; the few-shot answers fit well within it.
pub const DEFAULT_MAX_NEW_TOKENS: u32 = 150;
