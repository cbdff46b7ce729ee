use thiserror::Error;

/// The generation capability could not produce a completion.
///
/// This is the only error that leaves the extraction pipeline; everything
/// that goes wrong after a completion exists is a [`MalformedOutput`].
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation backend unavailable: {0}")]
    Unavailable(String),

    #[error("failed to load model: {0}")]
    ModelLoad(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("backend returned an empty completion")]
    EmptyResponse,

    #[error("generation timed out after {0} seconds")]
    Timeout(u64),
}

/// Reasons a completion was not trusted. Resolved into an empty filter,
/// never returned to callers of the pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedOutput {
    #[error("answer marker not found in completion")]
    MissingMarker,

    #[error("nothing follows the answer marker")]
    EmptyAnswer,

    #[error("syntax error at byte {offset}: expected {expected}")]
    Syntax { offset: usize, expected: &'static str },

    #[error("input ended inside the answer block (expected {expected})")]
    Truncated { expected: &'static str },

    #[error("nesting deeper than {0} levels")]
    TooDeep(usize),

    #[error("answer is not a mapping")]
    NotAMapping,

    #[error("missing key '{0}'")]
    MissingKey(&'static str),

    #[error("field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("field '{field}': range {start}..{end} is reversed")]
    ReversedRange { field: &'static str, start: i64, end: i64 },
}

impl MalformedOutput {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        MalformedOutput::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}
