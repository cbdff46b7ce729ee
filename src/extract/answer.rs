use crate::error::MalformedOutput;
use crate::extract::literal::{parse_mapping, LiteralValue};
use crate::prompt::ANSWER_MARKER;

/// Text following the last answer marker of a completion, trimmed.
///
/// The completion echoes the prompt, so the few-shot answers appear before
/// the real one; only the final marker belongs to the model's answer.
pub fn isolate_answer(raw_completion: &str) -> Result<&str, MalformedOutput> {
    let start = raw_completion
        .rfind(ANSWER_MARKER)
        .ok_or(MalformedOutput::MissingMarker)?;
    answer_after(raw_completion, start)
}

/// Like [`isolate_answer`], for a completion whose first `prompt_len` bytes
/// are the prompt. The answer starts at the marker that ends the prompt, so
/// markers the model writes itself (a made-up next example) are ignored.
pub fn isolate_prompted_answer(
    raw_completion: &str,
    prompt_len: usize,
) -> Result<&str, MalformedOutput> {
    let Some(prompt) = raw_completion.get(..prompt_len) else {
        return isolate_answer(raw_completion);
    };
    let start = prompt
        .rfind(ANSWER_MARKER)
        .ok_or(MalformedOutput::MissingMarker)?;
    answer_after(raw_completion, start)
}

fn answer_after(raw_completion: &str, marker_start: usize) -> Result<&str, MalformedOutput> {
    let answer = raw_completion[marker_start + ANSWER_MARKER.len()..].trim();
    if answer.is_empty() {
        return Err(MalformedOutput::EmptyAnswer);
    }
    Ok(answer)
}

/// Parse the mapping at the start of an isolated answer. Anything the model
/// wrote after the closing brace is discarded.
pub fn parse_answer(answer: &str) -> Result<LiteralValue, MalformedOutput> {
    let (value, _) = parse_mapping(answer)?;
    Ok(value)
}
