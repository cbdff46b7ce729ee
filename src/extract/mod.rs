pub mod answer;
pub mod literal;
pub mod normalize;

pub use answer::{isolate_answer, isolate_prompted_answer, parse_answer};
pub use literal::LiteralValue;
pub use normalize::normalize_filter;

use tracing::{debug, info, warn};

use crate::error::MalformedOutput;
use crate::filter::{Filter, FilterOutcome};
use crate::TARGET_EXTRACT;

/// Isolate, parse and validate the answer contained in a raw completion.
pub fn try_filter_from_completion(raw_completion: &str) -> Result<Filter, MalformedOutput> {
    filter_from_answer(isolate_answer(raw_completion)?)
}

/// Like [`try_filter_from_completion`] for a completion that starts with a
/// prompt of `prompt_len` bytes.
pub fn try_filter_from_prompted_completion(
    raw_completion: &str,
    prompt_len: usize,
) -> Result<Filter, MalformedOutput> {
    filter_from_answer(isolate_prompted_answer(raw_completion, prompt_len)?)
}

fn filter_from_answer(answer: &str) -> Result<Filter, MalformedOutput> {
    debug!(target: TARGET_EXTRACT, "Isolated answer block: {}", answer);
    let value = parse_answer(answer)?;
    normalize_filter(&value)
}

/// Like [`try_filter_from_completion`], with every failure resolved into
/// [`FilterOutcome::Empty`].
pub fn filter_from_completion(raw_completion: &str) -> FilterOutcome {
    resolve(raw_completion, try_filter_from_completion(raw_completion))
}

/// Like [`try_filter_from_prompted_completion`], with every failure resolved
/// into [`FilterOutcome::Empty`].
pub fn filter_from_prompted_completion(raw_completion: &str, prompt_len: usize) -> FilterOutcome {
    resolve(
        raw_completion,
        try_filter_from_prompted_completion(raw_completion, prompt_len),
    )
}

fn resolve(raw_completion: &str, result: Result<Filter, MalformedOutput>) -> FilterOutcome {
    match result {
        Ok(filter) => {
            info!(
                target: TARGET_EXTRACT,
                "Extracted filter: year={} month={} day={} content={} types={:?}",
                filter.year,
                filter.month,
                filter.day,
                filter.file_content.len(),
                filter.file_type
            );
            FilterOutcome::Filter(filter)
        }
        Err(e) => {
            // Keep logs readable when the model rambles.
            let tail: String = raw_completion
                .chars()
                .rev()
                .take(300)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            warn!(
                target: TARGET_EXTRACT,
                "Discarding malformed completion: {}. Completion tail: {}", e, tail
            );
            FilterOutcome::Empty
        }
    }
}
